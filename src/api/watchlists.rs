//! Watchlists service.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::client::ClientInner;
use crate::models::{Epic, WatchlistId};
use crate::table::Table;
use crate::Result;

/// Service for watchlist operations.
///
/// # Example
///
/// ```no_run
/// use ig_dealing_rs::models::Epic;
///
/// # fn example(client: ig_dealing_rs::IgClient) -> ig_dealing_rs::Result<()> {
/// let created = client
///     .watchlists()
///     .create("FX majors", &[Epic::new("CS.D.GBPUSD.TODAY.IP")])?;
/// println!("{}", created["watchlistId"]);
///
/// let lists = client.watchlists().list()?;
/// # Ok(())
/// # }
/// ```
pub struct WatchlistsService<'a> {
    inner: &'a ClientInner,
}

impl<'a> WatchlistsService<'a> {
    pub(crate) fn new(inner: &'a ClientInner) -> Self {
        Self { inner }
    }

    /// All watchlists of the account.
    pub fn list(&self) -> Result<Table> {
        self.inner.get_table(self.inner.url("/watchlists")?, "watchlists")
    }

    /// Create a watchlist holding `epics`.
    pub fn create(&self, name: &str, epics: &[Epic]) -> Result<Value> {
        #[derive(Serialize)]
        struct Request<'r> {
            name: &'r str,
            epics: &'r [Epic],
        }

        self.inner
            .send_json(Method::POST, self.inner.url("/watchlists")?, &Request { name, epics })
    }

    /// Delete a watchlist, returning the broker's body as text.
    pub fn delete(&self, watchlist_id: &WatchlistId) -> Result<String> {
        let url = self.inner.endpoint("/watchlists", &[watchlist_id.as_str()])?;
        self.inner.delete_raw(url)
    }

    /// Markets on a watchlist.
    pub fn markets(&self, watchlist_id: &WatchlistId) -> Result<Table> {
        let url = self.inner.endpoint("/watchlists", &[watchlist_id.as_str()])?;
        self.inner.get_table(url, "markets")
    }

    /// Add a market to a watchlist.
    pub fn add_market(&self, watchlist_id: &WatchlistId, epic: &Epic) -> Result<Value> {
        #[derive(Serialize)]
        struct Request<'r> {
            epic: &'r Epic,
        }

        let url = self.inner.endpoint("/watchlists", &[watchlist_id.as_str()])?;
        self.inner.send_json(Method::PUT, url, &Request { epic })
    }

    /// Remove a market from a watchlist, returning the broker's body as text.
    pub fn remove_market(&self, watchlist_id: &WatchlistId, epic: &Epic) -> Result<String> {
        let url = self
            .inner
            .endpoint("/watchlists", &[watchlist_id.as_str(), epic.as_str()])?;
        self.inner.delete_raw(url)
    }
}
