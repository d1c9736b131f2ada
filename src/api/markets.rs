//! Markets service: market details, navigation, search, sentiment and prices.

use chrono::NaiveDateTime;
use serde_json::Value;
use url::Url;

use crate::client::{ClientInner, DecodeMode};
use crate::models::{Epic, Resolution};
use crate::table::{schemas, Table};
use crate::{Error, Result};

/// Date format of the `startdate` / `enddate` price query parameters.
const PRICE_DATE_FORMAT: &str = "%Y:%m:%d-%H:%M:%S";

/// One level of the market navigation tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketNavigation {
    /// Child nodes (`id`, `name`)
    pub nodes: Table,
    /// Markets listed directly under this node
    pub markets: Table,
}

/// Historical prices with the rest of the response body.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    /// One row per bar, with `openPrice_bid`, `closePrice_ask`, ... columns
    pub prices: Table,
    /// Everything else in the body (`instrumentType`, `allowance`, ...)
    pub metadata: Value,
}

/// Service for market data operations.
///
/// # Example
///
/// ```no_run
/// use ig_dealing_rs::models::Resolution;
///
/// # fn example(client: ig_dealing_rs::IgClient) -> ig_dealing_rs::Result<()> {
/// let epic = client.markets().find_epic("GBPUSD")?;
/// let bars = client.markets().prices(&epic, Resolution::Hour, 24)?;
/// println!("{} bars for {}", bars.len(), epic);
/// # Ok(())
/// # }
/// ```
pub struct MarketsService<'a> {
    inner: &'a ClientInner,
}

impl<'a> MarketsService<'a> {
    pub(crate) fn new(inner: &'a ClientInner) -> Self {
        Self { inner }
    }

    /// Client sentiment for a market.
    pub fn sentiment(&self, market_id: &str) -> Result<Value> {
        let url = self.inner.endpoint("/clientsentiment", &[market_id])?;
        self.inner.get_json(url, DecodeMode::Strict)
    }

    /// Client sentiment of markets related to `market_id`.
    pub fn related_sentiment(&self, market_id: &str) -> Result<Table> {
        let url = self.inner.endpoint("/clientsentiment/related", &[market_id])?;
        self.inner.get_table(url, "clientSentiments")
    }

    /// Top level of the market navigation tree.
    pub fn navigation(&self) -> Result<MarketNavigation> {
        self.navigation_at(self.inner.url("/marketnavigation")?)
    }

    /// Children of a navigation node.
    pub fn sub_nodes(&self, node_id: &str) -> Result<MarketNavigation> {
        self.navigation_at(self.inner.endpoint("/marketnavigation", &[node_id])?)
    }

    fn navigation_at(&self, url: Url) -> Result<MarketNavigation> {
        let body = self.inner.get_json(url, DecodeMode::Strict)?;
        Ok(MarketNavigation {
            nodes: Table::from_field(&body, "nodes")?,
            markets: Table::from_field(&body, "markets")?,
        })
    }

    /// Instrument, dealing rules and snapshot of one market.
    pub fn market(&self, epic: &Epic) -> Result<Value> {
        let url = self.inner.endpoint("/markets", &[epic.as_str()])?;
        self.inner.get_json(url, DecodeMode::Strict)
    }

    /// Markets matching a search term.
    pub fn search(&self, term: &str) -> Result<Table> {
        let mut url = self.inner.url("/markets")?;
        url.query_pairs_mut().append_pair("searchTerm", term);
        let body = self.inner.get_json(url, DecodeMode::Strict)?;
        Table::from_field(&body, "markets")
    }

    /// The epic of the first search hit whose epic contains `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no hit matches.
    pub fn find_epic(&self, identifier: &str) -> Result<Epic> {
        let markets = self.search(identifier)?;
        markets
            .column("epic")
            .unwrap_or_default()
            .into_iter()
            .filter_map(Value::as_str)
            .find(|epic| epic.contains(identifier))
            .map(Epic::from)
            .ok_or_else(|| Error::NotFound(format!("No market epic matching '{}'", identifier)))
    }

    /// Price bars between two instants.
    pub fn prices_between(
        &self,
        epic: &Epic,
        resolution: Resolution,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<PriceHistory> {
        if end < start {
            return Err(Error::InvalidInput(format!(
                "Price range ends ({}) before it starts ({})",
                end, start
            )));
        }

        let mut url = self
            .inner
            .endpoint("/prices", &[epic.as_str(), resolution.as_str()])?;
        // the range form of the endpoint takes a trailing slash
        let path = format!("{}/", url.path());
        url.set_path(&path);
        url.query_pairs_mut()
            .append_pair("startdate", &start.format(PRICE_DATE_FORMAT).to_string())
            .append_pair("enddate", &end.format(PRICE_DATE_FORMAT).to_string());

        let mut body = self.inner.get_json(url, DecodeMode::Strict)?;
        let prices = schemas::prices().flatten(Table::from_field(&body, "prices")?)?;
        if let Some(map) = body.as_object_mut() {
            map.remove("prices");
        }
        Ok(PriceHistory {
            prices,
            metadata: body,
        })
    }

    /// The last `points` price bars.
    pub fn prices(&self, epic: &Epic, resolution: Resolution, points: u32) -> Result<Table> {
        if points == 0 {
            return Err(Error::InvalidInput(
                "Number of price points must be at least 1".to_string(),
            ));
        }
        let points = points.to_string();
        let url = self
            .inner
            .endpoint("/prices", &[epic.as_str(), resolution.as_str(), points.as_str()])?;
        self.inner.get_flat_table(url, "prices", &schemas::prices())
    }
}
