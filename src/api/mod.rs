//! API service modules for IG dealing endpoints.
//!
//! Each service borrows the client and covers one area of the API.
//! List endpoints return a [`Table`](crate::table::Table), flattened where
//! the broker nests records; single-record endpoints return the decoded
//! JSON unchanged.

mod accounts;
mod dealing;
mod general;
mod markets;
mod watchlists;

pub use accounts::AccountsService;
pub use dealing::DealingService;
pub use general::GeneralService;
pub use markets::{MarketNavigation, MarketsService, PriceHistory};
pub use watchlists::WatchlistsService;
