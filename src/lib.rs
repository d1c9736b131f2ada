//! # ig-dealing-rs
//!
//! A blocking Rust client for the IG dealing REST API.
//!
//! The client logs in, keeps the session credentials, issues account,
//! market, dealing and watchlist requests, and reshapes the broker's
//! nested JSON into flat [`Table`]s.
//!
//! ## Features
//!
//! - **Session handling**: login, account switch and logout with the
//!   `CST` / `X-SECURITY-TOKEN` pair held in-instance, secrets redacted
//! - **Dealing**: open, amend and close positions and working orders; every
//!   deal is followed up with its confirmation
//! - **Markets**: search, navigation, sentiment and historical prices
//! - **Tables**: declarative [`FlattenSpec`]s that promote nested records
//!   to columns and refuse to overwrite existing ones
//! - **Rate limits**: optional retry with fixed or exponential backoff
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ig_dealing_rs::{AccountType, IgClient};
//! use ig_dealing_rs::models::{CreatePositionRequest, Direction};
//! use rust_decimal_macros::dec;
//!
//! fn main() -> ig_dealing_rs::Result<()> {
//!     let mut client = IgClient::new("api-key", AccountType::Demo)?;
//!     let session = client.login("identifier", "password")?;
//!     println!("Logged in to {}", session["currentAccountId"]);
//!
//!     // Open positions, one flat row each
//!     let positions = client.dealing().positions()?;
//!     println!("{} open position(s)", positions.len());
//!
//!     // Buy one contract and wait for the confirmation
//!     let request = CreatePositionRequest::market(
//!         "CS.D.GBPUSD.TODAY.IP",
//!         Direction::Buy,
//!         dec!(1),
//!         "GBP",
//!     );
//!     let outcome = client.dealing().create_position(&request)?;
//!     println!("Deal status: {:?}", outcome.deal_status());
//!
//!     client.logout();
//!     Ok(())
//! }
//! ```
//!
//! ## Flattening
//!
//! ```rust
//! use ig_dealing_rs::table::{FlattenSpec, SubField, Table};
//! use serde_json::json;
//!
//! let rows = Table::from_records(vec![json!({
//!     "position": {"dealId": "A1", "size": 5},
//!     "market": {"epic": "E1"}
//! })]).unwrap();
//!
//! let spec = FlattenSpec::new()
//!     .nest("position", [SubField::new("dealId"), SubField::renamed("size", "dealSize")])
//!     .nest("market", ["epic"]);
//!
//! let flat = spec.flatten(rows).unwrap();
//! assert_eq!(flat.columns(), ["dealId", "dealSize", "epic"]);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod table;

// Re-export primary types at crate root for convenience
pub use error::{Error, Result};
pub use models::{AccountId, AccountType, DealId, DealOutcome, DealReference, Epic, WatchlistId};
pub use client::{ClientConfig, IgClient, RetryConfig};
pub use auth::Session;
pub use table::{FlattenSpec, Table};

/// Prelude module for convenient imports.
///
/// ```rust
/// use ig_dealing_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        // Primitives
        AccountId, AccountType, DealId, DealReference, Epic, WatchlistId,
        // Enums
        Direction, OrderType, WorkingOrderType, TimeInForce, Resolution, TransactionType,
        ApplicationStatus,
        // Requests and outcomes
        CreatePositionRequest, ClosePositionRequest, UpdatePositionRequest,
        CreateWorkingOrderRequest, UpdateWorkingOrderRequest, UpdateApplicationRequest,
        DealOutcome,
    };
    pub use crate::client::{ClientConfig, DecodeMode, IgClient, RetryConfig};
    pub use crate::auth::Session;
    pub use crate::table::{FlattenSpec, SubField, Table};
}
