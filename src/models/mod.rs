//! Data models for the IG dealing API.
//!
//! Broker responses are passed through as [`serde_json::Value`] or reshaped
//! into [`Table`](crate::table::Table)s; the models here cover what the
//! client itself sends:
//!
//! - [`primitives`] - identifiers such as `Epic`, `DealId` and `AccountType`
//! - [`enums`] - directions, order types, resolutions, ...
//! - [`deal`] - deal request bodies and [`DealOutcome`]

pub mod primitives;
pub mod enums;
pub mod deal;

pub use primitives::*;
pub use enums::*;
pub use deal::*;
