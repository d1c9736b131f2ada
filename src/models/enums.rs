//! Enumeration types for the IG dealing API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Deal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Buy / go long
    Buy,
    /// Sell / go short
    Sell,
}

impl Direction {
    /// The direction that closes a position opened in this direction.
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
        }
    }
}

/// Execution type of an OTC position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Fill at the current market level
    Market,
    /// Fill at the given level or better
    Limit,
    /// Fill against a quote id
    Quote,
}

/// Type of a working order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkingOrderType {
    /// Triggers at the level or better
    Limit,
    /// Triggers once the level is breached
    Stop,
}

/// Lifetime of a working order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Remains until cancelled
    GoodTillCancelled,
    /// Remains until `goodTillDate`
    GoodTillDate,
}

/// Price history resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum Resolution {
    Second,
    Minute,
    #[serde(rename = "MINUTE_2")]
    Minute2,
    #[serde(rename = "MINUTE_3")]
    Minute3,
    #[serde(rename = "MINUTE_5")]
    Minute5,
    #[serde(rename = "MINUTE_10")]
    Minute10,
    #[serde(rename = "MINUTE_15")]
    Minute15,
    #[serde(rename = "MINUTE_30")]
    Minute30,
    Hour,
    #[serde(rename = "HOUR_2")]
    Hour2,
    #[serde(rename = "HOUR_3")]
    Hour3,
    #[serde(rename = "HOUR_4")]
    Hour4,
    Day,
    Week,
    Month,
}

impl Resolution {
    /// Path segment used by the prices endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Second => "SECOND",
            Resolution::Minute => "MINUTE",
            Resolution::Minute2 => "MINUTE_2",
            Resolution::Minute3 => "MINUTE_3",
            Resolution::Minute5 => "MINUTE_5",
            Resolution::Minute10 => "MINUTE_10",
            Resolution::Minute15 => "MINUTE_15",
            Resolution::Minute30 => "MINUTE_30",
            Resolution::Hour => "HOUR",
            Resolution::Hour2 => "HOUR_2",
            Resolution::Hour3 => "HOUR_3",
            Resolution::Hour4 => "HOUR_4",
            Resolution::Day => "DAY",
            Resolution::Week => "WEEK",
            Resolution::Month => "MONTH",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter for the transaction history endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Every transaction
    All,
    /// Deal-related transactions only
    AllDeal,
    /// Deposits
    Deposit,
    /// Withdrawals
    Withdrawal,
}

impl TransactionType {
    /// Path segment used by the history endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::All => "ALL",
            TransactionType::AllDeal => "ALL_DEAL",
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a client application (API key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    /// Key accepts requests
    Enabled,
    /// Key disabled, can be re-enabled
    Disabled,
    /// Key permanently revoked
    Revoked,
}
