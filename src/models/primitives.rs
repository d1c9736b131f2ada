//! Primitive types and newtypes for type-safe API interactions.
//!
//! This module provides strongly-typed wrappers around the broker's string
//! identifiers so that an epic can never be passed where a deal id is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// A strongly-typed account id.
    ///
    /// # Example
    ///
    /// ```
    /// use ig_dealing_rs::AccountId;
    ///
    /// let account = AccountId::new("ABC123");
    /// println!("Account: {}", account);
    /// ```
    AccountId
);

string_id!(
    /// The broker's unique identifier for a tradeable instrument
    /// (e.g. `"CS.D.GBPUSD.TODAY.IP"`).
    Epic
);

string_id!(
    /// Permanent identifier of an open position or working order.
    DealId
);

string_id!(
    /// Provisional identifier returned by a mutating deal request, exchanged
    /// for a deal confirmation.
    DealReference
);

string_id!(
    /// Identifier of a watchlist.
    WatchlistId
);

/// Which IG platform to talk to.
///
/// # Example
///
/// ```
/// use ig_dealing_rs::AccountType;
///
/// let account_type: AccountType = "DEMO".parse().unwrap();
/// assert_eq!(account_type.api_base_url(), "https://demo-api.ig.com/gateway/deal");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountType {
    /// Live dealing with real money.
    #[default]
    Live,
    /// Demo platform.
    Demo,
}

impl AccountType {
    /// Get the base URL for REST API requests.
    pub fn api_base_url(&self) -> &'static str {
        match self {
            AccountType::Live => "https://api.ig.com/gateway/deal",
            AccountType::Demo => "https://demo-api.ig.com/gateway/deal",
        }
    }

    /// Returns `true` if this is the live platform.
    pub fn is_live(&self) -> bool {
        matches!(self, AccountType::Live)
    }
}

impl FromStr for AccountType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(AccountType::Live),
            "demo" => Ok(AccountType::Demo),
            other => Err(crate::Error::Config(format!(
                "Invalid account type '{}', expected LIVE or DEMO",
                other
            ))),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::Live => write!(f, "live"),
            AccountType::Demo => write!(f, "demo"),
        }
    }
}
