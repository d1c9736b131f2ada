//! Error types for the IG dealing API client.
//!
//! Every failure mode the client can report is a variant of [`Error`].
//! Note that HTTP-level rejections of mutating deal requests are *not*
//! errors: they come back as [`DealOutcome::Rejected`](crate::DealOutcome)
//! with the broker's body preserved verbatim.

use thiserror::Error;

/// A specialized `Result` type for IG operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for all IG API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration, or an authenticated call attempted before login.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response body could not be parsed as JSON.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The body parsed but carries a broker business error code.
    #[error("Broker error: {code}")]
    Broker {
        /// Broker error code, verbatim (e.g. `error.security.invalid-client-token`)
        code: String,
    },

    /// The broker answered without a header the session protocol requires.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Flattening would overwrite an existing column.
    #[error(
        "Column collision: '{field}' from '{parent}' already exists{}",
        schema_suffix(.schema_version)
    )]
    SchemaCollision {
        /// Output column that already exists
        field: String,
        /// Nested column the field was promoted from
        parent: String,
        /// Schema version tag of the flatten spec, if declared
        schema_version: Option<String>,
    },

    /// A nested column named by a flatten spec is not present in the table.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid input provided to a function
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Still rate limited after the retry policy gave up
    #[error("Rate limited after {attempts} attempt(s)")]
    RateLimited {
        /// Number of transport calls made
        attempts: u32,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}

fn schema_suffix(version: &Option<String>) -> String {
    version
        .as_deref()
        .map(|v| format!(" (schema {v})"))
        .unwrap_or_default()
}

impl Error {
    /// Returns `true` if this error is potentially transient and the
    /// operation could be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Http(_) | Error::RateLimited { .. })
    }

    /// Returns `true` if this is an authentication-related error.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::Protocol(_) => true,
            Error::Broker { code } => code.starts_with("error.security."),
            _ => false,
        }
    }

    /// Returns `true` if the caller can fix the problem and call again.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::InvalidInput(_) | Error::Broker { .. }
        )
    }

    /// The broker's error code, if this is a broker error.
    pub fn broker_code(&self) -> Option<&str> {
        match self {
            Error::Broker { code } => Some(code),
            _ => None,
        }
    }
}
