//! HTTP client and request pipeline for the IG dealing API.
//!
//! [`IgClient`] is the entry point. Requests go through a [`Transport`]
//! (blocking `reqwest` by default), optionally wrapped by a [`Retryer`]
//! that repeats rate-limited calls, and their bodies are parsed by
//! [`decode`].
//!
//! # Example
//!
//! ```no_run
//! use ig_dealing_rs::{AccountType, ClientConfig, IgClient, RetryConfig};
//!
//! # fn example() -> ig_dealing_rs::Result<()> {
//! let config = ClientConfig::default()
//!     .with_retry(RetryConfig::default().with_max_attempts(5))
//!     .with_account("ABC123");
//!
//! let mut client = IgClient::with_config("api-key", AccountType::Demo, config)?;
//! client.login("identifier", "password")?;
//!
//! let accounts = client.accounts().list()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod http;
mod response;
mod retry;
mod transport;

pub use config::{Backoff, ClientConfig, RetryConfig};
pub use http::IgClient;
pub use response::{decode, error_code, DecodeMode, ERROR_CODE_FIELD};
pub use retry::{is_rate_limited, Retryer};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub(crate) use http::ClientInner;
