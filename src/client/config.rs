//! Client configuration options.

use std::time::Duration;

use crate::models::AccountId;

/// Configuration for the IG client.
///
/// # Example
///
/// ```
/// use ig_dealing_rs::{ClientConfig, RetryConfig};
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(10))
///     .with_user_agent("my-app/1.0")
///     .with_retry(RetryConfig::default().with_max_attempts(5));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
    /// Rate-limit retry policy; `None` sends every request exactly once
    pub retry: Option<RetryConfig>,
    /// Override of the platform base URL
    pub base_url: Option<String>,
    /// Account to switch into right after login
    pub account_id: Option<AccountId>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("ig-dealing-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
            retry: Some(RetryConfig::default()),
            base_url: None,
            account_id: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Disable rate-limit retries.
    pub fn without_retry(mut self) -> Self {
        self.retry = None;
        self
    }

    /// Send requests to a different base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Switch into this account after login.
    pub fn with_account(mut self, account_id: impl Into<AccountId>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}

/// How the wait between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Always wait the initial backoff
    Fixed,
    /// Double the wait after every attempt
    #[default]
    Exponential,
}

/// Configuration for retrying rate-limited requests.
///
/// Only a rate-limit signal triggers a retry; every other response is
/// returned to the caller after the first attempt.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Wait before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for any single wait
    pub max_backoff: Duration,
    /// Wait strategy
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
            backoff: Backoff::Exponential,
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of attempts.
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max.max(1);
        self
    }

    /// Set the initial backoff duration.
    pub fn with_initial_backoff(mut self, duration: Duration) -> Self {
        self.initial_backoff = duration;
        self
    }

    /// Set the maximum backoff duration.
    pub fn with_max_backoff(mut self, duration: Duration) -> Self {
        self.max_backoff = duration;
        self
    }

    /// Set the wait strategy.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Calculate the wait after the given (zero-based) failed attempt.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let initial = self.initial_backoff.as_millis() as u64;
        let millis = match self.backoff {
            Backoff::Fixed => initial,
            Backoff::Exponential => initial.saturating_mul(2u64.saturating_pow(attempt)),
        };
        Duration::from_millis(millis.min(self.max_backoff.as_millis() as u64))
    }
}
