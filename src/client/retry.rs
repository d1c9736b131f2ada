//! Retrying rate-limited transport calls.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::warn;

use super::config::RetryConfig;
use super::response::error_code;
use super::transport::ApiResponse;
use crate::{Error, Result};

/// Error codes the broker uses when an allowance is exhausted.
const RATE_LIMIT_CODE_PREFIX: &str = "error.public-api.exceeded-";

/// Returns `true` if the response signals a rate limit: HTTP 429, or a
/// body carrying an `error.public-api.exceeded-*` code.
pub fn is_rate_limited(response: &ApiResponse) -> bool {
    if response.status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .as_ref()
        .and_then(error_code)
        .is_some_and(|code| code.starts_with(RATE_LIMIT_CODE_PREFIX))
}

/// Executes a transport call under a [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct Retryer {
    config: RetryConfig,
    sleep: fn(Duration),
}

impl Retryer {
    /// A retryer that blocks the current thread between attempts.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            sleep: std::thread::sleep,
        }
    }

    #[cfg(test)]
    fn without_sleep(config: RetryConfig) -> Self {
        Self {
            config,
            sleep: |_| {},
        }
    }

    /// The policy in use.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `call`, repeating it while the response is rate limited.
    ///
    /// Transport errors are returned immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RateLimited`] when the last allowed attempt is
    /// still rate limited.
    pub fn execute<F>(&self, mut call: F) -> Result<ApiResponse>
    where
        F: FnMut() -> Result<ApiResponse>,
    {
        let mut attempt = 0;
        loop {
            let response = call()?;
            attempt += 1;
            if !is_rate_limited(&response) {
                return Ok(response);
            }
            if attempt >= self.config.max_attempts {
                return Err(Error::RateLimited { attempts: attempt });
            }

            let wait = self.config.backoff_for_attempt(attempt - 1);
            warn!(attempt, wait_ms = wait.as_millis() as u64, "Rate limited, retrying");
            (self.sleep)(wait);
        }
    }
}
