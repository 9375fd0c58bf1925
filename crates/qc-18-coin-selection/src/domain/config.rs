//! Selection engine configuration from defaults or environment variables.

use super::errors::SelectionError;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default number of claim attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 8;
/// Default backoff base in milliseconds.
pub const DEFAULT_BASE_SLEEP_MS: u64 = 100;
/// Default backoff cap in milliseconds (the un-jittered delay is capped at half of it).
pub const DEFAULT_RETRY_CAP_MS: u64 = 2000;
/// Default query page size.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Configuration for the selection engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Attempts before giving up with `InsufficientFunds`.
    pub max_retries: u32,
    /// Backoff base delay in milliseconds.
    pub base_sleep_ms: u64,
    /// Backoff cap in milliseconds.
    pub retry_cap_ms: u64,
    /// Outputs fetched per backend page.
    pub page_size: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_sleep_ms: DEFAULT_BASE_SLEEP_MS,
            retry_cap_ms: DEFAULT_RETRY_CAP_MS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SelectionConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_SELECTION_MAX_RETRIES`: Attempts per claim (default: 8)
    /// - `QC_SELECTION_BASE_SLEEP_MS`: Backoff base (default: 100)
    /// - `QC_SELECTION_RETRY_CAP_MS`: Backoff cap (default: 2000)
    /// - `QC_SELECTION_PAGE_SIZE`: Backend page size (default: 200)
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            max_retries: parse_env("QC_SELECTION_MAX_RETRIES").unwrap_or(DEFAULT_MAX_RETRIES),
            base_sleep_ms: parse_env("QC_SELECTION_BASE_SLEEP_MS").unwrap_or(DEFAULT_BASE_SLEEP_MS),
            retry_cap_ms: parse_env("QC_SELECTION_RETRY_CAP_MS").unwrap_or(DEFAULT_RETRY_CAP_MS),
            page_size: parse_env("QC_SELECTION_PAGE_SIZE").unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Builder: set the attempt count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Builder: set the backoff base and cap.
    pub fn with_backoff(mut self, base_sleep_ms: u64, retry_cap_ms: u64) -> Self {
        self.base_sleep_ms = base_sleep_ms;
        self.retry_cap_ms = retry_cap_ms;
        self
    }

    /// Builder: set the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), SelectionError> {
        if self.max_retries == 0 {
            return Err(SelectionError::InvalidConfig(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(SelectionError::InvalidConfig(
                "page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Upper bound of any single backoff delay.
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis((self.retry_cap_ms / 2).saturating_mul(2))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
