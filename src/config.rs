//! Client configuration
//!
//! Read from the environment (a `.env` file is honoured by the binary):
//!
//! - `TAPIOCA_REVIEW_URL`: base URL of the annotation service
//! - `TAPIOCA_REVIEW_TIMEOUT_SECS`: per-request timeout

use std::time::Duration;

use url::Url;

use crate::error::{Result, ReviewError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8457";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ReviewError::Input(format!("invalid base URL '{}': {}", base_url, e)))?;
        Ok(Self { base_url, timeout })
    }

    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("TAPIOCA_REVIEW_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = match std::env::var("TAPIOCA_REVIEW_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                ReviewError::Input(format!("invalid TAPIOCA_REVIEW_TIMEOUT_SECS '{}': {}", raw, e))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Self::new(&base_url, Duration::from_secs(timeout_secs))
    }

    /// Resolve an API path (`/api/get_doc`) against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ReviewError::Input(format!("invalid endpoint '{}': {}", path, e)))
    }
}
