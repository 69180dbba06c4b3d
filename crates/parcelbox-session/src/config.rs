use std::time::Duration;

use anyhow::Context;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the HTTP backend finds the account service.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:3112`.
    pub api_url: String,
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = std::env::var("PARCELBOX_API_URL").context("PARCELBOX_API_URL must be set")?;
        let timeout_secs = match std::env::var("PARCELBOX_API_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .context("PARCELBOX_API_TIMEOUT_SECS must be a number")?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self::new(api_url).with_timeout(Duration::from_secs(timeout_secs)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
