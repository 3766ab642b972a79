use crate::error::{FetchError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://reddit.com/r/haiku/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const URL_SUFFIX: &str = ".json";

/// Settings for the content fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("tercet/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Issues one bounded GET per reference and hands back the whole body.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_config(FetcherConfig::default())
    }

    pub fn with_config(config: FetcherConfig) -> Self {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    pub fn with_timeout(self, timeout_secs: u64) -> Self {
        let mut config = self.config;
        config.connect_timeout = Duration::from_secs(timeout_secs);
        config.read_timeout = Duration::from_secs(timeout_secs);
        Self::with_config(config)
    }

    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        let mut config = self.config;
        config.base_url = base_url.into();
        Self::with_config(config)
    }

    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        let mut config = self.config;
        config.user_agent = user_agent.into();
        Self::with_config(config)
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// `<base><reference>.json`, validated as a URL.
    pub fn reference_url(&self, reference: &str) -> Result<Url> {
        let raw = format!("{}{}{}", self.config.base_url, reference, URL_SUFFIX);
        Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    /// Fetch the raw body for a reference. Anything but a 200 is a failure.
    pub async fn fetch(&self, reference: &str) -> Result<String> {
        let url = self.reference_url(reference)?;
        info!("Fetching {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            e
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("{} answered with status {}", url, status);
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}
