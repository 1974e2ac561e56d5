//! Page sources: where the collector gets its DOM snapshot from.

use crate::config::Config;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Raw HTML of a page plus the URL it was loaded from.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

/// Trait for obtaining the current page - enables mocking for tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Loads the page as it currently is.
    async fn snapshot(&self) -> Result<PageSnapshot>;

    /// URL of the target page.
    fn url(&self) -> &str;
}

/// Fetches a live page over HTTP with browser impersonation.
pub struct HttpPage {
    client: Client,
    url: String,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl HttpPage {
    /// Creates a page source for `url` with the given configuration.
    pub fn new(config: &Config, url: impl Into<String>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    /// Adds a random delay to mimic human behavior.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl PageSource for HttpPage {
    async fn snapshot(&self) -> Result<PageSnapshot> {
        self.delay().await;

        info!("Loading page: {}", self.url);

        let response = self
            .client
            .get(self.url.as_str())
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .header("Sec-Ch-Ua", "\"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\"")
            .header("Sec-Ch-Ua-Mobile", "?0")
            .header("Sec-Ch-Ua-Platform", "\"macOS\"")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Sec-Fetch-User", "?1")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|e| PipelineError::DomAccess(format!("failed to load {}: {}", self.url, e)))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            warn!("Page request failed with status {}", status);
            return Err(PipelineError::DomAccess(format!(
                "{} returned status {}",
                self.url, status
            )));
        }

        // Links on the page resolve against where we ended up
        let final_url = response.uri().to_string();
        if final_url != self.url {
            debug!("Redirected to {}", final_url);
        }

        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::DomAccess(format!("failed to read page body: {}", e)))?;

        Ok(PageSnapshot { url: final_url, html })
    }

    fn url(&self) -> &str {
        &self.url
    }
}

/// Reads a page saved to disk (e.g. "Save Page As" from a browser).
pub struct FilePage {
    path: PathBuf,
    url: String,
}

impl FilePage {
    /// Creates a source for the HTML at `path`; links resolve against `url`.
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self { path: path.into(), url: url.into() }
    }
}

#[async_trait]
impl PageSource for FilePage {
    async fn snapshot(&self) -> Result<PageSnapshot> {
        debug!("Reading saved page: {}", self.path.display());

        let html = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            PipelineError::DomAccess(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        Ok(PageSnapshot { url: self.url.clone(), html })
    }

    fn url(&self) -> &str {
        &self.url
    }
}
