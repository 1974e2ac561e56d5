//! CLI command implementations.
//!
//! Every command talks to a spawned [`MessageRouter`] through a
//! [`RouterHandle`], the same way the page and settings front ends do.

pub mod collect;
pub mod serve;
pub mod settings;
pub mod sync;

pub use collect::CollectCommand;
pub use serve::ServeCommand;
pub use settings::SettingsCommand;
pub use sync::SyncCommand;

use crate::config::Config;
use crate::feishu::FeishuClient;
use crate::messages::{MessageRouter, RouterHandle};
use crate::page::{FilePage, HttpPage, PageScraper, PageSource};
use crate::settings::FileSettingsStore;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Where the product page comes from.
#[derive(Debug, Clone, Default)]
pub struct PageTarget {
    /// Page URL; fetched unless `html` is given, then used to resolve links
    pub url: Option<String>,
    /// Saved copy of the page
    pub html: Option<PathBuf>,
}

impl PageTarget {
    pub fn new(url: Option<String>, html: Option<PathBuf>) -> Self {
        Self { url, html }
    }

    /// True if neither a URL nor a file was given.
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.html.is_none()
    }

    /// Builds the page source for this target, if any.
    pub fn source(&self, config: &Config) -> Result<Option<Arc<dyn PageSource>>> {
        match (&self.html, &self.url) {
            (Some(path), url) => {
                debug!("Using saved page {}", path.display());
                let url = url.clone().unwrap_or_default();
                let page: Arc<dyn PageSource> = Arc::new(FilePage::new(path.clone(), url));
                Ok(Some(page))
            }
            (None, Some(url)) => {
                let page: Arc<dyn PageSource> = Arc::new(
                    HttpPage::new(config, url.clone()).context("Failed to create HTTP client")?,
                );
                Ok(Some(page))
            }
            (None, None) => Ok(None),
        }
    }
}

/// Wires the file-backed settings store, the Feishu client and an optional
/// page into a running router.
pub fn spawn_router(config: &Config, target: &PageTarget) -> Result<RouterHandle> {
    let store = Arc::new(FileSettingsStore::new(config.settings_file()));
    debug!("Settings file: {}", store.path().display());

    let api = Arc::new(FeishuClient::new(config).context("Failed to create Feishu client")?);
    let scraper = target.source(config)?.map(|source| Arc::new(PageScraper::new(source)));

    Ok(MessageRouter::new(scraper, store, api).spawn())
}
