//! Collect command implementation.

use super::{spawn_router, PageTarget};
use crate::config::Config;
use crate::format::Formatter;
use crate::messages::{Payload, Request, RouterHandle};
use crate::page::ProductRecord;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Scans a page for product cards.
pub struct CollectCommand {
    config: Config,
}

impl CollectCommand {
    /// Creates a new collect command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Collects from `target` and returns formatted output.
    pub async fn execute(&self, target: &PageTarget, out: Option<PathBuf>) -> Result<String> {
        if target.is_empty() {
            anyhow::bail!("Pass --url or --html to choose the page to collect from");
        }

        let router = spawn_router(&self.config, target)?;
        self.execute_with_router(&router, out.as_deref()).await
    }

    /// Collects through a running router (for testing).
    pub async fn execute_with_router(&self, router: &RouterHandle, out: Option<&Path>) -> Result<String> {
        let records = collect_records(router).await?;

        if let Some(path) = out {
            save_records(path, &records).await?;
            info!("Saved {} records to {}", records.len(), path.display());
        }

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_records(&records))
    }
}

/// Asks the router to scan the page.
pub(crate) async fn collect_records(router: &RouterHandle) -> Result<Vec<ProductRecord>> {
    match router.call(Request::CollectProducts).await? {
        Payload::Products(records) => Ok(records),
        other => anyhow::bail!("Unexpected reply to COLLECT_PRODUCTS: {:?}", other),
    }
}

/// Writes records as a JSON array.
pub async fn save_records(path: &Path, records: &[ProductRecord]) -> Result<()> {
    let content = serde_json::to_string_pretty(records).context("Failed to encode records")?;
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Reads records previously saved with [`save_records`].
pub async fn load_records(path: &Path) -> Result<Vec<ProductRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid records file {}", path.display()))
}
