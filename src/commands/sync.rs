//! Sync command implementation.

use super::collect::{collect_records, load_records};
use super::{spawn_router, PageTarget};
use crate::config::Config;
use crate::format::Formatter;
use crate::messages::{Payload, Request, RouterHandle, SyncPayload};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Collects products (or loads a saved list) and uploads them to Feishu.
pub struct SyncCommand {
    config: Config,
}

impl SyncCommand {
    /// Creates a new sync command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the sync and returns formatted output.
    pub async fn execute(&self, target: &PageTarget, records: Option<PathBuf>) -> Result<String> {
        if target.is_empty() && records.is_none() {
            anyhow::bail!("Pass --url/--html to collect, or --records to sync a saved list");
        }

        let router = spawn_router(&self.config, target)?;
        self.execute_with_router(&router, records.as_deref()).await
    }

    /// Runs the sync through a running router (for testing).
    pub async fn execute_with_router(
        &self,
        router: &RouterHandle,
        records_file: Option<&Path>,
    ) -> Result<String> {
        let records = match records_file {
            Some(path) => load_records(path).await?,
            None => collect_records(router).await?,
        };

        info!("Syncing {} collected records", records.len());

        let outcome = match router.call(Request::SyncToFeishu(SyncPayload { records })).await? {
            Payload::Synced(outcome) => outcome,
            other => anyhow::bail!("Unexpected reply to SYNC_TO_FEISHU: {:?}", other),
        };

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_synced(&outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::collect::save_records;
    use crate::error::{PipelineError, Result as PipelineResult};
    use crate::feishu::{BatchCreateRequest, FeishuApi, TokenGrant};
    use crate::messages::MessageRouter;
    use crate::page::{PageScraper, PageSnapshot, PageSource, ProductRecord};
    use crate::settings::{MemorySettingsStore, SyncSettings};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct GridPage(usize);

    #[async_trait]
    impl PageSource for GridPage {
        async fn snapshot(&self) -> PipelineResult<PageSnapshot> {
            let html: String = (0..self.0)
                .map(|i| format!(r#"<div data-note-id="{}"><img src="/c/{}.jpg"></div>"#, 5_000_000 + i, i))
                .collect();
            Ok(PageSnapshot { url: "https://www.example.com/".to_string(), html })
        }

        fn url(&self) -> &str {
            "https://www.example.com/"
        }
    }

    #[derive(Default)]
    struct RecordingApi {
        batches: AtomicU32,
        records: AtomicU32,
        reject: bool,
    }

    #[async_trait]
    impl FeishuApi for RecordingApi {
        async fn tenant_access_token(&self, _: &str, _: &str) -> PipelineResult<TokenGrant> {
            Ok(TokenGrant { token: "t-1".to_string(), expire_secs: 7200 })
        }

        async fn batch_create(
            &self,
            _: &str,
            _: &str,
            _: &str,
            request: &BatchCreateRequest,
        ) -> PipelineResult<()> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                return Err(PipelineError::Sync("TableIdNotFound".to_string()));
            }
            self.records.fetch_add(request.len() as u32, Ordering::SeqCst);
            Ok(())
        }
    }

    fn settings() -> SyncSettings {
        SyncSettings {
            app_id: "cli_1".to_string(),
            app_secret: "s".to_string(),
            app_token: "bascn".to_string(),
            table_id: "tbl".to_string(),
            ..SyncSettings::default()
        }
    }

    fn router(cards: usize, api: Arc<RecordingApi>) -> RouterHandle {
        let scraper = Arc::new(PageScraper::new(Arc::new(GridPage(cards))));
        let store = Arc::new(MemorySettingsStore::with_settings(settings()));
        MessageRouter::new(Some(scraper), store, api).spawn()
    }

    #[tokio::test]
    async fn test_sync_collected_records() {
        let api = Arc::new(RecordingApi::default());
        let cmd = SyncCommand::new(Config::default());

        let output = cmd.execute_with_router(&router(23, api.clone()), None).await.unwrap();

        assert_eq!(output, "Synced 23 records to Feishu.");
        assert_eq!(api.batches.load(Ordering::SeqCst), 3);
        assert_eq!(api.records.load(Ordering::SeqCst), 23);
    }

    #[tokio::test]
    async fn test_sync_saved_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        let records: Vec<_> =
            (0..4).map(|i| ProductRecord::new(format!("{}", 3_000_000 + i), "https://img/x.jpg")).collect();
        save_records(&path, &records).await.unwrap();

        let api = Arc::new(RecordingApi::default());
        let cmd = SyncCommand::new(Config::default());
        cmd.execute_with_router(&router(0, api.clone()), Some(&path)).await.unwrap();

        assert_eq!(api.records.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_sync_empty_page_fails() {
        let api = Arc::new(RecordingApi::default());
        let cmd = SyncCommand::new(Config::default());

        let err = cmd.execute_with_router(&router(0, api.clone()), None).await.unwrap_err();

        assert_eq!(err.to_string(), "nothing to sync");
        assert_eq!(api.batches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sync_surfaces_remote_message() {
        let api = Arc::new(RecordingApi { reject: true, ..RecordingApi::default() });
        let cmd = SyncCommand::new(Config::default());

        let err = cmd.execute_with_router(&router(15, api.clone()), None).await.unwrap_err();

        assert_eq!(err.to_string(), "TableIdNotFound");
        assert_eq!(api.batches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sync_requires_input() {
        let cmd = SyncCommand::new(Config::default());
        assert!(cmd.execute(&PageTarget::default(), None).await.is_err());
    }
}
