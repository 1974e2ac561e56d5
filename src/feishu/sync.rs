//! Token refresh and batched upload of product records.

use super::client::FeishuApi;
use super::models::BatchCreateRequest;
use crate::clock::now_millis;
use crate::error::{PipelineError, Result};
use crate::page::ProductRecord;
use crate::settings::{SettingsPatch, SettingsStore, SyncSettings};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Records sent per batch-create request.
pub const BATCH_SIZE: usize = 10;

/// Result of a completed sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub synced: usize,
}

/// Pushes records to a Bitable table, refreshing the tenant token as needed.
pub struct SyncOrchestrator {
    store: Arc<dyn SettingsStore>,
    api: Arc<dyn FeishuApi>,
}

impl SyncOrchestrator {
    pub fn new(store: Arc<dyn SettingsStore>, api: Arc<dyn FeishuApi>) -> Self {
        Self { store, api }
    }

    /// The settings store this orchestrator reads and updates.
    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Returns settings carrying a usable bearer token.
    pub async fn ensure_token(&self, settings: SyncSettings) -> Result<SyncSettings> {
        self.ensure_token_at(settings, now_millis()).await
    }

    /// Same as [`ensure_token`](Self::ensure_token) with an explicit clock.
    pub async fn ensure_token_at(&self, settings: SyncSettings, now_ms: u64) -> Result<SyncSettings> {
        if !settings.has_app_credentials() {
            if settings.tenant_access_token.is_empty() {
                return Err(PipelineError::Configuration(
                    "missing credentials: fill in appId and appSecret, or paste a tenant access token"
                        .to_string(),
                ));
            }
            debug!("No app credentials, using the supplied tenant token");
            return Ok(settings);
        }

        if settings.token_valid_at(now_ms) {
            debug!("Reusing cached tenant token");
            return Ok(settings);
        }

        info!("Refreshing tenant access token");
        let grant = self.api.tenant_access_token(&settings.app_id, &settings.app_secret).await?;

        let expired_at = now_ms.saturating_add(grant.expire_secs.saturating_mul(1000));
        let patch = SettingsPatch::token(grant.token, expired_at);

        // Persist first so later calls reuse the token
        if let Err(e) = self.store.save(patch.clone()).await {
            warn!("Failed to persist refreshed token: {}", e);
            return Err(e);
        }

        Ok(settings.merged(patch))
    }

    /// Uploads `records` in batches of [`BATCH_SIZE`], strictly one after another.
    ///
    /// The first failing batch aborts the sync. Batches already accepted stay
    /// in the table.
    pub async fn sync_to_feishu(&self, records: &[ProductRecord]) -> Result<SyncOutcome> {
        if records.is_empty() {
            return Err(PipelineError::Validation("nothing to sync".to_string()));
        }

        let settings = self.ensure_token(self.store.load().await).await?;

        let missing = settings.missing_table_fields();
        if !missing.is_empty() {
            return Err(PipelineError::Configuration(format!(
                "missing settings: {}",
                missing.join(", ")
            )));
        }

        let total_batches = records.len().div_ceil(BATCH_SIZE);
        info!("Syncing {} records in {} batches", records.len(), total_batches);

        for (index, chunk) in records.chunks(BATCH_SIZE).enumerate() {
            let request =
                BatchCreateRequest::from_records(chunk, &settings.field_product_id, &settings.field_cover);

            debug!("Sending batch {}/{} ({} records)", index + 1, total_batches, request.len());

            self.api
                .batch_create(
                    &settings.tenant_access_token,
                    &settings.app_token,
                    &settings.table_id,
                    &request,
                )
                .await?;
        }

        info!("Synced {} records", records.len());
        Ok(SyncOutcome { synced: records.len() })
    }
}
