//! Persisted sync settings: credentials, target table, field mapping and
//! the cached tenant token.

pub mod store;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use store::{FileSettingsStore, MemorySettingsStore, STORAGE_KEY};

/// Default column receiving the product ID.
pub const DEFAULT_FIELD_PRODUCT_ID: &str = "商品ID";

/// Default column receiving the cover image URL.
pub const DEFAULT_FIELD_COVER: &str = "主图";

/// A cached token is reused only while it stays valid this much longer.
pub const TOKEN_SAFETY_MARGIN_MS: u64 = 60 * 1000;

/// Settings used by the sync pipeline.
///
/// Missing fields in stored data take their default, so older or partial
/// documents still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    /// App ID for the tenant token endpoint
    pub app_id: String,
    /// App secret for the tenant token endpoint
    pub app_secret: String,
    /// Bitable app token (the base)
    pub app_token: String,
    /// Table inside the base
    pub table_id: String,
    /// Column that receives the product ID
    pub field_product_id: String,
    /// Column that receives the cover URL
    pub field_cover: String,
    /// Cached or manually supplied bearer token
    pub tenant_access_token: String,
    /// Absolute token expiry in epoch milliseconds, 0 if unknown
    pub token_expired_at: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            app_token: String::new(),
            table_id: String::new(),
            field_product_id: DEFAULT_FIELD_PRODUCT_ID.to_string(),
            field_cover: DEFAULT_FIELD_COVER.to_string(),
            tenant_access_token: String::new(),
            token_expired_at: 0,
        }
    }
}

impl SyncSettings {
    /// Returns the settings with every field present in `patch` replaced.
    pub fn merged(mut self, patch: SettingsPatch) -> Self {
        if let Some(v) = patch.app_id {
            self.app_id = v;
        }
        if let Some(v) = patch.app_secret {
            self.app_secret = v;
        }
        if let Some(v) = patch.app_token {
            self.app_token = v;
        }
        if let Some(v) = patch.table_id {
            self.table_id = v;
        }
        if let Some(v) = patch.field_product_id {
            self.field_product_id = v;
        }
        if let Some(v) = patch.field_cover {
            self.field_cover = v;
        }
        if let Some(v) = patch.tenant_access_token {
            self.tenant_access_token = v;
        }
        if let Some(v) = patch.token_expired_at {
            self.token_expired_at = v;
        }
        self
    }

    /// True if both app credentials are filled in.
    pub fn has_app_credentials(&self) -> bool {
        !self.app_id.is_empty() && !self.app_secret.is_empty()
    }

    /// True if the cached token outlives `now_ms` by more than the safety margin.
    pub fn token_valid_at(&self, now_ms: u64) -> bool {
        !self.tenant_access_token.is_empty()
            && self.token_expired_at > 0
            && self.token_expired_at.saturating_sub(TOKEN_SAFETY_MARGIN_MS) > now_ms
    }

    /// Names of the table settings that are still empty.
    pub fn missing_table_fields(&self) -> Vec<&'static str> {
        [
            ("appToken", &self.app_token),
            ("tableId", &self.table_id),
            ("fieldProductId", &self.field_product_id),
            ("fieldCover", &self.field_cover),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Partial settings update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expired_at: Option<u64>,
}

impl SettingsPatch {
    /// Patch that stores a freshly issued token.
    pub fn token(token: impl Into<String>, expired_at: u64) -> Self {
        Self {
            tenant_access_token: Some(token.into()),
            token_expired_at: Some(expired_at),
            ..Self::default()
        }
    }

    /// True if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Persistent settings storage, injected wherever settings are needed.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns the stored settings over the defaults. Never fails: missing
    /// or unreadable data yields defaults.
    async fn load(&self) -> SyncSettings;

    /// Shallow-merges `patch` onto the stored settings, persists and returns
    /// the result. Last write wins.
    async fn save(&self, patch: SettingsPatch) -> Result<SyncSettings>;
}
