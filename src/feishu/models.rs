//! Wire types for the Feishu Open Platform endpoints.

use crate::page::ProductRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of the tenant token request.
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub app_id: &'a str,
    pub app_secret: &'a str,
}

/// Reply of the tenant token endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub tenant_access_token: String,
    /// Token lifetime in seconds
    #[serde(default)]
    pub expire: u64,
}

/// A token issued by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub token: String,
    pub expire_secs: u64,
}

/// Generic `{code, msg}` envelope returned by the table API.
#[derive(Debug, Default, Deserialize)]
pub struct ApiResponse {
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiResponse {
    /// True if the API reported success.
    pub fn is_ok(&self) -> bool {
        self.code == Some(0)
    }

    /// The most specific error text the API gave, if any.
    pub fn error_message(&self) -> Option<&str> {
        [self.msg.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|m| !m.is_empty())
    }
}

/// One row of a batch-create request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFields {
    pub fields: Map<String, Value>,
}

/// Body of the batch-create request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchCreateRequest {
    pub records: Vec<RecordFields>,
}

impl BatchCreateRequest {
    /// Maps each record's product ID and cover into the configured columns.
    pub fn from_records(records: &[ProductRecord], field_product_id: &str, field_cover: &str) -> Self {
        let records = records
            .iter()
            .map(|record| {
                let mut fields = Map::new();
                fields.insert(field_product_id.to_string(), Value::String(record.product_id.clone()));
                fields.insert(field_cover.to_string(), Value::String(record.cover.clone()));
                RecordFields { fields }
            })
            .collect();

        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
