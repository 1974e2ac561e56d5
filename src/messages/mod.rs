//! Request/reply message contract between the CLI front end, the page
//! scraper and the sync pipeline.
//!
//! Requests travel as `{"type": "...", "payload": ...}`; every request gets
//! exactly one `{"ok": bool, "data"?: ..., "message"?: ...}` reply.

pub mod router;

use crate::feishu::SyncOutcome;
use crate::page::{CollectionCache, ProductRecord};
use crate::settings::{SettingsPatch, SyncSettings};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub use router::{MessageRouter, RouterHandle};

/// A request understood by the router.
///
/// A missing or null `payload` reads as `{}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    /// Scan the page and return the products found.
    CollectProducts,
    /// Return the last scan result without rescanning.
    ReadCache,
    /// Merge a partial update into the stored settings.
    SaveSettings(SettingsPatch),
    /// Return the stored settings.
    LoadSettings,
    /// Upload records to the configured table.
    SyncToFeishu(SyncPayload),
}

impl Request {
    /// Wire name of the request type.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::CollectProducts => "COLLECT_PRODUCTS",
            Request::ReadCache => "READ_CACHE",
            Request::SaveSettings(_) => "SAVE_SETTINGS",
            Request::LoadSettings => "LOAD_SETTINGS",
            Request::SyncToFeishu(_) => "SYNC_TO_FEISHU",
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum RequestKind {
    CollectProducts,
    ReadCache,
    SaveSettings,
    LoadSettings,
    SyncToFeishu,
}

#[derive(Deserialize)]
struct RawRequest {
    #[serde(rename = "type")]
    kind: RequestKind,
    #[serde(default)]
    payload: Value,
}

impl<'de> Deserialize<'de> for Request {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawRequest::deserialize(deserializer)?;
        let payload = match raw.payload {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        let request = match raw.kind {
            RequestKind::CollectProducts => Request::CollectProducts,
            RequestKind::ReadCache => Request::ReadCache,
            RequestKind::LoadSettings => Request::LoadSettings,
            RequestKind::SaveSettings => {
                Request::SaveSettings(serde_json::from_value(payload).map_err(serde::de::Error::custom)?)
            }
            RequestKind::SyncToFeishu => {
                Request::SyncToFeishu(serde_json::from_value(payload).map_err(serde::de::Error::custom)?)
            }
        };
        Ok(request)
    }
}

/// Payload of [`Request::SyncToFeishu`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    #[serde(default)]
    pub records: Vec<ProductRecord>,
}

/// Data carried by a successful reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Products(Vec<ProductRecord>),
    Cache(CollectionCache),
    Settings(SyncSettings),
    Synced(SyncOutcome),
}

/// Reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    pub fn success(data: Payload) -> Self {
        Self { ok: true, data: Some(data), message: None }
    }

    /// Failed reply; an empty message becomes "unknown error".
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() { "unknown error".to_string() } else { message };
        Self { ok: false, data: None, message: Some(message) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_unit_requests() {
        let req: Request = serde_json::from_str(r#"{"type":"COLLECT_PRODUCTS"}"#).unwrap();
        assert_eq!(req, Request::CollectProducts);

        let req: Request = serde_json::from_str(r#"{"type":"READ_CACHE"}"#).unwrap();
        assert_eq!(req.kind(), "READ_CACHE");
    }

    #[test]
    fn test_parse_save_settings() {
        let req: Request = serde_json::from_value(json!({
            "type": "SAVE_SETTINGS",
            "payload": { "tableId": "t1" }
        }))
        .unwrap();

        match req {
            Request::SaveSettings(patch) => {
                assert_eq!(patch.table_id.as_deref(), Some("t1"));
                assert!(patch.app_id.is_none());
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_parse_sync_payload() {
        let req: Request = serde_json::from_value(json!({
            "type": "SYNC_TO_FEISHU",
            "payload": { "records": [ { "productId": "1234567", "cover": "https://img/a.jpg" } ] }
        }))
        .unwrap();

        let Request::SyncToFeishu(payload) = req else {
            panic!("expected SYNC_TO_FEISHU");
        };
        assert_eq!(payload.records, vec![ProductRecord::new("1234567", "https://img/a.jpg")]);
    }

    #[test]
    fn test_missing_payload_reads_as_empty_object() {
        let req: Request = serde_json::from_str(r#"{"type":"SAVE_SETTINGS"}"#).unwrap();
        assert_eq!(req, Request::SaveSettings(SettingsPatch::default()));

        let req: Request = serde_json::from_str(r#"{"type":"SYNC_TO_FEISHU","payload":null}"#).unwrap();
        assert_eq!(req, Request::SyncToFeishu(SyncPayload::default()));
    }

    #[test]
    fn test_serialized_request_parses_back() {
        let req = Request::SaveSettings(SettingsPatch { table_id: Some("t9".to_string()), ..Default::default() });
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({ "type": "SAVE_SETTINGS", "payload": { "tableId": "t9" } }));
        assert_eq!(serde_json::from_value::<Request>(value).unwrap(), req);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(serde_json::from_str::<Request>(r#"{"type":"DELETE_ALL"}"#).is_err());
    }

    #[test]
    fn test_response_shapes() {
        let ok = Response::success(Payload::Synced(SyncOutcome { synced: 3 }));
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({ "ok": true, "data": { "synced": 3 } }));

        let err = Response::failure("nothing to sync");
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "ok": false, "message": "nothing to sync" })
        );
    }

    #[test]
    fn test_failure_defaults_message() {
        assert_eq!(Response::failure("").message.as_deref(), Some("unknown error"));
    }

    #[test]
    fn test_cache_payload_is_camel_case() {
        let cache = CollectionCache { records: vec![], last_updated: 42 };
        let value = serde_json::to_value(Response::success(Payload::Cache(cache))).unwrap();
        assert_eq!(value["data"]["lastUpdated"], 42);
    }
}
