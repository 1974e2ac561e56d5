//! HTTP client for the Feishu Open Platform (tenant token and Bitable records).

use super::models::{ApiResponse, BatchCreateRequest, TokenGrant, TokenRequest, TokenResponse};
use crate::config::{Config, DEFAULT_API_BASE};
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};
use wreq::Client;

/// Trait for the remote table API - enables mocking for tests.
#[async_trait]
pub trait FeishuApi: Send + Sync {
    /// Exchanges app credentials for a tenant access token.
    async fn tenant_access_token(&self, app_id: &str, app_secret: &str) -> Result<TokenGrant>;

    /// Creates one batch of rows in a table.
    async fn batch_create(
        &self,
        access_token: &str,
        app_token: &str,
        table_id: &str,
        request: &BatchCreateRequest,
    ) -> Result<()>;
}

/// Feishu HTTP client.
pub struct FeishuClient {
    client: Client,
    base_url: String,
}

impl FeishuClient {
    /// Creates a client from the application configuration.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_base_url(config.api_base.clone(), config.timeout_secs)
    }

    /// Creates a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: impl Into<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs a JSON body and returns the status success flag plus the raw body.
    async fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: String,
    ) -> std::result::Result<(bool, String), String> {
        debug!("POST {}", url);

        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json; charset=utf-8")
            .body(body);

        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        debug!("Response status: {}", status);

        let text = response.text().await.map_err(|e| format!("failed to read response: {}", e))?;
        Ok((status.is_success(), text))
    }
}

impl Default for FeishuClient {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_API_BASE, 30).expect("Failed to create FeishuClient")
    }
}

#[async_trait]
impl FeishuApi for FeishuClient {
    async fn tenant_access_token(&self, app_id: &str, app_secret: &str) -> Result<TokenGrant> {
        let url = format!("{}/open-apis/auth/v3/tenant_access_token/internal", self.base_url);
        let body = serde_json::to_string(&TokenRequest { app_id, app_secret })
            .map_err(|e| PipelineError::Auth(format!("failed to encode token request: {}", e)))?;

        info!("Requesting tenant access token");

        let auth_error = |msg: &str| {
            PipelineError::Auth(format!("failed to obtain tenant token: {}", msg))
        };

        let (success, text) =
            self.post_json(&url, None, body).await.map_err(|e| auth_error(e.as_str()))?;
        let data: TokenResponse = serde_json::from_str(&text).unwrap_or_default();

        if !success || data.code != Some(0) {
            let msg = data.msg.as_deref().filter(|m| !m.is_empty()).unwrap_or("unknown error");
            return Err(auth_error(msg));
        }

        if data.tenant_access_token.is_empty() {
            return Err(auth_error("response carried no token"));
        }

        Ok(TokenGrant { token: data.tenant_access_token, expire_secs: data.expire })
    }

    async fn batch_create(
        &self,
        access_token: &str,
        app_token: &str,
        table_id: &str,
        request: &BatchCreateRequest,
    ) -> Result<()> {
        let url = format!(
            "{}/open-apis/bitable/v1/apps/{}/tables/{}/records/batch_create",
            self.base_url,
            urlencoding::encode(app_token),
            urlencoding::encode(table_id)
        );
        let body = serde_json::to_string(request)
            .map_err(|e| PipelineError::Sync(format!("failed to encode records: {}", e)))?;

        let (success, text) =
            self.post_json(&url, Some(access_token), body).await.map_err(PipelineError::Sync)?;
        let data: ApiResponse = serde_json::from_str(&text).unwrap_or_default();

        if !success || !data.is_ok() {
            let msg = data.error_message().unwrap_or("sync failed");
            return Err(PipelineError::Sync(msg.to_string()));
        }

        debug!("Created {} records", request.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ProductRecord;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN_PATH: &str = "/open-apis/auth/v3/tenant_access_token/internal";
    const BATCH_PATH: &str = "/open-apis/bitable/v1/apps/bascnApp/tables/tblMain/records/batch_create";

    fn batch(n: usize) -> BatchCreateRequest {
        let records: Vec<_> = (0..n)
            .map(|i| ProductRecord::new(format!("{}", 1_000_000 + i), format!("https://img/{}.jpg", i)))
            .collect();
        BatchCreateRequest::from_records(&records, "商品ID", "主图")
    }

    #[tokio::test]
    async fn test_token_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_json(json!({ "app_id": "cli_1", "app_secret": "s1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "msg": "ok",
                "tenant_access_token": "t-abc",
                "expire": 7200
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = FeishuClient::with_base_url(mock_server.uri(), 5).unwrap();
        let grant = client.tenant_access_token("cli_1", "s1").await.unwrap();

        assert_eq!(grant, TokenGrant { token: "t-abc".to_string(), expire_secs: 7200 });
    }

    #[tokio::test]
    async fn test_token_api_error_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "code": 10014, "msg": "app secret invalid" })),
            )
            .mount(&mock_server)
            .await;

        let client = FeishuClient::with_base_url(mock_server.uri(), 5).unwrap();
        let err = client.tenant_access_token("cli_1", "wrong").await.unwrap_err();

        assert!(matches!(err, PipelineError::Auth(_)));
        assert_eq!(err.to_string(), "failed to obtain tenant token: app secret invalid");
    }

    #[tokio::test]
    async fn test_token_http_error_without_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;

        let client = FeishuClient::with_base_url(mock_server.uri(), 5).unwrap();
        let err = client.tenant_access_token("cli_1", "s1").await.unwrap_err();

        assert!(matches!(err, PipelineError::Auth(_)));
        assert!(err.to_string().contains("unknown error"));
    }

    #[tokio::test]
    async fn test_batch_create_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCH_PATH))
            .and(header("Authorization", "Bearer t-abc"))
            .and(body_json(json!({
                "records": [
                    { "fields": { "商品ID": "1000000", "主图": "https://img/0.jpg" } },
                    { "fields": { "商品ID": "1000001", "主图": "https://img/1.jpg" } }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 0, "msg": "success" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = FeishuClient::with_base_url(mock_server.uri(), 5).unwrap();
        client.batch_create("t-abc", "bascnApp", "tblMain", &batch(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_batch_create_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCH_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "code": 1254045, "msg": "FieldNameNotFound" })),
            )
            .mount(&mock_server)
            .await;

        let client = FeishuClient::with_base_url(mock_server.uri(), 5).unwrap();
        let err = client.batch_create("t-abc", "bascnApp", "tblMain", &batch(1)).await.unwrap_err();

        assert!(matches!(err, PipelineError::Sync(ref m) if m == "FieldNameNotFound"));
    }

    #[tokio::test]
    async fn test_batch_create_http_error_default_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCH_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = FeishuClient::with_base_url(mock_server.uri(), 5).unwrap();
        let err = client.batch_create("t-abc", "bascnApp", "tblMain", &batch(1)).await.unwrap_err();

        assert_eq!(err.to_string(), "sync failed");
    }

    #[tokio::test]
    async fn test_batch_create_http_error_with_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCH_PATH))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({ "code": 0, "msg": "Forbidden" })),
            )
            .mount(&mock_server)
            .await;

        let client = FeishuClient::with_base_url(mock_server.uri(), 5).unwrap();
        let err = client.batch_create("t-abc", "bascnApp", "tblMain", &batch(1)).await.unwrap_err();

        assert_eq!(err.to_string(), "Forbidden");
    }

    #[tokio::test]
    async fn test_path_segments_encoded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/open-apis/bitable/v1/apps/app%20one/tables/tbl/records/batch_create"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 0 })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = FeishuClient::with_base_url(mock_server.uri(), 5).unwrap();
        client.batch_create("t", "app one", "tbl", &batch(1)).await.unwrap();
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = FeishuClient::with_base_url("http://localhost:9000/", 5).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_default_client() {
        let client = FeishuClient::default();
        assert_eq!(client.base_url(), "https://open.feishu.cn");
    }
}
