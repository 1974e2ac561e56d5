//! Dispatches requests to the scraper, settings store and sync orchestrator.

use super::{Payload, Request, Response};
use crate::error::{PipelineError, Result};
use crate::feishu::{FeishuApi, SyncOrchestrator};
use crate::page::PageScraper;
use crate::settings::SettingsStore;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

const CHANNEL_CAPACITY: usize = 32;

/// Owns the pipeline components and answers requests.
pub struct MessageRouter {
    scraper: Option<Arc<PageScraper>>,
    store: Arc<dyn SettingsStore>,
    sync: SyncOrchestrator,
}

impl MessageRouter {
    /// Creates a router. Without a scraper, page requests fail with a page
    /// access error.
    pub fn new(
        scraper: Option<Arc<PageScraper>>,
        store: Arc<dyn SettingsStore>,
        api: Arc<dyn FeishuApi>,
    ) -> Self {
        let sync = SyncOrchestrator::new(store.clone(), api);
        Self { scraper, store, sync }
    }

    /// Handles one request. Failures become `ok: false` replies.
    pub async fn handle(&self, request: Request) -> Response {
        let kind = request.kind();
        debug!("Handling {}", kind);

        match self.dispatch(request).await {
            Ok(data) => Response::success(data),
            Err(e) => {
                error!("{} failed: {}", kind, e);
                Response::failure(e.to_string())
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Payload> {
        match request {
            Request::CollectProducts => {
                let records = self.scraper()?.collect().await?;
                Ok(Payload::Products(records))
            }
            Request::ReadCache => Ok(Payload::Cache(self.scraper()?.read_cache())),
            Request::SaveSettings(patch) => Ok(Payload::Settings(self.store.save(patch).await?)),
            Request::LoadSettings => Ok(Payload::Settings(self.store.load().await)),
            Request::SyncToFeishu(payload) => {
                Ok(Payload::Synced(self.sync.sync_to_feishu(&payload.records).await?))
            }
        }
    }

    fn scraper(&self) -> Result<&PageScraper> {
        self.scraper
            .as_deref()
            .ok_or_else(|| PipelineError::DomAccess("no target page is attached".to_string()))
    }

    /// Moves the router onto its own task and returns a handle to it.
    ///
    /// Requests are handled one at a time in arrival order.
    pub fn spawn(self) -> RouterHandle {
        let (tx, mut rx) = mpsc::channel::<Envelope>(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            while let Some(Envelope { request, reply }) = rx.recv().await {
                let response = self.handle(request).await;
                if reply.send(response).is_err() {
                    debug!("Requester went away before the reply");
                }
            }
            debug!("Router stopped");
        });

        RouterHandle { tx }
    }
}

struct Envelope {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Cloneable sender side of a spawned [`MessageRouter`].
#[derive(Clone)]
pub struct RouterHandle {
    tx: mpsc::Sender<Envelope>,
}

impl RouterHandle {
    /// Sends a request and waits for its reply.
    pub async fn request(&self, request: Request) -> anyhow::Result<Response> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope { request, reply })
            .await
            .map_err(|_| anyhow::anyhow!("router is not running"))?;

        rx.await.map_err(|_| anyhow::anyhow!("router dropped the request"))
    }

    /// Sends a request and returns its data, turning `ok: false` into an error.
    pub async fn call(&self, request: Request) -> anyhow::Result<Payload> {
        let response = self.request(request).await?;
        if !response.ok {
            anyhow::bail!(response.message.unwrap_or_else(|| "unknown error".to_string()));
        }
        response.data.ok_or_else(|| anyhow::anyhow!("reply carried no data"))
    }
}
