//! Feishu Open Platform integration: tenant token and Bitable batch upload.

pub mod client;
pub mod models;
pub mod sync;

pub use client::{FeishuApi, FeishuClient};
pub use models::{BatchCreateRequest, TokenGrant};
pub use sync::{SyncOrchestrator, SyncOutcome, BATCH_SIZE};
