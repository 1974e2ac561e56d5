//! xhs-feishu - Collect product cards from a social-commerce page and
//! sync them to a Feishu Bitable.
//!
//! The pipeline has three parts: a page scraper ([`page`]), a persisted
//! settings store ([`settings`]) and a sync orchestrator ([`feishu`]),
//! joined by a request/reply router ([`messages`]).

pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod feishu;
pub mod format;
pub mod messages;
pub mod page;
pub mod settings;

pub use config::Config;
pub use error::{PipelineError, Result};
pub use feishu::{FeishuApi, FeishuClient, SyncOrchestrator, SyncOutcome};
pub use messages::{MessageRouter, Payload, Request, Response, RouterHandle};
pub use page::{CollectionCache, PageScraper, ProductRecord};
pub use settings::{SettingsPatch, SettingsStore, SyncSettings};
