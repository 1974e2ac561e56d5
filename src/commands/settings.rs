//! Settings command implementation.

use super::{spawn_router, PageTarget};
use crate::config::Config;
use crate::format::Formatter;
use crate::messages::{Payload, Request, RouterHandle};
use crate::settings::{SettingsPatch, SyncSettings};
use anyhow::Result;
use tracing::info;

/// Shows or updates the stored sync settings.
pub struct SettingsCommand {
    config: Config,
}

impl SettingsCommand {
    /// Creates a new settings command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Prints the stored settings.
    pub async fn show(&self) -> Result<String> {
        let router = spawn_router(&self.config, &PageTarget::default())?;
        self.show_with_router(&router).await
    }

    /// Applies `patch` and prints the result.
    pub async fn set(&self, patch: SettingsPatch) -> Result<String> {
        if patch.is_empty() {
            anyhow::bail!("Nothing to update: pass at least one setting, e.g. --table-id");
        }

        let router = spawn_router(&self.config, &PageTarget::default())?;
        self.set_with_router(&router, patch).await
    }

    pub async fn show_with_router(&self, router: &RouterHandle) -> Result<String> {
        let settings = expect_settings(router.call(Request::LoadSettings).await?)?;
        Ok(Formatter::new(self.config.format).format_settings(&settings))
    }

    pub async fn set_with_router(&self, router: &RouterHandle, patch: SettingsPatch) -> Result<String> {
        let settings = expect_settings(router.call(Request::SaveSettings(patch)).await?)?;
        info!("Settings saved");
        Ok(Formatter::new(self.config.format).format_settings(&settings))
    }
}

fn expect_settings(payload: Payload) -> Result<SyncSettings> {
    match payload {
        Payload::Settings(settings) => Ok(settings),
        other => anyhow::bail!("Unexpected reply to a settings request: {:?}", other),
    }
}
