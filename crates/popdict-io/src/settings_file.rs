use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use popdict_config::DisplaySettings;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::store::MemorySettingsStore;

/// Read the settings file. A missing file means no settings are stored.
pub async fn read_settings_file(path: &Path) -> anyhow::Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

pub fn parse_settings(text: &str) -> anyhow::Result<DisplaySettings> {
    serde_json::from_str(text).context("settings file is not valid settings JSON")
}

/// Mirrors a JSON settings file into a [`MemorySettingsStore`].
///
/// Only content changes are pushed; a malformed file keeps the last good
/// value.
pub struct SettingsFileSync {
    path: PathBuf,
    key: String,
    store: MemorySettingsStore,
    last_text: Option<String>,
}

impl SettingsFileSync {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>, store: MemorySettingsStore) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            store,
            last_text: None,
        }
    }

    /// Read the file once and push it if it changed. Returns whether the
    /// store was updated.
    pub async fn sync(&mut self) -> anyhow::Result<bool> {
        let text = read_settings_file(&self.path).await?;
        if text == self.last_text {
            return Ok(false);
        }

        // remembered even when malformed so a bad file is reported once
        self.last_text = text.clone();
        let settings = text.as_deref().map(parse_settings).transpose()?;
        self.store.set(&self.key, settings);
        Ok(true)
    }

    /// Poll the file until cancelled
    pub async fn watch(mut self, every: Duration, cancel: CancellationToken) -> anyhow::Result<()> {
        let mut interval = time::interval(every);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = interval.tick() => {}
            }

            match self.sync().await {
                Ok(true) => tracing::info!("Settings reloaded from {}", self.path.display()),
                Ok(false) => {}
                Err(e) => tracing::warn!("Ignoring settings file update: {e:#}"),
            }
        }
    }
}
