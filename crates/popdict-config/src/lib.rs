use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use self::links::Links;
use self::settings::SETTINGS_KEY;

pub mod links;
pub mod settings;

pub use settings::{AutoRead, DisplaySettings, ParaphraseLanguage};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub links: Links,

    /// Command line of the provider process the message gateway talks to
    pub provider_command: String,
    /// Settings file mirrored into the settings store, settings stay absent if unset
    pub settings_path: Option<PathBuf>,
    pub settings_key: String,
    pub settings_poll_ms: u64,
    /// Upper bound for the primary lookup. None waits forever.
    pub lookup_timeout_ms: Option<u64>,
    /// Capacity of the popover -> host output channel
    pub output_capacity: usize,
}

impl Config {
    pub fn new() -> Self {
        let provider_command =
            env::var("POPDICT_PROVIDER").unwrap_or_else(|_| "popdict-provider".to_string());

        let settings_path = env::var("POPDICT_SETTINGS_PATH").ok().map(PathBuf::from);

        let settings_key =
            env::var("POPDICT_SETTINGS_KEY").unwrap_or_else(|_| SETTINGS_KEY.to_string());

        let settings_poll_ms = env::var("POPDICT_SETTINGS_POLL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(500);

        let lookup_timeout_ms = env::var("POPDICT_LOOKUP_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok());

        let output_capacity = env::var("POPDICT_OUTPUT_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(64);

        Config {
            links: Links::new(),

            provider_command,
            settings_path,
            settings_key,
            settings_poll_ms,
            lookup_timeout_ms,
            output_capacity,
        }
    }

    pub fn lookup_timeout(&self) -> Option<Duration> {
        self.lookup_timeout_ms.map(Duration::from_millis)
    }

    pub fn settings_poll_interval(&self) -> Duration {
        Duration::from_millis(self.settings_poll_ms.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
