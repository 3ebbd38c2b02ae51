use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use crate::classifier::ClassifierConfig;
use crate::playback::{MoodCatalog, PlaybackTimeouts};
use crate::sensing::gap_fill::DEFAULT_HEART_RATE;

/// Partition key both sides agree on.
pub const DEFAULT_USER_ID: &str = "MY_ALEXA_USER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub user_id: String,
    pub sample_interval_secs: u64,
    pub channel_timeout_ms: u64,
    pub resolve_timeout_ms: u64,
    pub default_heart_rate: f32,
    pub catalog: MoodCatalog,
    pub classifier: ClassifierConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.into(),
            sample_interval_secs: 5,
            channel_timeout_ms: 2000,
            resolve_timeout_ms: 2000,
            default_heart_rate: DEFAULT_HEART_RATE,
            catalog: MoodCatalog::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl Settings {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs.max(1))
    }

    pub fn channel_timeout(&self) -> Duration {
        Duration::from_millis(self.channel_timeout_ms)
    }

    pub fn playback_timeouts(&self) -> PlaybackTimeouts {
        PlaybackTimeouts {
            channel: self.channel_timeout(),
            resolve: Duration::from_millis(self.resolve_timeout_ms),
        }
    }
}

/// Settings loaded once at start-up from a JSON file. A missing or unreadable
/// file means defaults.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(err) => {
                    log::warn!("ignoring unparsable settings {}: {err}", path.display());
                    Settings::default()
                }
            }
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> Settings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, settings: Settings) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &Settings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

/// `MOODSTREAM_DEBUG=1` (or `true`) turns on debug logging.
pub fn debug_mode() -> bool {
    std::env::var("MOODSTREAM_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
