//! Activity-aware music: classify wearable sensor samples into a stable
//! context label, publish it through a single-record context channel, and
//! sequence tracks that follow the label at every playback boundary.

pub mod audio;
pub mod channel;
pub mod classifier;
pub mod commands;
pub mod db;
pub mod models;
pub mod playback;
pub mod sensing;
pub mod settings;
pub mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use channel::{ContextStore, InMemoryContextStore};
use commands::Cli;
use db::Database;
use settings::{Settings, SettingsStore};

/// Shared pieces every command needs.
pub struct AppState {
    pub settings: Settings,
    pub store: Arc<dyn ContextStore>,
}

impl AppState {
    /// Settings from `settings_path` (defaults when absent) and a SQLite
    /// channel at `db_path`, or an in-process channel without one.
    pub fn load(settings_path: Option<PathBuf>, db_path: Option<PathBuf>) -> Result<Self> {
        let settings = match settings_path {
            Some(path) => SettingsStore::new(path)?.get(),
            None => Settings::default(),
        };

        let store: Arc<dyn ContextStore> = match db_path {
            Some(path) => Arc::new(Database::new(path)?),
            None => Arc::new(InMemoryContextStore::new()),
        };

        Ok(Self { settings, store })
    }
}

pub fn run() -> Result<()> {
    let level = if settings::debug_mode() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    utils::logging::init(level);

    let cli = Cli::parse();
    log::info!("moodstream starting up...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::dispatch(cli))
}
