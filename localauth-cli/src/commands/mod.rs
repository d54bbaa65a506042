//! CLI command implementations

pub mod config;
pub mod logs;
pub mod session;
pub mod users;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use localauth_core::adapters::RecordingNavigator;
use localauth_core::config::{Config, StorageBackend};
use localauth_core::{AuthContext, LogEvent, LoggingService};

/// A failure the command has already shown to the user
///
/// `main` records it in the event log and exits non-zero without printing it
/// a second time.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Reported(pub String);

/// Options shared by every command that touches the store
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Backend override from `--storage`
    pub storage: Option<StorageBackend>,
    /// `--ephemeral`: keep everything in memory for this run
    pub ephemeral: bool,
}

/// A loaded context plus the navigator `require_auth` reports to
pub struct CliContext {
    pub ctx: AuthContext,
    pub navigator: Arc<RecordingNavigator>,
}

/// Open the event log in the app directory
pub fn open_log() -> Result<LoggingService> {
    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)?;
    LoggingService::new(&app_dir, "cli", env!("CARGO_PKG_VERSION"))
}

/// Event log for command bookkeeping
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    open_log().ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        if let Err(e) = l.log(event) {
            tracing::debug!(error = %e, "failed to write event log");
        }
    }
}

/// Get the app directory from the environment or default
pub fn get_app_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("LOCALAUTH_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".localauth"))
}

/// Load config and open the store
pub fn get_context(options: &StoreOptions) -> Result<CliContext> {
    let app_dir = get_app_dir()?;
    std::fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create app directory: {:?}", app_dir))?;

    let mut config = Config::load(&app_dir).context("Failed to load settings")?;
    if let Some(storage) = options.storage {
        config.storage = storage;
    }
    if options.ephemeral {
        config.storage = StorageBackend::Memory;
    }

    let navigator = Arc::new(RecordingNavigator::new());
    let ctx = AuthContext::with_config(&app_dir, config, navigator.clone())
        .context("Failed to open store")?;

    Ok(CliContext { ctx, navigator })
}
