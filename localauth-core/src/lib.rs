//! localauth Core - demo-grade user directory and session store
//!
//! A user directory and a single active session kept in a key-value store,
//! with login/logout/session-query/user-management operations. Passwords are
//! stored and compared in plain text; this is not a security boundary.
//!
//! The crate follows hexagonal architecture:
//!
//! - **domain**: Core entities (User, Role, Session) and result types
//! - **ports**: Trait definitions for external dependencies (Storage, Navigator)
//! - **services**: Business logic (AuthService, LoggingService, migrations)
//! - **adapters**: Concrete implementations (JSON file, DuckDB, in-memory)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod migrations;
pub mod log_migrations;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::{DuckDbStorage, JsonFileStorage, MemoryStorage};
use config::{Config, StorageBackend};
use ports::{Navigator, Storage};

// Re-export commonly used types at crate root
pub use domain::result::{AuthError, Error, OperationResult};
pub use domain::{Directory, Role, Session, User, UserChanges};
pub use services::{AuthService, LogEntry, LogEvent, LogStats, LoggingService};

/// Main context for localauth operations
///
/// Holds the configuration and the auth service over the storage it selects.
pub struct AuthContext {
    pub config: Config,
    pub auth_service: AuthService,
}

impl AuthContext {
    /// Open the configured storage in `app_dir`
    pub fn with_config(
        app_dir: &Path,
        config: Config,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let storage = open_storage(app_dir, config.storage)?;
        let auth_service =
            AuthService::new(storage, navigator).with_login_page(&config.login_page);

        Ok(Self {
            config,
            auth_service,
        })
    }
}

/// Open the storage adapter for `backend` inside `app_dir`
pub fn open_storage(app_dir: &Path, backend: StorageBackend) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match backend {
        StorageBackend::File => Arc::new(JsonFileStorage::new(app_dir)?),
        StorageBackend::Duckdb => {
            std::fs::create_dir_all(app_dir)?;
            Arc::new(DuckDbStorage::new(&app_dir.join(adapters::duckdb::DB_FILE))?)
        }
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
    };
    tracing::debug!(backend = %backend, dir = %app_dir.display(), "storage opened");
    Ok(storage)
}
