//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions.

mod auth;
pub mod logging;
pub mod migration;

pub use auth::AuthService;
pub use logging::{LogEntry, LogEvent, LogStats, LoggingService};
pub use migration::{MigrationResult, MigrationService};
