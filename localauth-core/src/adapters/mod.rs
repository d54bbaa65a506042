//! Adapter implementations (hexagonal architecture)
//!
//! Concrete implementations of the port traits.

pub mod duckdb;
pub mod file;
pub mod memory;
pub mod navigator;

pub use self::duckdb::DuckDbStorage;
pub use file::JsonFileStorage;
pub use memory::MemoryStorage;
pub use navigator::RecordingNavigator;
