//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod navigator;
mod storage;

pub use navigator::{Navigator, DEFAULT_LOGIN_PAGE};
pub use storage::{Storage, SESSION_KEY, USERS_KEY};
