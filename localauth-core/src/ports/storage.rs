//! Storage port - key-value abstraction standing in for browser local storage

use crate::domain::result::Result;

/// Key used for the user directory record
pub const USERS_KEY: &str = "appUsers";

/// Key used for the single active session record
pub const SESSION_KEY: &str = "appSession";

/// String key-value store
///
/// Each call is atomic on its own. Sequences of calls are not: callers doing
/// read-modify-write get last-writer-wins semantics.
pub trait Storage: Send + Sync {
    /// Read a value, `None` if the key is absent
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is a no-op.
    fn remove_item(&self, key: &str) -> Result<()>;
}
