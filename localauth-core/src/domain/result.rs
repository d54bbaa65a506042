//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported back to callers as `{ok: false, message}` values.
///
/// The display strings are the user-facing messages and must stay stable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Email required")]
    EmailRequired,

    #[error("Password must be at least 3 chars")]
    PasswordTooShort,

    #[error("Invalid role")]
    InvalidRole,

    #[error("User already exists")]
    UserAlreadyExists,
}

/// Core library error type
///
/// These are system failures (storage, malformed stored data). They are
/// never folded into an [`OperationResult`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{:#}", err))
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a store operation, shaped for page scripts and `--json` output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> OperationResult<T> {
    /// Create a successful result carrying data
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            message: None,
            data: Some(data),
        }
    }

    /// Create a failed result
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Failure message, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl OperationResult<()> {
    /// Create a bare successful result (`{ok: true}`)
    pub fn done() -> Self {
        Self {
            ok: true,
            message: None,
            data: None,
        }
    }
}

impl<T> From<AuthError> for OperationResult<T> {
    fn from(err: AuthError) -> Self {
        Self::fail(err.to_string())
    }
}

impl<T> From<std::result::Result<T, AuthError>> for OperationResult<T> {
    fn from(result: std::result::Result<T, AuthError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.is_ok());
        assert_eq!(result.data, Some(42));
        assert!(result.message.is_none());
    }

    #[test]
    fn test_operation_result_fail() {
        let result: OperationResult<i32> = OperationResult::fail("Something went wrong");
        assert!(!result.is_ok());
        assert!(result.data.is_none());
        assert_eq!(result.message(), Some("Something went wrong"));
    }

    #[test]
    fn test_from_auth_error() {
        let result: OperationResult<()> = AuthError::PasswordTooShort.into();
        assert!(!result.ok);
        assert_eq!(result.message(), Some("Password must be at least 3 chars"));
    }

    #[test]
    fn test_bare_success_serializes_without_payload() {
        let json = serde_json::to_value(OperationResult::done()).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": true }));

        let json = serde_json::to_value(OperationResult::<()>::fail("Invalid role")).unwrap();
        assert_eq!(json, serde_json::json!({ "ok": false, "message": "Invalid role" }));
    }
}
