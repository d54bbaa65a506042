//! User domain model

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::result::AuthError;

/// Minimum password length accepted by create/update, in UTF-16 code units
pub const MIN_PASSWORD_LEN: usize = 3;

/// Authorization level of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    /// Exact, case-sensitive match on `admin` / `user`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(AuthError::InvalidRole),
        }
    }
}

/// A stored user account. The email is the directory key, not a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub password: String,
    pub role: Role,
    pub name: String,
}

impl User {
    pub fn new(password: impl Into<String>, role: Role, name: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            role,
            name: name.into(),
        }
    }
}

/// All user accounts, keyed by email (exact, case-sensitive)
pub type Directory = BTreeMap<String, User>;

/// The accounts written the first time the directory is found absent
pub fn demo_directory() -> Directory {
    let mut users = Directory::new();
    users.insert(
        "admin@example.com".to_string(),
        User::new("admin123", Role::Admin, "Administrator"),
    );
    users.insert(
        "user@example.com".to_string(),
        User::new("user123", Role::User, "Normal User"),
    );
    users
}

/// Text before the first `@`, or the whole email when there is none
pub fn default_name(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Check a new password against the minimum length
///
/// Length is measured in UTF-16 code units so a character outside the BMP
/// counts as two, matching what page scripts report for the same string.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.encode_utf16().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

/// Partial patch applied by `update_user`
///
/// An empty `password` or `role` counts as not supplied. `name` is applied
/// whenever present, including the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UserChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Apply the patch to `user` in order password, role, name.
    ///
    /// Stops at the first invalid field. `user` may already carry earlier
    /// fields when this fails, so callers must not persist it on error.
    pub fn apply_to(&self, user: &mut User) -> Result<(), AuthError> {
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            validate_password(password)?;
            user.password = password.to_string();
        }
        if let Some(role) = self.role.as_deref().filter(|r| !r.is_empty()) {
            user.role = role.parse()?;
        }
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_is_exact() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert_eq!("Admin".parse::<Role>(), Err(AuthError::InvalidRole));
        assert_eq!("bogus".parse::<Role>(), Err(AuthError::InvalidRole));
    }

    #[test]
    fn test_user_serializes_as_record() {
        let user = User::new("secret", Role::Admin, "Root");
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "password": "secret", "role": "admin", "name": "Root" })
        );
    }

    #[test]
    fn test_unknown_role_fails_to_deserialize() {
        let result: Result<User, _> =
            serde_json::from_str(r#"{"password":"x","role":"root","name":"n"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_name() {
        assert_eq!(default_name("jane@example.com"), "jane");
        assert_eq!(default_name("no-at-sign"), "no-at-sign");
        assert_eq!(default_name("a@b@c"), "a");
    }

    #[test]
    fn test_demo_directory() {
        let users = demo_directory();
        assert_eq!(users.len(), 2);
        assert_eq!(users["admin@example.com"].role, Role::Admin);
        assert_eq!(users["user@example.com"].password, "user123");
    }

    #[test]
    fn test_password_length_counts_utf16_units() {
        assert_eq!(validate_password("abc"), Ok(()));
        assert_eq!(validate_password("ab"), Err(AuthError::PasswordTooShort));
        assert_eq!(validate_password("\u{1F600}a"), Ok(()));
        assert_eq!(validate_password("\u{1F600}"), Err(AuthError::PasswordTooShort));
        assert_eq!(validate_password("\u{e9}\u{e9}"), Err(AuthError::PasswordTooShort));
    }

    #[test]
    fn test_apply_changes_skips_empty_password_and_role() {
        let mut user = User::new("old", Role::User, "Old");
        UserChanges::new()
            .with_password("")
            .with_role("")
            .with_name("")
            .apply_to(&mut user)
            .unwrap();
        assert_eq!(user, User::new("old", Role::User, ""));
    }

    #[test]
    fn test_apply_changes_stops_at_first_invalid_field() {
        let mut user = User::new("old", Role::User, "Old");
        let err = UserChanges::new()
            .with_password("newpass")
            .with_role("bogus")
            .with_name("New")
            .apply_to(&mut user)
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidRole);
        assert_eq!(user.name, "Old");
    }
}
