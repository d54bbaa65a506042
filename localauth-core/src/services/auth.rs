//! Auth service - the user directory and the single active session
//!
//! Every call re-reads the records it needs from storage, mutates a local
//! copy and writes the whole record back. There is no cache and no locking
//! across calls, so concurrent writers are last-writer-wins.
//!
//! Outer `Err` values are system failures (storage I/O, malformed stored
//! JSON). Domain failures come back as `Ok(OperationResult { ok: false, .. })`.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::result::{AuthError, OperationResult, Result};
use crate::domain::{
    default_name, demo_directory, validate_password, Directory, Role, Session, User, UserChanges,
};
use crate::ports::{Navigator, Storage, DEFAULT_LOGIN_PAGE, SESSION_KEY, USERS_KEY};

/// Session/user store over an injected [`Storage`]
pub struct AuthService {
    storage: Arc<dyn Storage>,
    navigator: Arc<dyn Navigator>,
    login_page: String,
}

impl AuthService {
    pub fn new(storage: Arc<dyn Storage>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            storage,
            navigator,
            login_page: DEFAULT_LOGIN_PAGE.to_string(),
        }
    }

    /// Override where `require_auth` redirects when no target is given
    pub fn with_login_page(mut self, login_page: impl Into<String>) -> Self {
        self.login_page = login_page.into();
        self
    }

    // === Directory ===

    /// Seed the demo accounts if the directory record is absent
    pub fn init_users(&self) -> Result<()> {
        let existing = self
            .storage
            .get_item(USERS_KEY)?
            .filter(|raw| !raw.is_empty());
        if existing.is_some() {
            return Ok(());
        }
        tracing::debug!("seeding demo user directory");
        self.save_users(&demo_directory())
    }

    /// Full directory, seeding it first if needed
    pub fn get_users(&self) -> Result<Directory> {
        self.init_users()?;
        match self.storage.get_item(USERS_KEY)? {
            Some(raw) if !raw.is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Directory::new()),
        }
    }

    fn save_users(&self, users: &Directory) -> Result<()> {
        let raw = serde_json::to_string(users)?;
        self.storage.set_item(USERS_KEY, &raw)
    }

    // === Session ===

    /// Check credentials and start a session, replacing any existing one
    pub fn login(&self, email: &str, password: &str) -> Result<OperationResult<Session>> {
        let users = self.get_users()?;
        let user = match users.get(email) {
            Some(user) => user,
            None => return Ok(AuthError::UserNotFound.into()),
        };
        if user.password != password {
            tracing::debug!("login rejected: password mismatch");
            return Ok(AuthError::InvalidPassword.into());
        }

        let session = Session::new(email, user, Utc::now());
        self.storage
            .set_item(SESSION_KEY, &serde_json::to_string(&session)?)?;
        tracing::debug!(role = %session.role, "session started");

        Ok(OperationResult::ok(session))
    }

    /// Drop the active session. Safe to call when logged out.
    pub fn logout(&self) -> Result<()> {
        self.storage.remove_item(SESSION_KEY)
    }

    pub fn get_session(&self) -> Result<Option<Session>> {
        match self.storage.get_item(SESSION_KEY)? {
            // A stored `null` reads back as no session
            Some(raw) if !raw.is_empty() => Ok(serde_json::from_str::<Option<Session>>(&raw)?),
            _ => Ok(None),
        }
    }

    pub fn is_admin(&self) -> Result<bool> {
        Ok(self
            .get_session()?
            .map(|session| session.is_admin())
            .unwrap_or(false))
    }

    /// Return the session, or redirect to `redirect_to` (default: the login
    /// page) and return `None`
    pub fn require_auth(&self, redirect_to: Option<&str>) -> Result<Option<Session>> {
        if let Some(session) = self.get_session()? {
            return Ok(Some(session));
        }
        let target = redirect_to.unwrap_or(self.login_page.as_str());
        tracing::debug!(redirect_to = target, "no session, redirecting");
        self.navigator.redirect(target)?;
        Ok(None)
    }

    // === User management ===

    /// Create a user. `role` defaults to `user`; a blank `name` defaults to
    /// the email's local part.
    pub fn add_user(
        &self,
        email: &str,
        password: &str,
        role: Option<&str>,
        name: Option<&str>,
    ) -> Result<OperationResult<()>> {
        if email.is_empty() {
            return Ok(AuthError::EmailRequired.into());
        }
        if let Err(e) = validate_password(password) {
            return Ok(e.into());
        }
        let role: Role = match role.unwrap_or("user").parse() {
            Ok(role) => role,
            Err(e) => return Ok(e.into()),
        };

        let mut users = self.get_users()?;
        if users.contains_key(email) {
            return Ok(AuthError::UserAlreadyExists.into());
        }

        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => default_name(email),
        };
        users.insert(email.to_string(), User::new(password, role, name));
        self.save_users(&users)?;
        tracing::debug!(%role, "user added");

        Ok(OperationResult::done())
    }

    /// Patch a user's password, role and/or name
    ///
    /// Nothing is written unless every supplied field is valid.
    pub fn update_user(&self, email: &str, changes: &UserChanges) -> Result<OperationResult<()>> {
        let mut users = self.get_users()?;
        let Some(user) = users.get_mut(email) else {
            return Ok(AuthError::UserNotFound.into());
        };
        if let Err(e) = changes.apply_to(user) {
            return Ok(e.into());
        }
        self.save_users(&users)?;

        Ok(OperationResult::done())
    }

    /// Remove a user, ending the active session if it belongs to them
    pub fn delete_user(&self, email: &str) -> Result<OperationResult<()>> {
        let mut users = self.get_users()?;
        if users.remove(email).is_none() {
            return Ok(AuthError::UserNotFound.into());
        }
        self.save_users(&users)?;

        let owns_session = self
            .get_session()?
            .is_some_and(|session| session.email == email);
        if owns_session {
            tracing::debug!("deleted user owned the active session, logging out");
            self.logout()?;
        }

        Ok(OperationResult::done())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MemoryStorage, RecordingNavigator};

    fn service() -> (AuthService, Arc<MemoryStorage>, Arc<RecordingNavigator>) {
        let storage = Arc::new(MemoryStorage::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let service = AuthService::new(storage.clone(), navigator.clone());
        (service, storage, navigator)
    }

    #[test]
    fn test_init_users_does_not_overwrite() {
        let (service, storage, _) = service();
        storage.set_item(USERS_KEY, "{}").unwrap();

        service.init_users().unwrap();
        assert!(service.get_users().unwrap().is_empty());
    }

    #[test]
    fn test_empty_users_record_is_reseeded() {
        let (service, storage, _) = service();
        storage.set_item(USERS_KEY, "").unwrap();

        assert_eq!(service.get_users().unwrap().len(), 2);
    }

    #[test]
    fn test_login_overwrites_previous_session() {
        let (service, _, _) = service();
        service.login("admin@example.com", "admin123").unwrap();
        service.login("user@example.com", "user123").unwrap();

        let session = service.get_session().unwrap().unwrap();
        assert_eq!(session.email, "user@example.com");
        assert!(!service.is_admin().unwrap());
    }

    #[test]
    fn test_failed_login_keeps_existing_session() {
        let (service, _, _) = service();
        service.login("admin@example.com", "admin123").unwrap();

        let result = service.login("user@example.com", "nope").unwrap();
        assert_eq!(result.message(), Some("Invalid password"));
        assert_eq!(
            service.get_session().unwrap().unwrap().email,
            "admin@example.com"
        );
    }

    #[test]
    fn test_null_session_record_reads_as_logged_out() {
        let (service, storage, _) = service();
        storage.set_item(SESSION_KEY, "null").unwrap();
        assert_eq!(service.get_session().unwrap(), None);
    }

    #[test]
    fn test_malformed_session_is_fatal() {
        let (service, storage, _) = service();
        storage.set_item(SESSION_KEY, "{oops").unwrap();
        assert!(service.get_session().is_err());
        assert!(service.is_admin().is_err());
    }

    #[test]
    fn test_require_auth_uses_configured_login_page() {
        let (service, _, navigator) = service();
        let service = service.with_login_page("/signin");

        assert_eq!(service.require_auth(None).unwrap(), None);
        assert_eq!(navigator.last_redirect(), Some("/signin".to_string()));

        assert_eq!(service.require_auth(Some("other.html")).unwrap(), None);
        assert_eq!(navigator.last_redirect(), Some("other.html".to_string()));
    }

    #[test]
    fn test_add_user_validation_runs_before_seeding() {
        let (service, storage, _) = service();
        let result = service.add_user("", "abcd", None, None).unwrap();
        assert_eq!(result.message(), Some("Email required"));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_add_user_defaults() {
        let (service, _, _) = service();
        let result = service.add_user("jane@corp.io", "abc", None, Some("")).unwrap();
        assert!(result.is_ok());

        let users = service.get_users().unwrap();
        let jane = &users["jane@corp.io"];
        assert_eq!(jane.role, Role::User);
        assert_eq!(jane.name, "jane");
    }

    #[test]
    fn test_astral_password_length_matches_page_scripts() {
        let (service, _, _) = service();
        assert!(service.add_user("e@x.com", "\u{1F600}a", None, None).unwrap().is_ok());

        let short = service.add_user("f@x.com", "\u{1F600}", None, None).unwrap();
        assert_eq!(short.message(), Some("Password must be at least 3 chars"));

        let changes = UserChanges::new().with_password("\u{1F600}");
        let result = service.update_user("e@x.com", &changes).unwrap();
        assert!(!result.is_ok());
        assert_eq!(service.get_users().unwrap()["e@x.com"].password, "\u{1F600}a");
    }

    #[test]
    fn test_delete_other_user_keeps_session() {
        let (service, _, _) = service();
        service.login("admin@example.com", "admin123").unwrap();

        let result = service.delete_user("user@example.com").unwrap();
        assert!(result.is_ok());
        assert!(service.get_session().unwrap().is_some());
        assert!(service.is_admin().unwrap());
    }
}
