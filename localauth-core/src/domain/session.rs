//! Session domain model

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::user::{Role, User};

/// The single active login, snapshotted from the user record at login time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub email: String,
    pub role: Role,
    pub name: String,
    /// ISO-8601 UTC, millisecond precision (`2026-10-18T09:30:00.123Z`)
    pub logged_at: String,
}

impl Session {
    pub fn new(email: impl Into<String>, user: &User, logged_at: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            role: user.role,
            name: user.name.clone(),
            logged_at: logged_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Parsed login time, if the stored string is valid RFC 3339
    pub fn logged_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.logged_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_snapshot() {
        let user = User::new("pw", Role::Admin, "Administrator");
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        let session = Session::new("admin@example.com", &user, at);

        assert_eq!(session.email, "admin@example.com");
        assert!(session.is_admin());
        assert_eq!(session.logged_at, "2026-10-18T09:30:00.000Z");
        assert_eq!(session.logged_at_utc(), Some(at));
    }

    #[test]
    fn test_session_wire_format() {
        let user = User::new("pw", Role::User, "Normal User");
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let json = serde_json::to_value(Session::new("user@example.com", &user, at)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "email": "user@example.com",
                "role": "user",
                "name": "Normal User",
                "loggedAt": "2026-01-02T03:04:05.000Z"
            })
        );
    }
}
