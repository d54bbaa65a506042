//! Navigator port - where `require_auth` sends unauthenticated callers

use crate::domain::result::Result;

/// Default login page used when no redirect target is configured
pub const DEFAULT_LOGIN_PAGE: &str = "ui/login.html";

pub trait Navigator: Send + Sync {
    /// Navigate away from the current page to `to`
    fn redirect(&self, to: &str) -> Result<()>;
}
