//! Session guard for screens behind the login page.
//!
//! Other console screens call these before rendering, the way route
//! handlers take an auth extractor.

use campus_console_core::CanonicalSession;

use crate::store::SessionStore;

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";

/// Why a screen refused to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    /// No valid session; send the user to [`LOGIN_PATH`].
    RedirectToLogin,
    /// Logged in, but the screen needs the finance role.
    Forbidden,
}

impl GuardRejection {
    /// Where the rejected user should be sent, if anywhere.
    #[must_use]
    pub const fn redirect_path(self) -> Option<&'static str> {
        match self {
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::Forbidden => None,
        }
    }
}

impl std::fmt::Display for GuardRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RedirectToLogin => write!(f, "not logged in"),
            Self::Forbidden => write!(f, "only finance users can access this screen"),
        }
    }
}

/// Require a valid session.
///
/// An invalid persisted session is destroyed.
///
/// # Errors
///
/// Returns `GuardRejection::RedirectToLogin` if no valid session is stored.
pub fn require_session(store: &SessionStore) -> Result<CanonicalSession, GuardRejection> {
    store.load().ok_or(GuardRejection::RedirectToLogin)
}

/// Require a valid session holding the finance role.
///
/// # Errors
///
/// Returns `RedirectToLogin` without a session and `Forbidden` when the
/// session is not a finance one.
pub fn require_finance(store: &SessionStore) -> Result<CanonicalSession, GuardRejection> {
    let session = require_session(store)?;
    if !session.role_profile().is_finance() {
        return Err(GuardRejection::Forbidden);
    }
    Ok(session)
}

/// The current session, if any. Never rejects.
#[must_use]
pub fn optional_session(store: &SessionStore) -> Option<CanonicalSession> {
    store.load()
}
