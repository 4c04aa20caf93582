//! Login failures and their user-facing messages.

use campus_console_core::InvalidResponse;
use thiserror::Error;

use crate::store::StoreError;

const INVALID_CREDENTIALS: &str = "Invalid username or password.";
const ACCESS_DENIED: &str =
    "Access denied. Your account is not allowed to sign in to this console.";
const SERVER_ERROR: &str = "Something went wrong on the server. Please try again.";
const NETWORK_ERROR: &str = "Unable to reach the server. Please try again later.";
const LOGIN_FAILED: &str = "Login failed. Please try again.";
const STORE_FAILED: &str = "Could not save your session. Please try again.";

/// Why a login attempt failed.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The server rejected the credentials (401).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account may not use this console (403).
    #[error("access denied")]
    AccessDenied,

    /// Any other non-success status.
    #[error("server error (HTTP {status}): {}", message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        /// `message` (or `error`) text from the response body, if any.
        message: Option<String>,
    },

    /// No response was received.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// A success response that cannot be turned into a session.
    #[error(transparent)]
    InvalidResponse(#[from] InvalidResponse),

    /// The session could not be persisted.
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification of a [`LoginError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidCredentials,
    AccessDenied,
    ServerError,
    NetworkError,
    InvalidResponse,
    Store,
}

impl LoginError {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidCredentials => FailureKind::InvalidCredentials,
            Self::AccessDenied => FailureKind::AccessDenied,
            Self::Server { .. } => FailureKind::ServerError,
            Self::Network(_) => FailureKind::NetworkError,
            Self::InvalidResponse(_) => FailureKind::InvalidResponse,
            Self::Store(_) => FailureKind::Store,
        }
    }

    /// Message shown on the login form.
    ///
    /// Server-supplied text is shown verbatim; everything else uses a fixed
    /// message so internal details never reach the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => INVALID_CREDENTIALS.to_string(),
            Self::AccessDenied => ACCESS_DENIED.to_string(),
            Self::Server { message, .. } => message
                .as_deref()
                .map_or_else(|| SERVER_ERROR.to_string(), str::to_string),
            Self::Network(_) => NETWORK_ERROR.to_string(),
            Self::InvalidResponse(_) => LOGIN_FAILED.to_string(),
            Self::Store(_) => STORE_FAILED.to_string(),
        }
    }

    /// Log the failure, capturing unexpected ones in Sentry.
    pub fn report(&self) {
        if matches!(
            self,
            Self::Server { .. } | Self::InvalidResponse(_) | Self::Store(_)
        ) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Login error"
            );
        } else {
            tracing::info!(error = %self, kind = ?self.kind(), "Login rejected");
        }
    }
}

/// Set the Sentry user context from the logged-in user.
pub fn set_sentry_user(user_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
