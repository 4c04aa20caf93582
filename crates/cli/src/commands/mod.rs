//! CLI command implementations.

pub mod inspect;
pub mod session;

use campus_console::{ConfigError, StoreError};
use thiserror::Error;

/// Errors that end a CLI command with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// No password was supplied.
    #[error("No password given: pass --password-stdin or set CAMPUS_PASSWORD")]
    MissingPassword,

    /// Reading the password from stdin failed.
    #[error("Could not read password: {0}")]
    Io(#[from] std::io::Error),

    /// The server refused the login, or it could not be completed.
    #[error("{0}")]
    LoginFailed(String),

    /// The session store could not be cleared.
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    /// The session could not be printed.
    #[error("Could not format session: {0}")]
    Json(#[from] serde_json::Error),

    /// A command needs a valid session.
    #[error("Not logged in")]
    NotLoggedIn,

    /// `mirror` was asked for a key that is not a mirror.
    #[error("Unknown mirror key: {0} (expected one of: {1})")]
    UnknownMirror(String, String),
}

impl From<campus_console::LoginError> for CliError {
    fn from(err: campus_console::LoginError) -> Self {
        match err {
            campus_console::LoginError::Store(e) => Self::Store(e),
            other => Self::LoginFailed(other.user_message()),
        }
    }
}
