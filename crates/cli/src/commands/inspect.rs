//! Read-only views of the persisted session.
//!
//! # Usage
//!
//! ```bash
//! campus-cli status
//! campus-cli whoami
//! campus-cli mirror groupMode
//! campus-cli redirect
//! ```

use campus_console::guard::{LOGIN_PATH, optional_session, require_session};
use campus_console::store::keys;
use campus_console::{ConsoleConfig, SessionStore};
use chrono::Utc;

use super::CliError;

/// Report whether a valid session is persisted. Nothing is cleared.
#[allow(clippy::print_stdout)]
pub fn status(config: &ConsoleConfig) {
    let store = SessionStore::from_config(config);
    match store.check_at(Utc::now()) {
        Ok(()) => println!("Logged in."),
        Err(reason) => println!("Not logged in ({reason})."),
    }
}

/// Print the persisted session as JSON.
///
/// # Errors
///
/// Returns `CliError::NotLoggedIn` if no valid session is stored.
#[allow(clippy::print_stdout)]
pub fn whoami(config: &ConsoleConfig) -> Result<(), CliError> {
    let store = SessionStore::from_config(config);
    let session = require_session(&store).map_err(|_| CliError::NotLoggedIn)?;
    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}

/// Print one scalar mirror from the tab store.
///
/// # Errors
///
/// Returns `CliError::UnknownMirror` if `key` is not a mirror key.
#[allow(clippy::print_stdout)]
pub fn mirror(config: &ConsoleConfig, key: &str) -> Result<(), CliError> {
    if !keys::MIRRORS.contains(&key) {
        return Err(CliError::UnknownMirror(
            key.to_string(),
            keys::MIRRORS.join(", "),
        ));
    }
    let store = SessionStore::from_config(config);
    match store.mirror(key) {
        Some(value) => println!("{value}"),
        None => println!("(unset)"),
    }
    Ok(())
}

/// Print where the console would send the user right now.
#[allow(clippy::print_stdout)]
pub fn redirect(config: &ConsoleConfig) {
    let store = SessionStore::from_config(config);
    let path = optional_session(&store).map_or_else(
        || LOGIN_PATH.to_string(),
        |session| config.redirects().resolve_for_session(&session).path,
    );
    println!("{path}");
}
