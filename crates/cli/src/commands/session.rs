//! Login and logout.
//!
//! # Usage
//!
//! ```bash
//! # Password from the environment
//! CAMPUS_PASSWORD=... campus-cli login --username asha
//!
//! # Password piped in
//! pass show campus | campus-cli login --username asha --password-stdin
//!
//! campus-cli logout
//! ```

use std::io::BufRead;

use campus_console::{ConsoleConfig, Credentials, LoginPage, LoginState};
use secrecy::SecretString;

use super::CliError;

const PASSWORD_ENV: &str = "CAMPUS_PASSWORD";

/// Log in, or reuse a still-valid session.
///
/// Prints the destination the console would navigate to.
///
/// # Errors
///
/// Returns `CliError::LoginFailed` with the form's message when the login is
/// rejected.
#[allow(clippy::print_stdout)]
pub async fn login(
    config: &ConsoleConfig,
    username: &str,
    password_stdin: bool,
) -> Result<(), CliError> {
    let mut page = LoginPage::from_config(config)?;

    if matches!(page.mount(), LoginState::RedirectPending { .. }) {
        if let Some(target) = page.navigate() {
            println!("Already logged in. Redirecting to {}", target.path);
        }
        return Ok(());
    }

    let password = read_password(password_stdin)?;
    let credentials = Credentials::new(username, password);

    match page.submit(&credentials).await {
        LoginState::RedirectPending { .. } => {}
        state => {
            let message = state
                .error()
                .map_or_else(|| "Login failed. Please try again.".to_string(), |e| e.message.clone());
            return Err(CliError::LoginFailed(message));
        }
    }

    if let Some(target) = page.navigate() {
        println!("Logged in. Redirecting to {}", target.path);
    }
    Ok(())
}

/// Destroy the persisted session.
///
/// # Errors
///
/// Returns `CliError::Store` if the stores cannot be cleared.
#[allow(clippy::print_stdout)]
pub fn logout(config: &ConsoleConfig) -> Result<(), CliError> {
    let mut page = LoginPage::from_config(config)?;
    page.logout()?;
    println!("Logged out.");
    Ok(())
}

fn read_password(from_stdin: bool) -> Result<SecretString, CliError> {
    if from_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        let password = line.trim_end_matches(['\r', '\n']);
        if password.is_empty() {
            return Err(CliError::MissingPassword);
        }
        return Ok(SecretString::from(password.to_string()));
    }

    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|password| !password.is_empty())
        .map(SecretString::from)
        .ok_or(CliError::MissingPassword)
}
