//! The login page.
//!
//! ```text
//! AnonymousForm -> Submitting -> Authenticated -> RedirectPending -> Navigated
//!                           \-> Rejected -> AnonymousForm (with error)
//! ```
//!
//! On mount, a still-valid persisted session skips the form and goes
//! straight to `RedirectPending`.

use campus_console_core::{Destination, RedirectResolver, build_session};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::client::{AuthClient, Credentials};
use crate::config::ConsoleConfig;
use crate::error::{FailureKind, LoginError, clear_sentry_user, set_sentry_user};
use crate::store::SessionStore;

/// Error displayed on the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&LoginError> for FormError {
    fn from(err: &LoginError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

/// Where the login page is in its flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    /// Showing the form, with the previous attempt's error if any.
    AnonymousForm { error: Option<FormError> },
    /// Credentials sent, waiting for the server.
    Submitting,
    /// Session persisted, destination not yet chosen.
    Authenticated,
    /// The attempt failed.
    Rejected { error: FormError },
    /// A destination was chosen.
    RedirectPending { target: Destination },
    /// The page handed off to the destination.
    Navigated { target: Destination },
}

impl LoginState {
    const fn name(&self) -> &'static str {
        match self {
            Self::AnonymousForm { .. } => "anonymous_form",
            Self::Submitting => "submitting",
            Self::Authenticated => "authenticated",
            Self::Rejected { .. } => "rejected",
            Self::RedirectPending { .. } => "redirect_pending",
            Self::Navigated { .. } => "navigated",
        }
    }

    /// The pending or reached destination.
    #[must_use]
    pub const fn target(&self) -> Option<&Destination> {
        match self {
            Self::RedirectPending { target } | Self::Navigated { target } => Some(target),
            _ => None,
        }
    }

    /// The error shown on the form.
    #[must_use]
    pub const fn error(&self) -> Option<&FormError> {
        match self {
            Self::AnonymousForm { error } => error.as_ref(),
            Self::Rejected { error } => Some(error),
            _ => None,
        }
    }
}

/// Drives one login page: the auth call, session persistence and the
/// redirect decision.
#[derive(Debug)]
pub struct LoginPage {
    client: AuthClient,
    store: SessionStore,
    redirects: RedirectResolver,
    state: LoginState,
}

impl LoginPage {
    #[must_use]
    pub const fn new(client: AuthClient, store: SessionStore, redirects: RedirectResolver) -> Self {
        Self {
            client,
            store,
            redirects,
            state: LoginState::AnonymousForm { error: None },
        }
    }

    /// Build a page from configuration with file-backed stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            AuthClient::new(config.login_url.clone())?,
            SessionStore::from_config(config),
            config.redirects(),
        ))
    }

    #[must_use]
    pub const fn state(&self) -> &LoginState {
        &self.state
    }

    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Enter the page. A valid persisted session skips the form.
    pub fn mount(&mut self) -> &LoginState {
        match self.store.load() {
            Some(session) => {
                debug!(user_id = %session.user_id, "reusing persisted session");
                set_sentry_user(&session.user_id, session.email.as_deref());
                let target = self.redirects.resolve_for_session(&session);
                self.transition(LoginState::RedirectPending { target });
            }
            None => self.transition(LoginState::AnonymousForm { error: None }),
        }
        &self.state
    }

    /// Submit the form.
    ///
    /// Failures never escape: the page returns to the form with the
    /// failure's message, and nothing is persisted.
    pub async fn submit(&mut self, credentials: &Credentials) -> &LoginState {
        self.transition(LoginState::Submitting);

        match self.authenticate(credentials).await {
            Ok(target) => {
                self.transition(LoginState::Authenticated);
                self.transition(LoginState::RedirectPending { target });
            }
            Err(err) => {
                err.report();
                let error = FormError::from(&err);
                self.transition(LoginState::Rejected {
                    error: error.clone(),
                });
                self.transition(LoginState::AnonymousForm { error: Some(error) });
            }
        }
        &self.state
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<Destination, LoginError> {
        let response = self.client.login(credentials).await?;
        let session = build_session(&response.body, Utc::now())?;
        let target = self
            .redirects
            .resolve_target(&response.body, response.redirect_header.as_deref());

        self.store.save(&session)?;

        if session.user_id.is_empty() {
            warn!("session built without a user identifier; it will not survive a reload");
        }
        set_sentry_user(&session.user_id, session.email.as_deref());
        info!(
            user_id = %session.user_id,
            group_mode = %session.group_mode,
            target = %target.path,
            "User logged in"
        );
        Ok(target)
    }

    /// Hand off to the pending destination.
    ///
    /// Returns the destination, or `None` if nothing is pending.
    pub fn navigate(&mut self) -> Option<Destination> {
        let LoginState::RedirectPending { target } = &self.state else {
            return None;
        };
        let target = target.clone();
        self.transition(LoginState::Navigated {
            target: target.clone(),
        });
        Some(target)
    }

    /// Destroy the session and return to an empty form.
    ///
    /// # Errors
    ///
    /// Returns `LoginError::Store` if the stores cannot be cleared.
    pub fn logout(&mut self) -> Result<(), LoginError> {
        self.store.clear()?;
        clear_sentry_user();
        info!("User logged out");
        self.transition(LoginState::AnonymousForm { error: None });
        Ok(())
    }

    fn transition(&mut self, next: LoginState) {
        debug!(from = self.state.name(), to = next.name(), "login state");
        self.state = next;
    }
}
