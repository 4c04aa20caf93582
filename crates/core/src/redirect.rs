//! Redirect Resolver.
//!
//! Picks where to send the user after login. First match wins:
//!
//! 1. `redirect_url` in the response body
//! 2. the `x-redirect-to` response header
//! 3. the finance dashboard, if the finance predicate holds
//! 4. the default dashboard
//!
//! On page entry with a still-valid stored session there is no live
//! response, so only steps 3 and 4 apply, using the stored roles.

use serde_json::Value;

use crate::payload::Field;
use crate::types::{CanonicalSession, RoleProfile};

/// Body field carrying a server-chosen destination.
pub const REDIRECT_URL_FIELD: &str = "redirect_url";
/// Response header carrying a server-chosen destination.
pub const REDIRECT_HEADER: &str = "x-redirect-to";
/// Default dashboard path.
pub const DEFAULT_DASHBOARD: &str = "/dashboard";
/// Finance dashboard path.
pub const FINANCE_DASHBOARD: &str = "/finance/dashboard";

/// Which rule produced a [`Destination`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectSource {
    ResponseBody,
    ResponseHeader,
    FinanceRole,
    Default,
}

/// A navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub path: String,
    pub source: RedirectSource,
}

/// Resolves post-login destinations against configured dashboard paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResolver {
    default_dashboard: String,
    finance_dashboard: String,
}

impl Default for RedirectResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DASHBOARD, FINANCE_DASHBOARD)
    }
}

impl RedirectResolver {
    #[must_use]
    pub fn new(default_dashboard: impl Into<String>, finance_dashboard: impl Into<String>) -> Self {
        Self {
            default_dashboard: default_dashboard.into(),
            finance_dashboard: finance_dashboard.into(),
        }
    }

    /// Resolves the destination after a live login response.
    ///
    /// `redirect_header` is the value of the `x-redirect-to` header, if any.
    #[must_use]
    pub fn resolve_target(&self, body: &Value, redirect_header: Option<&str>) -> Destination {
        if let Some(path) = body
            .get(REDIRECT_URL_FIELD)
            .and_then(Value::as_str)
            .and_then(non_empty)
        {
            return Destination {
                path: path.to_owned(),
                source: RedirectSource::ResponseBody,
            };
        }

        if let Some(path) = redirect_header.and_then(non_empty) {
            return Destination {
                path: path.to_owned(),
                source: RedirectSource::ResponseHeader,
            };
        }

        let roles = Field::Roles.resolve(body).unwrap_or(&Value::Null);
        let primary_role = Field::PrimaryRole.resolve_string(body);
        self.by_role(&RoleProfile::from_value(roles, primary_role.as_deref()))
    }

    /// Resolves the destination for an already persisted session.
    #[must_use]
    pub fn resolve_for_session(&self, session: &CanonicalSession) -> Destination {
        self.by_role(&session.role_profile())
    }

    fn by_role(&self, profile: &RoleProfile) -> Destination {
        if profile.is_finance() {
            Destination {
                path: self.finance_dashboard.clone(),
                source: RedirectSource::FinanceRole,
            }
        } else {
            Destination {
                path: self.default_dashboard.clone(),
                source: RedirectSource::Default,
            }
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}
