//! Console configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CAMPUS_API_BASE_URL` - Base URL of the campus REST backend
//!
//! ## Optional
//! - `CAMPUS_LOGIN_ROUTE` - Authentication route (default: /auth/login)
//! - `CAMPUS_DURABLE_STORE_DIR` - Directory of the durable session store
//!   (default: $HOME/.campus-console/durable)
//! - `CAMPUS_TAB_STORE_DIR` - Directory of the tab-scoped session store
//!   (default: <temp dir>/campus-console/tab)
//! - `CAMPUS_DEFAULT_DASHBOARD` - Default post-login path (default: /dashboard)
//! - `CAMPUS_FINANCE_DASHBOARD` - Finance post-login path (default: /finance/dashboard)
//! - `CAMPUS_SESSION_MAX_AGE_HOURS` - Session freshness window (default: 24)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)

use std::path::PathBuf;

use campus_console_core::redirect::{DEFAULT_DASHBOARD, FINANCE_DASHBOARD};
use campus_console_core::validator::DEFAULT_MAX_AGE_HOURS;
use campus_console_core::{RedirectResolver, SessionValidator};
use chrono::TimeDelta;
use thiserror::Error;
use url::Url;

const DEFAULT_LOGIN_ROUTE: &str = "/auth/login";
const MAX_SESSION_AGE_HOURS: i64 = 24 * 365;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Console configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the campus REST backend
    pub api_base_url: Url,
    /// Full URL credentials are posted to
    pub login_url: Url,
    /// Directory backing the durable store
    pub durable_store_dir: PathBuf,
    /// Directory backing the tab-scoped store
    pub tab_store_dir: PathBuf,
    /// Destination when no other redirect rule applies
    pub default_dashboard: String,
    /// Destination for finance users
    pub finance_dashboard: String,
    /// How long a persisted session stays fresh
    pub session_max_age_hours: i64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
}

impl ConsoleConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = lookup("CAMPUS_API_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("CAMPUS_API_BASE_URL".to_string()))?;
        let api_base_url = Url::parse(&base).map_err(|e| {
            ConfigError::InvalidEnvVar("CAMPUS_API_BASE_URL".to_string(), e.to_string())
        })?;
        if api_base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "CAMPUS_API_BASE_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }

        let login_route = lookup("CAMPUS_LOGIN_ROUTE")
            .unwrap_or_else(|| DEFAULT_LOGIN_ROUTE.to_string());
        let login_url = join_route(&api_base_url, &login_route)?;

        let durable_store_dir = lookup("CAMPUS_DURABLE_STORE_DIR").map_or_else(
            || {
                lookup("HOME")
                    .map_or_else(|| PathBuf::from(".campus-console"), |home| {
                        PathBuf::from(home).join(".campus-console")
                    })
                    .join("durable")
            },
            PathBuf::from,
        );
        let tab_store_dir = lookup("CAMPUS_TAB_STORE_DIR").map_or_else(
            || std::env::temp_dir().join("campus-console").join("tab"),
            PathBuf::from,
        );

        let default_dashboard = get_path(&lookup, "CAMPUS_DEFAULT_DASHBOARD", DEFAULT_DASHBOARD)?;
        let finance_dashboard = get_path(&lookup, "CAMPUS_FINANCE_DASHBOARD", FINANCE_DASHBOARD)?;

        let session_max_age_hours = match lookup("CAMPUS_SESSION_MAX_AGE_HOURS") {
            Some(raw) => parse_max_age(&raw)?,
            None => DEFAULT_MAX_AGE_HOURS,
        };

        let sentry_dsn = lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty());
        let sentry_environment = lookup("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = lookup("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            api_base_url,
            login_url,
            durable_store_dir,
            tab_store_dir,
            default_dashboard,
            finance_dashboard,
            session_max_age_hours,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
        })
    }

    /// Session validator using the configured freshness window.
    #[must_use]
    pub fn validator(&self) -> SessionValidator {
        SessionValidator::new(TimeDelta::hours(self.session_max_age_hours))
    }

    /// Redirect resolver using the configured dashboard paths.
    #[must_use]
    pub fn redirects(&self) -> RedirectResolver {
        RedirectResolver::new(&self.default_dashboard, &self.finance_dashboard)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Append a route to the base URL, keeping any path prefix of the base.
fn join_route(base: &Url, route: &str) -> Result<Url, ConfigError> {
    let route = route.trim();
    if route.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "CAMPUS_LOGIN_ROUTE".to_string(),
            "must not be empty".to_string(),
        ));
    }
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        route.trim_start_matches('/')
    );
    Url::parse(&joined)
        .map_err(|e| ConfigError::InvalidEnvVar("CAMPUS_LOGIN_ROUTE".to_string(), e.to_string()))
}

/// Get a navigation path, which must be absolute.
fn get_path<F>(lookup: &F, key: &str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = lookup(key).unwrap_or_else(|| default.to_string());
    if !path.starts_with('/') {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must start with '/' (got {path:?})"),
        ));
    }
    Ok(path)
}

fn parse_max_age(raw: &str) -> Result<i64, ConfigError> {
    let hours = raw.trim().parse::<i64>().map_err(|e| {
        ConfigError::InvalidEnvVar("CAMPUS_SESSION_MAX_AGE_HOURS".to_string(), e.to_string())
    })?;
    if !(1..=MAX_SESSION_AGE_HOURS).contains(&hours) {
        return Err(ConfigError::InvalidEnvVar(
            "CAMPUS_SESSION_MAX_AGE_HOURS".to_string(),
            format!("must be between 1 and {MAX_SESSION_AGE_HOURS}"),
        ));
    }
    Ok(hours)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ConsoleConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ConsoleConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("CAMPUS_API_BASE_URL", "https://campus.example.edu"),
            ("HOME", "/home/asha"),
        ])
        .unwrap();

        assert_eq!(
            config.login_url.as_str(),
            "https://campus.example.edu/auth/login"
        );
        assert_eq!(
            config.durable_store_dir,
            PathBuf::from("/home/asha/.campus-console/durable")
        );
        assert!(config.tab_store_dir.ends_with("campus-console/tab"));
        assert_eq!(config.default_dashboard, "/dashboard");
        assert_eq!(config.finance_dashboard, "/finance/dashboard");
        assert_eq!(config.session_max_age_hours, 24);
        assert!(config.sentry_dsn.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_base_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "CAMPUS_API_BASE_URL"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load(&[("CAMPUS_API_BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = load(&[("CAMPUS_API_BASE_URL", "mailto:ops@example.edu")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_login_route_keeps_base_path() {
        let config = load(&[
            ("CAMPUS_API_BASE_URL", "https://campus.example.edu/api/"),
            ("CAMPUS_LOGIN_ROUTE", "/v2/login"),
        ])
        .unwrap();
        assert_eq!(
            config.login_url.as_str(),
            "https://campus.example.edu/api/v2/login"
        );
    }

    #[test]
    fn test_dashboard_paths_must_be_absolute() {
        let err = load(&[
            ("CAMPUS_API_BASE_URL", "https://campus.example.edu"),
            ("CAMPUS_FINANCE_DASHBOARD", "finance"),
        ])
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "CAMPUS_FINANCE_DASHBOARD")
        );
    }

    #[test]
    fn test_max_age_bounds() {
        let base = ("CAMPUS_API_BASE_URL", "https://campus.example.edu");
        assert!(load(&[base, ("CAMPUS_SESSION_MAX_AGE_HOURS", "0")]).is_err());
        assert!(load(&[base, ("CAMPUS_SESSION_MAX_AGE_HOURS", "abc")]).is_err());
        let config = load(&[base, ("CAMPUS_SESSION_MAX_AGE_HOURS", "8")]).unwrap();
        assert_eq!(config.validator().max_age(), TimeDelta::hours(8));
    }

    #[test]
    fn test_redirects_use_configured_paths() {
        let config = load(&[
            ("CAMPUS_API_BASE_URL", "https://campus.example.edu"),
            ("CAMPUS_DEFAULT_DASHBOARD", "/home"),
        ])
        .unwrap();
        let target = config
            .redirects()
            .resolve_target(&serde_json::json!({"roles": ["teacher"]}), None);
        assert_eq!(target.path, "/home");
    }
}
