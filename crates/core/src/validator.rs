//! Session Validator.
//!
//! Decides whether a previously persisted session can be reused on page
//! entry. It reads the raw JSON held by the durable and tab-scoped stores
//! rather than a typed record, so records written by older console versions
//! (which used `userid` or `username` for the identifier) are still
//! recognized. Any parse failure counts as "no session".

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde_json::Value;

use crate::payload::{coerce_string, lookup, resolve};

/// Default freshness window, in hours.
pub const DEFAULT_MAX_AGE_HOURS: i64 = 24;

/// Identifier keys of a stored record, highest priority first.
const RECORD_ID_KEYS: [&str; 3] = ["userId", "userid", "username"];

/// Why a persisted session was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidity {
    /// Nothing under the durable key.
    MissingDurableRecord,
    /// The durable record is not valid JSON.
    UnreadableDurableRecord,
    /// The durable record has no non-empty identifier.
    MissingUserId,
    /// `isAuthenticated` is not the boolean `true`.
    NotAuthenticated,
    /// Nothing under the tab key.
    MissingTabRecord,
    /// The tab record is not valid JSON.
    UnreadableTabRecord,
    /// Durable and tab records belong to different users.
    IdentityMismatch,
    /// `loginTime` is older than the freshness window.
    Expired,
}

impl std::fmt::Display for Invalidity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::MissingDurableRecord => "missing durable record",
            Self::UnreadableDurableRecord => "unreadable durable record",
            Self::MissingUserId => "missing user id",
            Self::NotAuthenticated => "not authenticated",
            Self::MissingTabRecord => "missing tab record",
            Self::UnreadableTabRecord => "unreadable tab record",
            Self::IdentityMismatch => "identity mismatch",
            Self::Expired => "expired",
        };
        f.write_str(reason)
    }
}

/// Checks persisted sessions against presence, identity and freshness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionValidator {
    max_age: TimeDelta,
}

impl Default for SessionValidator {
    fn default() -> Self {
        Self::new(TimeDelta::hours(DEFAULT_MAX_AGE_HOURS))
    }
}

impl SessionValidator {
    #[must_use]
    pub const fn new(max_age: TimeDelta) -> Self {
        Self { max_age }
    }

    #[must_use]
    pub const fn max_age(&self) -> TimeDelta {
        self.max_age
    }

    /// Checks the raw durable and tab records.
    ///
    /// # Errors
    ///
    /// Returns the first [`Invalidity`] found, in the order: durable record
    /// presence and shape, tab record presence, identity match, freshness.
    pub fn check(
        &self,
        durable: Option<&str>,
        tab: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), Invalidity> {
        let durable: Value = serde_json::from_str(durable.ok_or(Invalidity::MissingDurableRecord)?)
            .map_err(|_| Invalidity::UnreadableDurableRecord)?;
        let durable_id = record_user_id(&durable).ok_or(Invalidity::MissingUserId)?;
        if durable.get("isAuthenticated") != Some(&Value::Bool(true)) {
            return Err(Invalidity::NotAuthenticated);
        }

        let tab: Value = serde_json::from_str(tab.ok_or(Invalidity::MissingTabRecord)?)
            .map_err(|_| Invalidity::UnreadableTabRecord)?;
        if record_user_id(&tab).as_deref() != Some(durable_id.as_str()) {
            return Err(Invalidity::IdentityMismatch);
        }

        // A missing or unparseable loginTime is accepted.
        if let Some(login_time) = durable.get("loginTime").and_then(parse_login_time) {
            if now.signed_duration_since(login_time) >= self.max_age {
                return Err(Invalidity::Expired);
            }
        }

        Ok(())
    }

    /// Boolean form of [`check`](Self::check).
    #[must_use]
    pub fn is_valid(&self, durable: Option<&str>, tab: Option<&str>, now: DateTime<Utc>) -> bool {
        self.check(durable, tab, now).is_ok()
    }
}

/// Resolves the identifier of a stored record (`userId`, `userid`,
/// `username`), ignoring empty values.
#[must_use]
pub fn record_user_id(record: &Value) -> Option<String> {
    resolve(RECORD_ID_KEYS.iter().map(|key| lookup(record, key)))
        .and_then(coerce_string)
        .filter(|id| !id.is_empty())
}

/// Parses a stored `loginTime`: RFC 3339, or a zone-less timestamp taken
/// as UTC.
fn parse_login_time(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        "2026-10-18T12:00:00Z".parse().unwrap()
    }

    fn record(user_id: &str, hours_ago: Option<i64>) -> String {
        let mut value = json!({"userId": user_id, "isAuthenticated": true});
        if let Some(hours) = hours_ago {
            value["loginTime"] = json!((now() - TimeDelta::hours(hours)).to_rfc3339());
        }
        value.to_string()
    }

    #[test]
    fn test_identity_mismatch() {
        let validator = SessionValidator::default();
        let durable = record("u1", Some(1));
        let tab = json!({"userId": "u2"}).to_string();
        assert_eq!(
            validator.check(Some(&durable), Some(&tab), now()),
            Err(Invalidity::IdentityMismatch)
        );

        let durable = record("u1", None);
        assert!(!validator.is_valid(Some(&durable), Some(&tab), now()));
    }

    #[test]
    fn test_freshness_window() {
        let validator = SessionValidator::default();
        let stale = record("u1", Some(25));
        let fresh = record("u1", Some(23));
        assert_eq!(
            validator.check(Some(&stale), Some(&stale), now()),
            Err(Invalidity::Expired)
        );
        assert!(validator.is_valid(Some(&fresh), Some(&fresh), now()));
    }

    #[test]
    fn test_exactly_max_age_is_expired() {
        let validator = SessionValidator::default();
        let edge = record("u1", Some(24));
        assert!(!validator.is_valid(Some(&edge), Some(&edge), now()));
    }

    #[test]
    fn test_missing_or_unparseable_login_time_is_accepted() {
        let validator = SessionValidator::default();
        let missing = record("u1", None);
        assert!(validator.is_valid(Some(&missing), Some(&missing), now()));

        let garbage = json!({"userId": "u1", "isAuthenticated": true, "loginTime": "yesterday"})
            .to_string();
        assert!(validator.is_valid(Some(&garbage), Some(&garbage), now()));

        let numeric = json!({"userId": "u1", "isAuthenticated": true, "loginTime": 0}).to_string();
        assert!(validator.is_valid(Some(&numeric), Some(&numeric), now()));
    }

    #[test]
    fn test_naive_login_time_is_utc() {
        let validator = SessionValidator::default();
        let stale =
            json!({"userId": "u1", "isAuthenticated": true, "loginTime": "2026-10-17T06:00:00"})
                .to_string();
        assert_eq!(
            validator.check(Some(&stale), Some(&stale), now()),
            Err(Invalidity::Expired)
        );
    }

    #[test]
    fn test_presence_checks() {
        let validator = SessionValidator::default();
        let good = record("u1", Some(1));
        assert_eq!(
            validator.check(None, Some(&good), now()),
            Err(Invalidity::MissingDurableRecord)
        );
        assert_eq!(
            validator.check(Some(&good), None, now()),
            Err(Invalidity::MissingTabRecord)
        );
        assert_eq!(
            validator.check(Some("{not json"), Some(&good), now()),
            Err(Invalidity::UnreadableDurableRecord)
        );
        assert_eq!(
            validator.check(Some(&good), Some("{not json"), now()),
            Err(Invalidity::UnreadableTabRecord)
        );
    }

    #[test]
    fn test_authentication_flag_must_be_true() {
        let validator = SessionValidator::default();
        let tab = json!({"userId": "u1"}).to_string();
        for flag in [json!(false), json!("true"), json!(1), json!(null)] {
            let durable = json!({"userId": "u1", "isAuthenticated": flag}).to_string();
            assert_eq!(
                validator.check(Some(&durable), Some(&tab), now()),
                Err(Invalidity::NotAuthenticated),
                "{flag}"
            );
        }
    }

    #[test]
    fn test_empty_user_id_is_rejected() {
        let validator = SessionValidator::default();
        let durable = json!({"userId": "", "isAuthenticated": true}).to_string();
        assert_eq!(
            validator.check(Some(&durable), Some(&durable), now()),
            Err(Invalidity::MissingUserId)
        );
    }

    #[test]
    fn test_legacy_identifier_keys() {
        let validator = SessionValidator::default();
        let durable = json!({"userid": 7, "isAuthenticated": true}).to_string();
        let tab = json!({"username": "7"}).to_string();
        assert!(validator.is_valid(Some(&durable), Some(&tab), now()));
    }

    #[test]
    fn test_record_user_id_priority() {
        assert_eq!(
            record_user_id(&json!({"userId": "a", "userid": "b", "username": "c"})).as_deref(),
            Some("a")
        );
        assert_eq!(
            record_user_id(&json!({"userId": null, "username": "c"})).as_deref(),
            Some("c")
        );
        assert_eq!(record_user_id(&json!({})), None);
    }

    #[test]
    fn test_custom_window() {
        let validator = SessionValidator::new(TimeDelta::hours(1));
        let two_hours = record("u1", Some(2));
        assert!(!validator.is_valid(Some(&two_hours), Some(&two_hours), now()));
        assert_eq!(validator.max_age(), TimeDelta::hours(1));
    }
}
