//! Role classification.
//!
//! The authentication server encodes roles in several ways: an array of
//! codes (`["FIN_ACT", "hr"]`), a comma or space separated string
//! (`"fin_act, hr"`), or a free-text description (`"Finance Accountant"`).
//! [`normalize_roles`] folds all of these into one [`RoleSet`] of
//! lower-case, underscore-separated tokens, and [`RoleProfile`] answers the
//! fixed yes/no questions the console asks about a user.
//!
//! ## Vocabulary
//!
//! Every predicate matches whole tokens from a fixed list. There is no
//! prefix or substring matching: `finance_staff` is not a finance role.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::payload::coerce_string;

/// Role codes recognized by the classifier.
pub mod codes {
    /// Finance accountant.
    pub const FIN_ACT: &str = "fin_act";
    /// Finance accountant with admin rights.
    pub const FIN_ACT_ADM: &str = "fin_act_adm";
    /// Group (institute) administrator.
    pub const GRP_ADM: &str = "grp_adm";
    /// Group management user.
    pub const GRP_MGMT_USR: &str = "grp_mgmt_usr";

    /// Codes granting the finance dashboard.
    pub const FINANCE: &[&str] = &[FIN_ACT, FIN_ACT_ADM];
    /// Primary-role strings granting the finance dashboard.
    pub const FINANCE_PRIMARY: &[&str] = &["finance", "finance_admin"];
    /// Codes identifying a student account.
    pub const STUDENT: &[&str] = &[
        "student",
        "stu_curr",
        "stu_onboard",
        "stu_passed",
        "stu_council",
        "student_council",
    ];
    /// Codes identifying an HR account.
    pub const HR: &[&str] = &["hr_leave", "role_hr", "hr"];
}

/// Normalizes a single role token.
///
/// Trims, lower-cases and replaces `-` with `_`. Returns `None` for tokens
/// that are empty after trimming.
#[must_use]
pub fn normalize_token(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_lowercase().replace('-', "_"))
}

/// Splits a role string on any run of commas or whitespace.
pub fn split_tokens(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

/// Normalizes a role-like JSON value into a [`RoleSet`].
///
/// Arrays contribute each scalar element as one token; strings are split on
/// commas and whitespace; anything else contributes nothing.
///
/// ```
/// use campus_console_core::normalize_roles;
/// use serde_json::json;
///
/// assert!(normalize_roles(&json!(["FIN_ACT"])).contains("fin_act"));
/// assert!(normalize_roles(&json!("Fin-Act")).contains("fin_act"));
/// assert!(normalize_roles(&json!(null)).is_empty());
/// ```
#[must_use]
pub fn normalize_roles(roles_like: &Value) -> RoleSet {
    match roles_like {
        Value::Array(items) => items
            .iter()
            .filter_map(coerce_string)
            .filter_map(|item| normalize_token(&item))
            .collect(),
        Value::String(s) => RoleSet::parse(s),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Object(_) => RoleSet::default(),
    }
}

/// A set of normalized role codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// Parses a comma/whitespace separated role string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        split_tokens(s).filter_map(normalize_token).collect()
    }

    /// Returns `true` if the set contains `code`.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    /// Returns `true` if the set contains any of `codes`.
    #[must_use]
    pub fn contains_any(&self, codes: &[&str]) -> bool {
        codes.iter().any(|code| self.contains(code))
    }

    /// Adds every role of `other` to this set.
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the roles in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for RoleSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A user's normalized roles together with their primary role string.
///
/// The primary role is kept separately because the finance predicate
/// compares it as a whole (`Finance_Admin`), while its tokens also join the
/// role set for every other predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleProfile {
    roles: RoleSet,
    primary: String,
}

impl RoleProfile {
    /// Builds a profile from a normalized role set and a primary role.
    #[must_use]
    pub fn new(roles: RoleSet, primary_role: Option<&str>) -> Self {
        let primary_role = primary_role.unwrap_or_default();
        Self {
            roles: roles.union(RoleSet::parse(primary_role)),
            primary: primary_role.trim().to_lowercase(),
        }
    }

    /// Builds a profile straight from a response-shaped `roles` value.
    #[must_use]
    pub fn from_value(roles_like: &Value, primary_role: Option<&str>) -> Self {
        Self::new(normalize_roles(roles_like), primary_role)
    }

    /// Adds the tokens of a free-text role description.
    #[must_use]
    pub fn with_description(mut self, description: Option<&str>) -> Self {
        if let Some(description) = description {
            self.roles = self.roles.union(RoleSet::parse(description));
        }
        self
    }

    /// The combined role set (roles, primary role and description tokens).
    #[must_use]
    pub const fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Finance user: `fin_act`/`fin_act_adm`, or a primary role of exactly
    /// `finance`/`finance_admin`.
    #[must_use]
    pub fn is_finance(&self) -> bool {
        self.roles.contains_any(codes::FINANCE)
            || codes::FINANCE_PRIMARY.contains(&self.primary.as_str())
    }

    #[must_use]
    pub fn is_student(&self) -> bool {
        self.roles.contains_any(codes::STUDENT)
    }

    #[must_use]
    pub fn is_group_admin(&self) -> bool {
        self.primary == codes::GRP_ADM || self.roles.contains(codes::GRP_ADM)
    }

    #[must_use]
    pub fn is_group_mgmt_user(&self) -> bool {
        self.primary == codes::GRP_MGMT_USR || self.roles.contains(codes::GRP_MGMT_USR)
    }

    #[must_use]
    pub fn is_hr(&self) -> bool {
        self.roles.contains_any(codes::HR)
    }
}
