//! The canonical session record.
//!
//! One normalized representation of "who is logged in and with what
//! authority", shared by every console screen. It is built once per login
//! and replaced wholesale on the next one; nothing updates it in place.
//!
//! ## Wire format
//!
//! Serialized field names are camelCase, except the role strings which keep
//! the names the authentication server uses (`user_role`,
//! `role_description`) so screens reading the raw record find them where
//! they expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::group_mode::GroupMode;
use super::role::RoleProfile;
use super::role::normalize_roles;

/// Session record persisted after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalSession {
    /// Resolved user identifier.
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Primary role, verbatim from the server.
    #[serde(rename = "user_role", default)]
    pub primary_role: String,
    /// Free-text role description, verbatim from the server.
    #[serde(rename = "role_description", default)]
    pub role_description: String,
    /// Role codes in the order received (not normalized).
    pub roles: Vec<String>,
    pub is_authenticated: bool,
    pub login_time: DateTime<Utc>,

    // Student
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub roll_no: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub section: Option<String>,

    // Teacher
    #[serde(default)]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub teacher_type: Option<String>,

    // College / group context
    #[serde(default)]
    pub active_college_id: Option<String>,
    #[serde(default)]
    pub active_college_name: Option<String>,
    #[serde(default)]
    pub college_code: Option<String>,
    #[serde(default)]
    pub active_group_id: Option<String>,
    #[serde(default)]
    pub active_group_name: Option<String>,
    #[serde(default)]
    pub group_owner_id: Option<String>,

    // Derived flags
    #[serde(default)]
    pub hide_charts: bool,
    #[serde(default)]
    pub is_group_admin: bool,
    #[serde(default)]
    pub is_hr: bool,
    #[serde(default)]
    pub group_mode: GroupMode,
    #[serde(default)]
    pub child_user_role: Option<String>,
}

impl CanonicalSession {
    /// Role profile of the stored roles and primary role.
    ///
    /// Used to re-derive role-based decisions (such as the redirect target)
    /// from a persisted session when no live server response exists.
    #[must_use]
    pub fn role_profile(&self) -> RoleProfile {
        let roles = serde_json::Value::from(self.roles.clone());
        RoleProfile::new(normalize_roles(&roles), Some(&self.primary_role))
    }
}
