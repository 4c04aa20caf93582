//! Session Builder.
//!
//! Turns the raw authentication response into a [`CanonicalSession`]. The
//! builder only normalizes; persisting the result is the caller's job and
//! happens only after this returns `Ok`, so a rejected response never
//! leaves a partial session behind.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::InvalidResponse;
use crate::payload::{Field, coerce_string};
use crate::types::role::{normalize_token, split_tokens};
use crate::types::{CanonicalSession, GroupMode, RoleProfile, normalize_roles};

/// Builds the canonical session from a successful login response.
///
/// `now` becomes the session's `loginTime`.
///
/// # Errors
///
/// Returns [`InvalidResponse::NotAnObject`] if the body is not a JSON
/// object, and [`InvalidResponse::MissingRoles`] if `roles` is absent or
/// holds no usable role code.
///
/// # Example
///
/// ```
/// use campus_console_core::{GroupMode, build_session};
/// use serde_json::json;
///
/// let raw = json!({"username": "u1", "roles": "grp_adm"});
/// let session = build_session(&raw, chrono::Utc::now()).unwrap();
/// assert_eq!(session.group_mode, GroupMode::GroupOfInstitute);
/// assert_eq!(session.child_user_role.as_deref(), Some("grp_mgmt_usr"));
/// ```
pub fn build_session(raw: &Value, now: DateTime<Utc>) -> Result<CanonicalSession, InvalidResponse> {
    if !raw.is_object() {
        return Err(InvalidResponse::NotAnObject);
    }

    let roles_value = Field::Roles.resolve(raw).ok_or(InvalidResponse::MissingRoles)?;
    let received_roles = received_roles(roles_value);
    let role_set = normalize_roles(roles_value);
    if role_set.is_empty() {
        return Err(InvalidResponse::MissingRoles);
    }

    let primary_role = Field::PrimaryRole.resolve_string(raw).unwrap_or_default();
    let role_description = Field::RoleDescription
        .resolve_string(raw)
        .unwrap_or_default();
    let profile =
        RoleProfile::new(role_set, Some(&primary_role)).with_description(Some(&role_description));

    let is_group_admin = profile.is_group_admin();
    let group_mode = GroupMode::derive(is_group_admin, profile.is_group_mgmt_user());

    let username = Field::Username.resolve_string(raw);
    let user_id = Field::UserId.resolve_string(raw).unwrap_or_default();
    let name = Field::Name
        .resolve_string(raw)
        .or_else(|| username.clone())
        .unwrap_or_else(|| user_id.clone());

    Ok(CanonicalSession {
        user_id,
        username,
        name,
        email: Field::Email.resolve_string(raw),
        primary_role,
        role_description,
        roles: received_roles,
        is_authenticated: true,
        login_time: now,
        student_id: Field::StudentId.resolve_string(raw),
        roll_no: Field::RollNo.resolve_string(raw),
        semester: Field::Semester.resolve_string(raw),
        section: Field::Section.resolve_string(raw),
        teacher_id: Field::TeacherId.resolve_string(raw),
        designation: Field::Designation.resolve_string(raw),
        teacher_type: Field::TeacherType.resolve_string(raw),
        active_college_id: Field::ActiveCollegeId.resolve_string(raw),
        active_college_name: Field::ActiveCollegeName.resolve_string(raw),
        college_code: Field::CollegeCode.resolve_string(raw),
        active_group_id: Field::ActiveGroupId.resolve_string(raw),
        active_group_name: Field::ActiveGroupName.resolve_string(raw),
        group_owner_id: Field::GroupOwnerId.resolve_string(raw),
        hide_charts: profile.is_student(),
        is_group_admin,
        is_hr: profile.is_hr(),
        group_mode,
        child_user_role: group_mode.child_user_role().map(str::to_owned),
    })
}

/// Role codes as received: array elements in order, or the tokens of a
/// role string. Not normalized.
fn received_roles(roles: &Value) -> Vec<String> {
    match roles {
        Value::Array(items) => items
            .iter()
            .filter_map(coerce_string)
            .filter(|item| normalize_token(item).is_some())
            .collect(),
        Value::String(s) => split_tokens(s).map(str::to_owned).collect(),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Object(_) => Vec::new(),
    }
}
