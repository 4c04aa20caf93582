//! Field resolution over loosely-typed authentication payloads.
//!
//! Backend versions disagree on key names: a teacher identifier may arrive
//! as `teacher_id`, `teacherid`, `teacherId` or nested as `teacher.id`.
//! [`Field`] names each logical value the console reads and carries the
//! ordered list of source paths it may be found under. [`resolve`] picks the
//! first candidate that is actually present.

use serde_json::Value;

/// Returns the first candidate that is present and not `null`.
///
/// `None` stands for an absent key. Falsy-but-meaningful values such as
/// `0`, `""` and `false` are returned as-is.
///
/// ```
/// use campus_console_core::resolve;
/// use serde_json::{Value, json};
///
/// let (null, zero, x) = (Value::Null, json!(0), json!("x"));
/// assert_eq!(resolve([None, Some(&null), Some(&zero), Some(&x)]), Some(&zero));
/// assert_eq!(resolve([None, Some(&null)]), None);
/// ```
pub fn resolve<'a, I>(candidates: I) -> Option<&'a Value>
where
    I: IntoIterator<Item = Option<&'a Value>>,
{
    candidates.into_iter().flatten().find(|value| !value.is_null())
}

/// Looks up a dotted path such as `teacher.id` in a JSON value.
///
/// A path without dots is a plain top-level key.
#[must_use]
pub fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(payload, |node, segment| node.get(segment))
}

/// Coerces a scalar JSON value into its string form.
///
/// Strings pass through unchanged, numbers and booleans are rendered.
/// Arrays, objects and `null` have no string form.
#[must_use]
pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// A logical field of the authentication response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    UserId,
    Username,
    Name,
    Email,
    PrimaryRole,
    RoleDescription,
    Roles,
    StudentId,
    RollNo,
    Semester,
    Section,
    TeacherId,
    Designation,
    TeacherType,
    ActiveCollegeId,
    ActiveCollegeName,
    CollegeCode,
    ActiveGroupId,
    ActiveGroupName,
    GroupOwnerId,
}

impl Field {
    /// Every logical field, in declaration order.
    pub const ALL: [Self; 20] = [
        Self::UserId,
        Self::Username,
        Self::Name,
        Self::Email,
        Self::PrimaryRole,
        Self::RoleDescription,
        Self::Roles,
        Self::StudentId,
        Self::RollNo,
        Self::Semester,
        Self::Section,
        Self::TeacherId,
        Self::Designation,
        Self::TeacherType,
        Self::ActiveCollegeId,
        Self::ActiveCollegeName,
        Self::CollegeCode,
        Self::ActiveGroupId,
        Self::ActiveGroupName,
        Self::GroupOwnerId,
    ];

    /// Source paths for this field, highest priority first.
    #[must_use]
    pub const fn sources(self) -> &'static [&'static str] {
        match self {
            Self::UserId => &["userId", "user_id", "userid", "user.id", "username"],
            Self::Username => &["username", "user_name", "userName", "user.username"],
            Self::Name => &["name", "full_name", "fullName", "display_name", "user.name"],
            Self::Email => &["email", "email_id", "emailId", "user.email"],
            Self::PrimaryRole => &["user_role", "userRole", "role"],
            Self::RoleDescription => &["role_description", "roleDescription", "role_desc"],
            Self::Roles => &["roles"],
            Self::StudentId => &["student_id", "studentid", "studentId", "student.id"],
            Self::RollNo => &["roll_no", "rollNo", "enrollment_no", "student.roll_no"],
            Self::Semester => &["semester", "current_semester", "student.semester"],
            Self::Section => &["section", "student.section"],
            Self::TeacherId => &["teacher_id", "teacherid", "teacherId", "teacher.id"],
            Self::Designation => &["designation", "teacher_designation", "teacher.designation"],
            Self::TeacherType => &["teacher_type", "teacherType", "teacher.type"],
            Self::ActiveCollegeId => &[
                "active_college_id",
                "activeCollegeId",
                "college_id",
                "collegeId",
                "college.id",
            ],
            Self::ActiveCollegeName => &["active_college_name", "college_name", "college.name"],
            Self::CollegeCode => &["college_code", "collegeCode", "college.code"],
            Self::ActiveGroupId => &[
                "active_group_id",
                "activeGroupId",
                "group_id",
                "groupId",
                "group.id",
            ],
            Self::ActiveGroupName => &["active_group_name", "group_name", "group.name"],
            Self::GroupOwnerId => &["group_owner_id", "groupOwnerId", "owner_group_id"],
        }
    }

    /// Resolves this field in `payload` using its source priority.
    #[must_use]
    pub fn resolve(self, payload: &Value) -> Option<&Value> {
        resolve(self.sources().iter().map(|path| lookup(payload, path)))
    }

    /// Resolves this field and coerces the winner to a string.
    #[must_use]
    pub fn resolve_string(self, payload: &Value) -> Option<String> {
        self.resolve(payload).and_then(coerce_string)
    }
}
