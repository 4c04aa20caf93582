//! Group mode of an account.

use serde::{Deserialize, Serialize};

use super::role::codes;

/// How an account relates to the college/institute grouping hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    /// A standalone college account.
    #[default]
    SingleCollege,
    /// A college account managed from a group.
    CollegeUnderGroup,
    /// The group (institute) itself.
    GroupOfInstitute,
}

impl GroupMode {
    /// Derives the mode from the group predicates.
    ///
    /// Group admin wins over group-management user.
    #[must_use]
    pub const fn derive(is_group_admin: bool, is_group_mgmt_user: bool) -> Self {
        if is_group_admin {
            Self::GroupOfInstitute
        } else if is_group_mgmt_user {
            Self::CollegeUnderGroup
        } else {
            Self::SingleCollege
        }
    }

    /// Role a group admin acts on behalf of; `None` for every other mode.
    #[must_use]
    pub const fn child_user_role(self) -> Option<&'static str> {
        match self {
            Self::GroupOfInstitute => Some(codes::GRP_MGMT_USR),
            Self::SingleCollege | Self::CollegeUnderGroup => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleCollege => "single_college",
            Self::CollegeUnderGroup => "college_under_group",
            Self::GroupOfInstitute => "group_of_institute",
        }
    }
}

impl std::fmt::Display for GroupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GroupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_college" => Ok(Self::SingleCollege),
            "college_under_group" => Ok(Self::CollegeUnderGroup),
            "group_of_institute" => Ok(Self::GroupOfInstitute),
            _ => Err(format!("invalid group mode: {s}")),
        }
    }
}
