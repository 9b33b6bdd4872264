use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RosterError;

/// Staff role attached to every account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Coordinator,
    Supervisor,
    CourseAdmin,
    HierarchyAdmin,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Coordinator,
        Role::Supervisor,
        Role::CourseAdmin,
        Role::HierarchyAdmin,
    ];

    /// Identifier used in storage and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Coordinator => "coordinator",
            Role::Supervisor => "supervisor",
            Role::CourseAdmin => "courseAdmin",
            Role::HierarchyAdmin => "hierarchyAdmin",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Role::Coordinator => "Coordinator",
            Role::Supervisor => "Supervisor",
            Role::CourseAdmin => "Course Admin",
            Role::HierarchyAdmin => "Hierarchy Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| {
                RosterError::validation(
                    "role",
                    format!(
                        "'{}' is not one of coordinator, supervisor, courseAdmin, hierarchyAdmin",
                        s
                    ),
                )
            })
    }
}

/// A staff login. Passwords are kept and compared as plain strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl Account {
    pub fn new(username: &str, password: &str, role: Role) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            role,
        }
    }

    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// Account without its password, for listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSummary {
    pub username: String,
    pub role: Role,
}
