// src/permissions/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named permission granted to one or more roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// List every staff account
    ViewAllAccounts,
    /// Create staff accounts
    ManageAccounts,
    /// Change the password of any account, not only one's own
    ChangeAnyPassword,
    /// Register new roster members
    ManageRegistration,
    ViewRoster,
    EditRoster,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::ViewAllAccounts,
        Capability::ManageAccounts,
        Capability::ChangeAnyPassword,
        Capability::ManageRegistration,
        Capability::ViewRoster,
        Capability::EditRoster,
    ];

    pub fn describe(&self) -> &'static str {
        match self {
            Capability::ViewAllAccounts => "view all accounts",
            Capability::ManageAccounts => "create accounts",
            Capability::ChangeAnyPassword => "change other accounts' passwords",
            Capability::ManageRegistration => "register members",
            Capability::ViewRoster => "view the roster",
            Capability::EditRoster => "edit the roster",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.describe())
    }
}
