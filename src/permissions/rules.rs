//! Role to capability table.
//!
//! Every authorization decision in the crate goes through [`is_permitted`];
//! nothing else compares roles directly.

use super::types::Capability;
use crate::error::{Result, RosterError};
use crate::models::Role;

/// Roles granted each capability
pub fn permitted_roles(capability: Capability) -> &'static [Role] {
    match capability {
        Capability::ViewAllAccounts => &[Role::Supervisor, Role::Coordinator],
        Capability::ManageAccounts => &[Role::Coordinator],
        Capability::ChangeAnyPassword => &[Role::Supervisor, Role::Coordinator],
        Capability::ManageRegistration => &[Role::Coordinator, Role::HierarchyAdmin],
        Capability::ViewRoster => &Role::ALL,
        Capability::EditRoster => &[Role::Coordinator, Role::Supervisor],
    }
}

pub fn is_permitted(role: Role, capability: Capability) -> bool {
    permitted_roles(capability).contains(&role)
}

/// `Ok` when `role` holds `capability`, otherwise `PermissionDenied`
pub fn require(role: Role, capability: Capability) -> Result<()> {
    if is_permitted(role, capability) {
        Ok(())
    } else {
        Err(RosterError::PermissionDenied {
            message: format!("{} accounts cannot {}", role.label(), capability),
        })
    }
}

/// Like [`require`], for an optional session role
pub fn require_session(role: Option<Role>, capability: Capability) -> Result<()> {
    match role {
        Some(role) => require(role, capability),
        None => Err(RosterError::NotAuthenticated),
    }
}

/// Every capability `role` holds
pub fn capabilities_of(role: Role) -> Vec<Capability> {
    Capability::ALL
        .iter()
        .copied()
        .filter(|c| is_permitted(role, *c))
        .collect()
}

pub fn can_view_all_accounts(role: Role) -> bool {
    is_permitted(role, Capability::ViewAllAccounts)
}

pub fn can_manage_registration(role: Role) -> bool {
    is_permitted(role, Capability::ManageRegistration)
}

pub fn can_view_roster(role: Role) -> bool {
    is_permitted(role, Capability::ViewRoster)
}

pub fn can_edit_roster(role: Role) -> bool {
    is_permitted(role, Capability::EditRoster)
}
