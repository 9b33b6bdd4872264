pub mod rules;
pub mod types;

pub use rules::{
    can_edit_roster, can_manage_registration, can_view_all_accounts, can_view_roster,
    capabilities_of, is_permitted, permitted_roles, require, require_session,
};
pub use types::Capability;
