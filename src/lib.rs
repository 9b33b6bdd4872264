//! Membership registry and roster management for a ranked organization.
//!
//! Staff accounts log in with a role, the role decides which capabilities
//! they hold, and members are registered and edited through a repository
//! that keeps the roster in a local key-value store.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod managers;
pub mod models;
pub mod permissions;
pub mod state;

pub use error::{Result, RosterError};
