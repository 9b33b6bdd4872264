pub mod seed;
pub mod settings;

pub use seed::{bootstrap_accounts, seed_attendance, seed_members};
pub use settings::{BootstrapAccount, Settings, SETTINGS_FILE};
