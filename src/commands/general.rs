use clap::Subcommand;
use tracing::info;

use super::Data;
use crate::error::{Result, RosterError};
use crate::permissions::capabilities_of;

/// Session commands
#[derive(Subcommand, Debug, Clone)]
pub enum GeneralCommand {
    /// Start a session
    Login {
        #[arg(long, short)]
        username: String,
        #[arg(long, short)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the logged-in account and what it may do
    Whoami,
}

pub async fn run_general(data: &Data, command: GeneralCommand) -> Result<String> {
    match command {
        GeneralCommand::Login { username, password } => {
            if data.credentials.login(&username, &password).await {
                Ok(format!("Logged in as {}", username))
            } else {
                Err(RosterError::InvalidCredentials)
            }
        }
        GeneralCommand::Logout => {
            data.credentials.logout().await?;
            Ok("Logged out".to_string())
        }
        GeneralCommand::Whoami => {
            let Some(account) = data.credentials.current_user().await else {
                return Err(RosterError::NotAuthenticated);
            };
            info!("whoami for '{}'", account.username);

            let capabilities: Vec<String> = capabilities_of(account.role)
                .iter()
                .map(|c| c.describe().to_string())
                .collect();
            Ok(format!(
                "{} ({})\nMay: {}",
                account.username,
                account.role.label(),
                capabilities.join(", ")
            ))
        }
    }
}
