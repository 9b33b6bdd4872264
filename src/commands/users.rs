use clap::Subcommand;

use super::Data;
use crate::error::Result;
use crate::models::Role;

/// Staff account commands
#[derive(Subcommand, Debug, Clone)]
pub enum UsersCommand {
    /// List every account (supervisor, coordinator)
    List,
    /// Create an account (coordinator)
    Create {
        #[arg(long, short)]
        username: String,
        #[arg(long, short)]
        password: String,
        /// coordinator, supervisor, courseAdmin or hierarchyAdmin
        #[arg(long, short, default_value = "hierarchyAdmin")]
        role: Role,
    },
    /// Change a password (own account, or any as supervisor/coordinator)
    Passwd {
        #[arg(long, short)]
        username: String,
        #[arg(long = "new-password", short = 'n')]
        new_password: String,
    },
}

pub async fn run_users(data: &Data, command: UsersCommand) -> Result<String> {
    match command {
        UsersCommand::List => {
            let accounts = data.credentials.list_accounts().await?;
            let lines: Vec<String> = accounts
                .iter()
                .map(|a| format!("{:<24} {}", a.username, a.role.label()))
                .collect();
            Ok(lines.join("\n"))
        }
        UsersCommand::Create {
            username,
            password,
            role,
        } => {
            data.credentials.create_user(&username, &password, role).await?;
            Ok(format!("Created {} account {}", role.label(), username))
        }
        UsersCommand::Passwd {
            username,
            new_password,
        } => {
            data.credentials
                .update_password(&username, &new_password)
                .await?;
            Ok(format!("Password updated for {}", username))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::RosterError;
    use crate::state::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_and_list() {
        let data = Data::with_store(Arc::new(MemoryStore::new()), Settings::default())
            .await
            .unwrap();
        assert!(data.credentials.login("Ycaro_Gutierrez", "110571").await);

        let create = UsersCommand::Create {
            username: "marta".to_string(),
            password: "pw".to_string(),
            role: Role::CourseAdmin,
        };
        run_users(&data, create).await.unwrap();

        let listing = run_users(&data, UsersCommand::List).await.unwrap();
        assert_eq!(listing.lines().count(), 2);
        assert!(listing.contains("Course Admin"));
        assert!(!listing.contains("110571"));

        assert!(data.credentials.login("marta", "pw").await);
        assert!(matches!(
            run_users(&data, UsersCommand::List).await,
            Err(RosterError::PermissionDenied { .. })
        ));
    }
}
