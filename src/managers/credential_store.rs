use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{bootstrap_accounts, Settings};
use crate::error::{Result, RosterError};
use crate::models::{Account, AccountSummary, Role};
use crate::permissions::{is_permitted, require_session, Capability};
use crate::state::{load_json, save_json, SharedStore, AUTH_KEY};

/// Persisted credential state: every account plus the logged-in one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct AuthState {
    /// Schema version
    version: u32,

    users: Vec<Account>,

    #[serde(default)]
    current_user: Option<Account>,
}

impl AuthState {
    fn bootstrap(settings: &Settings) -> Self {
        Self {
            version: 1,
            users: bootstrap_accounts(settings),
            current_user: None,
        }
    }

    fn find(&self, username: &str) -> Option<&Account> {
        self.users.iter().find(|u| u.username == username)
    }
}

/// Staff accounts and the current session
pub struct CredentialStore {
    store: SharedStore,
    state: RwLock<AuthState>,
}

impl CredentialStore {
    /// Restore persisted state, or start from the bootstrap account list
    pub async fn open(store: SharedStore, settings: &Settings) -> Result<Self> {
        let state = match load_json::<AuthState>(store.as_ref(), AUTH_KEY).await? {
            Some(state) => {
                debug!(
                    "Restored {} accounts, session={}",
                    state.users.len(),
                    state.current_user.is_some()
                );
                state
            }
            None => {
                info!("No stored accounts, starting with bootstrap coordinator");
                AuthState::bootstrap(settings)
            }
        };

        Ok(Self {
            store,
            state: RwLock::new(state),
        })
    }

    /// Replace the in-memory state only after the new state is stored
    async fn commit(&self, state: &mut AuthState, next: AuthState) -> Result<()> {
        save_json(self.store.as_ref(), AUTH_KEY, &next).await?;
        *state = next;
        Ok(())
    }

    /// Start a session when `username` and `password` match an account exactly
    pub async fn login(&self, username: &str, password: &str) -> bool {
        let mut state = self.state.write().await;

        let Some(account) = state
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned()
        else {
            warn!("Failed login attempt for '{}'", username);
            return false;
        };

        let next = AuthState {
            current_user: Some(account),
            ..state.clone()
        };
        if let Err(e) = self.commit(&mut state, next.clone()).await {
            // The session still holds for this process
            warn!("Could not persist session for '{}': {}", username, e);
            *state = next;
        }

        info!("'{}' logged in", username);
        true
    }

    /// Clear the session
    pub async fn logout(&self) -> Result<()> {
        let mut state = self.state.write().await;
        let previous = state.current_user.take();

        if let Some(account) = previous {
            info!("'{}' logged out", account.username);
        }
        save_json(self.store.as_ref(), AUTH_KEY, &*state).await
    }

    pub async fn current_user(&self) -> Option<Account> {
        self.state.read().await.current_user.clone()
    }

    pub async fn current_role(&self) -> Option<Role> {
        self.state.read().await.current_user.as_ref().map(|u| u.role)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.current_user.is_some()
    }

    /// Add an account. Only a logged-in coordinator may do this.
    pub async fn create_user(&self, username: &str, password: &str, role: Role) -> Result<()> {
        let mut state = self.state.write().await;

        let caller = state.current_user.as_ref().map(|u| u.role);
        require_session(caller, Capability::ManageAccounts)?;

        if username.trim().is_empty() {
            return Err(RosterError::validation("username", "must not be empty"));
        }
        if password.is_empty() {
            return Err(RosterError::validation("password", "must not be empty"));
        }
        if state.find(username).is_some() {
            return Err(RosterError::conflict("Account", username));
        }

        let mut next = state.clone();
        next.users.push(Account::new(username, password, role));
        self.commit(&mut state, next).await?;

        info!("Created {} account '{}'", role, username);
        Ok(())
    }

    /// Change the password of `username`. Allowed for the account itself and
    /// for roles that may change any password.
    pub async fn update_password(&self, username: &str, new_password: &str) -> Result<()> {
        let mut state = self.state.write().await;

        let Some(caller) = state.current_user.clone() else {
            return Err(RosterError::NotAuthenticated);
        };
        if caller.username != username && !is_permitted(caller.role, Capability::ChangeAnyPassword)
        {
            return Err(RosterError::PermissionDenied {
                message: format!(
                    "{} accounts can only change their own password",
                    caller.role.label()
                ),
            });
        }
        if new_password.is_empty() {
            return Err(RosterError::validation("password", "must not be empty"));
        }

        let mut next = state.clone();
        let Some(account) = next.users.iter_mut().find(|u| u.username == username) else {
            return Err(RosterError::not_found("Account", username));
        };
        account.password = new_password.to_string();

        // Keep the session copy in step with the account it refers to
        if let Some(current) = next.current_user.as_mut() {
            if current.username == username {
                current.password = new_password.to_string();
            }
        }

        self.commit(&mut state, next).await?;

        info!("'{}' changed the password of '{}'", caller.username, username);
        Ok(())
    }

    /// Every account, without passwords
    pub async fn list_accounts(&self) -> Result<Vec<AccountSummary>> {
        let state = self.state.read().await;
        let caller = state.current_user.as_ref().map(|u| u.role);
        require_session(caller, Capability::ViewAllAccounts)?;

        Ok(state.users.iter().map(Account::summary).collect())
    }
}

/// Shared credential store type
pub type SharedCredentialStore = Arc<CredentialStore>;

pub async fn create_shared_credential_store(
    store: SharedStore,
    settings: &Settings,
) -> Result<SharedCredentialStore> {
    Ok(Arc::new(CredentialStore::open(store, settings).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStore;

    const ADMIN: &str = "Ycaro_Gutierrez";
    const ADMIN_PASSWORD: &str = "110571";

    async fn open_store() -> (SharedStore, CredentialStore) {
        let backing: SharedStore = Arc::new(MemoryStore::new());
        let creds = CredentialStore::open(backing.clone(), &Settings::default())
            .await
            .unwrap();
        (backing, creds)
    }

    /// Log in as the coordinator and add `username` with `role`
    async fn with_account(creds: &CredentialStore, username: &str, role: Role) {
        assert!(creds.login(ADMIN, ADMIN_PASSWORD).await);
        creds.create_user(username, "pw", role).await.unwrap();
    }

    #[tokio::test]
    async fn test_login_requires_exact_match() {
        let (_, creds) = open_store().await;

        assert!(!creds.login(ADMIN, "wrong").await);
        assert!(!creds.login("ycaro_gutierrez", ADMIN_PASSWORD).await);
        assert!(!creds.is_authenticated().await);

        assert!(creds.login(ADMIN, ADMIN_PASSWORD).await);
        assert_eq!(creds.current_role().await, Some(Role::Coordinator));
    }

    #[tokio::test]
    async fn test_failed_login_keeps_existing_session() {
        let (_, creds) = open_store().await;
        assert!(creds.login(ADMIN, ADMIN_PASSWORD).await);
        assert!(!creds.login("nobody", "x").await);

        assert_eq!(creds.current_user().await.unwrap().username, ADMIN);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let (_, creds) = open_store().await;
        assert!(creds.login(ADMIN, ADMIN_PASSWORD).await);
        creds.logout().await.unwrap();
        assert!(!creds.is_authenticated().await);

        // Unconditional
        creds.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_only_coordinator_creates_users() {
        let (_, creds) = open_store().await;

        assert!(matches!(
            creds.create_user("x", "pw", Role::Supervisor).await,
            Err(RosterError::NotAuthenticated)
        ));

        with_account(&creds, "sup", Role::Supervisor).await;
        with_account(&creds, "course", Role::CourseAdmin).await;
        with_account(&creds, "hier", Role::HierarchyAdmin).await;

        for username in ["sup", "course", "hier"] {
            assert!(creds.login(username, "pw").await);
            let result = creds.create_user("intruder", "pw", Role::Coordinator).await;
            assert!(matches!(result, Err(RosterError::PermissionDenied { .. })));
        }

        assert!(creds.login(ADMIN, ADMIN_PASSWORD).await);
        let accounts = creds.list_accounts().await.unwrap();
        assert_eq!(accounts.len(), 4);
        assert!(accounts.iter().all(|a| a.username != "intruder"));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let (_, creds) = open_store().await;
        with_account(&creds, "alice", Role::CourseAdmin).await;

        let result = creds.create_user("alice", "other", Role::Supervisor).await;
        assert!(matches!(result, Err(RosterError::Conflict { .. })));

        // Case-sensitive
        creds.create_user("Alice", "other", Role::Supervisor).await.unwrap();
    }

    #[tokio::test]
    async fn test_password_update_permissions() {
        let (_, creds) = open_store().await;
        with_account(&creds, "alice", Role::CourseAdmin).await;
        creds.create_user("bob", "pw", Role::CourseAdmin).await.unwrap();
        creds.create_user("carol", "pw", Role::Supervisor).await.unwrap();

        assert!(creds.login("bob", "pw").await);
        let denied = creds.update_password("alice", "new").await;
        assert!(matches!(denied, Err(RosterError::PermissionDenied { .. })));

        // Own password is always allowed
        creds.update_password("bob", "bob2").await.unwrap();
        assert_eq!(creds.current_user().await.unwrap().password, "bob2");

        assert!(creds.login("carol", "pw").await);
        creds.update_password("alice", "new").await.unwrap();
        assert!(creds.login("alice", "new").await);
        assert!(!creds.login("bob", "pw").await);
    }

    #[tokio::test]
    async fn test_password_update_unknown_account() {
        let (_, creds) = open_store().await;
        assert!(creds.login(ADMIN, ADMIN_PASSWORD).await);

        let result = creds.update_password("ghost", "pw").await;
        assert!(matches!(result, Err(RosterError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_account_listing_is_gated() {
        let (_, creds) = open_store().await;
        with_account(&creds, "hier", Role::HierarchyAdmin).await;

        assert!(creds.login("hier", "pw").await);
        assert!(creds.list_accounts().await.is_err());
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let (backing, creds) = open_store().await;
        with_account(&creds, "alice", Role::Supervisor).await;
        assert!(creds.login("alice", "pw").await);
        drop(creds);

        let reopened = CredentialStore::open(backing, &Settings::default())
            .await
            .unwrap();
        assert_eq!(reopened.current_user().await.unwrap().username, "alice");
        assert_eq!(reopened.list_accounts().await.unwrap().len(), 2);
    }
}
