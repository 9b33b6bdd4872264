pub mod general;
pub mod members;
pub mod users;

use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::error::Result;
use crate::managers::{
    create_shared_credential_store, create_shared_member_repository, SharedCredentialStore,
    SharedMemberRepository,
};
use crate::state::{FileStore, SharedStore};

pub use general::{run_general, GeneralCommand};
pub use members::{run_members, MembersCommand};
pub use users::{run_users, UsersCommand};

/// Shared application state handed to every command
pub struct Data {
    pub settings: Settings,
    pub credentials: SharedCredentialStore,
    pub repository: SharedMemberRepository,
}

impl Data {
    /// Open the file store under `data_dir` and everything built on it
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let settings = Settings::load(data_dir)?.with_env_overrides()?;
        let store: SharedStore = Arc::new(FileStore::open(data_dir).await?);
        info!("Using data directory {}", data_dir.display());
        Self::with_store(store, settings).await
    }

    /// Build on an existing store
    pub async fn with_store(store: SharedStore, settings: Settings) -> Result<Self> {
        let credentials = create_shared_credential_store(store.clone(), &settings).await?;
        let repository = create_shared_member_repository(store, &settings);
        Ok(Self {
            settings,
            credentials,
            repository,
        })
    }
}

/// Local calendar date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
