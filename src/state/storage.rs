use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{Result, RosterError};

/// Key holding the JSON array of roster members
pub const MEMBERS_KEY: &str = "hierarchyMembers";

/// Key holding the JSON array of attendance records
pub const ATTENDANCE_KEY: &str = "absences";

/// Key holding accounts and the current session
pub const AUTH_KEY: &str = "auth-storage";

/// Local key-value namespace. Every value is one opaque blob; writers
/// replace the whole blob.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

/// Read and decode the JSON blob under `key`
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(content) => serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| RosterError::Decode {
                key: key.to_string(),
                source: e,
            }),
        None => Ok(None),
    }
}

/// Encode `value` and replace the blob under `key`
pub async fn save_json<T: Serialize + ?Sized + Sync>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    store.set(key, content).await
}
