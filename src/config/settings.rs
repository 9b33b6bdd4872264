use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::models::{MemberStatus, DEFAULT_RANK};

/// Name of the optional settings file inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Account used when no credential state has been persisted yet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BootstrapAccount {
    pub username: String,
    pub password: String,
}

impl Default for BootstrapAccount {
    fn default() -> Self {
        Self {
            username: "Ycaro_Gutierrez".to_string(),
            password: "110571".to_string(),
        }
    }
}

/// Registry settings
///
/// Loaded from `data/settings.json` when present, then overridden by
/// environment variables:
/// - `ROLLCALL_DEFAULT_RANK`
/// - `ROLLCALL_DEFAULT_STATUS`
/// - `ROLLCALL_SEED_ON_EMPTY` (`true`/`false`)
/// - `ROLLCALL_ADMIN_USER`, `ROLLCALL_ADMIN_PASSWORD`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Rank assigned to every newly registered member
    pub default_rank: String,

    /// Status assigned to every newly registered member
    pub default_status: MemberStatus,

    /// Serve the built-in roster when nothing has been stored yet
    pub seed_on_empty: bool,

    pub bootstrap_account: BootstrapAccount,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_rank: DEFAULT_RANK.to_string(),
            default_status: MemberStatus::Operational,
            seed_on_empty: true,
            bootstrap_account: BootstrapAccount::default(),
        }
    }
}

impl Settings {
    /// Load from a JSON file
    pub fn load_from_file(path: &str) -> crate::error::Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| crate::error::RosterError::ConfigLoad {
                path: path.to_string(),
                source: e,
            })?;

        serde_json::from_str(&content).map_err(|e| crate::error::RosterError::ConfigParse {
            path: path.to_string(),
            source: e,
        })
    }

    /// Load `settings.json` from `data_dir`, falling back to defaults when
    /// the file does not exist
    pub fn load(data_dir: &Path) -> crate::error::Result<Self> {
        let path = data_dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let settings = Self::load_from_file(path.to_str().unwrap_or_default())?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> crate::error::Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> crate::error::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rank) = lookup("ROLLCALL_DEFAULT_RANK") {
            self.default_rank = rank;
        }
        if let Some(status) = lookup("ROLLCALL_DEFAULT_STATUS") {
            self.default_status = status.parse()?;
        }
        if let Some(seed) = lookup("ROLLCALL_SEED_ON_EMPTY") {
            self.seed_on_empty = seed.trim().parse().map_err(|_| {
                crate::error::RosterError::validation(
                    "ROLLCALL_SEED_ON_EMPTY",
                    format!("'{}' is not true or false", seed),
                )
            })?;
        }
        if let Some(user) = lookup("ROLLCALL_ADMIN_USER") {
            self.bootstrap_account.username = user;
        }
        if let Some(password) = lookup("ROLLCALL_ADMIN_PASSWORD") {
            self.bootstrap_account.password = password;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_rank, DEFAULT_RANK);
        assert!(settings.seed_on_empty);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "default_rank": "RECRUTA", "seed_on_empty": false }"#,
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.default_rank, "RECRUTA");
        assert!(!settings.seed_on_empty);
        assert_eq!(settings.default_status, MemberStatus::Operational);
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{ "rank": "X" }"#).unwrap();

        let err = Settings::load(dir.path()).unwrap_err();
        assert!(matches!(err, crate::error::RosterError::ConfigParse { .. }));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("ROLLCALL_DEFAULT_STATUS", "active"),
            ("ROLLCALL_SEED_ON_EMPTY", "false"),
            ("ROLLCALL_ADMIN_USER", "root"),
        ]
        .into_iter()
        .collect();

        let settings = Settings::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.default_status, MemberStatus::Active);
        assert!(!settings.seed_on_empty);
        assert_eq!(settings.bootstrap_account.username, "root");
        assert_eq!(settings.bootstrap_account.password, "110571");

        let bad = Settings::default().with_overrides(|k| {
            (k == "ROLLCALL_SEED_ON_EMPTY").then(|| "maybe".to_string())
        });
        assert!(bad.is_err());
    }
}
