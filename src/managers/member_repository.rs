use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::{seed_attendance, seed_members, Settings};
use crate::error::{Result, RosterError};
use crate::models::{AttendanceRecord, HierarchyMember, MemberStatus, NewMember};
use crate::state::{load_json, save_json, SharedStore, ATTENDANCE_KEY, MEMBERS_KEY};

/// Owns the roster and attendance collections in storage.
///
/// Every mutating call reads the whole collection, changes it and writes it
/// back. Nothing here checks permissions; callers consult the permission
/// rules first.
pub struct MemberRepository {
    store: SharedStore,
    default_rank: String,
    default_status: MemberStatus,
    seed_on_empty: bool,
}

impl MemberRepository {
    pub fn new(store: SharedStore, settings: &Settings) -> Self {
        Self {
            store,
            default_rank: settings.default_rank.clone(),
            default_status: settings.default_status,
            seed_on_empty: settings.seed_on_empty,
        }
    }

    pub fn default_rank(&self) -> &str {
        &self.default_rank
    }

    pub fn default_status(&self) -> MemberStatus {
        self.default_status
    }

    async fn load_members(&self) -> Result<Vec<HierarchyMember>> {
        match load_json::<Vec<HierarchyMember>>(self.store.as_ref(), MEMBERS_KEY).await? {
            Some(members) => Ok(members),
            None if self.seed_on_empty => Ok(seed_members()),
            None => Ok(Vec::new()),
        }
    }

    /// Put the members blob back the way it was before a failed registration
    async fn restore_members(&self, previous: Option<String>) -> Result<()> {
        match previous {
            Some(raw) => self.store.set(MEMBERS_KEY, raw).await,
            None => self.store.remove(MEMBERS_KEY).await,
        }
    }

    async fn load_attendance(&self) -> Result<Vec<AttendanceRecord>> {
        match load_json::<Vec<AttendanceRecord>>(self.store.as_ref(), ATTENDANCE_KEY).await? {
            Some(records) => Ok(records),
            None if self.seed_on_empty => Ok(seed_attendance(Utc::now())),
            None => Ok(Vec::new()),
        }
    }

    /// All members in insertion order
    pub async fn list_members(&self) -> Result<Vec<HierarchyMember>> {
        self.load_members().await
    }

    pub async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>> {
        self.load_attendance().await
    }

    pub async fn find_member(&self, id: &str) -> Result<Option<HierarchyMember>> {
        Ok(self.load_members().await?.into_iter().find(|m| m.id == id))
    }

    /// Add a member with the default rank and status, plus its attendance
    /// record. A duplicate id fails with `Conflict` and stores nothing. If the
    /// attendance write fails the members blob is restored, so the member is
    /// either stored with its record or not at all.
    pub async fn register_member(&self, candidate: NewMember) -> Result<HierarchyMember> {
        let previous_members = self.store.get(MEMBERS_KEY).await?;
        let mut members = self.load_members().await?;
        if members.iter().any(|m| m.id == candidate.id) {
            warn!("Rejected registration of duplicate member id {}", candidate.id);
            return Err(RosterError::conflict("Member", &candidate.id));
        }

        let mut attendance = self.load_attendance().await?;

        let member = candidate.into_member(&self.default_rank, self.default_status);
        members.push(member.clone());
        attendance.push(AttendanceRecord::for_member(&member, Utc::now()));

        save_json(self.store.as_ref(), MEMBERS_KEY, &members).await?;
        if let Err(e) = save_json(self.store.as_ref(), ATTENDANCE_KEY, &attendance).await {
            warn!(
                member_id = %member.id,
                "Attendance write failed, rolling back registration: {}", e
            );
            if let Err(rollback) = self.restore_members(previous_members).await {
                error!("Failed to restore roster after aborted registration: {}", rollback);
            }
            return Err(e);
        }

        info!(
            member_id = %member.id,
            "Registered '{}' as {} ({})",
            member.name,
            member.rank,
            member.status
        );
        Ok(member)
    }

    /// Replace the stored member with the same id. An unknown id fails with
    /// `NotFound` and stores nothing.
    pub async fn update_member(&self, member: HierarchyMember) -> Result<()> {
        let mut members = self.load_members().await?;

        let Some(slot) = members.iter_mut().find(|m| m.id == member.id) else {
            warn!("Update for unknown member id {}", member.id);
            return Err(RosterError::not_found("Member", &member.id));
        };

        debug!(member_id = %member.id, "Replacing member record");
        *slot = member;

        save_json(self.store.as_ref(), MEMBERS_KEY, &members).await
    }

    /// Number of stored members
    pub async fn member_count(&self) -> Result<usize> {
        Ok(self.load_members().await?.len())
    }
}

/// Shared member repository type
pub type SharedMemberRepository = Arc<MemberRepository>;

pub fn create_shared_member_repository(
    store: SharedStore,
    settings: &Settings,
) -> SharedMemberRepository {
    Arc::new(MemberRepository::new(store, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompletedCourses, Course, DEFAULT_RANK};
    use crate::state::{KeyValueStore, MemoryStore};
    use chrono::NaiveDate;

    fn empty_settings() -> Settings {
        Settings {
            seed_on_empty: false,
            ..Settings::default()
        }
    }

    fn empty_repository() -> MemberRepository {
        MemberRepository::new(Arc::new(MemoryStore::new()), &empty_settings())
    }

    fn candidate(id: &str, name: &str) -> NewMember {
        NewMember {
            id: id.to_string(),
            serial: String::new(),
            name: name.to_string(),
            discord_id: "719024332931858553".to_string(),
            join_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            completed_courses: CompletedCourses::default().with(Course::Tb, true),
            join_method: Some("Edital 54".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_assigns_defaults() {
        let repo = empty_repository();

        repo.register_member(candidate("141", "Kaique Ferreira"))
            .await
            .unwrap();

        let members = repo.list_members().await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].rank, DEFAULT_RANK);
        assert_eq!(members[0].status, MemberStatus::Operational);
    }

    #[tokio::test]
    async fn test_register_round_trip() {
        let repo = empty_repository();
        let new_member = candidate("141", "Kaique Ferreira");

        repo.register_member(new_member.clone()).await.unwrap();

        let stored = repo.find_member("141").await.unwrap().unwrap();
        assert_eq!(
            stored,
            new_member.into_member(repo.default_rank(), repo.default_status())
        );
    }

    #[tokio::test]
    async fn test_duplicate_id_changes_nothing() {
        let repo = empty_repository();
        repo.register_member(candidate("141", "Kaique Ferreira"))
            .await
            .unwrap();
        let before = repo.list_members().await.unwrap();

        let result = repo.register_member(candidate("141", "Someone Else")).await;
        assert!(matches!(result, Err(RosterError::Conflict { .. })));

        assert_eq!(repo.list_members().await.unwrap(), before);
        assert_eq!(repo.list_attendance().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ids_stay_unique_over_many_registrations() {
        let repo = empty_repository();
        let ids = ["1", "2", "1", "3", "2", "4", "4"];
        let mut accepted = 0;

        for id in ids {
            if repo.register_member(candidate(id, "Member")).await.is_ok() {
                accepted += 1;
            }
        }

        let members = repo.list_members().await.unwrap();
        let mut seen: Vec<_> = members.iter().map(|m| m.id.clone()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(accepted, 4);
        assert_eq!(seen.len(), members.len());
    }

    #[tokio::test]
    async fn test_registration_creates_attendance_record() {
        let repo = empty_repository();
        repo.register_member(candidate("141", "Kaique Ferreira"))
            .await
            .unwrap();

        let attendance = repo.list_attendance().await.unwrap();
        assert_eq!(attendance.len(), 1);
        assert_eq!(attendance[0].id, "141");
        assert_eq!(attendance[0].name, "Kaique Ferreira");
        assert_eq!(attendance[0].rank, DEFAULT_RANK);
    }

    #[tokio::test]
    async fn test_configured_defaults_are_used() {
        let settings = Settings {
            default_rank: "RECRUTA".to_string(),
            default_status: MemberStatus::Active,
            ..empty_settings()
        };
        let repo = MemberRepository::new(Arc::new(MemoryStore::new()), &settings);

        let member = repo.register_member(candidate("7", "A")).await.unwrap();
        assert_eq!(member.rank, "RECRUTA");
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[tokio::test]
    async fn test_update_replaces_whole_record() {
        let repo = empty_repository();
        repo.register_member(candidate("141", "Kaique Ferreira"))
            .await
            .unwrap();
        repo.register_member(candidate("142", "Henrique Junior"))
            .await
            .unwrap();

        let mut edited = repo.find_member("141").await.unwrap().unwrap();
        edited.rank = "CABO".to_string();
        edited.join_method = None;
        repo.update_member(edited.clone()).await.unwrap();

        let members = repo.list_members().await.unwrap();
        assert_eq!(members[0], edited);
        assert_eq!(members[1].id, "142");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let repo = empty_repository();
        let ghost = candidate("999", "Ghost").into_member(DEFAULT_RANK, MemberStatus::Active);

        let result = repo.update_member(ghost).await;
        assert!(matches!(result, Err(RosterError::NotFound { .. })));
        assert_eq!(repo.member_count().await.unwrap(), 0);
    }

    /// Store whose writes to one key always fail
    struct FailingStore {
        inner: MemoryStore,
        failing_key: &'static str,
    }

    #[async_trait::async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String) -> Result<()> {
            if key == self.failing_key {
                return Err(RosterError::StorageWrite {
                    key: key.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn test_failed_attendance_write_rolls_back_member() {
        let store = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            failing_key: ATTENDANCE_KEY,
        });
        let repo = MemberRepository::new(store.clone(), &empty_settings());

        let result = repo.register_member(candidate("141", "Kaique Ferreira")).await;
        assert!(matches!(result, Err(RosterError::StorageWrite { .. })));

        assert_eq!(repo.member_count().await.unwrap(), 0);
        assert!(repo.list_attendance().await.unwrap().is_empty());
        assert_eq!(store.inner.get(MEMBERS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rollback_keeps_previously_stored_members() {
        let backing = Arc::new(MemoryStore::new());
        let repo = MemberRepository::new(backing.clone(), &empty_settings());
        repo.register_member(candidate("140", "Henrique Junior"))
            .await
            .unwrap();
        let before = backing.get(MEMBERS_KEY).await.unwrap();

        let failing = Arc::new(FailingStore {
            inner: MemoryStore::new(),
            failing_key: ATTENDANCE_KEY,
        });
        if let Some(raw) = before.clone() {
            failing.inner.set(MEMBERS_KEY, raw).await.unwrap();
        }
        let repo = MemberRepository::new(failing.clone(), &empty_settings());

        assert!(repo
            .register_member(candidate("141", "Kaique Ferreira"))
            .await
            .is_err());
        assert_eq!(failing.inner.get(MEMBERS_KEY).await.unwrap(), before);
        assert!(repo.find_member("141").await.unwrap().is_none());
        assert!(repo.find_member("140").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_seed_roster_when_storage_is_empty() {
        let repo = MemberRepository::new(Arc::new(MemoryStore::new()), &Settings::default());

        let members = repo.list_members().await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(repo.list_attendance().await.unwrap().len(), 2);

        repo.register_member(candidate("141", "Kaique Ferreira"))
            .await
            .unwrap();
        assert_eq!(repo.member_count().await.unwrap(), 3);
    }
}
