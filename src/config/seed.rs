//! Built-in data served before anything has been stored.

use chrono::{DateTime, NaiveDate, Utc};

use super::Settings;
use crate::models::{
    Account, AttendanceRecord, CompletedCourses, Course, HierarchyMember, MemberStatus, Role,
    DEFAULT_RANK,
};

/// Starting roster: the founding coordinator and one recruit
pub fn seed_members() -> Vec<HierarchyMember> {
    vec![
        HierarchyMember {
            id: "001".to_string(),
            serial: "RWE241".to_string(),
            name: "Ycaro Gutierrez".to_string(),
            discord_id: "719024332931858553".to_string(),
            rank: "COORDENADOR".to_string(),
            status: MemberStatus::Active,
            join_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap_or_default(),
            completed_courses: CompletedCourses::all(),
            join_method: Some("Fundador".to_string()),
        },
        HierarchyMember {
            id: "002".to_string(),
            serial: "ZWP008".to_string(),
            name: "Kaique Ferreira".to_string(),
            discord_id: "789456123".to_string(),
            rank: DEFAULT_RANK.to_string(),
            status: MemberStatus::Operational,
            join_date: NaiveDate::from_ymd_opt(2023, 6, 20).unwrap_or_default(),
            completed_courses: CompletedCourses::default().with(Course::SatA, true),
            join_method: Some("Edital 54".to_string()),
        },
    ]
}

/// Attendance records matching [`seed_members`], all checked in at `now`
pub fn seed_attendance(now: DateTime<Utc>) -> Vec<AttendanceRecord> {
    seed_members()
        .iter()
        .map(|m| AttendanceRecord::for_member(m, now))
        .collect()
}

/// Accounts available before any credential state exists
pub fn bootstrap_accounts(settings: &Settings) -> Vec<Account> {
    vec![Account::new(
        &settings.bootstrap_account.username,
        &settings.bootstrap_account.password,
        Role::Coordinator,
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_consistent() {
        let members = seed_members();
        let attendance = seed_attendance(Utc::now());

        assert_eq!(members.len(), 2);
        assert_ne!(members[0].id, members[1].id);
        for (m, a) in members.iter().zip(&attendance) {
            assert_eq!(m.id, a.id);
            assert_eq!(m.rank, a.rank);
        }
    }

    #[test]
    fn test_bootstrap_is_single_coordinator() {
        let accounts = bootstrap_accounts(&Settings::default());
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].role, Role::Coordinator);
    }
}
