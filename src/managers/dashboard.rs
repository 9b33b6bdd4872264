use chrono::NaiveDate;
use serde::Serialize;

use super::member_repository::MemberRepository;
use crate::error::Result;
use crate::models::{AttendanceRecord, HierarchyMember};

/// How many recent registrations the summary lists
pub const RECENT_LIMIT: usize = 5;

/// Headline numbers for the roster
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RosterSummary {
    pub total_members: usize,
    /// Members whose status counts as on duty
    pub active_members: usize,
    pub joined_today: usize,
    pub attendance_records: usize,
    /// Latest joiners first
    pub recent_members: Vec<HierarchyMember>,
}

impl RosterSummary {
    pub fn compute(
        members: &[HierarchyMember],
        attendance: &[AttendanceRecord],
        today: NaiveDate,
    ) -> Self {
        let mut recent_members = members.to_vec();
        // Stable sort keeps insertion order among equal dates
        recent_members.sort_by(|a, b| b.join_date.cmp(&a.join_date));
        recent_members.truncate(RECENT_LIMIT);

        Self {
            total_members: members.len(),
            active_members: members.iter().filter(|m| m.status.is_on_duty()).count(),
            joined_today: members.iter().filter(|m| m.join_date == today).count(),
            attendance_records: attendance.len(),
            recent_members,
        }
    }
}

/// Read both collections concurrently and summarise them
pub async fn load_summary(
    repository: &MemberRepository,
    today: NaiveDate,
) -> Result<RosterSummary> {
    let (members, attendance) =
        futures::try_join!(repository.list_members(), repository.list_attendance())?;
    Ok(RosterSummary::compute(&members, &attendance, today))
}
