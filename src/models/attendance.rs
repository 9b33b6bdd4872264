use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::HierarchyMember;

/// Last check-in of a member, created alongside the member at registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    #[serde(default)]
    pub serial: String,
    pub name: String,
    pub discord_id: String,
    pub rank: String,
    pub last_check_in: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Copy the identity fields of `member`
    pub fn for_member(member: &HierarchyMember, checked_in_at: DateTime<Utc>) -> Self {
        Self {
            id: member.id.clone(),
            serial: member.serial.clone(),
            name: member.name.clone(),
            discord_id: member.discord_id.clone(),
            rank: member.rank.clone(),
            last_check_in: checked_in_at,
        }
    }
}
