use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RosterError};

/// Rank every newly registered member starts with
pub const DEFAULT_RANK: &str = "SOLDADO DE 2ª CLASSE";

/// Duty status of a member
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Active,
    #[default]
    Operational,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "ACTIVE",
            MemberStatus::Operational => "OPERATIONAL",
            MemberStatus::Inactive => "INACTIVE",
        }
    }

    /// Counted as active on the dashboard
    pub fn is_on_duty(&self) -> bool {
        matches!(self, MemberStatus::Active | MemberStatus::Operational)
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(MemberStatus::Active),
            "OPERATIONAL" => Ok(MemberStatus::Operational),
            "INACTIVE" => Ok(MemberStatus::Inactive),
            _ => Err(RosterError::validation(
                "status",
                format!("'{}' is not one of ACTIVE, OPERATIONAL, INACTIVE", s),
            )),
        }
    }
}

/// The seven tracked courses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Course {
    SatA,
    SatB,
    Tb,
    Ta,
    ModBopm,
    Abordagem,
    Pop,
}

impl Course {
    pub const ALL: [Course; 7] = [
        Course::SatA,
        Course::SatB,
        Course::Tb,
        Course::Ta,
        Course::ModBopm,
        Course::Abordagem,
        Course::Pop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Course::SatA => "satA",
            Course::SatB => "satB",
            Course::Tb => "tb",
            Course::Ta => "ta",
            Course::ModBopm => "modBopm",
            Course::Abordagem => "abordagem",
            Course::Pop => "pop",
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Course {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        Course::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| RosterError::validation("course", format!("unknown course '{}'", s)))
    }
}

/// Completion flags for every course
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCourses {
    pub sat_a: bool,
    pub sat_b: bool,
    pub tb: bool,
    pub ta: bool,
    pub mod_bopm: bool,
    pub abordagem: bool,
    pub pop: bool,
}

impl CompletedCourses {
    pub fn get(&self, course: Course) -> bool {
        match course {
            Course::SatA => self.sat_a,
            Course::SatB => self.sat_b,
            Course::Tb => self.tb,
            Course::Ta => self.ta,
            Course::ModBopm => self.mod_bopm,
            Course::Abordagem => self.abordagem,
            Course::Pop => self.pop,
        }
    }

    /// Copy with one flag changed
    pub fn with(mut self, course: Course, done: bool) -> Self {
        let flag = match course {
            Course::SatA => &mut self.sat_a,
            Course::SatB => &mut self.sat_b,
            Course::Tb => &mut self.tb,
            Course::Ta => &mut self.ta,
            Course::ModBopm => &mut self.mod_bopm,
            Course::Abordagem => &mut self.abordagem,
            Course::Pop => &mut self.pop,
        };
        *flag = done;
        self
    }

    pub fn all() -> Self {
        Course::ALL.iter().fold(Self::default(), |c, course| c.with(*course, true))
    }

    pub fn completed(&self) -> Vec<Course> {
        Course::ALL.iter().copied().filter(|c| self.get(*c)).collect()
    }
}

/// A member of the hierarchy roster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyMember {
    /// Registration number, unique across the roster
    pub id: String,

    /// Optional serial, empty when unknown
    #[serde(default)]
    pub serial: String,

    pub name: String,

    pub discord_id: String,

    pub rank: String,

    pub status: MemberStatus,

    pub join_date: NaiveDate,

    #[serde(default)]
    pub completed_courses: CompletedCourses,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_method: Option<String>,
}

/// Editable columns of a roster row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberField {
    Id,
    Serial,
    Name,
    DiscordId,
    Rank,
    Status,
    JoinDate,
    JoinMethod,
}

impl FromStr for MemberField {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(MemberField::Id),
            "serial" => Ok(MemberField::Serial),
            "name" => Ok(MemberField::Name),
            "discordid" | "discord" => Ok(MemberField::DiscordId),
            "rank" => Ok(MemberField::Rank),
            "status" => Ok(MemberField::Status),
            "joindate" => Ok(MemberField::JoinDate),
            "joinmethod" => Ok(MemberField::JoinMethod),
            _ => Err(RosterError::validation("field", format!("unknown field '{}'", s))),
        }
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        RosterError::validation(field, format!("'{}' is not a YYYY-MM-DD date", value))
    })
}

impl HierarchyMember {
    /// Copy with `field` set from its textual form
    pub fn with_field(&self, field: MemberField, value: &str) -> Result<Self> {
        let mut updated = self.clone();
        match field {
            MemberField::Id => updated.id = value.to_string(),
            MemberField::Serial => updated.serial = value.to_string(),
            MemberField::Name => updated.name = value.to_string(),
            MemberField::DiscordId => updated.discord_id = value.to_string(),
            MemberField::Rank => updated.rank = value.to_string(),
            MemberField::Status => updated.status = value.parse()?,
            MemberField::JoinDate => updated.join_date = parse_date("joinDate", value)?,
            MemberField::JoinMethod => {
                updated.join_method = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
        }
        Ok(updated)
    }

    /// Copy with one course flag changed
    pub fn with_course(&self, course: Course, done: bool) -> Self {
        Self {
            completed_courses: self.completed_courses.with(course, done),
            ..self.clone()
        }
    }
}

/// Candidate record submitted for registration. Rank and status are
/// assigned by the repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub id: String,
    #[serde(default)]
    pub serial: String,
    pub name: String,
    pub discord_id: String,
    pub join_date: NaiveDate,
    #[serde(default)]
    pub completed_courses: CompletedCourses,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_method: Option<String>,
}

impl NewMember {
    pub fn into_member(self, rank: &str, status: MemberStatus) -> HierarchyMember {
        HierarchyMember {
            id: self.id,
            serial: self.serial,
            name: self.name,
            discord_id: self.discord_id,
            rank: rank.to_string(),
            status,
            join_date: self.join_date,
            completed_courses: self.completed_courses,
            join_method: self.join_method,
        }
    }
}
