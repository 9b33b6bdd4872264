use chrono::NaiveDate;
use tracing::{info, warn};

use super::member_repository::SharedMemberRepository;
use crate::error::{Result, RosterError};
use crate::models::{
    parse_date, CompletedCourses, Course, HierarchyMember, MemberField, NewMember, Role,
};
use crate::permissions::{require_session, Capability};

/// Values entered for a new member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub id: String,
    pub serial: String,
    pub name: String,
    pub discord_id: String,
    pub join_date: NaiveDate,
    pub completed_courses: CompletedCourses,
    pub join_method: String,
}

impl RegistrationForm {
    /// Blank form with the join date set to `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            id: String::new(),
            serial: String::new(),
            name: String::new(),
            discord_id: String::new(),
            join_date: today,
            completed_courses: CompletedCourses::default(),
            join_method: String::new(),
        }
    }

    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }

    /// Set one input. Rank and status are not part of the form.
    pub fn set_field(&mut self, field: MemberField, value: &str) -> Result<()> {
        match field {
            MemberField::Id => self.id = value.to_string(),
            MemberField::Serial => self.serial = value.to_string(),
            MemberField::Name => self.name = value.to_string(),
            MemberField::DiscordId => self.discord_id = value.to_string(),
            MemberField::JoinDate => self.join_date = parse_date("joinDate", value)?,
            MemberField::JoinMethod => self.join_method = value.to_string(),
            MemberField::Rank | MemberField::Status => {
                return Err(RosterError::validation(
                    "field",
                    "rank and status are assigned at registration",
                ))
            }
        }
        Ok(())
    }

    pub fn set_course(&mut self, course: Course, done: bool) {
        self.completed_courses = self.completed_courses.with(course, done);
    }

    /// Id, name and Discord id are required
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("id", &self.id),
            ("name", &self.name),
            ("discordId", &self.discord_id),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(RosterError::validation(field, "is required"));
            }
        }
        Ok(())
    }

    pub fn to_candidate(&self) -> NewMember {
        NewMember {
            id: self.id.clone(),
            serial: self.serial.clone(),
            name: self.name.clone(),
            discord_id: self.discord_id.clone(),
            join_date: self.join_date,
            completed_courses: self.completed_courses,
            join_method: (!self.join_method.trim().is_empty()).then(|| self.join_method.clone()),
        }
    }
}

/// Submits a single registration form to the repository
pub struct RegistrationWorkflow {
    repository: SharedMemberRepository,
    form: RegistrationForm,
}

impl RegistrationWorkflow {
    pub fn new(repository: SharedMemberRepository, today: NaiveDate) -> Self {
        Self {
            repository,
            form: RegistrationForm::new(today),
        }
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RegistrationForm {
        &mut self.form
    }

    /// Check permission and required fields, then register.
    ///
    /// On success the form is cleared with its join date set to `today`.
    /// On any failure the entered values are kept.
    pub async fn submit(
        &mut self,
        role: Option<Role>,
        today: NaiveDate,
    ) -> Result<HierarchyMember> {
        require_session(role, Capability::ManageRegistration)?;
        self.form.validate()?;

        match self.repository.register_member(self.form.to_candidate()).await {
            Ok(member) => {
                info!("Registration form for {} submitted", member.id);
                self.form.reset(today);
                Ok(member)
            }
            Err(e) => {
                warn!("Registration of {} failed: {}", self.form.id, e);
                Err(e)
            }
        }
    }
}
