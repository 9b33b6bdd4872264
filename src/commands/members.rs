use clap::Subcommand;
use tracing::info;

use super::{today, Data};
use crate::error::{Result, RosterError};
use crate::managers::{load_summary, RegistrationWorkflow, RosterEditor, SaveOutcome};
use crate::models::{Course, HierarchyMember, MemberField, Role};
use crate::permissions::{require_session, Capability};

/// Roster commands
#[derive(Subcommand, Debug, Clone)]
pub enum MembersCommand {
    /// Show the roster
    List,
    /// Show attendance records
    Attendance,
    /// Headline numbers and the latest joiners
    Summary,
    /// Register a new member (coordinator, hierarchy admin)
    Register {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long = "discord-id")]
        discord_id: String,
        #[arg(long)]
        serial: Option<String>,
        /// YYYY-MM-DD, defaults to today
        #[arg(long = "join-date")]
        join_date: Option<String>,
        #[arg(long = "join-method")]
        join_method: Option<String>,
        /// Completed course, repeatable (satA, satB, tb, ta, modBopm, abordagem, pop)
        #[arg(long = "course")]
        courses: Vec<Course>,
    },
    /// Edit one roster row and save it (coordinator, supervisor)
    Edit {
        /// Id of the row to edit
        #[arg(long)]
        id: String,
        /// field=value, repeatable (id, serial, name, discordId, rank, status, joinDate, joinMethod)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        fields: Vec<String>,
        /// course=true|false, repeatable
        #[arg(long = "course", value_name = "COURSE=BOOL")]
        courses: Vec<String>,
    },
}

fn split_assignment(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=').ok_or_else(|| {
        RosterError::validation("assignment", format!("'{}' is not of the form name=value", raw))
    })
}

fn format_member(m: &HierarchyMember) -> String {
    let courses: Vec<&str> = m
        .completed_courses
        .completed()
        .iter()
        .map(|c| c.as_str())
        .collect();
    format!(
        "{:<6} {:<8} {:<24} {:<20} {:<22} {:<12} {} [{}] {}",
        m.id,
        m.serial,
        m.name,
        m.discord_id,
        m.rank,
        m.status,
        m.join_date,
        courses.join(","),
        m.join_method.as_deref().unwrap_or("")
    )
}

pub async fn run_members(data: &Data, command: MembersCommand) -> Result<String> {
    let role = data.credentials.current_role().await;

    match command {
        MembersCommand::List => {
            let Some(role) = role else {
                return Err(RosterError::NotAuthenticated);
            };
            let editor = RosterEditor::open(data.repository.clone(), role).await?;
            let lines: Vec<String> = editor.members().iter().map(format_member).collect();
            Ok(lines.join("\n"))
        }
        MembersCommand::Attendance => {
            require_session(role, Capability::ViewRoster)?;
            let records = data.repository.list_attendance().await?;
            let lines: Vec<String> = records
                .iter()
                .map(|r| {
                    format!(
                        "{:<6} {:<24} {:<22} {}",
                        r.id,
                        r.name,
                        r.rank,
                        r.last_check_in.format("%Y-%m-%d %H:%M")
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
        MembersCommand::Summary => {
            require_session(role, Capability::ViewRoster)?;
            let summary = load_summary(&data.repository, today()).await?;

            let mut out = format!(
                "Members: {}\nActive: {}\nJoined today: {}\nAttendance records: {}\nRecent:",
                summary.total_members,
                summary.active_members,
                summary.joined_today,
                summary.attendance_records
            );
            for m in &summary.recent_members {
                out.push_str(&format!("\n  {} {} ({})", m.join_date, m.name, m.id));
            }
            Ok(out)
        }
        MembersCommand::Register {
            id,
            name,
            discord_id,
            serial,
            join_date,
            join_method,
            courses,
        } => {
            let mut workflow = RegistrationWorkflow::new(data.repository.clone(), today());
            let form = workflow.form_mut();
            form.set_field(MemberField::Id, &id)?;
            form.set_field(MemberField::Name, &name)?;
            form.set_field(MemberField::DiscordId, &discord_id)?;
            if let Some(serial) = serial {
                form.set_field(MemberField::Serial, &serial)?;
            }
            if let Some(date) = join_date {
                form.set_field(MemberField::JoinDate, &date)?;
            }
            if let Some(method) = join_method {
                form.set_field(MemberField::JoinMethod, &method)?;
            }
            for course in courses {
                form.set_course(course, true);
            }

            let member = workflow.submit(role, today()).await?;
            Ok(format!(
                "Registered {} ({}) as {}, {}",
                member.name, member.id, member.rank, member.status
            ))
        }
        MembersCommand::Edit {
            id,
            fields,
            courses,
        } => {
            let Some(role) = role else {
                return Err(RosterError::NotAuthenticated);
            };
            edit_member(data, role, &id, &fields, &courses).await
        }
    }
}

async fn edit_member(
    data: &Data,
    role: Role,
    id: &str,
    fields: &[String],
    courses: &[String],
) -> Result<String> {
    let mut editor = RosterEditor::open(data.repository.clone(), role).await?;
    let Some(row) = editor.position_of(id) else {
        return Err(RosterError::not_found("Member", id));
    };

    editor.begin_edit()?;
    let applied = apply_edits(&mut editor, row, fields, courses);
    if let Err(e) = applied {
        editor.cancel()?;
        return Err(e);
    }

    match editor.save().await? {
        SaveOutcome::NoChanges => Ok("No changes to save".to_string()),
        SaveOutcome::Saved { updated } => {
            info!("Edited member {} ({} row(s) saved)", id, updated);
            Ok(format!("Saved {} row(s)", updated))
        }
    }
}

fn apply_edits(
    editor: &mut RosterEditor,
    row: usize,
    fields: &[String],
    courses: &[String],
) -> Result<()> {
    for raw in fields {
        let (field, value) = split_assignment(raw)?;
        editor.set_field(row, field.parse::<MemberField>()?, value)?;
    }
    for raw in courses {
        let (course, done) = split_assignment(raw)?;
        let done: bool = done.trim().parse().map_err(|_| {
            RosterError::validation("course", format!("'{}' is not true or false", done))
        })?;
        editor.set_course(row, course.parse::<Course>()?, done)?;
    }
    Ok(())
}
