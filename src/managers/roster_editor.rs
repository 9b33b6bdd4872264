use tracing::{info, warn};

use super::member_repository::SharedMemberRepository;
use crate::error::{Result, RosterError};
use crate::models::{Course, HierarchyMember, MemberField, Role};
use crate::permissions::{require, Capability};

/// Where the editor is in its edit cycle
#[derive(Debug, Clone, PartialEq, Eq)]
enum EditorState {
    Viewing,
    /// Holds the working buffer, an independent copy of the roster
    Editing { working: Vec<HierarchyMember> },
    /// Updates are in flight
    Saving,
}

/// Mode reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Viewing,
    Editing,
    Saving,
}

impl std::fmt::Display for EditorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditorMode::Viewing => f.write_str("viewing"),
            EditorMode::Editing => f.write_str("editing"),
            EditorMode::Saving => f.write_str("saving"),
        }
    }
}

/// Result of a successful save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing differed from the stored roster; no update was issued
    NoChanges,
    Saved { updated: usize },
}

/// Tabular roster editing: clone, edit, diff, save, re-read.
pub struct RosterEditor {
    repository: SharedMemberRepository,
    role: Role,
    /// Last roster read from the repository
    server_known: Vec<HierarchyMember>,
    state: EditorState,
}

impl RosterEditor {
    /// Load the roster for a session with `role`
    pub async fn open(repository: SharedMemberRepository, role: Role) -> Result<Self> {
        require(role, Capability::ViewRoster)?;
        let server_known = repository.list_members().await?;

        Ok(Self {
            repository,
            role,
            server_known,
            state: EditorState::Viewing,
        })
    }

    pub fn mode(&self) -> EditorMode {
        match self.state {
            EditorState::Viewing => EditorMode::Viewing,
            EditorState::Editing { .. } => EditorMode::Editing,
            EditorState::Saving => EditorMode::Saving,
        }
    }

    /// Rows to display: the working buffer while editing, otherwise the
    /// stored roster
    pub fn members(&self) -> &[HierarchyMember] {
        match &self.state {
            EditorState::Editing { working } => working,
            _ => &self.server_known,
        }
    }

    pub fn server_known(&self) -> &[HierarchyMember] {
        &self.server_known
    }

    /// Row index of the member with `id` in the displayed rows
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.members().iter().position(|m| m.id == id)
    }

    fn invalid(&self, action: &str) -> RosterError {
        RosterError::InvalidState {
            state: self.mode().to_string(),
            action: action.to_string(),
        }
    }

    /// Re-read the roster. Also recovers an editor left in `Saving` by an
    /// abandoned save.
    pub async fn reload(&mut self) -> Result<()> {
        if matches!(self.state, EditorState::Editing { .. }) {
            return Err(self.invalid("reload while edits are pending"));
        }
        self.server_known = self.repository.list_members().await?;
        self.state = EditorState::Viewing;
        Ok(())
    }

    /// Viewing -> Editing
    pub fn begin_edit(&mut self) -> Result<()> {
        if self.state != EditorState::Viewing {
            return Err(self.invalid("start editing"));
        }
        require(self.role, Capability::EditRoster)?;

        self.state = EditorState::Editing {
            working: self.server_known.clone(),
        };
        Ok(())
    }

    /// Editing -> Viewing, dropping every pending edit
    pub fn cancel(&mut self) -> Result<()> {
        if !matches!(self.state, EditorState::Editing { .. }) {
            return Err(self.invalid("cancel"));
        }
        self.state = EditorState::Viewing;
        Ok(())
    }

    fn working_row(&mut self, index: usize) -> Result<&mut HierarchyMember> {
        let mode = self.mode();
        let EditorState::Editing { working } = &mut self.state else {
            return Err(RosterError::InvalidState {
                state: mode.to_string(),
                action: "edit rows".to_string(),
            });
        };
        working
            .get_mut(index)
            .ok_or_else(|| RosterError::not_found("Row", &index.to_string()))
    }

    /// Set one column of a working row from its text form
    pub fn set_field(&mut self, index: usize, field: MemberField, value: &str) -> Result<()> {
        let row = self.working_row(index)?;
        *row = row.with_field(field, value)?;
        Ok(())
    }

    /// Set one course flag of a working row
    pub fn set_course(&mut self, index: usize, course: Course, done: bool) -> Result<()> {
        let row = self.working_row(index)?;
        *row = row.with_course(course, done);
        Ok(())
    }

    /// Indices of working rows that differ from their stored counterpart
    pub fn dirty_rows(&self) -> Vec<usize> {
        let EditorState::Editing { working } = &self.state else {
            return Vec::new();
        };
        working
            .iter()
            .enumerate()
            .filter(|(i, row)| self.server_known.get(*i) != Some(*row))
            .map(|(i, _)| i)
            .collect()
    }

    /// Editing -> Saving -> Viewing.
    ///
    /// Issues one update per changed row, one after another. Updates that
    /// succeed stay applied even when a later one fails. Afterwards the
    /// roster is re-read; if any update failed the result is
    /// `SaveIncomplete`.
    pub async fn save(&mut self) -> Result<SaveOutcome> {
        let changed: Vec<HierarchyMember> = match &self.state {
            EditorState::Editing { working } => self
                .dirty_rows()
                .into_iter()
                .map(|i| working[i].clone())
                .collect(),
            _ => return Err(self.invalid("save")),
        };

        if changed.is_empty() {
            info!("No roster changes to save");
            return Ok(SaveOutcome::NoChanges);
        }

        let working = match std::mem::replace(&mut self.state, EditorState::Saving) {
            EditorState::Editing { working } => working,
            other => {
                self.state = other;
                return Err(self.invalid("save"));
            }
        };

        let attempted = changed.len();
        let mut failed = Vec::new();
        for member in changed {
            let id = member.id.clone();
            if let Err(e) = self.repository.update_member(member).await {
                warn!("Failed to save member {}: {}", id, e);
                failed.push(id);
            }
        }

        match self.repository.list_members().await {
            Ok(fresh) => {
                self.server_known = fresh;
                self.state = EditorState::Viewing;
            }
            Err(e) => {
                // Keep the edits so the save can be retried
                self.state = EditorState::Editing { working };
                return Err(e);
            }
        }

        let saved = attempted - failed.len();
        info!("Saved {} of {} changed roster rows", saved, attempted);

        if failed.is_empty() {
            Ok(SaveOutcome::Saved { updated: saved })
        } else {
            Err(RosterError::SaveIncomplete {
                saved,
                attempted,
                failed,
            })
        }
    }
}
