//! The persistence boundary.
//!
//! Everything that changes stored order or containment goes through [`Store`]:
//! single-record patches, single-record deletes, and the read queries needed
//! to compute positions. There are no multi-record transactions; a renumber
//! is a sequence of independent patches.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::model::Workspace;

/// Every stored entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Task,
    Note,
    Project,
    Folder,
    Section,
    Subtask,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Task => "task",
            RecordKind::Note => "note",
            RecordKind::Project => "project",
            RecordKind::Folder => "folder",
            RecordKind::Section => "section",
            RecordKind::Subtask => "subtask",
        }
    }

    pub fn parse(s: &str) -> Option<RecordKind> {
        match s {
            "task" => Some(RecordKind::Task),
            "note" => Some(RecordKind::Note),
            "project" => Some(RecordKind::Project),
            "folder" => Some(RecordKind::Folder),
            "section" => Some(RecordKind::Section),
            "subtask" => Some(RecordKind::Subtask),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of one stored record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordRef {
    pub kind: RecordKind,
    pub id: String,
}

impl RecordRef {
    pub fn new(kind: RecordKind, id: impl Into<String>) -> Self {
        RecordRef {
            kind,
            id: id.into(),
        }
    }

    pub fn task(id: impl Into<String>) -> Self {
        Self::new(RecordKind::Task, id)
    }

    pub fn note(id: impl Into<String>) -> Self {
        Self::new(RecordKind::Note, id)
    }

    pub fn project(id: impl Into<String>) -> Self {
        Self::new(RecordKind::Project, id)
    }

    pub fn folder(id: impl Into<String>) -> Self {
        Self::new(RecordKind::Folder, id)
    }

    pub fn section(id: impl Into<String>) -> Self {
        Self::new(RecordKind::Section, id)
    }

    pub fn subtask(id: impl Into<String>) -> Self {
        Self::new(RecordKind::Subtask, id)
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// A partial update to one record. `None` leaves a field alone;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub sort_order: Option<i64>,
    pub project_id: Option<Option<String>>,
    pub section_id: Option<Option<String>>,
    pub folder_id: Option<Option<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl Patch {
    pub fn sort_order(value: i64) -> Self {
        Patch {
            sort_order: Some(value),
            ..Default::default()
        }
    }

    /// Reparent a task or note and give it a position in the new container.
    pub fn placement(project_id: Option<String>, section_id: Option<String>, sort_order: i64) -> Self {
        Patch {
            sort_order: Some(sort_order),
            project_id: Some(project_id),
            section_id: Some(section_id),
            ..Default::default()
        }
    }

    pub fn folder(folder_id: Option<String>, sort_order: i64) -> Self {
        Patch {
            sort_order: Some(sort_order),
            folder_id: Some(folder_id),
            ..Default::default()
        }
    }

    pub fn due_date(due: Option<DateTime<Utc>>) -> Self {
        Patch {
            due_date: Some(due),
            ..Default::default()
        }
    }

    /// Names of the fields this patch touches
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.sort_order.is_some() {
            fields.push("sort_order");
        }
        if self.project_id.is_some() {
            fields.push("project_id");
        }
        if self.section_id.is_some() {
            fields.push("section_id");
        }
        if self.folder_id.is_some() {
            fields.push("folder_id");
        }
        if self.due_date.is_some() {
            fields.push("due_date");
        }
        fields
    }
}

/// Where a record currently sits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub project_id: Option<String>,
    pub section_id: Option<String>,
    pub folder_id: Option<String>,
}

/// A set of siblings that share one `sort_order` space
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderScope {
    /// Tasks and notes in one (project, section) container; `project_id: None` is the Inbox
    Items {
        user_id: String,
        project_id: Option<String>,
        section_id: Option<String>,
    },
    /// Folders plus standalone projects
    Sidebar { user_id: String },
    /// Projects inside one folder
    Folder { folder_id: String },
    Sections { project_id: String },
    Subtasks { task_id: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(RecordRef),
    #[error("{field} cannot be set on a {kind}")]
    UnsupportedField {
        kind: RecordKind,
        field: &'static str,
    },
}

/// Record-level persistence used by the move and ordering code.
///
/// Ownership is not enforced here; callers check [`Store::owner`] against
/// the acting user before patching.
pub trait Store {
    /// The owning user ID, or `None` if the record does not exist
    fn owner(&self, record: &RecordRef) -> Option<&str>;

    fn placement(&self, record: &RecordRef) -> Option<Placement>;

    /// Current `sort_order` values of every member of a scope
    fn sort_orders(&self, scope: &OrderScope) -> Vec<i64>;

    /// Apply a patch to one record. Either every field applies or none does.
    fn patch(&mut self, record: &RecordRef, patch: &Patch) -> Result<(), StoreError>;

    fn delete(&mut self, record: &RecordRef) -> Result<(), StoreError>;
}

fn allowed_fields(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::Task => &["sort_order", "project_id", "section_id", "due_date"],
        RecordKind::Note => &["sort_order", "project_id", "section_id"],
        RecordKind::Project => &["sort_order", "folder_id"],
        RecordKind::Folder | RecordKind::Section | RecordKind::Subtask => &["sort_order"],
    }
}

impl Store for Workspace {
    fn owner(&self, record: &RecordRef) -> Option<&str> {
        let id = record.id.as_str();
        let owner = match record.kind {
            RecordKind::Task => &self.task(id)?.user_id,
            RecordKind::Note => &self.note(id)?.user_id,
            RecordKind::Project => &self.project(id)?.user_id,
            RecordKind::Folder => &self.folder(id)?.user_id,
            RecordKind::Section => &self.section(id)?.user_id,
            RecordKind::Subtask => &self.subtask(id)?.user_id,
        };
        Some(owner.as_str())
    }

    fn placement(&self, record: &RecordRef) -> Option<Placement> {
        let id = record.id.as_str();
        let placement = match record.kind {
            RecordKind::Task => {
                let t = self.task(id)?;
                Placement {
                    project_id: t.project_id.clone(),
                    section_id: t.section_id.clone(),
                    folder_id: None,
                }
            }
            RecordKind::Note => {
                let n = self.note(id)?;
                Placement {
                    project_id: n.project_id.clone(),
                    section_id: n.section_id.clone(),
                    folder_id: None,
                }
            }
            RecordKind::Project => Placement {
                folder_id: self.project(id)?.folder_id.clone(),
                ..Default::default()
            },
            RecordKind::Section => Placement {
                project_id: Some(self.section(id)?.project_id.clone()),
                ..Default::default()
            },
            RecordKind::Folder => {
                self.folder(id)?;
                Placement::default()
            }
            RecordKind::Subtask => {
                self.subtask(id)?;
                Placement::default()
            }
        };
        Some(placement)
    }

    fn sort_orders(&self, scope: &OrderScope) -> Vec<i64> {
        match scope {
            OrderScope::Items {
                user_id,
                project_id,
                section_id,
            } => {
                let in_scope = |u: &str, p: &Option<String>, s: &Option<String>| {
                    u == user_id && p == project_id && s == section_id
                };
                self.tasks
                    .iter()
                    .filter(|t| in_scope(&t.user_id, &t.project_id, &t.section_id))
                    .map(|t| t.sort_order)
                    .chain(
                        self.notes
                            .iter()
                            .filter(|n| in_scope(&n.user_id, &n.project_id, &n.section_id))
                            .map(|n| n.sort_order),
                    )
                    .collect()
            }
            OrderScope::Sidebar { user_id } => self
                .folders
                .iter()
                .filter(|f| &f.user_id == user_id)
                .map(|f| f.sort_order)
                .chain(
                    self.projects
                        .iter()
                        .filter(|p| &p.user_id == user_id && p.folder_id.is_none())
                        .map(|p| p.sort_order),
                )
                .collect(),
            OrderScope::Folder { folder_id } => self
                .projects
                .iter()
                .filter(|p| p.folder_id.as_deref() == Some(folder_id.as_str()))
                .map(|p| p.sort_order)
                .collect(),
            OrderScope::Sections { project_id } => self
                .sections
                .iter()
                .filter(|s| &s.project_id == project_id)
                .map(|s| s.sort_order)
                .collect(),
            OrderScope::Subtasks { task_id } => self
                .subtasks
                .iter()
                .filter(|s| &s.task_id == task_id)
                .map(|s| s.sort_order)
                .collect(),
        }
    }

    fn patch(&mut self, record: &RecordRef, patch: &Patch) -> Result<(), StoreError> {
        let allowed = allowed_fields(record.kind);
        if let Some(field) = patch.fields().into_iter().find(|f| !allowed.contains(f)) {
            return Err(StoreError::UnsupportedField {
                kind: record.kind,
                field,
            });
        }
        let not_found = || StoreError::NotFound(record.clone());
        let id = record.id.as_str();
        match record.kind {
            RecordKind::Task => {
                let task = self.task_mut(id).ok_or_else(not_found)?;
                if let Some(order) = patch.sort_order {
                    task.sort_order = order;
                }
                if let Some(project) = &patch.project_id {
                    task.project_id = project.clone();
                }
                if let Some(section) = &patch.section_id {
                    task.section_id = section.clone();
                }
                if let Some(due) = patch.due_date {
                    task.due_date = due;
                }
            }
            RecordKind::Note => {
                let note = self.note_mut(id).ok_or_else(not_found)?;
                if let Some(order) = patch.sort_order {
                    note.sort_order = order;
                }
                if let Some(project) = &patch.project_id {
                    note.project_id = project.clone();
                }
                if let Some(section) = &patch.section_id {
                    note.section_id = section.clone();
                }
                note.touch();
            }
            RecordKind::Project => {
                let project = self.project_mut(id).ok_or_else(not_found)?;
                if let Some(order) = patch.sort_order {
                    project.sort_order = order;
                }
                if let Some(folder) = &patch.folder_id {
                    project.folder_id = folder.clone();
                }
            }
            RecordKind::Folder => {
                let folder = self.folder_mut(id).ok_or_else(not_found)?;
                if let Some(order) = patch.sort_order {
                    folder.sort_order = order;
                }
            }
            RecordKind::Section => {
                let section = self.section_mut(id).ok_or_else(not_found)?;
                if let Some(order) = patch.sort_order {
                    section.sort_order = order;
                }
            }
            RecordKind::Subtask => {
                let sub = self.subtask_mut(id).ok_or_else(not_found)?;
                if let Some(order) = patch.sort_order {
                    sub.sort_order = order;
                }
            }
        }
        Ok(())
    }

    fn delete(&mut self, record: &RecordRef) -> Result<(), StoreError> {
        let id = record.id.as_str();
        let before = self.record_count(record.kind);
        match record.kind {
            RecordKind::Task => self.tasks.retain(|t| t.id != id),
            RecordKind::Note => self.notes.retain(|n| n.id != id),
            RecordKind::Project => self.projects.retain(|p| p.id != id),
            RecordKind::Folder => self.folders.retain(|f| f.id != id),
            RecordKind::Section => self.sections.retain(|s| s.id != id),
            RecordKind::Subtask => self.subtasks.retain(|s| s.id != id),
        }
        if self.record_count(record.kind) == before {
            return Err(StoreError::NotFound(record.clone()));
        }
        Ok(())
    }
}

impl Workspace {
    fn record_count(&self, kind: RecordKind) -> usize {
        match kind {
            RecordKind::Task => self.tasks.len(),
            RecordKind::Note => self.notes.len(),
            RecordKind::Project => self.projects.len(),
            RecordKind::Folder => self.folders.len(),
            RecordKind::Section => self.sections.len(),
            RecordKind::Subtask => self.subtasks.len(),
        }
    }
}
