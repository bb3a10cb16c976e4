use chrono::{DateTime, Utc};

use crate::dnd::Destination;
use crate::model::{Folder, Note, Priority, Project, Section, Subtask, Task, TaskStatus, Workspace};
use crate::store::{OrderScope, Patch, RecordKind, RecordRef, Store, StoreError};

use super::Outcome;
use super::moves::{MoveError, check_destination};
use super::sort_order::{append, prepend};

/// Error type for record operations
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{0} not found")]
    NotFound(RecordRef),
    #[error("{0} belongs to another user")]
    NotOwned(RecordRef),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where a new task lands in its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertAt {
    Top,
    #[default]
    Bottom,
}

/// A fresh ID: kind prefix plus the first 8 hex digits of a v4 UUID.
pub fn new_id(ws: &Workspace, prefix: &str) -> String {
    loop {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        let id = format!("{}-{}", prefix, &uuid[..8]);
        if !ws.contains_id(&id) {
            return id;
        }
    }
}

fn id_prefix(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Task => "t",
        RecordKind::Note => "n",
        RecordKind::Project => "p",
        RecordKind::Folder => "f",
        RecordKind::Section => "s",
        RecordKind::Subtask => "st",
    }
}

fn require_owned<S: Store + ?Sized>(
    store: &S,
    user_id: &str,
    record: &RecordRef,
) -> Result<(), RecordError> {
    match store.owner(record) {
        None => Err(RecordError::NotFound(record.clone())),
        Some(owner) if owner != user_id => Err(RecordError::NotOwned(record.clone())),
        Some(_) => Ok(()),
    }
}

fn non_empty(text: &str, what: &str) -> Result<String, RecordError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RecordError::Invalid(format!("{} cannot be empty", what)));
    }
    Ok(trimmed.to_string())
}

fn items_scope(user_id: &str, to: &Destination) -> OrderScope {
    OrderScope::Items {
        user_id: user_id.to_string(),
        project_id: to.project_id().map(str::to_string),
        section_id: to.section_id().map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

pub fn create_task(
    ws: &mut Workspace,
    user_id: &str,
    title: &str,
    to: &Destination,
    at: InsertAt,
) -> Result<String, RecordError> {
    let title = non_empty(title, "title")?;
    check_destination(ws, user_id, to)?;
    let scope = items_scope(user_id, to);
    let mut task = Task::new(
        new_id(ws, id_prefix(RecordKind::Task)),
        user_id.to_string(),
        title,
    );
    task.project_id = to.project_id().map(str::to_string);
    task.section_id = to.section_id().map(str::to_string);
    task.sort_order = match at {
        InsertAt::Top => prepend(ws, &scope),
        InsertAt::Bottom => append(ws, &scope),
    };
    tracing::info!(id = %task.id, ?to, sort_order = task.sort_order, "created task");
    let id = task.id.clone();
    ws.tasks.push(task);
    Ok(id)
}

pub fn create_note(
    ws: &mut Workspace,
    user_id: &str,
    title: &str,
    body: Option<String>,
    to: &Destination,
) -> Result<String, RecordError> {
    let title = non_empty(title, "title")?;
    check_destination(ws, user_id, to)?;
    let mut note = Note::new(
        new_id(ws, id_prefix(RecordKind::Note)),
        user_id.to_string(),
        title,
    );
    note.body = body.filter(|b| !b.trim().is_empty());
    note.project_id = to.project_id().map(str::to_string);
    note.section_id = to.section_id().map(str::to_string);
    note.sort_order = append(ws, &items_scope(user_id, to));
    note.touch();
    tracing::info!(id = %note.id, ?to, "created note");
    let id = note.id.clone();
    ws.notes.push(note);
    Ok(id)
}

pub fn create_folder(ws: &mut Workspace, user_id: &str, name: &str) -> Result<String, RecordError> {
    let name = non_empty(name, "folder name")?;
    let sort_order = append(
        ws,
        &OrderScope::Sidebar {
            user_id: user_id.to_string(),
        },
    );
    let folder = Folder {
        id: new_id(ws, id_prefix(RecordKind::Folder)),
        user_id: user_id.to_string(),
        name,
        sort_order,
    };
    tracing::info!(id = %folder.id, "created folder");
    let id = folder.id.clone();
    ws.folders.push(folder);
    Ok(id)
}

/// Create a project, standalone or inside `folder_id`.
pub fn create_project(
    ws: &mut Workspace,
    user_id: &str,
    name: &str,
    folder_id: Option<&str>,
) -> Result<String, RecordError> {
    let name = non_empty(name, "project name")?;
    let scope = match folder_id {
        Some(folder_id) => {
            require_owned(ws, user_id, &RecordRef::folder(folder_id))?;
            OrderScope::Folder {
                folder_id: folder_id.to_string(),
            }
        }
        None => OrderScope::Sidebar {
            user_id: user_id.to_string(),
        },
    };
    let project = Project {
        id: new_id(ws, id_prefix(RecordKind::Project)),
        user_id: user_id.to_string(),
        name,
        folder_id: folder_id.map(str::to_string),
        sort_order: append(ws, &scope),
    };
    tracing::info!(id = %project.id, ?folder_id, "created project");
    let id = project.id.clone();
    ws.projects.push(project);
    Ok(id)
}

pub fn create_section(
    ws: &mut Workspace,
    user_id: &str,
    project_id: &str,
    name: &str,
) -> Result<String, RecordError> {
    let name = non_empty(name, "section name")?;
    require_owned(ws, user_id, &RecordRef::project(project_id))?;
    let section = Section {
        id: new_id(ws, id_prefix(RecordKind::Section)),
        user_id: user_id.to_string(),
        project_id: project_id.to_string(),
        name,
        sort_order: append(
            ws,
            &OrderScope::Sections {
                project_id: project_id.to_string(),
            },
        ),
    };
    tracing::info!(id = %section.id, project_id, "created section");
    let id = section.id.clone();
    ws.sections.push(section);
    Ok(id)
}

pub fn create_subtask(
    ws: &mut Workspace,
    user_id: &str,
    task_id: &str,
    title: &str,
) -> Result<String, RecordError> {
    let title = non_empty(title, "title")?;
    require_owned(ws, user_id, &RecordRef::task(task_id))?;
    let subtask = Subtask {
        id: new_id(ws, id_prefix(RecordKind::Subtask)),
        user_id: user_id.to_string(),
        task_id: task_id.to_string(),
        title,
        completed: false,
        sort_order: append(
            ws,
            &OrderScope::Subtasks {
                task_id: task_id.to_string(),
            },
        ),
    };
    let id = subtask.id.clone();
    ws.subtasks.push(subtask);
    Ok(id)
}

// ---------------------------------------------------------------------------
// Field edits
// ---------------------------------------------------------------------------

fn owned_task<'a>(
    ws: &'a mut Workspace,
    user_id: &str,
    task_id: &str,
) -> Result<&'a mut Task, RecordError> {
    require_owned(ws, user_id, &RecordRef::task(task_id))?;
    ws.task_mut(task_id)
        .ok_or_else(|| RecordError::NotFound(RecordRef::task(task_id)))
}

pub fn set_status(
    ws: &mut Workspace,
    user_id: &str,
    task_id: &str,
    status: TaskStatus,
) -> Result<(), RecordError> {
    let task = owned_task(ws, user_id, task_id)?;
    if task.status != status {
        task.status = status;
        tracing::info!(task_id, status = status.as_str(), "status changed");
    }
    Ok(())
}

pub fn set_due_date(
    ws: &mut Workspace,
    user_id: &str,
    task_id: &str,
    due: Option<DateTime<Utc>>,
) -> Result<(), RecordError> {
    let record = RecordRef::task(task_id);
    require_owned(ws, user_id, &record)?;
    ws.patch(&record, &Patch::due_date(due))?;
    Ok(())
}

pub fn set_priority(
    ws: &mut Workspace,
    user_id: &str,
    task_id: &str,
    priority: Option<Priority>,
) -> Result<(), RecordError> {
    owned_task(ws, user_id, task_id)?.priority = priority;
    Ok(())
}

/// Add a reminder, keeping the list sorted. Returns false if it was already set.
pub fn add_reminder(
    ws: &mut Workspace,
    user_id: &str,
    task_id: &str,
    at: DateTime<Utc>,
) -> Result<bool, RecordError> {
    Ok(owned_task(ws, user_id, task_id)?.insert_reminder(at))
}

pub fn remove_reminder(
    ws: &mut Workspace,
    user_id: &str,
    task_id: &str,
    at: DateTime<Utc>,
) -> Result<bool, RecordError> {
    let task = owned_task(ws, user_id, task_id)?;
    let before = task.reminders.len();
    task.reminders.retain(|r| *r != at);
    Ok(task.reminders.len() != before)
}

/// Flip a subtask's completion. The parent task's status is untouched.
pub fn toggle_subtask(ws: &mut Workspace, user_id: &str, subtask_id: &str) -> Result<bool, RecordError> {
    let record = RecordRef::subtask(subtask_id);
    require_owned(ws, user_id, &record)?;
    let sub = ws
        .subtask_mut(subtask_id)
        .ok_or(RecordError::NotFound(record))?;
    sub.completed = !sub.completed;
    Ok(sub.completed)
}

pub fn rename(
    ws: &mut Workspace,
    user_id: &str,
    record: &RecordRef,
    name: &str,
) -> Result<(), RecordError> {
    let name = non_empty(name, "name")?;
    require_owned(ws, user_id, record)?;
    let id = record.id.as_str();
    let not_found = || RecordError::NotFound(record.clone());
    match record.kind {
        RecordKind::Task => ws.task_mut(id).ok_or_else(not_found)?.title = name,
        RecordKind::Subtask => ws.subtask_mut(id).ok_or_else(not_found)?.title = name,
        RecordKind::Note => {
            let note = ws.note_mut(id).ok_or_else(not_found)?;
            note.title = name;
            note.touch();
        }
        RecordKind::Project => ws.project_mut(id).ok_or_else(not_found)?.name = name,
        RecordKind::Folder => ws.folder_mut(id).ok_or_else(not_found)?.name = name,
        RecordKind::Section => ws.section_mut(id).ok_or_else(not_found)?.name = name,
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// Delete any record, orphaning its children per kind.
pub fn delete(ws: &mut Workspace, user_id: &str, record: &RecordRef) -> Result<Outcome, RecordError> {
    require_owned(ws, user_id, record)?;
    let id = record.id.as_str();
    match record.kind {
        RecordKind::Task => delete_task(ws, user_id, id),
        RecordKind::Note => delete_note(ws, user_id, id),
        RecordKind::Subtask => delete_subtask(ws, user_id, id),
        RecordKind::Section => delete_section(ws, user_id, id),
        RecordKind::Project => delete_project(ws, user_id, id),
        RecordKind::Folder => delete_folder(ws, user_id, id),
    }
}

fn deleted(record: RecordRef) -> Outcome {
    Outcome {
        deleted: vec![record],
        ..Default::default()
    }
}

/// Delete a task together with its subtasks.
pub fn delete_task(ws: &mut Workspace, user_id: &str, task_id: &str) -> Result<Outcome, RecordError> {
    let record = RecordRef::task(task_id);
    require_owned(ws, user_id, &record)?;
    let mut outcome = Outcome::default();
    let subs: Vec<String> = ws.subtasks_of(task_id).iter().map(|s| s.id.clone()).collect();
    for sub in subs {
        let sub = RecordRef::subtask(sub);
        ws.delete(&sub)?;
        outcome.deleted.push(sub);
    }
    ws.delete(&record)?;
    tracing::info!(task_id, subtasks = outcome.deleted.len(), "deleted task");
    outcome.deleted.push(record);
    Ok(outcome)
}

pub fn delete_note(ws: &mut Workspace, user_id: &str, note_id: &str) -> Result<Outcome, RecordError> {
    let record = RecordRef::note(note_id);
    require_owned(ws, user_id, &record)?;
    ws.delete(&record)?;
    tracing::info!(note_id, "deleted note");
    Ok(deleted(record))
}

pub fn delete_subtask(
    ws: &mut Workspace,
    user_id: &str,
    subtask_id: &str,
) -> Result<Outcome, RecordError> {
    let record = RecordRef::subtask(subtask_id);
    require_owned(ws, user_id, &record)?;
    ws.delete(&record)?;
    Ok(deleted(record))
}

/// Tasks and notes in (project, section), in their current order
fn items_in(ws: &Workspace, project_id: Option<&str>, section_id: Option<&str>) -> Vec<RecordRef> {
    let mut items: Vec<(i64, RecordRef)> = ws
        .tasks
        .iter()
        .filter(|t| t.project_id.as_deref() == project_id && t.section_id.as_deref() == section_id)
        .map(|t| (t.sort_order, RecordRef::task(t.id.clone())))
        .chain(
            ws.notes
                .iter()
                .filter(|n| {
                    n.project_id.as_deref() == project_id && n.section_id.as_deref() == section_id
                })
                .map(|n| (n.sort_order, RecordRef::note(n.id.clone()))),
        )
        .collect();
    items.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
    items.into_iter().map(|(_, r)| r).collect()
}

/// Append each record to `to`, preserving their relative order.
fn relocate(
    ws: &mut Workspace,
    user_id: &str,
    records: &[RecordRef],
    to: &Destination,
) -> Result<Outcome, RecordError> {
    let mut outcome = Outcome::default();
    for record in records {
        let owner = ws.owner(record).unwrap_or_default().to_string();
        let scope = items_scope(&owner, to);
        let sort_order = append(ws, &scope);
        ws.patch(
            record,
            &Patch::placement(
                to.project_id().map(str::to_string),
                to.section_id().map(str::to_string),
                sort_order,
            ),
        )?;
        if owner != user_id {
            tracing::warn!(%record, "relocated record owned by another user");
        }
        outcome.patched.push(record.clone());
    }
    Ok(outcome)
}

/// Delete a section. Its tasks and notes stay in the project, unsectioned.
pub fn delete_section(
    ws: &mut Workspace,
    user_id: &str,
    section_id: &str,
) -> Result<Outcome, RecordError> {
    let record = RecordRef::section(section_id);
    require_owned(ws, user_id, &record)?;
    let project_id = ws
        .section(section_id)
        .map(|s| s.project_id.clone())
        .ok_or_else(|| RecordError::NotFound(record.clone()))?;
    let orphans = items_in(ws, Some(&project_id), Some(section_id));
    let mut outcome = relocate(
        ws,
        user_id,
        &orphans,
        &Destination::Project {
            project_id,
            section_id: None,
        },
    )?;
    ws.delete(&record)?;
    tracing::info!(section_id, moved = outcome.patched.len(), "deleted section");
    outcome.deleted.push(record);
    Ok(outcome)
}

/// Delete a project. Its tasks and notes move to the Inbox; its sections go.
pub fn delete_project(
    ws: &mut Workspace,
    user_id: &str,
    project_id: &str,
) -> Result<Outcome, RecordError> {
    let record = RecordRef::project(project_id);
    require_owned(ws, user_id, &record)?;

    let mut sections: Vec<&Section> = ws
        .sections
        .iter()
        .filter(|s| s.project_id == project_id)
        .collect();
    sections.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
    let section_ids: Vec<String> = sections.iter().map(|s| s.id.clone()).collect();

    // Unsectioned items first, then each section's block in section order
    let mut orphans = items_in(ws, Some(project_id), None);
    for section_id in &section_ids {
        orphans.extend(items_in(ws, Some(project_id), Some(section_id)));
    }
    let mut outcome = relocate(ws, user_id, &orphans, &Destination::Inbox)?;

    for section_id in section_ids {
        let section = RecordRef::section(section_id);
        ws.delete(&section)?;
        outcome.deleted.push(section);
    }
    ws.delete(&record)?;
    tracing::info!(project_id, moved = outcome.patched.len(), "deleted project");
    outcome.deleted.push(record);
    Ok(outcome)
}

/// Delete a folder. Its projects become standalone, appended to the sidebar.
pub fn delete_folder(
    ws: &mut Workspace,
    user_id: &str,
    folder_id: &str,
) -> Result<Outcome, RecordError> {
    let record = RecordRef::folder(folder_id);
    require_owned(ws, user_id, &record)?;

    let mut projects: Vec<&Project> = ws
        .projects
        .iter()
        .filter(|p| p.folder_id.as_deref() == Some(folder_id))
        .collect();
    projects.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
    let detached: Vec<RecordRef> = projects
        .iter()
        .map(|p| RecordRef::project(p.id.clone()))
        .collect();

    // Remove the folder first so it no longer counts toward the sidebar order
    ws.delete(&record)?;
    let mut outcome = Outcome::default();
    for project in detached {
        let scope = OrderScope::Sidebar {
            user_id: ws.owner(&project).unwrap_or(user_id).to_string(),
        };
        let sort_order = append(ws, &scope);
        ws.patch(&project, &Patch::folder(None, sort_order))?;
        outcome.patched.push(project);
    }
    tracing::info!(folder_id, detached = outcome.patched.len(), "deleted folder");
    outcome.deleted.push(record);
    Ok(outcome)
}
