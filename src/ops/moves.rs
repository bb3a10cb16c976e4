use crate::dnd::{Destination, Mutation};
use crate::store::{OrderScope, Patch, RecordKind, RecordRef, Store, StoreError};

use super::Outcome;
use super::sort_order::{append, renumber};

/// Error type for applying a dispatched mutation
#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("folder not found: {0}")]
    FolderNotFound(String),
    #[error("section {section_id} does not belong to project {project_id}")]
    SectionMismatch {
        project_id: String,
        section_id: String,
    },
}

/// Persist one dispatched mutation on behalf of `user_id`.
///
/// Records the user does not own are skipped, not reported as errors.
/// Moving something to where it already is writes nothing.
pub fn apply<S: Store + ?Sized>(
    store: &mut S,
    user_id: &str,
    mutation: &Mutation,
) -> Result<Outcome, MoveError> {
    let outcome = match mutation {
        Mutation::MoveTask { task_id, to } => {
            reparent(store, user_id, RecordRef::task(task_id.clone()), to)?
        }
        Mutation::MoveNote { note_id, to } => {
            reparent(store, user_id, RecordRef::note(note_id.clone()), to)?
        }
        Mutation::ScheduleTask { task_id, due } => {
            let record = RecordRef::task(task_id.clone());
            if !owned(store, user_id, &record) {
                return Ok(skipped(record));
            }
            store.patch(&record, &Patch::due_date(Some(*due)))?;
            tracing::info!(%record, %due, "scheduled");
            patched(record)
        }
        Mutation::MoveProject {
            project_id,
            folder_id,
        } => move_project(store, user_id, project_id, folder_id.as_deref())?,
        Mutation::Renumber { order, .. } => {
            let records: Vec<RecordRef> = order.iter().map(|item| item.record()).collect();
            renumber(store, user_id, &records)?
        }
    };
    Ok(outcome)
}

fn owned<S: Store + ?Sized>(store: &S, user_id: &str, record: &RecordRef) -> bool {
    match store.owner(record) {
        Some(owner) if owner == user_id => true,
        Some(_) => {
            tracing::warn!(%record, "skipping record owned by another user");
            false
        }
        None => {
            tracing::warn!(%record, "skipping missing record");
            false
        }
    }
}

fn skipped(record: RecordRef) -> Outcome {
    Outcome {
        skipped: vec![record],
        ..Default::default()
    }
}

fn patched(record: RecordRef) -> Outcome {
    Outcome {
        patched: vec![record],
        ..Default::default()
    }
}

/// Check that `to` exists, belongs to `user_id`, and that its section (if
/// any) is inside its project.
pub fn check_destination<S: Store + ?Sized>(
    store: &S,
    user_id: &str,
    to: &Destination,
) -> Result<(), MoveError> {
    let Destination::Project {
        project_id,
        section_id,
    } = to
    else {
        return Ok(());
    };
    if store.owner(&RecordRef::project(project_id.clone())) != Some(user_id) {
        return Err(MoveError::ProjectNotFound(project_id.clone()));
    }
    if let Some(section_id) = section_id {
        let section = RecordRef::section(section_id.clone());
        let in_project = store.owner(&section) == Some(user_id)
            && store
                .placement(&section)
                .is_some_and(|p| p.project_id.as_deref() == Some(project_id.as_str()));
        if !in_project {
            return Err(MoveError::SectionMismatch {
                project_id: project_id.clone(),
                section_id: section_id.clone(),
            });
        }
    }
    Ok(())
}

fn reparent<S: Store + ?Sized>(
    store: &mut S,
    user_id: &str,
    record: RecordRef,
    to: &Destination,
) -> Result<Outcome, MoveError> {
    debug_assert!(matches!(record.kind, RecordKind::Task | RecordKind::Note));
    if !owned(store, user_id, &record) {
        return Ok(skipped(record));
    }
    let current = store
        .placement(&record)
        .ok_or_else(|| StoreError::NotFound(record.clone()))?;
    if current.project_id.as_deref() == to.project_id()
        && current.section_id.as_deref() == to.section_id()
    {
        tracing::debug!(%record, "already in destination");
        return Ok(Outcome::default());
    }
    check_destination(store, user_id, to)?;

    let scope = OrderScope::Items {
        user_id: user_id.to_string(),
        project_id: to.project_id().map(str::to_string),
        section_id: to.section_id().map(str::to_string),
    };
    let sort_order = append(store, &scope);
    store.patch(
        &record,
        &Patch::placement(
            to.project_id().map(str::to_string),
            to.section_id().map(str::to_string),
            sort_order,
        ),
    )?;
    tracing::info!(%record, ?to, sort_order, "moved");
    Ok(patched(record))
}

fn move_project<S: Store + ?Sized>(
    store: &mut S,
    user_id: &str,
    project_id: &str,
    folder_id: Option<&str>,
) -> Result<Outcome, MoveError> {
    let record = RecordRef::project(project_id);
    if !owned(store, user_id, &record) {
        return Ok(skipped(record));
    }
    let current = store
        .placement(&record)
        .ok_or_else(|| StoreError::NotFound(record.clone()))?;
    if current.folder_id.as_deref() == folder_id {
        tracing::debug!(%record, "already in folder");
        return Ok(Outcome::default());
    }

    let scope = match folder_id {
        Some(folder_id) => {
            if store.owner(&RecordRef::folder(folder_id)) != Some(user_id) {
                return Err(MoveError::FolderNotFound(folder_id.to_string()));
            }
            OrderScope::Folder {
                folder_id: folder_id.to_string(),
            }
        }
        None => OrderScope::Sidebar {
            user_id: user_id.to_string(),
        },
    };
    let sort_order = append(store, &scope);
    store.patch(
        &record,
        &Patch::folder(folder_id.map(str::to_string), sort_order),
    )?;
    tracing::info!(%record, ?folder_id, sort_order, "moved project");
    Ok(patched(record))
}
