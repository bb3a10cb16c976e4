use std::fs;
use std::path::Path;

use crate::io::workspace_io::atomic_write;
use crate::model::{NavState, Selection, Workspace};

const STATE_FILE: &str = ".state.json";

/// Read `.state.json` from the workspace directory. Missing or unreadable
/// state is `None`; the caller falls back to defaults.
pub fn read_nav_state(dir: &Path) -> Option<NavState> {
    let content = fs::read_to_string(dir.join(STATE_FILE)).ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed {}", STATE_FILE);
            None
        }
    }
}

pub fn write_nav_state(dir: &Path, state: &NavState) -> Result<(), std::io::Error> {
    let content = serde_json::to_string_pretty(state)?;
    atomic_write(&dir.join(STATE_FILE), content.as_bytes())
}

/// Drop references to records deleted since the state was saved.
pub fn prune_nav_state(state: &mut NavState, ws: &Workspace) {
    let stale_folders: Vec<String> = state
        .expanded_folders
        .iter()
        .filter(|id| ws.folder(id).is_none())
        .cloned()
        .collect();
    for id in stale_folders {
        state.forget(&id);
    }
    if let Selection::Project(id) = &state.selection {
        if ws.project(id).is_none() {
            let id = id.clone();
            state.forget(&id);
        }
    }
    if let Some(id) = state.editing.as_ref().map(|e| e.id().to_string()) {
        if !ws.contains_id(&id) {
            state.forget(&id);
        }
    }
}
