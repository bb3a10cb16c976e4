use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Computed task views that are not stored containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmartList {
    Inbox,
    Today,
    NextSevenDays,
}

impl SmartList {
    pub fn label(self) -> &'static str {
        match self {
            SmartList::Inbox => "Inbox",
            SmartList::Today => "Today",
            SmartList::NextSevenDays => "Next 7 Days",
        }
    }
}

/// What the main pane is showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Selection {
    Smart(SmartList),
    Project(String),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Smart(SmartList::Inbox)
    }
}

/// A record whose name is being edited in place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EditTarget {
    Task(String),
    Note(String),
    Project(String),
    Folder(String),
    Section(String),
}

impl EditTarget {
    pub fn id(&self) -> &str {
        match self {
            EditTarget::Task(id)
            | EditTarget::Note(id)
            | EditTarget::Project(id)
            | EditTarget::Folder(id)
            | EditTarget::Section(id) => id,
        }
    }
}

/// Navigation state shared by every view that needs it.
///
/// Handed around by reference instead of living in per-widget flags;
/// persisted to `.state.json` between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavState {
    #[serde(default)]
    pub selection: Selection,
    #[serde(default)]
    pub expanded_folders: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editing: Option<EditTarget>,
}

impl NavState {
    pub fn select(&mut self, selection: Selection) {
        if self.selection != selection {
            self.editing = None;
        }
        self.selection = selection;
    }

    /// Flip a folder between expanded and collapsed; returns the new state
    pub fn toggle_folder(&mut self, folder_id: &str) -> bool {
        if self.expanded_folders.remove(folder_id) {
            false
        } else {
            self.expanded_folders.insert(folder_id.to_string());
            true
        }
    }

    pub fn is_expanded(&self, folder_id: &str) -> bool {
        self.expanded_folders.contains(folder_id)
    }

    pub fn begin_edit(&mut self, target: EditTarget) {
        self.editing = Some(target);
    }

    pub fn end_edit(&mut self) -> Option<EditTarget> {
        self.editing.take()
    }

    /// Drop every reference to a record that no longer exists.
    pub fn forget(&mut self, id: &str) {
        self.expanded_folders.remove(id);
        if matches!(&self.selection, Selection::Project(p) if p == id) {
            self.selection = Selection::default();
        }
        if self.editing.as_ref().is_some_and(|e| e.id() == id) {
            self.editing = None;
        }
    }
}
