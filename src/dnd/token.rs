//! Drag and drop identifiers.
//!
//! Everything the drag system sees is a string token: `{kind}::{id}` for
//! draggable items, a handful of sentinels for synthetic drop zones, and bare
//! entity IDs for sidebar rows. [`DropTarget::parse`] turns a token into a
//! typed target once, at the boundary.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::model::SmartList;
use crate::store::RecordRef;

pub const SEPARATOR: &str = "::";
pub const SMART_LIST_INBOX: &str = "smart-list:inbox";
pub const SMART_LIST_TODAY: &str = "smart-list:today";
pub const NO_FOLDER: &str = "no-folder";

const SECTION_PREFIX: &str = "section";
const UNSECTIONED_PREFIX: &str = "unsectioned";

/// The four kinds of record that can be dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Task,
    Note,
    Project,
    Folder,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Task => "task",
            ItemKind::Note => "note",
            ItemKind::Project => "project",
            ItemKind::Folder => "folder",
        }
    }

    pub fn parse(s: &str) -> Option<ItemKind> {
        match s {
            "task" => Some(ItemKind::Task),
            "note" => Some(ItemKind::Note),
            "project" => Some(ItemKind::Project),
            "folder" => Some(ItemKind::Folder),
            _ => None,
        }
    }

    /// Tasks and notes live in lists; projects and folders live in the sidebar
    pub fn is_list_item(self) -> bool {
        matches!(self, ItemKind::Task | ItemKind::Note)
    }
}

/// A typed draggable record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DragItem {
    pub kind: ItemKind,
    pub id: String,
}

impl DragItem {
    pub fn new(kind: ItemKind, id: impl Into<String>) -> Self {
        DragItem {
            kind,
            id: id.into(),
        }
    }

    pub fn task(id: impl Into<String>) -> Self {
        Self::new(ItemKind::Task, id)
    }

    pub fn note(id: impl Into<String>) -> Self {
        Self::new(ItemKind::Note, id)
    }

    pub fn project(id: impl Into<String>) -> Self {
        Self::new(ItemKind::Project, id)
    }

    pub fn folder(id: impl Into<String>) -> Self {
        Self::new(ItemKind::Folder, id)
    }

    pub fn token(&self) -> String {
        encode(self.kind, &self.id)
    }

    pub fn record(&self) -> RecordRef {
        match self.kind {
            ItemKind::Task => RecordRef::task(self.id.clone()),
            ItemKind::Note => RecordRef::note(self.id.clone()),
            ItemKind::Project => RecordRef::project(self.id.clone()),
            ItemKind::Folder => RecordRef::folder(self.id.clone()),
        }
    }
}

impl fmt::Display for DragItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind.as_str(), SEPARATOR, self.id)
    }
}

pub fn encode(kind: ItemKind, id: &str) -> String {
    format!("{}{}{}", kind.as_str(), SEPARATOR, id)
}

/// Decode a typed `{kind}::{id}` token. Anything else, including IDs that
/// themselves contain `::`, decodes to `None`.
pub fn decode(token: &str) -> Option<DragItem> {
    let mut parts = token.split(SEPARATOR);
    let kind = ItemKind::parse(parts.next()?)?;
    let id = parts.next()?;
    if parts.next().is_some() || id.is_empty() {
        return None;
    }
    Some(DragItem::new(kind, id))
}

pub fn section_token(project_id: &str, section_id: &str) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        SECTION_PREFIX,
        project_id,
        section_id,
        sep = SEPARATOR
    )
}

pub fn unsectioned_token(project_id: &str) -> String {
    format!("{}{}{}", UNSECTIONED_PREFIX, SEPARATOR, project_id)
}

/// Bare sidebar IDs and project/folder membership, for tokens that predate the
/// typed scheme.
#[derive(Debug, Clone, Default)]
pub struct SidebarIndex {
    pub folders: HashSet<String>,
    /// Every project, mapped to the folder holding it (if any)
    pub projects: HashMap<String, Option<String>>,
}

impl SidebarIndex {
    pub fn is_folder(&self, id: &str) -> bool {
        self.folders.contains(id)
    }

    pub fn is_standalone_project(&self, id: &str) -> bool {
        matches!(self.projects.get(id), Some(None))
    }

    pub fn folder_of(&self, project_id: &str) -> Option<&str> {
        self.projects.get(project_id).and_then(|f| f.as_deref())
    }
}

/// A decoded drop target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DropTarget {
    /// Another draggable record
    Item(DragItem),
    SmartList(SmartList),
    /// A (project, section) container
    Section {
        project_id: String,
        section_id: String,
    },
    /// The no-section block of a project
    Unsectioned { project_id: String },
    /// Take a project out of its folder
    NoFolder,
}

impl DropTarget {
    /// Parse any token the drag system can produce. Bare IDs resolve through
    /// `index`; anything unrecognised is `None`.
    pub fn parse(token: &str, index: &SidebarIndex) -> Option<DropTarget> {
        match token {
            SMART_LIST_INBOX => return Some(DropTarget::SmartList(SmartList::Inbox)),
            SMART_LIST_TODAY => return Some(DropTarget::SmartList(SmartList::Today)),
            NO_FOLDER => return Some(DropTarget::NoFolder),
            _ => {}
        }
        if let Some(item) = decode(token) {
            return Some(DropTarget::Item(item));
        }
        let parts: Vec<&str> = token.split(SEPARATOR).collect();
        match parts.as_slice() {
            [SECTION_PREFIX, project, section] if !project.is_empty() && !section.is_empty() => {
                return Some(DropTarget::Section {
                    project_id: project.to_string(),
                    section_id: section.to_string(),
                });
            }
            [UNSECTIONED_PREFIX, project] if !project.is_empty() => {
                return Some(DropTarget::Unsectioned {
                    project_id: project.to_string(),
                });
            }
            _ => {}
        }
        if index.is_folder(token) {
            Some(DropTarget::Item(DragItem::folder(token)))
        } else if index.is_standalone_project(token) {
            Some(DropTarget::Item(DragItem::project(token)))
        } else {
            None
        }
    }

    /// The token this target is registered under
    pub fn token(&self) -> String {
        match self {
            DropTarget::Item(item) => item.token(),
            DropTarget::SmartList(SmartList::Inbox) => SMART_LIST_INBOX.to_string(),
            DropTarget::SmartList(SmartList::Today) => SMART_LIST_TODAY.to_string(),
            DropTarget::SmartList(SmartList::NextSevenDays) => "smart-list:week".to_string(),
            DropTarget::Section {
                project_id,
                section_id,
            } => section_token(project_id, section_id),
            DropTarget::Unsectioned { project_id } => unsectioned_token(project_id),
            DropTarget::NoFolder => NO_FOLDER.to_string(),
        }
    }

    pub fn item(&self) -> Option<&DragItem> {
        match self {
            DropTarget::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_item_of(&self, kinds: &[ItemKind]) -> bool {
        self.item().is_some_and(|i| kinds.contains(&i.kind))
    }
}
