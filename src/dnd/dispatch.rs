//! Completed drag → at most one mutation.

use chrono::{DateTime, Utc};

use super::collision::{Collision, Contact};
use super::token::{DragItem, DropTarget, ItemKind, SidebarIndex};
use crate::model::SmartList;
use crate::ops::sort_order::array_move;

/// Where a task or note is being moved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Inbox,
    Project {
        project_id: String,
        section_id: Option<String>,
    },
}

impl Destination {
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Destination::Inbox => None,
            Destination::Project { project_id, .. } => Some(project_id),
        }
    }

    pub fn section_id(&self) -> Option<&str> {
        match self {
            Destination::Inbox => None,
            Destination::Project { section_id, .. } => section_id.as_deref(),
        }
    }
}

/// Identity of one rendered sortable list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListScope {
    /// Mixed tasks and notes of one container; no project is the Inbox
    Items {
        project_id: Option<String>,
        section_id: Option<String>,
    },
    /// A computed list (Today, Next 7 Days)
    Smart(SmartList),
    /// Folders and standalone projects
    Sidebar,
    /// Projects inside one folder
    Folder(String),
}

impl ListScope {
    pub fn inbox() -> Self {
        ListScope::Items {
            project_id: None,
            section_id: None,
        }
    }
}

/// A list currently on screen, in displayed order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortableList {
    pub scope: ListScope,
    /// Displayed items
    pub items: Vec<DragItem>,
    /// Every stored sibling in stored order, hidden ones (completed tasks)
    /// included. A renumber always covers this whole set.
    pub siblings: Vec<DragItem>,
}

impl SortableList {
    /// A list with nothing hidden
    pub fn new(scope: ListScope, items: Vec<DragItem>) -> Self {
        SortableList {
            scope,
            siblings: items.clone(),
            items,
        }
    }

    pub fn with_siblings(scope: ListScope, items: Vec<DragItem>, siblings: Vec<DragItem>) -> Self {
        SortableList {
            scope,
            items,
            siblings,
        }
    }

    pub fn position(&self, item: &DragItem) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }

    /// Spread a reordered copy of `items` back over the full sibling list.
    /// Hidden siblings stay in their slots; the displayed slots are filled
    /// from `displayed` in order.
    pub fn full_order(&self, displayed: Vec<DragItem>) -> Vec<DragItem> {
        let mut displayed = displayed.into_iter();
        self.siblings
            .iter()
            .map(|sibling| {
                if self.items.contains(sibling) {
                    displayed.next().unwrap_or_else(|| sibling.clone())
                } else {
                    sibling.clone()
                }
            })
            .collect()
    }
}

/// Everything the dispatcher needs to know about the screen
#[derive(Debug, Clone, Default)]
pub struct DragContext {
    pub lists: Vec<SortableList>,
    pub index: SidebarIndex,
    /// Start of the current local day, as UTC
    pub today_start: DateTime<Utc>,
}

impl DragContext {
    /// The first list holding `item`
    pub fn list_of(&self, item: &DragItem) -> Option<&SortableList> {
        self.lists.iter().find(|l| l.position(item).is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    pub active: DragItem,
    pub over: Option<Collision>,
}

/// The single persistence operation a drag resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    MoveTask {
        task_id: String,
        to: Destination,
    },
    /// "Set due today"
    ScheduleTask {
        task_id: String,
        due: DateTime<Utc>,
    },
    MoveNote {
        note_id: String,
        to: Destination,
    },
    /// `None` takes the project out of its folder
    MoveProject {
        project_id: String,
        folder_id: Option<String>,
    },
    /// A full sibling list in its new order
    Renumber {
        scope: ListScope,
        order: Vec<DragItem>,
    },
}

pub fn dispatch(end: &DragEnd, ctx: &DragContext) -> Option<Mutation> {
    let active = &end.active;
    let Some(over) = &end.over else {
        tracing::debug!(%active, "dropped outside any target");
        return None;
    };
    if over.target.item().is_some_and(|i| i.id == active.id) {
        tracing::debug!(%active, "dropped onto itself");
        return None;
    }

    let mutation = match (active.kind, &over.target) {
        (ItemKind::Task, DropTarget::SmartList(SmartList::Inbox)) => Some(Mutation::MoveTask {
            task_id: active.id.clone(),
            to: Destination::Inbox,
        }),
        (ItemKind::Task, DropTarget::SmartList(SmartList::Today)) => Some(Mutation::ScheduleTask {
            task_id: active.id.clone(),
            due: ctx.today_start,
        }),
        (
            ItemKind::Task | ItemKind::Note,
            DropTarget::Section {
                project_id,
                section_id,
            },
        ) => Some(move_item(
            active,
            Destination::Project {
                project_id: project_id.clone(),
                section_id: Some(section_id.clone()),
            },
        )),
        (ItemKind::Task | ItemKind::Note, DropTarget::Unsectioned { project_id })
        | (
            ItemKind::Task | ItemKind::Note,
            DropTarget::Item(DragItem {
                kind: ItemKind::Project,
                id: project_id,
            }),
        ) => Some(move_item(
            active,
            Destination::Project {
                project_id: project_id.clone(),
                section_id: None,
            },
        )),
        // Tasks and notes share one order in mixed lists
        (ItemKind::Task | ItemKind::Note, DropTarget::Item(sibling))
            if sibling.kind.is_list_item() =>
        {
            reorder(ctx, active, sibling)
        }
        (ItemKind::Project, DropTarget::NoFolder) => Some(Mutation::MoveProject {
            project_id: active.id.clone(),
            folder_id: None,
        }),
        (ItemKind::Project, DropTarget::Item(folder))
            if folder.kind == ItemKind::Folder && over.contact == Contact::Within =>
        {
            Some(Mutation::MoveProject {
                project_id: active.id.clone(),
                folder_id: Some(folder.id.clone()),
            })
        }
        (ItemKind::Project | ItemKind::Folder, DropTarget::Item(sibling))
            if !sibling.kind.is_list_item() =>
        {
            reorder(ctx, active, sibling)
        }
        _ => {
            tracing::debug!(%active, target = %over.target.token(), "target not valid for this item");
            None
        }
    };
    tracing::debug!(%active, ?mutation, "dispatched drop");
    mutation
}

fn move_item(active: &DragItem, to: Destination) -> Mutation {
    match active.kind {
        ItemKind::Note => Mutation::MoveNote {
            note_id: active.id.clone(),
            to,
        },
        _ => Mutation::MoveTask {
            task_id: active.id.clone(),
            to,
        },
    }
}

/// Reorder within the one list that holds both items.
fn reorder(ctx: &DragContext, active: &DragItem, over: &DragItem) -> Option<Mutation> {
    let Some((list, from, to)) = ctx.lists.iter().find_map(|l| {
        let from = l.position(active)?;
        let to = l.position(over)?;
        Some((l, from, to))
    }) else {
        tracing::debug!(%active, %over, "no shared list; ignoring reorder");
        return None;
    };
    let mut displayed = list.items.clone();
    array_move(&mut displayed, from, to);
    Some(Mutation::Renumber {
        scope: list.scope.clone(),
        order: list.full_order(displayed),
    })
}
