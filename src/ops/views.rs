//! Read-only views over a workspace: sidebar, containers, smart lists, and
//! the sortable lists a drag can reorder.

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};

use crate::dnd::{DragContext, DragItem, ListScope, SidebarIndex, SortableList};
use crate::model::{Folder, Note, Project, Section, SmartList, Task, Workspace};

/// A row in a task/note list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListItem<'a> {
    Task(&'a Task),
    Note(&'a Note),
}

impl<'a> ListItem<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            ListItem::Task(t) => &t.id,
            ListItem::Note(n) => &n.id,
        }
    }

    pub fn title(&self) -> &'a str {
        match self {
            ListItem::Task(t) => &t.title,
            ListItem::Note(n) => &n.title,
        }
    }

    pub fn sort_order(&self) -> i64 {
        match self {
            ListItem::Task(t) => t.sort_order,
            ListItem::Note(n) => n.sort_order,
        }
    }

    pub fn drag_item(&self) -> DragItem {
        match self {
            ListItem::Task(t) => DragItem::task(t.id.clone()),
            ListItem::Note(n) => DragItem::note(n.id.clone()),
        }
    }
}

/// A top-level sidebar row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEntry<'a> {
    Folder {
        folder: &'a Folder,
        projects: Vec<&'a Project>,
    },
    Project(&'a Project),
}

impl<'a> SidebarEntry<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            SidebarEntry::Folder { folder, .. } => &folder.id,
            SidebarEntry::Project(p) => &p.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            SidebarEntry::Folder { folder, .. } => &folder.name,
            SidebarEntry::Project(p) => &p.name,
        }
    }

    pub fn sort_order(&self) -> i64 {
        match self {
            SidebarEntry::Folder { folder, .. } => folder.sort_order,
            SidebarEntry::Project(p) => p.sort_order,
        }
    }

    pub fn drag_item(&self) -> DragItem {
        match self {
            SidebarEntry::Folder { folder, .. } => DragItem::folder(folder.id.clone()),
            SidebarEntry::Project(p) => DragItem::project(p.id.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBlock<'a> {
    pub section: &'a Section,
    pub items: Vec<ListItem<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectView<'a> {
    pub project: &'a Project,
    pub unsectioned: Vec<ListItem<'a>>,
    pub sections: Vec<SectionBlock<'a>>,
}

/// Midnight of `now`'s local day, as UTC
pub fn start_of_day(now: DateTime<Local>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or(now)
        .with_timezone(&Utc)
}

fn projects_in<'a>(ws: &'a Workspace, folder_id: &str) -> Vec<&'a Project> {
    let mut projects: Vec<&Project> = ws
        .projects
        .iter()
        .filter(|p| p.folder_id.as_deref() == Some(folder_id))
        .collect();
    projects.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
    projects
}

/// The unified sidebar: folders and standalone projects in one order.
pub fn sidebar<'a>(ws: &'a Workspace, user_id: &str) -> Vec<SidebarEntry<'a>> {
    let mut entries: Vec<SidebarEntry> = ws
        .folders
        .iter()
        .filter(|f| f.user_id == user_id)
        .map(|folder| SidebarEntry::Folder {
            folder,
            projects: projects_in(ws, &folder.id),
        })
        .chain(
            ws.projects
                .iter()
                .filter(|p| p.user_id == user_id && p.folder_id.is_none())
                .map(SidebarEntry::Project),
        )
        .collect();
    entries.sort_by(|a, b| {
        a.sort_order()
            .cmp(&b.sort_order())
            .then_with(|| a.id().cmp(b.id()))
    });
    entries
}

pub fn sidebar_index(ws: &Workspace, user_id: &str) -> SidebarIndex {
    let mut index = SidebarIndex::default();
    for f in ws.folders.iter().filter(|f| f.user_id == user_id) {
        index.folders.insert(f.id.clone());
    }
    for p in ws.projects.iter().filter(|p| p.user_id == user_id) {
        index.projects.insert(p.id.clone(), p.folder_id.clone());
    }
    index
}

/// Tasks and notes of one container, interleaved by `sort_order`.
pub fn container_items<'a>(
    ws: &'a Workspace,
    user_id: &str,
    project_id: Option<&str>,
    section_id: Option<&str>,
    include_completed: bool,
) -> Vec<ListItem<'a>> {
    let here = |user: &str, p: &Option<String>, s: &Option<String>| {
        user == user_id && p.as_deref() == project_id && s.as_deref() == section_id
    };
    let mut items: Vec<ListItem> = ws
        .tasks
        .iter()
        .filter(|t| here(&t.user_id, &t.project_id, &t.section_id))
        .filter(|t| include_completed || t.is_pending())
        .map(ListItem::Task)
        .chain(
            ws.notes
                .iter()
                .filter(|n| here(&n.user_id, &n.project_id, &n.section_id))
                .map(ListItem::Note),
        )
        .collect();
    items.sort_by(|a, b| {
        a.sort_order()
            .cmp(&b.sort_order())
            .then_with(|| a.id().cmp(b.id()))
    });
    items
}

pub fn inbox<'a>(ws: &'a Workspace, user_id: &str, include_completed: bool) -> Vec<ListItem<'a>> {
    container_items(ws, user_id, None, None, include_completed)
}

/// Pending tasks due before the end of today, overdue included.
pub fn today<'a>(ws: &'a Workspace, user_id: &str, today_start: DateTime<Utc>) -> Vec<&'a Task> {
    let end = today_start + Duration::days(1);
    let mut tasks: Vec<&Task> = ws
        .tasks
        .iter()
        .filter(|t| t.user_id == user_id && t.is_pending())
        .filter(|t| t.due_date.is_some_and(|d| d < end))
        .collect();
    tasks.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
    tasks
}

/// Pending tasks due from today through the sixth day after, soonest first.
pub fn next_seven_days<'a>(
    ws: &'a Workspace,
    user_id: &str,
    today_start: DateTime<Utc>,
) -> Vec<&'a Task> {
    let end = today_start + Duration::days(7);
    let mut tasks: Vec<&Task> = ws
        .tasks
        .iter()
        .filter(|t| t.user_id == user_id && t.is_pending())
        .filter(|t| t.due_date.is_some_and(|d| d >= today_start && d < end))
        .collect();
    tasks.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.sort_order.cmp(&b.sort_order))
            .then_with(|| a.id.cmp(&b.id))
    });
    tasks
}

pub fn sections_of<'a>(ws: &'a Workspace, project_id: &str) -> Vec<&'a Section> {
    let mut sections: Vec<&Section> = ws
        .sections
        .iter()
        .filter(|s| s.project_id == project_id)
        .collect();
    sections.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
    sections
}

pub fn project_view<'a>(
    ws: &'a Workspace,
    user_id: &str,
    project_id: &str,
    include_completed: bool,
) -> Option<ProjectView<'a>> {
    let project = ws.project(project_id).filter(|p| p.user_id == user_id)?;
    let sections = sections_of(ws, project_id)
        .into_iter()
        .map(|section| SectionBlock {
            section,
            items: container_items(
                ws,
                user_id,
                Some(project_id),
                Some(&section.id),
                include_completed,
            ),
        })
        .collect();
    Some(ProjectView {
        project,
        unsectioned: container_items(ws, user_id, Some(project_id), None, include_completed),
        sections,
    })
}

/// One container's sortable list. Hidden completed tasks are kept as
/// siblings so a renumber never collides with them.
fn items_list(
    ws: &Workspace,
    user_id: &str,
    project_id: Option<&str>,
    section_id: Option<&str>,
    include_completed: bool,
) -> SortableList {
    let ids = |completed: bool| -> Vec<DragItem> {
        container_items(ws, user_id, project_id, section_id, completed)
            .iter()
            .map(ListItem::drag_item)
            .collect()
    };
    SortableList::with_siblings(
        ListScope::Items {
            project_id: project_id.map(str::to_string),
            section_id: section_id.map(str::to_string),
        },
        ids(include_completed),
        ids(true),
    )
}

/// Every list a drag can reorder, plus what the dispatcher needs to resolve
/// targets. Containers come before Today so an in-container reorder wins
/// when both lists hold the pair.
pub fn drag_context(
    ws: &Workspace,
    user_id: &str,
    today_start: DateTime<Utc>,
    include_completed: bool,
) -> DragContext {
    let mut lists = vec![items_list(ws, user_id, None, None, include_completed)];
    let entries = sidebar(ws, user_id);
    let projects = entries.iter().flat_map(|e| match e {
        SidebarEntry::Folder { projects, .. } => projects.clone(),
        SidebarEntry::Project(p) => vec![*p],
    });
    for project in projects {
        let id = Some(project.id.as_str());
        lists.push(items_list(ws, user_id, id, None, include_completed));
        for section in sections_of(ws, &project.id) {
            lists.push(items_list(ws, user_id, id, Some(&section.id), include_completed));
        }
    }
    lists.push(SortableList::new(
        ListScope::Smart(SmartList::Today),
        today(ws, user_id, today_start)
            .iter()
            .map(|t| DragItem::task(t.id.clone()))
            .collect(),
    ));
    lists.push(SortableList::new(
        ListScope::Sidebar,
        entries.iter().map(SidebarEntry::drag_item).collect(),
    ));
    for entry in &entries {
        if let SidebarEntry::Folder { folder, projects } = entry {
            lists.push(SortableList::new(
                ListScope::Folder(folder.id.clone()),
                projects
                    .iter()
                    .map(|p| DragItem::project(p.id.clone()))
                    .collect(),
            ));
        }
    }
    DragContext {
        lists,
        index: sidebar_index(ws, user_id),
        today_start,
    }
}
