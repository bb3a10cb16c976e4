use chrono::{DateTime, Local, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{Note, Priority, Project, Subtask, Task, TaskStatus, Workspace};
use crate::ops::Outcome;
use crate::ops::views::{ListItem, ProjectView, SidebarEntry};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    pub sort_order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<SubtaskJson>,
}

#[derive(Serialize)]
pub struct SubtaskJson {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct NoteJson {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    pub sort_order: i64,
}

/// A list row, tagged with its kind
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemJson {
    Task(TaskJson),
    Note(NoteJson),
}

#[derive(Serialize)]
pub struct ProjectJson {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub sort_order: i64,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SidebarJson {
    Folder {
        id: String,
        name: String,
        sort_order: i64,
        projects: Vec<ProjectJson>,
    },
    Project(ProjectJson),
}

#[derive(Serialize)]
pub struct SectionJson {
    pub name: String,
    pub items: Vec<ItemJson>,
}

#[derive(Serialize)]
pub struct ProjectViewJson {
    pub id: String,
    pub name: String,
    pub unsectioned: Vec<ItemJson>,
    /// Keyed by section ID, in section order
    pub sections: IndexMap<String, SectionJson>,
}

#[derive(Serialize)]
pub struct OutcomeJson {
    pub patched: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(ws: &Workspace, task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        status: task.status,
        project_id: task.project_id.clone(),
        section_id: task.section_id.clone(),
        sort_order: task.sort_order,
        due_date: task.due_date,
        priority: task.priority,
        reminders: task.reminders.clone(),
        subtasks: ws
            .subtasks_of(&task.id)
            .into_iter()
            .map(|s| SubtaskJson {
                id: s.id.clone(),
                title: s.title.clone(),
                completed: s.completed,
            })
            .collect(),
    }
}

pub fn note_to_json(note: &Note) -> NoteJson {
    NoteJson {
        id: note.id.clone(),
        title: note.title.clone(),
        body: note.body.clone(),
        project_id: note.project_id.clone(),
        section_id: note.section_id.clone(),
        sort_order: note.sort_order,
    }
}

pub fn item_to_json(ws: &Workspace, item: &ListItem<'_>) -> ItemJson {
    match item {
        ListItem::Task(t) => ItemJson::Task(task_to_json(ws, t)),
        ListItem::Note(n) => ItemJson::Note(note_to_json(n)),
    }
}

pub fn project_to_json(project: &Project) -> ProjectJson {
    ProjectJson {
        id: project.id.clone(),
        name: project.name.clone(),
        folder_id: project.folder_id.clone(),
        sort_order: project.sort_order,
    }
}

pub fn sidebar_to_json(entry: &SidebarEntry<'_>) -> SidebarJson {
    match entry {
        SidebarEntry::Folder { folder, projects } => SidebarJson::Folder {
            id: folder.id.clone(),
            name: folder.name.clone(),
            sort_order: folder.sort_order,
            projects: projects.iter().map(|p| project_to_json(p)).collect(),
        },
        SidebarEntry::Project(p) => SidebarJson::Project(project_to_json(p)),
    }
}

pub fn project_view_to_json(ws: &Workspace, view: &ProjectView<'_>) -> ProjectViewJson {
    let sections = view
        .sections
        .iter()
        .map(|block| {
            (
                block.section.id.clone(),
                SectionJson {
                    name: block.section.name.clone(),
                    items: block.items.iter().map(|i| item_to_json(ws, i)).collect(),
                },
            )
        })
        .collect();
    ProjectViewJson {
        id: view.project.id.clone(),
        name: view.project.name.clone(),
        unsectioned: view.unsectioned.iter().map(|i| item_to_json(ws, i)).collect(),
        sections,
    }
}

pub fn outcome_to_json(outcome: &Outcome) -> OutcomeJson {
    let refs = |v: &[crate::store::RecordRef]| v.iter().map(|r| r.to_string()).collect();
    OutcomeJson {
        patched: refs(&outcome.patched),
        skipped: refs(&outcome.skipped),
        deleted: refs(&outcome.deleted),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// A due date in local time; the time is omitted at local midnight.
pub fn format_due(due: DateTime<Utc>) -> String {
    let local = due.with_timezone(&Local);
    if local.time() == chrono::NaiveTime::MIN {
        local.format("%Y-%m-%d").to_string()
    } else {
        local.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!(
        "[{}] {} {}",
        task.status.checkbox_char(),
        task.id,
        task.title
    );
    if let Some(p) = task.priority {
        line.push_str(&format!(" !{}", p.as_str()));
    }
    if let Some(due) = task.due_date {
        line.push_str(&format!(" (due {})", format_due(due)));
    }
    line
}

pub fn format_note_line(note: &Note) -> String {
    format!("  ~ {} {}", note.id, note.title)
}

pub fn format_item_line(item: &ListItem<'_>) -> String {
    match item {
        ListItem::Task(t) => format_task_line(t),
        ListItem::Note(n) => format_note_line(n),
    }
}

fn format_subtask_line(sub: &Subtask) -> String {
    format!(
        "  [{}] {} {}",
        if sub.completed { 'x' } else { ' ' },
        sub.id,
        sub.title
    )
}

/// Format detailed task view
pub fn format_task_detail(ws: &Workspace, task: &Task) -> Vec<String> {
    let mut lines = vec![format_task_line(task)];
    match (&task.project_id, &task.section_id) {
        (None, _) => lines.push("in: Inbox".to_string()),
        (Some(p), None) => lines.push(format!("in: {}", container_name(ws, p, None))),
        (Some(p), Some(s)) => lines.push(format!("in: {}", container_name(ws, p, Some(s)))),
    }
    for at in &task.reminders {
        lines.push(format!("remind: {}", format_due(*at)));
    }
    let subs = ws.subtasks_of(&task.id);
    if !subs.is_empty() {
        lines.push(String::new());
        lines.push("subtasks:".to_string());
        lines.extend(subs.into_iter().map(format_subtask_line));
    }
    lines
}

pub fn format_note_detail(ws: &Workspace, note: &Note) -> Vec<String> {
    let mut lines = vec![format!("{} {}", note.id, note.title)];
    match &note.project_id {
        None => lines.push("in: Inbox".to_string()),
        Some(p) => lines.push(format!(
            "in: {}",
            container_name(ws, p, note.section_id.as_deref())
        )),
    }
    if let Some(body) = &note.body {
        lines.push(String::new());
        lines.extend(body.lines().map(str::to_string));
    }
    lines
}

fn container_name(ws: &Workspace, project_id: &str, section_id: Option<&str>) -> String {
    let project = ws
        .project(project_id)
        .map(|p| p.name.as_str())
        .unwrap_or(project_id);
    match section_id.and_then(|s| ws.section(s)) {
        Some(section) => format!("{} / {}", project, section.name),
        None => project.to_string(),
    }
}

/// Sidebar listing: folders with their projects indented beneath.
pub fn format_sidebar(entries: &[SidebarEntry<'_>]) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in entries {
        match entry {
            SidebarEntry::Folder { folder, projects } => {
                lines.push(format!("▸ {} ({})", folder.name, folder.id));
                for p in projects {
                    lines.push(format!("    {} ({})", p.name, p.id));
                }
            }
            SidebarEntry::Project(p) => lines.push(format!("  {} ({})", p.name, p.id)),
        }
    }
    lines
}

pub fn format_project_view(view: &ProjectView<'_>) -> Vec<String> {
    let mut lines = vec![format!("== {} ({}) ==", view.project.name, view.project.id)];
    lines.extend(view.unsectioned.iter().map(format_item_line));
    for block in &view.sections {
        lines.push(String::new());
        lines.push(format!("-- {} ({}) --", block.section.name, block.section.id));
        lines.extend(block.items.iter().map(format_item_line));
    }
    lines
}

pub fn format_outcome(outcome: &Outcome) -> Vec<String> {
    if outcome.is_noop() && outcome.skipped.is_empty() {
        return vec!["no change".to_string()];
    }
    let mut lines = Vec::new();
    lines.extend(outcome.patched.iter().map(|r| format!("updated {}", r)));
    lines.extend(outcome.deleted.iter().map(|r| format!("deleted {}", r)));
    lines.extend(outcome.skipped.iter().map(|r| format!("skipped {}", r)));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordRef;
    use chrono::TimeZone;

    #[test]
    fn task_line_shows_priority_and_checkbox() {
        let mut task = Task::new("t-1".into(), "u".into(), "Buy milk".into());
        task.priority = Some(Priority::High);
        insta::assert_snapshot!(format_task_line(&task), @"[ ] t-1 Buy milk !high");
        task.status = TaskStatus::Completed;
        assert!(format_task_line(&task).starts_with("[x]"));
    }

    #[test]
    fn due_at_local_midnight_drops_time() {
        let midnight = Local.with_ymd_and_hms(2026, 5, 4, 0, 0, 0).unwrap();
        assert_eq!(format_due(midnight.with_timezone(&Utc)), "2026-05-04");
        let morning = Local.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap();
        assert_eq!(format_due(morning.with_timezone(&Utc)), "2026-05-04 09:30");
    }

    #[test]
    fn item_json_is_tagged() {
        let ws = Workspace::default();
        let note = Note::new("n-1".into(), "u".into(), "Idea".into());
        let json = serde_json::to_value(item_to_json(&ws, &ListItem::Note(&note))).unwrap();
        assert_eq!(json["kind"], "note");
        assert_eq!(json["id"], "n-1");
    }

    #[test]
    fn outcome_lines() {
        assert_eq!(format_outcome(&Outcome::default()), vec!["no change"]);
        let outcome = Outcome {
            patched: vec![RecordRef::task("t-1")],
            skipped: vec![RecordRef::task("t-2")],
            deleted: vec![],
        };
        insta::assert_snapshot!(format_outcome(&outcome).join("\n"), @r"
        updated task t-1
        skipped task t-2
        ");
    }
}
