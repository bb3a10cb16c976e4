use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::dnd::{Destination, DragItem, DropTarget, ItemKind};
use crate::model::{EditTarget, Selection, SmartList};
use crate::ops::records::{self, InsertAt};
use crate::store::RecordRef;
use crate::tui::app::{App, InputKind, ListRow, Mode, Pane, SidebarRow, Status};

/// The record under the cursor as something that can be renamed
fn rename_target(app: &App) -> Option<(EditTarget, String)> {
    let ws = &app.deck.workspace;
    match app.focus {
        Pane::Sidebar => match app.sidebar_rows().into_iter().nth(app.sidebar_cursor)? {
            SidebarRow::Folder { id, name, .. } => Some((EditTarget::Folder(id), name)),
            SidebarRow::Project { id, name, .. } => Some((EditTarget::Project(id), name)),
            _ => None,
        },
        Pane::List => match app.list_rows().into_iter().nth(app.list_cursor)? {
            ListRow::Item(DragItem { kind: ItemKind::Task, id }) => {
                let title = ws.task(&id)?.title.clone();
                Some((EditTarget::Task(id), title))
            }
            ListRow::Item(DragItem { kind: ItemKind::Note, id }) => {
                let title = ws.note(&id)?.title.clone();
                Some((EditTarget::Note(id), title))
            }
            ListRow::Header {
                target: DropTarget::Section { section_id, .. },
                ..
            } => {
                let name = ws.section(&section_id)?.name.clone();
                Some((EditTarget::Section(section_id), name))
            }
            _ => None,
        },
    }
}

fn record_of(target: &EditTarget) -> RecordRef {
    match target {
        EditTarget::Task(id) => RecordRef::task(id.as_str()),
        EditTarget::Note(id) => RecordRef::note(id.as_str()),
        EditTarget::Project(id) => RecordRef::project(id.as_str()),
        EditTarget::Folder(id) => RecordRef::folder(id.as_str()),
        EditTarget::Section(id) => RecordRef::section(id.as_str()),
    }
}

pub(super) fn begin_rename(app: &mut App) {
    let Some((target, name)) = rename_target(app) else {
        return;
    };
    app.nav.begin_edit(target);
    app.edit_buffer = name;
    app.mode = Mode::Input(InputKind::Rename);
}

pub(super) fn begin_new_task(app: &mut App) {
    if new_task_destination(app).is_none() {
        app.status = Some(Status::Info("pick Inbox, Today or a project to add tasks".into()));
        return;
    }
    app.focus = Pane::List;
    app.edit_buffer.clear();
    app.mode = Mode::Input(InputKind::NewTask);
}

/// Where `a` puts a new task: the Inbox, or the section of the nearest
/// header at or above the cursor in a project.
fn new_task_destination(app: &App) -> Option<Destination> {
    match &app.nav.selection {
        Selection::Smart(SmartList::Inbox | SmartList::Today) => Some(Destination::Inbox),
        Selection::Smart(SmartList::NextSevenDays) => None,
        Selection::Project(project_id) => {
            let rows = app.list_rows();
            let end = (app.list_cursor + 1).min(rows.len());
            let section_id = rows[..end].iter().rev().find_map(|row| match row {
                ListRow::Header {
                    target: DropTarget::Section { section_id, .. },
                    ..
                } => Some(Some(section_id.clone())),
                ListRow::Header { .. } => Some(None),
                ListRow::Item(_) => None,
            });
            Some(Destination::Project {
                project_id: project_id.clone(),
                section_id: section_id.flatten(),
            })
        }
    }
}

pub(super) fn handle_input(app: &mut App, kind: InputKind, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => finish(app),
        (_, KeyCode::Enter) => {
            match kind {
                InputKind::Rename => commit_rename(app),
                InputKind::NewTask => commit_new_task(app),
            }
            finish(app);
        }
        (_, KeyCode::Backspace) => {
            app.edit_buffer.pop();
        }
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => app.edit_buffer.clear(),
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => app.edit_buffer.push(c),
        _ => {}
    }
}

fn finish(app: &mut App) {
    app.nav.end_edit();
    app.edit_buffer.clear();
    app.mode = Mode::Navigate;
}

fn commit_rename(app: &mut App) {
    let Some(target) = app.nav.editing.clone() else {
        return;
    };
    let record = record_of(&target);
    let name = app.edit_buffer.clone();
    if app
        .commit("rename", |ws, owner| {
            Ok(records::rename(ws, owner, &record, &name)?)
        })
        .is_some()
    {
        app.status = Some(Status::Info(format!("renamed {}", record)));
    }
}

fn commit_new_task(app: &mut App) {
    let Some(to) = new_task_destination(app) else {
        return;
    };
    let due = match app.nav.selection {
        Selection::Smart(SmartList::Today) => Some(app.today_start),
        _ => None,
    };
    let title = app.edit_buffer.clone();
    let created = app.commit("add task", |ws, owner| {
        let id = records::create_task(ws, owner, &title, &to, InsertAt::Bottom)?;
        if due.is_some() {
            records::set_due_date(ws, owner, &id, due)?;
        }
        Ok(id)
    });
    if let Some(id) = created {
        app.follow(&DragItem::task(id.clone()));
        app.status = Some(Status::Info(format!("added {}", id)));
    }
}

#[cfg(test)]
mod tests {
    use super::super::handle_key;
    use super::super::test_keys::{ch, key};
    use super::*;
    use crate::tui::render::test_helpers::{app_with, sample_workspace};

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, ch(c));
        }
    }

    #[test]
    fn rename_task_under_cursor() {
        let (_tmp, mut app) = app_with(sample_workspace());
        handle_key(&mut app, ch('r'));
        assert_eq!(app.mode, Mode::Input(InputKind::Rename));
        assert_eq!(app.edit_buffer, "Buy milk");
        for _ in 0..4 {
            handle_key(&mut app, key(KeyCode::Backspace));
        }
        type_text(&mut app, "oat milk");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(
            app.deck.workspace.task("t-milk").map(|t| t.title.as_str()),
            Some("Buy oat milk")
        );
        assert!(app.nav.editing.is_none());
    }

    #[test]
    fn empty_rename_is_rejected() {
        let (_tmp, mut app) = app_with(sample_workspace());
        handle_key(&mut app, ch('r'));
        app.edit_buffer.clear();
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(
            app.deck.workspace.task("t-milk").map(|t| t.title.as_str()),
            Some("Buy milk")
        );
        assert!(matches!(app.status, Some(Status::Error(_))));
    }

    #[test]
    fn new_task_lands_in_section_above_cursor() {
        let (_tmp, mut app) = app_with(sample_workspace());
        app.nav.select(Selection::Project("p-home".into()));
        // Rows: (no section), Paint fence, Garden, Pull weeds
        app.list_cursor = 3;
        handle_key(&mut app, ch('a'));
        type_text(&mut app, "Mulch beds");
        handle_key(&mut app, key(KeyCode::Enter));
        let task = app
            .deck
            .workspace
            .tasks
            .iter()
            .find(|t| t.title == "Mulch beds")
            .cloned()
            .unwrap();
        assert_eq!(task.project_id.as_deref(), Some("p-home"));
        assert_eq!(task.section_id.as_deref(), Some("s-garden"));
        assert_eq!(app.list_cursor, 4);
    }

    #[test]
    fn new_task_in_today_is_due_today() {
        let (_tmp, mut app) = app_with(sample_workspace());
        app.nav.select(Selection::Smart(SmartList::Today));
        handle_key(&mut app, ch('a'));
        type_text(&mut app, "Pay rent");
        handle_key(&mut app, key(KeyCode::Enter));
        let task = app
            .deck
            .workspace
            .tasks
            .iter()
            .find(|t| t.title == "Pay rent")
            .cloned()
            .unwrap();
        assert_eq!(task.project_id, None);
        assert_eq!(task.due_date, Some(app.today_start));
    }

    #[test]
    fn escape_discards_input() {
        let (_tmp, mut app) = app_with(sample_workspace());
        let before = app.deck.workspace.clone();
        handle_key(&mut app, ch('a'));
        type_text(&mut app, "never mind");
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.deck.workspace, before);
        assert!(app.edit_buffer.is_empty());
    }
}
