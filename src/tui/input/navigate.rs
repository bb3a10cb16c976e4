use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::dnd::ItemKind;
use crate::model::TaskStatus;
use crate::ops::records;
use crate::tui::app::{App, Pane, SidebarRow, Status};

use super::*;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Any key dismisses the last message
    app.status = None;

    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
            app.should_quit = true;
        }
        (_, KeyCode::Tab) | (_, KeyCode::BackTab) => {
            app.focus = match app.focus {
                Pane::Sidebar => Pane::List,
                Pane::List => Pane::Sidebar,
            };
        }
        (_, KeyCode::Char('j')) | (_, KeyCode::Down) => move_cursor(app, 1),
        (_, KeyCode::Char('k')) | (_, KeyCode::Up) => move_cursor(app, -1),
        (_, KeyCode::Char('g')) | (_, KeyCode::Home) => set_cursor(app, 0),
        (_, KeyCode::Char('G')) | (_, KeyCode::End) => set_cursor(app, usize::MAX),
        (_, KeyCode::Enter) => {
            if app.focus == Pane::Sidebar {
                app.activate_sidebar_row(app.sidebar_cursor);
                if matches!(
                    app.sidebar_rows().get(app.sidebar_cursor),
                    Some(SidebarRow::Smart(_) | SidebarRow::Project { .. })
                ) {
                    app.focus = Pane::List;
                }
            }
        }
        (_, KeyCode::Char(' ')) => {
            if app.focus == Pane::Sidebar
                && let Some(SidebarRow::Folder { id, .. }) =
                    app.sidebar_rows().get(app.sidebar_cursor)
            {
                app.nav.toggle_folder(id);
            }
        }
        (_, KeyCode::Char('x')) => toggle_done(app),
        (_, KeyCode::Char('r')) => begin_rename(app),
        (_, KeyCode::Char('a')) => begin_new_task(app),
        (_, KeyCode::Char('m')) => enter_move_mode(app),
        (_, KeyCode::Char('.')) => {
            app.show_completed = !app.show_completed;
            app.status = Some(Status::Info(if app.show_completed {
                "showing completed".to_string()
            } else {
                "hiding completed".to_string()
            }));
        }
        _ => {}
    }
}

fn row_count(app: &App) -> usize {
    match app.focus {
        Pane::Sidebar => app.sidebar_rows().len(),
        Pane::List => app.list_rows().len(),
    }
}

fn set_cursor(app: &mut App, index: usize) {
    let last = row_count(app).saturating_sub(1);
    let index = index.min(last);
    match app.focus {
        Pane::Sidebar => app.sidebar_cursor = index,
        Pane::List => app.list_cursor = index,
    }
}

fn move_cursor(app: &mut App, delta: isize) {
    let current = match app.focus {
        Pane::Sidebar => app.sidebar_cursor,
        Pane::List => app.list_cursor,
    };
    set_cursor(app, current.saturating_add_signed(delta));
}

/// Flip the task under the list cursor between pending and completed.
fn toggle_done(app: &mut App) {
    let Some(item) = app.cursor_item() else {
        return;
    };
    if item.kind != ItemKind::Task {
        return;
    }
    let Some(task) = app.deck.workspace.task(&item.id) else {
        return;
    };
    let status = match task.status {
        TaskStatus::Pending => TaskStatus::Completed,
        TaskStatus::Completed => TaskStatus::Pending,
    };
    let id = item.id.clone();
    if app
        .commit("update", |ws, owner| {
            Ok(records::set_status(ws, owner, &id, status)?)
        })
        .is_some()
    {
        app.status = Some(Status::Info(format!("{} {}", status.as_str(), id)));
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_keys::{ch, ctrl, key};
    use super::*;
    use crate::model::{Selection, SmartList};
    use crate::tui::render::test_helpers::{app_with, sample_workspace};

    #[test]
    fn q_and_ctrl_c_quit() {
        let (_tmp, mut app) = app_with(sample_workspace());
        handle_key(&mut app, ch('q'));
        assert!(app.should_quit);

        let (_tmp, mut app) = app_with(sample_workspace());
        handle_key(&mut app, ctrl('c'));
        assert!(app.should_quit);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let (_tmp, mut app) = app_with(sample_workspace());
        handle_key(&mut app, ch('k'));
        assert_eq!(app.list_cursor, 0);
        for _ in 0..10 {
            handle_key(&mut app, ch('j'));
        }
        // Buy milk, Gift ideas, Call plumber
        assert_eq!(app.list_cursor, 2);
    }

    #[test]
    fn enter_in_sidebar_selects_project() {
        let (_tmp, mut app) = app_with(sample_workspace());
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, Pane::Sidebar);
        handle_key(&mut app, ch('G'));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.nav.selection, Selection::Project("p-home".into()));
        assert_eq!(app.focus, Pane::List);
    }

    #[test]
    fn x_completes_and_hides_task() {
        let (_tmp, mut app) = app_with(sample_workspace());
        handle_key(&mut app, ch('x'));
        assert_eq!(
            app.deck.workspace.task("t-milk").map(|t| t.status),
            Some(TaskStatus::Completed)
        );
        // Hidden from the inbox until completed tasks are shown
        assert_eq!(app.list_rows().len(), 2);
        handle_key(&mut app, ch('.'));
        assert_eq!(app.list_rows().len(), 3);
        assert_eq!(app.nav.selection, Selection::Smart(SmartList::Inbox));
    }

    #[test]
    fn x_on_note_does_nothing() {
        let (_tmp, mut app) = app_with(sample_workspace());
        let before = app.deck.workspace.clone();
        handle_key(&mut app, ch('j'));
        handle_key(&mut app, ch('x'));
        assert_eq!(app.deck.workspace, before);
    }
}
