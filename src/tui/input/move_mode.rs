use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode, Status};

/// Enter MOVE mode for the record under the cursor.
pub(super) fn enter_move_mode(app: &mut App) {
    let Some(item) = app.cursor_item() else {
        return;
    };
    let ctx = app.drag_context();
    if ctx.list_of(&item).is_none() {
        app.status = Some(Status::Info(format!("{} has no list to move in", item)));
        return;
    }
    app.drag.start_keyboard(item, &ctx);
    app.mode = Mode::Move;
}

pub(super) fn handle_move(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => nudge(app, 1),
        KeyCode::Char('k') | KeyCode::Up => nudge(app, -1),
        KeyCode::Enter | KeyCode::Char('m') => finish_move(app),
        KeyCode::Esc => {
            app.drag.cancel();
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

fn nudge(app: &mut App, delta: isize) {
    let ctx = app.drag_context();
    app.drag.nudge(delta, &ctx);
}

fn finish_move(app: &mut App) {
    let ctx = app.drag_context();
    let item = app.drag.active().cloned();
    app.mode = Mode::Navigate;
    match app.drag.end(&ctx) {
        Some(dropped) => app.apply_drop(dropped),
        None => app.status = Some(Status::Info("no change".to_string())),
    }
    if let Some(item) = item {
        app.follow(&item);
    }
}

#[cfg(test)]
mod tests {
    use super::super::handle_key;
    use super::super::test_keys::{ch, key};
    use super::*;
    use crate::dnd::{DragItem, DropTarget};
    use crate::tui::app::{ListRow, Pane};
    use crate::tui::render::test_helpers::{app_with, sample_workspace};

    fn inbox_ids(app: &App) -> Vec<String> {
        app.list_rows()
            .into_iter()
            .filter_map(|r| match r {
                ListRow::Item(item) => Some(item.id),
                ListRow::Header { .. } => None,
            })
            .collect()
    }

    #[test]
    fn keyboard_move_reorders_inbox() {
        let (_tmp, mut app) = app_with(sample_workspace());
        handle_key(&mut app, ch('m'));
        assert_eq!(app.mode, Mode::Move);
        handle_key(&mut app, ch('j'));
        handle_key(&mut app, ch('j'));
        assert_eq!(
            app.drag.over().map(|c| c.target.clone()),
            Some(DropTarget::Item(DragItem::task("t-call")))
        );
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(inbox_ids(&app), vec!["n-idea", "t-call", "t-milk"]);
        // The cursor follows the moved task
        assert_eq!(app.list_cursor, 2);
    }

    #[test]
    fn escape_cancels_without_writing() {
        let (_tmp, mut app) = app_with(sample_workspace());
        let before = app.deck.workspace.clone();
        handle_key(&mut app, ch('m'));
        handle_key(&mut app, ch('j'));
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(!app.drag.is_dragging());
        assert_eq!(app.deck.workspace, before);
    }

    #[test]
    fn dropping_in_place_is_no_change() {
        let (_tmp, mut app) = app_with(sample_workspace());
        let before = app.deck.workspace.clone();
        handle_key(&mut app, ch('m'));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.deck.workspace, before);
        assert_eq!(app.status, Some(Status::Info("no change".into())));
    }

    #[test]
    fn sidebar_projects_move_too() {
        let (_tmp, mut app) = app_with(sample_workspace());
        app.focus = Pane::Sidebar;
        // Home sits below the Work folder
        app.sidebar_cursor = 4;
        handle_key(&mut app, ch('m'));
        handle_key(&mut app, ch('k'));
        handle_key(&mut app, key(KeyCode::Enter));
        let home = app.deck.workspace.project("p-home").map(|p| p.sort_order);
        let work = app.deck.workspace.folder("f-work").map(|f| f.sort_order);
        assert!(home < work);
        assert_eq!(app.sidebar_cursor, 3);
    }
}
