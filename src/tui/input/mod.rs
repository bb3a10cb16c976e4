mod edit;
mod mouse;
mod move_mode;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent};

use super::app::{App, Mode};

// Submodules reach each other's handlers through `use super::*;`
#[allow(unused_imports)]
use edit::*;
#[allow(unused_imports)]
use move_mode::*;
#[allow(unused_imports)]
use navigate::*;

pub use mouse::handle_mouse;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Move => handle_move(app, key),
        Mode::Input(kind) => handle_input(app, kind, key),
    }
    clamp_cursors(app);
}

/// Keep both cursors on an existing row after the rows changed underneath them.
pub(super) fn clamp_cursors(app: &mut App) {
    let sidebar = app.sidebar_rows().len();
    app.sidebar_cursor = app.sidebar_cursor.min(sidebar.saturating_sub(1));
    let list = app.list_rows().len();
    app.list_cursor = app.list_cursor.min(list.saturating_sub(1));
}
