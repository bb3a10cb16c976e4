use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::dnd::Point;
use crate::tui::app::{App, Hit, ListRow, Mode, Pane, Press, SidebarRow, Status};

/// Cell under the pointer, as a point at the cell's center
fn cell_center(column: u16, row: u16) -> Point {
    Point::new(f64::from(column) + 0.5, f64::from(row) + 0.5)
}

fn hit_at(app: &App, point: Point) -> Option<Hit> {
    app.hits.iter().copied().find(|h| h.rect.contains(point))
}

/// Handle a mouse event. Press, drag, release is a drag and drop; press and
/// release without movement is a click.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.mode != Mode::Navigate {
        return;
    }
    let point = cell_center(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.status = None;
            let Some(hit) = hit_at(app, point) else {
                app.press = None;
                return;
            };
            app.focus = hit.pane;
            let item = match hit.pane {
                Pane::Sidebar => {
                    app.sidebar_cursor = hit.row;
                    app.sidebar_rows()
                        .get(hit.row)
                        .and_then(SidebarRow::drag_item)
                }
                Pane::List => {
                    app.list_cursor = hit.row;
                    match app.list_rows().into_iter().nth(hit.row) {
                        Some(ListRow::Item(item)) => Some(item),
                        _ => None,
                    }
                }
            };
            app.press = Some(Press {
                hit,
                item,
                origin: point,
            });
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if !app.drag.is_dragging() {
                let Some(press) = &app.press else {
                    return;
                };
                let Some(item) = press.item.clone() else {
                    return;
                };
                app.drag.start(item, press.origin, press.hit.rect);
            }
            app.drag.drag_move(point, &app.droppables);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let press = app.press.take();
            if app.drag.is_dragging() {
                let ctx = app.drag_context();
                let item = app.drag.active().cloned();
                match app.drag.end(&ctx) {
                    Some(dropped) => app.apply_drop(dropped),
                    None => app.status = Some(Status::Info("no change".to_string())),
                }
                if let Some(item) = item {
                    app.follow(&item);
                }
            } else if let Some(press) = press
                && press.hit.pane == Pane::Sidebar
                && hit_at(app, point) == Some(press.hit)
            {
                app.activate_sidebar_row(press.hit.row);
            }
        }
        MouseEventKind::ScrollDown => scroll(app, point, 1),
        MouseEventKind::ScrollUp => scroll(app, point, -1),
        _ => {}
    }
}

fn scroll(app: &mut App, point: Point, delta: isize) {
    let Some(hit) = hit_at(app, point) else {
        return;
    };
    match hit.pane {
        Pane::Sidebar => {
            let last = app.sidebar_rows().len().saturating_sub(1);
            app.sidebar_cursor = app.sidebar_cursor.saturating_add_signed(delta).min(last);
        }
        Pane::List => {
            let last = app.list_rows().len().saturating_sub(1);
            app.list_cursor = app.list_cursor.saturating_add_signed(delta).min(last);
        }
    }
}
