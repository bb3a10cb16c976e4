use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::dnd::{DragItem, DropTarget, Droppable, ItemKind};
use crate::model::Workspace;
use crate::tui::app::{App, Hit, ListRow, Pane};
use crate::tui::theme::Theme;

use super::helpers::{due_label, row_rect, truncate};

/// Spans for one task or note row, fitted to `width` columns
fn item_spans(
    ws: &Workspace,
    item: &DragItem,
    today_start: DateTime<Utc>,
    theme: &Theme,
    base: Style,
    width: usize,
) -> Vec<Span<'static>> {
    let (prefix, title, suffix, fg) = match item.kind {
        ItemKind::Task => match ws.task(&item.id) {
            Some(task) => {
                let fg = if task.is_pending() {
                    theme.priority_color(task.priority)
                } else {
                    theme.dim
                };
                let suffix = task
                    .due_date
                    .map(|d| format!("  {}", due_label(d, today_start)))
                    .unwrap_or_default();
                (
                    format!(" [{}] ", task.status.checkbox_char()),
                    task.title.clone(),
                    suffix,
                    fg,
                )
            }
            None => (" [?] ".to_string(), item.id.clone(), String::new(), theme.red),
        },
        _ => match ws.note(&item.id) {
            Some(note) => (" ~ ".to_string(), note.title.clone(), String::new(), theme.cyan),
            None => (" ~ ".to_string(), item.id.clone(), String::new(), theme.red),
        },
    };

    let room = width.saturating_sub(prefix.width() + suffix.width());
    let title = truncate(&title, room);
    let pad = room.saturating_sub(title.width());
    vec![
        Span::styled(prefix, base.fg(theme.dim)),
        Span::styled(title, base.fg(fg)),
        Span::styled(" ".repeat(pad), base),
        Span::styled(suffix, base.fg(theme.yellow)),
    ]
}

/// Render the list pane: a title row, then the selected view's rows.
pub fn render_list_view(frame: &mut Frame, app: &mut App, area: Rect) {
    if area.height == 0 {
        return;
    }
    let bg = app.theme.background;
    let width = area.width as usize;
    let rows = app.list_rows();
    let over: Option<DropTarget> = app.drag.over().map(|c| c.target.clone());
    let active = app.drag.active().cloned();

    let mut lines = vec![Line::from(Span::styled(
        truncate(&format!(" {}", app.list_title()), width),
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    ))];

    let visible = area.height.saturating_sub(1) as usize;
    if rows.is_empty() {
        lines.push(Line::from(Span::styled(
            "   (empty)",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }
    // Keep the cursor on screen
    let first = if app.list_cursor >= visible {
        app.list_cursor + 1 - visible
    } else {
        0
    };

    for (i, row) in rows.iter().enumerate().skip(first).take(visible) {
        let y = area.y + 1 + (i - first) as u16;
        let rect = row_rect(area, y);
        app.hits.push(Hit {
            rect,
            pane: Pane::List,
            row: i,
        });

        let target = match row {
            ListRow::Header { target, .. } => target.clone(),
            ListRow::Item(item) => DropTarget::Item(item.clone()),
        };
        let mut base = Style::default().bg(bg);
        if app.focus == Pane::List && i == app.list_cursor {
            base = base.bg(app.theme.selection_bg);
        }
        if over.as_ref() == Some(&target) {
            base = base.bg(app.theme.drop_bg);
        }

        let line = match row {
            ListRow::Header { label, .. } => {
                let text = truncate(&format!(" ── {} ", label), width);
                let pad = width.saturating_sub(text.width());
                Line::from(vec![
                    Span::styled(text, base.fg(app.theme.dim)),
                    Span::styled(" ".repeat(pad), base),
                ])
            }
            ListRow::Item(item) => {
                let mut spans = item_spans(
                    &app.deck.workspace,
                    item,
                    app.today_start,
                    &app.theme,
                    base,
                    width,
                );
                if active.as_ref() == Some(item) {
                    for span in &mut spans {
                        span.style = span.style.fg(app.theme.dim);
                    }
                }
                Line::from(spans)
            }
        };
        app.droppables.push(Droppable::new(target, rect));
        lines.push(line);
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}
