use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::dnd::Droppable;
use crate::model::Selection;
use crate::tui::app::{App, Hit, Pane, SidebarRow};

use super::helpers::{row_rect, truncate};

fn row_label(row: &SidebarRow) -> String {
    match row {
        SidebarRow::Smart(list) => format!(" {}", list.label()),
        SidebarRow::Folder { name, expanded, .. } => {
            format!(" {} {}", if *expanded { '▾' } else { '▸' }, name)
        }
        SidebarRow::Project {
            name, in_folder, ..
        } => {
            if *in_folder {
                format!("     # {}", name)
            } else {
                format!("   # {}", name)
            }
        }
        SidebarRow::NoFolder => " ⇱ no folder".to_string(),
    }
}

fn is_selected(row: &SidebarRow, selection: &Selection) -> bool {
    match (row, selection) {
        (SidebarRow::Smart(a), Selection::Smart(b)) => a == b,
        (SidebarRow::Project { id, .. }, Selection::Project(sel)) => id == sel,
        _ => false,
    }
}

/// Render the sidebar: smart lists, then folders and projects in one order.
pub fn render_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(app.theme.dim).bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = app.sidebar_rows();
    let over = app.drag.over().map(|c| c.target.clone());
    let active = app.drag.active().cloned();
    let width = inner.width as usize;

    let mut lines = Vec::new();
    for (i, row) in rows.iter().enumerate().take(inner.height as usize) {
        let rect = row_rect(inner, inner.y + i as u16);
        app.hits.push(Hit {
            rect,
            pane: Pane::Sidebar,
            row: i,
        });
        let target = row.drop_target();
        if let Some(target) = &target {
            app.droppables.push(Droppable::new(target.clone(), rect));
        }

        let mut style = Style::default().fg(app.theme.text).bg(bg);
        if matches!(row, SidebarRow::Smart(_) | SidebarRow::Folder { .. }) {
            style = style.fg(app.theme.text_bright);
        }
        if is_selected(row, &app.nav.selection) {
            style = style.fg(app.theme.highlight).add_modifier(Modifier::BOLD);
        }
        if app.focus == Pane::Sidebar && i == app.sidebar_cursor {
            style = style.bg(app.theme.selection_bg);
        }
        if target.is_some() && target == over {
            style = style.bg(app.theme.drop_bg);
        }
        if active.is_some() && row.drag_item() == active {
            style = style.fg(app.theme.dim);
        }

        let text = truncate(&row_label(row), width);
        let pad = width.saturating_sub(unicode_width::UnicodeWidthStr::width(text.as_str()));
        lines.push(Line::from(vec![
            Span::styled(text, style),
            Span::styled(" ".repeat(pad), style),
        ]));
    }

    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(bg)),
        inner,
    );
}
