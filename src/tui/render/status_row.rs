use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::app::{App, InputKind, Mode, Status};

use super::helpers::truncate;

const NAVIGATE_HINT: &str = "Tab pane  a add  r rename  x done  m move  . completed  q quit";
const MOVE_HINT: &str = "j/k choose  Enter drop  Esc cancel";

/// Left text plus a right-aligned hint, hint dropped if it doesn't fit
fn with_hint<'a>(mut spans: Vec<Span<'a>>, hint: &'a str, style: Style, width: usize) -> Line<'a> {
    let used: usize = spans.iter().map(|s| s.content.width()).sum();
    if used + hint.width() < width {
        spans.push(Span::styled(" ".repeat(width - used - hint.width()), style));
        spans.push(Span::styled(hint, style));
    }
    Line::from(spans)
}

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let line = match app.mode {
        Mode::Input(kind) => {
            let prompt = match kind {
                InputKind::Rename => " rename: ",
                InputKind::NewTask => " new task: ",
            };
            let spans = vec![
                Span::styled(prompt, Style::default().fg(app.theme.highlight).bg(bg)),
                Span::styled(
                    app.edit_buffer.clone(),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
            ];
            with_hint(spans, "Enter save  Esc cancel", dim, width)
        }
        Mode::Move => {
            let spans = vec![Span::styled(
                " MOVE",
                Style::default().fg(app.theme.highlight).bg(bg),
            )];
            with_hint(spans, MOVE_HINT, dim, width)
        }
        Mode::Navigate => match &app.status {
            Some(Status::Error(msg)) => Line::from(Span::styled(
                truncate(&format!(" {}", msg), width),
                Style::default().fg(app.theme.red).bg(bg),
            )),
            Some(Status::Info(msg)) => Line::from(Span::styled(
                truncate(&format!(" {}", msg), width),
                dim,
            )),
            None => with_hint(Vec::new(), NAVIGATE_HINT, dim, width),
        },
    };

    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::{app_with, render_to_string, sample_workspace};

    #[test]
    fn move_mode_shows_hint() {
        let (_tmp, mut app) = app_with(sample_workspace());
        app.mode = Mode::Move;
        let out = render_to_string(60, 1, |frame, area| render_status_row(frame, &app, area));
        assert!(out.starts_with(" MOVE"));
        assert!(out.ends_with(MOVE_HINT));
    }

    #[test]
    fn input_mode_shows_buffer() {
        let (_tmp, mut app) = app_with(sample_workspace());
        app.mode = Mode::Input(InputKind::NewTask);
        app.edit_buffer = "Water plants".into();
        let out = render_to_string(60, 1, |frame, area| render_status_row(frame, &app, area));
        assert!(out.starts_with(" new task: Water plants▌"));
    }

    #[test]
    fn error_replaces_hints() {
        let (_tmp, mut app) = app_with(sample_workspace());
        app.status = Some(Status::Error("move failed: locked".into()));
        let out = render_to_string(60, 1, |frame, area| render_status_row(frame, &app, area));
        assert_eq!(out, " move failed: locked");
    }
}
