pub mod helpers;
pub mod list_view;
pub mod sidebar;
pub mod status_row;
#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::App;

/// Draw both panes and the status row.
///
/// Also rebuilds the hit and drop regions the input handlers read, so they
/// always match what is on screen.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    app.hits.clear();
    app.droppables.clear();

    // Layout: [sidebar | list] over a one-row status line
    let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
    let sidebar_width = app.deck.config.ui.sidebar_width.min(area.width / 2);
    let cols = Layout::horizontal([Constraint::Length(sidebar_width), Constraint::Min(1)])
        .split(rows[0]);

    sidebar::render_sidebar(frame, app, cols[0]);
    list_view::render_list_view(frame, app, cols[1]);
    status_row::render_status_row(frame, app, rows[1]);
}
