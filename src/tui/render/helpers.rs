use chrono::{DateTime, Duration, Local, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::dnd::Rect;

/// Cut `text` to at most `max` terminal columns, ending in `…` if cut.
pub fn truncate(text: &str, max: usize) -> String {
    if UnicodeWidthStr::width(text) <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max - 1 {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

/// Short due label relative to the start of today
pub fn due_label(due: DateTime<Utc>, today_start: DateTime<Utc>) -> String {
    if due < today_start {
        "overdue".to_string()
    } else if due < today_start + Duration::days(1) {
        "today".to_string()
    } else if due < today_start + Duration::days(2) {
        "tomorrow".to_string()
    } else {
        due.with_timezone(&Local).format("%b %-d").to_string()
    }
}

/// One terminal row as a hit/drop rectangle
pub fn row_rect(area: ratatui::layout::Rect, y: u16) -> Rect {
    Rect::new(f64::from(area.x), f64::from(y), f64::from(area.width), 1.0)
}
