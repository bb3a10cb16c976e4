use ratatui::style::Color;

use crate::model::Priority;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub selection_bg: Color,
    /// Row under a drag in progress
    pub drop_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            cyan: Color::Rgb(0x44, 0xDD, 0xFF),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            drop_bg: Color::Rgb(0x14, 0x3D, 0x38),
        }
    }
}

impl Theme {
    pub fn priority_color(&self, priority: Option<Priority>) -> Color {
        match priority {
            None | Some(Priority::Low) => self.text,
            Some(Priority::Medium) => self.cyan,
            Some(Priority::High) => self.yellow,
            Some(Priority::Urgent) => self.red,
        }
    }
}
