// Fixed palette for the terminal front-end

use ratatui::style::{Color, Modifier, Style};

pub const TITLE: Color = Color::Cyan;
pub const BORDER: Color = Color::DarkGray;
pub const FOCUS: Color = Color::LightCyan;
pub const SELECTED: Color = Color::Yellow;
pub const DRAFT: Color = Color::LightMagenta;
pub const SUCCESS: Color = Color::Green;
pub const ERROR: Color = Color::Red;
pub const WARN: Color = Color::Yellow;
pub const MUTED: Color = Color::Gray;

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

pub fn title() -> Style {
    Style::default().fg(TITLE).add_modifier(Modifier::BOLD)
}

/// The row under the table cursor
pub fn cursor() -> Style {
    Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
}
