//! System logs panel
//!
//! Shows the tail of the in-memory log buffer, color-coded by level.

use crate::logging::{LogBuffer, LogEntry, LogLevel};
use crate::tui::style;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

fn level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Error => Style::default().fg(style::ERROR),
        LogLevel::Warn => Style::default().fg(style::WARN),
        LogLevel::Info => Style::default(),
        LogLevel::Debug | LogLevel::Trace => Style::default().fg(style::MUTED),
    }
}

/// Last path segment of the event target (`fleet_browser::app` → `app`)
fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

fn format_entry(entry: &LogEntry) -> String {
    format!(
        "{} {:5} {:>8} {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        short_target(&entry.target),
        entry.message
    )
}

pub fn render(f: &mut Frame, area: Rect, buffer: &LogBuffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style::border())
        .title(" System Logs ");

    if buffer.is_empty() {
        let waiting =
            ListItem::new(" Waiting for log events…").style(Style::default().fg(style::MUTED));
        f.render_widget(List::new(vec![waiting]).block(block), area);
        return;
    }

    let visible = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = buffer
        .recent(visible)
        .iter()
        .map(|entry| ListItem::new(format_entry(entry)).style(level_style(entry.level)))
        .collect();

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_shortened_to_its_module() {
        assert_eq!(short_target("fleet_browser::components::results"), "results");
        assert_eq!(short_target("fleet_browser"), "fleet_browser");
    }
}
