// Boat type filter bar
//
// The drop-down rendered as a row of options; ←/→ moves the selection.

use crate::components::TypeFilterSource;
use crate::tui::style;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, filter: &TypeFilterSource) {
    let line = if let Some(err) = filter.error() {
        Line::from(Span::styled(
            format!(" Boat types unavailable: {err}"),
            Style::default().fg(style::ERROR),
        ))
    } else if !filter.is_loaded() {
        Line::from(Span::styled(
            " Loading boat types…",
            Style::default().fg(style::MUTED),
        ))
    } else {
        let selected = filter.selected_boat_type_id();
        let mut spans = vec![Span::raw(" ")];
        for option in filter.options() {
            let option_style = if option.value == selected {
                Style::default()
                    .fg(style::SELECTED)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default()
            };
            spans.push(Span::styled(format!(" {} ", option.label), option_style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style::border())
        .title(" Boat Type ◂ ▸ ");

    f.render_widget(Paragraph::new(line).block(block), area);
}
