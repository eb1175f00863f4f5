// Boats near me panel
//
// Lists the map markers: the user first, then the nearby boats.

use crate::components::{GeoMapOverlay, OverlayState};
use crate::tui::style;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, overlay: &GeoMapOverlay, spinner: char) {
    let title = if overlay.is_loading() {
        format!(" Boats Near Me {spinner} ")
    } else {
        " Boats Near Me ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style::border())
        .title(title);

    let status = match (overlay.state(), overlay.error(), overlay.location_error()) {
        (OverlayState::Unrendered | OverlayState::AwaitingLocation, _, Some(err)) => {
            Some((format!(" {err}"), style::MUTED))
        }
        (OverlayState::Unrendered | OverlayState::AwaitingLocation, _, None) => {
            Some((" Locating…".to_string(), style::MUTED))
        }
        (OverlayState::QueryPending { .. }, Some(err), _) => {
            Some((format!(" {err}"), style::ERROR))
        }
        (OverlayState::QueryPending { .. }, None, _) => {
            Some((" Searching nearby…".to_string(), style::MUTED))
        }
        (OverlayState::MarkersReady { .. }, _, _) => None,
    };

    // Without markers the status fills the panel; otherwise the markers from
    // the last good query stay listed under it
    if overlay.markers().is_empty() {
        let (message, color) = status.unwrap_or((" Nobody nearby".to_string(), style::MUTED));
        f.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(color))).block(block),
            area,
        );
        return;
    }
    let block = match status {
        Some((message, color)) => block.title_bottom(Span::styled(
            format!("{} ", message),
            Style::default().fg(color),
        )),
        None => block,
    };

    let items: Vec<ListItem> = overlay
        .markers()
        .iter()
        .map(|marker| {
            let (icon, name_style) = if marker.icon.is_some() {
                ("◉", Style::default().fg(style::FOCUS).add_modifier(Modifier::BOLD))
            } else {
                ("⚓", Style::default())
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {icon} ")),
                Span::styled(marker.title.clone(), name_style),
                Span::styled(
                    format!("  {:.4}, {:.4}", marker.latitude, marker.longitude),
                    Style::default().fg(style::MUTED),
                ),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}
