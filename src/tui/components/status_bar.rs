// Status bar
//
// Uptime, loading state, selection and the key reference. Narrow terminals
// get the short key list.

use crate::tui::app::App;
use crate::tui::layout::Breakpoint;
use crate::tui::style;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const KEYS_FULL: &str =
    "◂▸ type │ ▴▾ row │ ⏎ select │ +/- price │ [/] length │ s save │ r refresh │ l logs │ q quit";
const KEYS_SHORT: &str = "◂▸ ▴▾ ⏎ +/- [/] s r l q";

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let fleet = &app.fleet;
    let bp = Breakpoint::from_width(area.width);

    let activity = match fleet.spinner_depth() {
        0 => "idle".to_string(),
        1 => format!("{} loading", app.spinner_char()),
        n => format!("{} loading ×{n}", app.spinner_char()),
    };
    let selection = app
        .broadcast_selection
        .as_deref()
        .map(|id| format!(" │ ⛵ {id}"))
        .unwrap_or_default();
    let keys = if bp.at_least(Breakpoint::Wide) {
        KEYS_FULL
    } else {
        KEYS_SHORT
    };

    let text = format!(
        " {} │ {}{} │ 📡 {} sent · {} listening │ {}",
        app.uptime(),
        activity,
        selection,
        fleet.bus().published_count(),
        fleet.bus().subscriber_count(),
        keys
    );

    let status = Paragraph::new(text)
        .style(Style::default().fg(style::MUTED))
        .block(Block::default().borders(Borders::TOP).border_style(style::border()));
    f.render_widget(status, area);
}
