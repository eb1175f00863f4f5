// UI rendering
//
// ┌ title ───────────────────────────────────────────┐
// ├ boat type filter ────────────────────────────────┤
// ├ results table ──────────────┬ boats near me ─────┤
// ├ system logs (toggle) ───────┴────────────────────┤
// └ status bar ──────────────────────────────────────┘

use super::app::App;
use super::components::{
    filter_bar, logs_panel, near_me_panel, results_table, status_bar, toast,
};
use super::layout::Breakpoint;
use super::style;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const LOGS_HEIGHT: u16 = 8;

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let logs_height = if app.show_logs { LOGS_HEIGHT } else { 0 };

    let [title_area, filter_area, main_area, logs_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(logs_height),
        Constraint::Length(2),
    ])
    .areas(area);

    render_title(f, title_area, app);
    filter_bar::render(f, filter_area, &app.fleet.filter);

    if Breakpoint::from_width(main_area.width).shows_map() {
        let [table_area, map_area] =
            Layout::horizontal([Constraint::Fill(3), Constraint::Fill(2)]).areas(main_area);
        results_table::render(f, table_area, &app.fleet.results, app.cursor);
        near_me_panel::render(f, map_area, &app.fleet.overlay, app.spinner_char());
    } else {
        results_table::render(f, main_area, &app.fleet.results, app.cursor);
    }

    if app.show_logs {
        logs_panel::render(f, logs_area, &app.log_buffer);
    }
    status_bar::render(f, status_area, app);

    toast::render(f, area, &app.toasts);
}

fn render_title(f: &mut Frame, area: Rect, app: &App) {
    let indicator = if app.fleet.is_loading() {
        format!(" {} loading", app.spinner_char())
    } else {
        String::new()
    };

    let title = Paragraph::new(format!(" ⛵ Fleet Browser{indicator}"))
        .style(style::title())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style::border()),
        );
    f.render_widget(title, area);
}
