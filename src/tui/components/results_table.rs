//! Search results table
//!
//! One row per boat. The first column flags the selected tile; cells with
//! unsaved edits show the draft value and an asterisk.

use crate::components::ResultsCoordinator;
use crate::error::FetchError;
use crate::model::{Column, FilterState, RowEdit};
use crate::tui::layout::Breakpoint;
use crate::tui::style;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

/// Whether a draft changes this column
fn touches(column: &Column, edit: &RowEdit) -> bool {
    match column.field_name {
        "Name" => edit.name.is_some(),
        "Length__c" => edit.length.is_some(),
        "Price__c" => edit.price.is_some(),
        "Description__c" => edit.description.is_some(),
        _ => false,
    }
}

/// Row count, filter, unsaved drafts and the last fetch error if any
fn block_title(
    rows: usize,
    filter: &FilterState,
    unsaved: usize,
    error: Option<&FetchError>,
) -> String {
    let mut title = format!(" Boats ({rows})");
    if !filter.is_all_types() {
        title.push_str(&format!(" · {}", filter.boat_type_id()));
    }
    if unsaved > 0 {
        title.push_str(&format!(" · {unsaved} unsaved"));
    }
    // With no rows the error fills the body instead
    if let Some(err) = error.filter(|_| rows > 0) {
        title.push_str(&format!(" · ⚠ {err}"));
    }
    title.push(' ');
    title
}

fn column_width(column: &Column) -> Constraint {
    match column.field_name {
        "Name" => Constraint::Min(14),
        "Description__c" => Constraint::Fill(2),
        _ => Constraint::Length(14),
    }
}

pub fn render(f: &mut Frame, area: Rect, results: &ResultsCoordinator, cursor: usize) {
    let bp = Breakpoint::from_width(area.width);
    let columns: Vec<&Column> = results
        .columns()
        .iter()
        .filter(|c| bp.shows_description() || c.field_name != "Description__c")
        .collect();

    let drafts = results.draft_values();
    let title = block_title(
        results.boats().len(),
        results.filter(),
        drafts.len(),
        results.last_error(),
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style::border())
        .title(title);

    if results.boats().is_empty() {
        let message = match results.last_error() {
            Some(err) => Span::styled(format!(" {err}"), Style::default().fg(style::ERROR)),
            None => Span::styled(" No boats", Style::default().fg(style::MUTED)),
        };
        f.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let header = Row::new(
        std::iter::once(Cell::from(" "))
            .chain(columns.iter().map(|c| Cell::from(c.label)))
            .collect::<Vec<_>>(),
    )
    .style(style::title());

    let rows: Vec<Row> = results
        .tiles()
        .iter()
        .map(|tile| {
            let boat = tile.boat();
            let draft = drafts.iter().find(|edit| edit.id == boat.id);
            let mut shown = boat.clone();
            if let Some(edit) = draft {
                edit.apply_to(&mut shown);
            }

            let marker = if tile.is_selected() { "●" } else { " " };
            let mut cells = vec![Cell::from(marker).style(Style::default().fg(style::SELECTED))];
            for column in &columns {
                let value = column.display(&shown);
                let cell = match draft {
                    Some(edit) if touches(column, edit) => Cell::from(format!("{value}*"))
                        .style(Style::default().fg(style::DRAFT)),
                    _ => Cell::from(value),
                };
                cells.push(cell);
            }
            Row::new(cells)
        })
        .collect();

    let widths: Vec<Constraint> = std::iter::once(Constraint::Length(1))
        .chain(columns.iter().map(|c| column_width(c)))
        .collect();

    let border_style = if results.last_error().is_some() {
        Style::default().fg(style::WARN)
    } else {
        style::border()
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.border_style(border_style))
        .row_highlight_style(style::cursor().add_modifier(Modifier::BOLD));

    let mut state = TableState::default().with_selected(Some(cursor));
    f.render_stateful_widget(table, area, &mut state);
}
