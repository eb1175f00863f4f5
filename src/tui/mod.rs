// TUI module - terminal front-end for the boat search
//
// Sets up the terminal, runs the event loop and restores the terminal on the
// way out. The loop waits on keyboard input, a redraw tick, request
// completions from the search container and the selection bus at once.

pub mod app;
pub mod components;
pub mod layout;
pub mod style;
pub mod ui;

use crate::app::FleetApp;
use crate::logging::LogBuffer;
use anyhow::{Context, Result};
use app::{App, LENGTH_STEP, PRICE_STEP};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing::warn;

/// Pause between input polls when no key is waiting
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Run the TUI until the user quits
pub async fn run_tui(fleet: FleetApp, log_buffer: LogBuffer) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(fleet, log_buffer);
    app.fleet.mount();

    let result = run_event_loop(&mut terminal, &mut app).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Next terminal event, if one is waiting
///
/// Never blocks the runtime: when nothing is pending it sleeps on the tokio
/// timer so spawned requests keep running on the current-thread runtime.
async fn next_input() -> Option<Event> {
    if event::poll(Duration::ZERO).unwrap_or(false) {
        return event::read().ok();
    }
    tokio::time::sleep(INPUT_POLL_INTERVAL).await;
    None
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

    loop {
        app.sync_toasts();
        app.clamp_cursor();
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            input = next_input() => {
                if let Some(Event::Key(key_event)) = input {
                    handle_key_event(app, key_event);
                }
            }

            _ = tick_interval.tick() => {
                app.tick_animation();
            }

            Some(completion) = app.fleet.next_completion() => {
                app.fleet.apply(completion);
            }

            Some(message) = app.selection.recv() => {
                app.on_selection(message);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    match key_event.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }

        KeyCode::Left | KeyCode::BackTab => cycle_type(app, -1),
        KeyCode::Right | KeyCode::Tab => cycle_type(app, 1),

        KeyCode::Up | KeyCode::Char('k') => app.cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => app.cursor_down(),
        KeyCode::Enter => app.activate_cursor(),

        KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_price(PRICE_STEP),
        KeyCode::Char('-') => app.adjust_price(-PRICE_STEP),
        KeyCode::Char(']') => app.adjust_length(LENGTH_STEP),
        KeyCode::Char('[') => app.adjust_length(-LENGTH_STEP),

        KeyCode::Char('s') | KeyCode::Char('S') => app.fleet.request_save(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.fleet.request_refresh(),
        KeyCode::Char('l') | KeyCode::Char('L') => app.show_logs = !app.show_logs,
        _ => {}
    }
}

fn cycle_type(app: &mut App, step: isize) {
    if let Err(e) = app.fleet.cycle_type(step) {
        warn!(error = %e, "Filter change rejected");
    }
}
