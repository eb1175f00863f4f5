// Fleet Browser - boat search, editing and boats near me in the terminal
//
// Architecture:
// - Data service: the backend contract (HTTP binding or in-memory demo fleet)
// - Components: type filter, results coordinator with editable rows and
//   selectable tiles, near-me map overlay
// - App: owns the components, spawns requests and routes their completions
// - Bus: application-wide "boat selected" broadcast
// - TUI (ratatui): renders the components and turns keys into user actions
// - Event system: mpsc channels connect components, requests and the UI

mod app;
mod bus;
mod cli;
mod components;
mod config;
mod error;
mod events;
mod geo;
mod logging;
mod model;
mod service;
mod startup;
mod tui;

use anyhow::Result;
use app::FleetApp;
use config::{Config, LocationSource, LogRotation};
use logging::{LogBuffer, TuiLogLayer};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, --path)
    if cli::handle_cli() {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    apply_demo_location(&mut config);

    // Log buffer for the TUI logs panel
    let log_buffer = LogBuffer::new();

    // Kept alive until exit so the file writer flushes
    let _file_guard = init_logging(&config, &log_buffer);

    if !config.enable_tui {
        startup::print_startup(&config);
    }
    startup::log_startup(&config);

    let service = service::from_config(&config)?;
    let location = geo::from_config(&config.location);
    let fleet = FleetApp::new(service, location, config.location.on_unavailable);

    if config.enable_tui {
        tui::run_tui(fleet, log_buffer).await?;
    } else {
        let timeout = Duration::from_secs(config.request_timeout_secs.saturating_mul(2).max(1));
        run_headless(fleet, timeout).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Demo users stand on the Embarcadero unless they configured a position
fn apply_demo_location(config: &mut Config) {
    let location = &mut config.location;
    if config.demo_mode
        && location.source == LocationSource::Fixed
        && (location.latitude.is_none() || location.longitude.is_none())
    {
        location.latitude = Some(service::demo::DEMO_POSITION.latitude);
        location.longitude = Some(service::demo::DEMO_POSITION.longitude);
    }
}

/// Initialize tracing
///
/// In TUI mode logs are captured to the buffer (printing would garble the
/// display); in headless mode they go to stdout. File logging is added on top
/// of either when enabled.
///
/// Precedence: RUST_LOG env var > config file > default "info"
fn init_logging(
    config: &Config,
    log_buffer: &LogBuffer,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_filter = format!("fleet_browser={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let tui_layer = config
        .enable_tui
        .then(|| TuiLogLayer::new(log_buffer.clone()));
    let stdout_layer = (!config.enable_tui).then(|| tracing_subscriber::fmt::layer());

    let (file_layer, guard) = match file_writer(config) {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tui_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}

/// Non-blocking rolling file writer, if file logging is enabled and possible
fn file_writer(
    config: &Config,
) -> Option<(
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
)> {
    let logging = &config.logging;
    if !logging.file_enabled {
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&logging.file_dir) {
        eprintln!(
            "Warning: Could not create log directory {:?}: {}",
            logging.file_dir, e
        );
        return None;
    }

    let appender = match logging.file_rotation {
        LogRotation::Hourly => {
            tracing_appender::rolling::hourly(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Daily => {
            tracing_appender::rolling::daily(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Never => {
            tracing_appender::rolling::never(&logging.file_dir, &logging.file_prefix)
        }
    };

    Some(tracing_appender::non_blocking(appender))
}

/// Mount, wait for the initial requests and print what came back
async fn run_headless(mut fleet: FleetApp, timeout: Duration) {
    fleet.mount();
    if !fleet.run_until_idle(timeout).await {
        tracing::warn!(
            in_flight = fleet.in_flight(),
            "Requests still pending after {:?}",
            timeout
        );
    }

    if fleet.filter.is_loaded() {
        let labels: Vec<_> = fleet
            .filter
            .options()
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        println!("Boat types: {}", labels.join(", "));
    }
    if let Some(err) = fleet.filter.error() {
        println!("Boat types unavailable: {err}");
    }

    println!();
    println!("Boats ({}):", fleet.results.boats().len());
    for boat in fleet.results.boats() {
        let cells: Vec<_> = fleet
            .results
            .columns()
            .iter()
            .map(|column| column.display(boat))
            .collect();
        println!("  {}", cells.join(" | "));
    }
    if let Some(err) = fleet.results.last_error() {
        println!("  search failed: {err}");
    }

    println!();
    match fleet.overlay.state().position() {
        Some(position) => println!(
            "Near {:.4}, {:.4} ({} markers):",
            position.latitude,
            position.longitude,
            fleet.overlay.markers().len()
        ),
        None => println!("Near me: location unavailable"),
    }
    for marker in fleet.overlay.markers() {
        println!(
            "  {} ({:.4}, {:.4})",
            marker.title, marker.latitude, marker.longitude
        );
    }

    for toast in fleet.take_toasts() {
        println!();
        println!("[{}] {}", toast.title, toast.message);
    }
}
