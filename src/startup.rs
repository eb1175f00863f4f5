// Startup module - banner and effective settings
//
// Printed before the TUI takes over the screen (or in headless mode), and
// mirrored into the logs panel so the settings stay visible afterwards.

use crate::config::{Config, LocationSource, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Where the boats come from, for display
fn backend_label(config: &Config) -> String {
    if config.demo_mode {
        "in-memory demo fleet".to_string()
    } else {
        config.api_url.clone()
    }
}

/// Where the near-me map thinks the user is, for display
fn location_label(config: &Config) -> String {
    let location = &config.location;
    match (location.source, location.latitude, location.longitude) {
        (LocationSource::Fixed, Some(lat), Some(lon)) => format!("fixed {lat:.4}, {lon:.4}"),
        (LocationSource::Fixed, _, _) => "fixed (no coordinates)".to_string(),
        (LocationSource::None, _, _) => "none".to_string(),
    }
}

pub fn print_startup(config: &Config) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}Fleet Browser{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Boat search, editing and boats near me{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }

    println!(
        "  {MAGENTA}▸{RESET} Backend  {BOLD}{}{RESET}",
        backend_label(config)
    );
    println!(
        "  {MAGENTA}▸{RESET} Location {BOLD}{}{RESET} {DIM}(on unavailable: {}){RESET}",
        location_label(config),
        config.location.on_unavailable.as_str()
    );
    if config.demo_mode {
        println!("  {YELLOW}▸{RESET} {YELLOW}Demo mode active{RESET}");
    }
    println!();
}

/// Mirror the startup settings into the log
pub fn log_startup(config: &Config) {
    tracing::info!("Fleet Browser v{}", VERSION);
    tracing::info!(backend = %backend_label(config), "Data service");
    tracing::info!(
        location = %location_label(config),
        on_unavailable = config.location.on_unavailable.as_str(),
        "Location provider"
    );
    if config.demo_mode {
        tracing::info!("Demo mode active");
    }
}
