//! `[location]` and `[logging]` sections
//!
//! Both sections deserialize straight into the types the app uses; missing
//! keys take the section's `Default`. Keyword values are lowercase enums
//! parsed by serde, so a misspelt keyword is reported like any other parse
//! error instead of quietly becoming the default.

use serde::Deserialize;
use std::path::PathBuf;

/// Where positions come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    /// Configured latitude/longitude
    #[default]
    Fixed,
    /// No geolocation on this device
    #[serde(alias = "off")]
    None,
}

/// What the near-me map does when geolocation fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationPolicy {
    /// Record the error, render nothing
    #[default]
    Silent,
    /// Also raise an error toast
    Notify,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl LocationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::None => "none",
        }
    }
}

impl LocationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Notify => "notify",
        }
    }
}

impl LogRotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    #[serde(rename = "provider")]
    pub source: LocationSource,
    /// A fixed source without both coordinates has nothing to report
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub on_unavailable: LocationPolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` level for the crate; `RUST_LOG` wins over it
    pub level: String,
    /// JSON log files next to the TUI buffer or stdout output
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    /// File name stem, e.g. `fleet` -> `fleet.2026-10-16`
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_rotation: LogRotation::Daily,
            file_prefix: "fleet".to_string(),
        }
    }
}
