//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

/// Render an optional coordinate as a key line (commented out when unset)
fn coordinate_line(key: &str, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{key} = {v:?}"),
        None => format!("# {key} = 0.0"),
    }
}

impl Config {
    /// Serialize config to TOML string
    pub fn to_toml(&self) -> String {
        format!(
            r#"# fleet-browser configuration

# Base URL of the boat data service (env: FLEET_API_URL)
api_url = "{api_url}"

# Per-request timeout in seconds (env: FLEET_TIMEOUT_SECS)
request_timeout_secs = {timeout}

# Device location for the near-me map
[location]
provider = "{provider}"         # fixed | none
{latitude}
{longitude}
on_unavailable = "{policy}"     # silent | notify

# Logging configuration
[logging]
level = "{level}"  # trace, debug, info, warn, error (RUST_LOG env var overrides this)
file_enabled = {file_enabled}
file_dir = "{file_dir}"
file_rotation = "{file_rotation}"  # hourly | daily | never
file_prefix = "{file_prefix}"
"#,
            api_url = self.api_url,
            timeout = self.request_timeout_secs,
            provider = self.location.source.as_str(),
            latitude = coordinate_line("latitude", self.location.latitude),
            longitude = coordinate_line("longitude", self.location.longitude),
            policy = self.location.on_unavailable.as_str(),
            level = self.logging.level,
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display(),
            file_rotation = self.logging.file_rotation.as_str(),
            file_prefix = self.logging.file_prefix,
        )
    }
}
