//! Configuration tests
//!
//! Guards for the file format and for env > file > default precedence.

use super::*;
use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

/// Verify that serialized config can be parsed back.
#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

#[test]
fn test_config_roundtrip_preserves_location() {
    let mut config = Config::default();
    config.location.latitude = Some(37.7749);
    config.location.longitude = Some(-122.4194);
    config.location.on_unavailable = LocationPolicy::Notify;

    let file: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    let reloaded = Config::from_sources(file, env_from(&[]));

    assert_eq!(reloaded.location, config.location);
    assert_eq!(reloaded.api_url, config.api_url);
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_defaults_without_file_or_env() {
    let config = Config::from_sources(FileConfig::default(), env_from(&[]));

    assert_eq!(config.api_url, "http://127.0.0.1:8080/api");
    assert_eq!(config.request_timeout_secs, 30);
    assert!(config.enable_tui);
    assert!(!config.demo_mode);
    assert_eq!(config.location.source, LocationSource::Fixed);
    assert_eq!(config.location.on_unavailable, LocationPolicy::Silent);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file_rotation, LogRotation::Daily);
}

#[test]
fn test_file_overrides_defaults() {
    let file: FileConfig = toml::from_str(
        r#"
api_url = "https://boats.example.com/api"
request_timeout_secs = 5

[location]
provider = "none"
on_unavailable = "notify"

[logging]
level = "debug"
file_rotation = "hourly"
"#,
    )
    .unwrap();

    let config = Config::from_sources(file, env_from(&[]));

    assert_eq!(config.api_url, "https://boats.example.com/api");
    assert_eq!(config.request_timeout_secs, 5);
    assert_eq!(config.location.source, LocationSource::None);
    assert_eq!(config.location.on_unavailable, LocationPolicy::Notify);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file_rotation, LogRotation::Hourly);
}

#[test]
fn test_env_overrides_file() {
    let file: FileConfig = toml::from_str(
        r#"
api_url = "https://boats.example.com/api"

[location]
latitude = 10.0
longitude = 20.0
"#,
    )
    .unwrap();

    let config = Config::from_sources(
        file,
        env_from(&[
            ("FLEET_API_URL", "http://localhost:9000"),
            ("FLEET_LATITUDE", "47.6"),
            ("FLEET_NO_TUI", "1"),
            ("FLEET_DEMO", "true"),
            ("FLEET_TIMEOUT_SECS", "not-a-number"),
        ]),
    );

    assert_eq!(config.api_url, "http://localhost:9000");
    assert_eq!(config.location.latitude, Some(47.6));
    assert_eq!(config.location.longitude, Some(20.0));
    assert!(!config.enable_tui);
    assert!(config.demo_mode);
    // Unparsable env values fall through to the next layer
    assert_eq!(config.request_timeout_secs, 30);
}

#[test]
fn test_keywords_parse_lowercase_with_aliases() {
    let file: FileConfig = toml::from_str(
        r#"
[location]
provider = "off"
on_unavailable = "notify"
"#,
    )
    .unwrap();
    assert_eq!(file.location.source, LocationSource::None);
    assert_eq!(file.location.on_unavailable, LocationPolicy::Notify);
    // Keys left out of a section keep their defaults
    assert_eq!(file.logging, LoggingConfig::default());
}

#[test]
fn test_unknown_keyword_is_a_parse_error() {
    let parsed: Result<FileConfig, _> = toml::from_str(
        r#"
[location]
on_unavailable = "loud"
"#,
    );
    assert!(parsed.is_err());

    let parsed: Result<FileConfig, _> = toml::from_str(
        r#"
[logging]
file_rotation = "weekly"
"#,
    );
    assert!(parsed.is_err());
}

#[test]
fn test_config_roundtrip_preserves_logging() {
    let mut config = Config::default();
    config.logging.level = "trace".to_string();
    config.logging.file_enabled = true;
    config.logging.file_rotation = LogRotation::Never;
    config.logging.file_prefix = "boats".to_string();

    let file: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    assert_eq!(file.logging, config.logging);
}
