//! Unit tests for config.rs module

use std::io::Write;

use movie_tracker::config::{AppConfig, LoggingConfig};

#[test]
fn test_default_config_values() {
    let config = AppConfig::default();

    assert_eq!(config.database.path, "data/movie_tracker.db");
    assert_eq!(config.lookup.base_url, "http://www.omdbapi.com/");
    assert_eq!(config.lookup.api_key, "");
    assert_eq!(config.lookup.timeout_secs, 10);
    assert_eq!(config.security.bcrypt_cost, bcrypt::DEFAULT_COST);
}

#[test]
fn test_default_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_config_validation_success() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_empty_database_path() {
    let mut config = AppConfig::default();
    config.database.path = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_zero_timeout() {
    let mut config = AppConfig::default();
    config.lookup.timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_bad_base_url() {
    let mut config = AppConfig::default();
    config.lookup.base_url = "omdb without scheme".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_bcrypt_cost_bounds() {
    for (cost, ok) in [(3, false), (4, true), (12, true), (31, true), (32, false)] {
        let mut config = AppConfig::default();
        config.security.bcrypt_cost = cost;
        assert_eq!(config.validate().is_ok(), ok, "cost {cost}");
    }
}

#[test]
fn test_config_validation_log_levels() {
    for level in ["trace", "debug", "info", "warn", "error"] {
        let mut config = AppConfig::default();
        config.logging.level = level.to_string();
        assert!(config.validate().is_ok(), "Failed for level: {}", level);
    }

    let mut config = AppConfig::default();
    config.logging.level = "loud".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_log_formats() {
    let mut config = AppConfig::default();
    config.logging = LoggingConfig {
        level: "info".to_string(),
        file_path: Some("logs/tracker.log".to_string()),
        format: "json".to_string(),
    };
    assert!(config.validate().is_ok());

    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_get_api_key_prefers_environment() {
    let mut config = AppConfig::default();
    config.lookup.api_key = "from-config".to_string();

    std::env::set_var("OMDB_API_KEY", "from-env");
    assert_eq!(config.get_api_key(), "from-env");

    std::env::set_var("OMDB_API_KEY", "");
    assert_eq!(config.get_api_key(), "from-config");
    std::env::remove_var("OMDB_API_KEY");
}

#[test]
fn test_load_with_explicit_file() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = temp_dir.path().join("custom.toml");
    let mut file = std::fs::File::create(&path).expect("Failed to create config file");
    writeln!(file, "[database]\npath = \"/tmp/custom.db\"\n\n[logging]\nlevel = \"debug\"").expect("Failed to write config");

    let config = AppConfig::load(Some(&path)).expect("Failed to load config");
    assert_eq!(config.database.path, "/tmp/custom.db");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.lookup.base_url, "http://www.omdbapi.com/");
}

#[test]
fn test_load_rejects_missing_explicit_file() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    assert!(AppConfig::load(Some(&temp_dir.path().join("missing.toml"))).is_err());
}

#[test]
fn test_load_from_environment() {
    std::env::set_var("MOVIE_TRACKER__LOOKUP__TIMEOUT_SECS", "42");
    let config = AppConfig::load(None);
    std::env::remove_var("MOVIE_TRACKER__LOOKUP__TIMEOUT_SECS");

    assert_eq!(config.expect("Failed to load config").lookup.timeout_secs, 42);
}

#[test]
fn test_load_keeps_numeric_looking_strings_from_environment() {
    std::env::set_var("MOVIE_TRACKER__LOOKUP__API_KEY", "00123456");
    let config = AppConfig::load(None);
    std::env::remove_var("MOVIE_TRACKER__LOOKUP__API_KEY");

    assert_eq!(config.expect("Failed to load config").lookup.api_key, "00123456");
}
