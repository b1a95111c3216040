use monikavpn::config::{environment, AppConfig, DEFAULT_MODEL};
use serial_test::serial;
use std::fs;

#[test]
#[serial]
fn test_partial_file_keeps_defaults() {
    let path = std::env::temp_dir().join("monikavpn_partial_config.json");
    fs::write(
        &path,
        r#"{ "handshake_delay_ms": 500, "recommendation": { "timeout_secs": 3 } }"#,
    )
    .expect("Failed to write config");

    let config = AppConfig::load_from(Some(&path), environment()).expect("Failed to load config");
    assert_eq!(config.handshake_delay_ms, 500);
    assert_eq!(config.recommendation.timeout_secs, 3);
    assert_eq!(config.recommendation.model, DEFAULT_MODEL);
    assert_eq!(config.telemetry_window, 20);

    let _ = fs::remove_file(path);
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    let path = std::env::temp_dir().join("monikavpn_broken_config.json");
    fs::write(&path, "{ handshake_delay_ms: ").expect("Failed to write config");

    assert!(AppConfig::load_from(Some(&path), environment()).is_err());

    let _ = fs::remove_file(path);
}

#[test]
#[serial]
fn test_environment_beats_file() {
    let path = std::env::temp_dir().join("monikavpn_layered_config.json");
    fs::write(
        &path,
        r#"{ "recommendation": { "model": "from-file", "api_key": "file-key" } }"#,
    )
    .expect("Failed to write config");
    std::env::set_var("MONIKA_RECOMMENDATION__MODEL", "gemini-test");

    let config = AppConfig::load(Some(path.clone()));

    std::env::remove_var("MONIKA_RECOMMENDATION__MODEL");
    let _ = fs::remove_file(path);

    let config = config.expect("Failed to load config");
    assert_eq!(config.recommendation.model, "gemini-test");
    assert_eq!(config.recommendation.api_key.as_deref(), Some("file-key"));
}

#[test]
#[serial]
fn test_bare_api_key_is_the_last_resort() {
    let path = std::env::temp_dir().join("monikavpn_no_key_config.json");
    fs::write(&path, "{}").expect("Failed to write config");
    std::env::set_var("API_KEY", "fallback-key");

    let config = AppConfig::load(Some(path.clone()));

    std::env::remove_var("API_KEY");
    let _ = fs::remove_file(path);

    let config = config.expect("Failed to load config");
    assert_eq!(config.recommendation.api_key.as_deref(), Some("fallback-key"));
}
