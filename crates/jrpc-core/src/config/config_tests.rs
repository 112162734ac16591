#![allow(non_snake_case)]

use super::*;

#[test]
fn ServerConfig___default___has_expected_values() {
    let config = ServerConfig::default();

    assert_eq!(config.debug_level, DebugLevel::from_env());
    assert_eq!(config.initial_buffer_size, 1500);
    assert_eq!(config.max_events, 128);
    assert_eq!(config.poll_timeout_ms, 100);
}

#[test]
fn ServerConfig___default___reads_debug_level_from_environment() {
    let expected = DebugLevel::from_env();

    assert_eq!(ServerConfig::default().debug_level, expected);
    assert_eq!(ServerConfig::new().debug_level, expected);
    assert_eq!(ServerConfig::from_env().debug_level, expected);
}

#[test]
fn ClientConfig___default___reads_debug_level_from_environment() {
    let expected = DebugLevel::from_env();

    assert_eq!(ClientConfig::default().debug_level, expected);
    assert_eq!(ClientConfig::from_json(b"{}").unwrap().debug_level, expected);
}

#[test]
fn ServerConfig___from_empty_bytes___returns_defaults() {
    let config = ServerConfig::from_json(&[]).unwrap();

    assert_eq!(config.initial_buffer_size, 1500);
}

#[test]
fn ServerConfig___from_json___parses_debug_level() {
    let json = r#"{"debug_level": 2}"#;

    let config = ServerConfig::from_json(json.as_bytes()).unwrap();

    assert_eq!(config.debug_level, DebugLevel::new(2));
    assert_eq!(config.max_events, 128);
}

#[test]
fn ServerConfig___from_json___invalid_returns_error() {
    let result = ServerConfig::from_json(b"{not json");

    assert!(result.is_err());
}

#[test]
fn ServerConfig___builders___set_fields() {
    let config = ServerConfig::new()
        .with_debug_level(DebugLevel::new(1))
        .with_buffer_size(16);

    assert_eq!(config.debug_level.get(), 1);
    assert_eq!(config.initial_buffer_size, 16);
}

#[test]
fn ClientConfig___default___blocks_forever() {
    let config = ClientConfig::default();

    assert!(config.read_timeout_ms.is_none());
    assert_eq!(config.initial_buffer_size, 1500);
}

#[test]
fn ClientConfig___from_json___parses_timeout() {
    let json = r#"{"read_timeout_ms": 250}"#;

    let config = ClientConfig::from_json(json.as_bytes()).unwrap();

    assert_eq!(config.read_timeout_ms, Some(250));
}

#[test]
fn ClientConfig___serialize___roundtrips() {
    let config = ClientConfig::new()
        .with_debug_level(DebugLevel::new(3))
        .with_read_timeout_ms(10);

    let bytes = serde_json::to_vec(&config).unwrap();
    let back = ClientConfig::from_json(&bytes).unwrap();

    assert_eq!(back.debug_level, DebugLevel::new(3));
    assert_eq!(back.read_timeout_ms, Some(10));
}

#[test]
fn DebugLevel___verbosity_gates___follow_level() {
    assert!(!DebugLevel::new(0).logs_methods());
    assert!(DebugLevel::new(1).logs_methods());
    assert!(!DebugLevel::new(1).logs_payloads());
    assert!(DebugLevel::new(2).logs_payloads());
}
