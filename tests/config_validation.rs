//! Integration tests for configuration validation

#![allow(clippy::expect_used)]

use raknet_protocol::config::{CodecConfig, LoggingConfig, ProtocolConfig, SocketConfig};
use raknet_protocol::core::ack::AckDecodeMode;
use raknet_protocol::RakCodec;
use std::time::Duration;
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = ProtocolConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
}

#[test]
fn test_invalid_socket_address() {
    let mut config = ProtocolConfig::default();
    config.socket.address = "invalid_address".to_string();

    let errors = config.validate();
    assert!(!errors.is_empty(), "Should have validation errors");
    assert!(errors
        .iter()
        .any(|e| e.contains("Invalid socket address format")));
}

#[test]
fn test_empty_socket_address() {
    let mut config = ProtocolConfig::default();
    config.socket.address = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_ipv6_socket_address_is_accepted() {
    let config = SocketConfig {
        address: "[::1]:19132".to_string(),
        ..SocketConfig::default()
    };
    assert!(config.validate().is_empty());
}

#[test]
fn test_datagram_size_bounds() {
    let small = SocketConfig {
        max_datagram_size: 100,
        ..SocketConfig::default()
    };
    assert!(small
        .validate()
        .iter()
        .any(|e| e.contains("Max datagram size too small")));

    let large = SocketConfig {
        max_datagram_size: 70_000,
        ..SocketConfig::default()
    };
    assert!(large
        .validate()
        .iter()
        .any(|e| e.contains("Max datagram size too large")));
}

#[test]
fn test_receive_timeout_bounds() {
    let short = SocketConfig {
        receive_timeout: Duration::from_millis(1),
        ..SocketConfig::default()
    };
    assert!(short
        .validate()
        .iter()
        .any(|e| e.contains("Receive timeout too short")));

    let long = SocketConfig {
        receive_timeout: Duration::from_secs(600),
        ..SocketConfig::default()
    };
    assert!(long
        .validate()
        .iter()
        .any(|e| e.contains("Receive timeout too long")));
}

#[test]
fn test_system_address_count_bounds() {
    let zero = CodecConfig {
        system_address_count: 0,
        ..CodecConfig::default()
    };
    assert!(zero
        .validate()
        .iter()
        .any(|e| e.contains("System address count must be greater than 0")));

    let huge = CodecConfig {
        system_address_count: 65,
        ..CodecConfig::default()
    };
    assert!(huge
        .validate()
        .iter()
        .any(|e| e.contains("System address count too large")));

    let ten = CodecConfig {
        system_address_count: 10,
        ..CodecConfig::default()
    };
    assert!(ten.validate().is_empty());
}

#[test]
fn test_ack_limits_validation() {
    let config = CodecConfig {
        max_ack_range_span: 0,
        max_ack_entries: 0,
        ..CodecConfig::default()
    };
    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Max ACK range span must be greater than 0")));
    assert!(errors
        .iter()
        .any(|e| e.contains("Max ACK entries must be greater than 0")));

    let too_many = CodecConfig {
        max_ack_entries: (1 << 24) + 1,
        ..CodecConfig::default()
    };
    assert!(too_many
        .validate()
        .iter()
        .any(|e| e.contains("Max ACK entries too large")));
}

#[test]
fn test_protocol_version_zero() {
    let config = CodecConfig {
        protocol_version: 0,
        ..CodecConfig::default()
    };
    assert!(config
        .validate()
        .iter()
        .any(|e| e.contains("Protocol version must be greater than 0")));
}

#[test]
fn test_logging_validation() {
    let empty = LoggingConfig {
        app_name: String::new(),
        ..LoggingConfig::default()
    };
    assert!(empty
        .validate()
        .iter()
        .any(|e| e.contains("Application name cannot be empty")));

    let long = LoggingConfig {
        app_name: "x".repeat(65),
        ..LoggingConfig::default()
    };
    assert!(long
        .validate()
        .iter()
        .any(|e| e.contains("Application name too long")));

    let silent_json = LoggingConfig {
        log_to_console: false,
        json_format: true,
        ..LoggingConfig::default()
    };
    assert!(silent_json
        .validate()
        .iter()
        .any(|e| e.contains("json_format has no effect")));
}

#[test]
fn test_multiple_errors_are_collected() {
    let config = ProtocolConfig::default_with_overrides(|c| {
        c.socket.address = String::new();
        c.codec.system_address_count = 0;
        c.logging.app_name = String::new();
    });

    let errors = config.validate();
    assert!(errors.len() >= 3, "Expected 3 errors, got {:?}", errors);
}

#[test]
fn test_validate_strict() {
    assert!(ProtocolConfig::default().validate_strict().is_ok());

    let config = ProtocolConfig::default_with_overrides(|c| c.codec.max_ack_entries = 0);
    let err = config
        .validate_strict()
        .expect_err("validation should fail");
    assert!(err.to_string().contains("Configuration validation failed"));
}

#[test]
fn test_toml_round_trip() {
    let original = ProtocolConfig::default_with_overrides(|c| {
        c.socket.address = "127.0.0.1:19133".to_string();
        c.socket.receive_timeout = Duration::from_millis(250);
        c.codec.ack_decode_mode = AckDecodeMode::LegacyTwoTriadSingle;
        c.logging.log_level = Level::DEBUG;
    });

    let text = toml::to_string_pretty(&original).expect("serialize");
    assert!(text.contains("legacy_two_triad_single"));
    assert!(text.contains("receive_timeout = 250"));

    let parsed = ProtocolConfig::from_toml(&text).expect("parse");
    assert_eq!(parsed.socket.address, "127.0.0.1:19133");
    assert_eq!(parsed.socket.receive_timeout, Duration::from_millis(250));
    assert_eq!(parsed.codec.ack_decode_mode, AckDecodeMode::LegacyTwoTriadSingle);
    assert_eq!(parsed.logging.log_level, Level::DEBUG);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let config = ProtocolConfig::from_toml(
        r#"
        [codec]
        system_address_count = 10
        "#,
    )
    .expect("parse");

    assert_eq!(config.codec.system_address_count, 10);
    assert_eq!(config.codec.protocol_version, 6);
    assert_eq!(config.socket.address, SocketConfig::default().address);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let err = ProtocolConfig::from_toml("[codec\nbroken").expect_err("should fail");
    assert!(err.to_string().contains("Failed to parse TOML"));

    let err = ProtocolConfig::from_toml("[logging]\nlog_level = \"loud\"").expect_err("bad level");
    assert!(err.to_string().contains("Invalid log level"));
}

#[test]
fn test_save_and_load_file() {
    let path = std::env::temp_dir().join(format!("raknet-protocol-{}.toml", std::process::id()));
    let config = ProtocolConfig::default_with_overrides(|c| c.codec.protocol_version = 11);

    config.save_to_file(&path).expect("save");
    let loaded = ProtocolConfig::from_file(&path).expect("load");
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.codec.protocol_version, 11);
    assert_eq!(loaded.codec.acceptor().version(), 11);
}

#[test]
fn test_codec_built_from_config() {
    let config = ProtocolConfig::default_with_overrides(|c| {
        c.codec.max_ack_range_span = 8;
        c.codec.reject_invalid_magic = true;
    });
    let codec = RakCodec::from_config(&config.codec);
    assert_eq!(codec.options().ack_limits.max_range_span, 8);
    assert_eq!(codec.options().system_address_count, 20);
}

#[test]
fn test_example_config_parses() {
    let example = ProtocolConfig::example_config();
    let parsed = ProtocolConfig::from_toml(&example).expect("example should parse");
    assert!(parsed.validate().is_empty());
}
