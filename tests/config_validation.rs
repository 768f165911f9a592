//! Integration tests for configuration validation

#![allow(clippy::expect_used)]

use skin_channel_protocol::config::{
    ChannelConfig, HandshakeConfig, LoggingConfig, ProtocolConfig, ACK_CHECK_DELAY,
    ACK_MISS_THRESHOLD, MESSAGE_CHANNEL,
};
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
fn test_default_values() {
    let config = ProtocolConfig::default();
    assert_eq!(config.channel.name, MESSAGE_CHANNEL);
    assert_eq!(config.handshake.ack_check_delay, ACK_CHECK_DELAY);
    assert_eq!(config.handshake.ack_check_delay, Duration::from_secs(30));
    assert_eq!(config.handshake.miss_threshold, ACK_MISS_THRESHOLD);
    assert_eq!(config.handshake.miss_threshold, 3);
}

#[test]
fn test_channel_name_without_namespace() {
    let mut config = ProtocolConfig::default();
    config.channel.name = "messagechannel".to_string();

    let errors = config.validate();
    assert!(!errors.is_empty(), "Should have validation errors");
    assert!(errors.iter().any(|e| e.contains("Invalid channel name")));
}

#[test]
fn test_channel_name_empty_path() {
    let channel = ChannelConfig {
        name: "sr:".to_string(),
        ..ChannelConfig::default()
    };
    let errors = channel.validate();
    assert!(errors.iter().any(|e| e.contains("expected format")));
}

#[test]
fn test_channel_name_uppercase() {
    let mut config = ProtocolConfig::default();
    config.channel.name = "SR:MessageChannel".to_string();

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("must be lowercase without whitespace")));
}

#[test]
fn test_empty_local_version() {
    let mut config = ProtocolConfig::default();
    config.channel.local_version = "   ".to_string();

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Local version cannot be empty")));
}

#[test]
fn test_ack_check_delay_too_short() {
    let mut config = ProtocolConfig::default();
    config.handshake.ack_check_delay = Duration::from_millis(50);

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Ack check delay too short")));
}

#[test]
fn test_ack_check_delay_too_long() {
    let mut config = ProtocolConfig::default();
    config.handshake.ack_check_delay = Duration::from_secs(900);
    config.handshake.pending_ack_ttl = Duration::from_secs(1800);

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Ack check delay too long")));
}

#[test]
fn test_zero_miss_threshold() {
    let handshake = HandshakeConfig {
        miss_threshold: 0,
        ..HandshakeConfig::default()
    };
    let errors = handshake.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Miss threshold must be greater than 0")));
}

#[test]
fn test_excessive_miss_threshold() {
    let handshake = HandshakeConfig {
        miss_threshold: 1000,
        ..HandshakeConfig::default()
    };
    let errors = handshake.validate();
    assert!(errors.iter().any(|e| e.contains("Miss threshold too large")));
}

#[test]
fn test_pending_ttl_shorter_than_check_delay() {
    let handshake = HandshakeConfig {
        pending_ack_ttl: Duration::from_secs(10),
        ..HandshakeConfig::default()
    };
    let errors = handshake.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Pending ack TTL cannot be shorter")));
}

#[test]
fn test_zero_max_pending_acks() {
    let handshake = HandshakeConfig {
        max_pending_acks: 0,
        ..HandshakeConfig::default()
    };
    let errors = handshake.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Max pending acks must be greater than 0")));
}

#[test]
fn test_logging_empty_app_name() {
    let logging = LoggingConfig {
        app_name: String::new(),
        ..LoggingConfig::default()
    };
    let errors = logging.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Application name cannot be empty")));
}

#[test]
fn test_logging_file_without_path() {
    let logging = LoggingConfig {
        log_to_file: true,
        log_file_path: None,
        ..LoggingConfig::default()
    };
    let errors = logging.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("log_file_path must be specified")));
}

#[test]
fn test_logging_file_missing_directory() {
    let logging = LoggingConfig {
        log_to_file: true,
        log_file_path: Some("/definitely/not/a/real/dir/skins.log".to_string()),
        ..LoggingConfig::default()
    };
    let errors = logging.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Log file directory does not exist")));
}

#[test]
fn test_logging_no_outputs() {
    let logging = LoggingConfig {
        log_to_console: false,
        log_to_file: false,
        ..LoggingConfig::default()
    };
    let errors = logging.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("At least one logging output")));
}

#[test]
fn test_multiple_errors_collected() {
    let config = ProtocolConfig::default_with_overrides(|c| {
        c.channel.name = "bad".to_string();
        c.handshake.miss_threshold = 0;
        c.logging.app_name = String::new();
    });

    let errors = config.validate();
    assert!(errors.len() >= 3, "Expected at least 3 errors: {:?}", errors);
}

#[test]
fn test_validate_strict() {
    assert!(ProtocolConfig::default().validate_strict().is_ok());

    let config = ProtocolConfig::default_with_overrides(|c| c.handshake.max_pending_acks = 0);
    let err = config.validate_strict().expect_err("Invalid config must be rejected");
    assert!(err.to_string().contains("Configuration validation failed"));
}

#[test]
fn test_toml_roundtrip() {
    let config = ProtocolConfig::default_with_overrides(|c| {
        c.channel.local_version = "2.0.0".to_string();
        c.handshake.ack_check_delay = Duration::from_millis(1500);
        c.logging.log_level = Level::DEBUG;
    });

    let text = toml::to_string_pretty(&config).expect("Config should serialize");
    let parsed = ProtocolConfig::from_toml(&text).expect("Config should parse");

    assert_eq!(parsed.channel.local_version, "2.0.0");
    assert_eq!(parsed.handshake.ack_check_delay, Duration::from_millis(1500));
    assert_eq!(parsed.logging.log_level, Level::DEBUG);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let parsed = ProtocolConfig::from_toml(
        r#"
        [channel]
        name = "sr:messagechannel"
        local_version = "15.4.0"
        "#,
    )
    .expect("Partial config should parse");

    assert_eq!(parsed.channel.local_version, "15.4.0");
    assert_eq!(parsed.handshake.miss_threshold, ACK_MISS_THRESHOLD);
    assert!(parsed.validate().is_empty());
}

#[test]
fn test_invalid_log_level_rejected() {
    let result = ProtocolConfig::from_toml(
        r#"
        [logging]
        app_name = "proxy"
        log_level = "loud"
        log_to_console = true
        log_to_file = false
        json_format = false
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_example_config_parses() {
    let example = ProtocolConfig::example_config();
    let parsed = ProtocolConfig::from_toml(&example).expect("Example config should parse");
    assert!(parsed.validate().is_empty());
}

#[test]
fn test_save_and_load_file() {
    let path = std::env::temp_dir().join(format!(
        "skin-channel-config-{}.toml",
        std::process::id()
    ));
    let config = ProtocolConfig::default_with_overrides(|c| c.handshake.miss_threshold = 5);
    config.save_to_file(&path).expect("Config should save");

    let loaded = ProtocolConfig::from_file(&path).expect("Config should load");
    assert_eq!(loaded.handshake.miss_threshold, 5);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_missing_file_is_config_error() {
    let err = ProtocolConfig::from_file("/definitely/not/here.toml")
        .expect_err("Missing file must fail");
    assert!(err.to_string().contains("Failed to open config file"));
}
