//! Tests for configuration validation

use signaling_queue::config::queue::{ENV_PRIORITIES, ENV_RETRY_DELAY_MS, ENV_SETTLE_DELAY_MS};
use signaling_queue::config::QueueConfig;

#[test]
fn test_default_config() {
    let cfg = QueueConfig::default();
    assert_eq!(cfg.retry_delay_ms, 100);
    assert_eq!(cfg.settle_delay_ms, 5);
    assert_eq!(
        cfg.priorities,
        vec![
            "apply-candidate",
            "set-local-description",
            "set-remote-description",
            "create-answer",
            "create-offer",
        ]
    );
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_config_invalid_retry_delay() {
    let invalid = QueueConfig {
        retry_delay_ms: 0,
        ..QueueConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_invalid_settle_delay() {
    let invalid = QueueConfig {
        settle_delay_ms: 0,
        ..QueueConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_duplicate_priority() {
    let invalid = QueueConfig {
        priorities: vec!["create-offer".into(), "create-offer".into()],
        ..QueueConfig::default()
    };
    let err = invalid.validate().unwrap_err();
    assert!(err.contains("create-offer"));
}

#[test]
fn test_config_empty_priority_name() {
    let invalid = QueueConfig {
        priorities: vec![" ".into()],
        ..QueueConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_from_json_str_fills_defaults() {
    let cfg = QueueConfig::from_json_str(r#"{"retry_delay_ms": 250}"#).unwrap();
    assert_eq!(cfg.retry_delay_ms, 250);
    assert_eq!(cfg.settle_delay_ms, 5);
    assert_eq!(cfg.retry_delay(), std::time::Duration::from_millis(250));
}

#[test]
fn test_from_json_str_rejects_invalid() {
    assert!(QueueConfig::from_json_str(r#"{"settle_delay_ms": 0}"#).is_err());
    assert!(QueueConfig::from_json_str("not json").is_err());
}

#[test]
fn test_from_env_overrides() {
    std::env::set_var(ENV_RETRY_DELAY_MS, "40");
    std::env::set_var(ENV_SETTLE_DELAY_MS, " 2 ");
    std::env::set_var(ENV_PRIORITIES, "create-offer, apply-candidate,");
    let cfg = QueueConfig::from_env();
    std::env::remove_var(ENV_RETRY_DELAY_MS);
    std::env::remove_var(ENV_SETTLE_DELAY_MS);
    std::env::remove_var(ENV_PRIORITIES);

    let cfg = cfg.unwrap();
    assert_eq!(cfg.retry_delay_ms, 40);
    assert_eq!(cfg.settle_delay_ms, 2);
    assert_eq!(cfg.priorities, vec!["create-offer", "apply-candidate"]);
}
