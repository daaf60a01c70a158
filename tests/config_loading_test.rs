//! Loading the shipped configuration file and layering overrides on top

use windowed_batcher::config::{
    ConfigLoader, ConfigurationError, CoordinatorConfig, LogFormat, StoreBackend,
};

const SHIPPED_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/windowed-batcher.toml");

fn env(vars: &[(&str, &str)]) -> config::Map<String, String> {
    vars.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_shipped_config_matches_defaults() {
    let config = ConfigLoader::new()
        .with_path(SHIPPED_CONFIG)
        .with_env_overrides(env(&[]))
        .load()
        .unwrap();

    assert_eq!(config, CoordinatorConfig::default());
    assert_eq!(config.batch.key_ttl().as_millis(), 70_000);
}

#[test]
fn test_environment_selects_memory_backend_and_json_logs() {
    let config = ConfigLoader::new()
        .with_path(SHIPPED_CONFIG)
        .with_env_overrides(env(&[
            ("WINDOWED_BATCHER__STORE__BACKEND", "memory"),
            ("WINDOWED_BATCHER__LOGGING__FORMAT", "json"),
            ("WINDOWED_BATCHER__BATCH__GRACE_PERIOD_MS", "2500"),
        ]))
        .load()
        .unwrap();

    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.batch.key_ttl().as_millis(), 62_500);
}

#[test]
fn test_empty_topic_name_is_rejected() {
    let result = ConfigLoader::new()
        .with_path(SHIPPED_CONFIG)
        .with_env_overrides(env(&[("WINDOWED_BATCHER__KAFKA__TOPICS__PRODUCER_EVENT", "")]))
        .load();

    assert!(matches!(
        result,
        Err(ConfigurationError::MissingRequiredField { .. })
    ));
}

#[test]
fn test_zero_window_is_rejected() {
    let result = ConfigLoader::new()
        .with_path(SHIPPED_CONFIG)
        .with_env_overrides(env(&[("WINDOWED_BATCHER__BATCH__WINDOW_DURATION_MS", "0")]))
        .load();

    assert!(matches!(result, Err(ConfigurationError::InvalidValue { .. })));
}
