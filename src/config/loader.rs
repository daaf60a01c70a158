//! Configuration Loader
//!
//! Layers defaults, an optional TOML file and `WINDOWED_BATCHER__*`
//! environment variables into a validated [`CoordinatorConfig`].
//!
//! Nested fields use `__` as the separator, so
//! `WINDOWED_BATCHER__BATCH__WINDOW_DURATION_MS=30000` overrides
//! `batch.window_duration_ms`.

use super::error::{ConfigResult, ConfigurationError};
use super::CoordinatorConfig;
use config::{Config, Environment, File, FileFormat};
use std::path::PathBuf;
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "WINDOWED_BATCHER_CONFIG_PATH";

/// File picked up when present and no explicit path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/windowed-batcher.toml";

const ENV_PREFIX: &str = "WINDOWED_BATCHER";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    env_overrides: Option<config::Map<String, String>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from this file instead of consulting `WINDOWED_BATCHER_CONFIG_PATH`
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Read environment overrides from this map instead of the process
    /// environment. Keys use the same `WINDOWED_BATCHER__SECTION__FIELD` form.
    pub fn with_env_overrides(mut self, vars: config::Map<String, String>) -> Self {
        self.env_overrides = Some(vars);
        self
    }

    pub fn load(self) -> ConfigResult<CoordinatorConfig> {
        let defaults = Config::try_from(&CoordinatorConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        match self.resolve_file()? {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file");
                builder = builder.add_source(File::from(path).format(FileFormat::Toml));
            }
            None => debug!("No configuration file found, using defaults and environment"),
        }

        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(self.env_overrides);

        let config: CoordinatorConfig = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;

        info!(
            window_duration_ms = config.batch.window_duration_ms,
            grace_period_ms = config.batch.grace_period_ms,
            scan_interval_ms = config.batch.scan_interval_ms,
            dispatch_interval_ms = config.batch.dispatch_interval_ms,
            store_backend = ?config.store.backend,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// An explicit path must exist; the default path is optional
    fn resolve_file(&self) -> ConfigResult<Option<PathBuf>> {
        let explicit = self
            .path
            .clone()
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));

        match explicit {
            Some(path) if path.is_file() => Ok(Some(path)),
            Some(path) => Err(ConfigurationError::ConfigFileNotFound {
                path: path.display().to_string(),
            }),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                Ok(default.is_file().then_some(default))
            }
        }
    }
}

/// Load configuration from the default locations
pub fn load_config() -> ConfigResult<CoordinatorConfig> {
    ConfigLoader::new().load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogFormat, StoreBackend};
    use std::io::Write;

    fn no_env() -> config::Map<String, String> {
        config::Map::new()
    }

    #[test]
    fn test_file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[batch]
window_duration_ms = 15000

[store]
backend = "memory"

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_path(file.path())
            .with_env_overrides(no_env())
            .load()
            .unwrap();

        assert_eq!(config.batch.window_duration_ms, 15_000);
        assert_eq!(config.batch.grace_period_ms, 10_000);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[batch]\nscan_interval_ms = 2000\n").unwrap();

        let mut env = no_env();
        env.insert(
            "WINDOWED_BATCHER__BATCH__SCAN_INTERVAL_MS".to_string(),
            "750".to_string(),
        );
        env.insert(
            "WINDOWED_BATCHER__KAFKA__BROKERS".to_string(),
            "broker-1:9092".to_string(),
        );

        let config = ConfigLoader::new()
            .with_path(file.path())
            .with_env_overrides(env)
            .load()
            .unwrap();

        assert_eq!(config.batch.scan_interval_ms, 750);
        assert_eq!(config.kafka.brokers, "broker-1:9092");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = ConfigLoader::new()
            .with_path("/definitely/not/here.toml")
            .with_env_overrides(no_env())
            .load();

        assert!(matches!(
            result,
            Err(ConfigurationError::ConfigFileNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let mut env = no_env();
        env.insert(
            "WINDOWED_BATCHER__BATCH__DISPATCH_INTERVAL_MS".to_string(),
            "0".to_string(),
        );

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[store]\nbackend = \"memory\"").unwrap();

        let result = ConfigLoader::new()
            .with_path(file.path())
            .with_env_overrides(env)
            .load();

        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }
}
