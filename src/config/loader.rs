//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::config::schema::{ProducerConfig, RelayConfig, SourceConfig};
use crate::config::validation::{validate_producer, validate_relay, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A component configuration that can be loaded, overridden and validated.
pub trait Settings: DeserializeOwned + Default {
    /// Apply environment overrides. `lookup` returns the value of a variable, if set.
    fn apply_env(&mut self, lookup: &dyn Fn(&str) -> Option<String>);

    /// Semantic validation.
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

impl Settings for RelayConfig {
    fn apply_env(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT") {
            self.listener.bind_address = format!("0.0.0.0:{}", port.trim());
        }
        // `YTDLP_CORE_HOST` is the name older deployments use.
        if let Some(url) = lookup("BACKEND_BASE_URL").or_else(|| lookup("YTDLP_CORE_HOST")) {
            self.upstream.base_url = Some(url);
        }
    }

    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        validate_relay(self)
    }
}

impl Settings for ProducerConfig {
    fn apply_env(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT") {
            self.listener.bind_address = format!("0.0.0.0:{}", port.trim());
        }
        if let Some(root) = lookup("MEDIA_ROOT") {
            let extension = match &self.source {
                SourceConfig::Directory { extension, .. } => extension.clone(),
                SourceConfig::Http { .. } => "mp4".to_string(),
            };
            self.source = SourceConfig::Directory {
                root: PathBuf::from(root),
                extension,
            };
        }
    }

    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        validate_producer(self)
    }
}

/// Load, override and validate a configuration.
///
/// With no path the defaults are used as the base. Environment overrides
/// are applied from the process environment.
pub fn load_config<T: Settings>(path: Option<&Path>) -> Result<T, ConfigError> {
    load_config_with(path, &|key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with<T: Settings>(
    path: Option<&Path>,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<T, ConfigError> {
    let mut config: T = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => T::default(),
    };

    config.apply_env(lookup);
    config.validate().map_err(ConfigError::Validation)?;

    Ok(config)
}
