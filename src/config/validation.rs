//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check required settings are present (the relay's backend address)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over the parsed config
//! - Runs before any listener is bound

use std::net::SocketAddr;

use axum::http::HeaderValue;
use url::Url;

use crate::config::schema::{
    ListenerConfig, ObservabilityConfig, ProducerConfig, RelayConfig, SourceConfig,
};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("upstream.base_url is required (set it in the config file or BACKEND_BASE_URL)")]
    MissingBackendUrl,

    #[error("upstream.base_url `{0}` is not a valid URL")]
    InvalidBackendUrl(String),

    #[error("upstream.base_url `{0}` must use the http scheme")]
    UnsupportedScheme(String),

    #[error("{field} `{value}` is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("media.id_length must be greater than zero")]
    ZeroIdLength,

    #[error("media.content_type `{0}` is not a valid header value")]
    InvalidContentType(String),

    #[error("source.url_template `{0}` must contain an {{id}} placeholder")]
    MissingIdPlaceholder(String),

    #[error("source.root must not be empty")]
    EmptySourceRoot,
}

/// Validate a relay configuration.
pub fn validate_relay(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_listener(&config.listener, &mut errors);
    check_observability(&config.observability, &mut errors);

    match config.upstream.base_url.as_deref().map(str::trim) {
        None | Some("") => errors.push(ValidationError::MissingBackendUrl),
        Some(raw) => match Url::parse(raw) {
            Ok(url) if url.scheme() != "http" => {
                errors.push(ValidationError::UnsupportedScheme(raw.to_string()));
            }
            Ok(url) if url.cannot_be_a_base() || url.host_str().is_none() => {
                errors.push(ValidationError::InvalidBackendUrl(raw.to_string()));
            }
            Ok(_) => {}
            Err(_) => errors.push(ValidationError::InvalidBackendUrl(raw.to_string())),
        },
    }

    if config.upstream.connect_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroDuration("upstream.connect_timeout_secs"));
    }
    if config.upstream.response_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroDuration("upstream.response_timeout_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a producer configuration.
pub fn validate_producer(config: &ProducerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_listener(&config.listener, &mut errors);
    check_observability(&config.observability, &mut errors);

    if config.media.id_length == 0 {
        errors.push(ValidationError::ZeroIdLength);
    }
    if HeaderValue::from_str(&config.media.content_type).is_err() {
        errors.push(ValidationError::InvalidContentType(
            config.media.content_type.clone(),
        ));
    }

    match &config.source {
        SourceConfig::Directory { root, .. } => {
            if root.as_os_str().is_empty() {
                errors.push(ValidationError::EmptySourceRoot);
            }
        }
        SourceConfig::Http { url_template } => {
            if !url_template.contains("{id}") {
                errors.push(ValidationError::MissingIdPlaceholder(url_template.clone()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_listener(listener: &ListenerConfig, errors: &mut Vec<ValidationError>) {
    if listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: listener.bind_address.clone(),
        });
    }
}

fn check_observability(observability: &ObservabilityConfig, errors: &mut Vec<ValidationError>) {
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relay_with(base_url: Option<&str>) -> RelayConfig {
        let mut config = RelayConfig::default();
        config.upstream.base_url = base_url.map(str::to_string);
        config
    }

    #[test]
    fn missing_backend_is_rejected() {
        let errors = validate_relay(&relay_with(None)).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingBackendUrl]);

        let errors = validate_relay(&relay_with(Some("   "))).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingBackendUrl]);
    }

    #[test]
    fn backend_must_be_plain_http() {
        let errors = validate_relay(&relay_with(Some("https://core:8080"))).unwrap_err();
        assert!(matches!(errors[0], ValidationError::UnsupportedScheme(_)));

        let errors = validate_relay(&relay_with(Some("not a url"))).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidBackendUrl(_)));
    }

    #[test]
    fn valid_relay_passes() {
        assert!(validate_relay(&relay_with(Some("http://core:8080"))).is_ok());
        assert!(validate_relay(&relay_with(Some("http://10.0.0.4:8080/internal/"))).is_ok());
    }

    #[test]
    fn all_errors_are_reported() {
        let mut config = relay_with(None);
        config.listener.bind_address = "nowhere".into();
        config.upstream.response_timeout_secs = Some(0);

        let errors = validate_relay(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn producer_checks() {
        let mut config = ProducerConfig::default();
        assert!(validate_producer(&config).is_ok());

        config.media.id_length = 0;
        config.media.content_type = "video/mp4\n".into();
        config.source = SourceConfig::Http {
            url_template: "http://origin/static".into(),
        };

        let errors = validate_producer(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroIdLength));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidContentType(_))));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::MissingIdPlaceholder(_))));
    }
}
