//! Configuration schema definitions.
//!
//! This module defines the configuration structures for both components.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default listen address of the gateway relay.
pub const DEFAULT_RELAY_BIND: &str = "0.0.0.0:10000";

/// Default listen address of the backend producer.
pub const DEFAULT_PRODUCER_BIND: &str = "0.0.0.0:8080";

/// Root configuration for the gateway relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Internal backend the relay forwards to.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::with_address(DEFAULT_RELAY_BIND),
            upstream: UpstreamConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Root configuration for the backend producer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProducerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where media bytes come from.
    pub source: SourceConfig,

    /// Identifier and content settings.
    pub media: MediaConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::with_address(DEFAULT_PRODUCER_BIND),
            source: SourceConfig::default(),
            media: MediaConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:10000").
    pub bind_address: String,
}

impl ListenerConfig {
    pub fn with_address(address: &str) -> Self {
        Self {
            bind_address: address.to_string(),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::with_address(DEFAULT_RELAY_BIND)
    }
}

/// Upstream (backend producer) settings for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base address of the internal backend, e.g. "http://producer:8080".
    /// Required: the relay refuses to start without it.
    pub base_url: Option<String>,

    /// Bound on TCP connection establishment. Unbounded when absent.
    pub connect_timeout_secs: Option<u64>,

    /// Bound on the wait for upstream response headers. Unbounded when absent.
    /// Never applies to body streaming.
    pub response_timeout_secs: Option<u64>,
}

/// Media source selection for the producer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Serve `{root}/{id}.{extension}` from local disk.
    Directory {
        root: PathBuf,
        #[serde(default = "default_extension")]
        extension: String,
    },
    /// Stream from an origin URL; `{id}` in the template is replaced by the resource id.
    Http { url_template: String },
}

fn default_extension() -> String {
    "mp4".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Directory {
            root: PathBuf::from("media"),
            extension: default_extension(),
        }
    }
}

/// Resource identifier and content settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Exact length a well-formed resource id must have.
    pub id_length: usize,

    /// Content type declared for streamed media.
    pub content_type: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            id_length: 11,
            content_type: "video/mp4".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:10000");
        assert!(config.upstream.base_url.is_none());
        assert!(config.upstream.response_timeout_secs.is_none());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn producer_minimal_file() {
        let config: ProducerConfig = toml::from_str(
            r#"
            [source]
            kind = "http"
            url_template = "http://origin.internal/media/{id}"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.media.id_length, 11);
        assert!(matches!(config.source, SourceConfig::Http { .. }));
    }

    #[test]
    fn directory_source_defaults_extension() {
        let config: ProducerConfig = toml::from_str(
            r#"
            [source]
            kind = "directory"
            root = "/srv/media"
            "#,
        )
        .unwrap();

        match config.source {
            SourceConfig::Directory { root, extension } => {
                assert_eq!(root, PathBuf::from("/srv/media"));
                assert_eq!(extension, "mp4");
            }
            other => panic!("unexpected source: {other:?}"),
        }
    }
}
