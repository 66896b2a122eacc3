//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → RelayConfig / ProducerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults except the relay's backend address
//! - Validation failure is fatal before any listener is bound

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, Settings};
pub use schema::{
    ListenerConfig, MediaConfig, ObservabilityConfig, ProducerConfig, RelayConfig, SourceConfig,
    UpstreamConfig,
};
pub use validation::ValidationError;
