//! Media stream relay.
//!
//! A public gateway relays `GET /stream/{id}` to an internal producer's
//! `GET /download/{id}` and streams the bytes back as if they originated at
//! the gateway.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod producer;
pub mod relay;

pub use config::{ProducerConfig, RelayConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use producer::ProducerServer;
