//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay and producer handlers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the relay to the producer
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
