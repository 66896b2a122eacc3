//! Backend producer.
//!
//! # Data Flow
//! ```text
//! GET /download/{id}
//!     → id.rs (well-formedness check, 400 on failure)
//!     → source.rs (resolve to a live stream, 500 on failure)
//!     → server.rs (commit 200 + content type, stream through MeteredStream)
//! ```
//!
//! # Design Decisions
//! - Resolution finishes before the response head is committed
//! - A mid-stream failure ends the body; no second status is ever attempted
//! - Sources are pluggable behind the `MediaSource` trait

pub mod directory;
pub mod error;
pub mod id;
pub mod origin;
pub mod server;
pub mod source;

pub use directory::DirectoryMediaSource;
pub use error::ProducerError;
pub use id::ResourceId;
pub use origin::OriginMediaSource;
pub use server::ProducerServer;
pub use source::{MediaSource, MediaStream, SourceError};
