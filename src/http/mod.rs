//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → request.rs (request ID, forwarding metadata)
//!     → [relay or producer handler]
//!     → response.rs (frozen-head response, hop-by-hop filtering)
//!     → stream.rs (metered body stream)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod stream;

pub use request::{Forwarding, MakeRequestUuid, X_REQUEST_ID};
pub use response::{ResponseHead, StreamingResponse};
pub use server::HttpServer;
pub use stream::{MeteredStream, StreamRole};
