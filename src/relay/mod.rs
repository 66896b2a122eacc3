//! Gateway relay.
//!
//! # Data Flow
//! ```text
//! GET /stream/{id}
//!     → upstream.rs (GET {base}/download/{id} + forwarding headers)
//!     → 2xx: copy headers (minus hop-by-hop), stream body through MeteredStream
//!     → otherwise: error.rs (rejected → verbatim, unreachable → 500)
//! ```
//!
//! # Design Decisions
//! - Exactly one upstream attempt per inbound request
//! - The body is never buffered; the client's write readiness paces upstream reads
//! - Dropping the client stream drops the upstream body, releasing its connection

pub mod error;
pub mod upstream;

use axum::body::Body;
use axum::http::Response;
use hyper::body::Incoming;

use crate::http::response::{ResponseHead, StreamingResponse};
use crate::http::stream::{MeteredStream, StreamRole};

pub use error::RelayError;
pub use upstream::UpstreamClient;

/// Map a live upstream response onto the client response.
pub fn forward(resource_id: &str, upstream: Response<Incoming>) -> StreamingResponse {
    let (parts, body) = upstream.into_parts();

    let mut head = ResponseHead::new(parts.status);
    head.copy_upstream_headers(&parts.headers);

    head.stream(MeteredStream::new(
        Body::new(body).into_data_stream(),
        StreamRole::Relay,
        resource_id,
    ))
}
