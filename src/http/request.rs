//! Inbound request metadata.
//!
//! # Responsibilities
//! - Generate a request ID for every inbound request (UUID v4)
//! - Capture forwarding metadata (peer address, requested host)
//! - Apply that metadata to the outbound request
//!
//! # Design Decisions
//! - A client-supplied `x-request-id` is kept, not replaced
//! - The requested hostname is taken from `Host` with any port stripped,
//!   falling back to the URI authority (HTTP/2 requests carry no `Host`)

use std::net::{IpAddr, SocketAddr};

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Request ID header, set on the inbound request and forwarded upstream.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Original caller's network address.
pub static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Hostname the caller originally requested.
pub static X_PROXY_HOST: HeaderName = HeaderName::from_static("x-proxy-host");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID of an inbound request, if any.
pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(&X_REQUEST_ID).and_then(|v| v.to_str().ok())
}

/// Forwarding metadata attached to an upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forwarding {
    pub client_ip: IpAddr,
    pub host: Option<String>,
    pub request_id: Option<String>,
}

impl Forwarding {
    /// Capture forwarding metadata from an inbound request.
    pub fn capture(peer: SocketAddr, uri: &Uri, headers: &HeaderMap) -> Self {
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| uri.host())
            .map(hostname)
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        Self {
            client_ip: peer.ip(),
            host,
            request_id: request_id(headers).map(str::to_string),
        }
    }

    /// Write the forwarding headers onto an outbound header map.
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.client_ip.to_string()) {
            headers.insert(X_FORWARDED_FOR.clone(), value);
        }
        if let Some(value) = self.host.as_deref().and_then(|h| HeaderValue::from_str(h).ok()) {
            headers.insert(X_PROXY_HOST.clone(), value);
        }
        if let Some(value) = self
            .request_id
            .as_deref()
            .and_then(|id| HeaderValue::from_str(id).ok())
        {
            headers.insert(X_REQUEST_ID.clone(), value);
        }
    }
}

/// Strip the port from a `Host` header value.
///
/// Handles bracketed IPv6 literals (`[::1]:8080` → `::1`).
pub fn hostname(host: &str) -> &str {
    let host = host.trim();
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}
