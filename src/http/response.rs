//! Response construction with a frozen-head guarantee.
//!
//! A response moves through `NotStarted → HeadersSent → BodyStreaming → Closed`.
//! Only [`ResponseHead`] (the `NotStarted` state) exposes status and header
//! setters; turning it into a body-carrying response consumes it, so nothing
//! can alter the head once the first body byte may have gone out.
//!
//! Hop-by-hop and transfer-framing headers from an upstream response are
//! dropped: the body is re-framed by our own transport.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode},
    response::IntoResponse,
};
use bytes::Bytes;
use futures_util::TryStream;

/// Upstream headers never copied onto a client response.
pub static EXCLUDED_HEADERS: [HeaderName; 3] = [
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::CONTENT_ENCODING,
];

/// Whether an upstream header must be dropped when relaying.
pub fn is_excluded(name: &HeaderName) -> bool {
    EXCLUDED_HEADERS.contains(name)
}

/// The head of a response that has not started yet.
#[derive(Debug)]
pub struct ResponseHead {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseHead {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Set a header, replacing any previous value.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Copy every upstream header except the excluded set.
    ///
    /// Multi-valued headers keep all of their values.
    pub fn copy_upstream_headers(&mut self, upstream: &HeaderMap) -> &mut Self {
        for name in upstream.keys() {
            if is_excluded(name) {
                continue;
            }
            self.headers.remove(name);
            for value in upstream.get_all(name) {
                self.headers.append(name.clone(), value.clone());
            }
        }
        self
    }

    /// Commit the head and attach a streamed body.
    pub fn stream<S>(self, body: S) -> StreamingResponse
    where
        S: TryStream + Send + 'static,
        S::Ok: Into<Bytes>,
        S::Error: Into<axum::BoxError>,
    {
        StreamingResponse {
            inner: self.into_response_with(Body::from_stream(body)),
        }
    }

    /// Commit the head with a complete, in-memory body.
    pub fn complete(self, body: impl Into<Body>) -> Response<Body> {
        self.into_response_with(body.into())
    }

    fn into_response_with(self, body: Body) -> Response<Body> {
        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// A response whose head is frozen and whose body is a live stream.
///
/// Offers no way to change status or headers.
#[derive(Debug)]
pub struct StreamingResponse {
    inner: Response<Body>,
}

impl StreamingResponse {
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }
}

impl IntoResponse for StreamingResponse {
    fn into_response(self) -> axum::response::Response {
        self.inner
    }
}

/// A short plain-text response, used for diagnostics.
pub fn plain_text(status: StatusCode, message: impl Into<Body>) -> Response<Body> {
    let mut head = ResponseHead::new(status);
    head.insert_header(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    head.complete(message)
}
