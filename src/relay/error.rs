//! Relay error taxonomy.
//!
//! Both variants occur strictly before the client response head is
//! committed, so both render as a clean status + body. Failures after that
//! point never surface here; they end the body stream instead.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::http::response::{plain_text, ResponseHead};

/// Body sent for a rejection that carried no body of its own.
pub const EMPTY_REJECTION_BODY: &str = "Internal service error";

/// Body sent when the backend could not be reached at all.
pub const UNREACHABLE_BODY: &str = "Relay failed to connect to media backend.";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The backend answered with a non-success status; its judgment is propagated.
    #[error("upstream rejected request with status {status}")]
    UpstreamRejected {
        status: StatusCode,
        content_type: Option<HeaderValue>,
        body: Bytes,
    },

    /// The backend never produced a response.
    #[error("upstream unreachable: {cause}")]
    UpstreamUnreachable { cause: String },
}

impl RelayError {
    pub fn unreachable(cause: impl std::fmt::Display) -> Self {
        RelayError::UpstreamUnreachable {
            cause: cause.to_string(),
        }
    }

    /// Status code the client will see.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::UpstreamRejected { status, .. } => *status,
            RelayError::UpstreamUnreachable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short outcome label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::UpstreamRejected { .. } => "rejected",
            RelayError::UpstreamUnreachable { .. } => "unreachable",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::UpstreamRejected {
                status,
                content_type,
                body,
            } => {
                if body.is_empty() {
                    return plain_text(status, EMPTY_REJECTION_BODY);
                }
                let mut head = ResponseHead::new(status);
                head.insert_header(
                    header::CONTENT_TYPE,
                    content_type
                        .unwrap_or_else(|| HeaderValue::from_static("text/plain; charset=utf-8")),
                );
                head.complete(Body::from(body))
            }
            RelayError::UpstreamUnreachable { .. } => {
                plain_text(StatusCode::INTERNAL_SERVER_ERROR, UNREACHABLE_BODY)
            }
        }
    }
}
