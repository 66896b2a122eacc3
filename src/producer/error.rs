//! Producer error taxonomy.
//!
//! Every variant is raised before the response head is committed. Failures
//! during streaming end the body instead and never reach this type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::http::response::plain_text;
use crate::producer::id::InvalidResourceId;
use crate::producer::source::SourceError;

/// Body sent for malformed resource ids.
pub const INVALID_ID_BODY: &str = "Invalid video ID";

/// Body sent when a well-formed id cannot be resolved.
pub const RESOLUTION_FAILED_BODY: &str = "Could not fetch video information.";

#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    #[error(transparent)]
    InvalidId(#[from] InvalidResourceId),

    #[error("resolution failed: {0}")]
    Resolution(#[from] SourceError),
}

impl ProducerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProducerError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ProducerError::Resolution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProducerError {
    fn into_response(self) -> Response {
        let body = match &self {
            ProducerError::InvalidId(_) => INVALID_ID_BODY,
            ProducerError::Resolution(_) => RESOLUTION_FAILED_BODY,
        };
        plain_text(self.status(), body)
    }
}
