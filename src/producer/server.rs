//! HTTP server for the backend producer.
//!
//! Per request: `received → validating → {rejected | resolving}`, then
//! `resolving → {resolved-streaming | resolution-failed}`. The response head
//! (200 + content type) is committed only once a stream handle exists.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ProducerConfig;
use crate::http::request::{self, X_FORWARDED_FOR, X_PROXY_HOST};
use crate::http::response::{ResponseHead, StreamingResponse};
use crate::http::server::{health, serve, with_middleware};
use crate::http::stream::{MeteredStream, StreamRole};
use crate::producer::error::ProducerError;
use crate::producer::id::ResourceId;
use crate::producer::source::{self, MediaSource, MediaStream, SourceError};

/// Application state injected into producer handlers.
#[derive(Clone)]
pub struct ProducerState {
    pub source: Arc<dyn MediaSource>,
    pub id_length: usize,
}

/// HTTP server for the backend producer.
pub struct ProducerServer {
    router: Router,
    config: ProducerConfig,
}

impl ProducerServer {
    /// Create a producer using the source named in the configuration.
    pub fn new(config: ProducerConfig) -> Result<Self, SourceError> {
        let source = source::from_config(&config)?;
        Ok(Self::with_source(config, source))
    }

    /// Create a producer backed by an explicit media source.
    pub fn with_source(config: ProducerConfig, source: Arc<dyn MediaSource>) -> Self {
        tracing::info!(source = source.name(), "Media source ready");
        let state = ProducerState {
            source,
            id_length: config.media.id_length,
        };
        Self {
            router: Self::build_router(state),
            config,
        }
    }

    fn build_router(state: ProducerState) -> Router {
        let router = Router::new()
            .route("/download/{resource_id}", get(download_handler))
            .route("/health", get(|| health("media-producer")))
            .with_state(state);
        with_middleware(router)
    }

    /// The configured router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        serve(listener, self.router, shutdown).await
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }
}

async fn download_handler(
    State(state): State<ProducerState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let header_str = |name: &HeaderName| headers.get(name).and_then(|v| v.to_str().ok());
    tracing::debug!(
        request_id = request::request_id(&headers).unwrap_or("unknown"),
        forwarded_for = header_str(&X_FORWARDED_FOR).unwrap_or("-"),
        proxy_host = header_str(&X_PROXY_HOST).unwrap_or("-"),
        resource_id = %raw_id,
        "Download requested"
    );

    match resolve(&state, &raw_id).await {
        Ok((id, media)) => stream_media(&id, media).into_response(),
        Err(err) => {
            match &err {
                ProducerError::InvalidId(_) => {
                    tracing::info!(resource_id = %raw_id, "Rejected malformed resource id");
                }
                ProducerError::Resolution(cause) => {
                    tracing::error!(resource_id = %raw_id, error = %cause, "Could not resolve resource");
                }
            }
            err.into_response()
        }
    }
}

async fn resolve(
    state: &ProducerState,
    raw_id: &str,
) -> Result<(ResourceId, MediaStream), ProducerError> {
    let id = ResourceId::parse(raw_id, state.id_length)?;
    let media = state.source.open(&id).await?;
    Ok((id, media))
}

/// Commit 200 + content headers, then stream.
fn stream_media(id: &ResourceId, media: MediaStream) -> StreamingResponse {
    let mut head = ResponseHead::new(StatusCode::OK);
    head.insert_header(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&media.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    if let Some(length) = media.content_length {
        head.insert_header(header::CONTENT_LENGTH, HeaderValue::from(length));
    }

    head.stream(MeteredStream::new(
        media.body,
        StreamRole::Producer,
        id.as_str(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use bytes::Bytes;
    use futures_util::{stream, StreamExt};
    use tower::ServiceExt;

    use crate::http::request::X_REQUEST_ID;

    struct FixedSource;

    #[async_trait]
    impl MediaSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn open(&self, id: &ResourceId) -> Result<MediaStream, SourceError> {
            if id.as_str() == "missing0000" {
                return Err(SourceError::NotFound(id.to_string()));
            }
            Ok(MediaStream {
                content_type: "video/mp4".into(),
                content_length: Some(4),
                body: stream::iter(vec![Ok(Bytes::from_static(b"mp4!"))]).boxed(),
            })
        }
    }

    fn router() -> Router {
        ProducerServer::with_source(ProducerConfig::default(), Arc::new(FixedSource)).router()
    }

    async fn fetch(uri: &str) -> (StatusCode, HeaderMap, Bytes) {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        (status, headers, body)
    }

    #[tokio::test]
    async fn streams_resolved_media() {
        let (status, headers, body) = fetch("/download/dQw4w9WgXcQ").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(headers[header::CONTENT_LENGTH], "4");
        assert_eq!(&body[..], b"mp4!");
    }

    #[tokio::test]
    async fn malformed_id_is_400() {
        let (status, _, body) = fetch("/download/!!!").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(&body[..], b"Invalid video ID");
    }

    #[tokio::test]
    async fn unresolvable_id_is_500() {
        let (status, _, body) = fetch("/download/missing0000").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(&body[..], b"Could not fetch video information.");
    }

    #[tokio::test]
    async fn responses_carry_request_ids() {
        let (_, headers, _) = fetch("/health").await;
        assert!(headers.contains_key(&X_REQUEST_ID));
    }
}
