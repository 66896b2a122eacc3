//! Outbound client for the backend producer.
//!
//! One GET per inbound request, no retries. The response is handed back
//! with its body still unread so the caller can stream it.

use std::error::Error as StdError;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, Response, Uri};
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::{ConfigError, UpstreamConfig, ValidationError};
use crate::http::request::Forwarding;
use crate::relay::error::RelayError;

/// Fixed route on the backend that serves a resource.
pub const DOWNLOAD_SEGMENT: &str = "download";

/// Largest rejection body read into memory. Longer bodies are cut to this
/// length and the rest is discarded.
pub const MAX_REJECTION_BODY: usize = 64 * 1024;

/// Client for the internal backend.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    base: Url,
    response_timeout: Option<Duration>,
}

impl UpstreamClient {
    /// Build a client from validated upstream settings.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ConfigError> {
        let raw = config
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| ConfigError::Validation(vec![ValidationError::MissingBackendUrl]))?;
        let base = Url::parse(raw).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidBackendUrl(raw.to_string())])
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::Validation(vec![
                ValidationError::InvalidBackendUrl(raw.to_string()),
            ]));
        }

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(config.connect_timeout_secs.map(Duration::from_secs));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            base,
            response_timeout: config.response_timeout_secs.map(Duration::from_secs),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `{base}/download/{id}`, with the id encoded as a single path segment.
    pub fn target_url(&self, resource_id: &str) -> Result<Url, RelayError> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| RelayError::unreachable("backend base URL cannot carry a path"))?
            .pop_if_empty()
            .push(DOWNLOAD_SEGMENT)
            .push(resource_id);
        Ok(url)
    }

    /// Fetch a resource from the backend.
    ///
    /// Returns the live response for any 2xx status. Any other status is
    /// read into a [`RelayError::UpstreamRejected`]; a missing response is
    /// a [`RelayError::UpstreamUnreachable`].
    pub async fn fetch(
        &self,
        resource_id: &str,
        forwarding: &Forwarding,
    ) -> Result<Response<Incoming>, RelayError> {
        let url = self.target_url(resource_id)?;
        let uri: Uri = url.as_str().parse().map_err(RelayError::unreachable)?;

        let mut request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .map_err(RelayError::unreachable)?;
        // Bodies must arrive unencoded: content-encoding is not relayed.
        request
            .headers_mut()
            .insert(header::ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        forwarding.apply(request.headers_mut());

        tracing::debug!(
            resource_id = %resource_id,
            url = %url,
            client_ip = %forwarding.client_ip,
            "Forwarding request to backend"
        );

        let pending = self.client.request(request);
        let response = match self.response_timeout {
            Some(limit) => tokio::time::timeout(limit, pending).await.map_err(|_| {
                RelayError::unreachable(format!("no response headers within {limit:?}"))
            })?,
            None => pending.await,
        }
        .map_err(|e| RelayError::unreachable(error_chain(&e)))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let (body, read_error) = read_prefix(response.into_body(), MAX_REJECTION_BODY).await;
        if let Some(e) = read_error {
            tracing::warn!(
                resource_id = %resource_id,
                status = %status,
                bytes = body.len(),
                error = %e,
                "Rejection body ended early"
            );
        }

        Err(RelayError::UpstreamRejected {
            status,
            content_type,
            body,
        })
    }
}

/// Read at most `limit` bytes of a body.
///
/// Returns what was read and, if the body failed before the limit or its
/// end was reached, the error.
async fn read_prefix(body: Incoming, limit: usize) -> (Bytes, Option<axum::Error>) {
    let mut stream = Body::new(body).into_data_stream();
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => return (buf.freeze(), Some(e)),
        };
        let room = limit - buf.len();
        if chunk.len() >= room {
            buf.extend_from_slice(&chunk[..room]);
            break;
        }
        buf.extend_from_slice(&chunk);
    }
    (buf.freeze(), None)
}

/// Render an error with its source chain, e.g.
/// `client error (Connect): tcp connect error: Connection refused`.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
