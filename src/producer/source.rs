//! Media sources.
//!
//! A [`MediaSource`] resolves a validated [`ResourceId`] into a live byte
//! stream. Resolution either fully succeeds (a stream handle exists, nothing
//! has been sent yet) or fails; there is no partial success.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

use crate::config::{ProducerConfig, SourceConfig};
use crate::producer::directory::DirectoryMediaSource;
use crate::producer::id::ResourceId;
use crate::producer::origin::OriginMediaSource;

/// Single-pass, non-seekable media bytes.
pub type MediaBody = BoxStream<'static, io::Result<Bytes>>;

/// A resolved media item, ready to stream.
pub struct MediaStream {
    /// Declared content type.
    pub content_type: String,
    /// Total length, when the source knows it up front.
    pub content_length: Option<u64>,
    pub body: MediaBody,
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Why a resource could not be resolved.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("resource {0} not found")]
    NotFound(String),

    #[error("origin answered {status} for resource {id}")]
    Origin { id: String, status: u16 },

    #[error("origin request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Resolves resource ids to byte streams.
#[async_trait]
pub trait MediaSource: Send + Sync + 'static {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Resolve and open the resource. Nothing is streamed yet.
    async fn open(&self, id: &ResourceId) -> Result<MediaStream, SourceError>;
}

/// Build the source selected by the configuration.
pub fn from_config(config: &ProducerConfig) -> Result<Arc<dyn MediaSource>, SourceError> {
    let content_type = config.media.content_type.clone();
    let source: Arc<dyn MediaSource> = match &config.source {
        SourceConfig::Directory { root, extension } => Arc::new(DirectoryMediaSource::new(
            root.clone(),
            extension.clone(),
            content_type,
        )),
        SourceConfig::Http { url_template } => Arc::new(OriginMediaSource::new(
            url_template.clone(),
            content_type,
        )?),
    };
    Ok(source)
}
