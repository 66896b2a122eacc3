//! Metered body streams.
//!
//! [`MeteredStream`] sits between a source of body chunks (an upstream
//! response, a media file) and the client connection. It only pulls the
//! inner stream when the transport polls it for the next chunk, so a slow
//! client stalls upstream reads instead of growing a buffer.
//!
//! # States
//! ```text
//! Streaming → Closed     inner stream ended
//! Streaming → Failed     inner stream errored; the error is yielded once
//!                        so the transport aborts the connection, then the
//!                        stream ends
//! dropped while Streaming: the client went away; logged as a cancellation
//! ```

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use futures_util::Stream;

use crate::observability::metrics;

/// Which side of the chain a stream belongs to, for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRole {
    /// Gateway relay forwarding an upstream body to a client.
    Relay,
    /// Backend producer streaming resolved media.
    Producer,
}

impl StreamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamRole::Relay => "relay",
            StreamRole::Producer => "producer",
        }
    }
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a streamed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Streaming,
    Closed,
    Failed,
}

/// A byte stream wrapper that tracks progress and logs the outcome once.
pub struct MeteredStream<S> {
    inner: S,
    role: StreamRole,
    resource_id: String,
    bytes: u64,
    state: StreamState,
    started: Instant,
}

impl<S> MeteredStream<S> {
    pub fn new(inner: S, role: StreamRole, resource_id: impl Into<String>) -> Self {
        Self {
            inner,
            role,
            resource_id: resource_id.into(),
            bytes: 0,
            state: StreamState::Streaming,
            started: Instant::now(),
        }
    }

    /// Bytes forwarded so far.
    pub fn bytes_forwarded(&self) -> u64 {
        self.bytes
    }

    pub fn state(&self) -> StreamState {
        self.state
    }
}

impl<S, E> Stream for MeteredStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: fmt::Display,
{
    type Item = Result<Bytes, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.state != StreamState::Streaming {
            return Poll::Ready(None);
        }

        match Pin::new(&mut self.inner).poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => {
                self.bytes += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(err))) => {
                self.state = StreamState::Failed;
                tracing::warn!(
                    role = %self.role,
                    resource_id = %self.resource_id,
                    bytes = self.bytes,
                    error = %err,
                    "Stream aborted after headers were committed"
                );
                metrics::record_stream_end(self.role.as_str(), "failed", self.bytes);
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                self.state = StreamState::Closed;
                tracing::info!(
                    role = %self.role,
                    resource_id = %self.resource_id,
                    bytes = self.bytes,
                    elapsed_ms = self.started.elapsed().as_millis() as u64,
                    "Successfully streamed resource"
                );
                metrics::record_stream_end(self.role.as_str(), "completed", self.bytes);
                Poll::Ready(None)
            }
        }
    }
}

impl<S> Drop for MeteredStream<S> {
    fn drop(&mut self) {
        if self.state == StreamState::Streaming {
            tracing::info!(
                role = %self.role,
                resource_id = %self.resource_id,
                bytes = self.bytes,
                "Client disconnected, releasing stream"
            );
            metrics::record_stream_end(self.role.as_str(), "cancelled", self.bytes);
        }
    }
}
