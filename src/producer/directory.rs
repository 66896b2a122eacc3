//! Local directory media source.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::producer::id::ResourceId;
use crate::producer::source::{MediaSource, MediaStream, SourceError};

/// Serves `{root}/{id}.{extension}`.
#[derive(Debug, Clone)]
pub struct DirectoryMediaSource {
    root: PathBuf,
    extension: String,
    content_type: String,
}

impl DirectoryMediaSource {
    pub fn new(root: PathBuf, extension: String, content_type: String) -> Self {
        Self {
            root,
            extension,
            content_type,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &ResourceId) -> PathBuf {
        if self.extension.is_empty() {
            self.root.join(id.as_str())
        } else {
            self.root.join(format!("{}.{}", id, self.extension))
        }
    }
}

#[async_trait]
impl MediaSource for DirectoryMediaSource {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn open(&self, id: &ResourceId) -> Result<MediaStream, SourceError> {
        let path = self.path_for(id);
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound(id.to_string()));
            }
            Err(e) => return Err(SourceError::Io(e)),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(SourceError::NotFound(id.to_string()));
        }

        tracing::debug!(path = %path.display(), bytes = metadata.len(), "Opened media file");

        Ok(MediaStream {
            content_type: self.content_type.clone(),
            content_length: Some(metadata.len()),
            body: ReaderStream::new(file).boxed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    fn source(root: &Path) -> DirectoryMediaSource {
        DirectoryMediaSource::new(root.to_path_buf(), "mp4".into(), "video/mp4".into())
    }

    #[tokio::test]
    async fn streams_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let bytes: Vec<u8> = (0..=255u8).cycle().take(20_000).collect();
        std::fs::write(dir.path().join("dQw4w9WgXcQ.mp4"), &bytes).unwrap();

        let id = ResourceId::parse("dQw4w9WgXcQ", 11).unwrap();
        let media = source(dir.path()).open(&id).await.unwrap();
        assert_eq!(media.content_type, "video/mp4");
        assert_eq!(media.content_length, Some(20_000));

        let chunks: Vec<_> = media.body.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), bytes);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let id = ResourceId::parse("dQw4w9WgXcQ", 11).unwrap();

        let err = source(dir.path()).open(&id).await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[tokio::test]
    async fn directories_are_not_media() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("dQw4w9WgXcQ.mp4")).unwrap();
        let id = ResourceId::parse("dQw4w9WgXcQ", 11).unwrap();

        let err = source(dir.path()).open(&id).await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }
}
