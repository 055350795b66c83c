//! Artifact delivery.

use crate::diagnostics::{Reporter, SharedSink};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const COMPONENT: &str = "roadmap_export::sink";

/// Receives finished artifacts.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Persist `data` under `filename`. Either the whole artifact is stored
    /// or nothing is.
    async fn save(&self, filename: &str, data: &[u8]) -> Result<()>;
}

/// Writes artifacts into a directory.
///
/// Data goes to a hidden temporary file first and is renamed into place
/// once fully written, so a failed save never leaves a partial artifact.
pub struct FileSink {
    dir: PathBuf,
    reporter: Reporter,
}

impl FileSink {
    /// Sink writing into `dir`, created on first save.
    pub fn new(dir: impl Into<PathBuf>, sink: SharedSink) -> Self {
        Self {
            dir: dir.into(),
            reporter: Reporter::new(sink, COMPONENT),
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write_atomically(&self, filename: &str, data: &[u8]) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let target = self.dir.join(filename);
        let temp = self
            .dir
            .join(format!(".{}.{}.part", filename, uuid::Uuid::new_v4().simple()));

        if let Err(err) = tokio::fs::write(&temp, data).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(err);
        }
        if let Err(err) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(err);
        }
        Ok(target)
    }
}

#[async_trait]
impl ArtifactSink for FileSink {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<()> {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(Error::save(filename, "filename must be a bare file name"));
        }
        let path = self
            .write_atomically(filename, data)
            .await
            .map_err(|e| Error::save(filename, e.to_string()))?;
        self.reporter
            .info(format!("Saved {} ({} bytes)", path.display(), data.len()));
        Ok(())
    }
}

/// An artifact held by [`MemoryArtifactSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct SavedArtifact {
    /// Filename it was saved under
    pub filename: String,
    /// Contents
    pub data: bytes::Bytes,
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemoryArtifactSink {
    saved: Mutex<Vec<SavedArtifact>>,
}

impl MemoryArtifactSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything saved so far, in order.
    pub fn artifacts(&self) -> Vec<SavedArtifact> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of saved artifacts.
    pub fn len(&self) -> usize {
        self.saved.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// True when nothing was saved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ArtifactSink for MemoryArtifactSink {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| Error::save(filename, "artifact store poisoned"))?;
        saved.push(SavedArtifact {
            filename: filename.to_string(),
            data: bytes::Bytes::copy_from_slice(data),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use log::Level;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_file_sink_writes_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let diagnostics = Arc::new(MemorySink::new());
        let sink = FileSink::new(dir.path().join("out"), diagnostics.clone());

        sink.save("roadmap-track.pdf", b"%PDF-1.7").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("out"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["roadmap-track.pdf".to_string()]);
        assert_eq!(
            std::fs::read(dir.path().join("out/roadmap-track.pdf")).unwrap(),
            b"%PDF-1.7"
        );
        assert!(diagnostics.contains(Level::Info, "8 bytes"));
    }

    #[tokio::test]
    async fn test_file_sink_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path(), Arc::new(MemorySink::new()));
        let err = sink.save("../escape.pdf", b"x").await.unwrap_err();
        assert!(matches!(err, Error::Save { .. }));
    }

    #[tokio::test]
    async fn test_file_sink_reports_unwritable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let sink = FileSink::new(&blocker, Arc::new(MemorySink::new()));
        let err = sink.save("a.png", b"x").await.unwrap_err();
        match err {
            Error::Save { filename, .. } => assert_eq!(filename, "a.png"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_memory_sink_keeps_order() {
        let sink = MemoryArtifactSink::new();
        sink.save("a.pdf", b"1").await.unwrap();
        sink.save("b.png", b"2").await.unwrap();
        let names: Vec<_> = sink.artifacts().into_iter().map(|a| a.filename).collect();
        assert_eq!(names, vec!["a.pdf", "b.png"]);
    }
}
