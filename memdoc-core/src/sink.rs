//! Persistence sinks for snapshots and bulk imports.
//!
//! A sink is an opaque byte location with read and write operations. The store
//! never looks at paths or files itself; it hands whole byte sequences to a
//! [`PersistenceSink`] and gets whole byte sequences back.
//!
//! # Implementations
//!
//! - [`FileSink`] - a single file, written atomically (temp file + rename)
//! - [`MemorySink`] - bytes kept in process, for tests and embedding
//!
//! # Example
//!
//! ```ignore
//! use memdoc_core::sink::{FileSink, PersistenceSink};
//!
//! let sink = FileSink::new("./memdocstorage.json");
//! sink.write(b"[]").await?;
//! assert_eq!(sink.read().await?, Some(b"[]".to_vec()));
//! ```

use async_trait::async_trait;
use mea::rwlock::RwLock;
use std::{
    fmt::Debug,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::DocumentStoreResult;

/// Default location of the snapshot written by `DocumentStore::save`.
pub const DEFAULT_SNAPSHOT_PATH: &str = "./memdocstorage.json";

/// Abstract byte sink used for snapshots and bulk imports.
///
/// Implementations must be thread-safe. Callers serialize concurrent writes
/// themselves; a sink only has to make each single write all-or-nothing.
#[async_trait]
pub trait PersistenceSink: Send + Sync + Debug {
    /// Reads the whole content of the sink.
    ///
    /// Returns `Ok(None)` if nothing has been written there yet.
    async fn read(&self) -> DocumentStoreResult<Option<Vec<u8>>>;

    /// Replaces the whole content of the sink.
    async fn write(&self, bytes: &[u8]) -> DocumentStoreResult<()>;

    /// Describes where the bytes live, for diagnostics.
    fn location(&self) -> String;
}

#[async_trait]
impl<S> PersistenceSink for Arc<S>
where
    S: PersistenceSink + ?Sized,
{
    async fn read(&self) -> DocumentStoreResult<Option<Vec<u8>>> {
        (**self).read().await
    }

    async fn write(&self, bytes: &[u8]) -> DocumentStoreResult<()> {
        (**self).write(bytes).await
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

/// A sink backed by one file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Creates a sink for the given path. The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");

        self.path.with_file_name(name)
    }
}

/// The directory holding `path`; a bare file name lives in the working directory.
#[cfg_attr(not(unix), allow(dead_code))]
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_PATH)
    }
}

#[async_trait]
impl PersistenceSink for FileSink {
    async fn read(&self) -> DocumentStoreResult<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Sink file does not exist");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&self, bytes: &[u8]) -> DocumentStoreResult<()> {
        let temp = self.temp_path();

        let mut file = tokio::fs::File::create(&temp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp, &self.path).await?;

        #[cfg(unix)]
        tokio::fs::File::open(parent_dir(&self.path)).await?.sync_all().await?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Wrote sink");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// A sink that keeps its bytes in memory.
///
/// Clones share the same buffer, so a clone handed to a store can be inspected
/// from the outside.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    bytes: Arc<RwLock<Option<Vec<u8>>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that already holds the given bytes.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::new(RwLock::new(Some(bytes.into()))),
        }
    }
}

#[async_trait]
impl PersistenceSink for MemorySink {
    async fn read(&self) -> DocumentStoreResult<Option<Vec<u8>>> {
        Ok(self.bytes.read().await.clone())
    }

    async fn write(&self, bytes: &[u8]) -> DocumentStoreResult<()> {
        *self.bytes.write().await = Some(bytes.to_vec());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocumentStoreError;

    #[tokio::test]
    async fn test_file_sink_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("absent.json"));

        assert_eq!(sink.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_sink_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("snapshot.json"));

        sink.write(b"[1]").await.unwrap();
        sink.write(b"[2]").await.unwrap();

        assert_eq!(sink.read().await.unwrap(), Some(b"[2]".to_vec()));
        assert!(!dir.path().join("snapshot.json.tmp").exists());
    }

    #[test]
    fn test_parent_dir_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("memdocstorage.json")), Path::new("."));
        assert_eq!(parent_dir(Path::new("/var/lib/memdoc.json")), Path::new("/var/lib"));
    }

    #[tokio::test]
    async fn test_file_sink_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("absent").join("snapshot.json"));

        assert!(matches!(sink.write(b"[]").await, Err(DocumentStoreError::Io(_))));
        assert_eq!(sink.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_sink_clones_share_bytes() {
        let sink = MemorySink::new();
        let observer = sink.clone();

        assert_eq!(observer.read().await.unwrap(), None);
        sink.write(b"{}").await.unwrap();
        assert_eq!(observer.read().await.unwrap(), Some(b"{}".to_vec()));
    }
}
