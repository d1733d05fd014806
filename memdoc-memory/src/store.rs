//! The shared in-memory document store.
//!
//! A [`DocumentStore`] owns one ordered sequence of records holding every
//! collection, interleaved in insertion order. Collection handles obtained from
//! the store borrow it and scope their operations by the `collection` field.

use async_trait::async_trait;
use mea::{mutex::Mutex, rwlock::RwLock};
use std::{fmt, path::PathBuf, sync::Arc};

use memdoc_core::{
    builder::StoreBuilder,
    error::DocumentStoreResult,
    naming::{CollectionName, CollectionRef},
    record::{Record, RecordType},
    sink::{FileSink, PersistenceSink},
};

use crate::collection::Collection;

/// Thread-safe in-memory document store.
///
/// # Thread Safety
///
/// `DocumentStore` is cloneable and uses `Arc`-wrapped internal state; clones share
/// the same records and sink. Every read-modify-write on the record sequence runs
/// under one exclusive lock, so concurrent handles never observe a half-compacted
/// sequence. Snapshot saves and loads are additionally serialized by a sink lock
/// that is always taken before the record lock.
///
/// # Example
///
/// ```ignore
/// use memdoc_memory::DocumentStore;
/// use memdoc_core::predicate::Predicate;
/// use serde_json::json;
///
/// let store = DocumentStore::new();
/// let users = store.collection("user")?;
///
/// users.insert_one(&json!({ "name": "John", "age": 35 })).await?;
/// let john = users.find(Predicate::new().eq("age", 35)).first().await?;
/// ```
#[derive(Clone)]
pub struct DocumentStore {
    /// All records of all collections, in insertion order
    records: Arc<RwLock<Vec<Record>>>,
    /// Where `save` and `load` put and take snapshots
    sink: Arc<dyn PersistenceSink>,
    /// Serializes snapshot IO
    sink_lock: Arc<Mutex<()>>,
}

impl DocumentStore {
    /// Creates an empty store that snapshots to the default file location.
    pub fn new() -> Self {
        Self::with_sink(Arc::new(FileSink::default()))
    }

    fn with_sink(sink: Arc<dyn PersistenceSink>) -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            sink,
            sink_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Creates a builder for configuring the snapshot sink.
    pub fn builder() -> DocumentStoreBuilder {
        DocumentStoreBuilder::default()
    }

    /// Gets a handle on the collection with the given name or record type.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::PreconditionViolation`](memdoc_core::error::DocumentStoreError::PreconditionViolation)
    /// if the name is empty.
    pub fn collection<'a>(&'a self, reference: impl Into<CollectionRef>) -> DocumentStoreResult<Collection<'a>> {
        Ok(Collection::new(CollectionName::resolve(reference)?, self))
    }

    /// Gets a handle on the collection named after a record type.
    pub fn typed_collection<'a, R: RecordType>(&'a self) -> Collection<'a> {
        Collection::new(CollectionName::of::<R>(), self)
    }

    /// Number of records across all collections.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if no collection holds any record.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Returns a copy of every record, in store order.
    pub async fn records(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }

    /// Returns the snapshot sink.
    pub fn sink(&self) -> &dyn PersistenceSink {
        self.sink.as_ref()
    }

    pub(crate) fn records_lock(&self) -> &RwLock<Vec<Record>> {
        &self.records
    }

    pub(crate) fn sink_lock(&self) -> &Mutex<()> {
        &self.sink_lock
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("sink", &self.sink.location())
            .finish_non_exhaustive()
    }
}

/// Builder for constructing [`DocumentStore`] instances.
///
/// The last of `snapshot_path` and `sink` wins.
///
/// # Example
///
/// ```ignore
/// use memdoc_memory::DocumentStore;
/// use memdoc_core::builder::StoreBuilder;
///
/// let store = DocumentStore::builder()
///     .snapshot_path("/var/lib/app/memdoc.json")
///     .build()
///     .await?;
/// ```
#[derive(Debug, Default)]
pub struct DocumentStoreBuilder {
    sink: Option<Arc<dyn PersistenceSink>>,
}

impl DocumentStoreBuilder {
    /// Snapshots to a file at the given path.
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sink = Some(Arc::new(FileSink::new(path)));
        self
    }

    /// Snapshots to a custom sink.
    pub fn sink(mut self, sink: impl PersistenceSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }
}

#[async_trait]
impl StoreBuilder for DocumentStoreBuilder {
    type Store = DocumentStore;

    /// Builds an empty store. Snapshots are only read on an explicit `load`.
    async fn build(self) -> DocumentStoreResult<Self::Store> {
        Ok(match self.sink {
            Some(sink) => DocumentStore::with_sink(sink),
            None => DocumentStore::new(),
        })
    }
}
