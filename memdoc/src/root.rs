//! The application root owning both stores.

use async_trait::async_trait;
use std::{path::PathBuf, time::Duration};
use tracing::info;

use memdoc_core::{
    builder::StoreBuilder,
    error::DocumentStoreResult,
    naming::CollectionRef,
    record::RecordType,
    sink::PersistenceSink,
};
use memdoc_kv::KvStore;
use memdoc_memory::{Collection, DocumentStore, DocumentStoreBuilder};

use crate::autosave::{self, Autosave};

/// A document store and a key/value store living side by side.
///
/// The two stores are independent; `Memdoc` only owns them together with the
/// optional autosave task of the document store.
///
/// # Example
///
/// ```ignore
/// use memdoc::prelude::*;
///
/// let db = Memdoc::builder()
///     .snapshot_path("./memdocstorage.json")
///     .autosave(Duration::from_secs(60))
///     .build()
///     .await?;
///
/// db.collection("user")?.insert_one(&json!({ "name": "John" })).await?;
/// db.kv().set("session", "token123", None).await?;
///
/// db.shutdown().await?;
/// ```
#[derive(Debug, Default)]
pub struct Memdoc {
    documents: DocumentStore,
    kv: KvStore,
    autosave: Option<Autosave>,
}

impl Memdoc {
    /// Creates both stores with defaults and no autosave.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for configuring the root.
    pub fn builder() -> MemdocBuilder {
        MemdocBuilder::default()
    }

    /// The document store.
    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    /// The key/value store.
    pub fn kv(&self) -> &KvStore {
        &self.kv
    }

    /// Shorthand for `documents().collection(reference)`.
    pub fn collection(&self, reference: impl Into<CollectionRef>) -> DocumentStoreResult<Collection<'_>> {
        self.documents.collection(reference)
    }

    /// Shorthand for `documents().typed_collection::<R>()`.
    pub fn typed_collection<R: RecordType>(&self) -> Collection<'_> {
        self.documents.typed_collection::<R>()
    }

    /// Period of the running autosave task, if any.
    pub fn autosave_period(&self) -> Option<Duration> {
        self.autosave.as_ref().map(Autosave::period)
    }

    /// Stops autosaving and writes a final snapshot of the document store.
    ///
    /// Returns the number of records written.
    pub async fn shutdown(mut self) -> DocumentStoreResult<usize> {
        if let Some(task) = self.autosave.take() {
            task.stop();
        }

        let count = self.documents.save().await?;
        info!(count, "Shut down");
        Ok(count)
    }
}

/// Builder for [`Memdoc`].
#[derive(Debug, Default)]
pub struct MemdocBuilder {
    documents: DocumentStoreBuilder,
    autosave: Option<Duration>,
}

impl MemdocBuilder {
    /// Snapshots the document store to a file at the given path.
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.documents = self.documents.snapshot_path(path);
        self
    }

    /// Snapshots the document store to a custom sink.
    pub fn sink(mut self, sink: impl PersistenceSink + 'static) -> Self {
        self.documents = self.documents.sink(sink);
        self
    }

    /// Saves the document store every `period` once built.
    pub fn autosave(mut self, period: Duration) -> Self {
        self.autosave = Some(period);
        self
    }
}

#[async_trait]
impl StoreBuilder for MemdocBuilder {
    type Store = Memdoc;

    /// Builds both stores and, if requested, spawns the autosave task on the
    /// current tokio runtime.
    async fn build(self) -> DocumentStoreResult<Self::Store> {
        let documents = self.documents.build().await?;
        let kv = KvStore::builder().build().await?;

        let autosave = match self.autosave {
            Some(period) => Some(autosave::spawn(documents.clone(), period)?),
            None => None,
        };

        Ok(Memdoc {
            documents,
            kv,
            autosave,
        })
    }
}
