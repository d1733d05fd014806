//! Snapshot persistence for the document store.
//!
//! A snapshot is the whole record sequence, every collection included, written
//! as a JSON array of records with their system fields. Loading appends the
//! snapshot's records to the store as they are: no normalization and no new
//! system fields.
//!
//! The store only exposes `save` and `load`; periodic saving belongs to whoever
//! owns the store (see `memdoc::autosave`).

use tracing::info;

use memdoc_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    record::{Payload, Record},
};

use crate::store::DocumentStore;

impl DocumentStore {
    /// Writes every record to the snapshot sink, replacing any previous snapshot.
    ///
    /// Saving an empty store is a successful no-op that leaves the sink untouched.
    /// After clearing a store with `delete(None).all()`, the previous snapshot is
    /// therefore still in the sink and a later `load` brings the cleared records back.
    ///
    /// Returns the number of records written.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Io`] if the sink cannot be written.
    pub async fn save(&self) -> DocumentStoreResult<usize> {
        let _sink = self.sink_lock().lock().await;

        let (count, bytes) = {
            let records = self.records_lock().read().await;
            if records.is_empty() {
                return Ok(0);
            }

            (records.len(), serde_json::to_vec(&*records)?)
        };

        self.sink().write(&bytes).await?;

        info!(location = %self.sink().location(), count, "Saved snapshot");
        Ok(count)
    }

    /// Appends the records of the last snapshot to the store.
    ///
    /// Returns the number of records appended.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::NotFound`] if the sink holds no snapshot and
    /// [`DocumentStoreError::InvalidFormat`] if its content cannot be parsed.
    pub async fn load(&self) -> DocumentStoreResult<usize> {
        let _sink = self.sink_lock().lock().await;

        let bytes = self.sink().read().await?.ok_or_else(|| {
            DocumentStoreError::NotFound(format!("no snapshot at {}", self.sink().location()))
        })?;

        let loaded = match Payload::parse(&bytes)? {
            Payload::One(fields) => vec![Record::from_fields(fields)],
            Payload::Many(items) => items.into_iter().map(Record::from_fields).collect(),
        };
        let count = loaded.len();

        self.records_lock().write().await.extend(loaded);

        info!(location = %self.sink().location(), count, "Loaded snapshot");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use memdoc_core::{
        builder::StoreBuilder,
        error::DocumentStoreError,
        predicate::Predicate,
        sink::{MemorySink, PersistenceSink},
    };
    use serde_json::json;

    use crate::store::DocumentStore;

    async fn store_with(sink: MemorySink) -> DocumentStore {
        DocumentStore::builder().sink(sink).build().await.unwrap()
    }

    #[tokio::test]
    async fn test_save_then_load_into_fresh_store() {
        let sink = MemorySink::new();
        let store = store_with(sink.clone()).await;
        store
            .collection("user")
            .unwrap()
            .insert_many(&[json!({ "name": "John" }), json!({ "name": "Jane" })])
            .await
            .unwrap();
        store.collection("order").unwrap().insert_one(&json!({ "total": 10 })).await.unwrap();

        assert_eq!(store.save().await.unwrap(), 3);

        let fresh = store_with(sink).await;
        assert_eq!(fresh.load().await.unwrap(), 3);
        assert_eq!(fresh.records().await, store.records().await);

        let john = fresh
            .collection("users")
            .unwrap()
            .find(Predicate::new().eq("name", "John"))
            .first()
            .await
            .unwrap();
        assert!(john.id().is_some());
    }

    #[tokio::test]
    async fn test_save_empty_store_keeps_previous_snapshot() {
        let sink = MemorySink::with_bytes(br#"[{"name":"old"}]"#.to_vec());
        let store = store_with(sink.clone()).await;

        assert_eq!(store.save().await.unwrap(), 0);
        assert_eq!(sink.read().await.unwrap(), Some(br#"[{"name":"old"}]"#.to_vec()));
    }

    #[tokio::test]
    async fn test_cleared_store_reloads_previous_snapshot() {
        let sink = MemorySink::new();
        let store = store_with(sink.clone()).await;
        let users = store.collection("users").unwrap();
        users.insert_one(&json!({ "name": "John" })).await.unwrap();
        store.save().await.unwrap();

        assert_eq!(users.delete(None).all().await.unwrap(), 1);
        assert_eq!(store.save().await.unwrap(), 0);

        let fresh = store_with(sink).await;
        assert_eq!(fresh.load().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_snapshot_is_not_found() {
        let store = store_with(MemorySink::new()).await;
        assert!(matches!(store.load().await, Err(DocumentStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_snapshot() {
        let store = store_with(MemorySink::with_bytes(b"\"just text\"".to_vec())).await;
        assert!(matches!(store.load().await, Err(DocumentStoreError::InvalidFormat(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_load_single_mapping_appends_as_is() {
        let store = store_with(MemorySink::with_bytes(
            br#"{"collection":"users","id":"x","age":35}"#.to_vec(),
        ))
        .await;

        assert_eq!(store.load().await.unwrap(), 1);
        let records = store.records().await;
        // not normalized: the integer survives
        assert_eq!(records[0].get("age"), Some(&json!(35)));
        assert_eq!(records[0].get("id"), Some(&json!("x")));
    }
}
