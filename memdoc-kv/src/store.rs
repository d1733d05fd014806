//! TTL-aware key/value storage.
//!
//! Entries live in one ordered sequence, each holding a single key, its value
//! and an optional expiry timestamp. Expiry is recorded but not enforced on
//! reads: an expired entry stays visible until [`KvStore::purge_expired`]
//! removes it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mea::rwlock::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashSet, sync::Arc, time::Duration};
use tracing::debug;

use memdoc_core::{
    builder::StoreBuilder,
    error::{DocumentStoreError, DocumentStoreResult},
};

/// A single key/value entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The entry's key, unique across the store.
    pub key: String,
    /// The stored value.
    pub value: Value,
    /// When the entry expires, if it was set with a TTL.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn new(key: String, value: Value, ttl: Option<Duration>) -> DocumentStoreResult<Self> {
        Ok(Self {
            key,
            value,
            expires_at: expiry(ttl)?,
        })
    }

    /// Returns `true` if the entry has an expiry at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

fn expiry(ttl: Option<Duration>) -> DocumentStoreResult<Option<DateTime<Utc>>> {
    let Some(ttl) = ttl else {
        return Ok(None);
    };

    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .map(Some)
        .ok_or_else(|| DocumentStoreError::InvalidInput(format!("ttl {ttl:?} is out of range")))
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> DocumentStoreResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| DocumentStoreError::InvalidInput(format!("unserializable value: {err}")))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_i64() => "int",
        Value::Number(number) if number.is_u64() => "uint",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

/// Thread-safe, TTL-aware key/value store.
///
/// Cloneable; clones share the same entries.
///
/// # Example
///
/// ```ignore
/// use memdoc_kv::KvStore;
/// use std::time::Duration;
///
/// let kv = KvStore::new();
/// kv.set("session", "token123", Some(Duration::from_secs(3600))).await?;
/// assert_eq!(kv.get("session").await?, "token123");
/// ```
#[derive(Default, Clone, Debug)]
pub struct KvStore {
    /// Entries in insertion order
    entries: Arc<RwLock<Vec<Entry>>>,
}

impl KvStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Creates a builder for constructing a `KvStore`.
    pub fn builder() -> KvStoreBuilder {
        KvStoreBuilder
    }

    /// Adds a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::KeyExists`] if the key is already present and
    /// [`DocumentStoreError::InvalidInput`] if the value cannot be serialized.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: impl Into<String>,
        value: &T,
        ttl: Option<Duration>,
    ) -> DocumentStoreResult<()> {
        let entry = Entry::new(key.into(), to_value(value)?, ttl)?;

        let mut entries = self.entries.write().await;
        if entries.iter().any(|existing| existing.key == entry.key) {
            return Err(DocumentStoreError::KeyExists(entry.key));
        }

        debug!(key = %entry.key, expires_at = ?entry.expires_at, "Set entry");
        entries.push(entry);

        Ok(())
    }

    /// Adds many entries at once and returns every key/value pair in the store.
    ///
    /// Nothing is added if any key is already present or repeated within the batch.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::KeyExists`] naming the first offending key.
    pub async fn set_many(
        &self,
        batch: impl IntoIterator<Item = (String, Value, Option<Duration>)>,
    ) -> DocumentStoreResult<Vec<(String, Value)>> {
        let batch = batch
            .into_iter()
            .map(|(key, value, ttl)| Entry::new(key, value, ttl))
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        let mut entries = self.entries.write().await;
        let mut seen = entries
            .iter()
            .map(|entry| entry.key.as_str())
            .collect::<HashSet<_>>();

        for entry in &batch {
            if !seen.insert(entry.key.as_str()) {
                return Err(DocumentStoreError::KeyExists(entry.key.clone()));
            }
        }

        debug!(count = batch.len(), "Set entries");
        entries.extend(batch);

        Ok(pairs(&entries))
    }

    /// Returns the value stored under a key.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::KeyNotFound`] if the key is absent.
    pub async fn get(&self, key: &str) -> DocumentStoreResult<Value> {
        self.entries
            .read()
            .await
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.clone())
            .ok_or_else(|| DocumentStoreError::KeyNotFound(key.to_string()))
    }

    /// Returns the pairs for every requested key that is present, in store order.
    pub async fn get_many(&self, keys: &[&str]) -> Vec<(String, Value)> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|entry| keys.contains(&entry.key.as_str()))
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect()
    }

    /// Removes the entry stored under a key.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::KeyNotFound`] if the key is absent.
    pub async fn delete(&self, key: &str) -> DocumentStoreResult<()> {
        let mut entries = self.entries.write().await;
        let index = position(&entries, key)?;
        entries.remove(index);

        debug!(key, "Deleted entry");
        Ok(())
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Replaces the value of an existing key; the entry moves to the end of the store.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::KeyNotFound`] if the key is absent.
    pub async fn overwrite<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> DocumentStoreResult<()> {
        self.overwrite_with_key(key, key, value, ttl).await
    }

    /// Replaces an existing entry with one stored under a new key.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::KeyNotFound`] if `previous` is absent and
    /// [`DocumentStoreError::KeyExists`] if `key` already names another entry.
    pub async fn overwrite_with_key<T: Serialize + ?Sized>(
        &self,
        previous: &str,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> DocumentStoreResult<()> {
        let entry = Entry::new(key.to_string(), to_value(value)?, ttl)?;

        let mut entries = self.entries.write().await;
        let index = position(&entries, previous)?;

        if previous != key && entries.iter().any(|existing| existing.key == key) {
            return Err(DocumentStoreError::KeyExists(key.to_string()));
        }

        entries.remove(index);
        entries.push(entry);

        debug!(previous, key, "Overwrote entry");
        Ok(())
    }

    /// Number of entries.
    pub async fn size(&self) -> usize {
        self.entries.read().await.len()
    }

    /// All keys, in store order.
    pub async fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .await
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// All values, in store order.
    pub async fn values(&self) -> Vec<Value> {
        self.entries
            .read()
            .await
            .iter()
            .map(|entry| entry.value.clone())
            .collect()
    }

    /// All key/value pairs, in store order.
    pub async fn key_value_pairs(&self) -> Vec<(String, Value)> {
        pairs(&self.entries.read().await)
    }

    /// Returns the runtime type name of the value stored under a key.
    ///
    /// One of `null`, `bool`, `int`, `uint`, `float`, `string`, `array`, `map`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::KeyNotFound`] if the key is absent.
    pub async fn type_of(&self, key: &str) -> DocumentStoreResult<&'static str> {
        let entries = self.entries.read().await;
        let index = position(&entries, key)?;

        Ok(type_name(&entries[index].value))
    }

    /// Returns the expiry recorded for a key, `None` if it was set without a TTL.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::KeyNotFound`] if the key is absent.
    pub async fn expires_at(&self, key: &str) -> DocumentStoreResult<Option<DateTime<Utc>>> {
        let entries = self.entries.read().await;
        let index = position(&entries, key)?;

        Ok(entries[index].expires_at)
    }

    /// Removes every entry whose expiry has passed and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();

        entries.retain(|entry| !entry.is_expired_at(now));
        let purged = before - entries.len();

        if purged > 0 {
            debug!(count = purged, "Purged expired entries");
        }
        purged
    }
}

fn position(entries: &[Entry], key: &str) -> DocumentStoreResult<usize> {
    entries
        .iter()
        .position(|entry| entry.key == key)
        .ok_or_else(|| DocumentStoreError::KeyNotFound(key.to_string()))
}

fn pairs(entries: &[Entry]) -> Vec<(String, Value)> {
    entries
        .iter()
        .map(|entry| (entry.key.clone(), entry.value.clone()))
        .collect()
}

/// Builder for constructing [`KvStore`] instances.
///
/// Currently a no-op builder; it exists so both stores are built the same way.
#[derive(Debug, Default)]
pub struct KvStoreBuilder;

#[async_trait]
impl StoreBuilder for KvStoreBuilder {
    type Store = KvStore;

    async fn build(self) -> DocumentStoreResult<Self::Store> {
        Ok(KvStore::new())
    }
}
