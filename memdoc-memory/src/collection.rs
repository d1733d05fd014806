//! Collection handles and their operation builders.
//!
//! A [`Collection`] is a named view over a shared [`DocumentStore`]. It has no
//! storage of its own: every operation scans the store and keeps the records
//! whose `collection` field equals the handle's identifier.
//!
//! Operations come as small builders so that the selection and the terminal
//! action read together:
//!
//! ```ignore
//! let users = store.collection("user")?;
//!
//! users.insert_one(&json!({ "name": "John", "age": 35 })).await?;
//! users.insert_many(&[json!({ "name": "Jane", "age": 35 })]).await?;
//!
//! let john = users.find(Predicate::new().eq("age", 35)).first().await?;
//! let both = users.find(Predicate::new().eq("age", 35)).all().await?;
//!
//! users.update(Predicate::new().eq("name", "John"), &json!({ "age": 36 })).one().await?;
//! users.delete(Predicate::new().eq("name", "Jane")).one().await?;
//! ```
//!
//! # Absent predicates
//!
//! Passing `None` as the predicate keeps the historical behavior of the store:
//! `find(None).all()` returns every record of every collection and
//! `delete(None).all()` clears the whole store. `first()`, `one()` and
//! `update` refuse an absent predicate with `NotFound`.

use serde::Serialize;
use std::path::Path;
use tracing::debug;

use memdoc_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    naming::CollectionName,
    predicate::Predicate,
    record::{Fields, Payload, Record, normalize, normalize_many},
    sink::{FileSink, PersistenceSink},
};

use crate::{
    engine::{self, PatchField},
    store::DocumentStore,
};

/// A handle on one collection of a [`DocumentStore`].
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the store reference
#[derive(Debug, Clone)]
pub struct Collection<'a> {
    name: CollectionName,
    store: &'a DocumentStore,
}

impl<'a> Collection<'a> {
    /// Creates a new collection handle (internal use).
    pub(crate) fn new(name: CollectionName, store: &'a DocumentStore) -> Self {
        Self { name, store }
    }

    /// Returns the canonical identifier of this collection.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Starts a single-record insert.
    ///
    /// The value is normalized right away; a failure surfaces when the insert runs.
    pub fn insert<T: Serialize + ?Sized>(&self, value: &T) -> Insert<'a> {
        Insert {
            collection: self.clone(),
            single: Some(normalize(value)),
        }
    }

    /// Starts an insert without a single value, for [`Insert::many`] and [`Insert::from_file`].
    pub fn batch(&self) -> Insert<'a> {
        Insert {
            collection: self.clone(),
            single: None,
        }
    }

    /// Inserts one record and returns it with its system fields.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidInput`] if the value is not a struct or a map.
    pub async fn insert_one<T: Serialize + ?Sized>(&self, value: &T) -> DocumentStoreResult<Record> {
        self.insert(value).one().await
    }

    /// Inserts many records as one atomic batch.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidInput`] if any element is not a struct or a map;
    /// nothing is inserted in that case.
    pub async fn insert_many<T: Serialize>(&self, values: &[T]) -> DocumentStoreResult<Vec<Record>> {
        self.batch().many(values).await
    }

    /// Inserts the record or records held in a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Io`] if the file cannot be read and
    /// [`DocumentStoreError::InvalidFormat`] if it holds neither an object nor an array of objects.
    pub async fn insert_from_file(&self, path: impl AsRef<Path>) -> DocumentStoreResult<Vec<Record>> {
        self.batch().from_file(path).await
    }

    /// Inserts the record or records held in an arbitrary sink.
    ///
    /// # Errors
    ///
    /// Same as [`Collection::insert_from_file`].
    pub async fn insert_from_sink(&self, sink: &dyn PersistenceSink) -> DocumentStoreResult<Vec<Record>> {
        self.batch().from_sink(sink).await
    }

    /// Selects records of this collection.
    pub fn find(&self, predicate: impl Into<Option<Predicate>>) -> Find<'a> {
        Find {
            collection: self.clone(),
            predicate: predicate.into(),
        }
    }

    /// Selects records of this collection for deletion.
    pub fn delete(&self, predicate: impl Into<Option<Predicate>>) -> Delete<'a> {
        Delete {
            collection: self.clone(),
            predicate: predicate.into(),
        }
    }

    /// Selects records of this collection for an update with the given patch.
    ///
    /// Only the first field of the patch is applied, to the first match only.
    pub fn update<T: Serialize + ?Sized>(&self, predicate: impl Into<Option<Predicate>>, patch: &T) -> Update<'a> {
        Update {
            collection: self.clone(),
            predicate: predicate.into(),
            patch: normalize(patch),
        }
    }

    async fn append(&self, batch: Vec<Fields>) -> Vec<Record> {
        let count = batch.len();
        let inserted = {
            let mut records = self.store.records_lock().write().await;
            engine::insert(&mut records, &self.name, batch)
        };

        debug!(collection = %self.name, count, "Inserted records");
        inserted
    }
}

/// Insert builder returned by [`Collection::insert`] and [`Collection::batch`].
///
/// A builder carrying a single value may only run [`Insert::one`]; a builder
/// without one may only run the bulk variants.
#[derive(Debug)]
pub struct Insert<'a> {
    collection: Collection<'a>,
    single: Option<DocumentStoreResult<Fields>>,
}

impl<'a> Insert<'a> {
    fn ensure_no_single(&self, operation: &str) -> DocumentStoreResult<()> {
        if self.single.is_some() {
            return Err(DocumentStoreError::ConflictingArguments(format!(
                "{operation} cannot be combined with a single value"
            )));
        }

        Ok(())
    }

    /// Inserts the single value this builder was created with.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidInput`] if the builder has no value or the
    /// value is not a struct or a map.
    pub async fn one(self) -> DocumentStoreResult<Record> {
        let fields = match self.single {
            Some(fields) => fields?,
            None => {
                return Err(DocumentStoreError::InvalidInput(
                    "no value to insert".to_string(),
                ));
            }
        };

        let mut inserted = self.collection.append(vec![fields]).await;
        inserted
            .pop()
            .ok_or_else(|| DocumentStoreError::InvalidInput("no value to insert".to_string()))
    }

    /// Normalizes every value, then inserts them all under one lock.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::ConflictingArguments`] if the builder carries a single
    /// value, and [`DocumentStoreError::InvalidInput`] if any element fails normalization.
    pub async fn many<T: Serialize>(self, values: &[T]) -> DocumentStoreResult<Vec<Record>> {
        self.ensure_no_single("many")?;
        let batch = normalize_many(values)?;

        Ok(self.collection.append(batch).await)
    }

    /// Inserts the content of a JSON file.
    ///
    /// # Errors
    ///
    /// See [`Collection::insert_from_file`]; additionally
    /// [`DocumentStoreError::ConflictingArguments`] if the builder carries a single value.
    pub async fn from_file(self, path: impl AsRef<Path>) -> DocumentStoreResult<Vec<Record>> {
        let sink = FileSink::new(path.as_ref());
        self.from_sink(&sink).await
    }

    /// Inserts the content of a sink.
    ///
    /// # Errors
    ///
    /// See [`Collection::insert_from_file`].
    pub async fn from_sink(self, sink: &dyn PersistenceSink) -> DocumentStoreResult<Vec<Record>> {
        self.ensure_no_single("from_file")?;

        let bytes = sink.read().await?.ok_or_else(|| {
            DocumentStoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("nothing to import at {}", sink.location()),
            ))
        })?;

        let batch = match Payload::parse(&bytes)? {
            Payload::One(fields) => vec![normalize(&fields)?],
            Payload::Many(items) => normalize_many(&items)?,
        };

        Ok(self.collection.append(batch).await)
    }
}

/// Selection returned by [`Collection::find`].
#[derive(Debug)]
pub struct Find<'a> {
    collection: Collection<'a>,
    predicate: Option<Predicate>,
}

impl<'a> Find<'a> {
    /// Returns the first matching record in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::NotFound`] if nothing matches or the predicate is absent.
    pub async fn first(self) -> DocumentStoreResult<Record> {
        let records = self.collection.store.records_lock().read().await;
        engine::find_first(&records, &self.collection.name, self.predicate.as_ref())
    }

    /// Returns every matching record in insertion order.
    ///
    /// With an absent predicate, returns every record of every collection.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::NotFound`] if a present predicate matches nothing.
    pub async fn all(self) -> DocumentStoreResult<Vec<Record>> {
        let records = self.collection.store.records_lock().read().await;
        engine::find_all(&records, &self.collection.name, self.predicate.as_ref())
    }

    /// Counts matching records; never fails.
    pub async fn count(self) -> usize {
        let records = self.collection.store.records_lock().read().await;
        engine::count(&records, &self.collection.name, self.predicate.as_ref())
    }
}

/// Selection returned by [`Collection::delete`].
#[derive(Debug)]
pub struct Delete<'a> {
    collection: Collection<'a>,
    predicate: Option<Predicate>,
}

impl<'a> Delete<'a> {
    /// Removes the first matching record and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::NotFound`] if nothing matches or the predicate is absent.
    pub async fn one(self) -> DocumentStoreResult<Record> {
        let removed = {
            let mut records = self.collection.store.records_lock().write().await;
            engine::delete_one(&mut records, &self.collection.name, self.predicate.as_ref())?
        };

        debug!(collection = %self.collection.name, count = 1, "Deleted records");
        Ok(removed)
    }

    /// Removes every matching record and returns how many were removed.
    ///
    /// With an absent predicate, clears the whole store.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::NotFound`] if a present predicate matches nothing.
    pub async fn all(self) -> DocumentStoreResult<usize> {
        let count = {
            let mut records = self.collection.store.records_lock().write().await;
            engine::delete_all(&mut records, &self.collection.name, self.predicate.as_ref())?
        };

        debug!(
            collection = %self.collection.name,
            count,
            scoped = self.predicate.is_some(),
            "Deleted records"
        );
        Ok(count)
    }
}

/// Update returned by [`Collection::update`].
#[derive(Debug)]
pub struct Update<'a> {
    collection: Collection<'a>,
    predicate: Option<Predicate>,
    patch: DocumentStoreResult<Fields>,
}

impl<'a> Update<'a> {
    /// Applies the first patch field to the first matching record and returns it.
    ///
    /// Later matches are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::NotFound`] if nothing matches or the predicate is absent,
    /// and [`DocumentStoreError::InvalidInput`] if the patch is not a map, is empty, or
    /// targets a system field.
    pub async fn one(self) -> DocumentStoreResult<Record> {
        let patch = PatchField::first_of(self.patch?)?;
        let field = patch.field.clone();

        let updated = {
            let mut records = self.collection.store.records_lock().write().await;
            engine::update_one(&mut records, &self.collection.name, self.predicate.as_ref(), patch)?
        };

        debug!(collection = %self.collection.name, field = %field, "Updated record");
        Ok(updated)
    }
}
