//! memdoc: an embedded, process-local JSON document store.
//!
//! This crate is the primary entry point. It re-exports the core types and the
//! two stores from the sub-crates and adds the [`Memdoc`] root that owns them.
//!
//! # Features
//!
//! - **Schemaless collections** - Insert any struct or map; records get an id and timestamps
//! - **Equality queries** - Find, update and delete by conjunctions of field equalities
//! - **Snapshots** - Save the whole store to a JSON file and load it back, by hand or on a timer
//! - **TTL key/value store** - A companion store for single values with an optional expiry
//!
//! # Quick Start
//!
//! ```ignore
//! use memdoc::prelude::*;
//!
//! #[derive(Debug, Serialize, Deserialize, Record)]
//! struct User {
//!     name: String,
//!     age: f64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Memdoc::builder().snapshot_path("./memdocstorage.json").build().await?;
//!     let users = db.typed_collection::<User>();
//!
//!     users.insert_one(&User { name: "John".into(), age: 35.0 }).await?;
//!     users.insert_many(&[json!({ "name": "Jane", "age": 35 })]).await?;
//!
//!     let john: User = users
//!         .find(Predicate::new().eq("name", "John"))
//!         .first()
//!         .await?
//!         .to_typed()?;
//!
//!     users.update(Predicate::new().eq("name", "Jane"), &json!({ "age": 36 })).one().await?;
//!     println!("{john:?} and {} others", users.find(Predicate::new()).count().await - 1);
//!
//!     db.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Stores
//!
//! - [`memory`] - The shared document store and its collection handles
//! - [`kv`] - The TTL-aware key/value store

#[allow(unused_extern_crates)]
extern crate self as memdoc;

pub mod autosave;
pub mod prelude;
mod root;

pub use memdoc_core::{builder, error, naming, predicate, record, sink};
pub use memdoc_macros::Record;
pub use root::{Memdoc, MemdocBuilder};

/// The in-memory document store.
pub mod memory {
    pub use memdoc_memory::{Collection, Delete, DocumentStore, DocumentStoreBuilder, Find, Insert, Update};
}

/// The TTL-aware key/value store.
pub mod kv {
    pub use memdoc_kv::{Entry, KvStore, KvStoreBuilder};
}
