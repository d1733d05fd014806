//! In-memory document store for memdoc.
//!
//! This crate provides the shared, thread-safe [`DocumentStore`] and the
//! [`Collection`](collection::Collection) handles that read and rewrite it.
//!
//! # Features
//!
//! - **One shared sequence** - Every collection lives in one ordered record sequence
//! - **Thread-safe access** - Async-aware locks around every read-modify-write
//! - **Predicate matching** - Conjunctions of exact-equality clauses, scoped by collection
//! - **Snapshots** - Save and load the whole store through a persistence sink
//!
//! # Quick Start
//!
//! ```ignore
//! use memdoc_memory::DocumentStore;
//! use memdoc_core::{builder::StoreBuilder, predicate::Predicate};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::builder().snapshot_path("./memdoc.json").build().await?;
//!     let users = store.collection("user")?;
//!
//!     users.insert_one(&json!({ "name": "John", "age": 35 })).await?;
//!     let john = users.find(Predicate::new().eq("age", 35)).first().await?;
//!
//!     store.save().await?;
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as memdoc_memory;

pub mod collection;
mod evaluator;
pub mod store;

mod engine;
mod snapshot;

pub use collection::{Collection, Delete, Find, Insert, Update};
pub use store::{DocumentStore, DocumentStoreBuilder};
