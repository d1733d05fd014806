//! TTL-aware key/value companion store for memdoc.
//!
//! [`KvStore`] is independent from the document store: its own entries, its own
//! lock. Every entry may carry an expiry timestamp, which is recorded but only
//! acted upon by an explicit [`KvStore::purge_expired`] sweep.
//!
//! # Quick Start
//!
//! ```ignore
//! use memdoc_kv::KvStore;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let kv = KvStore::new();
//!
//!     kv.set("name", "Ariz", None).await?;
//!     kv.set("session", "token123", Some(Duration::from_secs(3600))).await?;
//!
//!     assert_eq!(kv.type_of("name").await?, "string");
//!     kv.overwrite("name", "Zira", None).await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as memdoc_kv;

pub mod store;

pub use store::{Entry, KvStore, KvStoreBuilder};
