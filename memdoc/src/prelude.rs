//! Convenient re-exports of commonly used types from memdoc.
//!
//! ```ignore
//! use memdoc::prelude::*;
//! ```
//!
//! This provides access to:
//! - The `Memdoc` root, both stores and their builders
//! - Collection handles and predicates
//! - Records and the `Record` derive
//! - Error types
//! - `serde` derives, `json!` and `Duration`

pub use crate::{
    Memdoc, MemdocBuilder,
    autosave::Autosave,
};

pub use memdoc_core::{
    builder::StoreBuilder,
    error::{DocumentStoreError, DocumentStoreResult},
    naming::{CollectionName, CollectionRef},
    predicate::Predicate,
    record::{Record, RecordType},
    sink::{FileSink, MemorySink, PersistenceSink},
};
pub use memdoc_kv::KvStore;
pub use memdoc_macros::Record;
pub use memdoc_memory::{Collection, DocumentStore};

pub use serde::{Deserialize, Serialize};
pub use serde_json::json;
pub use std::time::Duration;
