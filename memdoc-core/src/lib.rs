//! Core types for memdoc, an embedded process-local JSON document store.
//!
//! This crate holds everything a store implementation builds on:
//!
//! - **Records** ([`record`]) - The stored record type and the normalizer that turns values into field maps
//! - **Collection naming** ([`naming`]) - Resolution of names and record types into collection identifiers
//! - **Predicates** ([`predicate`]) - Equality predicates and the visitor used to evaluate them
//! - **Persistence sinks** ([`sink`]) - Byte sinks for snapshots and bulk imports
//! - **Builders** ([`builder`]) - The async `StoreBuilder` seam shared by every store
//! - **Error handling** ([`error`]) - The shared error and result types
//!
//! # Example
//!
//! ```ignore
//! use memdoc_core::{naming::CollectionName, predicate::Predicate, record::normalize};
//! use serde_json::json;
//!
//! let users = CollectionName::resolve("user")?;
//! assert_eq!(users.as_str(), "users");
//!
//! let fields = normalize(&json!({ "name": "John", "age": 35 }))?;
//! let predicate = Predicate::new().eq("age", 35);
//! ```

#[allow(unused_extern_crates)]
extern crate self as memdoc_core;

pub mod builder;
pub mod error;
pub mod naming;
pub mod predicate;
pub mod record;
pub mod sink;
