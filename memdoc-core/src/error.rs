//! Error types and result types for document and key/value store operations.
//!
//! Every fallible operation in memdoc returns [`DocumentStoreResult<T>`]. Caller
//! misuse is reported through [`DocumentStoreError::PreconditionViolation`] rather
//! than a panic, so a library embedding the store never goes down because of a
//! bad collection name.

use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a memdoc store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// The caller broke the contract of an operation (e.g. an empty collection name).
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),
    /// The value handed to the store cannot be normalized into a record.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Two mutually exclusive call shapes were combined on the same builder.
    #[error("Conflicting arguments: {0}")]
    ConflictingArguments(String),
    /// No record matched the query, or the snapshot sink holds nothing.
    #[error("Not found: {0}")]
    NotFound(String),
    /// The key is already present in the key/value store.
    #[error("Key already exists: {0}")]
    KeyExists(String),
    /// The key is not present in the key/value store.
    #[error("Key not found: {0}")]
    KeyNotFound(String),
    /// Persisted or imported content is not a mapping or a sequence of mappings.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    /// The persistence sink could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
    /// Serialization/deserialization error when converting between a value and JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A specialized `Result` type for memdoc operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl DocumentStoreError {
    /// Returns `true` for the "nothing matched" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DocumentStoreError::NotFound(_) | DocumentStoreError::KeyNotFound(_)
        )
    }
}
