//! Collection identifier resolution.
//!
//! A collection is addressed either by a text label or by a structured type. Both
//! resolve to the same canonical identifier: lower-cased and pluralized with a
//! trailing `s` unless one is already there. `"user"`, `"Users"` and a type named
//! `User` all address the `users` collection.

use std::fmt;

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    record::RecordType,
};

/// What a caller hands to the store to pick a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionRef {
    /// An explicit text label.
    Name(String),
    /// The bare name of a structured record type.
    Type(&'static str),
}

impl CollectionRef {
    /// References the collection of a record type.
    pub fn of<R: RecordType>() -> Self {
        CollectionRef::Type(R::type_name())
    }

    /// References the collection of a record value's type.
    pub fn for_record<R: RecordType>(_record: &R) -> Self {
        Self::of::<R>()
    }
}

impl From<&str> for CollectionRef {
    fn from(name: &str) -> Self {
        CollectionRef::Name(name.to_string())
    }
}

impl From<String> for CollectionRef {
    fn from(name: String) -> Self {
        CollectionRef::Name(name)
    }
}

impl From<&String> for CollectionRef {
    fn from(name: &String) -> Self {
        CollectionRef::Name(name.clone())
    }
}

/// A resolved, canonical collection identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionName(String);

impl CollectionName {
    /// Resolves a collection reference into its canonical identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::PreconditionViolation`] if the name is empty
    /// or only whitespace.
    pub fn resolve(reference: impl Into<CollectionRef>) -> DocumentStoreResult<Self> {
        let raw = match reference.into() {
            CollectionRef::Name(name) => name,
            CollectionRef::Type(name) => name.to_string(),
        };

        let name = raw.trim();
        if name.is_empty() {
            return Err(DocumentStoreError::PreconditionViolation(
                "collection name cannot be empty".to_string(),
            ));
        }

        Ok(Self::canonical(name))
    }

    /// Resolves the collection of a record type. Type names are never empty.
    pub fn of<R: RecordType>() -> Self {
        Self::canonical(R::type_name())
    }

    fn canonical(name: &str) -> Self {
        let mut name = name.to_lowercase();
        if !name.is_empty() && !name.ends_with('s') {
            name.push('s');
        }

        CollectionName(name)
    }

    /// Returns the identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
