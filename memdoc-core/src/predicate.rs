//! Field-value predicates for selecting records.
//!
//! A [`Predicate`] is a conjunction of exact-equality clauses. Values are
//! normalized the same way stored records are, so `Predicate::new().eq("age", 35)`
//! matches a record inserted with `"age": 35` or `"age": 35.0`.
//!
//! # Example
//!
//! ```ignore
//! use memdoc_core::predicate::Predicate;
//!
//! let predicate = Predicate::new()
//!     .eq("age", 35)
//!     .eq("city", "Lagos");
//! ```
//!
//! Backends evaluate predicates through [`PredicateVisitor`], which walks the
//! collection scope first and then every clause.

use serde::Serialize;
use serde_json::Value;

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    record::{Fields, narrow, normalize, normalize_value},
};

/// A single `field == value` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// The field name to compare.
    pub field: String,
    /// The normalized value the field must equal.
    pub value: Value,
}

/// A conjunction of equality clauses.
///
/// An empty predicate matches every record of the collection it is evaluated in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Creates an empty predicate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality clause.
    ///
    /// Accepts anything convertible to a JSON value; numbers are narrowed to floats.
    /// A later clause on the same field replaces the earlier one.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = narrow(value.into());

        match self.clauses.iter_mut().find(|clause| clause.field == field) {
            Some(clause) => clause.value = value,
            None => self.clauses.push(Clause { field, value }),
        }

        self
    }

    /// Adds an equality clause for any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidInput`] if the value cannot be serialized.
    pub fn try_eq<T: Serialize + ?Sized>(self, field: impl Into<String>, value: &T) -> DocumentStoreResult<Self> {
        Ok(self.eq(field, normalize_value(value)?))
    }

    /// Builds a predicate from a field map, one clause per field.
    pub fn from_fields(fields: Fields) -> Self {
        fields
            .into_iter()
            .fold(Self::new(), |predicate, (field, value)| predicate.eq(field, value))
    }

    /// Builds a predicate from any value that serializes to a map.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidInput`] if the value is not map-shaped.
    pub fn from_record<T: Serialize + ?Sized>(value: &T) -> DocumentStoreResult<Self> {
        Ok(Self::from_fields(normalize(value)?))
    }

    /// Returns the clauses in insertion order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns `true` if the predicate has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl TryFrom<Value> for Predicate {
    type Error = DocumentStoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            other => Err(DocumentStoreError::InvalidInput(format!(
                "predicate must be a map, found {}",
                crate::record::kind_of(&other)
            ))),
        }
    }
}

/// Visitor over a scoped predicate.
///
/// Evaluation visits the collection scope first; clause visits only happen when
/// the scope accepted the candidate.
pub trait PredicateVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_scope(&mut self, collection: &str) -> Result<Self::Output, Self::Error>;
    fn visit_clause(&mut self, field: &str, value: &Value) -> Result<Self::Output, Self::Error>;
    fn visit_predicate(&mut self, collection: &str, predicate: &Predicate) -> Result<Self::Output, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eq_narrows_numbers() {
        let predicate = Predicate::new().eq("age", 35);
        assert_eq!(predicate.clauses()[0].value, json!(35.0));
    }

    #[test]
    fn test_repeated_field_replaces_clause() {
        let predicate = Predicate::new().eq("name", "a").eq("name", "b");

        assert_eq!(predicate.clauses().len(), 1);
        assert_eq!(predicate.clauses()[0].value, json!("b"));
    }

    #[test]
    fn test_try_from_json_map() {
        let predicate = Predicate::try_from(json!({ "name": "John", "age": 35 })).unwrap();

        assert_eq!(predicate.clauses().len(), 2);
        assert_eq!(predicate.clauses()[0].field, "name");
        assert!(Predicate::try_from(json!([1, 2])).is_err());
    }

    #[test]
    fn test_try_eq_serializes_values() {
        let predicate = Predicate::new().try_eq("tags", &vec![1, 2]).unwrap();
        assert_eq!(predicate.clauses()[0].value, json!([1.0, 2.0]));
    }
}
