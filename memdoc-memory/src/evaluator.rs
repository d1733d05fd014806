//! Predicate evaluation for in-memory record filtering.
//!
//! A record matches a predicate when it belongs to the evaluated collection and
//! every clause's field is present with an equal value. Equality is plain JSON
//! value equality on normalized values: no coercion, no substring or tolerance
//! matching.

use serde_json::Value;

use memdoc_core::{
    error::DocumentStoreError,
    predicate::{Predicate, PredicateVisitor},
    record::Record,
};

pub(crate) struct RecordEvaluator<'a> {
    record: &'a Record,
}

impl<'a> RecordEvaluator<'a> {
    pub fn new(record: &'a Record) -> Self {
        Self { record }
    }
}

impl RecordEvaluator<'_> {
    pub fn matches(record: &Record, collection: &str, predicate: &Predicate) -> bool {
        RecordEvaluator::new(record)
            .visit_predicate(collection, predicate)
            .unwrap_or(false)
    }

    /// Returns the positions of all matching records, in store order.
    pub fn positions(records: &[Record], collection: &str, predicate: &Predicate) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, record)| RecordEvaluator::matches(record, collection, predicate))
            .map(|(index, _)| index)
            .collect()
    }

    /// Returns the position of the first matching record.
    pub fn first_position(records: &[Record], collection: &str, predicate: &Predicate) -> Option<usize> {
        records
            .iter()
            .position(|record| RecordEvaluator::matches(record, collection, predicate))
    }
}

impl<'a> PredicateVisitor for RecordEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_scope(&mut self, collection: &str) -> Result<Self::Output, Self::Error> {
        Ok(self.record.collection() == Some(collection))
    }

    fn visit_clause(&mut self, field: &str, value: &Value) -> Result<Self::Output, Self::Error> {
        Ok(self.record.get(field) == Some(value))
    }

    fn visit_predicate(&mut self, collection: &str, predicate: &Predicate) -> Result<Self::Output, Self::Error> {
        if !self.visit_scope(collection)? {
            return Ok(false);
        }

        for clause in predicate.clauses() {
            if !self.visit_clause(&clause.field, &clause.value)? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memdoc_core::record::normalize;
    use serde_json::json;

    fn record(collection: &str, value: Value) -> Record {
        Record::stamp(normalize(&value).unwrap(), collection)
    }

    #[test]
    fn test_all_clauses_must_match() {
        let john = record("users", json!({ "name": "John", "age": 35 }));

        assert!(RecordEvaluator::matches(&john, "users", &Predicate::new().eq("age", 35)));
        assert!(RecordEvaluator::matches(
            &john,
            "users",
            &Predicate::new().eq("age", 35).eq("name", "John")
        ));
        assert!(!RecordEvaluator::matches(
            &john,
            "users",
            &Predicate::new().eq("age", 35).eq("name", "Jane")
        ));
    }

    #[test]
    fn test_scope_is_checked_before_clauses() {
        let john = record("users", json!({ "age": 35 }));
        assert!(!RecordEvaluator::matches(&john, "orders", &Predicate::new().eq("age", 35)));
    }

    #[test]
    fn test_empty_predicate_matches_whole_collection() {
        let john = record("users", json!({ "age": 35 }));

        assert!(RecordEvaluator::matches(&john, "users", &Predicate::new()));
        assert!(!RecordEvaluator::matches(&john, "orders", &Predicate::new()));
    }

    #[test]
    fn test_equality_is_exact() {
        let john = record("users", json!({ "name": "Johnny", "age": 35 }));

        assert!(!RecordEvaluator::matches(&john, "users", &Predicate::new().eq("name", "John")));
        assert!(!RecordEvaluator::matches(&john, "users", &Predicate::new().eq("age", "35")));
        assert!(!RecordEvaluator::matches(&john, "users", &Predicate::new().eq("missing", Value::Null)));
    }

    #[test]
    fn test_positions_preserve_store_order() {
        let records = vec![
            record("users", json!({ "age": 35 })),
            record("orders", json!({ "age": 35 })),
            record("users", json!({ "age": 20 })),
            record("users", json!({ "age": 35 })),
        ];
        let predicate = Predicate::new().eq("age", 35);

        assert_eq!(RecordEvaluator::positions(&records, "users", &predicate), vec![0, 3]);
        assert_eq!(RecordEvaluator::first_position(&records, "users", &predicate), Some(0));
    }

    fn first_match_in(records: &[Record], collection: &str) -> Option<usize> {
        let predicate = Predicate::new().eq("age", 20);
        RecordEvaluator::first_position(records, collection, &predicate)
    }

    #[test]
    fn test_positions_over_borrowed_slice() {
        let records = vec![
            record("users", json!({ "age": 35 })),
            record("users", json!({ "age": 20 })),
        ];

        assert_eq!(first_match_in(&records[1..], "users"), Some(0));
        assert_eq!(first_match_in(&records, "users"), Some(1));
        assert_eq!(first_match_in(&records, "orders"), None);
    }
}
