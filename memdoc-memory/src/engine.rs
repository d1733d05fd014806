//! Mutation engine over the shared record sequence.
//!
//! Every function here works on a plain slice or vector and never takes a lock;
//! the caller holds the store lock for the whole call, which makes each function
//! one atomic step with respect to other handles.

use serde_json::Value;

use memdoc_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    naming::CollectionName,
    predicate::Predicate,
    record::{Fields, Record, SYSTEM_FIELDS},
};

use crate::evaluator::RecordEvaluator;

/// A single field replacement taken from an update patch.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PatchField {
    pub field: String,
    pub value: Value,
}

impl PatchField {
    /// Takes the first pair of the patch, in the patch's own field order.
    ///
    /// Only one field is ever applied per update; the remaining pairs are ignored.
    pub fn first_of(patch: Fields) -> DocumentStoreResult<Self> {
        let (field, value) = patch
            .into_iter()
            .next()
            .ok_or_else(|| DocumentStoreError::InvalidInput("update patch is empty".to_string()))?;

        if SYSTEM_FIELDS.contains(&field.as_str()) {
            return Err(DocumentStoreError::InvalidInput(format!(
                "field {field} is managed by the store and cannot be updated"
            )));
        }

        Ok(Self { field, value })
    }
}

fn missing_predicate() -> DocumentStoreError {
    DocumentStoreError::NotFound("a predicate is required for this operation".to_string())
}

fn no_match(collection: &CollectionName) -> DocumentStoreError {
    DocumentStoreError::NotFound(format!("no record matched in collection {collection}"))
}

/// Stamps and appends a batch. The batch is already normalized, so this cannot fail.
pub(crate) fn insert(records: &mut Vec<Record>, collection: &CollectionName, batch: Vec<Fields>) -> Vec<Record> {
    let stamped = batch
        .into_iter()
        .map(|fields| Record::stamp(fields, collection.as_str()))
        .collect::<Vec<_>>();

    records.extend(stamped.iter().cloned());
    stamped
}

pub(crate) fn find_first(
    records: &[Record],
    collection: &CollectionName,
    predicate: Option<&Predicate>,
) -> DocumentStoreResult<Record> {
    let predicate = predicate.ok_or_else(missing_predicate)?;

    RecordEvaluator::first_position(records, collection.as_str(), predicate)
        .map(|index| records[index].clone())
        .ok_or_else(|| no_match(collection))
}

/// Without a predicate, returns every record in the store regardless of collection.
pub(crate) fn find_all(
    records: &[Record],
    collection: &CollectionName,
    predicate: Option<&Predicate>,
) -> DocumentStoreResult<Vec<Record>> {
    let Some(predicate) = predicate else {
        return Ok(records.to_vec());
    };

    let found = RecordEvaluator::positions(records, collection.as_str(), predicate)
        .into_iter()
        .map(|index| records[index].clone())
        .collect::<Vec<_>>();

    if found.is_empty() {
        return Err(no_match(collection));
    }

    Ok(found)
}

pub(crate) fn count(records: &[Record], collection: &CollectionName, predicate: Option<&Predicate>) -> usize {
    match predicate {
        Some(predicate) => RecordEvaluator::positions(records, collection.as_str(), predicate).len(),
        None => records.len(),
    }
}

pub(crate) fn delete_one(
    records: &mut Vec<Record>,
    collection: &CollectionName,
    predicate: Option<&Predicate>,
) -> DocumentStoreResult<Record> {
    let predicate = predicate.ok_or_else(missing_predicate)?;

    RecordEvaluator::first_position(records, collection.as_str(), predicate)
        .map(|index| records.remove(index))
        .ok_or_else(|| no_match(collection))
}

/// Without a predicate, clears the entire store regardless of collection.
pub(crate) fn delete_all(
    records: &mut Vec<Record>,
    collection: &CollectionName,
    predicate: Option<&Predicate>,
) -> DocumentStoreResult<usize> {
    let before = records.len();

    match predicate {
        None => records.clear(),
        Some(predicate) => {
            records.retain(|record| !RecordEvaluator::matches(record, collection.as_str(), predicate));

            if records.len() == before {
                return Err(no_match(collection));
            }
        }
    }

    Ok(before - records.len())
}

pub(crate) fn update_one(
    records: &mut [Record],
    collection: &CollectionName,
    predicate: Option<&Predicate>,
    patch: PatchField,
) -> DocumentStoreResult<Record> {
    let predicate = predicate.ok_or_else(missing_predicate)?;
    let index = RecordEvaluator::first_position(records, collection.as_str(), predicate)
        .ok_or_else(|| no_match(collection))?;

    let record = &mut records[index];
    record.apply_patch(patch.field, patch.value);

    Ok(record.clone())
}
