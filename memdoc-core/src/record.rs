//! Record representation and normalization.
//!
//! Everything stored in a document store is a [`Record`]: an ordered JSON field map
//! carrying four system fields managed by the store ([`COLLECTION_FIELD`],
//! [`ID_FIELD`], [`CREATED_AT_FIELD`], [`UPDATED_AT_FIELD`]).
//!
//! Input values reach the store through [`normalize`], which turns any
//! `Serialize` value into a field map. Normalization is type-lossy on purpose:
//! every number is narrowed to a double-precision float, so `35` and `35.0`
//! become the same value and compare equal in predicates.
//!
//! # Example
//!
//! ```ignore
//! use memdoc_core::record::normalize;
//! use serde_json::json;
//!
//! let fields = normalize(&json!({ "name": "John", "age": 35 }))?;
//! assert_eq!(fields["age"], json!(35.0));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Field holding the owning collection identifier.
pub const COLLECTION_FIELD: &str = "collection";
/// Field holding the record's unique identifier.
pub const ID_FIELD: &str = "id";
/// Field holding the insertion timestamp.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Field holding the last update timestamp (null until the first update).
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// All fields the store manages itself.
pub const SYSTEM_FIELDS: [&str; 4] = [COLLECTION_FIELD, ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD];

/// An ordered map from field name to JSON value.
pub type Fields = Map<String, Value>;

/// Trait for structured types that can name a collection.
///
/// Usually derived with `#[derive(Record)]`, which returns the bare type name.
/// The collection identifier is derived from it by lower-casing and pluralizing.
///
/// ```ignore
/// #[derive(Serialize, Record)]
/// struct Order { total: f64 }
///
/// assert_eq!(Order::type_name(), "Order");
/// ```
pub trait RecordType {
    /// Returns the bare name of the type (no module path).
    fn type_name() -> &'static str;
}

/// A stored record: the normalized fields plus the system fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Fields);

impl Record {
    /// Stamps fresh system fields onto normalized fields.
    ///
    /// System fields are written last so that user-supplied values under the
    /// same names are replaced.
    pub fn stamp(mut fields: Fields, collection: &str) -> Self {
        fields.insert(COLLECTION_FIELD.to_string(), Value::String(collection.to_string()));
        fields.insert(ID_FIELD.to_string(), Value::String(Uuid::new_v4().to_string()));
        fields.insert(CREATED_AT_FIELD.to_string(), timestamp(Utc::now()));
        fields.insert(UPDATED_AT_FIELD.to_string(), Value::Null);

        Record(fields)
    }

    /// Wraps already-stamped fields (e.g. read back from a snapshot) without touching them.
    pub fn from_fields(fields: Fields) -> Self {
        Record(fields)
    }

    /// Returns the collection identifier stored on the record, if any.
    pub fn collection(&self) -> Option<&str> {
        self.0.get(COLLECTION_FIELD).and_then(Value::as_str)
    }

    /// Returns the record's identifier, if present and well-formed.
    pub fn id(&self) -> Option<Uuid> {
        self.0
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .and_then(|id| Uuid::parse_str(id).ok())
    }

    /// Returns the insertion timestamp, if present and well-formed.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.0.get(CREATED_AT_FIELD).and_then(parse_timestamp)
    }

    /// Returns the last update timestamp, or `None` if the record was never updated.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.0.get(UPDATED_AT_FIELD).and_then(parse_timestamp)
    }

    /// Returns the value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Replaces a single field and refreshes `updatedAt`.
    pub fn apply_patch(&mut self, field: String, value: Value) {
        self.0.insert(field, value);
        self.0.insert(UPDATED_AT_FIELD.to_string(), timestamp(Utc::now()));
    }

    /// Returns all fields, system fields included.
    pub fn fields(&self) -> &Fields {
        &self.0
    }

    /// Consumes the record and returns its fields.
    pub fn into_fields(self) -> Fields {
        self.0
    }

    /// Deserializes the record into a user type.
    ///
    /// Numbers were narrowed to floats on the way in, so integer fields of `T`
    /// fail to deserialize while float fields succeed.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Serialization`] if the fields do not fit `T`.
    pub fn to_typed<T: DeserializeOwned>(&self) -> DocumentStoreResult<T> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }
}

/// Input shapes accepted from byte sinks: a single mapping or a sequence of mappings.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A single field mapping.
    One(Fields),
    /// A sequence of field mappings.
    Many(Vec<Fields>),
}

impl Payload {
    /// Parses UTF-8 JSON bytes into a payload.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidFormat`] if the bytes are not JSON or the
    /// JSON is neither an object nor an array of objects.
    pub fn parse(bytes: &[u8]) -> DocumentStoreResult<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|err| DocumentStoreError::InvalidFormat(format!("invalid json: {err}")))?;

        Self::from_value(value)
    }

    /// Classifies an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidFormat`] for scalars and for arrays
    /// containing anything other than objects.
    pub fn from_value(value: Value) -> DocumentStoreResult<Self> {
        match value {
            Value::Object(fields) => Ok(Payload::One(fields)),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(fields) => Ok(fields),
                    other => Err(DocumentStoreError::InvalidFormat(format!(
                        "element {index} is {}, expected an object",
                        kind_of(&other)
                    ))),
                })
                .collect::<DocumentStoreResult<Vec<_>>>()
                .map(Payload::Many),
            other => Err(DocumentStoreError::InvalidFormat(format!(
                "content is {}, expected an object or an array of objects",
                kind_of(&other)
            ))),
        }
    }

    /// Number of mappings in the payload.
    pub fn len(&self) -> usize {
        match self {
            Payload::One(_) => 1,
            Payload::Many(items) => items.len(),
        }
    }

    /// Returns `true` for an empty sequence.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Converts any serializable value into a field map.
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidInput`] if the value cannot be serialized
/// or does not serialize to a JSON object.
pub fn normalize<T: Serialize + ?Sized>(value: &T) -> DocumentStoreResult<Fields> {
    let value = serde_json::to_value(value)
        .map_err(|err| DocumentStoreError::InvalidInput(format!("unserializable value: {err}")))?;

    match narrow(value) {
        Value::Object(fields) => Ok(fields),
        other => Err(DocumentStoreError::InvalidInput(format!(
            "unsupported shape: {}, expected a struct or a map",
            kind_of(&other)
        ))),
    }
}

/// Normalizes every element of a slice, failing without output if any element fails.
///
/// # Errors
///
/// Returns the first element's [`DocumentStoreError::InvalidInput`], prefixed with its index.
pub fn normalize_many<T: Serialize>(values: &[T]) -> DocumentStoreResult<Vec<Fields>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            normalize(value).map_err(|err| match err {
                DocumentStoreError::InvalidInput(msg) => {
                    DocumentStoreError::InvalidInput(format!("element {index}: {msg}"))
                }
                other => other,
            })
        })
        .collect()
}

/// Converts a single serializable value (not necessarily a map) into a narrowed JSON value.
///
/// Used for predicate and patch values so that they compare equal to stored fields.
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidInput`] if the value cannot be serialized.
pub fn normalize_value<T: Serialize + ?Sized>(value: &T) -> DocumentStoreResult<Value> {
    serde_json::to_value(value)
        .map(narrow)
        .map_err(|err| DocumentStoreError::InvalidInput(format!("unserializable value: {err}")))
}

/// Narrows every number in a JSON tree to a float.
pub fn narrow(value: Value) -> Value {
    match value {
        Value::Number(number) => number
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Value::Array(items) => Value::Array(items.into_iter().map(narrow).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key, narrow(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Human-readable name of a JSON value's shape, for error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339())
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|at| at.with_timezone(&Utc))
}
