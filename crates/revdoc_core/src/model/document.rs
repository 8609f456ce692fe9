//! Document domain model.
//!
//! # Responsibility
//! - Define the canonical record kept by `DocumentStore`.
//! - Validate caller-supplied property maps before they reach the store.
//!
//! # Invariants
//! - `id` is stable and never reused for another document.
//! - `deleted` is the source of truth for tombstone state.
//! - Top-level property keys are non-empty and never start with `_`; that
//!   namespace carries store metadata (`_id`, `_rev`, `_deleted`).

use crate::model::revision::Revision;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier assigned by the store on create.
pub type DocumentId = Uuid;

/// JSON-compatible property mapping of one document.
pub type Properties = Map<String, Value>;

/// Reason a property map was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertiesError {
    EmptyKey,
    ReservedKey(String),
    NotAnObject(&'static str),
    Unserializable(String),
}

impl Display for PropertiesError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "property keys must not be empty"),
            Self::ReservedKey(key) => {
                write!(f, "property key `{key}` uses the reserved `_` prefix")
            }
            Self::NotAnObject(kind) => {
                write!(f, "document properties must be a JSON object, got {kind}")
            }
            Self::Unserializable(message) => {
                write!(f, "properties are not JSON-compatible: {message}")
            }
        }
    }
}

impl Error for PropertiesError {}

/// Checks that a property map can be stored as document content.
pub fn validate_properties(properties: &Properties) -> Result<(), PropertiesError> {
    for key in properties.keys() {
        if key.is_empty() {
            return Err(PropertiesError::EmptyKey);
        }
        if key.starts_with('_') {
            return Err(PropertiesError::ReservedKey(key.clone()));
        }
    }
    Ok(())
}

/// Converts any serializable value into a validated property map.
///
/// # Errors
/// - `Unserializable` when serde cannot represent the value as JSON
///   (e.g. maps with non-string keys).
/// - `NotAnObject` when the value is JSON but not an object.
/// - Key errors from [`validate_properties`].
pub fn properties_from<T: Serialize>(value: &T) -> Result<Properties, PropertiesError> {
    let json = serde_json::to_value(value)
        .map_err(|err| PropertiesError::Unserializable(err.to_string()))?;
    let properties = match json {
        Value::Object(map) => map,
        other => return Err(PropertiesError::NotAnObject(json_kind(&other))),
    };
    validate_properties(&properties)?;
    Ok(properties)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Current state of one stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identity; immutable.
    pub id: DocumentId,
    /// Token of the exact content version returned to readers.
    pub revision: Revision,
    /// Content as last written. Frozen once `deleted` is set.
    pub properties: Properties,
    /// Soft delete tombstone; the record is never erased.
    pub deleted: bool,
}

impl Document {
    pub(crate) fn new(properties: Properties) -> Self {
        Self {
            id: Uuid::new_v4(),
            revision: Revision::first(),
            properties,
            deleted: false,
        }
    }

    /// Returns whether this document should be considered visible/active.
    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Write counter of the current revision.
    pub fn generation(&self) -> u64 {
        self.revision.generation()
    }

    /// Flattened JSON view with `_id`/`_rev` metadata merged in.
    ///
    /// `_deleted` is only present for tombstones.
    pub fn to_json(&self) -> Value {
        let mut map = Map::with_capacity(self.properties.len() + 3);
        map.insert("_id".to_string(), Value::String(self.id.to_string()));
        map.insert("_rev".to_string(), Value::String(self.revision.to_string()));
        if self.deleted {
            map.insert("_deleted".to_string(), Value::Bool(true));
        }
        for (key, value) in &self.properties {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::{properties_from, validate_properties, Document, PropertiesError};
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn reserved_and_empty_keys_are_rejected() {
        let reserved = json!({ "_rev": "1-abc" });
        let err = validate_properties(reserved.as_object().unwrap()).unwrap_err();
        assert_eq!(err, PropertiesError::ReservedKey("_rev".to_string()));

        let empty = json!({ "": 1 });
        let err = validate_properties(empty.as_object().unwrap()).unwrap_err();
        assert_eq!(err, PropertiesError::EmptyKey);
    }

    #[test]
    fn nested_underscore_keys_are_allowed() {
        let nested = json!({ "meta": { "_internal": true } });
        validate_properties(nested.as_object().unwrap()).unwrap();
    }

    #[test]
    fn properties_from_requires_object() {
        let err = properties_from(&vec![1, 2, 3]).unwrap_err();
        assert_eq!(err, PropertiesError::NotAnObject("array"));

        let mut map = BTreeMap::new();
        map.insert("message", "hello");
        let properties = properties_from(&map).unwrap();
        assert_eq!(properties["message"], "hello");
    }

    #[test]
    fn properties_from_reports_unserializable_values() {
        let mut map = BTreeMap::new();
        map.insert(vec![1_u8], "non-string key");
        let err = properties_from(&map).unwrap_err();
        assert!(matches!(err, PropertiesError::Unserializable(_)));
    }

    #[test]
    fn to_json_merges_metadata() {
        let mut doc = Document::new(json!({ "message": "hi" }).as_object().unwrap().clone());
        let view = doc.to_json();
        assert_eq!(view["_id"], doc.id.to_string());
        assert_eq!(view["_rev"], doc.revision.to_string());
        assert!(view.get("_deleted").is_none());
        assert_eq!(view["message"], "hi");

        doc.deleted = true;
        assert_eq!(doc.to_json()["_deleted"], true);
    }
}
