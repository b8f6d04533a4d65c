//! JSON document codec.
//!
//! Documents are persisted as one JSON object per entity row. Encoding is
//! canonical: object keys are emitted in sorted order (the document and
//! nested maps are sorted maps, so this falls out of iteration order) and
//! timestamps are rendered in a single fixed format. Decoding maps JSON
//! shapes back onto [`Value`] shapes; JSON has no instant type, so a
//! stored timestamp decodes as [`Value::Text`] and is re-parsed by the
//! type-aware comparison layer.

use crate::document::AttributeDocument;
use crate::error::{ValueError, ValueResult};
use crate::value::Value;
use chrono::SecondsFormat;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Encode a document to its canonical JSON text.
///
/// Identical documents produce identical text: keys are sorted, timestamps
/// use one fixed rendering, and no insignificant whitespace is emitted.
///
/// # Errors
///
/// Returns an error if serialization fails; this does not happen for
/// well-formed documents.
pub fn to_canonical_json(document: &AttributeDocument) -> ValueResult<String> {
    serde_json::to_string(document).map_err(|e| ValueError::encoding_failed(e.to_string()))
}

/// Decode a document from JSON text.
///
/// The top level must be a JSON object. The *unset* document state is the
/// absence of a stored value and never reaches the codec; a literal JSON
/// `null` here is rejected.
///
/// # Errors
///
/// Returns an error if the input is not valid JSON or its top level is not
/// an object.
pub fn from_json(input: &str) -> ValueResult<AttributeDocument> {
    let parsed: serde_json::Value =
        serde_json::from_str(input).map_err(|e| ValueError::invalid_json(e.to_string()))?;

    match parsed {
        serde_json::Value::Object(entries) => Ok(entries
            .into_iter()
            .map(|(name, value)| (name, value_from_json(value)))
            .collect()),
        other => Err(ValueError::non_object_document(json_type_name(&other))),
    }
}

fn value_from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                // Fractional, exponent-form, or beyond the i64 range.
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(items) => {
            Value::Array(items.into_iter().map(value_from_json).collect())
        }
        serde_json::Value::Object(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k, value_from_json(v)))
                .collect(),
        ),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Timestamp(t) => {
                serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl Serialize for AttributeDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
