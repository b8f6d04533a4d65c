//! Attribute document type.

use crate::value::Value;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// A flat mapping from attribute name to value.
///
/// This is the unit of storage for an entity's own attributes: one
/// document per entity, persisted as a single semi-structured column.
/// Keys are atomic strings; a `.` inside a key is part of the name, not a
/// path separator. Values may nest arbitrarily, but nothing below the top
/// level is interpreted by the attribute type system.
///
/// A *present-but-empty* document is a distinct, legal state from an
/// *unset* document; the latter is represented as `Option::None` wherever
/// documents cross an API boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeDocument {
    entries: BTreeMap<String, Value>,
}

impl AttributeDocument {
    /// Creates a new, explicitly empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `name`, if any.
    ///
    /// `None` means the key is absent; an explicit null comes back as
    /// `Some(&Value::Null)`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Returns true if the document contains `name`.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Sets `name` to `value`, replacing any previous value wholesale.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    /// Removes `name` from the document.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.remove(name)
    }

    /// Number of keys in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the document holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Iterates over the attribute names in key order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}

impl From<BTreeMap<String, Value>> for AttributeDocument {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, Value)> for AttributeDocument {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for AttributeDocument {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttributeDocument {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
