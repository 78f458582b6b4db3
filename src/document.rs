//! Document model: typed field values, external identity, fingerprints.
//!
//! A [`Document`] is an ordered mapping from field name to [`FieldValue`].
//! The distinguished `id` field carries the caller's identity for the
//! document; every other field is payload. Fields named in the index
//! configuration are tokenized and indexed; the rest still participate in
//! the content fingerprint, so `remove` detects any mutation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::IndexError;

/// Content fingerprint of a document as inserted (SHA-256).
pub(crate) type Fingerprint = [u8; 32];

/// A typed field value attached to a document.
///
/// Text, integer, float, and boolean values have a canonical text
/// rendering and can be indexed. Null, arrays, and objects can be stored
/// and projected back, but indexing one raises
/// [`IndexError::FieldNotString`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// UTF-8 text.
    Text(String),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating-point number.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
    /// Explicit null.
    Null,
    /// Array of values.
    Array(Vec<FieldValue>),
    /// Nested object.
    Object(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Canonical text rendering fed to the tokenizer, or `None` when the
    /// value has no such rendering.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::Null | FieldValue::Array(_) | FieldValue::Object(_) => None,
        }
    }

    /// Returns the text content, without rendering other types.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Integer(i as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::Array(items)
    }
}

/// External document identity, taken from the `id` field.
///
/// Ordered and hashable so it can key the registry maps. The index never
/// exposes its internal short ids; this is the only identity surfaced in
/// search results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    /// Integer identity.
    Integer(i64),
    /// Text identity.
    Text(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Integer(i) => write!(f, "{i}"),
            DocumentId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for DocumentId {
    fn from(i: i64) -> Self {
        DocumentId::Integer(i)
    }
}

impl From<i32> for DocumentId {
    fn from(i: i32) -> Self {
        DocumentId::Integer(i as i64)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId::Text(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        DocumentId::Text(s)
    }
}

/// A document: an ordered field name → value mapping.
///
/// The same `Document` value presented to `add` must be presented to
/// `remove`; the index compares content fingerprints and refuses to remove
/// anything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Creates a document carrying the given external identity in `id`.
    pub fn new(id: impl Into<DocumentId>) -> Self {
        let value = match id.into() {
            DocumentId::Integer(i) => FieldValue::Integer(i),
            DocumentId::Text(s) => FieldValue::Text(s),
        };
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), value);
        Self { fields }
    }

    /// Builder-style field setter.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Iterates over all fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields, the `id` field included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the document has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// External identity from the `id` field.
    pub fn id(&self) -> Result<DocumentId, IndexError> {
        match self.fields.get("id") {
            Some(FieldValue::Text(s)) => Ok(DocumentId::Text(s.clone())),
            Some(FieldValue::Integer(i)) => Ok(DocumentId::Integer(*i)),
            _ => Err(IndexError::DocumentMissingId),
        }
    }

    /// SHA-256 over the ordered field representation.
    ///
    /// Covers every field, indexed or not. Field names and values are
    /// length/tag-delimited so distinct documents cannot collide by
    /// concatenation.
    pub(crate) fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        for (name, value) in &self.fields {
            hasher.update((name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
            hash_value(&mut hasher, value);
        }
        hasher.finalize().into()
    }
}

fn hash_value(hasher: &mut Sha256, value: &FieldValue) {
    match value {
        FieldValue::Text(s) => {
            hasher.update([0x01]);
            hasher.update((s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }
        FieldValue::Integer(i) => {
            hasher.update([0x02]);
            hasher.update(i.to_le_bytes());
        }
        FieldValue::Float(f) => {
            hasher.update([0x03]);
            hasher.update(f.to_le_bytes());
        }
        FieldValue::Boolean(b) => {
            hasher.update([0x04, *b as u8]);
        }
        FieldValue::Null => {
            hasher.update([0x05]);
        }
        FieldValue::Array(items) => {
            hasher.update([0x06]);
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                hash_value(hasher, item);
            }
        }
        FieldValue::Object(map) => {
            hasher.update([0x07]);
            hasher.update((map.len() as u64).to_le_bytes());
            for (key, item) in map {
                hasher.update((key.len() as u64).to_le_bytes());
                hasher.update(key.as_bytes());
                hash_value(hasher, item);
            }
        }
    }
}
