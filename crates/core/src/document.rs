//! Documents: ordered mappings from field names to scalar values
//!
//! Field order is the order of first insertion. Setting a field that already
//! exists replaces its value in place, so a field name appears at most once.
//! The reserved field [`DOC_ID`] holds the primary key.

use crate::value::ScalarValue;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Name of the primary-key field
pub const DOC_ID: &str = "_id";

/// An ordered set of `(field name, value)` pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Vec<(String, ScalarValue)>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Document { fields: Vec::new() }
    }

    /// Create a document whose first field is `_id`
    pub fn with_id(id: impl Into<ScalarValue>) -> Self {
        Document::new().append(DOC_ID, id)
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn append(mut self, field: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field, returning the previous value if it existed
    ///
    /// An existing field keeps its position.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<ScalarValue>,
    ) -> Option<ScalarValue> {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((field, value));
                None
            }
        }
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, field: &str) -> Option<ScalarValue> {
        let pos = self.fields.iter().position(|(name, _)| name == field)?;
        Some(self.fields.remove(pos).1)
    }

    /// Look up a field
    pub fn get(&self, field: &str) -> Option<&ScalarValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Returns true if the field is present
    pub fn contains_field(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// The `_id` value, if present
    pub fn id(&self) -> Option<&ScalarValue> {
        self.get(DOC_ID)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the document has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Iterate field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Canonical Extended JSON object
    ///
    /// Keys follow `serde_json::Map` ordering, not document order.
    pub fn to_extended_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_extended_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "{{}}");
        }
        write!(f, "{{ ")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, " }}")
    }
}

impl<K, V> FromIterator<(K, V)> for Document
where
    K: Into<String>,
    V: Into<ScalarValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl IntoIterator for Document {
    type Item = (String, ScalarValue);
    type IntoIter = std::vec::IntoIter<(String, ScalarValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

// ============================================================================
// Serde: a map in field order
// ============================================================================

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of field names to scalar values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Document, A::Error> {
        let mut doc = Document::new();
        while let Some((name, value)) = access.next_entry::<String, ScalarValue>()? {
            doc.insert(name, value);
        }
        Ok(doc)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(DocumentVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectId, ScalarKind};

    #[test]
    fn test_builder_preserves_order() {
        let doc = Document::with_id(1i32).append("type", "Integer").append("value", 7i64);
        let keys: Vec<&str> = doc.keys().collect();
        assert_eq!(keys, vec!["_id", "type", "value"]);
        assert_eq!(doc.id(), Some(&ScalarValue::Int32(1)));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut doc = Document::new().append("a", 1i32).append("b", 2i32);
        let old = doc.insert("a", "one");
        assert_eq!(old, Some(ScalarValue::Int32(1)));
        assert_eq!(doc.len(), 2);
        let keys: Vec<&str> = doc.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(doc.get("a"), Some(&ScalarValue::Text("one".into())));
    }

    #[test]
    fn test_remove() {
        let mut doc = Document::new().append("a", 1i32).append("b", 2i32);
        assert_eq!(doc.remove("a"), Some(ScalarValue::Int32(1)));
        assert_eq!(doc.remove("a"), None);
        assert_eq!(doc.len(), 1);
        assert!(!doc.contains_field("a"));
    }

    #[test]
    fn test_missing_field_and_id() {
        let doc = Document::new().append("type", "String");
        assert!(doc.get("value").is_none());
        assert!(doc.id().is_none());
        assert!(Document::new().is_empty());
    }

    #[test]
    fn test_dotted_name_is_literal() {
        let doc = Document::new().append("a.b", 1i32);
        assert!(doc.get("a.b").is_some());
        assert!(doc.get("a").is_none());
    }

    #[test]
    fn test_from_iterator() {
        let doc: Document = vec![("x", 1i32), ("y", 2i32), ("x", 3i32)].into_iter().collect();
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get("x"), Some(&ScalarValue::Int32(3)));
    }

    #[test]
    fn test_display() {
        let doc = Document::new().append("type", "Long").append("value", 5i64);
        assert_eq!(doc.to_string(), r#"{ type: Text("Long"), value: Int64(5) }"#);
        assert_eq!(Document::new().to_string(), "{}");
    }

    #[test]
    fn test_extended_json() {
        let oid = ObjectId::parse_str("507f1f77bcf86cd799439011").unwrap();
        let doc = Document::with_id(oid).append("value", 1_234_567_890_123i64);
        let json = doc.to_extended_json();
        assert_eq!(json["_id"]["$oid"], "507f1f77bcf86cd799439011");
        assert_eq!(json["value"]["$numberLong"], "1234567890123");
    }

    #[test]
    fn test_serde_keeps_order_and_kinds() {
        let doc = Document::with_id("string_id")
            .append("type", "String")
            .append("n", 5i32)
            .append("m", 5i64);
        let json = serde_json::to_string(&doc).unwrap();
        let restored: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, doc);
        assert_eq!(restored.get("n").map(ScalarValue::kind), Some(ScalarKind::Int32));
        assert_eq!(restored.get("m").map(ScalarValue::kind), Some(ScalarKind::Int64));
        let keys: Vec<&str> = restored.keys().collect();
        assert_eq!(keys, vec!["_id", "type", "n", "m"]);
    }

    #[test]
    fn test_serde_non_finite_float_fields() {
        let doc = Document::with_id(1i32)
            .append("nan", f64::NAN)
            .append("inf", f64::INFINITY)
            .append("neg_inf", f64::NEG_INFINITY);
        let json = serde_json::to_string(&doc).unwrap();
        let restored: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, doc);
        assert!(restored.get("nan").and_then(ScalarValue::as_f64).unwrap().is_nan());
        assert_eq!(
            restored.get("neg_inf").and_then(ScalarValue::as_f64),
            Some(f64::NEG_INFINITY)
        );
    }
}
