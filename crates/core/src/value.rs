//! Value types for the document store
//!
//! This module defines:
//! - ScalarKind: the closed set of eight scalar kinds
//! - ScalarValue: a tagged union over those kinds
//! - ValueOrdering: result of a same-kind comparison
//!
//! ## Type Rules
//!
//! - Eight kinds only
//! - No implicit coercions: `Int32(5) != Int64(5)`, `Int64(42) != Float64(42.0)`,
//!   `Int32(1) != Boolean(true)`, `Text("1") != Int32(1)`
//! - Equality and hashing dispatch on the kind first, then compare the
//!   canonical representation of the payload (see [`CanonicalKey`])
//! - `Float64` equality uses canonical bits: `-0.0 == 0.0` and `NaN == NaN`,
//!   so every value is equal to itself and can key a hash index. The stored
//!   bits are never rewritten.

use crate::canonical::CanonicalKey;
use crate::object_id::ObjectId;
use crate::timestamp::Timestamp;
use crate::unique_id::UniqueId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

// ============================================================================
// ScalarKind
// ============================================================================

/// The kind of a [`ScalarValue`]
///
/// Variant order is the bucketing order used by [`ScalarValue::total_cmp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    /// 12-byte object identifier
    ObjectId,
    /// UTF-8 string
    Text,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// IEEE-754 double
    Float64,
    /// true / false
    Boolean,
    /// Milliseconds since epoch
    Timestamp,
    /// 128-bit UUID
    UniqueId,
}

impl ScalarKind {
    /// Every kind, in bucketing order
    pub const ALL: [ScalarKind; 8] = [
        ScalarKind::ObjectId,
        ScalarKind::Text,
        ScalarKind::Int32,
        ScalarKind::Int64,
        ScalarKind::Float64,
        ScalarKind::Boolean,
        ScalarKind::Timestamp,
        ScalarKind::UniqueId,
    ];

    /// Stable one-byte tag. Part of [`CanonicalKey`] and of `hash64`; MUST NOT change.
    pub const fn tag(self) -> u8 {
        match self {
            ScalarKind::ObjectId => 0x01,
            ScalarKind::Text => 0x02,
            ScalarKind::Int32 => 0x03,
            ScalarKind::Int64 => 0x04,
            ScalarKind::Float64 => 0x05,
            ScalarKind::Boolean => 0x06,
            ScalarKind::Timestamp => 0x07,
            ScalarKind::UniqueId => 0x08,
        }
    }

    /// Kind name used in debug rendering
    pub const fn as_str(self) -> &'static str {
        match self {
            ScalarKind::ObjectId => "ObjectId",
            ScalarKind::Text => "Text",
            ScalarKind::Int32 => "Int32",
            ScalarKind::Int64 => "Int64",
            ScalarKind::Float64 => "Float64",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Timestamp => "Timestamp",
            ScalarKind::UniqueId => "UniqueId",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ValueOrdering
// ============================================================================

/// Outcome of [`ScalarValue::compare_order`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrdering {
    /// Same kind, left sorts first
    Less,
    /// Same kind, equal canonical representation
    Equal,
    /// Same kind, left sorts last
    Greater,
    /// Different kinds
    Incomparable,
}

impl ValueOrdering {
    /// Convert to `std::cmp::Ordering`, `None` when incomparable
    pub fn to_ordering(self) -> Option<Ordering> {
        match self {
            ValueOrdering::Less => Some(Ordering::Less),
            ValueOrdering::Equal => Some(Ordering::Equal),
            ValueOrdering::Greater => Some(Ordering::Greater),
            ValueOrdering::Incomparable => None,
        }
    }
}

impl From<Ordering> for ValueOrdering {
    fn from(o: Ordering) -> Self {
        match o {
            Ordering::Less => ValueOrdering::Less,
            Ordering::Equal => ValueOrdering::Equal,
            Ordering::Greater => ValueOrdering::Greater,
        }
    }
}

// ============================================================================
// ScalarValue
// ============================================================================

/// A typed scalar value
///
/// Different kinds are NEVER equal, even if they hold the same number:
/// - `Int32(1) != Int64(1)`
/// - `Int64(42) != Float64(42.0)`
/// - `Int32(1) != Boolean(true)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScalarValue {
    /// 12-byte object identifier
    ObjectId(ObjectId),
    /// UTF-8 string
    Text(String),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// IEEE-754 double
    Float64(#[serde(with = "float_repr")] f64),
    /// Boolean
    Boolean(bool),
    /// Milliseconds since epoch
    Timestamp(Timestamp),
    /// 128-bit UUID
    UniqueId(UniqueId),
}

/// Serde form of `Float64` payloads
///
/// Finite values are plain numbers. NaN and the infinities are written as
/// the strings `"NaN"`, `"Infinity"` and `"-Infinity"`, since formats such as
/// JSON have no number for them.
mod float_repr {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(f: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if f.is_finite() {
            serializer.serialize_f64(*f)
        } else {
            serializer.serialize_str(&super::format_double(*f))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(FloatVisitor)
    }

    struct FloatVisitor;

    impl<'de> Visitor<'de> for FloatVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or one of \"NaN\", \"Infinity\", \"-Infinity\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }
}

/// Canonical bit pattern of a float for equality and hashing
///
/// Collapses `-0.0` onto `0.0` and every NaN payload onto one quiet NaN.
#[inline]
pub(crate) fn canonical_f64_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0
    } else {
        f.to_bits()
    }
}

impl ScalarValue {
    /// Get the kind of this value
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::ObjectId(_) => ScalarKind::ObjectId,
            ScalarValue::Text(_) => ScalarKind::Text,
            ScalarValue::Int32(_) => ScalarKind::Int32,
            ScalarValue::Int64(_) => ScalarKind::Int64,
            ScalarValue::Float64(_) => ScalarKind::Float64,
            ScalarValue::Boolean(_) => ScalarKind::Boolean,
            ScalarValue::Timestamp(_) => ScalarKind::Timestamp,
            ScalarValue::UniqueId(_) => ScalarKind::UniqueId,
        }
    }

    /// Build the `(kind, canonical bytes)` index key for this value
    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::of(self)
    }

    /// Stable 64-bit hash consistent with equality
    ///
    /// Computed with xxh3 over the canonical key, so it does not change
    /// between processes or releases.
    pub fn hash64(&self) -> u64 {
        self.canonical_key().hash64()
    }

    /// Compare two values of the same kind
    ///
    /// Returns `Incomparable` when the kinds differ.
    pub fn compare_order(&self, other: &ScalarValue) -> ValueOrdering {
        use ScalarValue as V;
        let ord = match (self, other) {
            (V::ObjectId(a), V::ObjectId(b)) => a.cmp(b),
            (V::Text(a), V::Text(b)) => a.cmp(b),
            (V::Int32(a), V::Int32(b)) => a.cmp(b),
            (V::Int64(a), V::Int64(b)) => a.cmp(b),
            (V::Float64(a), V::Float64(b)) => f64::from_bits(canonical_f64_bits(*a))
                .total_cmp(&f64::from_bits(canonical_f64_bits(*b))),
            (V::Boolean(a), V::Boolean(b)) => a.cmp(b),
            (V::Timestamp(a), V::Timestamp(b)) => a.cmp(b),
            (V::UniqueId(a), V::UniqueId(b)) => a.cmp(b),
            _ => return ValueOrdering::Incomparable,
        };
        ord.into()
    }

    /// Total order: by kind first, then by [`compare_order`](Self::compare_order)
    ///
    /// Used to bucket and sort index keys. Consistent with `Eq`.
    pub fn total_cmp(&self, other: &ScalarValue) -> Ordering {
        self.kind()
            .cmp(&other.kind())
            .then_with(|| self.compare_order(other).to_ordering().unwrap_or(Ordering::Equal))
    }

    /// Get as `ObjectId` if this is an ObjectId value
    pub fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            ScalarValue::ObjectId(id) => Some(*id),
            _ => None,
        }
    }

    /// Get as `&str` if this is a Text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as `i32` if this is an Int32 value
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ScalarValue::Int32(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as `i64` if this is an Int64 value. Int32 values are not widened.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int64(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as `f64` if this is a Float64 value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as `bool` if this is a Boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as `Timestamp` if this is a Timestamp value
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            ScalarValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Get as `UniqueId` if this is a UniqueId value
    pub fn as_unique_id(&self) -> Option<UniqueId> {
        match self {
            ScalarValue::UniqueId(u) => Some(*u),
            _ => None,
        }
    }

    /// Canonical Extended JSON rendering
    ///
    /// Every kind keeps a distinct shape so the rendering is unambiguous:
    /// `{"$oid": ..}`, `{"$numberInt": ..}`, `{"$numberLong": ..}`,
    /// `{"$numberDouble": ..}`, `{"$date": {"$numberLong": ..}}`, `{"$uuid": ..}`.
    pub fn to_extended_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            ScalarValue::ObjectId(id) => json!({ "$oid": id.to_hex() }),
            ScalarValue::Text(s) => json!(s),
            ScalarValue::Int32(n) => json!({ "$numberInt": n.to_string() }),
            ScalarValue::Int64(n) => json!({ "$numberLong": n.to_string() }),
            ScalarValue::Float64(f) => json!({ "$numberDouble": format_double(*f) }),
            ScalarValue::Boolean(b) => json!(b),
            ScalarValue::Timestamp(t) => {
                json!({ "$date": { "$numberLong": t.as_millis().to_string() } })
            }
            ScalarValue::UniqueId(u) => json!({ "$uuid": u.to_string() }),
        }
    }
}

fn format_double(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{:?}", f)
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        use ScalarValue as V;
        match (self, other) {
            (V::ObjectId(a), V::ObjectId(b)) => a == b,
            (V::Text(a), V::Text(b)) => a == b,
            (V::Int32(a), V::Int32(b)) => a == b,
            (V::Int64(a), V::Int64(b)) => a == b,
            (V::Float64(a), V::Float64(b)) => canonical_f64_bits(*a) == canonical_f64_bits(*b),
            (V::Boolean(a), V::Boolean(b)) => a == b,
            (V::Timestamp(a), V::Timestamp(b)) => a == b,
            (V::UniqueId(a), V::UniqueId(b)) => a == b,
            // Different kinds are never equal
            _ => false,
        }
    }
}

impl Eq for ScalarValue {}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.kind().tag());
        match self {
            ScalarValue::ObjectId(id) => id.as_bytes().hash(state),
            ScalarValue::Text(s) => s.hash(state),
            ScalarValue::Int32(n) => n.hash(state),
            ScalarValue::Int64(n) => n.hash(state),
            ScalarValue::Float64(f) => canonical_f64_bits(*f).hash(state),
            ScalarValue::Boolean(b) => b.hash(state),
            ScalarValue::Timestamp(t) => t.hash(state),
            ScalarValue::UniqueId(u) => u.as_bytes().hash(state),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::ObjectId(id) => write!(f, "ObjectId(\"{}\")", id),
            ScalarValue::Text(s) => write!(f, "Text({:?})", s),
            ScalarValue::Int32(n) => write!(f, "Int32({})", n),
            ScalarValue::Int64(n) => write!(f, "Int64({})", n),
            ScalarValue::Float64(x) => write!(f, "Float64({:?})", x),
            ScalarValue::Boolean(b) => write!(f, "Boolean({})", b),
            ScalarValue::Timestamp(t) => write!(f, "Timestamp(\"{}\")", t),
            ScalarValue::UniqueId(u) => write!(f, "UniqueId(\"{}\")", u),
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&ScalarValue> for ScalarValue {
    fn from(v: &ScalarValue) -> Self {
        v.clone()
    }
}

impl From<ObjectId> for ScalarValue {
    fn from(id: ObjectId) -> Self {
        ScalarValue::ObjectId(id)
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Text(s)
    }
}

impl From<i32> for ScalarValue {
    fn from(n: i32) -> Self {
        ScalarValue::Int32(n)
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        ScalarValue::Int64(n)
    }
}

impl From<f64> for ScalarValue {
    fn from(f: f64) -> Self {
        ScalarValue::Float64(f)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Boolean(b)
    }
}

impl From<Timestamp> for ScalarValue {
    fn from(t: Timestamp) -> Self {
        ScalarValue::Timestamp(t)
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(dt: DateTime<Utc>) -> Self {
        ScalarValue::Timestamp(Timestamp::from_datetime(dt))
    }
}

impl From<SystemTime> for ScalarValue {
    fn from(t: SystemTime) -> Self {
        ScalarValue::Timestamp(Timestamp::from_system_time(t))
    }
}

impl From<UniqueId> for ScalarValue {
    fn from(u: UniqueId) -> Self {
        ScalarValue::UniqueId(u)
    }
}

impl From<uuid::Uuid> for ScalarValue {
    fn from(u: uuid::Uuid) -> Self {
        ScalarValue::UniqueId(UniqueId::from(u))
    }
}
