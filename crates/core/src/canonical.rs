//! Canonical index keys
//!
//! A [`CanonicalKey`] is the `(kind, canonical bytes)` pair that both the
//! primary-key set and the field indexes hash on. Two values produce equal
//! keys exactly when they are equal under the kind-aware equality rules.
//!
//! | Kind      | Canonical bytes                    |
//! |-----------|------------------------------------|
//! | ObjectId  | the 12 raw bytes                   |
//! | Text      | UTF-8 bytes                        |
//! | Int32     | 4 bytes big-endian                 |
//! | Int64     | 8 bytes big-endian                 |
//! | Float64   | canonical bits, 8 bytes big-endian |
//! | Boolean   | 1 byte (0 or 1)                    |
//! | Timestamp | milliseconds, 8 bytes big-endian   |
//! | UniqueId  | the 16 raw bytes                   |

use crate::value::{canonical_f64_bits, ScalarKind, ScalarValue};
use smallvec::SmallVec;
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// Kind-tagged canonical byte encoding of a [`ScalarValue`]
///
/// Fixed-width kinds fit inline; only Text longer than 16 bytes allocates.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    kind: ScalarKind,
    bytes: SmallVec<[u8; 16]>,
}

impl CanonicalKey {
    /// Encode a value
    pub fn of(value: &ScalarValue) -> Self {
        let bytes: SmallVec<[u8; 16]> = match value {
            ScalarValue::ObjectId(id) => SmallVec::from_slice(id.as_bytes()),
            ScalarValue::Text(s) => SmallVec::from_slice(s.as_bytes()),
            ScalarValue::Int32(n) => SmallVec::from_slice(&n.to_be_bytes()),
            ScalarValue::Int64(n) => SmallVec::from_slice(&n.to_be_bytes()),
            ScalarValue::Float64(f) => SmallVec::from_slice(&canonical_f64_bits(*f).to_be_bytes()),
            ScalarValue::Boolean(b) => SmallVec::from_slice(&[*b as u8]),
            ScalarValue::Timestamp(t) => SmallVec::from_slice(&t.as_millis().to_be_bytes()),
            ScalarValue::UniqueId(u) => SmallVec::from_slice(u.as_bytes()),
        };
        CanonicalKey {
            kind: value.kind(),
            bytes,
        }
    }

    /// Kind of the encoded value
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Canonical payload bytes (without the kind tag)
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Stable xxh3 hash over the kind tag followed by the payload
    pub fn hash64(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.update(&[self.kind.tag()]);
        hasher.update(&self.bytes);
        hasher.digest()
    }
}

impl fmt::Debug for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalKey({}, ", self.kind)?;
        for b in self.bytes.iter() {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

impl From<&ScalarValue> for CanonicalKey {
    fn from(value: &ScalarValue) -> Self {
        CanonicalKey::of(value)
    }
}
