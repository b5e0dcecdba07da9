//! 128-bit universally unique identifiers
//!
//! A thin wrapper around [`uuid::Uuid`] that fixes the accepted textual form.
//! Only the canonical hyphenated 8-4-4-4-12 form is parsed; hex digits may be
//! either case. The value is held as 16 bytes, so equality is bitwise and
//! `"ABCDEF…"` and `"abcdef…"` parse to the same id.

use crate::error::{Error, Result};
use crate::value::ScalarKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Positions of the hyphens in the canonical form
const HYPHENS: [usize; 4] = [8, 13, 18, 23];

/// A 128-bit unique identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UniqueId(Uuid);

impl UniqueId {
    /// Generate a random (version 4) identifier
    pub fn new_v4() -> Self {
        UniqueId(Uuid::new_v4())
    }

    /// Wrap a 16-byte buffer
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        UniqueId(Uuid::from_bytes(bytes))
    }

    /// Parse the canonical hyphenated form (case-insensitive)
    ///
    /// # Errors
    /// Returns `Error::Format` for any other shape, including the simple
    /// (unhyphenated), braced and URN forms.
    pub fn parse_str(s: &str) -> Result<Self> {
        if s.len() != 36 {
            return Err(Error::format(
                ScalarKind::UniqueId,
                s,
                "expected 36 characters in 8-4-4-4-12 form",
            ));
        }

        let bytes = s.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            let ok = if HYPHENS.contains(&i) {
                *b == b'-'
            } else {
                b.is_ascii_hexdigit()
            };
            if !ok {
                return Err(Error::format(
                    ScalarKind::UniqueId,
                    s,
                    format!("unexpected character at position {}", i),
                ));
            }
        }

        Uuid::try_parse(s)
            .map(UniqueId)
            .map_err(|e| Error::format(ScalarKind::UniqueId, s, e.to_string()))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// The wrapped `uuid::Uuid`
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for UniqueId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        UniqueId::parse_str(s)
    }
}

impl From<Uuid> for UniqueId {
    fn from(uuid: Uuid) -> Self {
        UniqueId(uuid)
    }
}

impl From<UniqueId> for Uuid {
    fn from(id: UniqueId) -> Self {
        id.0
    }
}

impl From<[u8; 16]> for UniqueId {
    fn from(bytes: [u8; 16]) -> Self {
        UniqueId::from_bytes(bytes)
    }
}

impl Serialize for UniqueId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for UniqueId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        UniqueId::parse_str(&s).map_err(serde::de::Error::custom)
    }
}
