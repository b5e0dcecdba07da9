//! 12-byte object identifiers
//!
//! ## Layout
//!
//! | Bytes | Contents |
//! |-------|----------|
//! | 0..4  | seconds since Unix epoch, big-endian |
//! | 4..9  | random value chosen once per process |
//! | 9..12 | counter, big-endian, seeded randomly |
//!
//! The time prefix makes freshly generated ids roughly sortable by creation
//! time; the process value and counter make them unique within and across
//! processes with overwhelming probability.

use crate::error::{Error, Result};
use crate::timestamp::Timestamp;
use crate::value::ScalarKind;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

/// Random value shared by every id generated in this process
static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(rand::random);

/// Per-process counter; only the low 24 bits are used
static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::random::<u32>() & 0x00FF_FFFF));

const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// A 12-byte object identifier, displayed as 24 lowercase hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generate a new identifier
    pub fn new() -> Self {
        let secs = Timestamp::now().as_secs() as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        ObjectId(bytes)
    }

    /// Wrap raw bytes
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId(bytes)
    }

    /// Parse from a 24-digit hex string (either case)
    ///
    /// # Errors
    /// Returns `Error::Format` if the string is not exactly 24 hex digits.
    pub fn parse_str(s: &str) -> Result<Self> {
        if s.len() != 24 {
            return Err(Error::format(
                ScalarKind::ObjectId,
                s,
                format!("expected 24 hex digits, got {} characters", s.chars().count()),
            ));
        }

        let mut bytes = [0u8; 12];
        let digits = s.as_bytes();
        for (i, byte) in bytes.iter_mut().enumerate() {
            let hi = hex_value(digits[2 * i]);
            let lo = hex_value(digits[2 * i + 1]);
            match (hi, lo) {
                (Some(hi), Some(lo)) => *byte = (hi << 4) | lo,
                _ => {
                    return Err(Error::format(
                        ScalarKind::ObjectId,
                        s,
                        "contains a non-hexadecimal character",
                    ))
                }
            }
        }
        Ok(ObjectId(bytes))
    }

    /// Raw bytes
    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Borrow the raw bytes
    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Creation time embedded in the id (second resolution)
    pub fn timestamp(&self) -> Timestamp {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Timestamp::from_secs(secs as i64)
    }

    /// Lowercase 24-digit hex rendering
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ObjectId::parse_str(s)
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        ObjectId(bytes)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ObjectId::parse_str(&s).map_err(serde::de::Error::custom)
    }
}
