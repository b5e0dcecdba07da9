//! Per-field equality index
//!
//! Maps the [`CanonicalKey`] of a field's value to the slots of the documents
//! holding it. Slot lists are kept in ascending order, which is insertion
//! order, so lookups return matches in the order documents were first stored.
//!
//! Only equality lookups are supported. There is no range scan.

use docstore_core::CanonicalKey;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Slots sharing one key. Most keys of most fields are unique, so a single
/// slot is stored inline.
pub type SlotList = SmallVec<[usize; 1]>;

/// Equality index over one field of one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIndex {
    field: String,
    entries: FxHashMap<CanonicalKey, SlotList>,
}

impl FieldIndex {
    /// Create an empty index for `field`
    pub fn new(field: impl Into<String>) -> Self {
        FieldIndex {
            field: field.into(),
            entries: FxHashMap::default(),
        }
    }

    /// Name of the indexed field
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Record that the document in `slot` holds `key`
    pub fn insert(&mut self, key: CanonicalKey, slot: usize) {
        let slots = self.entries.entry(key).or_default();
        match slots.last() {
            // Appends are the common case
            None => slots.push(slot),
            Some(&last) if last < slot => slots.push(slot),
            Some(_) => {
                if let Err(pos) = slots.binary_search(&slot) {
                    slots.insert(pos, slot);
                }
            }
        }
    }

    /// Remove `slot` from the list for `key`
    ///
    /// Returns true if the slot was present. Keys left with no slots are dropped.
    pub fn remove(&mut self, key: &CanonicalKey, slot: usize) -> bool {
        let Some(slots) = self.entries.get_mut(key) else {
            return false;
        };
        let removed = match slots.binary_search(&slot) {
            Ok(pos) => {
                slots.remove(pos);
                true
            }
            Err(_) => false,
        };
        if slots.is_empty() {
            self.entries.remove(key);
        }
        removed
    }

    /// Slots holding `key`, ascending
    pub fn lookup(&self, key: &CanonicalKey) -> &[usize] {
        self.entries.get(key).map(|s| s.as_slice()).unwrap_or(&[])
    }

    /// Iterate every distinct key with its slots
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, &[usize])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of distinct keys
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of `(key, slot)` entries
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(|s| s.len()).sum()
    }

    /// Returns true if the index holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
