//! Collections: documents plus their primary-key set and field indexes
//!
//! A collection owns one `RwLock` guarding everything it holds. Writers take
//! the write lock for a whole batch, readers take the read lock, so a reader
//! never observes a half-applied batch.
//!
//! ## Lifecycle
//!
//! `Active` until dropped. Dropping clears the contents and marks the
//! instance dropped under the write lock. Writers obtain access through
//! [`Collection::write_active`], which refuses a dropped instance so the
//! store can retry against a fresh one.
//!
//! ## Slots
//!
//! Documents live in a `Vec` in insertion order. A document's index in that
//! `Vec` is its slot. Slots never move: `save` replaces a document in its
//! existing slot.

use docstore_core::{CanonicalKey, Document, Error, Result, ScalarValue, DOC_ID};
use parking_lot::{RwLock, RwLockWriteGuard};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::index::FieldIndex;

/// Result of a `save`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No document had this `_id`; it was appended
    Inserted,
    /// A document with this `_id` was replaced in its slot
    Replaced,
}

#[derive(Debug, Default)]
struct CollectionState {
    dropped: bool,
    documents: Vec<Document>,
    primary: FxHashMap<CanonicalKey, usize>,
    indexes: FxHashMap<String, FieldIndex>,
}

/// A named set of documents
#[derive(Debug)]
pub struct Collection {
    name: String,
    state: RwLock<CollectionState>,
}

impl Collection {
    /// Create an empty, active collection
    pub fn new(name: impl Into<String>) -> Self {
        Collection {
            name: name.into(),
            state: RwLock::new(CollectionState::default()),
        }
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true once the collection has been dropped
    pub fn is_dropped(&self) -> bool {
        self.state.read().dropped
    }

    /// Lock for writing, or `None` if this instance was dropped
    pub(crate) fn write_active(&self) -> Option<ActiveWrite<'_>> {
        let state = self.state.write();
        if state.dropped {
            return None;
        }
        Some(ActiveWrite {
            name: &self.name,
            state,
        })
    }

    /// Clear all contents and mark the instance dropped
    ///
    /// Returns the number of documents removed, or `None` if another caller
    /// already dropped this instance.
    pub(crate) fn mark_dropped(&self) -> Option<usize> {
        let mut state = self.state.write();
        if state.dropped {
            return None;
        }
        let removed = state.documents.len();
        state.dropped = true;
        state.documents = Vec::new();
        state.primary = FxHashMap::default();
        state.indexes = FxHashMap::default();
        Some(removed)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Number of documents
    pub fn len(&self) -> usize {
        self.state.read().documents.len()
    }

    /// Returns true if the collection holds no documents
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every document whose `field` equals `value`, in insertion order
    pub fn find_by_field(&self, field: &str, value: &ScalarValue) -> Vec<Document> {
        let state = self.state.read();
        let Some(index) = state.indexes.get(field) else {
            return Vec::new();
        };
        index
            .lookup(&value.canonical_key())
            .iter()
            .filter_map(|&slot| state.documents.get(slot).cloned())
            .collect()
    }

    /// First document whose `field` equals `value`
    pub fn find_one_by_field(&self, field: &str, value: &ScalarValue) -> Option<Document> {
        let state = self.state.read();
        let slot = *state
            .indexes
            .get(field)?
            .lookup(&value.canonical_key())
            .first()?;
        state.documents.get(slot).cloned()
    }

    /// Document with primary key `id`
    pub fn find_by_id(&self, id: &ScalarValue) -> Option<Document> {
        let state = self.state.read();
        let slot = *state.primary.get(&id.canonical_key())?;
        state.documents.get(slot).cloned()
    }

    /// Every document in insertion order
    pub fn find_all(&self) -> Vec<Document> {
        self.state.read().documents.clone()
    }

    /// Distinct values of `field`, sorted by kind then value
    pub fn distinct(&self, field: &str) -> Vec<ScalarValue> {
        let state = self.state.read();
        let Some(index) = state.indexes.get(field) else {
            return Vec::new();
        };
        let mut values: Vec<ScalarValue> = index
            .iter()
            .filter_map(|(_, slots)| {
                let slot = *slots.first()?;
                state.documents.get(slot)?.get(field).cloned()
            })
            .collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values
    }

    /// Names of fields that currently have an index, sorted
    pub fn indexed_fields(&self) -> Vec<String> {
        let state = self.state.read();
        let mut fields: Vec<String> = state.indexes.keys().cloned().collect();
        fields.sort();
        fields
    }

    /// Rebuild the primary-key set and indexes from the documents and compare
    ///
    /// # Errors
    /// `Error::InvariantViolation` describing the first divergence found.
    pub fn check_integrity(&self) -> Result<()> {
        let state = self.state.read();

        let mut primary: FxHashMap<CanonicalKey, usize> = FxHashMap::default();
        let mut indexes: FxHashMap<String, FieldIndex> = FxHashMap::default();
        for (slot, doc) in state.documents.iter().enumerate() {
            let id = doc.id().ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "collection '{}': document in slot {} has no {}",
                    self.name, slot, DOC_ID
                ))
            })?;
            if primary.insert(id.canonical_key(), slot).is_some() {
                return Err(Error::InvariantViolation(format!(
                    "collection '{}': {} {} stored twice",
                    self.name, DOC_ID, id
                )));
            }
            for (field, value) in doc.iter() {
                indexes
                    .entry(field.to_string())
                    .or_insert_with(|| FieldIndex::new(field))
                    .insert(value.canonical_key(), slot);
            }
        }

        if primary != state.primary {
            return Err(Error::InvariantViolation(format!(
                "collection '{}': primary key set diverges from documents",
                self.name
            )));
        }
        if indexes.len() != state.indexes.len() {
            return Err(Error::InvariantViolation(format!(
                "collection '{}': {} field indexes, documents imply {}",
                self.name,
                state.indexes.len(),
                indexes.len()
            )));
        }
        for (field, rebuilt) in &indexes {
            if state.indexes.get(field) != Some(rebuilt) {
                return Err(Error::InvariantViolation(format!(
                    "collection '{}': index on '{}' diverges from documents",
                    self.name, field
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Writes
// ============================================================================

/// Write access to an active collection
///
/// Holds the collection's write lock for its lifetime.
pub(crate) struct ActiveWrite<'a> {
    name: &'a str,
    state: RwLockWriteGuard<'a, CollectionState>,
}

impl ActiveWrite<'_> {
    /// Insert a batch atomically
    ///
    /// Every document must already carry `_id`. Uniqueness is checked for the
    /// whole batch before anything is stored; on any collision nothing changes.
    pub(crate) fn insert_batch(&mut self, documents: Vec<Document>) -> Result<Vec<ScalarValue>> {
        let mut seen: FxHashSet<CanonicalKey> = FxHashSet::default();
        let mut ids = Vec::with_capacity(documents.len());
        let mut keys = Vec::with_capacity(documents.len());

        for (position, doc) in documents.iter().enumerate() {
            let id = doc.id().ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "document at batch position {} reached storage without {}",
                    position, DOC_ID
                ))
            })?;
            let key = id.canonical_key();
            if self.state.primary.contains_key(&key) || !seen.insert(key.clone()) {
                return Err(Error::DuplicateKey {
                    collection: self.name.to_string(),
                    key: id.to_string(),
                    position,
                });
            }
            ids.push(id.clone());
            keys.push(key);
        }

        for (doc, key) in documents.into_iter().zip(keys) {
            let slot = self.state.documents.len();
            self.index_document(&doc, slot);
            self.state.primary.insert(key, slot);
            self.state.documents.push(doc);
        }
        Ok(ids)
    }

    /// Insert or replace by `_id`
    ///
    /// A replacement keeps the stored `_id` value exactly, so a key equal
    /// only canonically (`-0.0` over `0.0`) does not rewrite it. `doc` is
    /// updated to what was stored.
    pub(crate) fn save(&mut self, doc: &mut Document) -> Result<SaveOutcome> {
        let key = doc
            .id()
            .ok_or_else(|| {
                Error::InvariantViolation(format!("document reached storage without {}", DOC_ID))
            })?
            .canonical_key();

        match self.state.primary.get(&key).copied() {
            Some(slot) => {
                let old = match self.state.documents.get_mut(slot) {
                    Some(existing) => {
                        if let Some(stored_id) = existing.id().cloned() {
                            doc.insert(DOC_ID, stored_id);
                        }
                        std::mem::replace(existing, doc.clone())
                    }
                    None => {
                        return Err(Error::InvariantViolation(format!(
                            "collection '{}': primary key points at missing slot {}",
                            self.name, slot
                        )))
                    }
                };
                self.unindex_document(&old, slot);
                self.index_document(doc, slot);
                Ok(SaveOutcome::Replaced)
            }
            None => {
                let slot = self.state.documents.len();
                self.index_document(doc, slot);
                self.state.primary.insert(key, slot);
                self.state.documents.push(doc.clone());
                Ok(SaveOutcome::Inserted)
            }
        }
    }

    fn index_document(&mut self, doc: &Document, slot: usize) {
        for (field, value) in doc.iter() {
            if !self.state.indexes.contains_key(field) {
                debug!(target: "docstore::index", collection = %self.name, field, "Field index created");
                self.state
                    .indexes
                    .insert(field.to_string(), FieldIndex::new(field));
            }
            if let Some(index) = self.state.indexes.get_mut(field) {
                index.insert(value.canonical_key(), slot);
            }
        }
    }

    fn unindex_document(&mut self, doc: &Document, slot: usize) {
        for (field, value) in doc.iter() {
            let now_empty = match self.state.indexes.get_mut(field) {
                Some(index) => {
                    index.remove(&value.canonical_key(), slot);
                    index.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.state.indexes.remove(field);
            }
        }
    }
}
