//! Document registry: external identity ↔ short id bookkeeping.
//!
//! Short ids are allocated from a monotonic counter and never reissued,
//! even after removal. The registry also keeps the content fingerprint
//! recorded at insertion; a remove must present a document whose
//! fingerprint still matches, otherwise the caller would be deleting
//! postings that no longer correspond to what it holds.

use std::collections::HashMap;

use crate::document::{DocumentId, Fingerprint};
use crate::error::IndexError;

/// Internal document identifier, unique within one index instance.
pub type ShortId = u32;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DocumentRegistry {
    ids: HashMap<DocumentId, ShortId>,
    short_ids: HashMap<ShortId, DocumentId>,
    hashes: HashMap<ShortId, Fingerprint>,
    next_id: ShortId,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            short_ids: HashMap::new(),
            hashes: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.ids.contains_key(id)
    }

    pub fn external_id(&self, short_id: ShortId) -> Option<&DocumentId> {
        self.short_ids.get(&short_id)
    }

    #[cfg(test)]
    pub fn short_id(&self, id: &DocumentId) -> Option<ShortId> {
        self.ids.get(id).copied()
    }

    #[cfg(test)]
    pub fn next_short_id(&self) -> ShortId {
        self.next_id
    }

    /// Equality on the registered documents alone; the allocation counter
    /// may differ.
    #[cfg(test)]
    pub fn same_entries(&self, other: &Self) -> bool {
        self.ids == other.ids && self.short_ids == other.short_ids && self.hashes == other.hashes
    }

    /// Allocates the next short id for `id` and stores its fingerprint.
    pub fn insert(&mut self, id: DocumentId, fingerprint: Fingerprint) -> Result<ShortId, IndexError> {
        if self.ids.contains_key(&id) {
            return Err(IndexError::DocumentExists);
        }
        let short_id = self.next_id;
        self.next_id += 1;
        self.ids.insert(id.clone(), short_id);
        self.short_ids.insert(short_id, id);
        self.hashes.insert(short_id, fingerprint);
        Ok(short_id)
    }

    /// Checks that `id` is registered under an identical fingerprint,
    /// without mutating anything.
    pub fn verify(&self, id: &DocumentId, fingerprint: &Fingerprint) -> Result<ShortId, IndexError> {
        let short_id = *self.ids.get(id).ok_or(IndexError::DocumentNotExists)?;
        if self.hashes.get(&short_id) != Some(fingerprint) {
            return Err(IndexError::DocumentMutated);
        }
        Ok(short_id)
    }

    /// Verifies the fingerprint and drops the document's entries.
    /// `next_id` is not rewound.
    pub fn remove(&mut self, id: &DocumentId, fingerprint: &Fingerprint) -> Result<ShortId, IndexError> {
        let short_id = self.verify(id, fingerprint)?;
        self.ids.remove(id);
        self.short_ids.remove(&short_id);
        self.hashes.remove(&short_id);
        Ok(short_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(byte: u8) -> Fingerprint {
        [byte; 32]
    }

    #[test]
    fn test_short_ids_are_monotonic() {
        let mut registry = DocumentRegistry::new();
        assert_eq!(registry.insert(DocumentId::Integer(100), fingerprint(1)).unwrap(), 1);
        assert_eq!(registry.insert(DocumentId::Integer(101), fingerprint(2)).unwrap(), 2);
        assert_eq!(registry.next_short_id(), 3);
    }

    #[test]
    fn test_short_ids_are_never_reused() {
        let mut registry = DocumentRegistry::new();
        let id = DocumentId::Integer(100);
        registry.insert(id.clone(), fingerprint(1)).unwrap();
        registry.remove(&id, &fingerprint(1)).unwrap();
        assert_eq!(registry.len(), 0);

        let short_id = registry.insert(id, fingerprint(1)).unwrap();
        assert_eq!(short_id, 2, "freed short id must not be reissued");
    }

    #[test]
    fn test_maps_are_mutual_inverses() {
        let mut registry = DocumentRegistry::new();
        let id = DocumentId::Text("doc".to_string());
        let short_id = registry.insert(id.clone(), fingerprint(1)).unwrap();
        assert_eq!(registry.short_id(&id), Some(short_id));
        assert_eq!(registry.external_id(short_id), Some(&id));
    }

    #[test]
    fn test_duplicate_insert() {
        let mut registry = DocumentRegistry::new();
        registry.insert(DocumentId::Integer(1), fingerprint(1)).unwrap();
        assert_eq!(
            registry.insert(DocumentId::Integer(1), fingerprint(2)),
            Err(IndexError::DocumentExists)
        );
    }

    #[test]
    fn test_remove_unknown() {
        let mut registry = DocumentRegistry::new();
        assert_eq!(
            registry.remove(&DocumentId::Integer(1), &fingerprint(1)),
            Err(IndexError::DocumentNotExists)
        );
    }

    #[test]
    fn test_remove_with_wrong_fingerprint() {
        let mut registry = DocumentRegistry::new();
        let id = DocumentId::Integer(1);
        registry.insert(id.clone(), fingerprint(1)).unwrap();
        assert_eq!(
            registry.remove(&id, &fingerprint(9)),
            Err(IndexError::DocumentMutated)
        );
        // The failed remove must not have touched anything
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&id));
    }
}
