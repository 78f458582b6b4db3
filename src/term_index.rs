//! Term index: a radix tree from normalized terms to per-field postings.
//!
//! Each term maps to a [`TermRecord`]: field id → short id → occurrence
//! count. The tree supports the three operations the query evaluator
//! needs: point lookup for the exact pass, strict-extension iteration
//! for the prefix pass, and a full walk for the fuzzy pass.

use radix_trie::{Trie, TrieCommon};
use std::collections::HashMap;

use crate::registry::ShortId;

/// Positional index of a field in the configured field list.
pub type FieldId = usize;

/// Per-term postings: field id → short id → term frequency.
///
/// Term frequency is the occurrence count in the field, not the
/// unique-term count used for length normalization.
pub type TermRecord = HashMap<FieldId, HashMap<ShortId, u32>>;

/// Radix tree over normalized terms.
///
/// A term is present iff at least one (field, document) pair still
/// references it; removals prune empty inner maps eagerly.
#[derive(Debug)]
pub struct TermIndex {
    tree: Trie<String, TermRecord>,
}

impl TermIndex {
    /// Creates an empty term index.
    pub fn new() -> Self {
        Self { tree: Trie::new() }
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if no terms are indexed.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Point lookup by exact term.
    pub fn get(&self, term: &str) -> Option<&TermRecord> {
        self.tree.get(term)
    }

    /// Read-modify-write of the (field, document) cell under `term`.
    pub fn add_posting(&mut self, term: &str, field: FieldId, doc: ShortId, frequency: u32) {
        if let Some(record) = self.tree.get_mut(term) {
            record.entry(field).or_default().insert(doc, frequency);
        } else {
            let mut record = TermRecord::default();
            record.entry(field).or_default().insert(doc, frequency);
            self.tree.insert(term.to_string(), record);
        }
    }

    /// Removes the (field, document) cell under `term`.
    ///
    /// Dropping the last document of a field removes the field from the
    /// record; dropping the last field removes the term from the tree.
    pub fn remove_posting(&mut self, term: &str, field: FieldId, doc: ShortId) {
        let empty = match self.tree.get_mut(term) {
            Some(record) => {
                if let Some(docs) = record.get_mut(&field) {
                    docs.remove(&doc);
                    if docs.is_empty() {
                        record.remove(&field);
                    }
                }
                record.is_empty()
            }
            None => false,
        };
        if empty {
            self.tree.remove(term);
        }
    }

    /// All `(term, record)` pairs whose term strictly extends `prefix`.
    ///
    /// The `prefix`-exact entry is excluded: the exact pass accounts for
    /// it, and including it here would double-count.
    pub fn extensions_of(&self, prefix: &str) -> Vec<(&str, &TermRecord)> {
        match self.tree.get_raw_descendant(prefix) {
            Some(subtree) => subtree
                .iter()
                .filter(|(term, _)| term.len() > prefix.len() && term.starts_with(prefix))
                .map(|(term, record)| (term.as_str(), record))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every `(term, record)` pair. Iteration order is unspecified.
    pub fn walk(&self) -> impl Iterator<Item = (&str, &TermRecord)> {
        self.tree.iter().map(|(term, record)| (term.as_str(), record))
    }
}

impl Default for TermIndex {
    fn default() -> Self {
        Self::new()
    }
}

// The trie is rebuilt entry by entry; the tree collaborator does not
// expose a structural clone.
impl Clone for TermIndex {
    fn clone(&self) -> Self {
        let mut tree = Trie::new();
        for (term, record) in self.tree.iter() {
            tree.insert(term.clone(), record.clone());
        }
        Self { tree }
    }
}

impl PartialEq for TermIndex {
    fn eq(&self, other: &Self) -> bool {
        self.tree.len() == other.tree.len()
            && self
                .tree
                .iter()
                .all(|(term, record)| other.tree.get(term.as_str()) == Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_for(index: &TermIndex, term: &str) -> TermRecord {
        index.get(term).cloned().unwrap_or_default()
    }

    #[test]
    fn test_add_and_get() {
        let mut index = TermIndex::new();
        index.add_posting("elixir", 0, 1, 1);
        index.add_posting("elixir", 1, 1, 2);
        index.add_posting("elixir", 1, 2, 1);

        let record = record_for(&index, "elixir");
        assert_eq!(record[&0][&1], 1);
        assert_eq!(record[&1][&1], 2);
        assert_eq!(record[&1][&2], 1);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_prunes_field_then_term() {
        let mut index = TermIndex::new();
        index.add_posting("elixir", 0, 1, 1);
        index.add_posting("elixir", 1, 1, 1);
        index.add_posting("elixir", 1, 2, 1);

        index.remove_posting("elixir", 1, 1);
        let record = record_for(&index, "elixir");
        assert!(!record.contains_key(&1) || !record[&1].contains_key(&1));
        assert!(record[&1].contains_key(&2));

        index.remove_posting("elixir", 1, 2);
        let record = record_for(&index, "elixir");
        assert!(!record.contains_key(&1), "empty field map must be pruned");

        index.remove_posting("elixir", 0, 1);
        assert!(index.get("elixir").is_none(), "empty term must leave the tree");
        assert!(index.is_empty());
    }

    #[test]
    fn test_remove_unknown_is_a_no_op() {
        let mut index = TermIndex::new();
        index.add_posting("web", 0, 1, 1);
        index.remove_posting("missing", 0, 1);
        index.remove_posting("web", 5, 9);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_extensions_exclude_exact_match() {
        let mut index = TermIndex::new();
        index.add_posting("eli", 0, 1, 1);
        index.add_posting("elixir", 0, 1, 1);
        index.add_posting("elite", 0, 2, 1);
        index.add_posting("web", 0, 3, 1);

        let mut extensions: Vec<&str> = index.extensions_of("eli").into_iter().map(|(t, _)| t).collect();
        extensions.sort_unstable();
        assert_eq!(extensions, ["elite", "elixir"]);
    }

    #[test]
    fn test_extensions_of_unknown_prefix() {
        let mut index = TermIndex::new();
        index.add_posting("elixir", 0, 1, 1);
        assert!(index.extensions_of("pho").is_empty());
        assert!(index.extensions_of("elixirs").is_empty());
    }

    #[test]
    fn test_walk_sees_every_term() {
        let mut index = TermIndex::new();
        index.add_posting("alpha", 0, 1, 1);
        index.add_posting("beta", 0, 1, 1);
        index.add_posting("gamma", 1, 2, 1);

        let mut walked: Vec<&str> = index.walk().map(|(t, _)| t).collect();
        walked.sort_unstable();
        assert_eq!(walked, ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut index = TermIndex::new();
        index.add_posting("alpha", 0, 1, 1);
        let snapshot = index.clone();

        index.add_posting("beta", 0, 1, 1);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(index.len(), 2);
        assert!(snapshot.get("beta").is_none());
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let mut a = TermIndex::new();
        a.add_posting("alpha", 0, 1, 1);
        a.add_posting("beta", 0, 2, 1);

        let mut b = TermIndex::new();
        b.add_posting("beta", 0, 2, 1);
        b.add_posting("alpha", 0, 1, 1);

        assert_eq!(a, b);
    }
}
