//! Per-field length statistics consumed by the scorer.
//!
//! Lengths are unique-term counts per (document, field), recorded in field
//! id order at insertion; raw token counts are never used. The per-field running
//! average is updated incrementally on every mutation; a removal that
//! empties the index resets the averages outright. Incremental drift is
//! accepted; a reindex rebuilds exact values.

use std::collections::HashMap;

use crate::registry::ShortId;
use crate::term_index::FieldId;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FieldStats {
    /// short id → unique-term count per field id.
    field_lengths: HashMap<ShortId, Vec<u32>>,
    /// field id → running mean length across live documents.
    avg_field_lengths: Vec<f32>,
}

impl FieldStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.field_lengths.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.field_lengths.is_empty()
    }

    pub fn field_length(&self, short_id: ShortId, field: FieldId) -> u32 {
        self.field_lengths
            .get(&short_id)
            .and_then(|lengths| lengths.get(field))
            .copied()
            .unwrap_or(0)
    }

    pub fn avg_field_length(&self, field: FieldId) -> f32 {
        self.avg_field_lengths.get(field).copied().unwrap_or(0.0)
    }

    #[cfg(test)]
    pub fn avg_field_lengths(&self) -> &[f32] {
        &self.avg_field_lengths
    }

    #[cfg(test)]
    pub fn lengths(&self) -> &HashMap<ShortId, Vec<u32>> {
        &self.field_lengths
    }

    /// Records a document's per-field lengths. `count_after` is the live
    /// document count with this document included.
    pub fn add(&mut self, short_id: ShortId, lengths: Vec<u32>, count_after: usize) {
        if self.avg_field_lengths.len() < lengths.len() {
            self.avg_field_lengths.resize(lengths.len(), 0.0);
        }
        let n = count_after as f32;
        for (field, &length) in lengths.iter().enumerate() {
            let avg = self.avg_field_lengths[field];
            self.avg_field_lengths[field] = (avg * (n - 1.0) + length as f32) / n;
        }
        self.field_lengths.insert(short_id, lengths);
    }

    /// Drops a document's lengths. `count_after` is the live document
    /// count with this document already gone.
    pub fn remove(&mut self, short_id: ShortId, count_after: usize) {
        let Some(lengths) = self.field_lengths.remove(&short_id) else {
            return;
        };
        if count_after == 0 {
            self.avg_field_lengths.clear();
            return;
        }
        let n = count_after as f32;
        for (field, &length) in lengths.iter().enumerate() {
            let avg = self.avg_field_lengths[field];
            self.avg_field_lengths[field] = (avg * (n + 1.0) - length as f32) / n;
        }
    }
}
