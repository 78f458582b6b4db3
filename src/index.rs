//! The index: document registry, field statistics, term postings, and the
//! search entry point.
//!
//! An [`Index`] is a plain value. Mutations go through `&mut self` and
//! leave the index fully consistent; cloning yields an independent
//! snapshot, and shared `&Index` references are safe to read from any
//! number of threads.

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::document::{Document, DocumentId, FieldValue};
use crate::error::IndexError;
use crate::query::{self, SearchOptions, SearchResult};
use crate::registry::{DocumentRegistry, ShortId};
use crate::stats::FieldStats;
use crate::term_index::{FieldId, TermIndex};
use crate::tokenizer::tokenize;

/// An in-memory full-text search index over a fixed field list.
///
/// Field ids are positions in the configured field list and never change
/// for the life of the value. Documents are added and removed by value;
/// removal requires the original document unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    /// Configured field names; position is the field id.
    fields: Vec<String>,
    /// Field names projected back with each search result.
    return_fields: Vec<String>,
    /// short id → projection of `return_fields` raw values.
    return_field_data: HashMap<ShortId, BTreeMap<String, FieldValue>>,
    registry: DocumentRegistry,
    stats: FieldStats,
    terms: TermIndex,
    document_count: usize,
}

/// One configured field of a document, rendered and tokenized ahead of
/// any state change.
struct PreparedField {
    unique_terms: u32,
    frequencies: HashMap<String, u32>,
}

impl Index {
    /// Creates an index over the given field list.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_return_fields(fields, std::iter::empty::<String>())
    }

    /// Creates an index that also copies the raw values of
    /// `return_fields` back with each search result.
    ///
    /// Return fields need not be indexed fields.
    pub fn with_return_fields<I, S, J, T>(fields: I, return_fields: J) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            return_fields: return_fields.into_iter().map(Into::into).collect(),
            return_field_data: HashMap::new(),
            registry: DocumentRegistry::new(),
            stats: FieldStats::new(),
            terms: TermIndex::new(),
            document_count: 0,
        }
    }

    /// Number of live documents.
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    /// Returns `true` if no documents are indexed.
    pub fn is_empty(&self) -> bool {
        self.document_count == 0
    }

    /// Returns `true` if a document with this external id is indexed.
    pub fn contains(&self, id: &DocumentId) -> bool {
        self.registry.contains(id)
    }

    /// The configured field names, in field id order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of distinct terms currently indexed.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Indexes a document.
    ///
    /// Every configured field is rendered and tokenized before any state
    /// changes, so a rejected document leaves the index untouched.
    pub fn add(&mut self, document: &Document) -> Result<(), IndexError> {
        let id = document.id()?;
        if self.registry.contains(&id) {
            return Err(IndexError::DocumentExists);
        }
        let prepared = self.prepare(document)?;

        let short_id = self.registry.insert(id.clone(), document.fingerprint())?;
        self.document_count += 1;

        let lengths: Vec<u32> = prepared.iter().map(|field| field.unique_terms).collect();
        self.stats.add(short_id, lengths, self.document_count);

        for (field, data) in prepared.iter().enumerate() {
            for (term, &tf) in &data.frequencies {
                self.terms.add_posting(term, field, short_id, tf);
            }
        }

        let projection: BTreeMap<String, FieldValue> = self
            .return_fields
            .iter()
            .filter_map(|name| document.get(name).map(|value| (name.clone(), value.clone())))
            .collect();
        self.return_field_data.insert(short_id, projection);

        debug!(id = %id, short_id, "document indexed");
        Ok(())
    }

    /// Indexes a batch of documents: a left-fold of single adds that
    /// stops at the first failure. Documents before the failing one stay
    /// indexed.
    pub fn add_all(&mut self, documents: &[Document]) -> Result<(), IndexError> {
        for document in documents {
            self.add(document)?;
        }
        Ok(())
    }

    /// Removes a document.
    ///
    /// The presented document must be identical to the one indexed: its
    /// fingerprint is recomputed and compared before any postings are
    /// touched, so a stale caller cannot leave a partial delete behind.
    pub fn remove(&mut self, document: &Document) -> Result<(), IndexError> {
        let id = document.id()?;
        let fingerprint = document.fingerprint();
        self.registry.verify(&id, &fingerprint)?;
        let prepared = self.prepare(document)?;
        let short_id = self.registry.remove(&id, &fingerprint)?;

        self.document_count -= 1;
        for (field, data) in prepared.iter().enumerate() {
            for term in data.frequencies.keys() {
                self.terms.remove_posting(term, field, short_id);
            }
        }
        self.stats.remove(short_id, self.document_count);
        self.return_field_data.remove(&short_id);

        debug!(id = %id, short_id, "document removed");
        Ok(())
    }

    /// Removes a batch of documents with the same fail-fast semantics as
    /// [`Index::add_all`].
    pub fn remove_all(&mut self, documents: &[Document]) -> Result<(), IndexError> {
        for document in documents {
            self.remove(document)?;
        }
        Ok(())
    }

    /// Runs a ranked query.
    ///
    /// The query string is tokenized and normalized exactly like document
    /// fields. Results are sorted by score descending; ties break
    /// arbitrarily.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        let results = query::execute(self, query, options);
        debug!(query, results = results.len(), "search completed");
        results
    }

    fn prepare(&self, document: &Document) -> Result<Vec<PreparedField>, IndexError> {
        self.fields
            .iter()
            .map(|name| {
                let Some(value) = document.get(name) else {
                    // Absent fields index as empty, length 0
                    return Ok(PreparedField { unique_terms: 0, frequencies: HashMap::new() });
                };
                let text = value
                    .as_text()
                    .ok_or_else(|| IndexError::FieldNotString { field: name.clone() })?;
                let tokens = tokenize(&text);
                let mut frequencies: HashMap<String, u32> = HashMap::new();
                for token in tokens.iter() {
                    *frequencies.entry(token.to_string()).or_insert(0) += 1;
                }
                Ok(PreparedField { unique_terms: frequencies.len() as u32, frequencies })
            })
            .collect()
    }

    pub(crate) fn terms(&self) -> &TermIndex {
        &self.terms
    }

    pub(crate) fn stats(&self) -> &FieldStats {
        &self.stats
    }

    pub(crate) fn field_name(&self, field: FieldId) -> &str {
        &self.fields[field]
    }

    pub(crate) fn external_id(&self, short_id: ShortId) -> Option<&DocumentId> {
        self.registry.external_id(short_id)
    }

    pub(crate) fn return_field_data(&self, short_id: ShortId) -> Option<&BTreeMap<String, FieldValue>> {
        self.return_field_data.get(&short_id)
    }
}
