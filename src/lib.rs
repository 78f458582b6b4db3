//! # textindex
//!
//! Embeddable in-memory full-text search index with BM25 ranking and
//! exact, prefix, and fuzzy matching.
//!
//! Documents are ordered collections of named fields; the field list to
//! index is fixed at construction. `add` and `remove` are synchronous and
//! leave the index fully consistent after every call. `search` layers
//! prefix and fuzzy matches under exact ones without double-counting, and
//! returns results ranked by a length-normalized BM25 variant.
//!
//! The index is a plain value: no I/O, no background work, no persistence.
//! Cloning yields an independent snapshot, and shared `&Index` references
//! are safe to read from multiple threads.
//!
//! ```
//! use textindex::{Document, Index, SearchOptions};
//!
//! let mut index = Index::with_return_fields(["title", "content"], ["title"]);
//! index.add(&Document::new(1).field("title", "Hello").field("content", "Hello world"))?;
//!
//! let results = index.search("hello", &SearchOptions::default());
//! assert_eq!(results.len(), 1);
//! # Ok::<(), textindex::IndexError>(())
//! ```

/// BM25 parameters and query-pass defaults.
pub mod config;
/// Document model: field values, identity, fingerprints.
pub mod document;
/// Error taxonomy for index mutations.
pub mod error;
/// The index: construction, mutation, search.
pub mod index;
/// Query evaluation: exact, prefix, and fuzzy passes.
pub mod query;
mod registry;
/// BM25-variant scoring.
pub mod scorer;
mod stats;
/// Radix-tree term postings.
pub mod term_index;
/// Whitespace-and-punctuation tokenizer shared by ingest and query.
pub mod tokenizer;

pub use document::{Document, DocumentId, FieldValue};
pub use error::IndexError;
pub use index::Index;
pub use query::{SearchOptions, SearchResult};
pub use registry::ShortId;
pub use term_index::FieldId;
