//! BM25-variant scoring.
//!
//! Length-normalized BM25 with a lower-bound shift on the saturated term
//! frequency (see [`crate::config`] for the parameters). Field lengths are
//! unique-term counts, and the averages come from the running per-field
//! statistics.

use crate::config;

/// Scores one (document, term, field) triple.
///
/// `doc_count` is the live document count, `docs_with_term` the number of
/// documents carrying the term in this field, `tf` the occurrence count of
/// the term in the field, and `field_len` / `avg_field_len` the
/// unique-term length of the field and its running mean.
///
/// The query evaluator multiplies the returned raw score by the pass
/// weight (1.0 for exact matches, attenuated for prefix and fuzzy).
pub fn bm25(
    doc_count: usize,
    docs_with_term: usize,
    tf: u32,
    field_len: u32,
    avg_field_len: f32,
) -> f32 {
    let n = doc_count as f32;
    let n_t = docs_with_term as f32;
    let idf = (1.0 + (n - n_t + 0.5) / (n_t + 0.5)).ln();

    let tf = tf as f32;
    let norm = 1.0 - config::BM25_B + config::BM25_B * field_len as f32 / avg_field_len;
    let saturated = tf * (config::BM25_K1 + 1.0) / (tf + config::BM25_K1 * norm);

    idf * (config::BM25_DELTA + saturated)
}
