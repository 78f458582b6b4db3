//! Query evaluation: exact, prefix, and fuzzy passes over the term index.
//!
//! Passes run in order of decreasing precision. Contributions are tracked
//! at the (document, term, field) granularity, so a weaker pass can never
//! re-credit a pair that a stronger pass already scored.

use ordered_float::OrderedFloat;
use rapidfuzz::distance::levenshtein;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config;
use crate::document::{DocumentId, FieldValue};
use crate::index::Index;
use crate::registry::ShortId;
use crate::scorer::bm25;
use crate::term_index::{FieldId, TermRecord};
use crate::tokenizer::tokenize;

/// Options controlling the prefix and fuzzy passes.
///
/// The exact pass always runs. Defaults enable neither extra pass and use
/// the attenuations from [`crate::config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Enable the prefix pass.
    pub prefix: bool,
    /// Enable the fuzzy pass.
    pub fuzzy: bool,
    /// Maximum edit distance in the fuzzy pass.
    pub fuzziness: usize,
    /// Base prefix attenuation.
    pub prefix_weight: f32,
    /// Base fuzzy attenuation.
    pub fuzzy_weight: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            prefix: false,
            fuzzy: false,
            fuzziness: config::DEFAULT_FUZZINESS,
            prefix_weight: config::DEFAULT_PREFIX_WEIGHT,
            fuzzy_weight: config::DEFAULT_FUZZY_WEIGHT,
        }
    }
}

/// A ranked search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// External id of the matched document.
    pub id: DocumentId,
    /// Aggregated, pass-weighted BM25 score.
    pub score: f32,
    /// Stored terms that matched, sorted.
    pub terms: Vec<String>,
    /// Stored term → names of the fields it matched in.
    pub matches: BTreeMap<String, Vec<String>>,
    /// Raw values of the configured return fields.
    pub fields: BTreeMap<String, FieldValue>,
}

/// Accumulated score and matched fields for one (document, term) pair.
struct Contribution {
    score: f32,
    fields: Vec<FieldId>,
}

/// Runs the enabled passes and collapses per-document results, sorted by
/// score descending.
pub(crate) fn execute(index: &Index, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
    let tokens = tokenize(query);
    let terms: Vec<&str> = tokens.iter().collect();
    if terms.is_empty() || index.is_empty() {
        return Vec::new();
    }

    let mut seen: HashSet<(ShortId, String, FieldId)> = HashSet::new();
    let mut pairs: HashMap<(ShortId, String), Contribution> = HashMap::new();

    // Exact pass. Duplicate query terms repeat the lookup; the seen-set
    // collapses their contributions.
    for &term in &terms {
        if let Some(record) = index.terms().get(term) {
            credit(index, &mut seen, &mut pairs, term, record, 1.0);
        }
    }

    // Prefix pass: stored terms strictly extending a query term,
    // attenuated by how far they extend it.
    if options.prefix {
        for &term in &terms {
            let query_len = term.chars().count();
            for (stored, record) in index.terms().extensions_of(term) {
                let stored_len = stored.chars().count();
                let extra = (stored_len - query_len) as f32;
                let weight = options.prefix_weight * stored_len as f32
                    / (stored_len as f32 + config::PREFIX_LENGTH_PENALTY * extra);
                credit(index, &mut seen, &mut pairs, stored, record, weight);
            }
        }
    }

    // Fuzzy pass: full walk, pre-filtered by length window before paying
    // for an edit distance. The weight is term-level: every candidate of
    // one query term shares it.
    if options.fuzzy {
        for &term in &terms {
            let query_len = term.chars().count();
            let weight = options.fuzzy_weight * query_len as f32
                / (query_len as f32 + options.fuzziness as f32);
            for (stored, record) in index.terms().walk() {
                let stored_len = stored.chars().count();
                if stored_len.abs_diff(query_len) > options.fuzziness {
                    continue;
                }
                if levenshtein::distance(term.chars(), stored.chars()) > options.fuzziness {
                    continue;
                }
                credit(index, &mut seen, &mut pairs, stored, record, weight);
            }
        }
    }

    collapse(index, pairs)
}

/// Credits every (field, document) posting of `record` to the stored
/// term, skipping pairs an earlier pass already scored.
fn credit(
    index: &Index,
    seen: &mut HashSet<(ShortId, String, FieldId)>,
    pairs: &mut HashMap<(ShortId, String), Contribution>,
    stored: &str,
    record: &TermRecord,
    weight: f32,
) {
    for (&field, postings) in record {
        let docs_with_term = postings.len();
        for (&short_id, &tf) in postings {
            if !seen.insert((short_id, stored.to_string(), field)) {
                continue;
            }
            let score = weight
                * bm25(
                    index.document_count(),
                    docs_with_term,
                    tf,
                    index.stats().field_length(short_id, field),
                    index.stats().avg_field_length(field),
                );
            let entry = pairs
                .entry((short_id, stored.to_string()))
                .or_insert_with(|| Contribution { score: 0.0, fields: Vec::new() });
            entry.score += score;
            entry.fields.push(field);
        }
    }
}

fn collapse(index: &Index, pairs: HashMap<(ShortId, String), Contribution>) -> Vec<SearchResult> {
    let mut per_doc: HashMap<ShortId, (f32, BTreeMap<String, Vec<String>>)> = HashMap::new();
    for ((short_id, term), contribution) in pairs {
        let (score, matches) = per_doc.entry(short_id).or_default();
        *score += contribution.score;
        let names = matches.entry(term).or_default();
        for field in contribution.fields {
            let name = index.field_name(field).to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    let mut results: Vec<SearchResult> = per_doc
        .into_iter()
        .filter_map(|(short_id, (score, matches))| {
            let id = index.external_id(short_id)?.clone();
            let fields = index.return_field_data(short_id).cloned().unwrap_or_default();
            Some(SearchResult {
                id,
                score,
                terms: matches.keys().cloned().collect(),
                matches,
                fields,
            })
        })
        .collect();
    results.sort_unstable_by_key(|result| Reverse(OrderedFloat(result.score)));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::index::Index;

    fn index_with(documents: &[Document]) -> Index {
        let mut index = Index::new(["title", "content"]);
        index.add_all(documents).unwrap();
        index
    }

    fn doc(id: i64, title: &str, content: &str) -> Document {
        Document::new(id).field("title", title).field("content", content)
    }

    #[test]
    fn test_exact_pass_only_by_default() {
        let index = index_with(&[doc(1, "Elixir", "a language")]);
        assert!(index.search("eli", &SearchOptions::default()).is_empty());
        assert_eq!(index.search("elixir", &SearchOptions::default()).len(), 1);
    }

    #[test]
    fn test_prefix_pass_reports_stored_term() {
        let index = index_with(&[doc(1, "Elixir", "a language")]);
        let options = SearchOptions { prefix: true, ..Default::default() };
        let results = index.search("eli", &options);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].terms, ["elixir"]);
        assert_eq!(results[0].matches["elixir"], ["title"]);
        assert!(results[0].score > 0.0);
    }

    #[test]
    fn test_prefix_weight_attenuates() {
        let index = index_with(&[doc(1, "Elixir", "a language")]);
        let exact = index.search("elixir", &SearchOptions::default());
        let options = SearchOptions { prefix: true, ..Default::default() };
        let prefixed = index.search("eli", &options);

        // "elixir" extends "eli" by 3 chars: weight = 0.375 * 6 / 6.9
        let expected = exact[0].score * 0.375 * 6.0 / 6.9;
        assert!((prefixed[0].score - expected).abs() < 1e-5);
    }

    #[test]
    fn test_stronger_pass_wins_over_weaker() {
        let index = index_with(&[doc(1, "Elixir", "a language")]);
        let options = SearchOptions { prefix: true, fuzzy: true, ..Default::default() };

        // "elixir" matches exactly and as an extension of "eli"; the
        // (term, field) pair must only be credited once, by the exact pass.
        let combined = index.search("elixir eli", &options);
        let exact_only = index.search("elixir", &SearchOptions::default());
        assert_eq!(combined.len(), 1);
        assert!((combined[0].score - exact_only[0].score).abs() < 1e-5);
        assert_eq!(combined[0].terms, ["elixir"]);
    }

    #[test]
    fn test_duplicate_query_terms_collapse() {
        let index = index_with(&[doc(1, "Elixir", "a language")]);
        let single = index.search("elixir", &SearchOptions::default());
        let repeated = index.search("elixir elixir", &SearchOptions::default());
        assert!((single[0].score - repeated[0].score).abs() < 1e-6);
    }

    #[test]
    fn test_fuzzy_pass_respects_distance_and_weight() {
        let index = index_with(&[doc(1, "Phoenix", "a framework")]);
        let options = SearchOptions { fuzzy: true, ..Default::default() };

        // "famewrk" → "framework" is two edits away
        let results = index.search("famewrk", &options);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].terms, ["framework"]);

        let exact = index.search("framework", &SearchOptions::default());
        let expected = exact[0].score * 0.45 * 7.0 / 9.0;
        assert!((results[0].score - expected).abs() < 1e-5);

        // Three edits exceed the default fuzziness
        assert!(index.search("fmwrk", &options).is_empty());
    }

    #[test]
    fn test_fuzzy_length_window() {
        let index = index_with(&[doc(1, "ab", "abcdefgh")]);
        let options = SearchOptions { fuzzy: true, ..Default::default() };
        // "abcdefgh" is six chars longer than the query; the window
        // excludes it before any distance computation
        let results = index.search("ab", &options);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].terms, ["ab"]);
    }

    #[test]
    fn test_results_sorted_by_score_descending() {
        let index = index_with(&[
            doc(1, "rust", "rust rust systems"),
            doc(2, "tools", "rust once"),
        ]);
        let results = index.search("rust", &SearchOptions::default());
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        assert_eq!(results[0].id, DocumentId::Integer(1));
    }

    #[test]
    fn test_empty_query_and_no_hits() {
        let index = index_with(&[doc(1, "Elixir", "a language")]);
        assert!(index.search("", &SearchOptions::default()).is_empty());
        assert!(index.search("   ", &SearchOptions::default()).is_empty());
        assert!(index.search("zzz", &SearchOptions::default()).is_empty());
    }

    #[test]
    fn test_multi_field_match_lists_both_fields() {
        let index = index_with(&[doc(1, "Elixir", "Elixir rocks")]);
        let results = index.search("elixir", &SearchOptions::default());
        let mut fields = results[0].matches["elixir"].clone();
        fields.sort_unstable();
        assert_eq!(fields, ["content", "title"]);
    }
}
