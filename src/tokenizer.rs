//! Tokenizer shared by the ingest and query paths.
//!
//! Splits on whitespace and Unicode punctuation; every other code point is
//! a token character. Lowercasing is the only normalization: no stemming,
//! no stop words, no accent folding. Uses a zero-per-token allocation
//! design via byte spans into a single lowercased buffer.
//!
//! Queries and documents must tokenize identically, so both sides call
//! [`tokenize`].

use unicode_properties::{GeneralCategoryGroup, UnicodeGeneralCategory};

/// Tokenized text: owns the lowercased buffer, provides `&str` slices via
/// byte spans. Only one heap allocation (the lowercased String) instead of
/// one per token.
pub struct Tokens {
    buffer: String,
    spans: Vec<(u32, u32)>, // (start, end) byte offsets into buffer
}

impl Tokens {
    /// Returns an iterator over the token `&str` slices.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans
            .iter()
            .map(|&(s, e)| &self.buffer[s as usize..e as usize])
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c.general_category_group() == GeneralCategoryGroup::Punctuation
}

/// Tokenize text: lowercase, split on whitespace and punctuation, discard
/// empty tokens.
pub fn tokenize(text: &str) -> Tokens {
    let buffer = text.to_lowercase();
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in buffer.char_indices() {
        if is_separator(c) {
            if let Some(s) = start.take() {
                spans.push((s as u32, i as u32));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    // Last token has no trailing separator
    if let Some(s) = start {
        spans.push((s as u32, buffer.len() as u32));
    }

    Tokens { buffer, spans }
}
