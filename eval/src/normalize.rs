// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Review tokenization and vocabulary filtering

use crate::classifiers::Document;
use crate::datasets::{LabeledReview, Polarity};
use crate::lexicon::Vocabulary;

/// Punctuation stripped from both ends of every token
pub const STRIP_CHARS: [char; 4] = [',', '.', '!', '?'];

/// Lower-case `text`, split it on single spaces and strip `,.!?` from each token.
///
/// Only the space character separates tokens; callers that need newlines to
/// act as separators must replace them first.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(' ')
        .map(|w| w.trim_matches(&STRIP_CHARS[..]).to_string())
        .collect()
}

/// Keep only the tokens of `text` that are known adjectives, in order.
pub fn normalize(text: &str, vocabulary: &Vocabulary) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|w| vocabulary.contains(w))
        .collect()
}

/// Adjectives of a review, with line breaks acting as word separators
pub fn review_adjectives(text: &str, vocabulary: &Vocabulary) -> Vec<String> {
    normalize(&text.replace('\n', " "), vocabulary)
}

/// Labeled raw-text documents
pub fn raw_documents(samples: &[LabeledReview]) -> Vec<(Document, Polarity)> {
    samples
        .iter()
        .map(|s| (Document::Text(s.text.clone()), s.label))
        .collect()
}

/// Labeled documents reduced to their known adjectives
pub fn normalized_documents(samples: &[LabeledReview], vocabulary: &Vocabulary) -> Vec<(Document, Polarity)> {
    samples
        .iter()
        .map(|s| (Document::Tokens(review_adjectives(&s.text, vocabulary)), s.label))
        .collect()
}
