// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Adjective frequency in very positive and very negative reviews
//!
//! Gives annotators a lead: for each lemma, the share of its occurrences
//! that fall in 5-star reviews and in 1-star reviews. Every lemma scans the
//! whole stratified corpus, so this is slow on large inputs.

use crate::datasets::Review;
use serde::{Deserialize, Serialize};

/// Best rating; occurrences in these reviews count as positive
pub const TOP_SCORE: f64 = 5.0;
/// Worst rating; occurrences in these reviews count as negative
pub const BOTTOM_SCORE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyScore {
    pub lemma: String,
    /// Share of occurrences in 5-star reviews
    pub positive: f64,
    /// Share of occurrences in 1-star reviews
    pub negative: f64,
}

/// Reviews stratified into 5-star, 1-star and in-between bands of equal size
pub fn stratify(reviews: &[Review]) -> Vec<&Review> {
    let top: Vec<&Review> = reviews.iter().filter(|r| r.score == TOP_SCORE).collect();
    let bottom: Vec<&Review> = reviews.iter().filter(|r| r.score == BOTTOM_SCORE).collect();
    let middle: Vec<&Review> = reviews
        .iter()
        .filter(|r| r.score > BOTTOM_SCORE && r.score < TOP_SCORE)
        .collect();

    let n = top.len().min(bottom.len()).min(middle.len());
    tracing::info!(
        "Stratified corpus: {} top, {} bottom, {} middle, keeping {} each",
        top.len(),
        bottom.len(),
        middle.len(),
        n
    );

    top[..n]
        .iter()
        .chain(&bottom[..n])
        .chain(&middle[..n])
        .copied()
        .collect()
}

/// Lower-case, turn `!.,` into spaces and pad with a space on each side
fn prepare(text: &str) -> String {
    let mut padded = String::with_capacity(text.len() + 2);
    padded.push(' ');
    padded.push_str(&text.to_lowercase().replace(['!', '.', ','], " "));
    padded.push(' ');
    padded
}

/// Scores lemmas against a stratified review corpus
#[derive(Debug, Clone)]
pub struct FrequencyScorer {
    reviews: Vec<(String, f64)>,
}

impl FrequencyScorer {
    pub fn new(reviews: &[Review]) -> Self {
        Self {
            reviews: stratify(reviews)
                .into_iter()
                .map(|r| (prepare(&r.text), r.score))
                .collect(),
        }
    }

    pub fn corpus_size(&self) -> usize {
        self.reviews.len()
    }

    /// Count whole-word occurrences of the lemma's forms in top and bottom reviews.
    pub fn score_lemma(&self, lemma: &str, forms: &[String]) -> FrequencyScore {
        let padded: Vec<String> = forms.iter().map(|f| format!(" {} ", f)).collect();
        let mut positive = 0usize;
        let mut negative = 0usize;

        for (text, score) in &self.reviews {
            for form in &padded {
                if *score == TOP_SCORE {
                    positive += text.matches(form.as_str()).count();
                }
                if *score == BOTTOM_SCORE {
                    negative += text.matches(form.as_str()).count();
                }
            }
        }

        // middle-band reviews are part of the corpus but never counted
        let total = (positive + negative).max(1) as f64;
        FrequencyScore {
            lemma: lemma.to_string(),
            positive: positive as f64 / total,
            negative: negative as f64 / total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Review> {
        vec![
            Review::new("Bon livre, vraiment bon!", 5.0),
            Review::new("Toutes les pages sont bonnes.", 5.0),
            Review::new("Pas bon du tout.", 1.0),
            Review::new("Mauvais", 1.0),
            Review::new("Bon mais long", 3.0),
            Review::new("Bon, bon, bon", 4.0),
            Review::new("Extra bon", 5.0),
        ]
    }

    #[test]
    fn test_stratify_equal_bands() {
        let reviews = corpus();
        let strata = stratify(&reviews);
        // 3 top, 2 bottom, 2 middle
        assert_eq!(strata.len(), 6);
        assert_eq!(strata.iter().filter(|r| r.score == 5.0).count(), 2);
        assert_eq!(strata.iter().filter(|r| r.score == 1.0).count(), 2);
        // prefix truncation drops the last 5-star review
        assert!(!strata.iter().any(|r| r.text == "Extra bon"));
    }

    #[test]
    fn test_score_lemma() {
        let scorer = FrequencyScorer::new(&corpus());
        let score = scorer.score_lemma("bon", &["bon".to_string(), "bonnes".to_string()]);

        // 3 in top reviews, 1 in bottom, middle band ignored
        assert_eq!(score.lemma, "bon");
        assert!((score.positive - 0.75).abs() < 1e-9);
        assert!((score.negative - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_whole_word_matching() {
        let reviews = vec![
            Review::new("toutes les toutes", 5.0),
            Review::new("tout", 1.0),
            Review::new("bof", 3.0),
        ];
        let scorer = FrequencyScorer::new(&reviews);
        let score = scorer.score_lemma("tout", &["tout".to_string()]);
        assert_eq!(score.positive, 0.0);
        assert_eq!(score.negative, 1.0);
    }

    #[test]
    fn test_unseen_lemma_scores_zero() {
        let scorer = FrequencyScorer::new(&corpus());
        let score = scorer.score_lemma("jaune", &["jaune".to_string()]);
        assert_eq!(score.positive, 0.0);
        assert_eq!(score.negative, 0.0);
    }
}
