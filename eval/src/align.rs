// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Corpus alignment: turn star-rated reviews into a balanced binary dataset
//!
//! Reviews inside the neutral band are dropped, the rest are split by
//! polarity and both sides are cut to the same length so a classifier that
//! favours one class cannot look good by accident.

use crate::datasets::{LabeledReview, Polarity, Review};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Score band treated as neutral; below is negative, above is positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarityBands {
    pub neutral_min: f64,
    pub neutral_max: f64,
}

impl Default for PolarityBands {
    /// A single neutral rating of 3 on a 1-5 scale
    fn default() -> Self {
        Self {
            neutral_min: 3.0,
            neutral_max: 3.0,
        }
    }
}

impl PolarityBands {
    /// `None` for neutral scores
    pub fn classify(&self, score: f64) -> Option<Polarity> {
        if score < self.neutral_min {
            Some(Polarity::Negative)
        } else if score > self.neutral_max {
            Some(Polarity::Positive)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignConfig {
    pub bands: PolarityBands,
    /// Maximum number of examples kept per class
    pub cap: usize,
    /// Seed for the final shuffle
    pub seed: u64,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            bands: PolarityBands::default(),
            cap: 500,
            seed: 42,
        }
    }
}

/// Partition reviews into `(negative, positive)` in corpus order, dropping neutral ones
pub fn partition<'a>(reviews: &'a [Review], bands: &PolarityBands) -> (Vec<&'a str>, Vec<&'a str>) {
    let mut negative = Vec::new();
    let mut positive = Vec::new();
    for review in reviews {
        match bands.classify(review.score) {
            Some(Polarity::Negative) => negative.push(review.text.as_str()),
            Some(Polarity::Positive) => positive.push(review.text.as_str()),
            None => {}
        }
    }
    (negative, positive)
}

/// Build a balanced, shuffled dataset.
///
/// Both classes are truncated to the first `min(neg, pos, cap)` reviews of
/// each class, in corpus order. If either class is empty the result is empty.
pub fn align(reviews: &[Review], config: &AlignConfig) -> Vec<LabeledReview> {
    let (negative, positive) = partition(reviews, &config.bands);
    let m = negative.len().min(positive.len()).min(config.cap);

    tracing::info!(
        "Aligning corpus: {} negative, {} positive, keeping {} per class",
        negative.len(),
        positive.len(),
        m
    );
    if m == 0 {
        tracing::warn!("One polarity class is empty, aligned corpus is empty");
    }

    let mut aligned: Vec<LabeledReview> = negative[..m]
        .iter()
        .map(|text| LabeledReview::new(*text, Polarity::Negative))
        .chain(positive[..m].iter().map(|text| LabeledReview::new(*text, Polarity::Positive)))
        .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    aligned.shuffle(&mut rng);
    aligned
}
