// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Trainable bag-of-words classifiers
//!
//! Implements:
//! - Linear SVM trained with Pegasos-style stochastic sub-gradient descent
//! - Multinomial naive Bayes with Laplace smoothing
//! - Majority class baseline (always predict the most common training label)
//! - Random baseline (seeded coin flip)
//!
//! Every model is driven through the [`Classifier`] trait, so the evaluator
//! can swap one algorithm for another.

use crate::datasets::Polarity;
use crate::error::ClassifierError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Input to a classifier: raw review text or pre-normalized tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Text(String),
    Tokens(Vec<String>),
}

impl Document {
    /// Words of the document. Raw text is split on whitespace, lower-cased
    /// and stripped of surrounding punctuation.
    pub fn words(&self) -> Vec<String> {
        match self {
            Document::Text(text) => text
                .split_whitespace()
                .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
            Document::Tokens(tokens) => tokens.clone(),
        }
    }

    /// Word counts
    pub fn bag_of_words(&self) -> HashMap<String, f64> {
        let mut bag = HashMap::new();
        for word in self.words() {
            *bag.entry(word).or_insert(0.0) += 1.0;
        }
        bag
    }
}

/// Capability interface for a binary classifier
pub trait Classifier {
    /// Add one labeled training example
    fn train(&mut self, document: &Document, label: Polarity) -> Result<(), ClassifierError>;

    /// Called once after the last training example; models that fit in a
    /// batch do their work here.
    fn finish_training(&mut self) -> Result<(), ClassifierError> {
        Ok(())
    }

    /// Predict the polarity of a document
    fn classify(&self, document: &Document) -> Result<Polarity, ClassifierError>;

    /// Train on a whole set of examples and finish training
    fn train_all(&mut self, examples: &[(Document, Polarity)]) -> Result<(), ClassifierError> {
        for (document, label) in examples {
            self.train(document, *label)?;
        }
        self.finish_training()
    }

    fn name(&self) -> &str;

    fn description(&self) -> &str;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn train(&mut self, document: &Document, label: Polarity) -> Result<(), ClassifierError> {
        (**self).train(document, label)
    }

    fn finish_training(&mut self) -> Result<(), ClassifierError> {
        (**self).finish_training()
    }

    fn classify(&self, document: &Document) -> Result<Polarity, ClassifierError> {
        (**self).classify(document)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}

/// Linear support vector machine over L2-normalized word counts
#[derive(Debug, Clone)]
pub struct LinearSvm {
    lambda: f64,
    epochs: usize,
    seed: u64,
    index: HashMap<String, usize>,
    examples: Vec<(Vec<(usize, f64)>, f64)>,
    weights: Vec<f64>,
    trained: bool,
}

/// Feature slot holding the constant bias input
const BIAS: usize = 0;

impl LinearSvm {
    pub fn new(seed: u64) -> Self {
        Self::with_params(0.01, 10, seed)
    }

    pub fn with_params(lambda: f64, epochs: usize, seed: u64) -> Self {
        Self {
            lambda,
            epochs,
            seed,
            index: HashMap::new(),
            examples: Vec::new(),
            weights: Vec::new(),
            trained: false,
        }
    }

    /// Sparse normalized feature vector, adding unseen words to the index
    fn index_features(&mut self, document: &Document) -> Vec<(usize, f64)> {
        let mut features = vec![(BIAS, 1.0)];
        for (word, count) in document.bag_of_words() {
            let next = self.index.len() + 1;
            let slot = *self.index.entry(word).or_insert(next);
            features.push((slot, count));
        }
        normalize_l2(&mut features);
        features
    }

    /// Sparse normalized feature vector over known words only
    fn features(&self, document: &Document) -> Vec<(usize, f64)> {
        let mut features = vec![(BIAS, 1.0)];
        for (word, count) in document.bag_of_words() {
            if let Some(slot) = self.index.get(&word) {
                features.push((*slot, count));
            }
        }
        normalize_l2(&mut features);
        features
    }

    fn margin(&self, features: &[(usize, f64)]) -> f64 {
        features
            .iter()
            .map(|(i, x)| self.weights.get(*i).copied().unwrap_or(0.0) * x)
            .sum()
    }
}

fn normalize_l2(features: &mut [(usize, f64)]) {
    let norm = features.iter().map(|(_, x)| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, x) in features.iter_mut() {
            *x /= norm;
        }
    }
}

impl Classifier for LinearSvm {
    fn train(&mut self, document: &Document, label: Polarity) -> Result<(), ClassifierError> {
        let features = self.index_features(document);
        let y = if label.is_positive() { 1.0 } else { -1.0 };
        self.examples.push((features, y));
        self.trained = false;
        Ok(())
    }

    fn finish_training(&mut self) -> Result<(), ClassifierError> {
        if self.examples.is_empty() {
            return Err(ClassifierError::Untrained("SVM"));
        }
        let has_pos = self.examples.iter().any(|(_, y)| *y > 0.0);
        let has_neg = self.examples.iter().any(|(_, y)| *y < 0.0);
        if !(has_pos && has_neg) {
            return Err(ClassifierError::SingleClass("SVM"));
        }

        // w = scale * v, so the regularization shrink is O(1) per step
        let mut v = vec![0.0; self.index.len() + 1];
        let mut scale = 1.0;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let steps = self.epochs * self.examples.len();

        for t in 1..=steps {
            let (x, y) = &self.examples[rng.gen_range(0..self.examples.len())];
            let eta = 1.0 / (self.lambda * (t + 1) as f64);
            let margin: f64 = scale * x.iter().map(|(i, xi)| v[*i] * xi).sum::<f64>();

            scale *= 1.0 - eta * self.lambda;
            if y * margin < 1.0 {
                let step = eta * y / scale;
                for (i, xi) in x {
                    v[*i] += step * xi;
                }
            }

            if scale < 1e-9 {
                for vi in v.iter_mut() {
                    *vi *= scale;
                }
                scale = 1.0;
            }
        }

        self.weights = v.into_iter().map(|vi| vi * scale).collect();
        self.trained = true;
        tracing::debug!(
            "SVM trained on {} examples, {} features",
            self.examples.len(),
            self.index.len()
        );
        Ok(())
    }

    fn classify(&self, document: &Document) -> Result<Polarity, ClassifierError> {
        if !self.trained {
            return Err(ClassifierError::Untrained("SVM"));
        }
        let features = self.features(document);
        Ok(Polarity::from_bool(self.margin(&features) > 0.0))
    }

    fn name(&self) -> &str {
        "SVM"
    }

    fn description(&self) -> &str {
        "Linear SVM (hinge loss, stochastic sub-gradient) over word counts"
    }
}

/// Multinomial naive Bayes over word counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NaiveBayes {
    positive_counts: HashMap<String, f64>,
    negative_counts: HashMap<String, f64>,
    positive_total: f64,
    negative_total: f64,
    n_positive: usize,
    n_negative: usize,
}

impl NaiveBayes {
    pub fn new() -> Self {
        Self::default()
    }

    fn vocabulary_size(&self) -> f64 {
        let mut size = self.positive_counts.len();
        size += self
            .negative_counts
            .keys()
            .filter(|w| !self.positive_counts.contains_key(*w))
            .count();
        size.max(1) as f64
    }

    fn log_likelihood(counts: &HashMap<String, f64>, total: f64, vocab: f64, word: &str) -> f64 {
        let count = counts.get(word).copied().unwrap_or(0.0);
        ((count + 1.0) / (total + vocab)).ln()
    }
}

impl Classifier for NaiveBayes {
    fn train(&mut self, document: &Document, label: Polarity) -> Result<(), ClassifierError> {
        let (counts, total, n) = match label {
            Polarity::Positive => (&mut self.positive_counts, &mut self.positive_total, &mut self.n_positive),
            Polarity::Negative => (&mut self.negative_counts, &mut self.negative_total, &mut self.n_negative),
        };
        *n += 1;
        for (word, count) in document.bag_of_words() {
            *counts.entry(word).or_insert(0.0) += count;
            *total += count;
        }
        Ok(())
    }

    fn classify(&self, document: &Document) -> Result<Polarity, ClassifierError> {
        let n_docs = self.n_positive + self.n_negative;
        if n_docs == 0 {
            return Err(ClassifierError::Untrained("Naive Bayes"));
        }

        let vocab = self.vocabulary_size();
        let mut positive_score = (self.n_positive as f64 / n_docs as f64).ln();
        let mut negative_score = (self.n_negative as f64 / n_docs as f64).ln();

        for (word, count) in document.bag_of_words() {
            positive_score += count * Self::log_likelihood(&self.positive_counts, self.positive_total, vocab, &word);
            negative_score += count * Self::log_likelihood(&self.negative_counts, self.negative_total, vocab, &word);
        }

        Ok(Polarity::from_bool(positive_score > negative_score))
    }

    fn name(&self) -> &str {
        "Naive Bayes"
    }

    fn description(&self) -> &str {
        "Multinomial naive Bayes with Laplace smoothing"
    }
}

/// Majority class baseline: always predicts the most common training label
#[derive(Debug, Clone, Default)]
pub struct MajorityBaseline {
    n_positive: usize,
    n_negative: usize,
}

impl MajorityBaseline {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Classifier for MajorityBaseline {
    fn train(&mut self, _document: &Document, label: Polarity) -> Result<(), ClassifierError> {
        match label {
            Polarity::Positive => self.n_positive += 1,
            Polarity::Negative => self.n_negative += 1,
        }
        Ok(())
    }

    fn classify(&self, _document: &Document) -> Result<Polarity, ClassifierError> {
        if self.n_positive + self.n_negative == 0 {
            return Err(ClassifierError::Untrained("Majority"));
        }
        Ok(Polarity::from_bool(self.n_positive > self.n_negative))
    }

    fn name(&self) -> &str {
        "Majority"
    }

    fn description(&self) -> &str {
        "Always predicts the majority class from training data"
    }
}

/// Random baseline: seeded uniform coin flip per prediction
#[derive(Debug, Clone)]
pub struct RandomBaseline {
    seed: u64,
    rng: RefCell<ChaCha8Rng>,
}

impl RandomBaseline {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: RefCell::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl Classifier for RandomBaseline {
    fn train(&mut self, _document: &Document, _label: Polarity) -> Result<(), ClassifierError> {
        Ok(())
    }

    fn finish_training(&mut self) -> Result<(), ClassifierError> {
        // Reset RNG to ensure reproducibility
        self.rng = RefCell::new(ChaCha8Rng::seed_from_u64(self.seed));
        Ok(())
    }

    fn classify(&self, _document: &Document) -> Result<Polarity, ClassifierError> {
        Ok(Polarity::from_bool(self.rng.borrow_mut().gen_bool(0.5)))
    }

    fn name(&self) -> &str {
        "Random"
    }

    fn description(&self) -> &str {
        "Uniform random predictions (expected accuracy: 50%)"
    }
}

/// Classifier selection for configuration files and command lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierKind {
    Svm,
    NaiveBayes,
    Majority,
    Random,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 4] = [
        ClassifierKind::Svm,
        ClassifierKind::NaiveBayes,
        ClassifierKind::Majority,
        ClassifierKind::Random,
    ];

    /// A fresh, untrained classifier
    pub fn build(&self, seed: u64) -> Box<dyn Classifier> {
        match self {
            ClassifierKind::Svm => Box::new(LinearSvm::new(seed)),
            ClassifierKind::NaiveBayes => Box::new(NaiveBayes::new()),
            ClassifierKind::Majority => Box::new(MajorityBaseline::new()),
            ClassifierKind::Random => Box::new(RandomBaseline::new(seed)),
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassifierKind::Svm => "svm",
            ClassifierKind::NaiveBayes => "naive-bayes",
            ClassifierKind::Majority => "majority",
            ClassifierKind::Random => "random",
        };
        f.write_str(name)
    }
}

impl FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "svm" => Ok(ClassifierKind::Svm),
            "naive-bayes" | "bayes" | "nb" => Ok(ClassifierKind::NaiveBayes),
            "majority" => Ok(ClassifierKind::Majority),
            "random" => Ok(ClassifierKind::Random),
            other => Err(format!("unknown classifier '{}'", other)),
        }
    }
}
