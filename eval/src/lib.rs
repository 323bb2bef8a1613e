// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Sentiment analysis toolkit for French book reviews
//!
//! This crate provides:
//! - Adjective lexicon building from the Lexique word table
//! - Review corpus alignment into a balanced positive/negative dataset
//! - Adjective-only text normalization
//! - Classifiers (linear SVM, Naive Bayes, Majority, Random) and k-fold
//!   cross-validation with accuracy, precision, recall and F1
//! - Hand-annotated lexicon scoring, annotator agreement and a rule-based
//!   polarity predictor
//! - Frequency-based adjective scoring against 5-star and 1-star reviews
//! - Reproducible evaluation pipeline with seeded randomness

pub mod align;
pub mod annotation;
pub mod classifiers;
pub mod crossval;
pub mod datasets;
pub mod error;
pub mod frequency;
pub mod lexicon;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod sentiment;

pub use align::{align, AlignConfig, PolarityBands};
pub use annotation::{fleiss_kappa, AnnotationRow, AnnotationSheet};
pub use classifiers::{Classifier, ClassifierKind, Document, LinearSvm, MajorityBaseline, NaiveBayes, RandomBaseline};
pub use crossval::{k_fold, CrossValidation, FoldResult};
pub use datasets::{LabeledReview, Polarity, Review};
pub use error::{AgreementUnavailable, ClassifierError, EvaluationError, ParseError};
pub use frequency::{FrequencyScore, FrequencyScorer};
pub use lexicon::{FormsMap, LexiconEntry, LexiqueRow, Vocabulary};
pub use metrics::{ClassificationReport, ConfusionMatrix, Scores};
pub use normalize::{normalize, tokenize};
pub use pipeline::{EvaluationPipeline, EvaluationResults, PipelineConfig};
pub use sentiment::{LexiconPredictor, ScoredLexicon};
