// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Typed errors for the sentiment evaluation pipeline
//!
//! File-level failures are reported through `anyhow` with context; the enums
//! here cover the domain failures a caller may want to branch on.

/// A numeric field in a tabular input could not be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("malformed numeric field '{column}' in row {row}: {value:?}")]
pub struct ParseError {
    pub column: &'static str,
    pub row: usize,
    pub value: String,
}

impl ParseError {
    pub fn new(column: &'static str, row: usize, value: &str) -> Self {
        Self {
            column,
            row,
            value: value.to_string(),
        }
    }
}

/// Parse a decimal field, failing fast on anything that is not a number.
pub fn parse_decimal(column: &'static str, row: usize, value: &str) -> Result<f64, ParseError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ParseError::new(column, row, value))
}

/// Failures raised by a trainable classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    /// `classify` was called before any training example was seen.
    #[error("classifier '{0}' has not been trained")]
    Untrained(&'static str),

    /// Training data contained only one polarity.
    #[error("classifier '{0}' needs examples of both polarities")]
    SingleClass(&'static str),
}

/// Failures raised while running a cross-validated evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("cannot evaluate on an empty dataset")]
    EmptyDataset,

    /// Each fold must hold out at least one example and leave some to train on.
    #[error("invalid fold count {folds} for a dataset of {len} examples")]
    InvalidFolds { folds: usize, len: usize },

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Why an inter-annotator agreement statistic could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AgreementUnavailable {
    #[error("no adjective was scored by every annotator")]
    NoCompleteRows,

    #[error("agreement needs at least two annotators, found {0}")]
    TooFewAnnotators(usize),

    /// Every vote fell into the same category, so chance agreement is 1.
    #[error("expected agreement is 1, kappa is undefined")]
    DegenerateChance,
}
