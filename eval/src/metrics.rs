// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Evaluation metrics for binary sentiment classification
//!
//! Implements standard ML metrics with the positive polarity as the
//! target class:
//! - Confusion Matrix
//! - Accuracy, Precision, Recall, F1-Score
//! - Averaging of per-fold scores

use crate::datasets::Polarity;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Confusion matrix for binary classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// True Positives (positive review predicted positive)
    pub tp: usize,
    /// True Negatives (negative review predicted negative)
    pub tn: usize,
    /// False Positives (negative review predicted positive)
    pub fp: usize,
    /// False Negatives (positive review predicted negative)
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Count one prediction
    pub fn record(&mut self, predicted: Polarity, actual: Polarity) {
        match (predicted, actual) {
            (Polarity::Positive, Polarity::Positive) => self.tp += 1,
            (Polarity::Negative, Polarity::Negative) => self.tn += 1,
            (Polarity::Positive, Polarity::Negative) => self.fp += 1,
            (Polarity::Negative, Polarity::Positive) => self.fn_ += 1,
        }
    }

    /// Total number of samples
    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// Accuracy: (TP + TN) / Total
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.tp + self.tn) as f64 / total as f64
    }

    /// Precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        let denom = self.tp + self.fp;
        if denom == 0 {
            return 0.0;
        }
        self.tp as f64 / denom as f64
    }

    /// Recall: TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        let denom = self.tp + self.fn_;
        if denom == 0 {
            return 0.0;
        }
        self.tp as f64 / denom as f64
    }

    /// F1 Score: 2 * (Precision * Recall) / (Precision + Recall)
    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        let denom = precision + recall;
        if denom == 0.0 {
            return 0.0;
        }
        2.0 * precision * recall / denom
    }

    pub fn scores(&self) -> Scores {
        Scores {
            accuracy: self.accuracy(),
            precision: self.precision(),
            recall: self.recall(),
            f1_score: self.f1_score(),
        }
    }
}

impl AddAssign for ConfusionMatrix {
    fn add_assign(&mut self, other: Self) {
        self.tp += other.tp;
        self.tn += other.tn;
        self.fp += other.fp;
        self.fn_ += other.fn_;
    }
}

/// The `(accuracy, precision, recall, F1)` tuple
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl Scores {
    /// Arithmetic mean of each metric; all zeros for an empty slice
    pub fn mean(scores: &[Scores]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let n = scores.len() as f64;
        Self {
            accuracy: scores.iter().map(|s| s.accuracy).sum::<f64>() / n,
            precision: scores.iter().map(|s| s.precision).sum::<f64>() / n,
            recall: scores.iter().map(|s| s.recall).sum::<f64>() / n,
            f1_score: scores.iter().map(|s| s.f1_score).sum::<f64>() / n,
        }
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.accuracy, self.precision, self.recall, self.f1_score)
    }
}

/// Full classification report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub confusion_matrix: ConfusionMatrix,
    pub scores: Scores,
    pub support: usize,
}

impl ClassificationReport {
    /// Generate full report from confusion matrix
    pub fn from_confusion_matrix(cm: ConfusionMatrix) -> Self {
        Self {
            scores: cm.scores(),
            support: cm.total(),
            confusion_matrix: cm,
        }
    }

    /// Format as a human-readable string
    pub fn format(&self) -> String {
        format!(
            r#"Classification Report
=====================
Accuracy:          {:.4} ({:.2}%)
Precision:         {:.4}
Recall:            {:.4}
F1 Score:          {:.4}
Support:           {}

Confusion Matrix:
                  Predicted
                  Positive  Negative
Actual Positive  {:>6}    {:>6}
       Negative  {:>6}    {:>6}
"#,
            self.scores.accuracy, self.scores.accuracy * 100.0,
            self.scores.precision,
            self.scores.recall,
            self.scores.f1_score,
            self.support,
            self.confusion_matrix.tp, self.confusion_matrix.fn_,
            self.confusion_matrix.fp, self.confusion_matrix.tn,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Polarity::{Negative, Positive};

    fn matrix(predictions: &[Polarity], ground_truth: &[Polarity]) -> ConfusionMatrix {
        let mut cm = ConfusionMatrix::default();
        for (pred, truth) in predictions.iter().zip(ground_truth) {
            cm.record(*pred, *truth);
        }
        cm
    }

    #[test]
    fn test_confusion_matrix_perfect() {
        let predictions = vec![Positive, Positive, Negative, Negative];
        let ground_truth = vec![Positive, Positive, Negative, Negative];

        let cm = matrix(&predictions, &ground_truth);

        assert_eq!(cm.tp, 2);
        assert_eq!(cm.tn, 2);
        assert_eq!(cm.fp, 0);
        assert_eq!(cm.fn_, 0);
        assert!((cm.accuracy() - 1.0).abs() < 1e-6);
        assert!((cm.f1_score() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_confusion_matrix_worst() {
        let predictions = vec![Negative, Negative, Positive, Positive];
        let ground_truth = vec![Positive, Positive, Negative, Negative];

        let cm = matrix(&predictions, &ground_truth);

        assert_eq!(cm.fp, 2);
        assert_eq!(cm.fn_, 2);
        assert!(cm.accuracy().abs() < 1e-6);
        // precision + recall == 0 gives F1 == 0
        assert_eq!(cm.f1_score(), 0.0);
    }

    #[test]
    fn test_always_positive() {
        let ground_truth = vec![Positive, Negative, Negative, Positive, Negative];
        let predictions = vec![Positive; ground_truth.len()];

        let scores = matrix(&predictions, &ground_truth).scores();
        assert!((scores.recall - 1.0).abs() < 1e-9);
        assert!((scores.precision - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_empty_matrix() {
        let scores = ConfusionMatrix::default().scores();
        assert_eq!(scores, Scores::default());
    }

    #[test]
    fn test_add_assign() {
        let mut cm = ConfusionMatrix { tp: 1, tn: 2, fp: 3, fn_: 4 };
        cm += ConfusionMatrix { tp: 1, tn: 1, fp: 1, fn_: 1 };
        assert_eq!(cm, ConfusionMatrix { tp: 2, tn: 3, fp: 4, fn_: 5 });
    }

    #[test]
    fn test_scores_mean() {
        let a = Scores { accuracy: 1.0, precision: 0.5, recall: 0.0, f1_score: 0.2 };
        let b = Scores { accuracy: 0.0, precision: 0.5, recall: 1.0, f1_score: 0.4 };
        let mean = Scores::mean(&[a, b]);
        let (accuracy, precision, recall, f1) = mean.as_tuple();
        assert!((accuracy - 0.5).abs() < 1e-9);
        assert!((precision - 0.5).abs() < 1e-9);
        assert!((recall - 0.5).abs() < 1e-9);
        assert!((f1 - 0.3).abs() < 1e-9);
        assert_eq!(Scores::mean(&[]), Scores::default());
    }

    #[test]
    fn test_classification_report_format() {
        let predictions = vec![Positive, Positive, Negative, Negative];
        let ground_truth = vec![Positive, Negative, Negative, Negative];

        let report = ClassificationReport::from_confusion_matrix(matrix(&predictions, &ground_truth));
        let formatted = report.format();

        assert!(formatted.contains("Classification Report"));
        assert!(formatted.contains("Accuracy"));
        assert!(formatted.contains("Confusion Matrix"));
        assert_eq!(report.support, 4);
    }
}
