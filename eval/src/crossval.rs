// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Classifier evaluation: k-fold cross-validation and single-split tests
//!
//! The dataset is cut into `k` contiguous slices of `len / k` examples. Each
//! iteration holds one slice out for testing and trains a fresh classifier on
//! everything else; the `len % k` trailing examples are always trained on.
//! Callers shuffle beforehand (the corpus aligner already does).

use crate::classifiers::{Classifier, Document};
use crate::datasets::Polarity;
use crate::error::{ClassifierError, EvaluationError};
use crate::metrics::{ConfusionMatrix, Scores};
use serde::{Deserialize, Serialize};

/// Outcome of one train/test iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldResult {
    pub fold: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub confusion_matrix: ConfusionMatrix,
    pub scores: Scores,
}

/// Outcome of a full cross-validation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidation {
    pub classifier: String,
    pub folds: Vec<FoldResult>,
    /// Confusion counts accumulated over every fold
    pub pooled: ConfusionMatrix,
    /// Per-fold scores averaged across folds
    pub mean: Scores,
}

/// Classify every example with an already trained classifier.
pub fn evaluate<C: Classifier + ?Sized>(
    classifier: &C,
    examples: &[(Document, Polarity)],
) -> Result<ConfusionMatrix, ClassifierError> {
    let mut cm = ConfusionMatrix::default();
    for (document, label) in examples {
        cm.record(classifier.classify(document)?, *label);
    }
    Ok(cm)
}

/// Train on `train`, then evaluate on `test`.
pub fn train_and_evaluate<C: Classifier + ?Sized>(
    classifier: &mut C,
    train: &[(Document, Polarity)],
    test: &[(Document, Polarity)],
) -> Result<ConfusionMatrix, ClassifierError> {
    classifier.train_all(train)?;
    evaluate(classifier, test)
}

/// Train on the first `n_train` examples and test on the rest.
pub fn holdout<C: Classifier + ?Sized>(
    classifier: &mut C,
    examples: &[(Document, Polarity)],
    n_train: usize,
) -> Result<ConfusionMatrix, ClassifierError> {
    let (train, test) = examples.split_at(n_train.min(examples.len()));
    train_and_evaluate(classifier, train, test)
}

/// Run k-fold cross-validation, building a fresh classifier per fold.
///
/// Classifier failures abort the run.
pub fn k_fold<C, F>(
    examples: &[(Document, Polarity)],
    k: usize,
    mut make_classifier: F,
) -> Result<CrossValidation, EvaluationError>
where
    C: Classifier,
    F: FnMut() -> C,
{
    if examples.is_empty() {
        return Err(EvaluationError::EmptyDataset);
    }
    let fold_size = if k >= 2 { examples.len() / k } else { 0 };
    if fold_size == 0 {
        return Err(EvaluationError::InvalidFolds {
            folds: k,
            len: examples.len(),
        });
    }

    let mut folds = Vec::with_capacity(k);
    let mut pooled = ConfusionMatrix::default();
    let mut name = String::new();

    for fold in 0..k {
        let start = fold * fold_size;
        let end = start + fold_size;
        let test = &examples[start..end];
        let train: Vec<(Document, Polarity)> = examples[..start]
            .iter()
            .chain(&examples[end..])
            .cloned()
            .collect();

        let mut classifier = make_classifier();
        name = classifier.name().to_string();
        let cm = train_and_evaluate(&mut classifier, &train, test)?;

        tracing::debug!(
            "{} fold {}/{}: train={}, test={}, accuracy={:.4}",
            name,
            fold + 1,
            k,
            train.len(),
            test.len(),
            cm.accuracy()
        );

        pooled += cm;
        folds.push(FoldResult {
            fold,
            train_size: train.len(),
            test_size: test.len(),
            confusion_matrix: cm,
            scores: cm.scores(),
        });
    }

    let fold_scores: Vec<Scores> = folds.iter().map(|f| f.scores).collect();
    Ok(CrossValidation {
        classifier: name,
        folds,
        pooled,
        mean: Scores::mean(&fold_scores),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{align, AlignConfig};
    use crate::classifiers::LinearSvm;
    use crate::datasets::synthetic_reviews;
    use crate::normalize::raw_documents;

    struct AlwaysPositive;

    impl Classifier for AlwaysPositive {
        fn train(&mut self, _document: &Document, _label: Polarity) -> Result<(), ClassifierError> {
            Ok(())
        }

        fn classify(&self, _document: &Document) -> Result<Polarity, ClassifierError> {
            Ok(Polarity::Positive)
        }

        fn name(&self) -> &str {
            "AlwaysPositive"
        }

        fn description(&self) -> &str {
            "test stub"
        }
    }

    struct Failing;

    impl Classifier for Failing {
        fn train(&mut self, _document: &Document, _label: Polarity) -> Result<(), ClassifierError> {
            Ok(())
        }

        fn classify(&self, _document: &Document) -> Result<Polarity, ClassifierError> {
            Err(ClassifierError::Untrained("Failing"))
        }

        fn name(&self) -> &str {
            "Failing"
        }

        fn description(&self) -> &str {
            "test stub"
        }
    }

    fn examples(labels: &[bool]) -> Vec<(Document, Polarity)> {
        labels
            .iter()
            .enumerate()
            .map(|(i, p)| (Document::Text(format!("doc {}", i)), Polarity::from_bool(*p)))
            .collect()
    }

    #[test]
    fn test_fold_sizes() {
        let data = examples(&[true, false, true, false, true, false, true]);
        let cv = k_fold(&data, 3, || AlwaysPositive).unwrap();

        assert_eq!(cv.folds.len(), 3);
        for fold in &cv.folds {
            assert_eq!(fold.test_size, 2);
            assert_eq!(fold.train_size, 5);
        }
        // the trailing example is never tested
        assert_eq!(cv.pooled.total(), 6);
    }

    #[test]
    fn test_always_positive_scores() {
        let data = examples(&[true, false, false, true, true, false, false, false, true, false]);
        let cv = k_fold(&data, 5, || AlwaysPositive).unwrap();

        assert!((cv.mean.recall - 1.0).abs() < 1e-9);
        assert!((cv.pooled.precision() - 0.4).abs() < 1e-9);
        for fold in &cv.folds {
            let test = &data[fold.fold * 2..fold.fold * 2 + 2];
            let positives = test.iter().filter(|(_, l)| l.is_positive()).count();
            assert!((fold.scores.precision - positives as f64 / 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scores_in_unit_interval() {
        let data = examples(&[true, false, true, true, false, false]);
        let cv = k_fold(&data, 2, || AlwaysPositive).unwrap();
        let (a, p, r, f) = cv.mean.as_tuple();
        for v in [a, p, r, f] {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_invalid_folds() {
        let data = examples(&[true, false, true]);
        assert_eq!(
            k_fold(&data, 1, || AlwaysPositive).unwrap_err(),
            EvaluationError::InvalidFolds { folds: 1, len: 3 }
        );
        assert_eq!(
            k_fold(&data, 4, || AlwaysPositive).unwrap_err(),
            EvaluationError::InvalidFolds { folds: 4, len: 3 }
        );
        assert_eq!(k_fold(&[], 3, || AlwaysPositive).unwrap_err(), EvaluationError::EmptyDataset);
    }

    #[test]
    fn test_classifier_failure_propagates() {
        let data = examples(&[true, false, true, false]);
        let err = k_fold(&data, 2, || Failing).unwrap_err();
        assert_eq!(err, EvaluationError::Classifier(ClassifierError::Untrained("Failing")));
    }

    #[test]
    fn test_holdout() {
        let data = examples(&[true, false, true, false, true]);
        let cm = holdout(&mut AlwaysPositive, &data, 3).unwrap();
        assert_eq!(cm.total(), 2);
        assert_eq!(cm.fp, 1);
        assert_eq!(cm.tp, 1);
    }

    #[test]
    fn test_svm_learns_synthetic_reviews() {
        let reviews = synthetic_reviews(400, 3);
        let aligned = align(&reviews, &AlignConfig::default());
        let data = raw_documents(&aligned);

        let cv = k_fold(&data, 3, || LinearSvm::new(42)).unwrap();
        assert_eq!(cv.classifier, "SVM");
        assert!(cv.mean.accuracy > 0.7, "accuracy {}", cv.mean.accuracy);
    }
}
