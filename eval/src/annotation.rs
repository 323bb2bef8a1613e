// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Hand-annotated adjective scores
//!
//! Annotators enter a score in [-1, +1] per adjective (e.g. parfait = +1.0,
//! bon = +0.6, mal = -0.6). The base score of an adjective is the mean of the
//! scores it received, and annotator consistency is measured with Fleiss'
//! kappa over positive / negative / neutral votes.

use crate::error::AgreementUnavailable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One adjective and the score each annotator gave it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRow {
    pub lemma: String,
    /// One cell per annotator column, `None` when left empty
    pub scores: Vec<Option<f64>>,
}

impl AnnotationRow {
    pub fn given(&self) -> Vec<f64> {
        self.scores.iter().flatten().copied().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSheet {
    pub rows: Vec<AnnotationRow>,
}

/// Vote counts of one adjective: `[positive, negative, neutral]`
pub type VoteCounts = [usize; 3];

impl AnnotationSheet {
    /// Mean annotation per lemma. Lemmas nobody scored are left out.
    pub fn base_scores(&self) -> HashMap<String, f64> {
        let mut scores = HashMap::new();
        for row in &self.rows {
            let given = row.given();
            if given.is_empty() {
                continue;
            }
            let mean = given.iter().sum::<f64>() / given.len() as f64;
            scores.insert(row.lemma.clone(), mean);
        }
        scores
    }

    /// Vote counts for the rows scored by the largest number of annotators.
    ///
    /// Rows with fewer scores than the maximum are dropped, not padded.
    pub fn complete_votes(&self) -> Vec<VoteCounts> {
        let given: Vec<Vec<f64>> = self.rows.iter().map(AnnotationRow::given).collect();
        let n = given.iter().map(Vec::len).max().unwrap_or(0);

        given
            .iter()
            .filter(|scores| scores.len() == n && n > 0)
            .map(|scores| {
                [
                    scores.iter().filter(|x| **x > 0.0).count(),
                    scores.iter().filter(|x| **x < 0.0).count(),
                    scores.iter().filter(|x| **x == 0.0).count(),
                ]
            })
            .collect()
    }

    /// Fleiss' kappa over the complete rows
    pub fn agreement(&self) -> Result<f64, AgreementUnavailable> {
        fleiss_kappa(&self.complete_votes())
    }
}

/// Fleiss' kappa for a table of per-item category counts.
///
/// Every row must hold the same number of ratings.
pub fn fleiss_kappa<const K: usize>(table: &[[usize; K]]) -> Result<f64, AgreementUnavailable> {
    let first = table.first().ok_or(AgreementUnavailable::NoCompleteRows)?;
    let n: usize = first.iter().sum();
    if n < 2 {
        return Err(AgreementUnavailable::TooFewAnnotators(n));
    }

    let items = table.len() as f64;
    let raters = n as f64;

    let mut category_share = [0.0; K];
    let mut observed = 0.0;
    for row in table {
        let mut squares = 0.0;
        for (j, count) in row.iter().enumerate() {
            let count = *count as f64;
            category_share[j] += count;
            squares += count * count;
        }
        observed += (squares - raters) / (raters * (raters - 1.0));
    }
    observed /= items;

    let expected: f64 = category_share
        .iter()
        .map(|total| {
            let p = total / (items * raters);
            p * p
        })
        .sum();

    if (1.0 - expected).abs() < f64::EPSILON {
        return Err(AgreementUnavailable::DegenerateChance);
    }
    Ok((observed - expected) / (1.0 - expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(lemma: &str, scores: &[Option<f64>]) -> AnnotationRow {
        AnnotationRow {
            lemma: lemma.to_string(),
            scores: scores.to_vec(),
        }
    }

    fn sheet() -> AnnotationSheet {
        AnnotationSheet {
            rows: vec![
                row("parfait", &[Some(1.0), Some(1.0), Some(0.8)]),
                row("bon", &[Some(0.6), Some(0.4), None]),
                row("mal", &[Some(-0.6), Some(-0.4), Some(0.0)]),
                row("anglais", &[None, None, None]),
            ],
        }
    }

    #[test]
    fn test_base_scores() {
        let scores = sheet().base_scores();
        assert_eq!(scores.len(), 3);
        assert!((scores["parfait"] - 2.8 / 3.0).abs() < 1e-9);
        assert!((scores["bon"] - 0.5).abs() < 1e-9);
        assert!(!scores.contains_key("anglais"));
    }

    #[test]
    fn test_complete_votes() {
        let votes = sheet().complete_votes();
        assert_eq!(votes, vec![[3, 0, 0], [0, 2, 1]]);
    }

    #[test]
    fn test_fleiss_kappa_perfect_agreement() {
        let kappa = fleiss_kappa(&[[3, 0, 0], [0, 3, 0], [3, 0, 0]]).unwrap();
        assert!((kappa - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fleiss_kappa_reference_table() {
        // Worked example from Fleiss (1971): 10 subjects, 14 raters, 5 categories
        let table = [
            [0, 0, 0, 0, 14],
            [0, 2, 6, 4, 2],
            [0, 0, 3, 5, 6],
            [0, 3, 9, 2, 0],
            [2, 2, 8, 1, 1],
            [7, 7, 0, 0, 0],
            [3, 2, 6, 3, 0],
            [2, 5, 3, 2, 2],
            [6, 5, 2, 1, 0],
            [0, 2, 2, 3, 7],
        ];
        let kappa = fleiss_kappa(&table).unwrap();
        assert!((kappa - 0.210).abs() < 1e-3, "kappa {}", kappa);
    }

    #[test]
    fn test_agreement_unavailable() {
        let empty = AnnotationSheet::default();
        assert_eq!(empty.agreement(), Err(AgreementUnavailable::NoCompleteRows));

        let single = AnnotationSheet {
            rows: vec![row("bon", &[Some(0.5)])],
        };
        assert_eq!(single.agreement(), Err(AgreementUnavailable::TooFewAnnotators(1)));

        let unanimous = AnnotationSheet {
            rows: vec![row("bon", &[Some(0.5), Some(0.7)]), row("beau", &[Some(0.9), Some(1.0)])],
        };
        assert_eq!(unanimous.agreement(), Err(AgreementUnavailable::DegenerateChance));
    }

    #[test]
    fn test_agreement_available() {
        let kappa = sheet().agreement().unwrap();
        assert!(kappa > -1.0 && kappa <= 1.0);
    }
}
