// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Scored sentiment lexicon and the rule-based polarity predictor

use crate::annotation::AnnotationSheet;
use crate::classifiers::{Classifier, Document};
use crate::datasets::Polarity;
use crate::error::ClassifierError;
use crate::lexicon::FormsMap;
use crate::normalize::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Surface form to sentiment score, roughly in [-1, +1]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredLexicon {
    scores: HashMap<String, f64>,
}

impl ScoredLexicon {
    pub fn new(scores: HashMap<String, f64>) -> Self {
        Self { scores }
    }

    /// Give every form of a scored lemma the lemma's score.
    ///
    /// Base scores are kept as they are; forms of unscored lemmas are left out.
    pub fn propagate(base: HashMap<String, f64>, forms: &FormsMap) -> Self {
        let mut scores = base.clone();
        for (lemma, lemma_forms) in forms.iter() {
            if let Some(score) = base.get(lemma) {
                for form in lemma_forms {
                    scores.insert(form.clone(), *score);
                }
            }
        }
        Self { scores }
    }

    /// Mean annotator scores spread over the lexicon's inflected forms
    pub fn from_annotations(sheet: &AnnotationSheet, forms: &FormsMap) -> Self {
        Self::propagate(sheet.base_scores(), forms)
    }

    pub fn get(&self, word: &str) -> Option<f64> {
        self.scores.get(word).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Mean score of the recognised words, 0 when none is recognised
    pub fn mean_score<'a, I>(&self, words: I) -> f64
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut total = 0.0;
        let mut n = 0usize;
        for word in words {
            if let Some(score) = self.get(word) {
                total += score;
                n += 1;
            }
        }
        total / n.max(1) as f64
    }
}

/// Rule-based predictor: positive when the mean adjective score exceeds a threshold
#[derive(Debug, Clone)]
pub struct LexiconPredictor {
    lexicon: ScoredLexicon,
    threshold: f64,
}

impl LexiconPredictor {
    pub fn new(lexicon: ScoredLexicon) -> Self {
        Self::with_threshold(lexicon, 0.0)
    }

    pub fn with_threshold(lexicon: ScoredLexicon, threshold: f64) -> Self {
        Self { lexicon, threshold }
    }

    /// Mean sentiment of the text; newlines count as word separators
    pub fn score(&self, text: &str) -> f64 {
        let tokens = tokenize(&text.replace('\n', " "));
        self.lexicon.mean_score(tokens.iter().map(String::as_str))
    }

    pub fn is_positive(&self, text: &str) -> bool {
        self.score(text) > self.threshold
    }

    pub fn predict(&self, text: &str) -> Polarity {
        Polarity::from_bool(self.is_positive(text))
    }
}

impl Classifier for LexiconPredictor {
    /// The lexicon is fixed; training examples are ignored.
    fn train(&mut self, _document: &Document, _label: Polarity) -> Result<(), ClassifierError> {
        Ok(())
    }

    fn classify(&self, document: &Document) -> Result<Polarity, ClassifierError> {
        let score = match document {
            Document::Text(text) => self.score(text),
            Document::Tokens(tokens) => self.lexicon.mean_score(tokens.iter().map(String::as_str)),
        };
        Ok(Polarity::from_bool(score > self.threshold))
    }

    fn name(&self) -> &str {
        "Lexicon"
    }

    fn description(&self) -> &str {
        "Mean hand-annotated adjective score against a threshold"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(w, s)| (w.to_string(), *s)).collect()
    }

    fn forms(pairs: &[(&str, &[&str])]) -> FormsMap {
        FormsMap::new(
            pairs
                .iter()
                .map(|(lemma, forms)| (lemma.to_string(), forms.iter().map(|f| f.to_string()).collect()))
                .collect(),
        )
    }

    #[test]
    fn test_propagate() {
        let lexicon = ScoredLexicon::propagate(
            base(&[("bon", 0.6)]),
            &forms(&[("bon", &["bon", "bons"]), ("mal", &["mal", "male"])]),
        );

        assert_eq!(lexicon.get("bon"), Some(0.6));
        assert_eq!(lexicon.get("bons"), Some(0.6));
        assert_eq!(lexicon.get("male"), None);
        assert_eq!(lexicon.len(), 2);
    }

    #[test]
    fn test_propagate_keeps_unlisted_lemmas() {
        let lexicon = ScoredLexicon::propagate(
            base(&[("parfait", 1.0), ("terrible", -1.0)]),
            &forms(&[("parfait", &["parfaite", "parfaits"])]),
        );

        for form in ["parfait", "parfaite", "parfaits"] {
            assert_eq!(lexicon.get(form), Some(1.0));
        }
        assert_eq!(lexicon.get("terrible"), Some(-1.0));
    }

    #[test]
    fn test_predictor() {
        let lexicon = ScoredLexicon::propagate(base(&[("bon", 0.6)]), &forms(&[("bon", &["bon", "bons"])]));
        let predictor = LexiconPredictor::new(lexicon);

        assert!((predictor.score("tres bon") - 0.6).abs() < 1e-9);
        assert!(predictor.is_positive("tres bon"));
        assert!(predictor.is_positive("Très BONS!"));
        // no recognised word scores 0, which is not above the threshold
        assert_eq!(predictor.score("rien du tout"), 0.0);
        assert!(!predictor.is_positive("rien du tout"));
    }

    #[test]
    fn test_predictor_mean_and_newlines() {
        let lexicon = ScoredLexicon::new(base(&[("bon", 0.6), ("mal", -0.6), ("nul", -1.0)]));
        let predictor = LexiconPredictor::new(lexicon);

        assert!((predictor.score("bon\nmal") - 0.0).abs() < 1e-9);
        assert!((predictor.score("bon, mal. nul!") - (-1.0 / 3.0)).abs() < 1e-9);
        assert_eq!(predictor.predict("tres mal!"), Polarity::Negative);
    }

    #[test]
    fn test_predictor_threshold() {
        let lexicon = ScoredLexicon::new(base(&[("bon", 0.6)]));
        let strict = LexiconPredictor::with_threshold(lexicon, 0.7);
        assert!(!strict.is_positive("bon"));
    }

    #[test]
    fn test_predictor_as_classifier() {
        let lexicon = ScoredLexicon::new(base(&[("bon", 0.6), ("mal", -0.6)]));
        let predictor = LexiconPredictor::new(lexicon);

        let tokens = Document::Tokens(vec!["mal".to_string()]);
        assert_eq!(predictor.classify(&tokens).unwrap(), Polarity::Negative);
        let text = Document::Text("Vraiment bon.".to_string());
        assert_eq!(predictor.classify(&text).unwrap(), Polarity::Positive);
    }
}
