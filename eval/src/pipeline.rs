// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Reproducible evaluation pipeline for French review sentiment
//!
//! Orchestrates:
//! - Adjective lexicon loading (prebuilt file, raw Lexique table or synthetic)
//! - Review corpus loading and alignment
//! - Cross-validated evaluation of every classifier on raw text and on
//!   adjective-only features
//! - Optional evaluation of the hand-annotated lexicon predictor
//! - Results serialization and markdown reporting

use crate::align::{align, AlignConfig, PolarityBands};
use crate::classifiers::{Classifier, ClassifierKind, Document, LinearSvm};
use crate::crossval::{self, k_fold, CrossValidation};
use crate::datasets::{self, LabeledReview, Polarity, Review};
use crate::error::EvaluationError;
use crate::lexicon::{self, FormsMap, Vocabulary};
use crate::metrics::ClassificationReport;
use crate::normalize::{normalized_documents, raw_documents, review_adjectives};
use crate::sentiment::{LexiconPredictor, ScoredLexicon};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Configuration for the evaluation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Prebuilt `(lemma, forms)` lexicon file
    pub lexicon_path: Option<String>,
    /// Raw Lexique table, used when no prebuilt lexicon is given
    pub lexique_path: Option<String>,
    /// `(text, score)` review corpus; synthetic reviews when absent
    pub corpus_path: Option<String>,
    /// Number of synthetic reviews to generate
    pub synthetic_size: usize,
    /// Maximum number of reviews kept per polarity
    pub cap: usize,
    pub bands: PolarityBands,
    /// Fold count for raw-text evaluation
    pub raw_folds: usize,
    /// Fold count for adjective-only evaluation
    pub normalized_folds: usize,
    /// Classifiers to evaluate (empty = all)
    pub classifiers: Vec<ClassifierKind>,
    /// Hand-annotation sheet for the lexicon predictor
    pub annotations_path: Option<String>,
    /// Decision threshold of the lexicon predictor
    pub threshold: f64,
    /// Number of training examples in the holdout demo
    pub holdout_train: usize,
    /// Output directory for results
    pub output_dir: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            lexicon_path: None,
            lexique_path: None,
            corpus_path: None,
            synthetic_size: 1000,
            cap: 500,
            bands: PolarityBands::default(),
            raw_folds: 3,
            normalized_folds: 10,
            classifiers: vec![],
            annotations_path: None,
            threshold: 0.0,
            holdout_train: 50,
            output_dir: "eval/results".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON configuration; missing keys take their default value.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    fn selected_classifiers(&self) -> Vec<ClassifierKind> {
        if self.classifiers.is_empty() {
            ClassifierKind::ALL.to_vec()
        } else {
            self.classifiers.clone()
        }
    }
}

/// Which features a classifier was given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureSet {
    RawText,
    Adjectives,
}

/// Results from a single cross-validated evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResult {
    pub model_name: String,
    pub model_description: String,
    pub features: FeatureSet,
    pub cross_validation: CrossValidation,
}

/// Results of the hand-annotated lexicon predictor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconResult {
    pub scored_forms: usize,
    pub threshold: f64,
    pub report: ClassificationReport,
    /// Fleiss' kappa, when it could be computed
    pub agreement: Option<f64>,
    pub agreement_note: Option<String>,
}

/// One held-out review classified after training on a handful of examples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldoutExample {
    pub train_samples: usize,
    pub text_preview: String,
    pub adjectives: Vec<String>,
    pub actual: String,
    pub predicted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusInfo {
    pub reviews: usize,
    pub score_distribution: BTreeMap<String, usize>,
    pub aligned: usize,
    pub label_distribution: BTreeMap<String, usize>,
    pub lexicon_lemmas: usize,
    pub vocabulary_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub best_model: String,
    pub best_features: Option<FeatureSet>,
    pub best_f1: f64,
    pub best_accuracy: f64,
}

/// Complete evaluation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResults {
    pub config: PipelineConfig,
    pub corpus_info: CorpusInfo,
    pub model_results: Vec<ModelResult>,
    pub holdout: Option<HoldoutExample>,
    pub lexicon_result: Option<LexiconResult>,
    pub summary: EvaluationSummary,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Main evaluation pipeline
pub struct EvaluationPipeline {
    config: PipelineConfig,
}

impl EvaluationPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Load the adjective lexicon as a lemma to forms map
    pub fn load_lexicon(&self) -> Result<FormsMap> {
        if let Some(ref path) = self.config.lexicon_path {
            tracing::info!("Loading lexicon from {}", path);
            return Ok(FormsMap::new(datasets::load_lexicon(Path::new(path))?));
        }

        let rows = if let Some(ref path) = self.config.lexique_path {
            tracing::info!("Building lexicon from Lexique table {}", path);
            datasets::load_lexique(Path::new(path))?
        } else {
            tracing::warn!("No lexicon provided, using synthetic adjectives");
            datasets::synthetic_lexique()
        };
        let entries = lexicon::build(&rows).context("Failed to build adjective lexicon")?;
        Ok(FormsMap::from_entries(&entries))
    }

    /// Load the star-rated review corpus
    pub fn load_corpus(&self) -> Result<Vec<Review>> {
        match self.config.corpus_path {
            Some(ref path) => {
                tracing::info!("Loading review corpus from {}", path);
                datasets::load_reviews(Path::new(path))
            }
            None => {
                tracing::warn!(
                    "No corpus provided, generating {} synthetic reviews (seed={})",
                    self.config.synthetic_size,
                    self.config.seed
                );
                Ok(datasets::synthetic_reviews(self.config.synthetic_size, self.config.seed))
            }
        }
    }

    fn cross_validate(
        &self,
        kind: ClassifierKind,
        features: FeatureSet,
        documents: &[(Document, Polarity)],
        folds: usize,
    ) -> Result<Option<ModelResult>> {
        let model = kind.build(self.config.seed);
        let seed = self.config.seed;
        let cross_validation = match k_fold(documents, folds, || kind.build(seed)) {
            Ok(cv) => cv,
            Err(e @ (EvaluationError::EmptyDataset | EvaluationError::InvalidFolds { .. })) => {
                tracing::warn!("Skipping {} on {:?}: {}", model.name(), features, e);
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Evaluation of {} on {:?} failed", model.name(), features));
            }
        };

        let scores = cross_validation.mean;
        tracing::info!(
            "  {} ({:?}, {} folds) - Accuracy: {:.4}, P: {:.4}, R: {:.4}, F1: {:.4}",
            model.name(),
            features,
            folds,
            scores.accuracy,
            scores.precision,
            scores.recall,
            scores.f1_score
        );

        Ok(Some(ModelResult {
            model_name: model.name().to_string(),
            model_description: model.description().to_string(),
            features,
            cross_validation,
        }))
    }

    fn holdout_example(&self, aligned: &[LabeledReview], vocabulary: &Vocabulary) -> Result<Option<HoldoutExample>> {
        let n_train = self.config.holdout_train.min(aligned.len().saturating_sub(1));
        if n_train == 0 {
            return Ok(None);
        }

        let documents = raw_documents(&aligned[..n_train]);
        let mut svm = LinearSvm::new(self.config.seed);
        if let Err(e) = svm.train_all(&documents) {
            tracing::warn!("Holdout demo skipped: {}", e);
            return Ok(None);
        }

        let held_out = &aligned[n_train];
        let predicted = svm.classify(&Document::Text(held_out.text.clone()))?;
        Ok(Some(HoldoutExample {
            train_samples: n_train,
            text_preview: held_out.text.chars().take(100).collect(),
            adjectives: review_adjectives(&held_out.text, vocabulary),
            actual: format!("{:?}", held_out.label),
            predicted: format!("{:?}", predicted),
        }))
    }

    fn evaluate_lexicon(&self, path: &str, forms: &FormsMap, aligned: &[LabeledReview]) -> Result<LexiconResult> {
        tracing::info!("Evaluating annotated lexicon from {}", path);
        let sheet = datasets::load_annotations(Path::new(path))?;
        let lexicon = ScoredLexicon::from_annotations(&sheet, forms);
        let scored_forms = lexicon.len();
        let predictor = LexiconPredictor::with_threshold(lexicon, self.config.threshold);

        let cm = crossval::evaluate(&predictor, &raw_documents(aligned))?;
        let report = ClassificationReport::from_confusion_matrix(cm);

        let (agreement, agreement_note) = match sheet.agreement() {
            Ok(kappa) => (Some(kappa), None),
            Err(reason) => {
                tracing::warn!("Annotator agreement unavailable: {}", reason);
                (None, Some(reason.to_string()))
            }
        };

        tracing::info!(
            "  Lexicon - P: {:.4}, R: {:.4}, F1: {:.4}",
            report.scores.precision,
            report.scores.recall,
            report.scores.f1_score
        );

        Ok(LexiconResult {
            scored_forms,
            threshold: self.config.threshold,
            report,
            agreement,
            agreement_note,
        })
    }

    /// Run the full evaluation pipeline
    pub fn run(&self) -> Result<EvaluationResults> {
        let forms = self.load_lexicon()?;
        let vocabulary = Vocabulary::from_forms_map(&forms);
        let reviews = self.load_corpus()?;
        let score_distribution = datasets::score_distribution(&reviews);
        tracing::info!("Review distribution by score: {:?}", score_distribution);

        let align_config = AlignConfig {
            bands: self.config.bands,
            cap: self.config.cap,
            seed: self.config.seed,
        };
        let aligned = align(&reviews, &align_config);

        let corpus_info = CorpusInfo {
            reviews: reviews.len(),
            score_distribution,
            aligned: aligned.len(),
            label_distribution: datasets::label_distribution(&aligned),
            lexicon_lemmas: forms.len(),
            vocabulary_size: vocabulary.len(),
        };

        let mut model_results = Vec::new();
        let mut holdout = None;
        let mut lexicon_result = None;

        if aligned.is_empty() {
            tracing::warn!("Aligned corpus is empty, skipping evaluation");
        } else {
            holdout = self.holdout_example(&aligned, &vocabulary)?;

            let raw = raw_documents(&aligned);
            let adjectives = normalized_documents(&aligned, &vocabulary);

            for kind in self.config.selected_classifiers() {
                tracing::info!("Evaluating classifier: {}", kind);
                model_results.extend(self.cross_validate(kind, FeatureSet::RawText, &raw, self.config.raw_folds)?);
                model_results.extend(self.cross_validate(
                    kind,
                    FeatureSet::Adjectives,
                    &adjectives,
                    self.config.normalized_folds,
                )?);
            }

            if let Some(ref path) = self.config.annotations_path {
                lexicon_result = Some(self.evaluate_lexicon(path, &forms, &aligned)?);
            }
        }

        Ok(EvaluationResults {
            config: self.config.clone(),
            corpus_info,
            summary: Self::summarize(&model_results),
            model_results,
            holdout,
            lexicon_result,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    fn summarize(results: &[ModelResult]) -> EvaluationSummary {
        let mut summary = EvaluationSummary {
            best_model: "None".to_string(),
            best_features: None,
            best_f1: 0.0,
            best_accuracy: 0.0,
        };
        for r in results {
            let scores = r.cross_validation.mean;
            if scores.f1_score > summary.best_f1 {
                summary.best_f1 = scores.f1_score;
                summary.best_accuracy = scores.accuracy;
                summary.best_model = r.model_name.clone();
                summary.best_features = Some(r.features);
            }
        }
        summary
    }

    /// Save results to JSON file
    pub fn save_results(results: &EvaluationResults, output_path: &Path) -> Result<()> {
        std::fs::create_dir_all(output_path.parent().unwrap_or(Path::new(".")))?;
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(output_path, json)?;
        tracing::info!("Results saved to {}", output_path.display());
        Ok(())
    }

    /// Generate a markdown report
    pub fn generate_report(results: &EvaluationResults) -> String {
        let mut report = String::new();
        let info = &results.corpus_info;

        report.push_str("# French Review Sentiment Evaluation Report\n\n");
        report.push_str(&format!("**Generated:** {}\n\n", results.timestamp.format("%Y-%m-%d %H:%M:%S UTC")));
        report.push_str(&format!("**Version:** {}\n\n", results.version));

        report.push_str("## Corpus\n\n");
        report.push_str(&format!("- **Reviews:** {}\n", info.reviews));
        report.push_str(&format!("- **Score distribution:** {:?}\n", info.score_distribution));
        report.push_str(&format!(
            "- **Aligned:** {} ({:?}, cap {} per class)\n",
            info.aligned, info.label_distribution, results.config.cap
        ));
        report.push_str(&format!(
            "- **Lexicon:** {} adjective lemmas, {} forms\n\n",
            info.lexicon_lemmas, info.vocabulary_size
        ));

        report.push_str("## Summary\n\n");
        report.push_str(&format!(
            "**Best Model:** {} on {:?} (F1={:.4}, Accuracy={:.4})\n\n",
            results.summary.best_model,
            results.summary.best_features,
            results.summary.best_f1,
            results.summary.best_accuracy
        ));

        report.push_str("### Classifier Comparison\n\n");
        report.push_str("| Model | Features | Folds | Accuracy | Precision | Recall | F1 Score |\n");
        report.push_str("|-------|----------|-------|----------|-----------|--------|----------|\n");
        for result in &results.model_results {
            let scores = result.cross_validation.mean;
            report.push_str(&format!(
                "| {} | {:?} | {} | {:.4} | {:.4} | {:.4} | {:.4} |\n",
                result.model_name,
                result.features,
                result.cross_validation.folds.len(),
                scores.accuracy,
                scores.precision,
                scores.recall,
                scores.f1_score
            ));
        }

        if let Some(ref holdout) = results.holdout {
            report.push_str("\n## Holdout Example\n\n");
            report.push_str(&format!("Trained on {} reviews.\n\n", holdout.train_samples));
            report.push_str(&format!("- Review: {}\n", holdout.text_preview));
            report.push_str(&format!("- Adjectives: {:?}\n", holdout.adjectives));
            report.push_str(&format!("- Actual: {}\n", holdout.actual));
            report.push_str(&format!("- Predicted: {}\n", holdout.predicted));
        }

        if let Some(ref lexicon) = results.lexicon_result {
            report.push_str("\n## Annotated Lexicon\n\n");
            report.push_str(&format!(
                "{} scored forms, threshold {:.2}\n\n",
                lexicon.scored_forms, lexicon.threshold
            ));
            report.push_str(&format!("```\n{}\n```\n\n", lexicon.report.format()));
            match (lexicon.agreement, &lexicon.agreement_note) {
                (Some(kappa), _) => report.push_str(&format!("Annotator agreement (Fleiss' kappa): {:.4}\n", kappa)),
                (None, Some(note)) => report.push_str(&format!("Annotator agreement unavailable: {}\n", note)),
                (None, None) => {}
            }
        }

        report.push_str("\n## Detailed Results\n\n");
        for result in &results.model_results {
            report.push_str(&format!("### {} ({:?})\n\n", result.model_name, result.features));
            report.push_str(&format!("*{}*\n\n", result.model_description));
            report.push_str("| Fold | Train | Test | Accuracy | F1 Score |\n");
            report.push_str("|------|-------|------|----------|----------|\n");
            for fold in &result.cross_validation.folds {
                report.push_str(&format!(
                    "| {} | {} | {} | {:.4} | {:.4} |\n",
                    fold.fold + 1,
                    fold.train_size,
                    fold.test_size,
                    fold.scores.accuracy,
                    fold.scores.f1_score
                ));
            }
            report.push_str(&format!(
                "\n```\n{}\n```\n\n",
                ClassificationReport::from_confusion_matrix(result.cross_validation.pooled).format()
            ));
        }

        report.push_str("## Configuration\n\n");
        report.push_str(&format!("```json\n{}\n```\n", serde_json::to_string_pretty(&results.config).unwrap_or_default()));

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            synthetic_size: 300,
            classifiers: vec![ClassifierKind::Svm, ClassifierKind::Majority],
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_pipeline_synthetic() {
        let pipeline = EvaluationPipeline::new(small_config());
        let results = pipeline.run().expect("Pipeline should succeed");

        assert_eq!(results.model_results.len(), 4);
        assert!(results.summary.best_f1 >= 0.0);
        assert!(results.summary.best_f1 <= 1.0);
        assert!(results.holdout.is_some());

        let info = &results.corpus_info;
        assert_eq!(info.reviews, 300);
        assert_eq!(info.label_distribution.get("Positive"), info.label_distribution.get("Negative"));
    }

    #[test]
    fn test_pipeline_fold_counts() {
        let pipeline = EvaluationPipeline::new(small_config());
        let results = pipeline.run().unwrap();

        for result in &results.model_results {
            let expected = match result.features {
                FeatureSet::RawText => 3,
                FeatureSet::Adjectives => 10,
            };
            assert_eq!(result.cross_validation.folds.len(), expected);
        }
    }

    #[test]
    fn test_pipeline_empty_alignment() {
        let config = PipelineConfig {
            synthetic_size: 0,
            ..small_config()
        };
        let results = EvaluationPipeline::new(config).run().unwrap();
        assert!(results.model_results.is_empty());
        assert_eq!(results.summary.best_model, "None");
    }

    #[test]
    fn test_pipeline_corpus_smaller_than_folds() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("books-fr.csv");
        let annotations = dir.path().join("annotations.csv");
        datasets::save_reviews(
            &[
                Review::new("Un livre mauvais", 1.0),
                Review::new("Une fin nul", 1.0),
                Review::new("Un roman\nbon et beau", 5.0),
                Review::new("Bof", 3.0),
            ],
            &corpus,
        )
        .unwrap();
        std::fs::write(&annotations, "adjectif,note,commentaire,a1,a2\nbon,,,0.6,0.4\nmauvais,,,-0.6,-0.8\n").unwrap();

        let config = PipelineConfig {
            corpus_path: Some(corpus.to_string_lossy().to_string()),
            annotations_path: Some(annotations.to_string_lossy().to_string()),
            ..small_config()
        };
        let results = EvaluationPipeline::new(config).run().unwrap();

        assert_eq!(results.corpus_info.aligned, 2);
        assert!(results.model_results.is_empty());
        assert_eq!(results.summary.best_model, "None");

        let lexicon = results.lexicon_result.expect("lexicon evaluation still runs");
        assert_eq!(lexicon.report.support, 2);
        assert!((lexicon.report.scores.accuracy - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_config_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"seed": 7, "classifiers": ["naive-bayes"]}"#).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.classifiers, vec![ClassifierKind::NaiveBayes]);
        assert_eq!(config.cap, 500);
    }

    #[test]
    fn test_generate_report() {
        let results = EvaluationPipeline::new(small_config()).run().unwrap();
        let report = EvaluationPipeline::generate_report(&results);

        assert!(report.contains("French Review Sentiment Evaluation Report"));
        assert!(report.contains("Classifier Comparison"));
        assert!(report.contains("Best Model"));
    }
}
