// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Evaluation pipeline CLI for French review sentiment
//!
//! Usage:
//!   sentiment-pipeline --seed 42
//!   sentiment-pipeline --lexicon adj-fr.csv --corpus books-fr.csv --classifiers svm,naive-bayes
//!   sentiment-pipeline --config eval.json --annotations annotations.csv

use anyhow::{Context, Result};
use clap::Parser;
use sentiment_eval::classifiers::ClassifierKind;
use sentiment_eval::pipeline::{EvaluationPipeline, PipelineConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sentiment-pipeline")]
#[command(about = "Evaluate sentiment classifiers on French book reviews")]
#[command(version)]
struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Prebuilt adjective lexicon (lemma, forms)
    #[arg(short, long)]
    lexicon: Option<PathBuf>,

    /// Raw Lexique table to build the adjective lexicon from
    #[arg(long)]
    lexique: Option<PathBuf>,

    /// Review corpus (text, score); synthetic reviews when absent
    #[arg(short, long)]
    corpus: Option<PathBuf>,

    /// Hand-annotation sheet for the lexicon predictor
    #[arg(short, long)]
    annotations: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum number of reviews per polarity
    #[arg(long)]
    cap: Option<usize>,

    /// Classifiers to run (comma-separated, empty = all)
    #[arg(long, value_delimiter = ',')]
    classifiers: Vec<ClassifierKind>,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (json, markdown, both)
    #[arg(short, long, default_value = "both")]
    format: String,
}

impl Args {
    fn into_config(self) -> Result<(PipelineConfig, String)> {
        let mut config = match self.config {
            Some(ref path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        let path_string = |p: PathBuf| p.to_string_lossy().to_string();
        if let Some(path) = self.lexicon {
            config.lexicon_path = Some(path_string(path));
        }
        if let Some(path) = self.lexique {
            config.lexique_path = Some(path_string(path));
        }
        if let Some(path) = self.corpus {
            config.corpus_path = Some(path_string(path));
        }
        if let Some(path) = self.annotations {
            config.annotations_path = Some(path_string(path));
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(cap) = self.cap {
            config.cap = cap;
        }
        if !self.classifiers.is_empty() {
            config.classifiers = self.classifiers;
        }
        if let Some(output) = self.output {
            config.output_dir = path_string(output);
        }
        Ok((config, self.format))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (config, format) = Args::parse().into_config()?;

    tracing::info!("French Review Sentiment Evaluation Pipeline");
    tracing::info!("===========================================");
    tracing::info!("Corpus: {}", config.corpus_path.as_deref().unwrap_or("synthetic"));
    tracing::info!("Seed: {}", config.seed);

    let output_dir = PathBuf::from(&config.output_dir);
    let pipeline = EvaluationPipeline::new(config);
    let results = pipeline.run()?;

    println!("\n{}", "=".repeat(70));
    println!("EVALUATION SUMMARY");
    println!("{}", "=".repeat(70));
    println!(
        "\nCorpus: {} reviews, {} aligned, {} adjective forms",
        results.corpus_info.reviews, results.corpus_info.aligned, results.corpus_info.vocabulary_size
    );
    println!("Best Model: {} (F1={:.4})", results.summary.best_model, results.summary.best_f1);
    println!("\nClassifier Comparison:");
    println!("{:-<70}", "");
    println!(
        "{:<15} {:<12} {:>10} {:>10} {:>10} {:>10}",
        "Model", "Features", "Accuracy", "Precision", "Recall", "F1"
    );
    println!("{:-<70}", "");

    for result in &results.model_results {
        let (accuracy, precision, recall, f1) = result.cross_validation.mean.as_tuple();
        println!(
            "{:<15} {:<12} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
            result.model_name,
            format!("{:?}", result.features),
            accuracy,
            precision,
            recall,
            f1
        );
    }
    println!("{:-<70}", "");

    if let Some(ref holdout) = results.holdout {
        println!(
            "\nHoldout (trained on {}): actual={}, predicted={}",
            holdout.train_samples, holdout.actual, holdout.predicted
        );
        println!("  {}", holdout.text_preview);
    }

    if let Some(ref lexicon) = results.lexicon_result {
        println!("\nAnnotated lexicon ({} forms):", lexicon.scored_forms);
        println!("{}", lexicon.report.format());
        match lexicon.agreement {
            Some(kappa) => println!("Fleiss' kappa: {:.4}", kappa),
            None => println!("Fleiss' kappa: unavailable"),
        }
    }

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");

    if format == "json" || format == "both" {
        let json_path = output_dir.join(format!("sentiment_{}.json", timestamp));
        EvaluationPipeline::save_results(&results, &json_path)?;
        println!("\nJSON results saved to: {}", json_path.display());
    }

    if format == "markdown" || format == "both" {
        let report = EvaluationPipeline::generate_report(&results);
        let md_path = output_dir.join(format!("sentiment_{}.md", timestamp));
        std::fs::write(&md_path, report)?;
        println!("Markdown report saved to: {}", md_path.display());
    }

    println!("\nEvaluation complete!");

    Ok(())
}
