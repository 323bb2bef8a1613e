// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Rule-based sentiment prediction from a hand-annotated adjective lexicon
//!
//! Usage:
//!   predict-sentiment --annotations annotations.csv --lexicon adj-fr.csv "Un livre magnifique"
//!   predict-sentiment --annotations annotations.csv --lexicon adj-fr.csv --evaluate books-fr-test.csv

use anyhow::{Context, Result};
use clap::Parser;
use sentiment_eval::crossval;
use sentiment_eval::datasets;
use sentiment_eval::lexicon::FormsMap;
use sentiment_eval::metrics::ClassificationReport;
use sentiment_eval::normalize::raw_documents;
use sentiment_eval::sentiment::{LexiconPredictor, ScoredLexicon};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "predict-sentiment")]
#[command(about = "Classify French reviews with an annotated adjective lexicon")]
#[command(version)]
struct Args {
    /// Hand-annotation sheet (header row, scores from the 4th column on)
    #[arg(short, long)]
    annotations: PathBuf,

    /// Adjective lexicon (lemma, forms) used to score inflected forms
    #[arg(short, long)]
    lexicon: PathBuf,

    /// Texts are positive when their mean score is above this value
    #[arg(short, long, default_value_t = 0.0)]
    threshold: f64,

    /// Aligned corpus (text, True|False) to evaluate the predictor on
    #[arg(short, long)]
    evaluate: Option<PathBuf>,

    /// Texts to classify
    texts: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let sheet = datasets::load_annotations(&args.annotations)?;
    let forms = FormsMap::new(datasets::load_lexicon(&args.lexicon)?);
    let lexicon = ScoredLexicon::from_annotations(&sheet, &forms);
    tracing::info!(
        "{} annotated adjectives, {} scored forms",
        sheet.rows.len(),
        lexicon.len()
    );

    match sheet.agreement() {
        Ok(kappa) => println!("Fleiss' kappa: {:.4}", kappa),
        Err(reason) => println!("Fleiss' kappa unavailable: {}", reason),
    }

    let predictor = LexiconPredictor::with_threshold(lexicon, args.threshold);

    for text in &args.texts {
        println!(
            "{:>7.3}  {:<8}  {}",
            predictor.score(text),
            format!("{:?}", predictor.predict(text)),
            text
        );
    }

    if let Some(ref path) = args.evaluate {
        let samples = datasets::load_labeled(path)?;
        let cm = crossval::evaluate(&predictor, &raw_documents(&samples))
            .with_context(|| format!("Failed to evaluate on {}", path.display()))?;
        println!("\nEvaluation on {} ({} reviews):", path.display(), samples.len());
        println!("{}", ClassificationReport::from_confusion_matrix(cm).format());
    }

    Ok(())
}
