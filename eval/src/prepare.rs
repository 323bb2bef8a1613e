// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Data preparation utility for the sentiment pipeline
//!
//! Builds the adjective lexicon, aligns a review corpus into a balanced
//! labeled set, and produces the frequency sheet handed to annotators.
//!
//! Usage:
//!   prepare-data lexicon --lexique Lexique383.tsv --output adj-fr.csv
//!   prepare-data align --corpus books-fr.csv --output books-fr-test.csv
//!   prepare-data frequency --corpus books-fr.csv --lexicon adj-fr.csv --output freq.csv

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use sentiment_eval::align::{align, AlignConfig, PolarityBands};
use sentiment_eval::datasets;
use sentiment_eval::frequency::FrequencyScorer;
use sentiment_eval::lexicon::{self, FormsMap};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "prepare-data")]
#[command(about = "Prepare lexicon, aligned corpus and frequency sheet")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract ranked adjectives and their forms from the Lexique table
    Lexicon {
        /// Lexique table (tab-separated, header row)
        #[arg(short, long)]
        lexique: PathBuf,

        #[arg(short, long, default_value = "adj-fr.csv")]
        output: PathBuf,
    },

    /// Build a balanced, shuffled positive/negative corpus
    Align {
        /// Review corpus (text, score)
        #[arg(short, long)]
        corpus: PathBuf,

        #[arg(short, long, default_value = "books-fr-test.csv")]
        output: PathBuf,

        /// Maximum number of reviews per polarity
        #[arg(long, default_value_t = 500)]
        cap: usize,

        /// Lowest neutral score; lower scores are negative
        #[arg(long, default_value_t = 3.0)]
        neutral_min: f64,

        /// Highest neutral score; higher scores are positive
        #[arg(long, default_value_t = 3.0)]
        neutral_max: f64,

        /// Shuffle seed
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
    },

    /// Share of each adjective's occurrences in 5-star and 1-star reviews
    Frequency {
        /// Review corpus (text, score)
        #[arg(short, long)]
        corpus: PathBuf,

        /// Adjective lexicon (lemma, forms)
        #[arg(short, long)]
        lexicon: PathBuf,

        #[arg(short, long, default_value = "adj-freq.csv")]
        output: PathBuf,

        /// Number of top-ranked lemmas to score
        #[arg(long, default_value_t = 2000)]
        limit: usize,
    },
}

fn build_lexicon(lexique: &Path, output: &Path) -> Result<()> {
    let rows = datasets::load_lexique(lexique)?;
    let entries = lexicon::build(&rows)?;
    tracing::info!("{} Lexique rows, {} adjective lemmas", rows.len(), entries.len());

    datasets::save_lexicon(&entries, output)?;
    for entry in entries.iter().take(10) {
        println!("{:<20} {:>10.2}  {}", entry.lemma, entry.weight, entry.forms.join(","));
    }
    Ok(())
}

fn align_corpus(corpus: &Path, output: &Path, config: AlignConfig) -> Result<()> {
    let reviews = datasets::load_reviews(corpus)?;

    println!("Reviews by score:");
    for (score, count) in datasets::score_distribution(&reviews) {
        println!("  {:>5}: {}", score, count);
    }

    let aligned = align(&reviews, &config);
    datasets::save_labeled(&aligned, output)?;
    println!("\nAligned corpus: {:?}", datasets::label_distribution(&aligned));
    println!("Saved to: {}", output.display());
    Ok(())
}

fn frequency_sheet(corpus: &Path, lexicon: &Path, output: &Path, limit: usize) -> Result<()> {
    let reviews = datasets::load_reviews(corpus)?;
    let forms = FormsMap::new(datasets::load_lexicon(lexicon)?);
    let scorer = FrequencyScorer::new(&reviews);
    let lemmas = forms.head(limit);
    tracing::info!(
        "Scoring {} lemmas against {} stratified reviews",
        lemmas.len(),
        scorer.corpus_size()
    );

    let pb = ProgressBar::new(lemmas.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Scoring: [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let mut scores = Vec::with_capacity(lemmas.len());
    for (lemma, lemma_forms) in lemmas {
        scores.push(scorer.score_lemma(lemma, lemma_forms));
        pb.inc(1);
    }
    pb.finish_and_clear();

    datasets::save_frequency_sheet(&scores, output)?;
    println!("Frequency sheet saved to: {}", output.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Lexicon { lexique, output } => build_lexicon(&lexique, &output),
        Command::Align {
            corpus,
            output,
            cap,
            neutral_min,
            neutral_max,
            seed,
        } => {
            let config = AlignConfig {
                bands: PolarityBands { neutral_min, neutral_max },
                cap,
                seed,
            };
            align_corpus(&corpus, &output, config)
        }
        Command::Frequency {
            corpus,
            lexicon,
            output,
            limit,
        } => frequency_sheet(&corpus, &lexicon, &output, limit),
    }
}
