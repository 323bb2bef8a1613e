// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Dataset loading and saving for the sentiment pipeline
//!
//! Every file the pipeline touches is a flat delimited table:
//! - Lexique word table (tab-separated, header row)
//! - review corpus `(text, score)` and aligned corpus `(text, True|False)`
//! - adjective lexicon `(lemma, "form1,form2,...")`
//! - annotation sheet (header row, per-annotator scores from column 4 on)
//! - frequency sheet `(lemma, pct_positive, pct_negative)`

use crate::annotation::{AnnotationRow, AnnotationSheet};
use crate::error::parse_decimal;
use crate::frequency::FrequencyScore;
use crate::lexicon::{LexiconEntry, LexiqueRow};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Binary sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Negative,
    Positive,
}

impl Polarity {
    pub fn from_bool(positive: bool) -> Self {
        if positive {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }

    pub fn is_positive(&self) -> bool {
        *self == Polarity::Positive
    }

    /// Field value used in the aligned corpus file
    pub fn as_field(&self) -> &'static str {
        match self {
            Polarity::Positive => "True",
            Polarity::Negative => "False",
        }
    }

    /// Anything other than `True` reads back as negative.
    pub fn from_field(field: &str) -> Self {
        Self::from_bool(field == "True")
    }
}

/// A review with its raw star rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub text: String,
    pub score: f64,
}

impl Review {
    pub fn new(text: impl Into<String>, score: f64) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// A review with a binary polarity label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledReview {
    pub text: String,
    pub label: Polarity,
}

impl LabeledReview {
    pub fn new(text: impl Into<String>, label: Polarity) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

fn comma_reader(path: &Path, has_headers: bool) -> Result<csv::Reader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(file))
}

fn comma_writer(path: &Path) -> Result<csv::Writer<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(csv::WriterBuilder::new().has_headers(false).from_writer(file))
}

/// Load the Lexique word table.
///
/// Fields used: 1st (form), 3rd (lemma), 4th (part-of-speech tag) and 8th
/// (lemma frequency in books). Short rows are skipped.
pub fn load_lexique(path: &Path) -> Result<Vec<LexiqueRow>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open Lexique file: {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(file);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record {} in {}", idx, path.display()))?;
        if record.len() < 8 {
            tracing::warn!("Skipping malformed line {} in {}: insufficient fields", idx, path.display());
            continue;
        }
        rows.push(LexiqueRow {
            form: record[0].to_string(),
            lemma: record[2].to_string(),
            tag: record[3].to_string(),
            weight: record[7].to_string(),
        });
    }

    tracing::debug!("Loaded {} Lexique rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load a `(text, score)` review corpus. An unparseable score aborts the load.
pub fn load_reviews(path: &Path) -> Result<Vec<Review>> {
    let mut reader = comma_reader(path, false)?;
    let mut reviews = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record {} in {}", idx, path.display()))?;
        let text = record.get(0).unwrap_or("").to_string();
        let score = parse_decimal("score", idx, record.get(1).unwrap_or(""))
            .with_context(|| format!("Bad review score in {}", path.display()))?;
        reviews.push(Review { text, score });
    }

    Ok(reviews)
}

pub fn save_reviews(reviews: &[Review], path: &Path) -> Result<()> {
    let mut writer = comma_writer(path)?;
    for review in reviews {
        writer.write_record([review.text.as_str(), &review.score.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Load an aligned `(text, True|False)` corpus
pub fn load_labeled(path: &Path) -> Result<Vec<LabeledReview>> {
    let mut reader = comma_reader(path, false)?;
    let mut samples = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record {} in {}", idx, path.display()))?;
        samples.push(LabeledReview {
            text: record.get(0).unwrap_or("").to_string(),
            label: Polarity::from_field(record.get(1).unwrap_or("")),
        });
    }

    Ok(samples)
}

pub fn save_labeled(samples: &[LabeledReview], path: &Path) -> Result<()> {
    let mut writer = comma_writer(path)?;
    for sample in samples {
        writer.write_record([sample.text.as_str(), sample.label.as_field()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Save the ranked lexicon as `(lemma, forms)` rows, forms joined by commas.
pub fn save_lexicon(entries: &[LexiconEntry], path: &Path) -> Result<()> {
    let mut writer = comma_writer(path)?;
    for entry in entries {
        writer.write_record([entry.lemma.as_str(), &entry.forms.join(",")])?;
    }
    writer.flush()?;
    tracing::info!("Lexicon saved to {} ({} lemmas)", path.display(), entries.len());
    Ok(())
}

/// Load `(lemma, forms)` rows in file order.
pub fn load_lexicon(path: &Path) -> Result<Vec<(String, Vec<String>)>> {
    let mut reader = comma_reader(path, false)?;
    let mut entries = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record {} in {}", idx, path.display()))?;
        let lemma = record.get(0).unwrap_or("").to_string();
        let forms = record
            .get(1)
            .unwrap_or("")
            .split(',')
            .map(str::to_string)
            .collect();
        entries.push((lemma, forms));
    }

    Ok(entries)
}

/// Load a hand-annotation sheet.
///
/// The first row is a header. Column 1 is the adjective, columns 2-3 are
/// free-form notes, and every later column holds one annotator's score.
/// Empty cells mean the annotator skipped that adjective.
pub fn load_annotations(path: &Path) -> Result<AnnotationSheet> {
    let mut reader = comma_reader(path, true)?;
    let mut rows = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record {} in {}", idx, path.display()))?;
        let lemma = record.get(0).unwrap_or("").to_string();
        let mut scores = Vec::new();
        for field in record.iter().skip(3) {
            if field.trim().is_empty() {
                scores.push(None);
            } else {
                let score = parse_decimal("annotation", idx, field)
                    .with_context(|| format!("Bad annotation score in {}", path.display()))?;
                scores.push(Some(score));
            }
        }
        rows.push(AnnotationRow { lemma, scores });
    }

    Ok(AnnotationSheet { rows })
}

/// Save frequency scores with two fraction digits per percentage
pub fn save_frequency_sheet(scores: &[FrequencyScore], path: &Path) -> Result<()> {
    let mut writer = comma_writer(path)?;
    for score in scores {
        writer.write_record([
            score.lemma.as_str(),
            &format!("{:.2}", score.positive),
            &format!("{:.2}", score.negative),
        ])?;
    }
    writer.flush()?;
    tracing::info!("Frequency sheet saved to {}", path.display());
    Ok(())
}

/// Number of reviews per distinct star rating, keyed by the rating as written
pub fn score_distribution(reviews: &[Review]) -> BTreeMap<String, usize> {
    let mut dist = BTreeMap::new();
    for review in reviews {
        *dist.entry(format!("{:.1}", review.score)).or_insert(0) += 1;
    }
    dist
}

/// Number of labeled reviews per polarity
pub fn label_distribution(samples: &[LabeledReview]) -> BTreeMap<String, usize> {
    let mut dist = BTreeMap::new();
    for sample in samples {
        *dist.entry(format!("{:?}", sample.label)).or_insert(0) += 1;
    }
    dist
}

/// Adjectives the synthetic corpus draws from, as `(form, lemma)` pairs
pub const SYNTHETIC_POSITIVE: &[(&str, &str)] = &[
    ("bon", "bon"),
    ("bonne", "bon"),
    ("beau", "beau"),
    ("belle", "beau"),
    ("parfait", "parfait"),
    ("magnifique", "magnifique"),
];

pub const SYNTHETIC_NEGATIVE: &[(&str, &str)] = &[
    ("mauvais", "mauvais"),
    ("mauvaise", "mauvais"),
    ("terrible", "terrible"),
    ("ennuyeux", "ennuyeux"),
    ("ennuyeuse", "ennuyeux"),
    ("nul", "nul"),
];

/// Lexique rows covering the synthetic adjectives, plus a few non-adjectives
pub fn synthetic_lexique() -> Vec<LexiqueRow> {
    let mut rows = Vec::new();
    for (i, (form, lemma)) in SYNTHETIC_POSITIVE.iter().chain(SYNTHETIC_NEGATIVE).enumerate() {
        rows.push(LexiqueRow {
            form: form.to_string(),
            lemma: lemma.to_string(),
            tag: "ADJ".to_string(),
            weight: format!("{:.2}", 100.0 - i as f64),
        });
    }
    for word in ["livre", "histoire", "auteur"] {
        rows.push(LexiqueRow {
            form: word.to_string(),
            lemma: word.to_string(),
            tag: "NOM".to_string(),
            weight: "50.00".to_string(),
        });
    }
    rows
}

/// Generate a seeded review corpus for development and testing.
///
/// Reviews rated 4-5 use positive adjectives, 1-2 negative ones and 3 a mix,
/// so a bag-of-words classifier has something to learn.
pub fn synthetic_reviews(size: usize, seed: u64) -> Vec<Review> {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let openings = [
        "Ce livre est",
        "J'ai trouvé l'histoire",
        "Un roman vraiment",
        "L'auteur signe un texte",
    ];

    (0..size)
        .map(|i| {
            let score = rng.gen_range(1..=5) as f64;
            let first = if score > 3.0 {
                SYNTHETIC_POSITIVE
            } else if score < 3.0 {
                SYNTHETIC_NEGATIVE
            } else if rng.gen_bool(0.5) {
                SYNTHETIC_POSITIVE
            } else {
                SYNTHETIC_NEGATIVE
            };
            let second = if score == 3.0 && first == SYNTHETIC_POSITIVE {
                SYNTHETIC_NEGATIVE
            } else if score == 3.0 {
                SYNTHETIC_POSITIVE
            } else {
                first
            };
            let opening = openings[rng.gen_range(0..openings.len())];
            let a = first[rng.gen_range(0..first.len())].0;
            let b = second[rng.gen_range(0..second.len())].0;
            Review {
                text: format!("{} {} et {}! Avis numéro {}.", opening, a, b, i),
                score,
            }
        })
        .collect()
}
