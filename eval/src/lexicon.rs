// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Adjective lexicon built from the Lexique word-frequency table
//!
//! Reduces the full table to one entry per adjective lemma, ranked by how
//! often the lemma occurs in books, with its inflected forms attached.

use crate::error::{parse_decimal, ParseError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Part-of-speech tag kept by the builder
pub const ADJECTIVE_TAG: &str = "ADJ";

/// One row of the Lexique table, fields still as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiqueRow {
    pub form: String,
    pub lemma: String,
    pub tag: String,
    pub weight: String,
}

impl LexiqueRow {
    pub fn new(form: &str, lemma: &str, tag: &str, weight: &str) -> Self {
        Self {
            form: form.to_string(),
            lemma: lemma.to_string(),
            tag: tag.to_string(),
            weight: weight.to_string(),
        }
    }
}

/// A ranked lemma with its surface forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub lemma: String,
    /// Lemma frequency (last value seen for the lemma)
    pub weight: f64,
    /// Surface forms in encounter order, duplicates kept
    pub forms: Vec<String>,
}

impl LexiconEntry {
    /// Ranking order: weight descending, then lemma descending
    fn rank(a: &Self, b: &Self) -> Ordering {
        b.weight.total_cmp(&a.weight).then_with(|| b.lemma.cmp(&a.lemma))
    }
}

/// Build the ranked adjective lexicon.
///
/// For every `ADJ` row the lemma's weight is overwritten with the row's
/// weight and the row's form is appended to the lemma's forms. A weight that
/// is not a finite, non-negative decimal fails the whole build.
pub fn build(rows: &[LexiqueRow]) -> Result<Vec<LexiconEntry>, ParseError> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<LexiconEntry> = Vec::new();

    for (row_idx, row) in rows.iter().enumerate() {
        if row.tag != ADJECTIVE_TAG {
            continue;
        }
        let weight = parse_decimal("weight", row_idx, &row.weight)?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(ParseError::new("weight", row_idx, &row.weight));
        }

        let slot = *index.entry(row.lemma.as_str()).or_insert_with(|| {
            entries.push(LexiconEntry {
                lemma: row.lemma.clone(),
                weight: 0.0,
                forms: Vec::new(),
            });
            entries.len() - 1
        });
        let entry = &mut entries[slot];
        entry.weight = weight;
        entry.forms.push(row.form.clone());
    }

    entries.sort_by(LexiconEntry::rank);

    tracing::debug!("Built lexicon with {} adjective lemmas from {} rows", entries.len(), rows.len());
    Ok(entries)
}

/// Set of surface forms recognised as adjectives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    forms: HashSet<String>,
}

impl Vocabulary {
    pub fn from_forms<I, S>(forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            forms: forms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_entries(entries: &[LexiconEntry]) -> Self {
        Self::from_forms(entries.iter().flat_map(|e| e.forms.iter().cloned()))
    }

    /// Vocabulary from `(lemma, forms)` pairs as loaded from the lexicon file
    pub fn from_forms_map(map: &FormsMap) -> Self {
        Self::from_forms(map.iter().flat_map(|(_, forms)| forms.iter().cloned()))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.forms.contains(word)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

/// Lemma to forms mapping, in lexicon order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormsMap {
    entries: Vec<(String, Vec<String>)>,
}

impl FormsMap {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    pub fn from_entries(entries: &[LexiconEntry]) -> Self {
        Self::new(entries.iter().map(|e| (e.lemma.clone(), e.forms.clone())).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Vec<String>)> {
        self.entries.iter()
    }

    /// The first `n` lemmas, i.e. the most frequent ones
    pub fn head(&self, n: usize) -> &[(String, Vec<String>)] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
