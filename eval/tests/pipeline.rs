// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

use sentiment_eval::classifiers::ClassifierKind;
use sentiment_eval::datasets::{self, Polarity};
use sentiment_eval::lexicon;
use sentiment_eval::pipeline::{EvaluationPipeline, FeatureSet, PipelineConfig};
use std::path::Path;

const LEXIQUE_HEADER: &str = "ortho\tphon\tlemme\tcgram\tgenre\tnombre\tfreqlemfilms2\tfreqlemlivres";

fn lexique_line(form: &str, lemma: &str, tag: &str, weight: &str) -> String {
    format!("{}\tx\t{}\t{}\tm\ts\t1.00\t{}", form, lemma, tag, weight)
}

fn write_lexique(path: &Path) {
    let mut lines = vec![LEXIQUE_HEADER.to_string()];
    for (i, (form, lemma)) in datasets::SYNTHETIC_POSITIVE
        .iter()
        .chain(datasets::SYNTHETIC_NEGATIVE)
        .enumerate()
    {
        lines.push(lexique_line(form, lemma, "ADJ", &format!("{}.5", 90 - i)));
    }
    lines.push(lexique_line("livre", "livre", "NOM", "300.1"));
    lines.push("ligne\tcourte".to_string());
    std::fs::write(path, lines.join("\n") + "\n").unwrap();
}

fn write_annotations(path: &Path) {
    let sheet = "\
adjectif,note,commentaire,a1,a2,a3
bon,,,0.6,0.4,0.6
beau,,,0.8,0.6,
parfait,,,1.0,1.0,1.0
magnifique,,,1.0,0.8,1.0
mauvais,,,-0.6,-0.8,-0.6
terrible,,,-1.0,-0.8,-1.0
ennuyeux,,,-0.6,-0.4,0.0
nul,,,-1.0,-1.0,-1.0
";
    std::fs::write(path, sheet).unwrap();
}

#[test]
fn test_pipeline_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let lexique = dir.path().join("lexique.tsv");
    let corpus = dir.path().join("books-fr.csv");
    let annotations = dir.path().join("annotations.csv");
    write_lexique(&lexique);
    write_annotations(&annotations);
    datasets::save_reviews(&datasets::synthetic_reviews(400, 11), &corpus).unwrap();

    let config = PipelineConfig {
        lexique_path: Some(lexique.to_string_lossy().to_string()),
        corpus_path: Some(corpus.to_string_lossy().to_string()),
        annotations_path: Some(annotations.to_string_lossy().to_string()),
        classifiers: vec![ClassifierKind::Svm, ClassifierKind::NaiveBayes],
        output_dir: dir.path().to_string_lossy().to_string(),
        ..PipelineConfig::default()
    };
    let results = EvaluationPipeline::new(config).run().unwrap();

    assert_eq!(results.corpus_info.reviews, 400);
    assert_eq!(results.corpus_info.lexicon_lemmas, 8);
    assert_eq!(results.corpus_info.vocabulary_size, 12);
    assert_eq!(results.model_results.len(), 4);

    // adjectives carry all the signal in the synthetic corpus
    for result in &results.model_results {
        if result.features == FeatureSet::Adjectives {
            assert!(
                result.cross_validation.mean.accuracy > 0.9,
                "{} accuracy {}",
                result.model_name,
                result.cross_validation.mean.accuracy
            );
        }
    }

    let lexicon_result = results.lexicon_result.as_ref().unwrap();
    assert_eq!(lexicon_result.scored_forms, 12);
    assert!(lexicon_result.report.scores.accuracy > 0.9);
    assert!(lexicon_result.agreement.is_some());

    let json_path = dir.path().join("results.json");
    EvaluationPipeline::save_results(&results, &json_path).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(saved["corpus_info"]["reviews"], 400);

    let report = EvaluationPipeline::generate_report(&results);
    assert!(report.contains("Annotated Lexicon"));
    assert!(report.contains("Fleiss' kappa"));
}

#[test]
fn test_prepared_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let lexique = dir.path().join("lexique.tsv");
    write_lexique(&lexique);

    let rows = datasets::load_lexique(&lexique).unwrap();
    assert_eq!(rows.len(), 13);
    let entries = lexicon::build(&rows).unwrap();
    assert_eq!(entries[0].lemma, "bon");
    assert_eq!(entries[0].forms, vec!["bon", "bonne"]);

    let adj = dir.path().join("adj-fr.csv");
    datasets::save_lexicon(&entries, &adj).unwrap();
    let loaded = datasets::load_lexicon(&adj).unwrap();
    assert_eq!(loaded.len(), entries.len());
    assert_eq!(loaded[0], ("bon".to_string(), vec!["bon".to_string(), "bonne".to_string()]));

    let reviews = datasets::synthetic_reviews(100, 5);
    let aligned = sentiment_eval::align(&reviews, &Default::default());
    let test_file = dir.path().join("books-fr-test.csv");
    datasets::save_labeled(&aligned, &test_file).unwrap();
    let reloaded = datasets::load_labeled(&test_file).unwrap();
    assert_eq!(reloaded, aligned);
    assert_eq!(
        reloaded.iter().filter(|s| s.label == Polarity::Positive).count(),
        reloaded.len() / 2
    );
}
