//! End-to-end integration tests: dump + CSV -> classify -> JSON -> deserialize.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use arbor_io::{FeatureReader, IoError, Prediction, ResultWriter, RunName, TreeReader};
use arbor_tree::{ClassifyError, DecisionTree, ExecutionMode, Forest};
use tempfile::{NamedTempFile, TempDir};

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_tree(name: &str) -> DecisionTree {
    TreeReader::new(&fixture_path(name))
        .read()
        .expect("fixture should parse")
}

#[test]
fn single_tree_round_trip() {
    // 1. Read tree and features
    let tree = load_tree("energy_shallow.txt");
    let dataset = FeatureReader::new(&fixture_path("features.csv"))
        .read()
        .expect("fixture should parse");
    assert_eq!(dataset.n_samples(), 4);
    assert_eq!(dataset.n_features(), 2);

    // 2. Classify every row
    let labels = tree.classify_batch(dataset.samples()).unwrap();
    assert_eq!(labels, vec!["train", "bus", "train", "train"]);

    let predictions: Vec<Prediction> = dataset
        .iter()
        .zip(labels)
        .map(|((id, features), label)| Prediction {
            sample_id: id.clone(),
            label,
            votes: tree
                .votes(features)
                .unwrap()
                .iter()
                .map(|(class, weight)| (class.to_string(), weight))
                .collect(),
        })
        .collect();

    // 3. Write JSON artifact
    let dir = TempDir::new().unwrap();
    let run: RunName = "single_rt".parse().unwrap();
    let writer = ResultWriter::new(dir.path(), run).unwrap();
    let path = writer.write_predictions(1, &predictions).unwrap();

    // 4. Deserialize back and verify
    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(content["run"], "single_rt");
    assert_eq!(content["n_samples"], 4);

    let entries = content["predictions"].as_array().unwrap();
    let ids: Vec<&str> = entries
        .iter()
        .map(|e| e["sample_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["t1", "t2", "t3", "t4"]);

    // All-missing row: every leaf votes, train outweighs bus.
    let t4_votes = entries[3]["votes"].as_array().unwrap();
    assert_eq!(t4_votes.len(), 2);
    assert_eq!(t4_votes[0]["label"], "train");
    let train_weight = t4_votes[0]["weight"].as_f64().unwrap();
    assert!((train_weight - 72.76).abs() < 1e-9);
}

#[test]
fn ensemble_round_trip() {
    let trees = vec![
        load_tree("energy_shallow.txt"),
        load_tree("constant_bus.txt"),
        load_tree("energy_8_10.txt"),
    ];
    let dataset = FeatureReader::new(&fixture_path("features.csv"))
        .read()
        .unwrap();

    let forest = Forest::new(trees)
        .unwrap()
        .with_execution(ExecutionMode::Parallel);
    let labels = forest.classify_batch(dataset.samples()).unwrap();
    assert_eq!(labels, vec!["train", "bus", "train", "train"]);

    let votes = forest.votes(&dataset.samples()[1]).unwrap();
    assert_eq!(votes.weight("bus"), Some(3.0));
    assert_eq!(votes.weight("train"), None);
}

#[test]
fn crlf_dump_loads() {
    let tree = load_tree("energy_8_10.txt");
    assert_eq!(tree.n_leaves(), 2);
    assert_eq!(tree.attributes(), vec!["accelerationFrequencyBandEnergy8To10Hz"]);
}

#[test]
fn unknown_category_surfaces_from_csv() {
    let tree = load_tree("short_mode.txt");

    let mut f = NamedTempFile::new().unwrap();
    f.write_all(b"sample_id,predictionShort\na,walk\nb,ferry\n")
        .unwrap();
    f.flush().unwrap();
    let dataset = FeatureReader::new(f.path()).read().unwrap();

    assert_eq!(tree.classify(&dataset.samples()[0]).unwrap(), "walk");
    assert_eq!(
        tree.classify(&dataset.samples()[1]).unwrap_err(),
        ClassifyError::UnknownCategory {
            attribute: "predictionShort".into(),
            value: "ferry".into(),
        }
    );
}

#[test]
fn invalid_dump_reports_path() {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(b"speed >= 3 : car (1/0)\nspeed < 3 : walk (1/0)\n")
        .unwrap();
    f.flush().unwrap();

    let err = TreeReader::new(f.path()).read().unwrap_err();
    match err {
        IoError::Parse { path, .. } => assert_eq!(path, f.path()),
        other => panic!("expected a parse error, got {other:?}"),
    }
}
