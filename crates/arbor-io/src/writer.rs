//! JSON result writer for classification outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{RunName, SampleId};

/// One classified sample ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Sample the label belongs to.
    pub sample_id: SampleId,
    /// Predicted class label.
    pub label: String,
    /// Tally behind the label: leaf coverage for one tree, vote counts for
    /// an ensemble. Insertion ordered.
    pub votes: Vec<(String, f64)>,
}

/// Writes classification results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{run}_predictions.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    run: RunName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::CreateDir`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), run = %run))]
    pub fn new(output_dir: &Path, run: RunName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::CreateDir {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            run,
        })
    }

    /// Return the path [`ResultWriter::write_predictions`] writes to.
    #[must_use]
    pub fn predictions_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_predictions.json", self.run.as_str()))
    }

    /// Write predictions to `{run}_predictions.json` and return its path.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`IoError::Serialize`] | JSON rendering fails |
    /// | [`IoError::Write`] | the file cannot be written |
    #[instrument(skip_all, fields(n_samples = predictions.len(), n_trees = n_trees))]
    pub fn write_predictions(
        &self,
        n_trees: usize,
        predictions: &[Prediction],
    ) -> Result<PathBuf, IoError> {
        let path = self.predictions_path();

        let entries: Vec<PredictionEntry> = predictions
            .iter()
            .map(|p| PredictionEntry {
                sample_id: p.sample_id.as_str(),
                label: p.label.as_str(),
                votes: p
                    .votes
                    .iter()
                    .map(|(label, weight)| VoteEntry {
                        label: label.as_str(),
                        weight: *weight,
                    })
                    .collect(),
            })
            .collect();

        let artifact = PredictionsArtifact {
            run: self.run.as_str(),
            n_trees,
            n_samples: predictions.len(),
            predictions: entries,
        };

        let json =
            serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
                path: path.clone(),
                source: e,
            })?;
        fs::write(&path, &json).map_err(|e| IoError::Write {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "predictions written");
        Ok(path)
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct PredictionsArtifact<'a> {
    run: &'a str,
    n_trees: usize,
    n_samples: usize,
    predictions: Vec<PredictionEntry<'a>>,
}

#[derive(Serialize)]
struct PredictionEntry<'a> {
    sample_id: &'a str,
    label: &'a str,
    votes: Vec<VoteEntry<'a>>,
}

#[derive(Serialize)]
struct VoteEntry<'a> {
    label: &'a str,
    weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample(id: &str, label: &str, votes: &[(&str, f64)]) -> Prediction {
        Prediction {
            sample_id: SampleId::new(id.to_string()),
            label: label.to_string(),
            votes: votes.iter().map(|&(l, w)| (l.to_string(), w)).collect(),
        }
    }

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn write_predictions_json_structure() {
        let dir = TempDir::new().unwrap();
        let run = RunName::new("test_run".into()).unwrap();
        let writer = ResultWriter::new(dir.path(), run).unwrap();

        let predictions = vec![
            sample("s1", "walk", &[("walk", 12.0), ("bike", 3.5)]),
            sample("s2", "car", &[("car", 40.0)]),
        ];
        let path = writer.write_predictions(1, &predictions).unwrap();
        assert_eq!(path, dir.path().join("test_run_predictions.json"));

        let content = read_json(&path);
        assert_eq!(content["run"], "test_run");
        assert_eq!(content["n_trees"], 1);
        assert_eq!(content["n_samples"], 2);
        let entries = content["predictions"].as_array().unwrap();
        assert_eq!(entries[0]["sample_id"], "s1");
        assert_eq!(entries[0]["label"], "walk");
        assert_eq!(entries[0]["votes"][1]["label"], "bike");
        assert_eq!(entries[0]["votes"][1]["weight"], 3.5);
        assert_eq!(entries[1]["label"], "car");
    }

    #[test]
    fn vote_order_preserved() {
        let dir = TempDir::new().unwrap();
        let run = RunName::new("order".into()).unwrap();
        let writer = ResultWriter::new(dir.path(), run).unwrap();

        let predictions = vec![sample("s", "tram", &[("tram", 2.0), ("bus", 2.0), ("car", 1.0)])];
        let path = writer.write_predictions(5, &predictions).unwrap();

        let content = read_json(&path);
        let labels: Vec<&str> = content["predictions"][0]["votes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["label"].as_str().unwrap())
            .collect();
        assert_eq!(labels, vec!["tram", "bus", "car"]);
    }

    #[test]
    fn creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("deep");
        let run = RunName::new("nested_test".into()).unwrap();
        let writer = ResultWriter::new(&nested, run).unwrap();
        writer.write_predictions(1, &[]).unwrap();
        assert!(nested.join("nested_test_predictions.json").exists());
    }

    #[test]
    fn predictions_path_uses_run_name() {
        let dir = TempDir::new().unwrap();
        let run = RunName::new("abc".into()).unwrap();
        let writer = ResultWriter::new(dir.path(), run).unwrap();
        assert_eq!(writer.predictions_path(), dir.path().join("abc_predictions.json"));
    }
}
