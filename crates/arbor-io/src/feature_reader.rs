//! CSV feature reader with input validation.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use arbor_tree::{FeatureValue, FeatureVector};
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{FeatureDataset, SampleId};

/// Cell text that marks a value as unknown, alongside the empty cell.
pub const MISSING_MARKER: &str = "?";

/// Reads feature vectors from a CSV file.
///
/// Expected CSV format:
/// - Header row required: `sample_id,<feature>,<feature>,...`
/// - One row per sample, all rows with the same number of columns
/// - An empty cell or `?` is a missing value
/// - Columns named via [`FeatureReader::with_categorical_columns`] are read
///   verbatim as categories; other cells are parsed as numbers and fall back
///   to a category when the text is not numeric
///
/// # Errors
///
/// | Variant | When |
/// |---|---|
/// | [`IoError::Read`] | the file cannot be opened |
/// | [`IoError::Csv`] | a record is not valid CSV |
/// | [`IoError::NoFeatures`] | the header is only the sample id column |
/// | [`IoError::NoSamples`] | no rows below the header |
/// | [`IoError::RowLength`] | a row has more or fewer cells than the header |
/// | [`IoError::DuplicateSample`] | a sample id repeats |
pub struct FeatureReader {
    path: PathBuf,
    categorical: HashSet<String>,
}

impl FeatureReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            categorical: HashSet::new(),
        }
    }

    /// Read the named columns as category labels even when they look numeric.
    #[must_use]
    pub fn with_categorical_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Read and validate the CSV file, returning a [`FeatureDataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<FeatureDataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::Read {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so short or long rows surface as RowLength.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?;
        let expected_cols = header.len();
        if expected_cols < 2 {
            return Err(IoError::NoFeatures {
                path: self.path.clone(),
            });
        }
        let feature_names: Vec<String> = header.iter().skip(1).map(str::to_string).collect();
        let forced: Vec<bool> = feature_names
            .iter()
            .map(|name| self.categorical.contains(name))
            .collect();
        debug!(
            n_features = feature_names.len(),
            n_categorical = forced.iter().filter(|&&c| c).count(),
            "read CSV header"
        );

        let mut sample_ids = Vec::new();
        let mut samples = Vec::new();
        let mut first_seen: HashMap<String, u64> = HashMap::new();

        for result in rdr.records() {
            let record = result.map_err(|e| self.csv_error(e))?;
            let line = record.position().map_or(0, csv::Position::line);
            let sample_id = record.get(0).unwrap_or("").to_string();

            if record.len() != expected_cols {
                return Err(IoError::RowLength {
                    path: self.path.clone(),
                    line,
                    sample_id,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            if let Some(&first_line) = first_seen.get(&sample_id) {
                return Err(IoError::DuplicateSample {
                    path: self.path.clone(),
                    sample_id,
                    first_line,
                    line,
                });
            }
            first_seen.insert(sample_id.clone(), line);

            let features: FeatureVector = feature_names
                .iter()
                .zip(&forced)
                .zip(record.iter().skip(1))
                .map(|((name, &categorical), raw)| (name.as_str(), cell_value(raw, categorical)))
                .collect();

            sample_ids.push(SampleId::new(sample_id));
            samples.push(features);
        }

        if samples.is_empty() {
            return Err(IoError::NoSamples {
                path: self.path.clone(),
            });
        }

        info!(
            n_samples = samples.len(),
            n_features = feature_names.len(),
            "features loaded"
        );
        Ok(FeatureDataset::new(sample_ids, feature_names, samples))
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::Csv {
            path: self.path.clone(),
            line: e.position().map_or(0, csv::Position::line),
            source: e,
        }
    }
}

/// Interpret one cell; `None` marks a missing value.
fn cell_value(raw: &str, categorical: bool) -> Option<FeatureValue> {
    let text = raw.trim();
    if text.is_empty() || text == MISSING_MARKER {
        return None;
    }
    if !categorical && let Ok(value) = text.parse::<f64>() {
        return Some(FeatureValue::Numeric(value));
    }
    Some(FeatureValue::Category(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    // --- Cell interpretation ---

    #[test]
    fn cell_numeric() {
        assert_eq!(cell_value("0.86", false), Some(FeatureValue::Numeric(0.86)));
        assert_eq!(cell_value(" -3 ", false), Some(FeatureValue::Numeric(-3.0)));
    }

    #[test]
    fn cell_missing_markers() {
        assert_eq!(cell_value("", false), None);
        assert_eq!(cell_value("  ", true), None);
        assert_eq!(cell_value("?", false), None);
        assert_eq!(cell_value("?", true), None);
    }

    #[test]
    fn cell_text_falls_back_to_category() {
        assert_eq!(
            cell_value("tram", false),
            Some(FeatureValue::Category("tram".into()))
        );
    }

    #[test]
    fn cell_forced_category_keeps_digits() {
        assert_eq!(
            cell_value("42", true),
            Some(FeatureValue::Category("42".into()))
        );
    }

    // --- Whole files ---

    #[test]
    fn read_mixed_columns() {
        let csv = "sample_id,speed,predictionShort\ns1,4.5,walk\ns2,,car\ns3,12.0,?\n";
        let f = write_csv(csv);
        let ds = FeatureReader::new(f.path()).read().unwrap();
        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.feature_names(), &["speed", "predictionShort"]);
        assert_eq!(ds.sample_ids()[1].as_str(), "s2");

        let s1 = &ds.samples()[0];
        assert_eq!(s1.get("speed"), Some(&FeatureValue::Numeric(4.5)));
        assert_eq!(
            s1.get("predictionShort"),
            Some(&FeatureValue::Category("walk".into()))
        );
        assert_eq!(ds.samples()[1].get("speed"), None);
        assert_eq!(ds.samples()[2].get("predictionShort"), None);
        assert_eq!(ds.samples()[2].n_present(), 1);
    }

    #[test]
    fn categorical_columns_override_parsing() {
        let csv = "sample_id,zone\na,7\n";
        let f = write_csv(csv);
        let ds = FeatureReader::new(f.path())
            .with_categorical_columns(["zone"])
            .read()
            .unwrap();
        assert_eq!(
            ds.samples()[0].get("zone"),
            Some(&FeatureValue::Category("7".into()))
        );
    }

    #[test]
    fn insertion_order_preserved() {
        let csv = "sample_id,x\nZZZ,1.0\nAAA,2.0\nMMM,3.0\n";
        let f = write_csv(csv);
        let ds = FeatureReader::new(f.path()).read().unwrap();
        let ids: Vec<&str> = ds.sample_ids().iter().map(SampleId::as_str).collect();
        assert_eq!(ids, vec!["ZZZ", "AAA", "MMM"]);
    }

    #[test]
    fn error_file_not_found() {
        let result = FeatureReader::new(Path::new("/nonexistent/file.csv")).read();
        assert!(matches!(result, Err(IoError::Read { .. })));
    }

    #[test]
    fn error_no_feature_columns() {
        let f = write_csv("sample_id\na\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NoFeatures { .. })));
    }

    #[test]
    fn error_empty_dataset() {
        let f = write_csv("sample_id,x,y\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NoSamples { .. })));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let f = write_csv("sample_id,x,y\na,1.0,2.0\nb,1.0\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::RowLength { line: 3, expected: 3, got: 2, .. })
        ));
    }

    #[test]
    fn error_duplicate_sample_id() {
        let f = write_csv("sample_id,x\na,1\nb,2\na,3\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::DuplicateSample {
                first_line: 2,
                line: 4,
                ..
            })
        ));
    }

    #[test]
    fn error_message_names_file_line() {
        let f = write_csv("sample_id,x\nt1,1\nt2,2\nt1,3\n");
        let err = FeatureReader::new(f.path()).read().unwrap_err();
        let message = err.to_string();
        assert!(message.ends_with(":4: sample t1 already defined on line 2"), "{message}");
    }
}
