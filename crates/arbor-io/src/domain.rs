//! Sample identifiers, run names and the loaded feature table.

use std::fmt;
use std::str::FromStr;

use arbor_tree::FeatureVector;

use crate::IoError;

/// Identifier taken from the first column of a feature CSV.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleId(String);

impl SampleId {
    pub(crate) fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stem of the files a run writes, e.g. `{run}_predictions.json`.
///
/// Limited to ASCII letters, digits, `_` and `-`, so it can never name a
/// path outside the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunName(String);

impl RunName {
    /// # Errors
    ///
    /// [`IoError::RunName`] when `name` is empty or has any other character.
    pub fn new(name: String) -> Result<Self, IoError> {
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-');
        if name.is_empty() || !name.chars().all(allowed) {
            return Err(IoError::RunName { name });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RunName {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl fmt::Display for RunName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rows of a feature CSV in file order.
///
/// `sample_ids()[i]` labels `samples()[i]`; the two are kept as separate
/// slices so batch classifiers can take `samples()` directly.
#[derive(Debug)]
pub struct FeatureDataset {
    sample_ids: Vec<SampleId>,
    feature_names: Vec<String>,
    samples: Vec<FeatureVector>,
}

impl FeatureDataset {
    pub(crate) fn new(
        sample_ids: Vec<SampleId>,
        feature_names: Vec<String>,
        samples: Vec<FeatureVector>,
    ) -> Self {
        debug_assert_eq!(sample_ids.len(), samples.len());
        Self {
            sample_ids,
            feature_names,
            samples,
        }
    }

    #[must_use]
    pub fn sample_ids(&self) -> &[SampleId] {
        &self.sample_ids
    }

    /// Header names after the sample id column.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    #[must_use]
    pub fn samples(&self) -> &[FeatureVector] {
        &self.samples
    }

    /// Pair every sample with its id, in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&SampleId, &FeatureVector)> {
        self.sample_ids.iter().zip(&self.samples)
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}
