//! Prediction methods for the tree ensemble.

use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, instrument, trace};

use crate::config::ExecutionMode;
use crate::error::ClassifyError;
use crate::feature::FeatureVector;
use crate::forest::Forest;
use crate::tree::DecisionTree;
use crate::vote::VoteTally;

/// Classify `features` with every tree and return the majority label.
///
/// One tree delegates directly to [`DecisionTree::classify`]. Otherwise each
/// tree casts one vote and the label with the most votes wins; ties go to
/// the label first produced in tree order.
///
/// # Errors
///
/// | Variant | When |
/// |---|---|
/// | [`ClassifyError::EmptyEnsemble`] | `trees` is empty |
/// | any [`DecisionTree::classify`] error | a member tree fails |
pub fn classify_multiple(
    features: &FeatureVector,
    trees: &[DecisionTree],
) -> Result<String, ClassifyError> {
    majority(features, trees, ExecutionMode::Sequential)
}

fn majority(
    features: &FeatureVector,
    trees: &[DecisionTree],
    execution: ExecutionMode,
) -> Result<String, ClassifyError> {
    match trees {
        [] => Err(ClassifyError::EmptyEnsemble),
        [only] => only.classify(features),
        _ => {
            let tally = tally(features, trees, execution)?;
            trace!(n_classes = tally.len(), "ensemble votes tallied");
            match tally.winner() {
                Some(label) => Ok(label.to_string()),
                None => unreachable!("a non-empty ensemble casts at least one vote"),
            }
        }
    }
}

/// One unit vote per tree, tallied in tree order regardless of execution mode.
fn tally(
    features: &FeatureVector,
    trees: &[DecisionTree],
    execution: ExecutionMode,
) -> Result<VoteTally, ClassifyError> {
    let labels: Vec<String> = match execution {
        ExecutionMode::Sequential => trees
            .iter()
            .map(|tree| tree.classify(features))
            .collect::<Result<_, _>>()?,
        ExecutionMode::Parallel => trees
            .par_iter()
            .map(|tree| tree.classify(features))
            .collect::<Result<_, _>>()?,
    };
    Ok(VoteTally::from_labels(&labels))
}

impl Forest {
    /// Predict the class label for one feature vector.
    ///
    /// # Errors
    ///
    /// Returns the first error any member tree produces.
    pub fn classify(&self, features: &FeatureVector) -> Result<String, ClassifyError> {
        majority(features, &self.trees, self.execution)
    }

    /// Return the per-label vote counts behind a prediction.
    ///
    /// # Errors
    ///
    /// Returns the first error any member tree produces.
    pub fn votes(&self, features: &FeatureVector) -> Result<VoteTally, ClassifyError> {
        tally(features, &self.trees, self.execution)
    }

    /// Predict class labels for a batch of feature vectors in parallel.
    ///
    /// Output order matches input order.
    ///
    /// # Errors
    ///
    /// Returns the first error any feature vector produces.
    #[instrument(skip_all, fields(n_samples = samples.len(), n_trees = self.trees.len()))]
    pub fn classify_batch(&self, samples: &[FeatureVector]) -> Result<Vec<String>, ClassifyError> {
        let labels = samples
            .into_par_iter()
            .map(|features| self.classify(features))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(n_labels = labels.len(), "batch classified");
        Ok(labels)
    }
}
