//! A fixed collection of independently parsed trees.

use tracing::debug;

use crate::config::ExecutionMode;
use crate::error::ClassifyError;
use crate::tree::DecisionTree;

/// An ensemble of decision trees combined by unweighted majority vote.
///
/// Construct via [`Forest::new`], then optionally chain
/// [`Forest::with_execution`].
#[derive(Debug, Clone)]
pub struct Forest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) execution: ExecutionMode,
}

impl Forest {
    /// Create a forest from trees in evaluation order.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::EmptyEnsemble`] if `trees` is empty.
    pub fn new(trees: Vec<DecisionTree>) -> Result<Self, ClassifyError> {
        if trees.is_empty() {
            return Err(ClassifyError::EmptyEnsemble);
        }
        debug!(n_trees = trees.len(), "forest assembled");
        Ok(Self {
            trees,
            execution: ExecutionMode::default(),
        })
    }

    /// Set how member trees are evaluated.
    #[must_use]
    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    /// Return the execution mode.
    #[must_use]
    pub fn execution(&self) -> ExecutionMode {
        self.execution
    }

    /// Return the member trees in evaluation order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_tree;

    #[test]
    fn empty_forest_error() {
        assert_eq!(Forest::new(Vec::new()).unwrap_err(), ClassifyError::EmptyEnsemble);
    }

    #[test]
    fn builder_sets_execution() {
        let tree = parse_tree("car (1/0)").unwrap();
        let forest = Forest::new(vec![tree.clone(), tree])
            .unwrap()
            .with_execution(ExecutionMode::Parallel);
        assert_eq!(forest.n_trees(), 2);
        assert_eq!(forest.execution(), ExecutionMode::Parallel);
        assert_eq!(forest.trees().len(), 2);
    }
}
