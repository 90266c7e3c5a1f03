use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, instrument};

use crate::classify::{classify, collect_leaves};
use crate::error::ClassifyError;
use crate::feature::FeatureVector;
use crate::node::{Leaf, Node};
use crate::vote::VoteTally;

/// A parsed decision tree.
///
/// Built once by [`ParserConfig::parse`](crate::ParserConfig::parse) and
/// read-only afterwards; safe to share across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    root: Node,
}

impl DecisionTree {
    pub(crate) fn new(root: Node) -> Self {
        Self { root }
    }

    /// Return the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Consume the tree and return its root node.
    #[must_use]
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Predict the class label for one feature vector.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`ClassifyError::UnknownCategory`] | categorical value not among a split's labels |
    /// | [`ClassifyError::TypeMismatch`] | value kind does not match the split kind |
    pub fn classify(&self, features: &FeatureVector) -> Result<String, ClassifyError> {
        classify(features, &self.root)
    }

    /// Return every leaf `features` reaches, in traversal order.
    ///
    /// # Errors
    ///
    /// Same as [`DecisionTree::classify`].
    pub fn collect_leaves(&self, features: &FeatureVector) -> Result<Vec<&Leaf>, ClassifyError> {
        collect_leaves(features, &self.root)
    }

    /// Return the per-class coverage weight behind a prediction.
    ///
    /// The tally's winner is the label [`DecisionTree::classify`] returns.
    ///
    /// # Errors
    ///
    /// Same as [`DecisionTree::classify`].
    pub fn votes(&self, features: &FeatureVector) -> Result<VoteTally, ClassifyError> {
        let leaves = collect_leaves(features, &self.root)?;
        Ok(VoteTally::from_leaves(&leaves))
    }

    /// Predict class labels for a batch of feature vectors in parallel.
    ///
    /// Output order matches input order.
    ///
    /// # Errors
    ///
    /// Returns the first error any feature vector produces.
    #[instrument(skip_all, fields(n_samples = samples.len()))]
    pub fn classify_batch(&self, samples: &[FeatureVector]) -> Result<Vec<String>, ClassifyError> {
        let labels = samples
            .into_par_iter()
            .map(|features| self.classify(features))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(n_labels = labels.len(), "batch classified");
        Ok(labels)
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes().count()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, d)) = stack.pop() {
            match node {
                Node::Leaf(_) => max_depth = max_depth.max(d),
                Node::Split(split) => {
                    stack.extend(split.children().iter().map(|child| (child, d + 1)));
                }
            }
        }
        max_depth
    }

    /// Return the distinct split attributes in pre-order of first use.
    #[must_use]
    pub fn attributes(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for node in self.nodes() {
            if let Node::Split(split) = node
                && !seen.contains(&split.attribute())
            {
                seen.push(split.attribute());
            }
        }
        seen
    }

    /// Pre-order iterator over all nodes.
    fn nodes(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![&self.root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            if let Node::Split(split) = node {
                stack.extend(split.children().iter().rev());
            }
            Some(node)
        })
    }
}
