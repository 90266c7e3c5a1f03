//! Single-tree traversal and leaf-weighted voting.

use tracing::trace;

use crate::error::ClassifyError;
use crate::feature::{FeatureValue, FeatureVector};
use crate::node::{Leaf, Node, Split, SplitKind};
use crate::vote::VoteTally;

/// Collect every leaf reachable from `root` under `features`.
///
/// A present value follows exactly one branch. An absent value (or a NaN
/// numeric value) follows every branch, and the leaves of all children are
/// concatenated in child order. Uses an explicit worklist, so tree depth is
/// not limited by the call stack.
///
/// # Errors
///
/// | Variant | When |
/// |---|---|
/// | [`ClassifyError::UnknownCategory`] | categorical value not among the split's labels |
/// | [`ClassifyError::TypeMismatch`] | numeric value at a categorical split or vice versa |
pub fn collect_leaves<'t>(
    features: &FeatureVector,
    root: &'t Node,
) -> Result<Vec<&'t Leaf>, ClassifyError> {
    let mut leaves = Vec::new();
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        match node {
            Node::Leaf(leaf) => leaves.push(leaf),
            Node::Split(split) => match route(features, split)? {
                Some(child) => pending.push(child),
                // Reversed so children pop off in dump order.
                None => pending.extend(split.children().iter().rev()),
            },
        }
    }
    Ok(leaves)
}

/// Pick the class of a set of collected leaves.
///
/// A single leaf wins outright. Otherwise coverage weight is summed per
/// class and the heaviest class wins, ties going to the class whose first
/// leaf came earliest. Returns `None` for an empty slice.
#[must_use]
pub fn vote(leaves: &[&Leaf]) -> Option<String> {
    match leaves {
        [] => None,
        [only] => Some(only.predicted_class().to_string()),
        _ => VoteTally::from_leaves(leaves).winner().map(str::to_string),
    }
}

/// Classify `features` against the tree rooted at `root`.
///
/// # Errors
///
/// Propagates the errors of [`collect_leaves`].
pub fn classify(features: &FeatureVector, root: &Node) -> Result<String, ClassifyError> {
    let leaves = collect_leaves(features, root)?;
    trace!(n_leaves = leaves.len(), "collected leaves");
    match vote(&leaves) {
        Some(class) => Ok(class),
        None => unreachable!("every subtree holds at least one leaf"),
    }
}

/// Return the child a present value selects, or `None` when every child applies.
fn route<'t>(features: &FeatureVector, split: &'t Split) -> Result<Option<&'t Node>, ClassifyError> {
    let Some(value) = features.get(split.attribute()) else {
        return Ok(None);
    };
    let index = match (split.kind(), value) {
        (SplitKind::Numeric { threshold }, FeatureValue::Numeric(v)) => {
            if v.is_nan() {
                return Ok(None);
            }
            usize::from(*v >= *threshold)
        }
        (SplitKind::Categorical { labels }, FeatureValue::Category(c)) => labels
            .iter()
            .position(|label| label == c)
            .ok_or_else(|| ClassifyError::UnknownCategory {
                attribute: split.attribute().to_string(),
                value: c.clone(),
            })?,
        (kind, _) => {
            return Err(ClassifyError::TypeMismatch {
                attribute: split.attribute().to_string(),
                expected: kind.value_kind(),
            });
        }
    };
    Ok(Some(&split.children()[index]))
}
