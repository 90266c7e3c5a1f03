//! Decision-tree dump parsing and classification.
//!
//! Parses the indented text dump written by tree-induction tools
//! (`attr < 0.5`, `attr = value`, `|   ` nesting, `label (covered/misclassified)`
//! leaves) into an owned tree, and classifies feature vectors against one
//! tree or a majority-vote ensemble. Missing feature values explore every
//! branch and the reached leaves vote by training coverage.

mod classify;
mod config;
mod error;
mod feature;
mod forest;
mod node;
mod parse;
mod predict;
mod tree;
mod vote;

pub use classify::{classify, collect_leaves, vote};
pub use config::{DEFAULT_MAX_DEPTH, ExecutionMode, ParserConfig};
pub use error::{ClassifyError, ParseError};
pub use feature::{FeatureValue, FeatureVector};
pub use forest::Forest;
pub use node::{Leaf, Node, Split, SplitKind};
pub use parse::{INDENT, LEAF_SEPARATOR, parse_leaf, parse_tree};
pub use predict::classify_multiple;
pub use tree::DecisionTree;
pub use vote::VoteTally;
