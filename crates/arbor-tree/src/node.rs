use std::fmt;

/// A terminal node holding a predicted class and its training statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    predicted_class: String,
    total_weight_covered: f64,
    total_weight_misclassified: f64,
}

impl Leaf {
    /// Create a new leaf.
    pub(crate) fn new(
        predicted_class: impl Into<String>,
        total_weight_covered: f64,
        total_weight_misclassified: f64,
    ) -> Self {
        Self {
            predicted_class: predicted_class.into(),
            total_weight_covered,
            total_weight_misclassified,
        }
    }

    /// Return the class label predicted by this leaf.
    #[must_use]
    pub fn predicted_class(&self) -> &str {
        &self.predicted_class
    }

    /// Return the total weight of training instances that reached this leaf.
    ///
    /// This is the voting weight used when several leaves are collected.
    #[must_use]
    pub fn total_weight_covered(&self) -> f64 {
        self.total_weight_covered
    }

    /// Return the weight of training instances this leaf misclassified.
    #[must_use]
    pub fn total_weight_misclassified(&self) -> f64 {
        self.total_weight_misclassified
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{})",
            self.predicted_class, self.total_weight_covered, self.total_weight_misclassified
        )
    }
}

/// How an interior node routes a present feature value to a child.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitKind {
    /// Binary split: child 0 takes `value < threshold`, child 1 the rest.
    Numeric {
        /// Split point.
        threshold: f64,
    },
    /// N-ary split: child `i` takes values equal to `labels[i]`.
    Categorical {
        /// Category labels in the order they first appeared in the dump.
        labels: Vec<String>,
    },
}

impl SplitKind {
    /// Return the number of children a split of this kind owns.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            SplitKind::Numeric { .. } => 2,
            SplitKind::Categorical { labels } => labels.len(),
        }
    }

    /// Return the kind of feature value this split compares against.
    #[must_use]
    pub fn value_kind(&self) -> &'static str {
        match self {
            SplitKind::Numeric { .. } => "numeric",
            SplitKind::Categorical { .. } => "categorical",
        }
    }
}

/// An interior node: an attribute test plus one child per outcome.
///
/// The constructors guarantee `children.len() == kind.arity()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    attribute: String,
    kind: SplitKind,
    children: Vec<Node>,
}

impl Split {
    /// Create a numeric split on `attribute` at `threshold`.
    pub(crate) fn numeric(
        attribute: impl Into<String>,
        threshold: f64,
        below: Node,
        at_or_above: Node,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            kind: SplitKind::Numeric { threshold },
            children: vec![below, at_or_above],
        }
    }

    /// Create a categorical split from `(label, child)` branches in order.
    pub(crate) fn categorical(attribute: impl Into<String>, branches: Vec<(String, Node)>) -> Self {
        debug_assert!(!branches.is_empty(), "categorical split needs a branch");
        let (labels, children) = branches.into_iter().unzip();
        Self {
            attribute: attribute.into(),
            kind: SplitKind::Categorical { labels },
            children,
        }
    }

    /// Return the attribute this node tests.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Return the split kind.
    #[must_use]
    pub fn kind(&self) -> &SplitKind {
        &self.kind
    }

    /// Return the children, positionally matching the split kind.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }
}

/// A node of a parsed decision tree.
///
/// Each node owns its children outright; a tree is built once by the
/// parser and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A terminal leaf.
    Leaf(Leaf),
    /// An interior split.
    Split(Split),
}

impl Node {
    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Return the leaf, if this node is one.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Split(_) => None,
        }
    }

    /// Return the split, if this node is one.
    #[must_use]
    pub fn as_split(&self) -> Option<&Split> {
        match self {
            Node::Split(split) => Some(split),
            Node::Leaf(_) => None,
        }
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<Split> for Node {
    fn from(split: Split) -> Self {
        Node::Split(split)
    }
}
