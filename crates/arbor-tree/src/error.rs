/// Errors raised while parsing a tree dump.
///
/// Parsing is all-or-nothing: any of these aborts the whole parse and no
/// partial tree is returned. Line numbers are 1-based and refer to the
/// original input text, blank lines included.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// Returned when the input contains no non-blank lines.
    #[error("tree dump is empty")]
    EmptyInput,

    /// Returned when a leaf is not of the form `label (covered/misclassified)`.
    #[error("line {line}: malformed leaf \"{text}\": {reason}")]
    MalformedLeaf {
        /// Line the leaf was read from.
        line: usize,
        /// The leaf text as it appeared in the dump.
        text: String,
        /// What part of the leaf trailer was missing.
        reason: &'static str,
    },

    /// Returned when one of the two leaf weights is not a float.
    #[error("line {line}: invalid leaf weight \"{raw}\"")]
    InvalidWeight {
        /// Line the leaf was read from.
        line: usize,
        /// The raw weight text.
        raw: String,
    },

    /// Returned when a line is neither a split header nor a leaf.
    #[error("line {line}: malformed split header \"{text}\"")]
    MalformedSplit {
        /// Offending line.
        line: usize,
        /// The line content with indentation removed.
        text: String,
    },

    /// Returned when a numeric split threshold is not a float.
    #[error("line {line}: invalid split threshold \"{raw}\"")]
    InvalidThreshold {
        /// Offending line.
        line: usize,
        /// The raw threshold text.
        raw: String,
    },

    /// Returned when a sibling clause splits on a different attribute.
    #[error("line {line}: expected a clause on \"{expected}\", found \"{found}\"")]
    AttributeMismatch {
        /// Offending line.
        line: usize,
        /// Attribute named by the first clause of the split.
        expected: String,
        /// Attribute named by this clause.
        found: String,
    },

    /// Returned when a clause appears where the split grammar does not allow it,
    /// e.g. a `>=` clause with no preceding `<` clause.
    #[error("line {line}: unexpected clause \"{text}\"")]
    UnexpectedClause {
        /// Offending line.
        line: usize,
        /// The line content with indentation removed.
        text: String,
    },

    /// Returned when a clause has neither an inline leaf nor a nested block.
    #[error("line {line}: clause \"{text}\" has no leaf and no nested block")]
    MissingBody {
        /// Line of the clause.
        line: usize,
        /// The clause text with indentation removed.
        text: String,
    },

    /// Returned when a `<` clause is not followed by its `>=` sibling.
    #[error("line {line}: numeric split on \"{attribute}\" has no \">=\" branch")]
    MissingBranch {
        /// Line of the `<` clause.
        line: usize,
        /// Attribute of the incomplete split.
        attribute: String,
    },

    /// Returned when the `<` and `>=` clauses of one split use different thresholds.
    #[error("line {line}: \">=\" threshold {right} does not match \"<\" threshold {left}")]
    ThresholdMismatch {
        /// Line of the `>=` clause.
        line: usize,
        /// Threshold of the `<` clause.
        left: f64,
        /// Threshold of the `>=` clause.
        right: f64,
    },

    /// Returned when a categorical split lists the same value twice.
    #[error("line {line}: category \"{value}\" of \"{attribute}\" appears twice")]
    DuplicateCategory {
        /// Line of the repeated clause.
        line: usize,
        /// Attribute of the split.
        attribute: String,
        /// The repeated category value.
        value: String,
    },

    /// Returned when a line does not carry the indentation its position requires.
    #[error("line {line}: expected indentation depth {expected}, found {found}")]
    Indentation {
        /// Offending line.
        line: usize,
        /// Depth required at this position.
        expected: usize,
        /// Depth the line actually carries.
        found: usize,
    },

    /// Returned when the tree nests deeper than the configured limit.
    #[error("line {line}: tree nesting exceeds the depth limit of {limit}")]
    DepthLimitExceeded {
        /// First line past the limit.
        line: usize,
        /// The configured maximum depth.
        limit: usize,
    },
}

/// Errors raised while classifying a feature vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifyError {
    /// Returned when a categorical feature value is not one of the split's labels.
    #[error("unknown category \"{value}\" for attribute \"{attribute}\"")]
    UnknownCategory {
        /// Attribute of the categorical split.
        attribute: String,
        /// The value supplied by the feature vector.
        value: String,
    },

    /// Returned when a numeric split receives a category or vice versa.
    #[error("attribute \"{attribute}\" expects a {expected} value")]
    TypeMismatch {
        /// Attribute of the split.
        attribute: String,
        /// Kind of value the split compares against.
        expected: &'static str,
    },

    /// Returned when an ensemble is built from zero trees.
    #[error("ensemble must contain at least one tree")]
    EmptyEnsemble,
}
