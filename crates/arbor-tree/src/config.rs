//! Configuration builders for parsing and ensemble evaluation.

/// Default maximum indentation depth accepted by the parser.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How an ensemble evaluates its member trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Evaluate trees one after another on the calling thread.
    #[default]
    Sequential,
    /// Evaluate trees concurrently on the rayon pool.
    ///
    /// Votes are still tallied in tree order, so the result is identical
    /// to [`ExecutionMode::Sequential`].
    Parallel,
}

/// Configuration for the tree-dump parser.
///
/// Construct via [`ParserConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter   | Default |
/// |-------------|---------|
/// | `max_depth` | 256     |
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub(crate) max_depth: usize,
}

impl ParserConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the deepest indentation level a dump may use.
    ///
    /// Depth 0 is the root clause level; every `|   ` marker adds one.
    /// Dumps nesting deeper than this are rejected instead of recursing.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Return the maximum accepted indentation depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_defaults() {
        let cfg = ParserConfig::new();
        assert_eq!(cfg.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn parser_builder_chain() {
        let cfg = ParserConfig::default().with_max_depth(3);
        assert_eq!(cfg.max_depth(), 3);
    }

    #[test]
    fn execution_defaults_to_sequential() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::Sequential);
    }
}
