//! Tree dump loader.

use std::path::{Path, PathBuf};

use arbor_tree::{DecisionTree, ParserConfig};
use tracing::{info, instrument};

use crate::IoError;

/// Reads a decision tree from a text dump on disk.
///
/// # Errors
///
/// | Variant | When |
/// |---|---|
/// | [`IoError::Read`] | the file cannot be read |
/// | [`IoError::Parse`] | the parser rejects the dump |
pub struct TreeReader {
    path: PathBuf,
    config: ParserConfig,
}

impl TreeReader {
    /// Create a new reader for the given dump path with default parser settings.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            config: ParserConfig::default(),
        }
    }

    /// Set the parser configuration.
    #[must_use]
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Read and parse the dump.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<DecisionTree, IoError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| IoError::Read {
            path: self.path.clone(),
            source: e,
        })?;

        let tree = self.config.parse(&text).map_err(|e| IoError::Parse {
            path: self.path.clone(),
            source: e,
        })?;

        info!(
            n_nodes = tree.n_nodes(),
            n_leaves = tree.n_leaves(),
            depth = tree.depth(),
            "tree loaded"
        );
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_tree::ParseError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dump(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_dump() {
        let f = write_dump("speed < 4.99 : walk (10/1)\nspeed >= 4.99 : car (20/2)\n");
        let tree = TreeReader::new(f.path()).read().unwrap();
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.attributes(), vec!["speed"]);
    }

    #[test]
    fn config_is_applied() {
        let f = write_dump("a < 1\n|   b < 1 : x (1/0)\n|   b >= 1 : y (1/0)\na >= 1 : z (1/0)\n");
        let result = TreeReader::new(f.path())
            .with_config(ParserConfig::new().with_max_depth(0))
            .read();
        assert!(matches!(
            result,
            Err(IoError::Parse {
                source: ParseError::DepthLimitExceeded { limit: 0, .. },
                ..
            })
        ));
    }

    #[test]
    fn error_file_not_found() {
        let result = TreeReader::new(Path::new("/nonexistent/tree.txt")).read();
        assert!(matches!(result, Err(IoError::Read { .. })));
    }

    #[test]
    fn error_empty_dump() {
        let f = write_dump("\n\n");
        let result = TreeReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::Parse {
                source: ParseError::EmptyInput,
                ..
            })
        ));
    }
}
