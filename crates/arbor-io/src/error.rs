//! Errors raised while loading dumps and feature tables or writing results.
//!
//! CSV locations are 1-based file lines, header included, so they can be
//! pasted straight into an editor.

use std::io;
use std::path::PathBuf;

use arbor_tree::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// A tree dump or feature table could not be opened or read.
    #[error("cannot read {path}")]
    Read { path: PathBuf, source: io::Error },

    /// The CSV layer rejected a record.
    #[error("{path}:{line}: unreadable CSV record")]
    Csv {
        path: PathBuf,
        line: u64,
        source: csv::Error,
    },

    /// The header names a sample column and nothing to classify on.
    #[error("{path}: header has no feature columns after the sample id")]
    NoFeatures { path: PathBuf },

    /// The table has a header and no samples.
    #[error("{path}: no samples below the header")]
    NoSamples { path: PathBuf },

    /// A row does not have one cell per header column.
    #[error("{path}:{line}: sample {sample_id} has {got} cells, header has {expected}")]
    RowLength {
        path: PathBuf,
        line: u64,
        sample_id: String,
        expected: usize,
        got: usize,
    },

    /// Two rows share a sample id.
    #[error("{path}:{line}: sample {sample_id} already defined on line {first_line}")]
    DuplicateSample {
        path: PathBuf,
        sample_id: String,
        first_line: u64,
        line: u64,
    },

    /// A run name would not make a safe file name stem.
    #[error("run name {name:?} may only use ASCII letters, digits, '_' and '-'")]
    RunName { name: String },

    /// A tree dump was read but does not parse.
    #[error("{path}: not a valid tree dump")]
    Parse { path: PathBuf, source: ParseError },

    /// The output directory could not be created.
    #[error("cannot create {path}")]
    CreateDir { path: PathBuf, source: io::Error },

    /// The predictions could not be rendered as JSON.
    #[error("cannot render predictions for {path}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The predictions file could not be written.
    #[error("cannot write {path}")]
    Write { path: PathBuf, source: io::Error },
}
