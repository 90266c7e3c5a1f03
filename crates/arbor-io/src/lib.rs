//! File I/O, validation, and serialization for the arbor classifier.

mod domain;
mod error;
mod feature_reader;
mod tree_reader;
mod writer;

pub use domain::{FeatureDataset, RunName, SampleId};
pub use error::IoError;
pub use feature_reader::{FeatureReader, MISSING_MARKER};
pub use tree_reader::TreeReader;
pub use writer::{Prediction, ResultWriter};
