//! Error types for the cluster partition and the marker engine.

use crate::errors::matrix::MatrixError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Errors of cluster-partition construction.
pub enum PartitionError {
    /// The label vector is empty.
    #[error("The label vector is empty.")]
    EmptyLabels,
    /// A label is out of range for the declared number of clusters.
    #[error("Label {label} at position {position} is out of range for {clusters} clusters.")]
    LabelOutOfRange {
        /// Position of the offending label.
        position: usize,
        /// The offending label.
        label: u32,
        /// Declared number of clusters.
        clusters: u32,
    },
    /// The number of cluster names does not match the number of clusters.
    #[error("Expected {expected} cluster names, found {found}.")]
    NameCountMismatch {
        /// Number of clusters.
        expected: usize,
        /// Number of provided names.
        found: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Errors surfaced by the statistical kernels and the marker driver.
pub enum MarkerError {
    /// The underlying matrix is malformed, mismatched or too large for its
    /// pointer width.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    /// The cluster partition is invalid.
    #[error(transparent)]
    Partition(#[from] PartitionError),
    /// The requested test name is not recognized.
    #[error("Unknown test {0:?}; expected \"rank_sum\" or \"t\".")]
    UnknownTest(String),
    /// An option value is outside its admissible range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}
