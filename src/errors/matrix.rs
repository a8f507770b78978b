//! Error types for CSC container construction and rearrangement.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Violations of the CSC structural invariants, detected when a matrix is
/// assembled from raw arrays.
pub enum MalformedMatrixError {
    /// The offsets array does not have one entry more than the number of
    /// columns.
    #[error("The offsets array has length {found}, which does not cover {columns} columns.")]
    OffsetsLength {
        /// Number of columns of the matrix.
        columns: usize,
        /// Length of the provided offsets array.
        found: usize,
    },
    /// The first offset is not zero.
    #[error("The first offset must be zero.")]
    LeadingOffsetNotZero,
    /// The offsets array decreases between two adjacent columns.
    #[error("The offsets array decreases at column {column}.")]
    DecreasingOffsets {
        /// First column whose offset exceeds its successor's.
        column: usize,
    },
    /// The final offset does not match the number of stored values.
    #[error("The final offset {found} does not match the number of stored values {values}.")]
    TrailingOffsetMismatch {
        /// Number of stored values.
        values: usize,
        /// The final offset.
        found: usize,
    },
    /// The row-index array and the value array differ in length.
    #[error("The row-index array has length {rows}, the value array has length {values}.")]
    RowValueLengthMismatch {
        /// Length of the row-index array.
        rows: usize,
        /// Length of the value array.
        values: usize,
    },
    /// Row indices within a column are not strictly ascending.
    #[error("Row indices in column {column} are not strictly ascending.")]
    UnsortedRowIndices {
        /// The offending column.
        column: usize,
    },
    /// A row index is out of bounds for the declared number of rows.
    #[error("Row index {row} in column {column} is out of bounds for {rows} rows.")]
    RowIndexOutOfBounds {
        /// The offending column.
        column: usize,
        /// The out-of-bounds row index.
        row: usize,
        /// Declared number of rows.
        rows: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Errors of matrix construction, concatenation and conversion.
pub enum MatrixError {
    /// The matrix violates a CSC structural invariant.
    #[error(transparent)]
    Malformed(#[from] MalformedMatrixError),
    /// Two axes that must agree have different lengths.
    #[error("Expected {expected} {axis}, found {found}.")]
    DimensionMismatch {
        /// Name of the mismatching axis.
        axis: &'static str,
        /// Expected length.
        expected: usize,
        /// Observed length.
        found: usize,
    },
    /// The number of stored entries exceeds the capacity of the selected
    /// pointer width.
    #[error("{required} stored entries exceed the capacity {capacity} of the selected pointer width.")]
    Overflow {
        /// Number of entries that must be addressable.
        required: u64,
        /// Capacity of the selected pointer type.
        capacity: u64,
    },
    /// A concatenation was requested over an empty list of matrices.
    #[error("Cannot concatenate an empty list of matrices.")]
    EmptyConcatenation,
}
