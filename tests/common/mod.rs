//! Shared helpers for the integration tests: building small CSC matrices
//! from dense column descriptions.
#![allow(dead_code)]

use sparse_markers::prelude::*;

/// Builds a narrow CSC matrix from dense columns (each inner slice is one
/// column, sample-major), dropping zeros on the way in.
pub fn csc_from_columns(columns: &[Vec<f64>]) -> CSC2D32<f64> {
    let rows = columns.first().map_or(0, Vec::len);
    let mut flat = Vec::with_capacity(rows * columns.len());
    for column in columns {
        assert_eq!(column.len(), rows, "all columns must have the same length");
        flat.extend_from_slice(column);
    }
    DenseMatrix::from_column_major(flat, rows, columns.len())
        .unwrap()
        .to_sparse()
        .unwrap()
}

/// Builds a wide (64-bit pointer) copy of a narrow matrix.
pub fn widened(matrix: &CSC2D32<f64>) -> CSC2D64<f64> {
    matrix.try_cast_pointers().unwrap()
}
