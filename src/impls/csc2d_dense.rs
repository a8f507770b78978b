//! Submodule providing densification of the CSC matrix.

use crate::impls::{CSC2D, DenseMatrix};
use crate::traits::{Number, PositiveInteger};

impl<
    SparseIndex: PositiveInteger,
    RowIndex: PositiveInteger,
    ColumnIndex: PositiveInteger,
    Value: Number,
> CSC2D<SparseIndex, RowIndex, ColumnIndex, Value>
{
    /// Scatters the stored entries into a zero-filled column-major dense
    /// matrix of the same shape, in `O(nrows * ncols + nnz)`.
    pub fn to_dense(&self) -> DenseMatrix<Value> {
        let mut dense =
            DenseMatrix::zeros(self.number_of_rows.into_usize(), self.number_of_columns.into_usize());
        for column in 0..self.number_of_columns.into_usize() {
            for position in self.column_range(column) {
                dense.set(self.row_indices[position].into_usize(), column, self.values[position]);
            }
        }
        dense
    }

    /// Scatters the stored entries into a dense matrix of the transposed
    /// shape, without materializing a transposed CSC first.
    pub fn to_dense_transposed(&self) -> DenseMatrix<Value> {
        let mut dense =
            DenseMatrix::zeros(self.number_of_columns.into_usize(), self.number_of_rows.into_usize());
        for column in 0..self.number_of_columns.into_usize() {
            for position in self.column_range(column) {
                dense.set(column, self.row_indices[position].into_usize(), self.values[position]);
            }
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_to_dense_matches_entries() {
        let matrix: CSC2D32<f64> = CSC2D::from_parts(
            vec![1.0, 2.0, 3.0, 4.0],
            vec![0, 2, 1, 0],
            vec![0, 1, 2, 3, 4],
            3u32,
            4u32,
        )
        .unwrap();
        let dense = matrix.to_dense();
        assert_eq!(dense.get(0, 0), 1.0);
        assert_eq!(dense.get(2, 1), 2.0);
        assert_eq!(dense.get(1, 2), 3.0);
        assert_eq!(dense.get(0, 3), 4.0);
        assert_eq!(dense.get(1, 0), 0.0);
    }

    #[test]
    fn test_to_dense_transposed_matches_transpose() {
        let matrix: CSC2D32<f64> = CSC2D::from_parts(
            vec![1.0, 2.0, 3.0],
            vec![0, 1, 2],
            vec![0, 1, 2, 3],
            3u32,
            3u32,
        )
        .unwrap();
        assert_eq!(matrix.to_dense_transposed(), matrix.transpose().to_dense());
    }
}
