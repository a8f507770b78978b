//! Submodule providing the column-oriented matrix trait vocabulary shared
//! by the CSC containers and the statistical kernels.

use core::iter::{Copied, Zip};
use core::slice::Iter;

use num_traits::Zero;

use crate::traits::numeric::{Number, PositiveInteger};

/// A two-dimensional matrix with typed axis indices.
pub trait Matrix2D {
    /// The type of the row indices.
    type RowIndex: PositiveInteger;
    /// The type of the column indices.
    type ColumnIndex: PositiveInteger;

    /// Returns the number of rows.
    fn number_of_rows(&self) -> Self::RowIndex;

    /// Returns the number of columns.
    fn number_of_columns(&self) -> Self::ColumnIndex;
}

/// A two-dimensional matrix whose entries carry values.
pub trait ValuedMatrix2D: Matrix2D {
    /// The type of the stored values.
    type Value: Number;
}

/// A sparse matrix laid out column-by-column, exposing each column's stored
/// entries as parallel slices of row indices and values.
///
/// Row indices within a column are strictly ascending; values equal to zero
/// may appear and consumers must treat them as if absent.
pub trait SparseColumnMatrix: ValuedMatrix2D {
    /// The type of the column pointers, which bounds the number of stored
    /// entries the matrix can hold.
    type SparseIndex: PositiveInteger;

    /// Returns the number of stored entries.
    fn number_of_defined_values(&self) -> Self::SparseIndex;

    /// Returns the row indices of the stored entries of `column`, strictly
    /// ascending. The argument is a 0-based column position.
    fn column_rows(&self, column: usize) -> &[Self::RowIndex];

    /// Returns the values of the stored entries of `column`, parallel to
    /// [`column_rows`](SparseColumnMatrix::column_rows).
    fn column_values(&self, column: usize) -> &[Self::Value];

    /// Returns an iterator over the `(row, value)` pairs of `column`, in
    /// ascending row order.
    fn column_entries(
        &self,
        column: usize,
    ) -> Zip<Copied<Iter<'_, Self::RowIndex>>, Copied<Iter<'_, Self::Value>>> {
        self.column_rows(column)
            .iter()
            .copied()
            .zip(self.column_values(column).iter().copied())
    }

    /// Returns `true` if the matrix stores no entries.
    fn is_empty(&self) -> bool {
        self.number_of_defined_values() == Self::SparseIndex::zero()
    }
}

/// A matrix that can produce its transpose.
pub trait TransposableMatrix2D<Transposed = Self>: Matrix2D {
    /// Returns the transposed matrix, with row and column names swapped.
    fn transpose(&self) -> Transposed;
}
