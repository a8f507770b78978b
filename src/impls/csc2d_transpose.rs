//! Submodule providing the transpose of the CSC matrix.
use crate::impls::CSC2D;
use crate::traits::{Number, PositiveInteger, TransposableMatrix2D};

impl<
    SparseIndex: PositiveInteger,
    RowIndex: PositiveInteger,
    ColumnIndex: PositiveInteger,
    Value: Number,
> TransposableMatrix2D<CSC2D<SparseIndex, ColumnIndex, RowIndex, Value>>
    for CSC2D<SparseIndex, RowIndex, ColumnIndex, Value>
{
    /// Transposes the matrix in `O(nnz + nrows)`.
    ///
    /// Stored entries are bucket-counted by source row, a prefix sum turns
    /// the counts into per-row write cursors, one streaming pass scatters
    /// each `(column, value)` pair into its row's slot, and a final shift of
    /// the cursor array restores offset semantics. Because source columns
    /// are visited in ascending order, each destination column's row indices
    /// come out strictly ascending.
    fn transpose(&self) -> CSC2D<SparseIndex, ColumnIndex, RowIndex, Value> {
        let rows = self.number_of_rows.into_usize();
        let columns = self.number_of_columns.into_usize();
        let stored = self.values.len();

        let mut offsets = vec![SparseIndex::zero(); rows + 1];
        for &row in &self.row_indices {
            offsets[row.into_usize() + 1] += SparseIndex::one();
        }
        // After this prefix sum, offsets[r] is the write cursor of row r.
        for index in 1..=rows {
            let previous = offsets[index - 1];
            offsets[index] += previous;
        }

        let mut row_indices = vec![ColumnIndex::zero(); stored];
        let mut values = vec![Value::zero(); stored];
        for column in 0..columns {
            let transposed_row = ColumnIndex::try_from_usize(column).unwrap_or_else(|| {
                unreachable!("Column positions are bounded by the column index type.")
            });
            for position in self.column_range(column) {
                let row = self.row_indices[position].into_usize();
                let slot = offsets[row].into_usize();
                row_indices[slot] = transposed_row;
                values[slot] = self.values[position];
                offsets[row] += SparseIndex::one();
            }
        }

        // Every cursor now points at the end of its row's run; shift right
        // by one to recover the leading zero and the offset semantics.
        for index in (1..=rows).rev() {
            offsets[index] = offsets[index - 1];
        }
        offsets[0] = SparseIndex::zero();

        CSC2D {
            offsets,
            row_indices,
            values,
            number_of_rows: self.number_of_columns,
            number_of_columns: self.number_of_rows,
            row_names: self.column_names.clone(),
            column_names: self.row_names.clone(),
        }
    }
}
