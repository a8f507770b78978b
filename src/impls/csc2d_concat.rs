//! Submodule providing row-wise and column-wise concatenation of CSC
//! matrices.

use crate::errors::MatrixError;
use crate::impls::CSC2D;
use crate::traits::{Number, PositiveInteger, numeric::index_capacity};

impl<
    SparseIndex: PositiveInteger,
    RowIndex: PositiveInteger,
    ColumnIndex: PositiveInteger,
    Value: Number,
> CSC2D<SparseIndex, RowIndex, ColumnIndex, Value>
{
    /// Stacks matrices on top of each other (row-wise concatenation).
    ///
    /// Every input must have the same number of columns. Within each output
    /// column the inputs' runs are appended in order with their row indices
    /// shifted, so the strict row ordering is preserved. Row names are
    /// concatenated when every input carries them; column names are taken
    /// from the first input.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::EmptyConcatenation`] for an empty input list,
    /// [`MatrixError::DimensionMismatch`] when the column counts disagree,
    /// and [`MatrixError::Overflow`] when the combined rows or stored
    /// entries exceed the respective index types.
    pub fn concat_rows(parts: &[Self]) -> Result<Self, MatrixError> {
        let Some(first) = parts.first() else {
            return Err(MatrixError::EmptyConcatenation);
        };
        let columns = first.number_of_columns;
        for part in parts {
            if part.number_of_columns != columns {
                return Err(MatrixError::DimensionMismatch {
                    axis: "columns",
                    expected: columns.into_usize(),
                    found: part.number_of_columns.into_usize(),
                });
            }
        }
        let total_rows: usize = parts.iter().map(|part| part.number_of_rows.into_usize()).sum();
        let Some(number_of_rows) = RowIndex::try_from_usize(total_rows) else {
            return Err(MatrixError::Overflow {
                required: total_rows as u64,
                capacity: index_capacity::<RowIndex>(),
            });
        };
        let total_stored: usize = parts.iter().map(|part| part.values.len()).sum();
        if SparseIndex::try_from_usize(total_stored).is_none() {
            return Err(MatrixError::Overflow {
                required: total_stored as u64,
                capacity: index_capacity::<SparseIndex>(),
            });
        }

        let mut row_offsets = Vec::with_capacity(parts.len());
        let mut running = 0usize;
        for part in parts {
            row_offsets.push(RowIndex::try_from_usize(running).unwrap_or_else(|| {
                unreachable!("Row offsets are bounded by the total row count.")
            }));
            running += part.number_of_rows.into_usize();
        }

        let mut offsets = Vec::with_capacity(columns.into_usize() + 1);
        offsets.push(SparseIndex::zero());
        let mut row_indices = Vec::with_capacity(total_stored);
        let mut values = Vec::with_capacity(total_stored);
        for column in 0..columns.into_usize() {
            for (part, &row_offset) in parts.iter().zip(&row_offsets) {
                for position in part.column_range(column) {
                    row_indices.push(part.row_indices[position] + row_offset);
                    values.push(part.values[position]);
                }
            }
            offsets.push(SparseIndex::try_from_usize(row_indices.len()).unwrap_or_else(|| {
                unreachable!("Stored entry counts were checked against the pointer width.")
            }));
        }

        let row_names = parts
            .iter()
            .map(|part| part.row_names.clone())
            .collect::<Option<Vec<_>>>()
            .map(|names| names.concat());
        Ok(Self {
            offsets,
            row_indices,
            values,
            number_of_rows,
            number_of_columns: columns,
            row_names,
            column_names: first.column_names.clone(),
        })
    }

    /// Places matrices side by side (column-wise concatenation).
    ///
    /// Every input must have the same number of rows. The value and
    /// row-index arrays are copied in order and each input's offsets are
    /// shifted by the running entry count. Column names are concatenated
    /// when every input carries them; row names are taken from the first
    /// input.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::EmptyConcatenation`] for an empty input list,
    /// [`MatrixError::DimensionMismatch`] when the row counts disagree, and
    /// [`MatrixError::Overflow`] when the combined columns or stored entries
    /// exceed the respective index types.
    pub fn concat_columns(parts: &[Self]) -> Result<Self, MatrixError> {
        let Some(first) = parts.first() else {
            return Err(MatrixError::EmptyConcatenation);
        };
        let rows = first.number_of_rows;
        for part in parts {
            if part.number_of_rows != rows {
                return Err(MatrixError::DimensionMismatch {
                    axis: "rows",
                    expected: rows.into_usize(),
                    found: part.number_of_rows.into_usize(),
                });
            }
        }
        let total_columns: usize =
            parts.iter().map(|part| part.number_of_columns.into_usize()).sum();
        let Some(number_of_columns) = ColumnIndex::try_from_usize(total_columns) else {
            return Err(MatrixError::Overflow {
                required: total_columns as u64,
                capacity: index_capacity::<ColumnIndex>(),
            });
        };
        let total_stored: usize = parts.iter().map(|part| part.values.len()).sum();
        if SparseIndex::try_from_usize(total_stored).is_none() {
            return Err(MatrixError::Overflow {
                required: total_stored as u64,
                capacity: index_capacity::<SparseIndex>(),
            });
        }

        let mut offsets = Vec::with_capacity(total_columns + 1);
        offsets.push(SparseIndex::zero());
        let mut row_indices = Vec::with_capacity(total_stored);
        let mut values = Vec::with_capacity(total_stored);
        for part in parts {
            let shift = row_indices.len();
            row_indices.extend_from_slice(&part.row_indices);
            values.extend_from_slice(&part.values);
            for column in 0..part.number_of_columns.into_usize() {
                let end = part.offsets[column + 1].into_usize() + shift;
                offsets.push(SparseIndex::try_from_usize(end).unwrap_or_else(|| {
                    unreachable!("Stored entry counts were checked against the pointer width.")
                }));
            }
        }

        let column_names = parts
            .iter()
            .map(|part| part.column_names.clone())
            .collect::<Option<Vec<_>>>()
            .map(|names| names.concat());
        Ok(Self {
            offsets,
            row_indices,
            values,
            number_of_rows: rows,
            number_of_columns,
            row_names: first.row_names.clone(),
            column_names,
        })
    }
}
