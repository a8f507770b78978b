//! Submodule providing a column-major dense matrix, used as the
//! densification target of the CSC container and as a re-sparsification
//! source.
use core::fmt::Debug;

use crate::errors::MatrixError;
use crate::impls::CSC2D;
use crate::traits::{Number, PositiveInteger, numeric::index_capacity};

#[derive(Clone, PartialEq)]
/// A dense matrix stored in column-major order.
pub struct DenseMatrix<Value> {
    /// The values, column by column.
    values: Vec<Value>,
    /// The number of rows.
    number_of_rows: usize,
    /// The number of columns.
    number_of_columns: usize,
}

impl<Value: Debug> Debug for DenseMatrix<Value> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DenseMatrix")
            .field("values", &self.values)
            .field("number_of_rows", &self.number_of_rows)
            .field("number_of_columns", &self.number_of_columns)
            .finish()
    }
}

impl<Value: Number> DenseMatrix<Value> {
    /// Builds a zero-filled matrix of the given shape.
    pub fn zeros(number_of_rows: usize, number_of_columns: usize) -> Self {
        Self {
            values: vec![Value::zero(); number_of_rows * number_of_columns],
            number_of_rows,
            number_of_columns,
        }
    }

    /// Builds a matrix from a column-major value array.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] when the array length does
    /// not equal `number_of_rows * number_of_columns`.
    pub fn from_column_major(
        values: Vec<Value>,
        number_of_rows: usize,
        number_of_columns: usize,
    ) -> Result<Self, MatrixError> {
        if values.len() != number_of_rows * number_of_columns {
            return Err(MatrixError::DimensionMismatch {
                axis: "stored values",
                expected: number_of_rows * number_of_columns,
                found: values.len(),
            });
        }
        Ok(Self { values, number_of_rows, number_of_columns })
    }

    /// Returns the number of rows.
    pub fn number_of_rows(&self) -> usize {
        self.number_of_rows
    }

    /// Returns the number of columns.
    pub fn number_of_columns(&self) -> usize {
        self.number_of_columns
    }

    /// Returns the value at the given coordinates.
    pub fn get(&self, row: usize, column: usize) -> Value {
        self.values[row + column * self.number_of_rows]
    }

    /// Sets the value at the given coordinates.
    pub fn set(&mut self, row: usize, column: usize, value: Value) {
        self.values[row + column * self.number_of_rows] = value;
    }

    /// Returns one column as a contiguous slice.
    pub fn column(&self, column: usize) -> &[Value] {
        let start = column * self.number_of_rows;
        &self.values[start..start + self.number_of_rows]
    }

    /// Returns the backing column-major array.
    pub fn as_column_major(&self) -> &[Value] {
        &self.values
    }

    /// Returns the transposed matrix.
    pub fn transposed(&self) -> Self {
        let mut transposed = Self::zeros(self.number_of_columns, self.number_of_rows);
        for column in 0..self.number_of_columns {
            for row in 0..self.number_of_rows {
                transposed.set(column, row, self.get(row, column));
            }
        }
        transposed
    }

    /// Re-sparsifies the matrix, dropping every zero entry.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Overflow`] when the shape or the number of
    /// non-zero entries does not fit the requested index types.
    pub fn to_sparse<
        SparseIndex: PositiveInteger,
        RowIndex: PositiveInteger,
        ColumnIndex: PositiveInteger,
    >(
        &self,
    ) -> Result<CSC2D<SparseIndex, RowIndex, ColumnIndex, Value>, MatrixError> {
        let Some(number_of_rows) = RowIndex::try_from_usize(self.number_of_rows) else {
            return Err(MatrixError::Overflow {
                required: self.number_of_rows as u64,
                capacity: index_capacity::<RowIndex>(),
            });
        };
        let Some(number_of_columns) = ColumnIndex::try_from_usize(self.number_of_columns) else {
            return Err(MatrixError::Overflow {
                required: self.number_of_columns as u64,
                capacity: index_capacity::<ColumnIndex>(),
            });
        };

        let mut offsets = Vec::with_capacity(self.number_of_columns + 1);
        offsets.push(SparseIndex::zero());
        let mut row_indices = Vec::new();
        let mut values = Vec::new();
        for column in 0..self.number_of_columns {
            for (row, &value) in self.column(column).iter().enumerate() {
                if value != Value::zero() {
                    row_indices.push(RowIndex::try_from_usize(row).unwrap_or_else(|| {
                        unreachable!("Row positions are bounded by the row index type.")
                    }));
                    values.push(value);
                }
            }
            let Some(end) = SparseIndex::try_from_usize(values.len()) else {
                return Err(MatrixError::Overflow {
                    required: values.len() as u64,
                    capacity: index_capacity::<SparseIndex>(),
                });
            };
            offsets.push(end);
        }
        CSC2D::from_parts(values, row_indices, offsets, number_of_rows, number_of_columns)
    }
}
