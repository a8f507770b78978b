//! Submodule providing the CSC (compressed sparse column) matrix container.
use core::fmt::Debug;

use num_traits::Zero;

use crate::errors::{MalformedMatrixError, MatrixError};
use crate::traits::{
    Matrix2D, Number, PositiveInteger, SparseColumnMatrix, ValuedMatrix2D,
    numeric::index_capacity,
};

#[derive(Clone, PartialEq)]
/// A compressed sparse column matrix.
///
/// The three parallel arrays hold the stored values, their row indices and
/// the per-column offsets into the first two. The pointer width is selected
/// through `SparseIndex`: [`CSC2D32`] addresses up to `2³² − 1` stored
/// entries, [`CSC2D64`] removes that bound. Row and column names are
/// optional and validated against the respective axis lengths.
pub struct CSC2D<SparseIndex, RowIndex, ColumnIndex, Value> {
    /// The per-column offsets, of length `number_of_columns + 1`.
    pub(super) offsets: Vec<SparseIndex>,
    /// The row indices of the stored entries, strictly ascending within each
    /// column.
    pub(super) row_indices: Vec<RowIndex>,
    /// The stored values, parallel to `row_indices`.
    pub(super) values: Vec<Value>,
    /// The number of rows.
    pub(super) number_of_rows: RowIndex,
    /// The number of columns.
    pub(super) number_of_columns: ColumnIndex,
    /// Optional row names, of length `number_of_rows`.
    pub(super) row_names: Option<Vec<String>>,
    /// Optional column names, of length `number_of_columns`.
    pub(super) column_names: Option<Vec<String>>,
}

/// CSC matrix with 32-bit column pointers.
pub type CSC2D32<Value> = CSC2D<u32, u32, u32, Value>;

/// CSC matrix with 64-bit column pointers, for matrices whose number of
/// stored entries exceeds the 32-bit range.
pub type CSC2D64<Value> = CSC2D<u64, u32, u32, Value>;

impl<SparseIndex: Debug, RowIndex: Debug, ColumnIndex: Debug, Value: Debug> Debug
    for CSC2D<SparseIndex, RowIndex, ColumnIndex, Value>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CSC2D")
            .field("offsets", &self.offsets)
            .field("row_indices", &self.row_indices)
            .field("values", &self.values)
            .field("number_of_rows", &self.number_of_rows)
            .field("number_of_columns", &self.number_of_columns)
            .field("row_names", &self.row_names)
            .field("column_names", &self.column_names)
            .finish()
    }
}

impl<SparseIndex: Zero, RowIndex: Zero, ColumnIndex: Zero, Value> Default
    for CSC2D<SparseIndex, RowIndex, ColumnIndex, Value>
{
    fn default() -> Self {
        Self {
            offsets: vec![SparseIndex::zero()],
            row_indices: Vec::new(),
            values: Vec::new(),
            number_of_rows: RowIndex::zero(),
            number_of_columns: ColumnIndex::zero(),
            row_names: None,
            column_names: None,
        }
    }
}

impl<
    SparseIndex: PositiveInteger,
    RowIndex: PositiveInteger,
    ColumnIndex: PositiveInteger,
    Value: Number,
> CSC2D<SparseIndex, RowIndex, ColumnIndex, Value>
{
    /// Builds a matrix from its raw CSC triple, taking ownership of the
    /// arrays and validating every structural invariant.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Overflow`] when the number of stored entries
    /// exceeds the capacity of `SparseIndex`, and
    /// [`MatrixError::Malformed`] when the offsets are not a monotone cover
    /// of the value array or some column's row indices are not strictly
    /// ascending and in bounds. Stored zero values are tolerated: consumers
    /// treat them as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparse_markers::prelude::*;
    ///
    /// let matrix: CSC2D32<f64> =
    ///     CSC2D::from_parts(vec![1.0, 2.0], vec![0, 1], vec![0, 1, 2], 3u32, 2u32).unwrap();
    /// assert_eq!(matrix.number_of_defined_values(), 2);
    /// ```
    pub fn from_parts(
        values: Vec<Value>,
        row_indices: Vec<RowIndex>,
        offsets: Vec<SparseIndex>,
        number_of_rows: RowIndex,
        number_of_columns: ColumnIndex,
    ) -> Result<Self, MatrixError> {
        if SparseIndex::try_from_usize(values.len()).is_none() {
            return Err(MatrixError::Overflow {
                required: values.len() as u64,
                capacity: index_capacity::<SparseIndex>(),
            });
        }
        if offsets.len() != number_of_columns.into_usize() + 1 {
            return Err(MalformedMatrixError::OffsetsLength {
                columns: number_of_columns.into_usize(),
                found: offsets.len(),
            }
            .into());
        }
        if offsets[0] != SparseIndex::zero() {
            return Err(MalformedMatrixError::LeadingOffsetNotZero.into());
        }
        for (column, window) in offsets.windows(2).enumerate() {
            if window[0] > window[1] {
                return Err(MalformedMatrixError::DecreasingOffsets { column }.into());
            }
        }
        let trailing = offsets[number_of_columns.into_usize()].into_usize();
        if trailing != values.len() {
            return Err(MalformedMatrixError::TrailingOffsetMismatch {
                values: values.len(),
                found: trailing,
            }
            .into());
        }
        if row_indices.len() != values.len() {
            return Err(MalformedMatrixError::RowValueLengthMismatch {
                rows: row_indices.len(),
                values: values.len(),
            }
            .into());
        }
        for column in 0..number_of_columns.into_usize() {
            let run = &row_indices[offsets[column].into_usize()..offsets[column + 1].into_usize()];
            for pair in run.windows(2) {
                if pair[0] >= pair[1] {
                    return Err(MalformedMatrixError::UnsortedRowIndices { column }.into());
                }
            }
            if let Some(&last) = run.last() {
                if last >= number_of_rows {
                    return Err(MalformedMatrixError::RowIndexOutOfBounds {
                        column,
                        row: last.into_usize(),
                        rows: number_of_rows.into_usize(),
                    }
                    .into());
                }
            }
        }
        Ok(Self {
            offsets,
            row_indices,
            values,
            number_of_rows,
            number_of_columns,
            row_names: None,
            column_names: None,
        })
    }

    /// Builds an empty matrix of the given shape, with no stored entries.
    pub fn with_shape(number_of_rows: RowIndex, number_of_columns: ColumnIndex) -> Self {
        Self {
            offsets: vec![SparseIndex::zero(); number_of_columns.into_usize() + 1],
            row_indices: Vec::new(),
            values: Vec::new(),
            number_of_rows,
            number_of_columns,
            row_names: None,
            column_names: None,
        }
    }

    /// Attaches row names, validating their number against the row count.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] when the number of names
    /// differs from the number of rows.
    pub fn with_row_names(mut self, row_names: Vec<String>) -> Result<Self, MatrixError> {
        if row_names.len() != self.number_of_rows.into_usize() {
            return Err(MatrixError::DimensionMismatch {
                axis: "row names",
                expected: self.number_of_rows.into_usize(),
                found: row_names.len(),
            });
        }
        self.row_names = Some(row_names);
        Ok(self)
    }

    /// Attaches column names, validating their number against the column
    /// count.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::DimensionMismatch`] when the number of names
    /// differs from the number of columns.
    pub fn with_column_names(mut self, column_names: Vec<String>) -> Result<Self, MatrixError> {
        if column_names.len() != self.number_of_columns.into_usize() {
            return Err(MatrixError::DimensionMismatch {
                axis: "column names",
                expected: self.number_of_columns.into_usize(),
                found: column_names.len(),
            });
        }
        self.column_names = Some(column_names);
        Ok(self)
    }

    /// Returns the stored values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the row indices of the stored entries.
    pub fn row_indices(&self) -> &[RowIndex] {
        &self.row_indices
    }

    /// Returns the per-column offsets.
    pub fn offsets(&self) -> &[SparseIndex] {
        &self.offsets
    }

    /// Returns the row names, if any.
    pub fn row_names(&self) -> Option<&[String]> {
        self.row_names.as_deref()
    }

    /// Returns the column names, if any.
    pub fn column_names(&self) -> Option<&[String]> {
        self.column_names.as_deref()
    }

    /// Returns the half-open range of positions of `column`'s stored entries
    /// within the value and row-index arrays.
    pub fn column_range(&self, column: usize) -> core::ops::Range<usize> {
        self.offsets[column].into_usize()..self.offsets[column + 1].into_usize()
    }

    /// Rebuilds the matrix with another pointer width, e.g. to promote a
    /// 32-bit matrix to 64-bit pointers before a large concatenation.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Overflow`] when the number of stored entries
    /// does not fit the target pointer type.
    pub fn try_cast_pointers<TargetIndex: PositiveInteger>(
        &self,
    ) -> Result<CSC2D<TargetIndex, RowIndex, ColumnIndex, Value>, MatrixError> {
        if TargetIndex::try_from_usize(self.values.len()).is_none() {
            return Err(MatrixError::Overflow {
                required: self.values.len() as u64,
                capacity: index_capacity::<TargetIndex>(),
            });
        }
        let offsets = self
            .offsets
            .iter()
            .map(|&offset| {
                TargetIndex::try_from_usize(offset.into_usize()).unwrap_or_else(|| {
                    unreachable!(
                        "Offsets are bounded by the number of stored entries, which fits the target width."
                    )
                })
            })
            .collect();
        Ok(CSC2D {
            offsets,
            row_indices: self.row_indices.clone(),
            values: self.values.clone(),
            number_of_rows: self.number_of_rows,
            number_of_columns: self.number_of_columns,
            row_names: self.row_names.clone(),
            column_names: self.column_names.clone(),
        })
    }
}

impl<
    SparseIndex: PositiveInteger,
    RowIndex: PositiveInteger,
    ColumnIndex: PositiveInteger,
    Value: Number,
> Matrix2D for CSC2D<SparseIndex, RowIndex, ColumnIndex, Value>
{
    type RowIndex = RowIndex;
    type ColumnIndex = ColumnIndex;

    fn number_of_rows(&self) -> Self::RowIndex {
        self.number_of_rows
    }

    fn number_of_columns(&self) -> Self::ColumnIndex {
        self.number_of_columns
    }
}

impl<
    SparseIndex: PositiveInteger,
    RowIndex: PositiveInteger,
    ColumnIndex: PositiveInteger,
    Value: Number,
> ValuedMatrix2D for CSC2D<SparseIndex, RowIndex, ColumnIndex, Value>
{
    type Value = Value;
}

impl<
    SparseIndex: PositiveInteger,
    RowIndex: PositiveInteger,
    ColumnIndex: PositiveInteger,
    Value: Number,
> SparseColumnMatrix for CSC2D<SparseIndex, RowIndex, ColumnIndex, Value>
{
    type SparseIndex = SparseIndex;

    fn number_of_defined_values(&self) -> Self::SparseIndex {
        self.offsets[self.number_of_columns.into_usize()]
    }

    fn column_rows(&self, column: usize) -> &[Self::RowIndex] {
        &self.row_indices[self.column_range(column)]
    }

    fn column_values(&self, column: usize) -> &[Self::Value] {
        &self.values[self.column_range(column)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> CSC2D32<f64> {
        // 3x4 with entries (0,0)=1, (2,1)=2, (1,2)=3, (0,3)=4.
        CSC2D::from_parts(
            vec![1.0, 2.0, 3.0, 4.0],
            vec![0, 2, 1, 0],
            vec![0, 1, 2, 3, 4],
            3u32,
            4u32,
        )
        .unwrap()
    }

    #[test]
    fn test_default_is_empty() {
        let matrix: CSC2D32<f64> = CSC2D::default();
        assert_eq!(matrix.number_of_rows(), 0);
        assert_eq!(matrix.number_of_columns(), 0);
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_from_parts_accessors() {
        let matrix = small();
        assert_eq!(matrix.number_of_rows(), 3);
        assert_eq!(matrix.number_of_columns(), 4);
        assert_eq!(matrix.number_of_defined_values(), 4);
        assert_eq!(matrix.column_rows(1), &[2]);
        assert_eq!(matrix.column_values(2), &[3.0]);
        let entries: Vec<(u32, f64)> = matrix.column_entries(3).collect();
        assert_eq!(entries, vec![(0, 4.0)]);
    }

    #[test]
    fn test_from_parts_rejects_bad_offsets() {
        let result: Result<CSC2D32<f64>, _> =
            CSC2D::from_parts(vec![1.0], vec![0], vec![0, 1], 2u32, 2u32);
        assert_eq!(
            result.unwrap_err(),
            MatrixError::Malformed(MalformedMatrixError::OffsetsLength { columns: 2, found: 2 })
        );

        let result: Result<CSC2D32<f64>, _> =
            CSC2D::from_parts(vec![1.0], vec![0], vec![1, 1], 1u32, 1u32);
        assert_eq!(
            result.unwrap_err(),
            MatrixError::Malformed(MalformedMatrixError::LeadingOffsetNotZero)
        );

        let result: Result<CSC2D32<f64>, _> =
            CSC2D::from_parts(vec![1.0, 2.0], vec![0, 0], vec![0, 2, 1], 1u32, 2u32);
        assert_eq!(
            result.unwrap_err(),
            MatrixError::Malformed(MalformedMatrixError::DecreasingOffsets { column: 1 })
        );
    }

    #[test]
    fn test_from_parts_rejects_trailing_mismatch() {
        let result: Result<CSC2D32<f64>, _> =
            CSC2D::from_parts(vec![1.0, 2.0], vec![0, 1], vec![0, 1, 1], 2u32, 2u32);
        assert_eq!(
            result.unwrap_err(),
            MatrixError::Malformed(MalformedMatrixError::TrailingOffsetMismatch {
                values: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_from_parts_rejects_unsorted_rows() {
        let result: Result<CSC2D32<f64>, _> =
            CSC2D::from_parts(vec![1.0, 2.0], vec![1, 0], vec![0, 2], 2u32, 1u32);
        assert_eq!(
            result.unwrap_err(),
            MatrixError::Malformed(MalformedMatrixError::UnsortedRowIndices { column: 0 })
        );

        let result: Result<CSC2D32<f64>, _> =
            CSC2D::from_parts(vec![1.0, 2.0], vec![0, 0], vec![0, 2], 2u32, 1u32);
        assert_eq!(
            result.unwrap_err(),
            MatrixError::Malformed(MalformedMatrixError::UnsortedRowIndices { column: 0 })
        );
    }

    #[test]
    fn test_from_parts_rejects_out_of_bounds_rows() {
        let result: Result<CSC2D32<f64>, _> =
            CSC2D::from_parts(vec![1.0], vec![3], vec![0, 1], 3u32, 1u32);
        assert_eq!(
            result.unwrap_err(),
            MatrixError::Malformed(MalformedMatrixError::RowIndexOutOfBounds {
                column: 0,
                row: 3,
                rows: 3
            })
        );
    }

    #[test]
    fn test_from_parts_overflow_with_narrow_pointer() {
        // A u8 pointer cannot address 256 stored entries.
        let values = vec![1.0f64; 256];
        let rows: Vec<u16> = (0..256u16).collect();
        let offsets: Vec<u8> = vec![0, 255];
        let result: Result<CSC2D<u8, u16, u8, f64>, _> =
            CSC2D::from_parts(values, rows, offsets, 256u16, 1u8);
        assert_eq!(
            result.unwrap_err(),
            MatrixError::Overflow { required: 256, capacity: 255 }
        );
    }

    #[test]
    fn test_names_validation() {
        let matrix = small();
        let named = matrix
            .clone()
            .with_row_names(vec!["a".into(), "b".into(), "c".into()])
            .unwrap();
        assert_eq!(named.row_names().unwrap()[2], "c");

        assert_eq!(
            matrix.clone().with_row_names(vec!["a".into()]).unwrap_err(),
            MatrixError::DimensionMismatch { axis: "row names", expected: 3, found: 1 }
        );
        assert_eq!(
            matrix.with_column_names(vec!["a".into()]).unwrap_err(),
            MatrixError::DimensionMismatch { axis: "column names", expected: 4, found: 1 }
        );
    }

    #[test]
    fn test_cast_pointers_roundtrip() {
        let matrix = small();
        let wide: CSC2D64<f64> = matrix.try_cast_pointers().unwrap();
        assert_eq!(wide.number_of_defined_values(), 4);
        let narrow: CSC2D32<f64> = wide.try_cast_pointers().unwrap();
        assert_eq!(narrow, matrix);
    }

    #[test]
    fn test_cast_pointers_overflow() {
        // 300 entries cannot be addressed by u8 pointers.
        let values = vec![1.0f64; 300];
        let rows: Vec<u32> = (0..300u32).collect();
        let offsets: Vec<u32> = vec![0, 300];
        let matrix: CSC2D<u32, u32, u32, f64> =
            CSC2D::from_parts(values, rows, offsets, 300u32, 1u32).unwrap();
        assert_eq!(
            matrix.try_cast_pointers::<u8>().unwrap_err(),
            MatrixError::Overflow { required: 300, capacity: 255 }
        );
    }

    #[test]
    fn test_explicit_zero_is_tolerated() {
        let matrix: CSC2D32<f64> =
            CSC2D::from_parts(vec![0.0, 2.0], vec![0, 1], vec![0, 2], 2u32, 1u32).unwrap();
        assert_eq!(matrix.number_of_defined_values(), 2);
    }
}
