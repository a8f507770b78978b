//! Submodule providing the runtime choice between the two CSC pointer
//! widths, so matrices below and above the 32-bit entry bound can flow
//! through the same pipelines.
use num_traits::ToPrimitive;

use crate::errors::{MarkerError, MatrixError};
use crate::impls::{CSC2D32, CSC2D64, DenseMatrix};
use crate::traits::{
    MarginalSums, Matrix2D, Number, OneVsRestMarkers, SparseColumnMatrix,
    TransposableMatrix2D, markers::{ClusterPartition, MarkerOptions, MarkerTable},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The column-pointer width of a CSC matrix.
pub enum PointerWidth {
    /// 32-bit pointers. Capacity is capped at `2³¹ − 1` stored entries
    /// because interchange formats persist narrow pointers as signed 32-bit
    /// integers.
    Narrow,
    /// 64-bit pointers.
    Wide,
}

impl PointerWidth {
    /// The largest number of stored entries a narrow matrix may hold.
    pub const NARROW_CAPACITY: u64 = i32::MAX as u64;

    /// Returns the width required to address the given number of stored
    /// entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparse_markers::impls::PointerWidth;
    ///
    /// assert_eq!(PointerWidth::required(1_000), PointerWidth::Narrow);
    /// assert_eq!(PointerWidth::required(PointerWidth::NARROW_CAPACITY), PointerWidth::Narrow);
    /// assert_eq!(PointerWidth::required(PointerWidth::NARROW_CAPACITY + 5), PointerWidth::Wide);
    /// ```
    pub fn required(stored_entries: u64) -> Self {
        if stored_entries > Self::NARROW_CAPACITY { Self::Wide } else { Self::Narrow }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A CSC matrix with either 32-bit or 64-bit column pointers, selected at
/// runtime from the number of stored entries.
pub enum AnyCSC2D<Value> {
    /// A matrix with 32-bit column pointers.
    Narrow(CSC2D32<Value>),
    /// A matrix with 64-bit column pointers.
    Wide(CSC2D64<Value>),
}

impl<Value: Number> AnyCSC2D<Value> {
    /// Builds a matrix from a raw CSC triple with 64-bit offsets, choosing
    /// the narrowest pointer width that can address the stored entries.
    ///
    /// # Errors
    ///
    /// Returns the same validation errors as
    /// [`CSC2D::from_parts`](crate::impls::CSC2D::from_parts).
    pub fn from_parts(
        values: Vec<Value>,
        row_indices: Vec<u32>,
        offsets: Vec<u64>,
        number_of_rows: u32,
        number_of_columns: u32,
    ) -> Result<Self, MatrixError> {
        match PointerWidth::required(values.len() as u64) {
            PointerWidth::Narrow => {
                let offsets = offsets
                    .iter()
                    .map(|&offset| u32::try_from(offset).map_err(|_| MatrixError::Overflow {
                        required: offset,
                        capacity: u64::from(u32::MAX),
                    }))
                    .collect::<Result<Vec<u32>, MatrixError>>()?;
                Ok(Self::Narrow(CSC2D32::from_parts(
                    values,
                    row_indices,
                    offsets,
                    number_of_rows,
                    number_of_columns,
                )?))
            }
            PointerWidth::Wide => Ok(Self::Wide(CSC2D64::from_parts(
                values,
                row_indices,
                offsets,
                number_of_rows,
                number_of_columns,
            )?)),
        }
    }

    /// Returns the pointer width of the matrix.
    pub fn pointer_width(&self) -> PointerWidth {
        match self {
            Self::Narrow(_) => PointerWidth::Narrow,
            Self::Wide(_) => PointerWidth::Wide,
        }
    }

    /// Returns the number of rows.
    pub fn number_of_rows(&self) -> u32 {
        match self {
            Self::Narrow(matrix) => matrix.number_of_rows(),
            Self::Wide(matrix) => matrix.number_of_rows(),
        }
    }

    /// Returns the number of columns.
    pub fn number_of_columns(&self) -> u32 {
        match self {
            Self::Narrow(matrix) => matrix.number_of_columns(),
            Self::Wide(matrix) => matrix.number_of_columns(),
        }
    }

    /// Returns the number of stored entries.
    pub fn number_of_defined_values(&self) -> u64 {
        match self {
            Self::Narrow(matrix) => u64::from(matrix.number_of_defined_values()),
            Self::Wide(matrix) => matrix.number_of_defined_values(),
        }
    }

    /// Returns the transposed matrix, preserving the pointer width.
    pub fn transpose(&self) -> Self {
        match self {
            Self::Narrow(matrix) => Self::Narrow(matrix.transpose()),
            Self::Wide(matrix) => Self::Wide(matrix.transpose()),
        }
    }

    /// Returns a matrix with 64-bit pointers, widening if necessary.
    pub fn promoted(&self) -> CSC2D64<Value> {
        match self {
            Self::Narrow(matrix) => matrix.try_cast_pointers().unwrap_or_else(|_| {
                unreachable!("Widening a 32-bit matrix to 64-bit pointers cannot overflow.")
            }),
            Self::Wide(matrix) => matrix.clone(),
        }
    }

    /// Densifies the matrix.
    pub fn to_dense(&self) -> DenseMatrix<Value> {
        match self {
            Self::Narrow(matrix) => matrix.to_dense(),
            Self::Wide(matrix) => matrix.to_dense(),
        }
    }

    /// Stacks matrices row-wise. The result has 64-bit pointers iff the
    /// combined stored entries exceed the narrow capacity or any input is
    /// already wide.
    ///
    /// # Errors
    ///
    /// Returns the same errors as
    /// [`CSC2D::concat_rows`](crate::impls::CSC2D::concat_rows).
    pub fn concat_rows(parts: &[Self]) -> Result<Self, MatrixError> {
        Self::concat_with(parts, CSC2D32::concat_rows, CSC2D64::concat_rows)
    }

    /// Places matrices side by side, with the same width-promotion rule as
    /// [`concat_rows`](AnyCSC2D::concat_rows).
    ///
    /// # Errors
    ///
    /// Returns the same errors as
    /// [`CSC2D::concat_columns`](crate::impls::CSC2D::concat_columns).
    pub fn concat_columns(parts: &[Self]) -> Result<Self, MatrixError> {
        Self::concat_with(parts, CSC2D32::concat_columns, CSC2D64::concat_columns)
    }

    fn concat_with(
        parts: &[Self],
        narrow: impl Fn(&[CSC2D32<Value>]) -> Result<CSC2D32<Value>, MatrixError>,
        wide: impl Fn(&[CSC2D64<Value>]) -> Result<CSC2D64<Value>, MatrixError>,
    ) -> Result<Self, MatrixError> {
        let total: u64 = parts.iter().map(Self::number_of_defined_values).sum();
        let any_wide =
            parts.iter().any(|part| part.pointer_width() == PointerWidth::Wide);
        if any_wide || PointerWidth::required(total) == PointerWidth::Wide {
            let widened: Vec<CSC2D64<Value>> = parts.iter().map(Self::promoted).collect();
            Ok(Self::Wide(wide(&widened)?))
        } else {
            let narrowed: Vec<CSC2D32<Value>> = parts
                .iter()
                .map(|part| match part {
                    Self::Narrow(matrix) => matrix.clone(),
                    Self::Wide(_) => unreachable!("Wide inputs take the wide branch."),
                })
                .collect();
            Ok(Self::Narrow(narrow(&narrowed)?))
        }
    }
}

impl<Value: Number + ToPrimitive> AnyCSC2D<Value> {
    /// Returns one sum per column.
    pub fn column_sums(&self) -> Vec<f64> {
        match self {
            Self::Narrow(matrix) => matrix.column_sums(),
            Self::Wide(matrix) => matrix.column_sums(),
        }
    }

    /// Returns one sum per row.
    pub fn row_sums(&self) -> Vec<f64> {
        match self {
            Self::Narrow(matrix) => matrix.row_sums(),
            Self::Wide(matrix) => matrix.row_sums(),
        }
    }
}

impl<Value: Number + ToPrimitive + Send + Sync> OneVsRestMarkers for AnyCSC2D<Value> {
    fn find_all_markers(
        &self,
        partition: &ClusterPartition,
        options: &MarkerOptions,
    ) -> Result<MarkerTable, MarkerError> {
        match self {
            Self::Narrow(matrix) => matrix.find_all_markers(partition, options),
            Self::Wide(matrix) => matrix.find_all_markers(partition, options),
        }
    }
}
