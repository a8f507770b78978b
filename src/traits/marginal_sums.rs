//! Submodule providing row and column sums over any sparse column matrix.

use num_traits::ToPrimitive;
use rayon::prelude::*;

use crate::traits::{IntoUsize, SparseColumnMatrix};

/// Trait providing row-wise and column-wise marginal sums.
///
/// Sums are accumulated in `f64` regardless of the value type, so matrices
/// whose totals exceed the value type's range (e.g. counts summed over more
/// than 2³¹ entries) still report exact-in-f64 marginals.
pub trait MarginalSums: SparseColumnMatrix
where
    Self::Value: ToPrimitive,
{
    /// Returns one sum per column, accumulated in ascending row order.
    fn column_sums(&self) -> Vec<f64> {
        (0..self.number_of_columns().into_usize())
            .map(|column| {
                self.column_values(column)
                    .iter()
                    .map(|value| value.to_f64().unwrap_or(f64::NAN))
                    .sum()
            })
            .collect()
    }

    /// Returns one sum per row, scatter-added in ascending column order.
    fn row_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.number_of_rows().into_usize()];
        for column in 0..self.number_of_columns().into_usize() {
            for (row, value) in self.column_entries(column) {
                sums[row.into_usize()] += value.to_f64().unwrap_or(f64::NAN);
            }
        }
        sums
    }

    /// Parallel variant of [`row_sums`](MarginalSums::row_sums): columns are
    /// partitioned among the workers of the ambient rayon pool, each worker
    /// scatter-adds into a private accumulator, and the accumulators are
    /// reduced element-wise at the end. Within one worker the summation
    /// order matches the sequential variant; the final reduction order is
    /// unspecified, so results may differ from [`row_sums`](MarginalSums::row_sums)
    /// by floating-point rounding only.
    fn row_sums_parallel(&self) -> Vec<f64>
    where
        Self: Sync,
        Self::Value: Sync,
        Self::RowIndex: Sync,
    {
        let rows = self.number_of_rows().into_usize();
        (0..self.number_of_columns().into_usize())
            .into_par_iter()
            .fold(
                || vec![0.0; rows],
                |mut sums, column| {
                    for (row, value) in self.column_entries(column) {
                        sums[row.into_usize()] += value.to_f64().unwrap_or(f64::NAN);
                    }
                    sums
                },
            )
            .reduce(
                || vec![0.0; rows],
                |mut left, right| {
                    for (accumulator, partial) in left.iter_mut().zip(right) {
                        *accumulator += partial;
                    }
                    left
                },
            )
    }
}

impl<M: SparseColumnMatrix> MarginalSums for M where M::Value: ToPrimitive {}
