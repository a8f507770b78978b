//! Submodule providing the Student-t kernel over the per-cluster reducer
//! sums.
//!
//! Means and variances over a whole group, zeros included, are recovered
//! from the sparse sums: with `s = Σ v` and `q = Σ v²` over the stored
//! non-zeros only, the group of size `n` has mean `s/n` and unbiased
//! variance `(q − s²/n) / (n − 1)`, because the zeros contribute nothing to
//! either sum.

use num_traits::ToPrimitive;

use crate::errors::MarkerError;
use crate::traits::SparseColumnMatrix;
use crate::traits::markers::cluster_reduce::FeatureScratch;
use crate::traits::markers::distributions::student_t_two_sided;
use crate::traits::markers::find_markers::{SweepPlan, SweepTest, sweep};
use crate::traits::markers::partition::ClusterPartition;
use crate::traits::markers::rank_sum::Alternative;
use crate::traits::markers::table::ClusterStatMatrix;

#[derive(Debug, Clone, PartialEq)]
/// Options of the Student-t kernel.
pub struct TTestOptions {
    /// Assume equal variances and pool them; Welch's unequal-variance form
    /// is used otherwise.
    pub var_equal: bool,
    /// The alternative hypothesis.
    pub alternative: Alternative,
    /// Worker count of the feature sweep; `0` uses the ambient rayon pool.
    pub threads: u32,
}

impl Default for TTestOptions {
    fn default() -> Self {
        Self { var_equal: false, alternative: Alternative::TwoSided, threads: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// The Student-t statistic of one (feature, cluster) pair.
pub struct TTestStatistic {
    /// The t statistic of the cluster mean against the complement mean.
    pub t: f64,
    /// The degrees of freedom: pooled, or Welch–Satterthwaite.
    pub degrees_of_freedom: f64,
    /// The p-value under the configured alternative.
    pub p_value: f64,
}

impl TTestStatistic {
    /// The degenerate statistic reported when a group is too small or both
    /// variances vanish.
    fn degenerate() -> Self {
        Self { t: 0.0, degrees_of_freedom: 0.0, p_value: 1.0 }
    }
}

/// Computes the t statistic of every cluster for the feature currently
/// held by `scratch` (reduced with or without pair collection).
///
/// `output` must hold one slot per cluster. Groups with fewer than two
/// samples, and features whose pooled or combined variance vanishes, report
/// the degenerate `p = 1`.
pub fn t_test_feature(
    scratch: &FeatureScratch,
    partition: &ClusterPartition,
    options: &TTestOptions,
    output: &mut [TTestStatistic],
) {
    debug_assert_eq!(output.len(), partition.number_of_clusters());
    let samples = partition.number_of_samples() as f64;
    let (total_sum, _) = scratch.totals();
    let total_squares: f64 =
        scratch.aggregates().iter().map(|aggregate| aggregate.sum_of_squares).sum();

    for (cluster, slot) in output.iter_mut().enumerate() {
        let inside = f64::from(partition.sizes()[cluster]);
        let outside = samples - inside;
        if inside < 2.0 || outside < 2.0 {
            *slot = TTestStatistic::degenerate();
            continue;
        }
        let aggregate = scratch.aggregates()[cluster];
        let mean_in = aggregate.sum / inside;
        let mean_out = (total_sum - aggregate.sum) / outside;
        // Sums of squared deviations; clamp tiny negatives from rounding.
        let deviation_in = (aggregate.sum_of_squares - inside * mean_in * mean_in).max(0.0);
        let deviation_out = ((total_squares - aggregate.sum_of_squares)
            - outside * mean_out * mean_out)
            .max(0.0);

        let (squared_error, degrees_of_freedom) = if options.var_equal {
            let degrees = inside + outside - 2.0;
            let pooled = (deviation_in + deviation_out) / degrees;
            (pooled * (1.0 / inside + 1.0 / outside), degrees)
        } else {
            let variance_in = deviation_in / (inside - 1.0);
            let variance_out = deviation_out / (outside - 1.0);
            let ratio_in = variance_in / inside;
            let ratio_out = variance_out / outside;
            let squared_error = ratio_in + ratio_out;
            let denominator = ratio_in * ratio_in / (inside - 1.0)
                + ratio_out * ratio_out / (outside - 1.0);
            let degrees = if denominator > 0.0 {
                squared_error * squared_error / denominator
            } else {
                0.0
            };
            (squared_error, degrees)
        };
        if squared_error <= 0.0 || degrees_of_freedom <= 0.0 {
            *slot = TTestStatistic::degenerate();
            continue;
        }

        let t = (mean_in - mean_out) / squared_error.sqrt();
        let two_sided = student_t_two_sided(t, degrees_of_freedom);
        let p_value = match options.alternative {
            Alternative::TwoSided => two_sided,
            Alternative::Greater => {
                if t >= 0.0 { two_sided / 2.0 } else { 1.0 - two_sided / 2.0 }
            }
            Alternative::Less => {
                if t <= 0.0 { two_sided / 2.0 } else { 1.0 - two_sided / 2.0 }
            }
        };
        *slot = TTestStatistic { t, degrees_of_freedom, p_value };
    }
}

/// Trait providing the one-vs-rest Student-t test over every feature of a
/// sparse column matrix.
pub trait StudentTTest: SparseColumnMatrix + Sync
where
    Self::Value: ToPrimitive + Sync,
    Self::RowIndex: Sync,
{
    /// Computes the t p-value of every (feature, cluster) pair, iterating
    /// features in parallel per [`TTestOptions::threads`].
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Matrix`] when the partition length does not
    /// match the sample axis and [`MarkerError::InvalidOption`] when the
    /// worker pool cannot be built.
    fn student_t_test(
        &self,
        partition: &ClusterPartition,
        options: &TTestOptions,
    ) -> Result<ClusterStatMatrix, MarkerError>
    where
        Self: Sized,
    {
        let plan = SweepPlan {
            partition,
            test: Some(SweepTest::StudentsT(options.clone())),
            fold_change: None,
            feature_mask: None,
            threads: options.threads,
        };
        let output = sweep(self, &plan)?;
        Ok(output
            .p_values
            .unwrap_or_else(|| unreachable!("The sweep was asked for a test.")))
    }
}

impl<M: SparseColumnMatrix + Sync> StudentTTest for M
where
    M::Value: ToPrimitive + Sync,
    M::RowIndex: Sync,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_feature(
        rows: &[u32],
        values: &[f64],
        partition: &ClusterPartition,
        options: &TTestOptions,
    ) -> Vec<TTestStatistic> {
        let mut scratch = FeatureScratch::new(partition.number_of_clusters());
        scratch.reduce(rows, values, partition, false);
        let mut output = vec![TTestStatistic::degenerate(); partition.number_of_clusters()];
        t_test_feature(&scratch, partition, options, &mut output);
        output
    }

    #[test]
    fn test_pooled_matches_hand_computation() {
        // Cluster 0: [1, 2, 3], cluster 1: [4, 5, 6]. Both variances are 1,
        // so pooled t = (2 − 5) / sqrt(1 · (1/3 + 1/3)) = −3.674..., df 4.
        let partition = ClusterPartition::from_ids(vec![0, 0, 0, 1, 1, 1]).unwrap();
        let options = TTestOptions { var_equal: true, ..TTestOptions::default() };
        let statistics = run_feature(
            &[0, 1, 2, 3, 4, 5],
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &partition,
            &options,
        );
        let expected_t = -3.0 / (2.0f64 / 3.0).sqrt();
        assert!((statistics[0].t - expected_t).abs() < 1e-12);
        assert_eq!(statistics[0].degrees_of_freedom, 4.0);
        let expected_p = student_t_two_sided(expected_t, 4.0);
        assert!((statistics[0].p_value - expected_p).abs() < 1e-12);
    }

    #[test]
    fn test_welch_reduces_to_pooled_for_equal_groups() {
        // Equal sizes and equal variances: Welch df equals the pooled df.
        let partition = ClusterPartition::from_ids(vec![0, 0, 0, 1, 1, 1]).unwrap();
        let statistics = run_feature(
            &[0, 1, 2, 3, 4, 5],
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &partition,
            &TTestOptions::default(),
        );
        assert!((statistics[0].degrees_of_freedom - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_is_degenerate() {
        let partition = ClusterPartition::from_ids(vec![0, 0, 1, 1]).unwrap();
        let statistics =
            run_feature(&[0, 1, 2, 3], &[2.0, 2.0, 2.0, 2.0], &partition, &TTestOptions::default());
        assert_eq!(statistics[0].p_value, 1.0);
    }

    #[test]
    fn test_small_group_is_degenerate() {
        let partition = ClusterPartition::from_ids(vec![0, 1, 1, 1]).unwrap();
        let statistics =
            run_feature(&[0, 1], &[1.0, 5.0], &partition, &TTestOptions::default());
        assert_eq!(statistics[0].p_value, 1.0);
    }

    #[test]
    fn test_one_sided_tails_are_complementary() {
        let partition = ClusterPartition::from_ids(vec![0, 0, 0, 1, 1, 1]).unwrap();
        let rows = &[0u32, 1, 2, 3, 4, 5];
        let values = &[4.0, 5.0, 6.0, 1.0, 2.0, 3.0];
        let greater =
            TTestOptions { alternative: Alternative::Greater, ..TTestOptions::default() };
        let less = TTestOptions { alternative: Alternative::Less, ..TTestOptions::default() };
        let up = run_feature(rows, values, &partition, &greater);
        let down = run_feature(rows, values, &partition, &less);
        assert!(up[0].p_value < 0.05);
        assert!((up[0].p_value + down[0].p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zeros_count_toward_variance() {
        // Cluster 0 is [5, 0, 0, 0]: the zeros pull the mean to 1.25 and
        // contribute to the spread.
        let partition = ClusterPartition::from_ids(vec![0, 0, 0, 0, 1, 1]).unwrap();
        let statistics = run_feature(
            &[0, 4, 5],
            &[5.0, 1.0, 1.0],
            &partition,
            &TTestOptions::default(),
        );
        let aggregate_mean = 5.0 / 4.0;
        let deviation = 25.0 - 4.0 * aggregate_mean * aggregate_mean;
        let variance = deviation / 3.0;
        assert!(variance > 0.0);
        assert!(statistics[0].p_value > 0.0 && statistics[0].p_value < 1.0);
    }
}
