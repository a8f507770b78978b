//! Submodule providing the fold-change / detection-rate kernel.

use num_traits::ToPrimitive;

use crate::errors::MarkerError;
use crate::traits::{Finite, SparseColumnMatrix};
use crate::traits::markers::cluster_reduce::FeatureScratch;
use crate::traits::markers::find_markers::{SweepPlan, sweep};
use crate::traits::markers::partition::ClusterPartition;
use crate::traits::markers::table::ClusterStatMatrix;

#[derive(Debug, Clone, PartialEq)]
/// Options of the fold-change kernel.
pub struct FoldChangeOptions {
    /// Pseudocount added to both recovered means before taking logs.
    pub pseudocount: f64,
    /// Base of the reported log fold-change.
    pub log_base: f64,
    /// Treat the input as log1p-normalized expression and invert it through
    /// `expm1` before comparing means; when unset (data already on a linear
    /// or standardized scale) the fold-change is the plain difference of
    /// means.
    pub use_expm1: bool,
    /// Worker count of the feature sweep; `0` uses the ambient rayon pool.
    pub threads: u32,
}

impl Default for FoldChangeOptions {
    fn default() -> Self {
        Self { pseudocount: 1.0, log_base: 2.0, use_expm1: true, threads: 1 }
    }
}

impl FoldChangeOptions {
    /// Validates the numeric options.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::InvalidOption`] when the pseudocount is
    /// negative or not finite, or when the log base is not a finite
    /// positive number different from one.
    pub fn validate(&self) -> Result<(), MarkerError> {
        if !Finite::is_finite(&self.pseudocount) || self.pseudocount < 0.0 {
            return Err(MarkerError::InvalidOption(format!(
                "pseudocount must be finite and non-negative, got {}",
                self.pseudocount
            )));
        }
        if !Finite::is_finite(&self.log_base) || self.log_base <= 0.0 || self.log_base == 1.0 {
            return Err(MarkerError::InvalidOption(format!(
                "log base must be finite, positive and different from one, got {}",
                self.log_base
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// The fold-change and detection-rate statistics of one (feature, cluster)
/// pair.
pub struct FoldChangeStatistic {
    /// Mean over the cluster, zeros included.
    pub mean_in: f64,
    /// Mean over the complement, zeros included.
    pub mean_out: f64,
    /// Fraction of cluster samples with a non-zero value.
    pub pct_in: f64,
    /// Fraction of complement samples with a non-zero value.
    pub pct_out: f64,
    /// Log fold-change of the cluster over the complement.
    pub avg_log_fc: f64,
}

/// Computes the fold-change statistics of every cluster for the feature
/// currently held by `scratch`.
///
/// Empty groups report zero means and detection rates, and `output` must
/// hold one slot per cluster.
pub fn fold_change_feature(
    scratch: &FeatureScratch,
    partition: &ClusterPartition,
    options: &FoldChangeOptions,
    output: &mut [FoldChangeStatistic],
) {
    debug_assert_eq!(output.len(), partition.number_of_clusters());
    let samples = partition.number_of_samples() as f64;
    let (total_sum, total_nonzeros) = scratch.totals();
    let log_base = options.log_base.ln();

    for (cluster, slot) in output.iter_mut().enumerate() {
        let inside = f64::from(partition.sizes()[cluster]);
        let outside = samples - inside;
        let aggregate = scratch.aggregates()[cluster];
        let nonzeros_in = f64::from(aggregate.nonzeros);
        let nonzeros_out = total_nonzeros as f64 - nonzeros_in;

        let mean_in = if inside > 0.0 { aggregate.sum / inside } else { 0.0 };
        let mean_out = if outside > 0.0 { (total_sum - aggregate.sum) / outside } else { 0.0 };
        let pct_in = if inside > 0.0 { nonzeros_in / inside } else { 0.0 };
        let pct_out = if outside > 0.0 { nonzeros_out / outside } else { 0.0 };

        let avg_log_fc = if options.use_expm1 {
            ((mean_in.exp_m1() + options.pseudocount).ln()
                - (mean_out.exp_m1() + options.pseudocount).ln())
                / log_base
        } else {
            mean_in - mean_out
        };
        *slot = FoldChangeStatistic { mean_in, mean_out, pct_in, pct_out, avg_log_fc };
    }
}

/// Trait providing the per-cluster fold-change and detection-rate
/// statistics over every feature of a sparse column matrix.
pub trait FoldChange: SparseColumnMatrix + Sync
where
    Self::Value: ToPrimitive + Sync,
    Self::RowIndex: Sync,
{
    /// Computes `avg_log_fc`, `pct_in` and `pct_out` (plus both group
    /// means) for every (feature, cluster) pair, returned as five wide
    /// matrices in that order.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::InvalidOption`] for inadmissible pseudocount
    /// or log base, and [`MarkerError::Matrix`] when the partition length
    /// does not match the sample axis.
    #[allow(clippy::type_complexity)]
    fn fold_change(
        &self,
        partition: &ClusterPartition,
        options: &FoldChangeOptions,
    ) -> Result<
        (
            ClusterStatMatrix,
            ClusterStatMatrix,
            ClusterStatMatrix,
            ClusterStatMatrix,
            ClusterStatMatrix,
        ),
        MarkerError,
    >
    where
        Self: Sized,
    {
        let plan = SweepPlan {
            partition,
            test: None,
            fold_change: Some(options.clone()),
            feature_mask: None,
            threads: options.threads,
        };
        let output = sweep(self, &plan)?;
        let matrices = output
            .fold_change
            .unwrap_or_else(|| unreachable!("The sweep was asked for fold changes."));
        Ok((
            matrices.avg_log_fc,
            matrices.pct_in,
            matrices.pct_out,
            matrices.mean_in,
            matrices.mean_out,
        ))
    }
}

impl<M: SparseColumnMatrix + Sync> FoldChange for M
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
        options: &FoldChangeOptions,
    ) -> Vec<FoldChangeStatistic> {
        let mut scratch = FeatureScratch::new(partition.number_of_clusters());
        scratch.reduce(rows, values, partition, false);
        let mut output = vec![
            FoldChangeStatistic {
                mean_in: 0.0,
                mean_out: 0.0,
                pct_in: 0.0,
                pct_out: 0.0,
                avg_log_fc: 0.0,
            };
            partition.number_of_clusters()
        ];
        fold_change_feature(&scratch, partition, options, &mut output);
        output
    }

    #[test]
    fn test_means_and_detection_rates() {
        let partition = ClusterPartition::from_ids(vec![0, 0, 0, 1, 1]).unwrap();
        let statistics = run_feature(
            &[0, 1, 3],
            &[2.0, 4.0, 3.0],
            &partition,
            &FoldChangeOptions::default(),
        );
        assert_eq!(statistics[0].mean_in, 2.0);
        assert_eq!(statistics[0].mean_out, 1.5);
        assert!((statistics[0].pct_in - 2.0 / 3.0).abs() < 1e-15);
        assert_eq!(statistics[0].pct_out, 0.5);
        assert_eq!(statistics[1].mean_in, 1.5);
        assert_eq!(statistics[1].mean_out, 2.0);
    }

    #[test]
    fn test_log_fold_change_expm1() {
        let partition = ClusterPartition::from_ids(vec![0, 0, 1, 1]).unwrap();
        let options = FoldChangeOptions::default();
        let statistics = run_feature(&[0, 1], &[1.0, 1.0], &partition, &options);
        // mean_in = 1, mean_out = 0: log2((e − 1) + 1) − log2(0 + 1).
        let expected = (1.0f64.exp_m1() + 1.0).ln() / 2.0f64.ln();
        assert!((statistics[0].avg_log_fc - expected).abs() < 1e-12);
        // The complement cluster sees the mirrored fold-change.
        assert!((statistics[1].avg_log_fc + expected).abs() < 1e-12);
    }

    #[test]
    fn test_scale_data_fold_change_is_mean_difference() {
        let partition = ClusterPartition::from_ids(vec![0, 0, 1, 1]).unwrap();
        let options = FoldChangeOptions { use_expm1: false, ..FoldChangeOptions::default() };
        let statistics = run_feature(&[0, 2], &[3.0, 1.0], &partition, &options);
        assert_eq!(statistics[0].avg_log_fc, 1.5 - 0.5);
    }

    #[test]
    fn test_all_zero_feature() {
        let partition = ClusterPartition::from_ids(vec![0, 0, 1, 1]).unwrap();
        let statistics = run_feature(&[], &[], &partition, &FoldChangeOptions::default());
        assert_eq!(statistics[0].pct_in, 0.0);
        assert_eq!(statistics[0].pct_out, 0.0);
        assert_eq!(statistics[0].avg_log_fc, 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_options() {
        let negative = FoldChangeOptions { pseudocount: -1.0, ..FoldChangeOptions::default() };
        assert!(negative.validate().is_err());
        let unit_base = FoldChangeOptions { log_base: 1.0, ..FoldChangeOptions::default() };
        assert!(unit_base.validate().is_err());
        assert!(FoldChangeOptions::default().validate().is_ok());
    }
}
