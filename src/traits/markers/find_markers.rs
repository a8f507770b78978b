//! Submodule providing the one-vs-rest marker driver: the data-parallel
//! feature sweep shared by all kernels, and the full pipeline combining
//! testing, fold-change, filtering and ranking.

use core::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use num_traits::ToPrimitive;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::errors::{MarkerError, MatrixError};
use crate::impls::CSC2D;
use crate::traits::{
    IntoUsize, Matrix2D, Number, PositiveInteger, SparseColumnMatrix, TransposableMatrix2D,
};
use crate::traits::markers::cluster_reduce::FeatureScratch;
use crate::traits::markers::fold_change::{
    FoldChangeOptions, FoldChangeStatistic, fold_change_feature,
};
use crate::traits::markers::partition::ClusterPartition;
use crate::traits::markers::rank_sum::{
    Alternative, RankSumOptions, RankSumStatistic, rank_sum_feature,
};
use crate::traits::markers::t_test::{TTestOptions, TTestStatistic, t_test_feature};
use crate::traits::markers::table::{
    ClusterStatMatrix, FilterOptions, MarkerRecord, MarkerTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// The statistical kernel used by the driver.
pub enum TestKind {
    /// Wilcoxon–Mann–Whitney rank-sum test.
    #[default]
    RankSum,
    /// Student's t-test (Welch or pooled, per
    /// [`MarkerOptions::var_equal`]).
    StudentsT,
}

impl FromStr for TestKind {
    type Err = MarkerError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "rank_sum" | "wilcox" | "wilcoxon" => Ok(Self::RankSum),
            "t" | "t_test" | "students_t" => Ok(Self::StudentsT),
            other => Err(MarkerError::UnknownTest(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Options of the marker driver. Every field has the conventional default,
/// so partial overrides read naturally with struct update syntax.
pub struct MarkerOptions {
    /// The statistical kernel.
    pub test: TestKind,
    /// Continuity correction of the rank-sum z score.
    pub continuity_correction: bool,
    /// Pooled instead of Welch variances for the t kernel.
    pub var_equal: bool,
    /// The alternative hypothesis.
    pub alternative: Alternative,
    /// Drop pairs detected in less than this fraction of either group.
    pub min_pct: f64,
    /// Drop pairs whose detection rates differ by less than this.
    pub min_diff_pct: f64,
    /// Drop pairs whose absolute log fold-change is below this.
    pub logfc_threshold: f64,
    /// Keep only positive log fold-changes.
    pub only_positive: bool,
    /// Pseudocount of the fold-change kernel.
    pub pseudocount: f64,
    /// Log base of the fold-change kernel.
    pub log_base: f64,
    /// Invert log1p normalization before comparing means.
    pub use_expm1: bool,
    /// Drop pairs whose p-value is at or above this.
    pub p_threshold: f64,
    /// Worker count of the feature sweep; `0` uses the ambient rayon pool.
    pub threads: u32,
    /// Whether the input stores features along the row axis; the driver
    /// transposes once up front so the kernels always see
    /// samples-by-features.
    pub features_as_rows: bool,
    /// Optional per-feature mask: unmasked features are tested, masked
    /// ones are skipped entirely (they still count toward the Bonferroni
    /// clamp).
    pub feature_mask: Option<Vec<bool>>,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            test: TestKind::RankSum,
            continuity_correction: true,
            var_equal: false,
            alternative: Alternative::TwoSided,
            min_pct: 0.1,
            min_diff_pct: f64::NEG_INFINITY,
            logfc_threshold: 0.25,
            only_positive: false,
            pseudocount: 1.0,
            log_base: 2.0,
            use_expm1: true,
            p_threshold: 1e-2,
            threads: 1,
            features_as_rows: false,
            feature_mask: None,
        }
    }
}

impl MarkerOptions {
    /// Returns the rank-sum kernel options.
    pub fn rank_sum_options(&self) -> RankSumOptions {
        RankSumOptions {
            continuity_correction: self.continuity_correction,
            alternative: self.alternative,
            threads: self.threads,
        }
    }

    /// Returns the t kernel options.
    pub fn t_test_options(&self) -> TTestOptions {
        TTestOptions {
            var_equal: self.var_equal,
            alternative: self.alternative,
            threads: self.threads,
        }
    }

    /// Returns the fold-change kernel options.
    pub fn fold_change_options(&self) -> FoldChangeOptions {
        FoldChangeOptions {
            pseudocount: self.pseudocount,
            log_base: self.log_base,
            use_expm1: self.use_expm1,
            threads: self.threads,
        }
    }

    /// Returns the filter thresholds.
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            min_pct: self.min_pct,
            min_diff_pct: self.min_diff_pct,
            logfc_threshold: self.logfc_threshold,
            only_positive: self.only_positive,
            p_threshold: self.p_threshold,
        }
    }
}

/// The statistical kernel and its options, as requested from the sweep.
pub(crate) enum SweepTest {
    /// Rank-sum kernel.
    RankSum(RankSumOptions),
    /// Student-t kernel.
    StudentsT(TTestOptions),
}

/// One sweep request: which statistics to compute over which features.
pub(crate) struct SweepPlan<'plan> {
    /// The cluster partition of the samples.
    pub partition: &'plan ClusterPartition,
    /// The statistical kernel, if any.
    pub test: Option<SweepTest>,
    /// The fold-change kernel options, if requested.
    pub fold_change: Option<FoldChangeOptions>,
    /// Optional feature mask; masked features are skipped.
    pub feature_mask: Option<&'plan [bool]>,
    /// Worker count; `0` uses the ambient pool, `1` runs inline.
    pub threads: u32,
}

/// The wide fold-change outputs of one sweep.
pub(crate) struct FoldChangeMatrices {
    /// Cluster means.
    pub mean_in: ClusterStatMatrix,
    /// Complement means.
    pub mean_out: ClusterStatMatrix,
    /// Cluster detection rates.
    pub pct_in: ClusterStatMatrix,
    /// Complement detection rates.
    pub pct_out: ClusterStatMatrix,
    /// Log fold-changes.
    pub avg_log_fc: ClusterStatMatrix,
}

/// The outputs of one sweep.
pub(crate) struct SweepOutput {
    /// Per-(feature, cluster) p-values, when a test was requested.
    pub p_values: Option<ClusterStatMatrix>,
    /// Fold-change statistics, when requested.
    pub fold_change: Option<FoldChangeMatrices>,
    /// Whether any stored value was negative, which violates the rank-sum
    /// zero-block assumption.
    pub saw_negative: bool,
}

/// Reusable per-worker buffers of the sweep.
struct WorkerScratch {
    feature: FeatureScratch,
    rank: Vec<RankSumStatistic>,
    t: Vec<TTestStatistic>,
    fold: Vec<FoldChangeStatistic>,
}

impl WorkerScratch {
    fn new(clusters: usize) -> Self {
        Self {
            feature: FeatureScratch::new(clusters),
            rank: vec![RankSumStatistic { u: 0.0, z: 0.0, p_value: 1.0 }; clusters],
            t: vec![
                TTestStatistic { t: 0.0, degrees_of_freedom: 0.0, p_value: 1.0 };
                clusters
            ],
            fold: vec![
                FoldChangeStatistic {
                    mean_in: 0.0,
                    mean_out: 0.0,
                    pct_in: 0.0,
                    pct_out: 0.0,
                    avg_log_fc: 0.0,
                };
                clusters
            ],
        }
    }
}

/// Runs the requested kernels over every feature, in parallel when asked.
///
/// Each feature owns one disjoint slice of the output buffer, so the
/// result is identical for every worker count.
pub(crate) fn sweep<M>(matrix: &M, plan: &SweepPlan<'_>) -> Result<SweepOutput, MarkerError>
where
    M: SparseColumnMatrix + Sync,
    M::Value: ToPrimitive + Sync,
    M::RowIndex: Sync,
{
    let samples = matrix.number_of_rows().into_usize();
    let features = matrix.number_of_columns().into_usize();
    if plan.partition.number_of_samples() != samples {
        return Err(MatrixError::DimensionMismatch {
            axis: "sample labels",
            expected: samples,
            found: plan.partition.number_of_samples(),
        }
        .into());
    }
    if let Some(mask) = plan.feature_mask {
        if mask.len() != features {
            return Err(MatrixError::DimensionMismatch {
                axis: "feature mask entries",
                expected: features,
                found: mask.len(),
            }
            .into());
        }
    }
    if let Some(fold_change) = &plan.fold_change {
        fold_change.validate()?;
    }

    let clusters = plan.partition.number_of_clusters();
    let test_width = if plan.test.is_some() { clusters } else { 0 };
    let fold_width = if plan.fold_change.is_some() { 5 * clusters } else { 0 };
    let stride = test_width + fold_width;
    if stride == 0 {
        return Ok(SweepOutput { p_values: None, fold_change: None, saw_negative: false });
    }

    let mut buffer = vec![f64::NAN; features * stride];
    let saw_negative = AtomicBool::new(false);
    let collect_pairs = matches!(plan.test, Some(SweepTest::RankSum(_)));

    let work = |scratch: &mut WorkerScratch, feature: usize, chunk: &mut [f64]| {
        if plan.feature_mask.is_some_and(|mask| !mask[feature]) {
            return;
        }
        scratch.feature.reduce(
            matrix.column_rows(feature),
            matrix.column_values(feature),
            plan.partition,
            collect_pairs,
        );
        if scratch.feature.aggregates().iter().any(|aggregate| aggregate.min < 0.0) {
            saw_negative.store(true, Ordering::Relaxed);
        }
        match &plan.test {
            Some(SweepTest::RankSum(options)) => {
                rank_sum_feature(&mut scratch.feature, plan.partition, options, &mut scratch.rank);
                for (slot, statistic) in chunk[..clusters].iter_mut().zip(&scratch.rank) {
                    *slot = statistic.p_value;
                }
            }
            Some(SweepTest::StudentsT(options)) => {
                t_test_feature(&scratch.feature, plan.partition, options, &mut scratch.t);
                for (slot, statistic) in chunk[..clusters].iter_mut().zip(&scratch.t) {
                    *slot = statistic.p_value;
                }
            }
            None => {}
        }
        if let Some(options) = &plan.fold_change {
            fold_change_feature(&scratch.feature, plan.partition, options, &mut scratch.fold);
            let fold = &mut chunk[test_width..];
            for (cluster, statistic) in scratch.fold.iter().enumerate() {
                fold[cluster] = statistic.avg_log_fc;
                fold[clusters + cluster] = statistic.pct_in;
                fold[2 * clusters + cluster] = statistic.pct_out;
                fold[3 * clusters + cluster] = statistic.mean_in;
                fold[4 * clusters + cluster] = statistic.mean_out;
            }
        }
    };

    match plan.threads {
        1 => {
            let mut scratch = WorkerScratch::new(clusters);
            for (feature, chunk) in buffer.chunks_mut(stride).enumerate() {
                work(&mut scratch, feature, chunk);
            }
        }
        0 => {
            run_parallel(&mut buffer, stride, features, clusters, &work);
        }
        threads => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(threads as usize)
                .build()
                .map_err(|error| {
                    MarkerError::InvalidOption(format!("cannot build worker pool: {error}"))
                })?;
            pool.install(|| run_parallel(&mut buffer, stride, features, clusters, &work));
        }
    }

    let mut p_values =
        if plan.test.is_some() { Some(ClusterStatMatrix::new(features, clusters)) } else { None };
    let mut fold_change = if plan.fold_change.is_some() {
        Some(FoldChangeMatrices {
            mean_in: ClusterStatMatrix::new(features, clusters),
            mean_out: ClusterStatMatrix::new(features, clusters),
            pct_in: ClusterStatMatrix::new(features, clusters),
            pct_out: ClusterStatMatrix::new(features, clusters),
            avg_log_fc: ClusterStatMatrix::new(features, clusters),
        })
    } else {
        None
    };
    for feature in 0..features {
        let chunk = &buffer[feature * stride..(feature + 1) * stride];
        if let Some(matrix) = &mut p_values {
            matrix.feature_row_mut(feature).copy_from_slice(&chunk[..clusters]);
        }
        if let Some(matrices) = &mut fold_change {
            let fold = &chunk[test_width..];
            matrices.avg_log_fc.feature_row_mut(feature).copy_from_slice(&fold[..clusters]);
            matrices
                .pct_in
                .feature_row_mut(feature)
                .copy_from_slice(&fold[clusters..2 * clusters]);
            matrices
                .pct_out
                .feature_row_mut(feature)
                .copy_from_slice(&fold[2 * clusters..3 * clusters]);
            matrices
                .mean_in
                .feature_row_mut(feature)
                .copy_from_slice(&fold[3 * clusters..4 * clusters]);
            matrices
                .mean_out
                .feature_row_mut(feature)
                .copy_from_slice(&fold[4 * clusters..5 * clusters]);
        }
    }

    Ok(SweepOutput {
        p_values,
        fold_change,
        saw_negative: saw_negative.load(Ordering::Relaxed),
    })
}

/// Distributes the per-feature work over the ambient rayon pool.
fn run_parallel<F>(buffer: &mut [f64], stride: usize, features: usize, clusters: usize, work: &F)
where
    F: Fn(&mut WorkerScratch, usize, &mut [f64]) + Sync,
{
    buffer
        .par_chunks_mut(stride)
        .enumerate()
        .with_min_len((features / 64).max(1))
        .for_each_init(
            || WorkerScratch::new(clusters),
            |scratch, (feature, chunk)| work(scratch, feature, chunk),
        );
}

/// Trait providing the full one-vs-rest marker pipeline: per-feature
/// statistical test and fold-change, then filtering, ranking and the
/// Bonferroni clamp.
pub trait OneVsRestMarkers {
    /// Runs the configured test and fold-change kernel over every feature,
    /// assembles the long marker table, and applies the filter-and-rank
    /// pass of [`MarkerTable::filter_rank_adjust`].
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Matrix`] when the partition or mask lengths
    /// do not match the matrix, and [`MarkerError::InvalidOption`] for
    /// inadmissible fold-change options or a worker pool that cannot be
    /// built.
    fn find_all_markers(
        &self,
        partition: &ClusterPartition,
        options: &MarkerOptions,
    ) -> Result<MarkerTable, MarkerError>;
}

impl<SparseIndex, Axis, Value> OneVsRestMarkers for CSC2D<SparseIndex, Axis, Axis, Value>
where
    SparseIndex: PositiveInteger + Sync,
    Axis: PositiveInteger + Sync,
    Value: Number + ToPrimitive + Sync,
{
    fn find_all_markers(
        &self,
        partition: &ClusterPartition,
        options: &MarkerOptions,
    ) -> Result<MarkerTable, MarkerError> {
        let started = Instant::now();
        let transposed;
        let matrix = if options.features_as_rows {
            transposed = self.transpose();
            &transposed
        } else {
            self
        };

        let features = matrix.number_of_columns().into_usize();
        let clusters = partition.number_of_clusters();
        if u32::try_from(features).is_err() || u32::try_from(clusters).is_err() {
            return Err(MatrixError::Overflow {
                required: features.max(clusters) as u64,
                capacity: u64::from(u32::MAX),
            }
            .into());
        }
        log::info!(
            "finding markers for {features} features over {} samples in {clusters} clusters ({} workers)",
            matrix.number_of_rows(),
            options.threads,
        );

        let plan = SweepPlan {
            partition,
            test: Some(match options.test {
                TestKind::RankSum => SweepTest::RankSum(options.rank_sum_options()),
                TestKind::StudentsT => SweepTest::StudentsT(options.t_test_options()),
            }),
            fold_change: Some(options.fold_change_options()),
            feature_mask: options.feature_mask.as_deref(),
            threads: options.threads,
        };
        let output = sweep(matrix, &plan)?;
        if output.saw_negative {
            log::warn!(
                "negative values in the input; rank-sum p-values assume the zeros are the smallest tie block"
            );
        }
        let p_values =
            output.p_values.unwrap_or_else(|| unreachable!("The sweep was asked for a test."));
        let fold_change = output
            .fold_change
            .unwrap_or_else(|| unreachable!("The sweep was asked for fold changes."));

        let feature_names = matrix.column_names().map_or_else(
            || (0..features).map(|feature| feature.to_string()).collect(),
            <[String]>::to_vec,
        );
        let cluster_names =
            (0..clusters).map(|cluster| partition.cluster_name(cluster)).collect();

        let mut records = Vec::with_capacity(features * clusters);
        for feature in 0..features {
            if plan.feature_mask.is_some_and(|mask| !mask[feature]) {
                continue;
            }
            for cluster in 0..clusters {
                let p_val = p_values.get(feature, cluster);
                records.push(MarkerRecord {
                    p_val,
                    p_val_adj: (features as f64 * p_val).min(1.0),
                    avg_log_fc: fold_change.avg_log_fc.get(feature, cluster),
                    pct_in: fold_change.pct_in.get(feature, cluster),
                    pct_out: fold_change.pct_out.get(feature, cluster),
                    cluster: u32::try_from(cluster).unwrap_or_else(|_| {
                        unreachable!("Cluster counts were checked against u32.")
                    }),
                    feature: u32::try_from(feature).unwrap_or_else(|_| {
                        unreachable!("Feature counts were checked against u32.")
                    }),
                });
            }
        }

        let mut table = MarkerTable::new(records, cluster_names, feature_names);
        table.filter_rank_adjust(&options.filter_options(), features);
        log::debug!(
            "marker table with {} records built in {:.1?}",
            table.len(),
            started.elapsed(),
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_kind_parsing() {
        assert_eq!("rank_sum".parse::<TestKind>().unwrap(), TestKind::RankSum);
        assert_eq!("wilcox".parse::<TestKind>().unwrap(), TestKind::RankSum);
        assert_eq!("t".parse::<TestKind>().unwrap(), TestKind::StudentsT);
        assert_eq!(
            "anova".parse::<TestKind>().unwrap_err(),
            MarkerError::UnknownTest("anova".to_owned())
        );
    }

    #[test]
    fn test_options_projection() {
        let options = MarkerOptions {
            continuity_correction: false,
            var_equal: true,
            threads: 3,
            ..MarkerOptions::default()
        };
        assert!(!options.rank_sum_options().continuity_correction);
        assert!(options.t_test_options().var_equal);
        assert_eq!(options.fold_change_options().threads, 3);
        assert_eq!(options.filter_options().min_pct, 0.1);
    }
}
