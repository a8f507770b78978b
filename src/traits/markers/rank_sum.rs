//! Submodule providing the sparsity-aware Wilcoxon–Mann–Whitney rank-sum
//! kernel.
//!
//! For a feature over `N` samples with `nz` stored non-zeros, all `N − nz`
//! zeros form a single tie block occupying the lowest ranks, and every
//! distinct non-zero value forms one further tie block. The per-cluster
//! rank sums are therefore assembled arithmetically from one sorted walk
//! over the feature's `(value, cluster)` pairs, without materializing a
//! per-sample rank vector: the zero block contributes its mean rank times
//! the cluster's zero count, and each tied run contributes its mean rank
//! times the cluster's share of the run. Summation order is fixed (zero
//! block first, then ascending value) so results are reproducible
//! bit-for-bit across storage layouts.
//!
//! Values are assumed non-negative: a negative value would have to rank
//! below the zero block, which this walk does not model.

use core::str::FromStr;

use num_traits::ToPrimitive;

use crate::errors::MarkerError;
use crate::traits::SparseColumnMatrix;
use crate::traits::markers::cluster_reduce::FeatureScratch;
use crate::traits::markers::distributions::standard_normal_cdf;
use crate::traits::markers::find_markers::{SweepPlan, SweepTest, sweep};
use crate::traits::markers::partition::ClusterPartition;
use crate::traits::markers::table::ClusterStatMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// The alternative hypothesis of a two-sample test.
pub enum Alternative {
    /// The cluster's distribution is shifted in either direction.
    #[default]
    TwoSided,
    /// The cluster's distribution is shifted downwards.
    Less,
    /// The cluster's distribution is shifted upwards.
    Greater,
}

impl FromStr for Alternative {
    type Err = MarkerError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "two_sided" | "two.sided" => Ok(Self::TwoSided),
            "less" => Ok(Self::Less),
            "greater" => Ok(Self::Greater),
            other => Err(MarkerError::InvalidOption(format!(
                "unknown alternative {other:?}; expected \"two_sided\", \"less\" or \"greater\""
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Options of the rank-sum kernel.
pub struct RankSumOptions {
    /// Shrink the z numerator by one half towards zero.
    pub continuity_correction: bool,
    /// The alternative hypothesis.
    pub alternative: Alternative,
    /// Worker count of the feature sweep; `0` uses the ambient rayon pool.
    pub threads: u32,
}

impl Default for RankSumOptions {
    fn default() -> Self {
        Self { continuity_correction: true, alternative: Alternative::TwoSided, threads: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// The rank-sum statistic of one (feature, cluster) pair.
pub struct RankSumStatistic {
    /// The Mann–Whitney U of the cluster against its complement.
    pub u: f64,
    /// The tie-corrected, optionally continuity-corrected z score.
    pub z: f64,
    /// The p-value under the configured alternative.
    pub p_value: f64,
}

impl RankSumStatistic {
    /// The degenerate statistic reported when either group is empty or the
    /// variance vanishes: no separation claim, `p = 1`.
    fn degenerate(u: f64) -> Self {
        Self { u, z: 0.0, p_value: 1.0 }
    }
}

/// Computes the rank-sum statistic of every cluster for the feature
/// currently held by `scratch`, which must have been reduced with pair
/// collection enabled.
///
/// `output` must hold one slot per cluster. Ties are corrected through
/// `T = Σ (t³ − t)` over all tie blocks, the zero block included, with
/// `σ² = n₁·n₂·((N+1) − T/(N·(N−1))) / 12`. When every sample holds the
/// same value the variance vanishes and the degenerate `p = 1` is
/// reported.
pub fn rank_sum_feature(
    scratch: &mut FeatureScratch,
    partition: &ClusterPartition,
    options: &RankSumOptions,
    output: &mut [RankSumStatistic],
) {
    debug_assert_eq!(output.len(), partition.number_of_clusters());
    scratch.sort_pairs();

    let samples = partition.number_of_samples() as f64;
    let stored = scratch.pairs.len() as f64;
    let zeros_total = samples - stored;

    scratch.rank_sums.fill(0.0);
    let mut tie_term = zeros_total * zeros_total * zeros_total - zeros_total;
    let mut ranks_below = zeros_total;
    let mut start = 0;
    while start < scratch.pairs.len() {
        let value = scratch.pairs[start].0;
        let mut end = start + 1;
        while end < scratch.pairs.len() && scratch.pairs[end].0 == value {
            end += 1;
        }
        let run = (end - start) as f64;
        let mean_rank = ranks_below + (run + 1.0) / 2.0;
        for &(_, cluster) in &scratch.pairs[start..end] {
            scratch.rank_sums[cluster as usize] += mean_rank;
        }
        tie_term += run * run * run - run;
        ranks_below += run;
        start = end;
    }

    let zero_block_rank = (zeros_total + 1.0) / 2.0;
    for (cluster, slot) in output.iter_mut().enumerate() {
        let inside = f64::from(partition.sizes()[cluster]);
        let outside = samples - inside;
        let aggregate = scratch.aggregates()[cluster];
        let zeros_inside = inside - f64::from(aggregate.nonzeros);
        let rank_sum = scratch.rank_sums[cluster] + zero_block_rank * zeros_inside;
        let u = rank_sum - inside * (inside + 1.0) / 2.0;
        *slot = rank_sum_statistic(u, inside, outside, samples, tie_term, options);
    }
}

/// Turns one cluster's U into a z score and p-value.
fn rank_sum_statistic(
    u: f64,
    inside: f64,
    outside: f64,
    samples: f64,
    tie_term: f64,
    options: &RankSumOptions,
) -> RankSumStatistic {
    if inside == 0.0 || outside == 0.0 {
        return RankSumStatistic::degenerate(u);
    }
    let mean = inside * outside / 2.0;
    let variance = inside * outside / 12.0
        * ((samples + 1.0) - tie_term / (samples * (samples - 1.0)));
    if variance <= 0.0 {
        return RankSumStatistic::degenerate(u);
    }
    let sigma = variance.sqrt();
    let correction = if options.continuity_correction { 0.5 } else { 0.0 };
    let shift = u - mean;
    let (z, p_value) = match options.alternative {
        Alternative::TwoSided => {
            let magnitude = (shift.abs() - correction).max(0.0) / sigma;
            let z = if shift < 0.0 { -magnitude } else { magnitude };
            (z, (2.0 * standard_normal_cdf(-magnitude)).min(1.0))
        }
        Alternative::Greater => {
            let z = (shift - correction) / sigma;
            (z, standard_normal_cdf(-z))
        }
        Alternative::Less => {
            let z = (shift + correction) / sigma;
            (z, standard_normal_cdf(z))
        }
    };
    RankSumStatistic { u, z, p_value }
}

/// Trait providing the Wilcoxon–Mann–Whitney one-vs-rest test over every
/// feature of a sparse column matrix.
pub trait WilcoxonRankSum: SparseColumnMatrix + Sync
where
    Self::Value: ToPrimitive + Sync,
    Self::RowIndex: Sync,
{
    /// Computes the rank-sum p-value of every (feature, cluster) pair,
    /// iterating features in parallel per
    /// [`RankSumOptions::threads`].
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::Matrix`] when the partition length does not
    /// match the sample axis and [`MarkerError::InvalidOption`] when the
    /// worker pool cannot be built.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparse_markers::prelude::*;
    ///
    /// // Two features over four samples in two balanced clusters.
    /// let matrix: CSC2D32<f64> = CSC2D::from_parts(
    ///     vec![1.0, 1.0, 2.0],
    ///     vec![0, 1, 3],
    ///     vec![0, 2, 3],
    ///     4u32,
    ///     2u32,
    /// )
    /// .unwrap();
    /// let partition = ClusterPartition::from_ids(vec![0, 0, 1, 1]).unwrap();
    /// let p = matrix.wilcoxon_rank_sum(&partition, &RankSumOptions::default()).unwrap();
    /// assert_eq!(p.number_of_features(), 2);
    /// assert!(p.get(0, 0) > 0.0 && p.get(0, 0) <= 1.0);
    /// ```
    fn wilcoxon_rank_sum(
        &self,
        partition: &ClusterPartition,
        options: &RankSumOptions,
    ) -> Result<ClusterStatMatrix, MarkerError>
    where
        Self: Sized,
    {
        let plan = SweepPlan {
            partition,
            test: Some(SweepTest::RankSum(options.clone())),
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

impl<M: SparseColumnMatrix + Sync> WilcoxonRankSum for M
where
    M::Value: ToPrimitive + Sync,
    M::RowIndex: Sync,
{
}
