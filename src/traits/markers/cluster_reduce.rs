//! Submodule providing the per-cluster reducer: the shared inner loop of
//! every statistical kernel, folding one feature's stored entries into one
//! aggregate per cluster in a single pass.

use num_traits::ToPrimitive;

use crate::traits::markers::partition::ClusterPartition;
use crate::traits::{Number, PositiveInteger, TotalOrd};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Aggregate of one feature's non-zero values within one cluster.
pub struct ClusterAggregate {
    /// Sum of the non-zero values.
    pub sum: f64,
    /// Sum of the squared non-zero values.
    pub sum_of_squares: f64,
    /// Number of non-zero entries.
    pub nonzeros: u32,
    /// Smallest non-zero value, `+∞` when the cluster has none.
    pub min: f64,
    /// Largest non-zero value, `−∞` when the cluster has none.
    pub max: f64,
}

impl Default for ClusterAggregate {
    fn default() -> Self {
        Self {
            sum: 0.0,
            sum_of_squares: 0.0,
            nonzeros: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl ClusterAggregate {
    /// Folds one non-zero value into the aggregate.
    fn record(&mut self, value: f64) {
        self.sum += value;
        self.sum_of_squares += value * value;
        self.nonzeros += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Returns the number of zero entries of the cluster, recovered from
    /// the cluster size.
    pub fn zeros(&self, cluster_size: u32) -> u32 {
        cluster_size - self.nonzeros
    }
}

/// Reusable per-worker scratch for processing one feature at a time.
///
/// The buffers are sized once per worker and cleared between features, so
/// the hot loop performs no allocation after warm-up. The `(value, cluster)`
/// pairs are only captured when the rank-sum path needs them.
pub struct FeatureScratch {
    /// One aggregate per cluster.
    aggregates: Vec<ClusterAggregate>,
    /// The feature's non-zero values paired with their cluster ids.
    pub(super) pairs: Vec<(f64, u32)>,
    /// Per-cluster rank-sum accumulators for the rank-sum kernel.
    pub(super) rank_sums: Vec<f64>,
}

impl FeatureScratch {
    /// Builds scratch buffers for the given number of clusters.
    pub fn new(number_of_clusters: usize) -> Self {
        Self {
            aggregates: vec![ClusterAggregate::default(); number_of_clusters],
            pairs: Vec::new(),
            rank_sums: vec![0.0; number_of_clusters],
        }
    }

    /// Reduces one feature column into per-cluster aggregates.
    ///
    /// `rows` and `values` are the parallel arrays of the feature's stored
    /// entries; each row index selects the sample's cluster id from the
    /// partition. Entries whose value is zero are skipped, so explicitly
    /// stored zeros behave exactly like structural ones. When
    /// `collect_pairs` is set, the `(value, cluster)` pairs are retained for
    /// the rank-sum tie walk.
    ///
    /// The caller guarantees that every row index is below the partition's
    /// sample count.
    pub fn reduce<RowIndex: PositiveInteger, Value: Number + ToPrimitive>(
        &mut self,
        rows: &[RowIndex],
        values: &[Value],
        partition: &ClusterPartition,
        collect_pairs: bool,
    ) {
        debug_assert_eq!(rows.len(), values.len());
        self.aggregates.fill(ClusterAggregate::default());
        self.pairs.clear();
        for (&row, &value) in rows.iter().zip(values) {
            let value = value.to_f64().unwrap_or(f64::NAN);
            if value == 0.0 {
                continue;
            }
            let cluster = partition.ids()[row.into_usize()];
            self.aggregates[cluster as usize].record(value);
            if collect_pairs {
                self.pairs.push((value, cluster));
            }
        }
    }

    /// Returns the per-cluster aggregates of the last reduced feature.
    pub fn aggregates(&self) -> &[ClusterAggregate] {
        &self.aggregates
    }

    /// Returns the captured `(value, cluster)` pairs of the last reduced
    /// feature.
    pub fn pairs(&self) -> &[(f64, u32)] {
        &self.pairs
    }

    /// Sorts the captured pairs by value under the total order, grouping
    /// tied values into contiguous runs.
    pub(super) fn sort_pairs(&mut self) {
        self.pairs.sort_unstable_by(|left, right| TotalOrd::total_cmp(&left.0, &right.0));
    }

    /// Returns the feature-wide totals: the summed non-zero mass and the
    /// non-zero count across all clusters.
    pub fn totals(&self) -> (f64, u64) {
        let mut sum = 0.0;
        let mut nonzeros = 0u64;
        for aggregate in &self.aggregates {
            sum += aggregate.sum;
            nonzeros += u64::from(aggregate.nonzeros);
        }
        (sum, nonzeros)
    }
}
