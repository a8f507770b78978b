//! Submodule providing the result shapes of the marker engine: the wide
//! per-(feature, cluster) statistic matrix and the long, filterable marker
//! table.

use crate::traits::TotalOrd;

#[derive(Debug, Clone, PartialEq)]
/// A dense feature-by-cluster statistic, the wide result shape of the
/// kernels.
pub struct ClusterStatMatrix {
    /// The statistics, feature-major.
    values: Vec<f64>,
    /// The number of clusters.
    number_of_clusters: usize,
}

impl ClusterStatMatrix {
    /// Builds a NaN-filled matrix for the given number of features and
    /// clusters.
    pub fn new(number_of_features: usize, number_of_clusters: usize) -> Self {
        Self {
            values: vec![f64::NAN; number_of_features * number_of_clusters],
            number_of_clusters,
        }
    }

    /// Returns the number of features.
    pub fn number_of_features(&self) -> usize {
        if self.number_of_clusters == 0 {
            0
        } else {
            self.values.len() / self.number_of_clusters
        }
    }

    /// Returns the number of clusters.
    pub fn number_of_clusters(&self) -> usize {
        self.number_of_clusters
    }

    /// Returns the statistic of one (feature, cluster) pair.
    pub fn get(&self, feature: usize, cluster: usize) -> f64 {
        self.values[feature * self.number_of_clusters + cluster]
    }

    /// Returns one feature's statistics across all clusters.
    pub fn feature_row(&self, feature: usize) -> &[f64] {
        let start = feature * self.number_of_clusters;
        &self.values[start..start + self.number_of_clusters]
    }

    /// Returns a mutable view of one feature's statistics.
    pub(super) fn feature_row_mut(&mut self, feature: usize) -> &mut [f64] {
        let start = feature * self.number_of_clusters;
        &mut self.values[start..start + self.number_of_clusters]
    }

    /// Returns the feature-major backing array.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// One row of the long marker table: the statistics of one (feature,
/// cluster) pair.
pub struct MarkerRecord {
    /// Two-sided (or one-sided, per the configured alternative) p-value.
    pub p_val: f64,
    /// Bonferroni-clamped p-value: `min(1, F · p_val)` with `F` the total
    /// feature count of the input.
    pub p_val_adj: f64,
    /// Log fold-change of the cluster mean over the complement mean.
    pub avg_log_fc: f64,
    /// Detection rate within the cluster.
    pub pct_in: f64,
    /// Detection rate within the complement.
    pub pct_out: f64,
    /// The cluster id.
    pub cluster: u32,
    /// The feature position in the input matrix.
    pub feature: u32,
}

#[derive(Debug, Clone, PartialEq)]
/// Thresholds of the filter-and-rank pass applied to the marker table.
pub struct FilterOptions {
    /// Drop pairs detected in less than this fraction of either group.
    pub min_pct: f64,
    /// Drop pairs whose detection rates differ by less than this.
    pub min_diff_pct: f64,
    /// Drop pairs whose absolute log fold-change is below this.
    pub logfc_threshold: f64,
    /// Keep only positive log fold-changes.
    pub only_positive: bool,
    /// Drop pairs whose p-value is at or above this.
    pub p_threshold: f64,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            min_pct: 0.1,
            min_diff_pct: f64::NEG_INFINITY,
            logfc_threshold: 0.25,
            only_positive: false,
            p_threshold: 1e-2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// The long result shape: one record per surviving (feature, cluster)
/// pair, with presentation names for both axes.
pub struct MarkerTable {
    /// The records, ordered by cluster and within each cluster by the
    /// ranking of [`MarkerTable::filter_rank_adjust`].
    records: Vec<MarkerRecord>,
    /// One presentation name per cluster.
    cluster_names: Vec<String>,
    /// One presentation name per feature of the input matrix.
    feature_names: Vec<String>,
}

impl MarkerTable {
    /// Builds a table from unfiltered records and the axis names.
    pub fn new(
        records: Vec<MarkerRecord>,
        cluster_names: Vec<String>,
        feature_names: Vec<String>,
    ) -> Self {
        Self { records, cluster_names, feature_names }
    }

    /// Returns the records.
    pub fn records(&self) -> &[MarkerRecord] {
        &self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when no record survived.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the presentation names of the clusters.
    pub fn cluster_names(&self) -> &[String] {
        &self.cluster_names
    }

    /// Returns the presentation names of the features.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Returns the cluster name of a record.
    pub fn cluster_name_of(&self, record: &MarkerRecord) -> &str {
        &self.cluster_names[record.cluster as usize]
    }

    /// Returns the feature name of a record.
    pub fn feature_name_of(&self, record: &MarkerRecord) -> &str {
        &self.feature_names[record.feature as usize]
    }

    /// Applies the filter, ranking and adjustment pass, in this order:
    ///
    /// 1. drop records with `max(pct_in, pct_out) < min_pct`;
    /// 2. drop records with `|pct_in − pct_out| < min_diff_pct`;
    /// 3. drop records with `|avg_log_fc| < logfc_threshold`;
    /// 4. when `only_positive`, drop records with `avg_log_fc ≤ 0`;
    /// 5. drop records with `p_val ≥ p_threshold`;
    /// 6. sort by cluster ascending, then p-value ascending, log
    ///    fold-change descending and feature position ascending;
    /// 7. set `p_val_adj = min(1, total_features · p_val)`.
    ///
    /// `total_features` is the feature count of the *input matrix*, not the
    /// number of surviving records nor of performed tests, so the clamp
    /// under-corrects when many features were filtered away. This mirrors
    /// the established behavior of the marker-finding pipelines this engine
    /// accelerates.
    ///
    /// The pass is idempotent: applying it twice yields the same table.
    pub fn filter_rank_adjust(&mut self, options: &FilterOptions, total_features: usize) {
        self.records.retain(|record| {
            if record.pct_in.max(record.pct_out) < options.min_pct {
                return false;
            }
            if (record.pct_in - record.pct_out).abs() < options.min_diff_pct {
                return false;
            }
            if record.avg_log_fc.abs() < options.logfc_threshold {
                return false;
            }
            if options.only_positive && record.avg_log_fc <= 0.0 {
                return false;
            }
            record.p_val < options.p_threshold
        });
        self.records.sort_by(|left, right| {
            left.cluster
                .cmp(&right.cluster)
                .then_with(|| TotalOrd::total_cmp(&left.p_val, &right.p_val))
                .then_with(|| TotalOrd::total_cmp(&right.avg_log_fc, &left.avg_log_fc))
                .then_with(|| left.feature.cmp(&right.feature))
        });
        for record in &mut self.records {
            record.p_val_adj = (total_features as f64 * record.p_val).min(1.0);
        }
    }
}
