//! Submodule providing the one-vs-rest marker engine: the cluster
//! partition, the per-cluster reducer, the statistical kernels and the
//! driver that combines them.

pub mod cluster_reduce;
pub mod distributions;
pub mod find_markers;
pub mod fold_change;
pub mod partition;
pub mod rank_sum;
pub mod t_test;
pub mod table;

pub use cluster_reduce::{ClusterAggregate, FeatureScratch};
pub use find_markers::{MarkerOptions, OneVsRestMarkers, TestKind};
pub use fold_change::{FoldChange, FoldChangeOptions, FoldChangeStatistic, fold_change_feature};
pub use partition::ClusterPartition;
pub use rank_sum::{
    Alternative, RankSumOptions, RankSumStatistic, WilcoxonRankSum, rank_sum_feature,
};
pub use t_test::{StudentTTest, TTestOptions, TTestStatistic, t_test_feature};
pub use table::{ClusterStatMatrix, FilterOptions, MarkerRecord, MarkerTable};
