//! Submodule defining the trait vocabulary of the crate: numeric index
//! traits, the column-oriented matrix traits, and the marker kernels.

pub mod marginal_sums;
pub mod markers;
pub mod matrix;
pub mod numeric;

pub use marginal_sums::MarginalSums;
pub use markers::{
    Alternative, ClusterAggregate, ClusterPartition, ClusterStatMatrix, FeatureScratch,
    FilterOptions, FoldChange, FoldChangeOptions, FoldChangeStatistic, MarkerOptions,
    MarkerRecord, MarkerTable, OneVsRestMarkers, RankSumOptions, RankSumStatistic,
    StudentTTest, TTestOptions, TTestStatistic, TestKind, WilcoxonRankSum,
};
pub use matrix::{Matrix2D, SparseColumnMatrix, TransposableMatrix2D, ValuedMatrix2D};
pub use numeric::{Finite, IntoUsize, Number, PositiveInteger, TotalOrd, TryFromUsize};
