//! Partition-closure properties of the per-cluster reducer.

mod common;

use common::csc_from_columns;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sparse_markers::prelude::*;

#[test]
fn test_cluster_totals_close_over_partition() {
    let mut rng = SmallRng::seed_from_u64(11);
    for _ in 0..25 {
        let samples = rng.gen_range(2..120);
        let clusters = rng.gen_range(1..6u32);
        let ids: Vec<u32> = (0..samples).map(|_| rng.gen_range(0..clusters)).collect();
        let partition = ClusterPartition::from_parts(ids, clusters).unwrap();

        let column: Vec<f64> = (0..samples)
            .map(|_| if rng.gen_bool(0.5) { f64::from(rng.gen_range(1..6)) } else { 0.0 })
            .collect();
        let matrix = csc_from_columns(&[column.clone()]);

        let mut scratch = FeatureScratch::new(partition.number_of_clusters());
        scratch.reduce(matrix.column_rows(0), matrix.column_values(0), &partition, true);

        let nonzeros_expected = column.iter().filter(|&&value| value != 0.0).count() as u64;
        let sum_expected: f64 = column.iter().sum();
        let (sum_total, nonzeros_total) = scratch.totals();
        assert_eq!(nonzeros_total, nonzeros_expected);
        assert!((sum_total - sum_expected).abs() < 1e-9);

        // Per-cluster counts close over the partition sizes.
        for (cluster, aggregate) in scratch.aggregates().iter().enumerate() {
            let size = partition.sizes()[cluster];
            assert!(aggregate.nonzeros <= size);
            assert_eq!(aggregate.zeros(size) + aggregate.nonzeros, size);
        }
        assert_eq!(scratch.pairs().len() as u64, nonzeros_total);
    }
}

#[test]
fn test_reducer_contract_with_caller_buffers() {
    // The reducer populates caller-visible aggregates without allocating
    // per feature: the same scratch serves many features.
    let partition = ClusterPartition::from_ids(vec![0, 1, 0, 1]).unwrap();
    let matrix = csc_from_columns(&[
        vec![1.0, 0.0, 3.0, 0.0],
        vec![0.0, 2.0, 0.0, 4.0],
        vec![0.0, 0.0, 0.0, 0.0],
    ]);
    let mut scratch = FeatureScratch::new(2);

    scratch.reduce(matrix.column_rows(0), matrix.column_values(0), &partition, false);
    assert_eq!(scratch.aggregates()[0].sum, 4.0);
    assert_eq!(scratch.aggregates()[1].sum, 0.0);

    scratch.reduce(matrix.column_rows(1), matrix.column_values(1), &partition, false);
    assert_eq!(scratch.aggregates()[0].sum, 0.0);
    assert_eq!(scratch.aggregates()[1].sum, 6.0);

    scratch.reduce(matrix.column_rows(2), matrix.column_values(2), &partition, false);
    assert_eq!(scratch.totals(), (0.0, 0));
}
