//! Criterion benchmark of the rank-sum sweep over synthetic expression
//! matrices of varying sparsity.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sparse_markers::prelude::*;

/// Generates a samples-by-features matrix with the given non-zero density
/// and integer-valued entries, plus a balanced partition.
fn synthetic(
    seed: u64,
    samples: usize,
    features: usize,
    density: f64,
    clusters: u32,
) -> (CSC2D32<f64>, ClusterPartition) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut values = Vec::new();
    let mut row_indices = Vec::new();
    let mut offsets = Vec::with_capacity(features + 1);
    offsets.push(0u32);
    for _ in 0..features {
        for row in 0..samples {
            if rng.gen_bool(density) {
                values.push(f64::from(rng.gen_range(1..6)));
                row_indices.push(u32::try_from(row).unwrap());
            }
        }
        offsets.push(u32::try_from(values.len()).unwrap());
    }
    let matrix = CSC2D::from_parts(
        values,
        row_indices,
        offsets,
        u32::try_from(samples).unwrap(),
        u32::try_from(features).unwrap(),
    )
    .unwrap();
    let ids = (0..samples).map(|_| rng.gen_range(0..clusters)).collect();
    let partition = ClusterPartition::from_parts(ids, clusters).unwrap();
    (matrix, partition)
}

fn bench_rank_sum(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("rank_sum");
    for &density in &[0.01, 0.05, 0.2] {
        let (matrix, partition) = synthetic(42, 5_000, 200, density, 6);
        group.bench_with_input(
            BenchmarkId::from_parameter(density),
            &(matrix, partition),
            |bencher, (matrix, partition)| {
                bencher.iter(|| {
                    black_box(
                        matrix
                            .wilcoxon_rank_sum(partition, &RankSumOptions::default())
                            .unwrap(),
                    )
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_rank_sum);
criterion_main!(benches);
