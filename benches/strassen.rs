//! Distributed Strassen Benchmark
//!
//! Compares the in-process rank tree against the single-rank references
//! across different matrix sizes.
//!
//! # Usage:
//! ```bash
//! # Run all benchmarks
//! cargo bench --bench strassen
//!
//! # Run one size
//! cargo bench --bench strassen -- strassen_256
//! ```

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rand::prelude::*;

use strassen_tree::{leaf, run_local, EngineConfig, Matrix};

fn create_matrix(n: usize, rng: &mut StdRng) -> Matrix {
    let flat: Vec<i32> = (0..n * n).map(|_| rng.random_range(0..10)).collect();
    // n * n values always unflatten into n×n
    Matrix::unflatten(flat, n).unwrap()
}

/// One group per size, so each size gets its own graph.
fn bench_strassen_by_size(c: &mut Criterion) {
    let sizes = [64, 128, 256];
    let config = EngineConfig::default().with_leaf_threshold(16);

    for n in sizes {
        let mut group = c.benchmark_group(format!("strassen_{}", n));
        group.sample_size(20);

        let mut rng = StdRng::seed_from_u64(42);
        let a = create_matrix(n, &mut rng);
        let b = create_matrix(n, &mut rng);

        for procs in [1, 8] {
            group.bench_function(format!("tree_{}_ranks", procs), |bench| {
                bench.iter(|| {
                    let run = run_local(config, procs, black_box(&a), black_box(&b)).unwrap();
                    black_box(run.product);
                });
            });
        }

        group.bench_function("sequential_strassen", |bench| {
            bench.iter(|| {
                let product = leaf::sequential_strassen(black_box(&a), black_box(&b)).unwrap();
                black_box(product);
            });
        });

        group.bench_function("schoolbook", |bench| {
            bench.iter(|| black_box(leaf::schoolbook(black_box(&a), black_box(&b))));
        });

        group.finish();
    }
}

criterion_group!(benches, bench_strassen_by_size);
criterion_main!(benches);
