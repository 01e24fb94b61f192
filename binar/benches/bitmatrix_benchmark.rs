use binar::{BitMatrix, EchelonForm};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::prelude::*;

pub fn echelonize_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("BitMatrix::echelonize");
    for sparsity in [0.5, 0.1, 0.01] {
        for size in [100usize, 500usize, 1000usize] {
            group.sample_size(10);
            group.bench_with_input(
                BenchmarkId::from_parameter(format!("{sparsity}x{size}")),
                &(sparsity, size),
                |bencher, &(sparsity, size)| {
                    bencher.iter_batched(
                        || random_bitmatrix(size, size, sparsity),
                        |mut matrix| matrix.echelonize(),
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }
    group.finish();
}

pub fn kernel_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("BitMatrix::kernel");
    for size in [100usize, 500usize] {
        group.sample_size(10);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bencher, &size| {
            bencher.iter_batched(
                || random_bitmatrix(size, size + size / 2, 0.05),
                |matrix| matrix.kernel(),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

pub fn echelon_form_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("EchelonForm::new");
    for size in [100usize, 500usize] {
        group.sample_size(10);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bencher, &size| {
            bencher.iter_batched(
                || random_bitmatrix(size, size, 0.1),
                EchelonForm::new,
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn random_bitmatrix(row_count: usize, column_count: usize, sparsity: f64) -> BitMatrix {
    let mut rng = thread_rng();
    let mut matrix = BitMatrix::zeros(row_count, column_count);
    for row in 0..row_count {
        for column in 0..column_count {
            if rng.gen_bool(sparsity) {
                matrix.set((row, column), true);
            }
        }
    }
    matrix
}

criterion_group!(benches, echelonize_benchmark, kernel_benchmark, echelon_form_benchmark);
criterion_main!(benches);
