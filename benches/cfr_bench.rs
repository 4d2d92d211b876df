//! Benchmarks for CFR solver.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cfr_engine::cfr::{minimize, CFRConfig, CFRSolver};
use cfr_engine::games::kuhn::{KuhnDealer, KuhnState};

fn kuhn_iteration_benchmark(c: &mut Criterion) {
    let mut dealer = KuhnDealer::new(2, 42);
    let mut solver: CFRSolver<KuhnState> = CFRSolver::new(2, CFRConfig::default()).unwrap();

    c.bench_function("kuhn_single_iteration", |b| {
        b.iter(|| {
            let root = dealer.deal();
            black_box(solver.run_iteration(&root).unwrap())
        })
    });
}

fn kuhn_1000_iterations_benchmark(c: &mut Criterion) {
    c.bench_function("kuhn_1000_iterations", |b| {
        b.iter(|| {
            let mut dealer = KuhnDealer::new(2, 42);
            minimize(black_box(1000), 2, || dealer.deal()).unwrap()
        })
    });
}

fn kuhn_three_player_benchmark(c: &mut Criterion) {
    c.bench_function("kuhn_3p_1000_iterations", |b| {
        b.iter(|| {
            let mut dealer = KuhnDealer::new(3, 42);
            minimize(black_box(1000), 3, || dealer.deal()).unwrap()
        })
    });
}

criterion_group!(
    benches,
    kuhn_iteration_benchmark,
    kuhn_1000_iterations_benchmark,
    kuhn_three_player_benchmark
);
criterion_main!(benches);
