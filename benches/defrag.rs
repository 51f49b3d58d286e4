use blockfrag::{compute_stats, create_initial_storage, defragment, Storage, Strategy};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn scattered(total_blocks: usize) -> Storage {
    let mut rng = StdRng::seed_from_u64(7);
    let mut storage = create_initial_storage(4, total_blocks);
    let file_count = total_blocks / 16;
    for i in 0..file_count {
        storage = storage
            .create_file(format!("f{:05}", file_count - i), 32, Strategy::Random, &mut rng)
            .unwrap()
            .0;
    }
    storage
}

fn bench_defragment(c: &mut Criterion) {
    let mut group = c.benchmark_group("defragment");

    for size in [256usize, 1024, 4096].iter() {
        let storage = scattered(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &storage, |b, storage| {
            b.iter(|| black_box(defragment(storage)));
        });
    }

    group.finish();
}

fn bench_compute_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_stats");

    for size in [256usize, 1024, 4096].iter() {
        let storage = scattered(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &storage, |b, storage| {
            b.iter(|| black_box(compute_stats(storage)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_defragment, bench_compute_stats);
criterion_main!(benches);
