//! Allocation policy integration tests
//!
//! Exercises the three strategies through the public snapshot API

use blockfrag::{
    allocate_file_blocks, compute_stats, create_initial_storage, free_segments, FreeSegment,
    SimError, Storage, Strategy,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// 30 blocks with free segments {0,4}, {10,2}, {20,10}
fn segmented() -> Storage {
    let mut rng = StdRng::seed_from_u64(0);
    let storage = create_initial_storage(4, 30);
    let (storage, a) = storage
        .create_file("a", 16, Strategy::FirstFit, &mut rng)
        .unwrap();
    let (storage, _) = storage
        .create_file("b", 24, Strategy::FirstFit, &mut rng)
        .unwrap();
    let (storage, c) = storage
        .create_file("c", 8, Strategy::FirstFit, &mut rng)
        .unwrap();
    let (storage, _) = storage
        .create_file("d", 32, Strategy::FirstFit, &mut rng)
        .unwrap();
    storage.delete_file(a).unwrap().delete_file(c).unwrap()
}

#[test]
fn test_segment_layout() {
    assert_eq!(
        free_segments(segmented().blocks()),
        vec![
            FreeSegment::new(0, 4),
            FreeSegment::new(10, 2),
            FreeSegment::new(20, 10)
        ]
    );
}

#[test]
fn test_first_fit_two_blocks() {
    let mut rng = StdRng::seed_from_u64(1);
    let blocks = allocate_file_blocks(&segmented(), 2, Strategy::FirstFit, &mut rng).unwrap();
    assert_eq!(blocks, vec![0, 1]);
}

#[test]
fn test_best_fit_two_blocks() {
    let mut rng = StdRng::seed_from_u64(1);
    let blocks = allocate_file_blocks(&segmented(), 2, Strategy::BestFit, &mut rng).unwrap();
    assert_eq!(blocks, vec![10, 11]);
}

#[test]
fn test_more_than_free_always_fails() {
    let storage = segmented();
    let mut rng = StdRng::seed_from_u64(1);
    for strategy in Strategy::ALL {
        let result = allocate_file_blocks(&storage, 17, strategy, &mut rng);
        assert!(matches!(result, Err(SimError::AllocationFailed { .. })));
    }
}

#[test]
fn test_unknown_strategy_name() {
    assert!(matches!(
        "next-fit".parse::<Strategy>(),
        Err(SimError::UnknownStrategy(name)) if name == "next-fit"
    ));
}

#[test]
fn test_random_fragments_more_than_contiguous() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut contiguous = create_initial_storage(4, 256);
    let mut scattered = create_initial_storage(4, 256);

    for i in 0..12 {
        let name = format!("f{}", i);
        contiguous = contiguous
            .create_file(name.as_str(), 40, Strategy::FirstFit, &mut rng)
            .unwrap()
            .0;
        scattered = scattered
            .create_file(name.as_str(), 40, Strategy::Random, &mut rng)
            .unwrap()
            .0;
    }

    let contiguous_stats = compute_stats(&contiguous);
    let scattered_stats = compute_stats(&scattered);
    assert_eq!(contiguous_stats.fragmentation_percent, 0.0);
    assert!(scattered_stats.fragmentation_percent > 0.0);
    assert!(scattered_stats.simulated_access_cost > contiguous_stats.simulated_access_cost);
}

#[test]
fn test_seeded_random_runs_are_reproducible() {
    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut storage = create_initial_storage(4, 64);
        for i in 0..5 {
            storage = storage
                .create_file(format!("f{}", i), 20, Strategy::Random, &mut rng)
                .unwrap()
                .0;
        }
        storage
    };

    assert_eq!(run(77).blocks(), run(77).blocks());
}

#[test]
fn test_growth_uses_scatter_even_for_contiguous_files() {
    let mut rng = StdRng::seed_from_u64(3);
    let storage = create_initial_storage(4, 16);
    let (storage, a) = storage
        .create_file("a", 8, Strategy::BestFit, &mut rng)
        .unwrap();
    let (storage, _) = storage
        .create_file("b", 8, Strategy::BestFit, &mut rng)
        .unwrap();

    // a holds 0-1, b holds 2-3; growth cannot be contiguous with a
    let grown = storage.resize_file(a, 16, &mut rng).unwrap().unwrap();
    let file = grown.file(a).unwrap();
    assert_eq!(file.block_count(), 4);
    assert!(file.is_fragmented());
    grown.verify().unwrap();
}
