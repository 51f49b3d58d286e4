//! Aggregate fragmentation metrics
//!
//! `Stats` is derived from a `Storage` snapshot and never stored alongside it.

use crate::core::fragment::compute_fragments;
use crate::core::storage::Storage;
use serde::Serialize;

/// Metrics computed from a storage snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total_blocks: usize,
    pub used_blocks: usize,
    pub free_blocks: usize,
    /// Share of used blocks that belong to a file with more than one fragment (0-100)
    pub fragmentation_percent: f64,
    /// Longest run of consecutive empty blocks
    pub largest_contiguous_free_block: usize,
    /// Mean fragment count per file, 1.0 with no files
    pub simulated_access_cost: f64,
}

impl Stats {
    /// Used blocks as a percentage of capacity
    pub fn used_percent(&self) -> f64 {
        if self.total_blocks == 0 {
            return 0.0;
        }
        self.used_blocks as f64 / self.total_blocks as f64 * 100.0
    }

    /// Largest free run as a percentage of capacity
    pub fn largest_free_percent(&self) -> f64 {
        if self.total_blocks == 0 {
            return 0.0;
        }
        self.largest_contiguous_free_block as f64 / self.total_blocks as f64 * 100.0
    }
}

/// Compute aggregate metrics for a snapshot
///
/// Fragments are recomputed from each file's block list rather than read
/// from the cached field.
pub fn compute_stats(storage: &Storage) -> Stats {
    let used_blocks = storage.used_block_count();
    let free_blocks = storage.total_blocks() - used_blocks;

    let mut fragmented_blocks = 0usize;
    let mut total_fragments = 0usize;
    for file in storage.files() {
        let fragment_count = compute_fragments(file.blocks()).len();
        if fragment_count > 1 {
            fragmented_blocks += file.block_count();
        }
        total_fragments += fragment_count;
    }

    let fragmentation_percent = if used_blocks == 0 {
        0.0
    } else {
        fragmented_blocks as f64 / used_blocks as f64 * 100.0
    };

    let simulated_access_cost = match storage.file_count() {
        0 => 1.0,
        n => total_fragments as f64 / n as f64,
    };

    Stats {
        total_blocks: storage.total_blocks(),
        used_blocks,
        free_blocks,
        fragmentation_percent,
        largest_contiguous_free_block: largest_free_run(storage),
        simulated_access_cost,
    }
}

fn largest_free_run(storage: &Storage) -> usize {
    let mut max_free = 0;
    let mut current = 0;
    for slot in storage.blocks() {
        if slot.is_none() {
            current += 1;
            max_free = max_free.max(current);
        } else {
            current = 0;
        }
    }
    max_free
}
