//! Compaction pass
//!
//! Files are laid out back to back from block 0, ordered by name so that
//! repeated runs over identical input give identical layouts. Everything
//! after the last file is one free run.

use crate::core::error::{Result, SimError};
use crate::core::storage::{FileRecord, Storage};
use serde::Serialize;
use tracing::{debug, warn};

/// What a compaction pass did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefragReport {
    /// Files whose block list changed
    pub files_moved: usize,
    /// Block list entries that now point at a different index
    pub blocks_moved: usize,
    /// Blocks that could not be placed before the end of the array
    pub dropped_blocks: usize,
}

impl DefragReport {
    pub fn is_lossless(&self) -> bool {
        self.dropped_blocks == 0
    }
}

/// Compact every file into one contiguous run, returning the new snapshot
/// and a report of the moves
pub fn defragment_with_report(storage: &Storage) -> (Storage, DefragReport) {
    let total = storage.total_blocks();
    let mut next = storage.clone();
    next.blocks = vec![None; total];

    let mut ordered: Vec<&FileRecord> = storage.files().collect();
    ordered.sort_by(|a, b| a.name().cmp(b.name()));

    let mut report = DefragReport::default();
    let mut cursor = 0usize;

    for file in ordered {
        let wanted = file.block_count();
        let end = (cursor + wanted).min(total);
        let placed: Vec<usize> = (cursor..end).collect();

        for &idx in &placed {
            next.blocks[idx] = Some(file.id());
        }

        let mut size_kb = file.size_kb();
        if placed.len() < wanted {
            // Record keeps only what survived
            size_kb = placed.len() as u64 * storage.block_size_kb();
            let dropped = wanted - placed.len();
            warn!(
                "Defragment dropped {} blocks of {} '{}': block array exhausted",
                dropped,
                file.id(),
                file.name()
            );
            report.dropped_blocks += dropped;
        }

        let moved = file
            .blocks()
            .iter()
            .zip(&placed)
            .filter(|(old, new)| old != new)
            .count();
        if moved > 0 || placed.len() != wanted {
            report.files_moved += 1;
        }
        report.blocks_moved += moved;

        next.files
            .insert(file.id(), file.with_blocks(size_kb, placed));
        cursor = end;
    }

    debug!(
        "Defragment moved {} blocks across {} files",
        report.blocks_moved, report.files_moved
    );
    (next, report)
}

/// Compact every file into one contiguous run
///
/// Files are ordered by comparing their names byte by byte, so uppercase
/// names sort before lowercase ones; equal names keep creation order.
///
/// A file that would run past the end of the array is truncated to the
/// blocks that fit, its size shrinks to match, and the loss is logged; use
/// [`defragment_checked`] to reject that instead.
pub fn defragment(storage: &Storage) -> Storage {
    defragment_with_report(storage).0
}

/// Like [`defragment`], but fails with `DefragmentTruncated` instead of
/// dropping blocks
pub fn defragment_checked(storage: &Storage) -> Result<Storage> {
    let (next, report) = defragment_with_report(storage);
    if !report.is_lossless() {
        return Err(SimError::DefragmentTruncated {
            dropped: report.dropped_blocks,
        });
    }
    Ok(next)
}
