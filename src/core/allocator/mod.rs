//! Block placement policies
//!
//! Allocation is a pure query over a block array snapshot:
//! - Extent placement (first-fit, best-fit): one contiguous free segment
//! - Scatter placement (random): any free blocks, no contiguity preference
//!
//! Nothing here writes to the block array. The caller installs the returned
//! indices into a new `Storage` value.

pub mod extent;
pub mod scatter;

use crate::core::error::{Result, SimError};
use crate::core::storage::{BlockSlot, Storage};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

pub use extent::{ExtentPlacement, Fit};
pub use scatter::ScatterPlacement;

/// Allocation policy, a closed set of three
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[default]
    #[serde(rename = "first-fit")]
    FirstFit,
    #[serde(rename = "best-fit")]
    BestFit,
    #[serde(rename = "random")]
    Random,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::FirstFit, Strategy::BestFit, Strategy::Random];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::FirstFit => "first-fit",
            Strategy::BestFit => "best-fit",
            Strategy::Random => "random",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first-fit" => Ok(Strategy::FirstFit),
            "best-fit" => Ok(Strategy::BestFit),
            "random" => Ok(Strategy::Random),
            other => Err(SimError::UnknownStrategy(other.to_string())),
        }
    }
}

/// A maximal run of consecutive empty blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreeSegment {
    pub start: usize,
    pub length: usize,
}

impl FreeSegment {
    pub fn new(start: usize, length: usize) -> Self {
        FreeSegment { start, length }
    }

    /// The lowest `count` block indices of the segment
    pub fn take_front(&self, count: usize) -> Vec<usize> {
        (self.start..self.start + count).collect()
    }
}

/// Scan the block array left to right and group empty slots into segments
pub fn free_segments(blocks: &[BlockSlot]) -> Vec<FreeSegment> {
    let mut segments = Vec::new();
    let mut current_start = 0;
    let mut current_len = 0;

    for (idx, slot) in blocks.iter().enumerate() {
        if slot.is_none() {
            if current_len == 0 {
                current_start = idx;
            }
            current_len += 1;
        } else if current_len > 0 {
            segments.push(FreeSegment::new(current_start, current_len));
            current_len = 0;
        }
    }
    if current_len > 0 {
        segments.push(FreeSegment::new(current_start, current_len));
    }

    segments
}

/// Indices of every empty slot, ascending
pub fn free_block_indices(blocks: &[BlockSlot]) -> Vec<usize> {
    blocks
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_none())
        .map(|(idx, _)| idx)
        .collect()
}

/// Block placement policy
///
/// Implementations return exactly `blocks_needed` distinct free indices or
/// `None`. They never return a partial set.
pub trait Placement {
    fn place<R: Rng + ?Sized>(
        &self,
        blocks: &[BlockSlot],
        blocks_needed: usize,
        rng: &mut R,
    ) -> Option<Vec<usize>>;
}

/// Select blocks for a new or growing file
///
/// Dispatches on `strategy` and fails with `AllocationFailed` when no
/// placement satisfies the request. `storage` is never modified.
pub fn allocate_file_blocks<R: Rng + ?Sized>(
    storage: &Storage,
    blocks_needed: usize,
    strategy: Strategy,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if blocks_needed == 0 {
        return Ok(Vec::new());
    }

    let blocks = storage.blocks();

    let placed = match strategy {
        Strategy::FirstFit => ExtentPlacement::new(Fit::First).place(blocks, blocks_needed, rng),
        Strategy::BestFit => ExtentPlacement::new(Fit::Best).place(blocks, blocks_needed, rng),
        Strategy::Random => ScatterPlacement.place(blocks, blocks_needed, rng),
    };

    match placed {
        Some(indices) => {
            debug!(
                "{} placed {} blocks starting at {:?}",
                strategy,
                blocks_needed,
                indices.first()
            );
            Ok(indices)
        }
        None => {
            let free = storage.free_block_count();
            warn!(
                "{} could not place {} blocks ({} free)",
                strategy, blocks_needed, free
            );
            Err(SimError::AllocationFailed {
                strategy,
                requested: blocks_needed,
                free,
            })
        }
    }
}
