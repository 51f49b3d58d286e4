//! Random scatter placement
//!
//! Ignores segment contiguity entirely: every free block is a candidate and
//! the request is filled by a uniform shuffle-and-take over the free set.
//! Used for the random strategy and for every file growth.

use crate::core::allocator::{free_block_indices, Placement};
use crate::core::storage::BlockSlot;
use rand::seq::SliceRandom;
use rand::Rng;

/// Uniform random placement over individual free blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct ScatterPlacement;

impl Placement for ScatterPlacement {
    fn place<R: Rng + ?Sized>(
        &self,
        blocks: &[BlockSlot],
        blocks_needed: usize,
        rng: &mut R,
    ) -> Option<Vec<usize>> {
        let mut free = free_block_indices(blocks);
        if free.len() < blocks_needed {
            return None;
        }

        free.shuffle(rng);
        free.truncate(blocks_needed);
        Some(free)
    }
}
