//! Contiguous placement (first-fit and best-fit)
//!
//! Both policies scan the free-segment list and carve the request from the
//! front of a single segment. They differ only in which segment they pick.

use crate::core::allocator::{free_segments, FreeSegment, Placement};
use crate::core::storage::BlockSlot;
use rand::Rng;

/// Segment selection rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// First segment in scan order that is long enough
    First,
    /// Shortest segment that is long enough, earliest on ties
    Best,
}

/// Contiguous extent placement
#[derive(Debug, Clone, Copy)]
pub struct ExtentPlacement {
    fit: Fit,
}

impl ExtentPlacement {
    pub fn new(fit: Fit) -> Self {
        ExtentPlacement { fit }
    }

    /// Pick a segment that can hold `blocks_needed` blocks
    pub fn select(&self, segments: &[FreeSegment], blocks_needed: usize) -> Option<FreeSegment> {
        let mut candidates = segments
            .iter()
            .copied()
            .filter(|seg| seg.length >= blocks_needed);

        match self.fit {
            Fit::First => candidates.next(),
            // Strict comparison keeps the earliest segment among equal lengths
            Fit::Best => candidates.fold(None, |best: Option<FreeSegment>, seg| match best {
                Some(b) if b.length <= seg.length => Some(b),
                _ => Some(seg),
            }),
        }
    }
}

impl Placement for ExtentPlacement {
    fn place<R: Rng + ?Sized>(
        &self,
        blocks: &[BlockSlot],
        blocks_needed: usize,
        _rng: &mut R,
    ) -> Option<Vec<usize>> {
        let segments = free_segments(blocks);
        self.select(&segments, blocks_needed)
            .map(|seg| seg.take_front(blocks_needed))
    }
}
