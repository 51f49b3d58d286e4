//! Contiguous-run fragments
//!
//! A file's blocks are an unordered bag of indices. Fragments are the maximal
//! runs of consecutive indices inside that bag, reported in ascending order.

use serde::{Deserialize, Serialize};

/// A maximal run of consecutive blocks belonging to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fragment {
    /// First block index of the run
    pub start: usize,
    /// Number of consecutive blocks
    pub length: usize,
}

impl Fragment {
    pub fn new(start: usize, length: usize) -> Self {
        Fragment { start, length }
    }

    /// One past the last block index
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Check if this fragment covers a block index
    pub fn contains(&self, block: usize) -> bool {
        block >= self.start && block < self.end()
    }

    /// Iterate over every block index in the run
    pub fn blocks(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }
}

/// Split a bag of block indices into ascending, disjoint fragments
///
/// Duplicated indices are not filtered; callers must never hand in the same
/// block twice.
pub fn compute_fragments(block_indices: &[usize]) -> Vec<Fragment> {
    if block_indices.is_empty() {
        return Vec::new();
    }

    let mut sorted = block_indices.to_vec();
    sorted.sort_unstable();

    let mut fragments = Vec::new();
    let mut start = sorted[0];
    let mut prev = sorted[0];

    for &block in &sorted[1..] {
        if block == prev + 1 {
            prev = block;
        } else {
            fragments.push(Fragment::new(start, prev - start + 1));
            start = block;
            prev = block;
        }
    }
    fragments.push(Fragment::new(start, prev - start + 1));

    fragments
}
