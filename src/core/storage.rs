//! Storage model: the block array and the file records placed on it
//!
//! A `Storage` value is a snapshot. Every mutator borrows the current
//! snapshot and returns a freshly owned one; the input is never touched, so a
//! failed operation leaves the caller's state exactly as it was.
//!
//! # Invariants
//!
//! - `blocks.len() == total_blocks`
//! - a slot holding `id` appears exactly once in that file's block list
//! - every index in a file's block list points at a slot holding its id
//! - `fragments` is always `compute_fragments(blocks)`

use crate::core::allocator::{allocate_file_blocks, Strategy};
use crate::core::error::{Result, SimError};
use crate::core::fragment::{compute_fragments, Fragment};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Display colours handed out in creation order
pub const PALETTE: [&str; 8] = [
    "#64b5f6", "#f06292", "#4db6ac", "#ba68c8", "#ffb74d", "#81c784", "#9575cd", "#e57373",
];

/// One block slot: empty, or owned by a file
pub type BlockSlot = Option<FileId>;

/// File identifier, unique within a storage and immutable after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file-{}", self.0)
    }
}

/// A file placed on the block array
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    id: FileId,
    name: String,
    size_kb: u64,
    /// Insertion-ordered block indices
    blocks: Vec<usize>,
    fragments: Vec<Fragment>,
    color: &'static str,
}

impl FileRecord {
    pub(crate) fn new(
        id: FileId,
        name: String,
        size_kb: u64,
        blocks: Vec<usize>,
        color: &'static str,
    ) -> Self {
        let fragments = compute_fragments(&blocks);
        FileRecord {
            id,
            name,
            size_kb,
            blocks,
            fragments,
            color,
        }
    }

    /// Same file with a new size and block list; fragments are recomputed
    pub(crate) fn with_blocks(&self, size_kb: u64, blocks: Vec<usize>) -> Self {
        FileRecord::new(self.id, self.name.clone(), size_kb, blocks, self.color)
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_kb(&self) -> u64 {
        self.size_kb
    }

    pub fn blocks(&self) -> &[usize] {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn color(&self) -> &'static str {
        self.color
    }

    /// True when the file is split into more than one run
    pub fn is_fragmented(&self) -> bool {
        self.fragments.len() > 1
    }

    /// Index of the fragment that holds `block`, if the file owns it
    pub fn fragment_of(&self, block: usize) -> Option<usize> {
        self.fragments.iter().position(|frag| frag.contains(block))
    }
}

/// Fixed-size array of logical blocks plus the files placed on it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Storage {
    pub(crate) block_size_kb: u64,
    pub(crate) total_blocks: usize,
    pub(crate) blocks: Vec<BlockSlot>,
    pub(crate) files: BTreeMap<FileId, FileRecord>,
    #[serde(skip)]
    pub(crate) next_id: u64,
}

/// Create an empty storage with every block free
pub fn create_initial_storage(block_size_kb: u64, total_blocks: usize) -> Storage {
    Storage::new(block_size_kb, total_blocks)
}

impl Storage {
    pub fn new(block_size_kb: u64, total_blocks: usize) -> Self {
        Storage {
            block_size_kb,
            total_blocks,
            blocks: vec![None; total_blocks],
            files: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn block_size_kb(&self) -> u64 {
        self.block_size_kb
    }

    pub fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    pub fn capacity_kb(&self) -> u64 {
        (self.total_blocks as u64).saturating_mul(self.block_size_kb)
    }

    pub fn blocks(&self) -> &[BlockSlot] {
        &self.blocks
    }

    #[cfg(test)]
    pub(crate) fn blocks_mut(&mut self) -> &mut [BlockSlot] {
        &mut self.blocks
    }

    /// Files in creation order
    pub fn files(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    pub fn file(&self, id: FileId) -> Option<&FileRecord> {
        self.files.get(&id)
    }

    /// First file (in creation order) with the given name
    pub fn file_by_name(&self, name: &str) -> Option<&FileRecord> {
        self.files.values().find(|f| f.name == name)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// File that owns `block`, if any
    pub fn owner_of(&self, block: usize) -> Option<&FileRecord> {
        self.blocks
            .get(block)
            .copied()
            .flatten()
            .and_then(|id| self.files.get(&id))
    }

    pub fn used_block_count(&self) -> usize {
        self.blocks.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn free_block_count(&self) -> usize {
        self.total_blocks - self.used_block_count()
    }

    /// Number of blocks needed to hold `size_kb` (rounded up)
    pub fn blocks_for_size(&self, size_kb: u64) -> usize {
        size_kb.div_ceil(self.block_size_kb) as usize
    }

    /// Place a new file and return the resulting snapshot with its id
    ///
    /// Fails with `AllocationFailed` when `strategy` cannot find room.
    pub fn create_file<R: Rng + ?Sized>(
        &self,
        name: impl Into<String>,
        size_kb: u64,
        strategy: Strategy,
        rng: &mut R,
    ) -> Result<(Storage, FileId)> {
        let name = name.into();
        let blocks_needed = self.blocks_for_size(size_kb);
        let allocated = allocate_file_blocks(self, blocks_needed, strategy, rng)?;

        let mut next = self.clone();
        let id = FileId(next.next_id);
        next.next_id += 1;

        for &idx in &allocated {
            next.blocks[idx] = Some(id);
        }

        let color = PALETTE[self.files.len() % PALETTE.len()];
        debug!("Created {} '{}' with {} blocks", id, name, allocated.len());
        next.files
            .insert(id, FileRecord::new(id, name, size_kb, allocated, color));

        Ok((next, id))
    }

    /// Free every block of `id` and drop its record
    pub fn delete_file(&self, id: FileId) -> Result<Storage> {
        if !self.files.contains_key(&id) {
            return Err(SimError::UnknownFile(id));
        }

        let mut next = self.clone();
        for slot in next.blocks.iter_mut() {
            if *slot == Some(id) {
                *slot = None;
            }
        }
        next.files.remove(&id);

        debug!("Deleted {}", id);
        Ok(next)
    }

    /// Grow or shrink a file to `new_size_kb`
    ///
    /// Returns `Ok(None)` when the block count does not change. Shrinking drops
    /// the trailing entries of the block list wherever they sit on the array.
    /// Growing always uses random placement; if the extra blocks cannot be
    /// found the whole resize fails.
    pub fn resize_file<R: Rng + ?Sized>(
        &self,
        id: FileId,
        new_size_kb: u64,
        rng: &mut R,
    ) -> Result<Option<Storage>> {
        let file = self.files.get(&id).ok_or(SimError::UnknownFile(id))?;
        let current = file.block_count();
        let wanted = self.blocks_for_size(new_size_kb);

        if wanted == current {
            return Ok(None);
        }

        let mut next = self.clone();
        let updated = if wanted < current {
            let kept = file.blocks[..wanted].to_vec();
            for &idx in &file.blocks[wanted..] {
                next.blocks[idx] = None;
            }
            debug!("Shrunk {} from {} to {} blocks", id, current, wanted);
            file.with_blocks(new_size_kb, kept)
        } else {
            let extra = allocate_file_blocks(self, wanted - current, Strategy::Random, rng)?;
            for &idx in &extra {
                next.blocks[idx] = Some(id);
            }
            let mut grown = file.blocks.clone();
            grown.extend(extra);
            debug!("Grew {} from {} to {} blocks", id, current, wanted);
            file.with_blocks(new_size_kb, grown)
        };

        next.files.insert(id, updated);
        Ok(Some(next))
    }

    /// Check the block array and file records against each other
    pub fn verify(&self) -> Result<()> {
        if self.blocks.len() != self.total_blocks {
            return Err(SimError::InconsistentStorage(format!(
                "block array has {} slots, expected {}",
                self.blocks.len(),
                self.total_blocks
            )));
        }

        for (idx, slot) in self.blocks.iter().enumerate() {
            if let Some(id) = slot {
                let owned = self
                    .files
                    .get(id)
                    .map(|f| f.blocks.contains(&idx))
                    .unwrap_or(false);
                if !owned {
                    return Err(SimError::InconsistentStorage(format!(
                        "block {} holds {} but no such file lists it",
                        idx, id
                    )));
                }
            }
        }

        for file in self.files.values() {
            for &idx in &file.blocks {
                if self.blocks.get(idx).copied().flatten() != Some(file.id) {
                    return Err(SimError::InconsistentStorage(format!(
                        "{} lists block {} which it does not hold",
                        file.id, idx
                    )));
                }
            }

            let held = self.blocks.iter().filter(|s| **s == Some(file.id)).count();
            if held != file.blocks.len() {
                return Err(SimError::InconsistentStorage(format!(
                    "{} lists {} blocks but holds {}",
                    file.id,
                    file.blocks.len(),
                    held
                )));
            }

            let expected = self.blocks_for_size(file.size_kb);
            if expected != file.blocks.len() {
                return Err(SimError::InconsistentStorage(format!(
                    "{} is {}KB ({} blocks) but lists {}",
                    file.id,
                    file.size_kb,
                    expected,
                    file.blocks.len()
                )));
            }

            if file.fragments != compute_fragments(&file.blocks) {
                return Err(SimError::InconsistentStorage(format!(
                    "{} has stale fragments",
                    file.id
                )));
            }
        }

        Ok(())
    }
}
