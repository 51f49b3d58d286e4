//! # Blockfrag - Block Storage Fragmentation Simulator
//!
//! `blockfrag` models a fixed array of logical storage blocks, places files on
//! it under a chosen allocation policy, and measures how fragmented the layout
//! becomes:
//!
//! - **Allocation policies**: first-fit, best-fit, random scatter
//! - **Fragment tracking**: every file knows its contiguous runs
//! - **Statistics**: fragmentation percent, largest free run, access cost
//! - **Defragmentation**: compact all files into name-ordered contiguous runs
//! - **Timeline**: append-only fragmentation history
//!
//! ## Quick Start
//!
//! ```rust
//! use blockfrag::{Simulator, SimulatorConfig, Result};
//!
//! # fn main() -> Result<()> {
//! let mut sim = Simulator::new(SimulatorConfig::default())?;
//!
//! let report = sim.create_file("report.log", 32)?;
//! sim.resize_file(report, 64)?;
//!
//! let stats = sim.stats();
//! println!("{:.1}% fragmented", stats.fragmentation_percent);
//!
//! sim.defragment()?;
//! assert_eq!(sim.stats().fragmentation_percent, 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Layout
//!
//! ```rust
//! use blockfrag::{SimulatorBuilder, Strategy, Result};
//!
//! # fn main() -> Result<()> {
//! let mut sim = SimulatorBuilder::new()
//!     .block_size_kb(8)
//!     .total_blocks(128)
//!     .strategy(Strategy::BestFit)
//!     .seed(42)
//!     .build()?;
//!
//! sim.create_file("db.sqlite", 256)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Snapshots
//!
//! The core is a set of pure functions over [`Storage`] values. Each mutator
//! borrows the current snapshot and returns a new one, so the lower-level API
//! can be driven directly:
//!
//! ```rust
//! use blockfrag::{compute_stats, create_initial_storage, defragment, Strategy};
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let storage = create_initial_storage(4, 64);
//! let (storage, _id) = storage.create_file("a", 40, Strategy::Random, &mut rng).unwrap();
//! let compacted = defragment(&storage);
//! assert_eq!(compute_stats(&compacted).largest_contiguous_free_block, 54);
//! ```

pub mod core;

pub use crate::core::{
    allocator::{allocate_file_blocks, free_segments, FreeSegment, Strategy},
    config::SimulatorConfig,
    defrag::{defragment, defragment_checked, defragment_with_report, DefragReport},
    error::{Result, SimError},
    fragment::{compute_fragments, Fragment},
    history::{FragmentationHistory, HistorySample},
    scenario::{Operation, Scenario, ScenarioReport},
    stats::{compute_stats, Stats},
    storage::{create_initial_storage, BlockSlot, FileId, FileRecord, Storage, PALETTE},
};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// Owner of the live storage snapshot and its fragmentation history
///
/// Every successful mutation replaces the snapshot and appends one history
/// sample. A failed mutation leaves both untouched.
pub struct Simulator {
    config: SimulatorConfig,
    storage: Storage,
    history: FragmentationHistory,
    rng: StdRng,
}

impl Simulator {
    /// Create a simulator with an empty block array
    pub fn new(config: SimulatorConfig) -> Result<Self> {
        config.check()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(
            "Simulator with {} blocks of {}KB ({})",
            config.total_blocks, config.block_size_kb, config.default_strategy
        );

        Ok(Simulator {
            storage: create_initial_storage(config.block_size_kb, config.total_blocks),
            history: FragmentationHistory::new(),
            config,
            rng,
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Current snapshot
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn history(&self) -> &FragmentationHistory {
        &self.history
    }

    /// Metrics of the current snapshot
    pub fn stats(&self) -> Stats {
        compute_stats(&self.storage)
    }

    /// Recompute metrics without recording a history sample
    pub fn analyze(&self) -> Stats {
        let stats = self.stats();
        debug!(
            "Analyze: {:.1}% fragmented, largest free run {}",
            stats.fragmentation_percent, stats.largest_contiguous_free_block
        );
        stats
    }

    /// Create a file with the configured default strategy
    pub fn create_file(&mut self, name: impl Into<String>, size_kb: u64) -> Result<FileId> {
        let strategy = self.config.default_strategy;
        self.create_file_with(name, size_kb, strategy)
    }

    /// Create a file with an explicit strategy
    pub fn create_file_with(
        &mut self,
        name: impl Into<String>,
        size_kb: u64,
        strategy: Strategy,
    ) -> Result<FileId> {
        let name = name.into();
        let (next, id) = self
            .storage
            .create_file(name.as_str(), size_kb, strategy, &mut self.rng)?;

        info!("Created {} '{}' ({}KB, {})", id, name, size_kb, strategy);
        self.commit(next);
        Ok(id)
    }

    /// Delete a file and free its blocks
    pub fn delete_file(&mut self, id: FileId) -> Result<()> {
        let next = self.storage.delete_file(id)?;

        info!("Deleted {}", id);
        self.commit(next);
        Ok(())
    }

    /// Resize a file; returns `false` when the block count is unchanged
    pub fn resize_file(&mut self, id: FileId, new_size_kb: u64) -> Result<bool> {
        match self.storage.resize_file(id, new_size_kb, &mut self.rng)? {
            Some(next) => {
                info!("Resized {} to {}KB", id, new_size_kb);
                self.commit(next);
                Ok(true)
            }
            None => {
                debug!("Resize of {} to {}KB is a no-op", id, new_size_kb);
                Ok(false)
            }
        }
    }

    /// Compacted layout and its metrics, without replacing the live snapshot
    pub fn preview_defragment(&self) -> (Storage, Stats) {
        let preview = defragment(&self.storage);
        let stats = compute_stats(&preview);
        (preview, stats)
    }

    /// Compact every file and make the result the live snapshot
    ///
    /// Refuses with `DefragmentTruncated` rather than dropping blocks.
    pub fn defragment(&mut self) -> Result<DefragReport> {
        let (next, report) = defragment_with_report(&self.storage);
        if !report.is_lossless() {
            return Err(SimError::DefragmentTruncated {
                dropped: report.dropped_blocks,
            });
        }

        info!(
            "Defragmented: {} blocks moved across {} files",
            report.blocks_moved, report.files_moved
        );
        self.commit(next);
        Ok(report)
    }

    fn commit(&mut self, next: Storage) {
        self.storage = next;
        let stats = compute_stats(&self.storage);
        self.history.record(&stats);
    }
}

/// Builder for customizing a Simulator
///
/// # Examples
///
/// ```rust
/// use blockfrag::SimulatorBuilder;
///
/// let sim = SimulatorBuilder::new().total_blocks(64).seed(7).build().unwrap();
/// assert_eq!(sim.storage().total_blocks(), 64);
/// ```
pub struct SimulatorBuilder {
    config: SimulatorConfig,
}

impl SimulatorBuilder {
    /// Create a new SimulatorBuilder with default settings
    pub fn new() -> Self {
        SimulatorBuilder {
            config: SimulatorConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: SimulatorConfig) -> Self {
        SimulatorBuilder { config }
    }

    pub fn block_size_kb(mut self, block_size_kb: u64) -> Self {
        self.config.block_size_kb = block_size_kb;
        self
    }

    pub fn total_blocks(mut self, total_blocks: usize) -> Self {
        self.config.total_blocks = total_blocks;
        self
    }

    /// Default strategy for `create_file`
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.default_strategy = strategy;
        self
    }

    /// Seed random placement for reproducible runs
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Simulator> {
        Simulator::new(self.config)
    }
}

impl Default for SimulatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(total_blocks: usize) -> Simulator {
        SimulatorBuilder::new()
            .total_blocks(total_blocks)
            .seed(0xF7A6)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let sim = SimulatorBuilder::new().build().unwrap();
        assert_eq!(sim.storage().total_blocks(), 256);
        assert_eq!(sim.storage().block_size_kb(), 4);
        assert!(sim.history().is_empty());
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = SimulatorBuilder::new().block_size_kb(0).build();
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_mutations_record_history() {
        let mut sim = seeded(32);
        let a = sim.create_file("a", 16).unwrap();
        sim.create_file("b", 8).unwrap();
        assert!(sim.resize_file(a, 20).unwrap());
        sim.delete_file(a).unwrap();
        sim.defragment().unwrap();

        assert_eq!(sim.history().len(), 5);
        assert_eq!(sim.history().latest().unwrap().fragmentation_percent, 0.0);
    }

    #[test]
    fn test_failures_leave_state_and_history_alone() {
        let mut sim = seeded(8);
        let a = sim.create_file("a", 16).unwrap();
        let before = sim.storage().clone();

        assert!(matches!(
            sim.create_file("huge", 64),
            Err(SimError::AllocationFailed { .. })
        ));
        assert!(matches!(
            sim.delete_file(FileId(77)),
            Err(SimError::UnknownFile(_))
        ));
        assert!(matches!(
            sim.resize_file(a, 400),
            Err(SimError::AllocationFailed { .. })
        ));
        assert!(!sim.resize_file(a, 13).unwrap());

        assert_eq!(sim.storage(), &before);
        assert_eq!(sim.history().len(), 1);
    }

    #[test]
    fn test_analyze_and_preview_do_not_mutate() {
        let mut sim = seeded(64);
        sim.create_file_with("z", 40, Strategy::Random).unwrap();
        sim.create_file_with("y", 40, Strategy::Random).unwrap();
        let before = sim.storage().clone();

        let _ = sim.analyze();
        let (preview, preview_stats) = sim.preview_defragment();

        assert_eq!(sim.storage(), &before);
        assert_eq!(sim.history().len(), 2);
        assert_eq!(preview_stats.fragmentation_percent, 0.0);
        assert_eq!(preview.file_by_name("y").unwrap().blocks()[0], 0);
    }

    #[test]
    fn test_default_strategy_is_used() {
        let mut sim = SimulatorBuilder::new()
            .total_blocks(30)
            .strategy(Strategy::BestFit)
            .seed(1)
            .build()
            .unwrap();

        // Carve free segments [0,4), [10,12), [20,30)
        let a = sim.create_file("a", 16).unwrap();
        sim.create_file("b", 24).unwrap();
        let c = sim.create_file("c", 8).unwrap();
        sim.create_file("d", 32).unwrap();
        sim.delete_file(a).unwrap();
        sim.delete_file(c).unwrap();

        let e = sim.create_file("e", 8).unwrap();
        assert_eq!(sim.storage().file(e).unwrap().blocks(), &[10, 11]);
    }
}
