//! Simulator configuration
//!
//! Loaded from TOML. Every field has a default matching the classic layout
//! of 256 blocks of 4 KB:
//!
//! ```toml
//! block_size_kb = 4
//! total_blocks = 256
//! default_strategy = "best-fit"
//! seed = 7
//! ```

use crate::core::allocator::Strategy;
use crate::core::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Upper bound on the block array length
pub const MAX_TOTAL_BLOCKS: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Size of one block in kilobytes
    #[validate(range(min = 1))]
    pub block_size_kb: u64,

    /// Number of blocks in the array
    #[validate(range(min = 1, max = 1048576))]
    pub total_blocks: usize,

    /// Strategy used when a create request does not name one
    pub default_strategy: Strategy,

    /// Seed for random placement; entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            block_size_kb: 4,
            total_blocks: 256,
            default_strategy: Strategy::FirstFit,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: SimulatorConfig = toml::from_str(s)?;
        config.check()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate field ranges
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| SimError::InvalidConfig(e.to_string()))
    }
}
