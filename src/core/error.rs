use crate::core::allocator::Strategy;
use crate::core::storage::FileId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Allocation failed: {strategy} could not place {requested} blocks ({free} free)")]
    AllocationFailed {
        strategy: Strategy,
        requested: usize,
        free: usize,
    },

    #[error("Unknown file: {0}")]
    UnknownFile(FileId),

    #[error("Unknown file name: {0}")]
    UnknownFileName(String),

    #[error("Unknown allocation strategy: {0} (expected first-fit, best-fit or random)")]
    UnknownStrategy(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Defragmentation truncated: {dropped} blocks did not fit in the block array")]
    DefragmentTruncated { dropped: usize },

    #[error("Inconsistent storage: {0}")]
    InconsistentStorage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
