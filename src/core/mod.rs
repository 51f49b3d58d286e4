pub mod allocator;
pub mod config;
pub mod defrag;
pub mod error;
pub mod fragment;
pub mod history;
pub mod scenario;
pub mod stats;
pub mod storage;
