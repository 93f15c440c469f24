//! Storage Module
//!
//! Persistent storage layer using an SSTable-like format.
//!
//! ## Responsibilities
//! - Persist flushed memtables to disk in sorted format
//! - Point lookups (newest table wins)
//! - Full ordered scans merged across tables
//! - Compaction of many tables into one
//!
//! ## File Layout
//! ```text
//! {data_dir}/sstables/
//!   ├── sstable_000001.sst   (oldest)
//!   ├── sstable_000002.sst
//!   └── sstable_00000N.sst   (newest)
//! ```

mod sstable;
mod manager;

pub use sstable::{SSTable, SSTableBuilder, SSTableIterator, SSTableReader};
pub use manager::StorageManager;
