//! Configuration for Enrollkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{EnrollError, Result};

/// Main configuration for an Enrollkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files (WAL, SSTables, etc.)
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── wal.log          (write-ahead log)
    ///     └── sstables/        (SSTable files)
    pub data_dir: PathBuf,

    /// Merge all SSTables into one once this many exist
    pub compaction_trigger: usize,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,

    // -------------------------------------------------------------------------
    // MemTable Configuration
    // -------------------------------------------------------------------------
    /// Max size of memtable before flush (in bytes)
    pub memtable_size_limit: usize,

    // -------------------------------------------------------------------------
    // Record Store Configuration
    // -------------------------------------------------------------------------
    /// Largest record key accepted by the store (in bytes)
    pub max_key_size: usize,

    /// Largest encoded record accepted by the store (in bytes)
    pub max_value_size: usize,

    /// Reject enrollment dates that are not `YYYY-MM-DD`
    pub validate_enrollment_date: bool,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries
    ///
    /// Best-effort: a hard kill can lose up to `count - 1` acknowledged
    /// writes. Only a clean drop or `close` syncs the remainder.
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./enrollkv_data"),
            compaction_trigger: 8,
            wal_sync_strategy: WalSyncStrategy::EveryNEntries { count: 100 },
            memtable_size_limit: 4 * 1024 * 1024, // 4 MB
            max_key_size: 44,
            max_value_size: 1024,
            validate_enrollment_date: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that every limit is usable
    pub fn validate(&self) -> Result<()> {
        if self.memtable_size_limit == 0 {
            return Err(EnrollError::Config("memtable_size_limit must be > 0".to_string()));
        }
        if self.max_key_size == 0 || self.max_value_size == 0 {
            return Err(EnrollError::Config(
                "max_key_size and max_value_size must be > 0".to_string(),
            ));
        }
        if self.compaction_trigger < 2 {
            return Err(EnrollError::Config("compaction_trigger must be >= 2".to_string()));
        }
        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(EnrollError::Config("WAL sync count must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the memtable size limit (in bytes)
    pub fn memtable_size_limit(mut self, size: usize) -> Self {
        self.config.memtable_size_limit = size;
        self
    }

    /// Set the SSTable count that triggers compaction
    pub fn compaction_trigger(mut self, count: usize) -> Self {
        self.config.compaction_trigger = count;
        self
    }

    /// Set the maximum key size (in bytes)
    pub fn max_key_size(mut self, size: usize) -> Self {
        self.config.max_key_size = size;
        self
    }

    /// Set the maximum encoded record size (in bytes)
    pub fn max_value_size(mut self, size: usize) -> Self {
        self.config.max_value_size = size;
        self
    }

    /// Enable or disable enrollment date format checks
    pub fn validate_enrollment_date(mut self, enabled: bool) -> Self {
        self.config.validate_enrollment_date = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
