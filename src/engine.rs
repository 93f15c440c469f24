//! Engine Module
//!
//! The ordered, durable byte-keyed map that the record store sits on.
//!
//! ## Write Path
//! ```text
//! insert/remove ──► write_lock ──► WAL append ──► MemTable ──(full)──► SSTable
//!                                                                         │
//!                                        (compaction_trigger tables) ◄────┘
//! ```
//!
//! ## Read Path
//! MemTable first, then SSTables newest to oldest. A tombstone at any level
//! hides older values.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::config::{Config, WalSyncStrategy};
use crate::error::{EnrollError, Result};
use crate::memtable::{MemTable, MemTableEntry};
use crate::storage::StorageManager;
use crate::wal::{Operation, WalRecovery, WalWriter};

const WAL_FILENAME: &str = "wal.log";
const SSTABLE_DIR: &str = "sstables";

/// Durable ordered map from byte keys to byte values
///
/// ## Concurrency
///
/// - Writers (insert/remove/flush/compact) hold `write_lock` for the whole
///   operation, so reading the previous value and logging the change happen
///   as one step. Lock order: `write_lock` → `wal` → memtable → storage.
/// - `get` takes no engine lock. A flush publishes its SSTable before it
///   clears the memtable, so a key is always visible in one of the two.
/// - `scan` reads both layers under `write_lock`, so it never lands between
///   a flush writing its table and clearing the memtable.
pub struct Engine {
    config: Config,

    wal: Mutex<WalWriter>,

    /// Writes not yet flushed to an SSTable
    memtable: MemTable,

    storage: StorageManager,

    write_lock: Mutex<()>,
}

impl Engine {
    /// Open or create the engine under `config.data_dir`
    ///
    /// Any entries left in the WAL by a crash are replayed and flushed to an
    /// SSTable before the log is emptied, so the engine always starts with an
    /// empty memtable.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let storage = StorageManager::open(&config.data_dir.join(SSTABLE_DIR))?;
        let memtable = MemTable::new();
        let wal = Self::recover(
            &config.data_dir.join(WAL_FILENAME),
            config.wal_sync_strategy,
            &storage,
            &memtable,
        )?;

        tracing::info!(
            "Engine opened at {} ({} SSTables)",
            config.data_dir.display(),
            storage.sstable_count()
        );

        Ok(Self {
            config,
            wal: Mutex::new(wal),
            memtable,
            storage,
            write_lock: Mutex::new(()),
        })
    }

    /// Open with default settings under `path`
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.memtable.get(key) {
            Some(MemTableEntry::Value(value)) => Ok(Some(value)),
            Some(MemTableEntry::Tombstone) => Ok(None),
            None => self.storage.get(key),
        }
    }

    /// Insert or overwrite `key`, returning the value it replaced
    pub fn insert(&self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>> {
        self.write(Operation::Insert {
            key: key.to_vec(),
            value: value.to_vec(),
        })
    }

    /// Remove `key`, returning the value it held
    ///
    /// Removing an absent key logs nothing.
    pub fn remove(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.write(Operation::Remove { key: key.to_vec() })
    }

    /// Every live entry in ascending key order
    pub fn scan(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let _writer = Self::lock(&self.write_lock, "write")?;

        let mut merged: BTreeMap<Vec<u8>, Option<Vec<u8>>> = self.storage.scan()?;

        // Memtable entries are newer than anything on disk
        merged.extend(self.memtable.iter().into_iter().map(|(key, entry)| {
            let value = match entry {
                MemTableEntry::Value(v) => Some(v),
                MemTableEntry::Tombstone => None,
            };
            (key, value)
        }));

        Ok(merged
            .into_iter()
            .filter_map(|(key, value)| Some((key, value?)))
            .collect())
    }

    /// Write the memtable to an SSTable even if it is not full
    pub fn flush(&self) -> Result<()> {
        let _writer = Self::lock(&self.write_lock, "write")?;
        self.flush_locked()
    }

    /// Merge all SSTables into one, returning the live entry count
    pub fn compact(&self) -> Result<u64> {
        let _writer = Self::lock(&self.write_lock, "write")?;
        self.storage.compact()
    }

    /// Flush and fsync, then release the engine
    pub fn close(self) -> Result<()> {
        self.flush()?;
        Self::lock(&self.wal, "WAL")?.sync()?;
        tracing::info!("Engine closed at {}", self.config.data_dir.display());
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Replay the WAL at `path` into `memtable`, persist it, and hand back an
    /// empty log ready for appends
    fn recover(
        path: &Path,
        sync: WalSyncStrategy,
        storage: &StorageManager,
        memtable: &MemTable,
    ) -> Result<WalWriter> {
        if path.exists() {
            let (entries, report) = WalRecovery::recover(path)?;
            if report.entries_recovered > 0 || report.entries_corrupted > 0 {
                tracing::info!(
                    "WAL recovery: {} entries recovered, {} corrupted, last_lsn={}, truncated={}",
                    report.entries_recovered,
                    report.entries_corrupted,
                    report.last_lsn,
                    report.was_truncated
                );
            }

            for entry in entries {
                Self::apply(memtable, entry.operation);
            }

            if !memtable.is_empty() {
                tracing::info!("Flushing {} recovered entries", memtable.entry_count());
                storage.flush(memtable)?;
                memtable.clear();
            }
        }

        let mut wal = WalWriter::open(path, sync)?;
        wal.truncate()?;
        Ok(wal)
    }

    /// Log then apply one change, flushing if the memtable fills up
    fn write(&self, operation: Operation) -> Result<Option<Vec<u8>>> {
        let _writer = Self::lock(&self.write_lock, "write")?;

        let previous = self.get(operation.key())?;
        if previous.is_none() && matches!(operation, Operation::Remove { .. }) {
            return Ok(None);
        }

        Self::lock(&self.wal, "WAL")?.append(operation.clone())?;

        if Self::apply(&self.memtable, operation) >= self.config.memtable_size_limit {
            self.flush_locked()?;
        }

        Ok(previous)
    }

    /// Apply an operation to the memtable, returning its new size
    fn apply(memtable: &MemTable, operation: Operation) -> usize {
        match operation {
            Operation::Insert { key, value } => memtable.insert(key, value),
            Operation::Remove { key } => memtable.remove(key),
        }
    }

    /// Flush with `write_lock` already held
    fn flush_locked(&self) -> Result<()> {
        if self.memtable.is_empty() {
            return Ok(());
        }

        self.storage.flush(&self.memtable)?;
        self.memtable.clear();

        // Everything logged so far now lives in an SSTable
        Self::lock(&self.wal, "WAL")?.truncate()?;

        if self.storage.sstable_count() >= self.config.compaction_trigger {
            self.storage.compact()?;
        }

        Ok(())
    }

    fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
        mutex
            .lock()
            .map_err(|e| EnrollError::LockPoisoned(format!("{} lock poisoned: {}", what, e)))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Directory holding the SSTable files
    pub fn storage_dir(&self) -> &Path {
        self.storage.data_dir()
    }

    pub fn memtable_size(&self) -> usize {
        self.memtable.size()
    }

    pub fn memtable_entry_count(&self) -> usize {
        self.memtable.entry_count()
    }

    pub fn sstable_count(&self) -> usize {
        self.storage.sstable_count()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
