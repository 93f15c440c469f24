//! Storage Manager
//!
//! Owns the directory of SSTables: numbering new tables, answering lookups
//! across them, and folding them back into one table during compaction.
//!
//! Tables are named `sstable_{id:06}.sst`; a higher id is always newer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::{EnrollError, Result};
use crate::memtable::{MemTable, MemTableEntry};

use super::{SSTable, SSTableBuilder, SSTableReader};

/// Merged view of stored entries: `None` marks a tombstone
pub type MergedEntries = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

/// The on-disk half of the engine
///
/// `sstables` is kept newest first. Lookups take its write lock because
/// readers seek a shared file handle; table ids come from an atomic counter.
pub struct StorageManager {
    data_dir: PathBuf,
    sstables: RwLock<Vec<SSTableReader>>,
    next_sstable_id: AtomicU64,
}

impl StorageManager {
    /// Open the table directory at `path`, creating it if needed
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)?;

        let ids = Self::discover(path)?;
        let sstables = ids
            .iter()
            .map(|&id| SSTableReader::open(&Self::table_path(path, id)))
            .collect::<Result<Vec<_>>>()?;
        let next_id = ids.first().map_or(1, |&newest| newest + 1);

        tracing::debug!("Storage opened at {} with {} SSTables", path.display(), sstables.len());

        Ok(Self {
            data_dir: path.to_path_buf(),
            sstables: RwLock::new(sstables),
            next_sstable_id: AtomicU64::new(next_id),
        })
    }

    /// Newest value for `key`; `None` if absent or removed
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut sstables = self.sstables.write();

        for table in sstables.iter_mut().filter(|t| t.might_contain(key)) {
            match table.get(key) {
                Err(EnrollError::KeyNotFound) => continue,
                found => return found,
            }
        }

        Ok(None)
    }

    /// Every table folded into one ordered map, newest entry per key winning
    ///
    /// Tombstones are kept so the caller can lay them over newer sources.
    pub fn scan(&self) -> Result<MergedEntries> {
        Self::merge(&mut self.sstables.write())
    }

    /// Persist a memtable as the newest table
    pub fn flush(&self, memtable: &MemTable) -> Result<SSTable> {
        let entries = memtable.iter();
        if entries.is_empty() {
            return Err(EnrollError::Storage("Cannot flush empty MemTable".to_string()));
        }

        let (table, reader) = self.write_table(entries.iter().map(|(key, entry)| {
            let value = match entry {
                MemTableEntry::Value(v) => Some(v.as_slice()),
                MemTableEntry::Tombstone => None,
            };
            (key.as_slice(), value)
        }))?;
        self.sstables.write().insert(0, reader);

        tracing::info!(
            "Flushed {} entries to {} ({} bytes)",
            table.entry_count,
            table.path.display(),
            table.file_size
        );
        Ok(table)
    }

    /// Replace every table with one holding only live entries
    ///
    /// Returns the number of live entries. When nothing survives, no table is
    /// written at all.
    pub fn compact(&self) -> Result<u64> {
        let mut sstables = self.sstables.write();
        if sstables.is_empty() {
            return Ok(0);
        }

        let merged = Self::merge(&mut sstables)?;
        let live: Vec<(&[u8], Option<&[u8]>)> = merged
            .iter()
            .filter_map(|(key, value)| Some((key.as_slice(), Some(value.as_deref()?))))
            .collect();

        let replacement = if live.is_empty() {
            Vec::new()
        } else {
            vec![self.write_table(live.iter().copied())?.1]
        };
        let old = std::mem::replace(&mut *sstables, replacement);

        // Oldest first: a table left behind by a crash is then always newer
        // than anything it could shadow.
        for table in old.iter().rev() {
            fs::remove_file(table.path())?;
        }

        tracing::info!("Compacted {} SSTables into {} live entries", old.len(), live.len());
        Ok(live.len() as u64)
    }

    pub fn sstable_count(&self) -> usize {
        self.sstables.read().len()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Id the next table will receive
    pub fn next_sstable_id(&self) -> u64 {
        self.next_sstable_id.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Build a table from sorted entries and open it for reading
    fn write_table<'a>(
        &self,
        entries: impl Iterator<Item = (&'a [u8], Option<&'a [u8]>)>,
    ) -> Result<(SSTable, SSTableReader)> {
        let id = self.next_sstable_id.fetch_add(1, Ordering::SeqCst);
        let path = Self::table_path(&self.data_dir, id);

        let mut builder = SSTableBuilder::new(&path)?;
        for (key, value) in entries {
            match value {
                Some(v) => builder.add(key, v)?,
                None => builder.add_tombstone(key)?,
            }
        }
        let table = builder.finish()?;

        Ok((table, SSTableReader::open(&path)?))
    }

    fn merge(sstables: &mut [SSTableReader]) -> Result<MergedEntries> {
        let mut merged = MergedEntries::new();

        // Oldest first so newer tables overwrite
        for table in sstables.iter_mut().rev() {
            for item in table.iter()? {
                let (key, value) = item?;
                merged.insert(key, value);
            }
        }

        Ok(merged)
    }

    /// Ids of the tables in `dir`, newest first
    fn discover(dir: &Path) -> Result<Vec<u64>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                ids.extend(Self::parse_table_id(&path));
            }
        }

        ids.sort_unstable_by(|a, b| b.cmp(a));
        Ok(ids)
    }

    fn table_path(dir: &Path, id: u64) -> PathBuf {
        dir.join(format!("sstable_{:06}.sst", id))
    }

    /// `sstable_000042.sst` → `Some(42)`
    fn parse_table_id(path: &Path) -> Option<u64> {
        if path.extension()? != "sst" {
            return None;
        }
        path.file_stem()?
            .to_str()?
            .strip_prefix("sstable_")?
            .parse()
            .ok()
    }
}
