//! MemTable implementation
//!
//! BTreeMap-based memtable with RwLock for concurrency.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::MemTableEntry;

/// In-memory table for recent writes
///
/// Size is approximate: key bytes plus value bytes of every live entry,
/// key bytes only for tombstones.
pub struct MemTable {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    data: BTreeMap<Vec<u8>, MemTableEntry>,
    size: usize,
}

impl Inner {
    /// Replace the entry for `key`, keeping `size` in step; returns new size
    fn upsert(&mut self, key: Vec<u8>, entry: MemTableEntry) -> usize {
        let key_len = key.len();
        let added = entry.footprint();

        match self.data.insert(key, entry) {
            Some(old) => self.size = self.size - old.footprint() + added,
            None => self.size += key_len + added,
        }

        self.size
    }
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Get the entry for a key (read lock)
    ///
    /// `Some(Tombstone)` means the key was removed and older storage must not
    /// be consulted.
    pub fn get(&self, key: &[u8]) -> Option<MemTableEntry> {
        self.inner.read().data.get(key).cloned()
    }

    /// Insert a key-value pair (write lock); returns the new size
    pub fn insert(&self, key: Vec<u8>, value: Vec<u8>) -> usize {
        self.inner.write().upsert(key, MemTableEntry::Value(value))
    }

    /// Remove a key by writing a tombstone (write lock); returns the new size
    pub fn remove(&self, key: Vec<u8>) -> usize {
        self.inner.write().upsert(key, MemTableEntry::Tombstone)
    }

    /// Get approximate size in bytes
    pub fn size(&self) -> usize {
        self.inner.read().size
    }

    /// Get entry count (tombstones included)
    pub fn entry_count(&self) -> usize {
        self.inner.read().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().data.is_empty()
    }

    /// Check if should flush (size >= limit)
    pub fn should_flush(&self, size_limit: usize) -> bool {
        self.size() >= size_limit
    }

    /// Snapshot of all entries in sorted key order
    ///
    /// The snapshot is detached: later writes do not affect it.
    pub fn iter(&self) -> Vec<(Vec<u8>, MemTableEntry)> {
        self.inner
            .read()
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Clear all entries (after successful flush)
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.data.clear();
        inner.size = 0;
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
