//! MemTable
//!
//! Sorted in-memory buffer for writes that have been logged to the WAL but
//! not yet flushed. Removals are kept as tombstones so they can shadow older
//! values in SSTables. The engine flushes once the size estimate (key bytes
//! plus value bytes) reaches `Config::memtable_size_limit`.

mod table;

pub use table::MemTable;

#[derive(Debug, Clone, PartialEq)]
pub enum MemTableEntry {
    Value(Vec<u8>),

    /// Removed key
    Tombstone,
}

impl MemTableEntry {
    /// Bytes this entry contributes to the size estimate (excluding the key)
    pub(crate) fn footprint(&self) -> usize {
        match self {
            MemTableEntry::Value(v) => v.len(),
            MemTableEntry::Tombstone => 0,
        }
    }
}
