//! SSTable Module
//!
//! Sorted String Table: an immutable, sorted file of record entries.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (14 bytes)                                       │
//! │   Magic: "EKV1" (4) | Version: u16 (2) | Count: u64 (8) │
//! ├─────────────────────────────────────────────────────────┤
//! │ Data Block (variable)                                   │
//! │   [KeyLen: u32][ValLen: u32][Key][Value]                │
//! │   (ValLen = u32::MAX marks a tombstone, no value bytes) │
//! ├─────────────────────────────────────────────────────────┤
//! │ Index Block (variable)                                  │
//! │   [KeyLen: u32][Offset: u64][Key]                       │
//! ├─────────────────────────────────────────────────────────┤
//! │ Footer (16 bytes)                                       │
//! │   IndexOffset: u64 (8) | DataCRC: u32 (4) | Padding (4) │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. The builder, reader and iterator share the
//! codecs below so the layout is defined in one place.

mod builder;
mod iterator;
mod reader;

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{EnrollError, Result};

pub use builder::SSTableBuilder;
pub use iterator::SSTableIterator;
pub use reader::SSTableReader;

pub(crate) const MAGIC: &[u8; 4] = b"EKV1";
pub(crate) const VERSION: u16 = 1;
pub(crate) const HEADER_SIZE: u64 = 14;
pub(crate) const FOOTER_SIZE: u64 = 16;

/// Key length plus value length, in front of every data entry
pub(crate) const ENTRY_PREFIX_SIZE: usize = 8;

/// Value length written for a removed key
pub(crate) const TOMBSTONE_MARKER: u32 = u32::MAX;

// =============================================================================
// Header / Footer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub entry_count: u64,
}

impl Header {
    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut out = [0u8; HEADER_SIZE as usize];
        out[0..4].copy_from_slice(MAGIC);
        out[4..6].copy_from_slice(&VERSION.to_le_bytes());
        out[6..14].copy_from_slice(&self.entry_count.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.get(0..4) != Some(&MAGIC[..]) {
            return Err(EnrollError::Storage(format!(
                "bad SSTable magic {:?}",
                bytes.get(0..4).unwrap_or(bytes)
            )));
        }

        let version = u16::from_le_bytes(le_array(bytes, 4)?);
        if version != VERSION {
            return Err(EnrollError::Storage(format!(
                "unsupported SSTable version {}",
                version
            )));
        }

        Ok(Self { entry_count: u64::from_le_bytes(le_array(bytes, 6)?) })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Footer {
    pub index_offset: u64,
    pub data_crc: u32,
}

impl Footer {
    pub fn encode(&self) -> [u8; FOOTER_SIZE as usize] {
        let mut out = [0u8; FOOTER_SIZE as usize];
        out[0..8].copy_from_slice(&self.index_offset.to_le_bytes());
        out[8..12].copy_from_slice(&self.data_crc.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            index_offset: u64::from_le_bytes(le_array(bytes, 0)?),
            data_crc: u32::from_le_bytes(le_array(bytes, 8)?),
        })
    }
}

// =============================================================================
// Entries
// =============================================================================

/// Lengths read from the front of a data entry
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntryPrefix {
    pub key_len: usize,
    /// `None` for a tombstone
    pub value_len: Option<usize>,
}

impl EntryPrefix {
    pub fn decode(bytes: &[u8; ENTRY_PREFIX_SIZE]) -> Result<Self> {
        let key_len = u32::from_le_bytes(le_array(bytes, 0)?) as usize;
        let value_len = match u32::from_le_bytes(le_array(bytes, 4)?) {
            TOMBSTONE_MARKER => None,
            n => Some(n as usize),
        };
        Ok(Self { key_len, value_len })
    }
}

/// Append one data entry to `out`
pub(crate) fn encode_entry(key: &[u8], value: Option<&[u8]>, out: &mut Vec<u8>) -> Result<()> {
    let key_len = u32::try_from(key.len())
        .map_err(|_| EnrollError::Storage(format!("key of {} bytes is too large", key.len())))?;
    let value_len = match value {
        None => TOMBSTONE_MARKER,
        Some(v) => u32::try_from(v.len())
            .ok()
            .filter(|&n| n != TOMBSTONE_MARKER)
            .ok_or_else(|| {
                EnrollError::Storage(format!("value of {} bytes is too large", v.len()))
            })?,
    };

    out.extend_from_slice(&key_len.to_le_bytes());
    out.extend_from_slice(&value_len.to_le_bytes());
    out.extend_from_slice(key);
    if let Some(v) = value {
        out.extend_from_slice(v);
    }
    Ok(())
}

/// Append one index entry to `out`
pub(crate) fn encode_index_entry(key: &[u8], offset: u64, out: &mut Vec<u8>) {
    out.extend_from_slice(&(key.len() as u32).to_le_bytes());
    out.extend_from_slice(&offset.to_le_bytes());
    out.extend_from_slice(key);
}

/// Parse a whole index block into `key -> data offset`
pub(crate) fn decode_index(mut block: &[u8]) -> Result<BTreeMap<Vec<u8>, u64>> {
    let mut index = BTreeMap::new();

    while !block.is_empty() {
        let key_len = u32::from_le_bytes(le_array(block, 0)?) as usize;
        let offset = u64::from_le_bytes(le_array(block, 4)?);
        let key = block
            .get(12..12 + key_len)
            .ok_or_else(|| EnrollError::Storage("truncated SSTable index key".to_string()))?;

        index.insert(key.to_vec(), offset);
        block = &block[12 + key_len..];
    }

    Ok(index)
}

/// Fixed-size little-endian field at `at`
fn le_array<const N: usize>(bytes: &[u8], at: usize) -> Result<[u8; N]> {
    bytes
        .get(at..at + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| EnrollError::Storage(format!("truncated {}-byte field at offset {}", N, at)))
}

// =============================================================================
// SSTable Metadata
// =============================================================================

/// Metadata describing a finished SSTable, returned by the builder
#[derive(Debug, Clone)]
pub struct SSTable {
    pub path: PathBuf,
    pub entry_count: u64,
    pub min_key: Vec<u8>,
    pub max_key: Vec<u8>,
    pub file_size: u64,
}

impl SSTable {
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    /// False when `key` is definitely outside `[min_key, max_key]`
    pub fn might_contain(&self, key: &[u8]) -> bool {
        key >= self.min_key.as_slice() && key <= self.max_key.as_slice()
    }
}
