//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{EnrollError, Result};

/// Header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to perform
    pub operation: Operation,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Insert or overwrite the record stored under `key`
    Insert { key: Vec<u8>, value: Vec<u8> },

    /// Remove the record stored under `key`
    Remove { key: Vec<u8> },
}

impl Operation {
    /// The key this operation targets
    pub fn key(&self) -> &[u8] {
        match self {
            Operation::Insert { key, .. } | Operation::Remove { key } => key,
        }
    }
}

impl WalEntry {
    /// Create an entry stamped with the current wall-clock time
    pub fn new(lsn: u64, operation: Operation) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self { lsn, operation, timestamp }
    }

    /// Encode as `[lsn][crc][len][data]`
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data = bincode::serialize(self)?;
        let len = u32::try_from(data.len()).map_err(|_| {
            EnrollError::WalWrite(format!("entry too large: {} bytes", data.len()))
        })?;
        let crc = crc32fast::hash(&data);

        let mut bytes = Vec::with_capacity(HEADER_SIZE + data.len());
        bytes.extend_from_slice(&self.lsn.to_le_bytes());
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&len.to_le_bytes());
        bytes.extend_from_slice(&data);

        Ok(bytes)
    }

    /// Decode a complete framed entry, validating length and CRC
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let header = Self::parse_header(bytes)?;

        let data_end = HEADER_SIZE + header.len as usize;
        if bytes.len() < data_end {
            return Err(EnrollError::WalCorruption(format!(
                "incomplete entry: expected {} bytes, got {}",
                data_end,
                bytes.len()
            )));
        }

        Self::decode_data(&header, &bytes[HEADER_SIZE..data_end])
    }

    /// Compute the CRC that `serialize` would write for this entry
    pub fn compute_crc(&self) -> Result<u32> {
        Ok(crc32fast::hash(&bincode::serialize(self)?))
    }

    // =========================================================================
    // Framing helpers shared with the reader
    // =========================================================================

    pub(super) fn parse_header(bytes: &[u8]) -> Result<EntryHeader> {
        if bytes.len() < HEADER_SIZE {
            return Err(EnrollError::WalCorruption(format!(
                "incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut lsn = [0u8; 8];
        let mut crc = [0u8; 4];
        let mut len = [0u8; 4];
        lsn.copy_from_slice(&bytes[0..8]);
        crc.copy_from_slice(&bytes[8..12]);
        len.copy_from_slice(&bytes[12..16]);

        Ok(EntryHeader {
            lsn: u64::from_le_bytes(lsn),
            crc: u32::from_le_bytes(crc),
            len: u32::from_le_bytes(len),
        })
    }

    pub(super) fn decode_data(header: &EntryHeader, data: &[u8]) -> Result<Self> {
        let actual = crc32fast::hash(data);
        if actual != header.crc {
            return Err(EnrollError::WalCorruption(format!(
                "CRC mismatch at lsn {}: expected {:08x}, got {:08x}",
                header.lsn, header.crc, actual
            )));
        }

        let entry: WalEntry = bincode::deserialize(data)
            .map_err(|e| EnrollError::WalCorruption(format!("undecodable entry: {}", e)))?;

        if entry.lsn != header.lsn {
            return Err(EnrollError::WalCorruption(format!(
                "LSN mismatch: header says {}, entry says {}",
                header.lsn, entry.lsn
            )));
        }

        Ok(entry)
    }
}

/// Decoded fixed-size entry header
#[derive(Debug, Clone, Copy)]
pub(super) struct EntryHeader {
    pub lsn: u64,
    pub crc: u32,
    pub len: u32,
}
