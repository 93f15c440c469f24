//! SSTable Reader
//!
//! Validates an SSTable on open and serves point lookups through an
//! in-memory index.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{EnrollError, Result};

use super::iterator::SSTableIterator;
use super::{
    decode_index, EntryPrefix, Footer, Header, ENTRY_PREFIX_SIZE, FOOTER_SIZE, HEADER_SIZE,
};

/// Open SSTable with its whole index in RAM
pub struct SSTableReader {
    /// Kept so compaction can delete the file
    path: PathBuf,
    file: BufReader<File>,
    /// key → file offset of the entry
    index: BTreeMap<Vec<u8>, u64>,
    entry_count: u64,
    /// End of the data block
    index_offset: u64,
}

impl SSTableReader {
    /// Open an SSTable for reading
    ///
    /// Fails with [`EnrollError::Storage`] when the header, footer, index or
    /// data checksum does not check out.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let corrupt =
            |what: String| EnrollError::Storage(format!("SSTable {}: {}", path.display(), what));

        let len = bytes.len() as u64;
        if len < HEADER_SIZE + FOOTER_SIZE {
            return Err(corrupt(format!("too small ({} bytes)", len)));
        }

        let header = Header::decode(&bytes).map_err(|e| corrupt(e.to_string()))?;
        let footer_start = len - FOOTER_SIZE;
        let footer = Footer::decode(&bytes[footer_start as usize..])?;

        if footer.index_offset < HEADER_SIZE || footer.index_offset > footer_start {
            return Err(corrupt(format!(
                "index offset {} outside the file",
                footer.index_offset
            )));
        }

        let data = &bytes[HEADER_SIZE as usize..footer.index_offset as usize];
        let actual_crc = crc32fast::hash(data);
        if actual_crc != footer.data_crc {
            return Err(corrupt(format!(
                "data CRC mismatch: expected {:08x}, got {:08x}",
                footer.data_crc, actual_crc
            )));
        }

        let index = decode_index(&bytes[footer.index_offset as usize..footer_start as usize])?;
        if index.len() as u64 != header.entry_count {
            return Err(corrupt(format!(
                "header counts {} entries, index has {}",
                header.entry_count,
                index.len()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: BufReader::new(File::open(path)?),
            index,
            entry_count: header.entry_count,
            index_offset: footer.index_offset,
        })
    }

    /// Point lookup
    ///
    /// `Ok(None)` means the key is a tombstone here; a key this table does
    /// not hold at all is `Err(KeyNotFound)`.
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let offset = *self.index.get(key).ok_or(EnrollError::KeyNotFound)?;

        self.file.seek(SeekFrom::Start(offset))?;
        let mut prefix = [0u8; ENTRY_PREFIX_SIZE];
        self.file.read_exact(&mut prefix)?;
        let prefix = EntryPrefix::decode(&prefix)?;

        // The index already matched the key
        self.file.seek_relative(prefix.key_len as i64)?;

        match prefix.value_len {
            None => Ok(None),
            Some(n) => {
                let mut value = vec![0u8; n];
                self.file.read_exact(&mut value)?;
                Ok(Some(value))
            }
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn min_key(&self) -> Option<&[u8]> {
        self.index.keys().next().map(Vec::as_slice)
    }

    pub fn max_key(&self) -> Option<&[u8]> {
        self.index.keys().next_back().map(Vec::as_slice)
    }

    /// False when `key` is definitely outside this table's key range
    pub fn might_contain(&self, key: &[u8]) -> bool {
        matches!(
            (self.min_key(), self.max_key()),
            (Some(min), Some(max)) if key >= min && key <= max
        )
    }

    /// All entries in key order, tombstones included
    pub fn iter(&mut self) -> Result<SSTableIterator<'_>> {
        SSTableIterator::new(&mut self.file, self.index_offset)
    }
}
