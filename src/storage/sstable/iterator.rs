//! SSTable Iterator
//!
//! Sequential walk over the data block.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};

use crate::error::Result;

use super::{EntryPrefix, ENTRY_PREFIX_SIZE, HEADER_SIZE};

/// Yields `(key, value)` in key order; a `None` value is a tombstone
///
/// Stops after the first error.
pub struct SSTableIterator<'a> {
    file: &'a mut BufReader<File>,
    /// Start of the index block
    end: u64,
    pos: u64,
}

impl<'a> SSTableIterator<'a> {
    pub(super) fn new(file: &'a mut BufReader<File>, end: u64) -> Result<Self> {
        file.seek(SeekFrom::Start(HEADER_SIZE))?;
        Ok(Self { file, end, pos: HEADER_SIZE })
    }

    fn read_entry(&mut self) -> Result<(Vec<u8>, Option<Vec<u8>>)> {
        let mut prefix = [0u8; ENTRY_PREFIX_SIZE];
        self.file.read_exact(&mut prefix)?;
        let prefix = EntryPrefix::decode(&prefix)?;

        let mut key = vec![0u8; prefix.key_len];
        self.file.read_exact(&mut key)?;

        let value = match prefix.value_len {
            None => None,
            Some(n) => {
                let mut value = vec![0u8; n];
                self.file.read_exact(&mut value)?;
                Some(value)
            }
        };

        self.pos += (ENTRY_PREFIX_SIZE + prefix.key_len + prefix.value_len.unwrap_or(0)) as u64;
        Ok((key, value))
    }
}

impl Iterator for SSTableIterator<'_> {
    type Item = Result<(Vec<u8>, Option<Vec<u8>>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.end {
            return None;
        }

        let item = self.read_entry();
        if item.is_err() {
            self.pos = self.end;
        }
        Some(item)
    }
}
