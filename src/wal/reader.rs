//! WAL Reader
//!
//! Handles reading entries from the WAL file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::Result;

use super::{WalEntry, HEADER_SIZE};

/// Reads entries from the WAL file
pub struct WalReader {
    reader: BufReader<File>,

    /// Offset just past the last entry that decoded cleanly
    position: u64,

    /// Size of the file when opened
    file_len: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            file_len,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// Returns:
    /// - `Ok(Some(entry))`: a complete, valid entry
    /// - `Ok(None)`: end of file, or a partial entry at the tail
    /// - `Err(WalCorruption)`: a complete entry whose CRC does not match
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        let mut header_bytes = [0u8; HEADER_SIZE];
        if !self.read_full(&mut header_bytes)? {
            return Ok(None);
        }
        let header = WalEntry::parse_header(&header_bytes)?;

        // A length running past EOF is a torn write, not a huge entry
        let remaining = self.file_len.saturating_sub(self.position + HEADER_SIZE as u64);
        if u64::from(header.len) > remaining {
            return Ok(None);
        }

        let mut data = vec![0u8; header.len as usize];
        if !self.read_full(&mut data)? {
            return Ok(None);
        }

        let entry = WalEntry::decode_data(&header, &data)?;
        self.position += (HEADER_SIZE + data.len()) as u64;

        Ok(Some(entry))
    }

    /// Offset just past the last valid entry
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total file size
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Iterate over all valid entries
    pub fn entries(self) -> WalIterator {
        WalIterator { reader: self, done: false }
    }

    /// Fill `buf` completely; false on clean or torn EOF
    fn read_full(&mut self, buf: &mut [u8]) -> Result<bool> {
        match self.reader.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Iterator over WAL entries
///
/// Stops after the first error.
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
