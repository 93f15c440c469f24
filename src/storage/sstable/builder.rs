//! SSTable Builder
//!
//! Streams sorted entries into a new SSTable file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{EnrollError, Result};

use super::{encode_entry, encode_index_entry, Footer, Header, SSTable, HEADER_SIZE};

/// Writes one SSTable; keys must arrive in strictly increasing order
pub struct SSTableBuilder {
    path: PathBuf,
    out: BufWriter<File>,
    /// Key and absolute file offset of every entry written so far
    index: Vec<(Vec<u8>, u64)>,
    /// Bytes of data block written so far
    data_len: u64,
    data_crc: crc32fast::Hasher,
    scratch: Vec<u8>,
}

impl SSTableBuilder {
    /// Create the file and write a placeholder header
    pub fn new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut out = BufWriter::new(file);
        out.write_all(&Header { entry_count: 0 }.encode())?;

        Ok(Self {
            path: path.to_path_buf(),
            out,
            index: Vec::new(),
            data_len: 0,
            data_crc: crc32fast::Hasher::new(),
            scratch: Vec::new(),
        })
    }

    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.push(key, Some(value))
    }

    pub fn add_tombstone(&mut self, key: &[u8]) -> Result<()> {
        self.push(key, None)
    }

    fn push(&mut self, key: &[u8], value: Option<&[u8]>) -> Result<()> {
        if let Some((last, _)) = self.index.last() {
            if key <= last.as_slice() {
                return Err(EnrollError::Storage(format!(
                    "SSTable keys out of order: {:?} after {:?}",
                    String::from_utf8_lossy(key),
                    String::from_utf8_lossy(last)
                )));
            }
        }

        self.scratch.clear();
        encode_entry(key, value, &mut self.scratch)?;

        self.out.write_all(&self.scratch)?;
        self.data_crc.update(&self.scratch);
        self.index.push((key.to_vec(), HEADER_SIZE + self.data_len));
        self.data_len += self.scratch.len() as u64;

        Ok(())
    }

    /// Write the index block and footer, patch the header, and fsync
    pub fn finish(mut self) -> Result<SSTable> {
        let footer = Footer {
            index_offset: HEADER_SIZE + self.data_len,
            data_crc: self.data_crc.clone().finalize(),
        };

        self.scratch.clear();
        for (key, offset) in &self.index {
            encode_index_entry(key, *offset, &mut self.scratch);
        }
        self.out.write_all(&self.scratch)?;
        self.out.write_all(&footer.encode())?;

        let mut file = self
            .out
            .into_inner()
            .map_err(|e| EnrollError::Storage(format!("Failed to flush SSTable: {}", e)))?;

        let entry_count = self.index.len() as u64;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&Header { entry_count }.encode())?;
        file.sync_all()?;

        let file_size = file.metadata()?.len();
        let mut keys = self.index.into_iter().map(|(k, _)| k);
        let min_key = keys.next().unwrap_or_default();
        let max_key = keys.last().unwrap_or_else(|| min_key.clone());

        Ok(SSTable {
            path: self.path,
            entry_count,
            min_key,
            max_key,
            file_size,
        })
    }
}
