//! Record Store
//!
//! Typed, ordered, durable map from student id to [`Student`].
//!
//! Records are bincode-encoded and kept in the [`Engine`] under the UTF-8
//! bytes of their id, so store order is lexicographic id order. Reads return
//! owned snapshots; writes replace the whole stored record.
//!
//! Key and encoded-record sizes are bounded by [`Config::max_key_size`] and
//! [`Config::max_value_size`]. A write over either bound fails with
//! [`EnrollError::Capacity`] and leaves the store untouched.

use std::path::Path;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{EnrollError, Result};
use crate::student::Student;

/// Durable ordered map `id -> Student`
pub struct RecordStore {
    engine: Engine,
    max_key_size: usize,
    max_value_size: usize,
    validate_enrollment_date: bool,
}

impl RecordStore {
    /// Open or create the store described by `config`
    pub fn open(config: Config) -> Result<Self> {
        let max_key_size = config.max_key_size;
        let max_value_size = config.max_value_size;
        let validate_enrollment_date = config.validate_enrollment_date;

        Ok(Self {
            engine: Engine::open(config)?,
            max_key_size,
            max_value_size,
            validate_enrollment_date,
        })
    }

    /// Open with default settings under `path`
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Point lookup
    pub fn get(&self, id: &str) -> Result<Option<Student>> {
        self.engine
            .get(id.as_bytes())?
            .map(|bytes| Self::decode(id, &bytes))
            .transpose()
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.engine.get(id.as_bytes())?.is_some())
    }

    /// Store `record` under `id`, returning the record it replaced
    pub fn insert(&self, id: &str, record: &Student) -> Result<Option<Student>> {
        self.check_key(id)?;
        let value = bincode::serialize(record)?;
        if value.len() > self.max_value_size {
            return Err(EnrollError::Capacity(format!(
                "record for id={} encodes to {} bytes (max {})",
                id,
                value.len(),
                self.max_value_size
            )));
        }

        self.engine
            .insert(id.as_bytes(), &value)?
            .map(|bytes| Self::decode(id, &bytes))
            .transpose()
    }

    /// Delete `id`, returning the removed record
    pub fn remove(&self, id: &str) -> Result<Option<Student>> {
        self.engine
            .remove(id.as_bytes())?
            .map(|bytes| Self::decode(id, &bytes))
            .transpose()
    }

    /// Every record in store order (ascending id bytes)
    pub fn values(&self) -> Result<Vec<Student>> {
        self.engine
            .scan()?
            .into_iter()
            .map(|(key, bytes)| Self::decode(&String::from_utf8_lossy(&key), &bytes))
            .collect()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.engine.scan()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Persist buffered writes to an SSTable
    pub fn flush(&self) -> Result<()> {
        self.engine.flush()
    }

    /// Merge on-disk tables, returning the number of live records kept
    pub fn compact(&self) -> Result<u64> {
        self.engine.compact()
    }

    /// Flush and release the store
    pub fn close(self) -> Result<()> {
        self.engine.close()
    }

    /// Whether creates and updates must carry `YYYY-MM-DD` enrollment dates
    pub fn validates_enrollment_dates(&self) -> bool {
        self.validate_enrollment_date
    }

    /// Underlying engine (for testing and debugging)
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    fn check_key(&self, id: &str) -> Result<()> {
        if id.len() > self.max_key_size {
            return Err(EnrollError::Capacity(format!(
                "id={} is {} bytes (max {})",
                id,
                id.len(),
                self.max_key_size
            )));
        }
        Ok(())
    }

    fn decode(id: &str, bytes: &[u8]) -> Result<Student> {
        bincode::deserialize(bytes).map_err(|e| {
            EnrollError::Serialization(format!("stored record for id={} is unreadable: {}", id, e))
        })
    }
}
