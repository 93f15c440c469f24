//! Error types for Enrollkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using EnrollError
pub type Result<T> = std::result::Result<T, EnrollError>;

/// Unified error type for Enrollkv operations
#[derive(Debug, Error)]
pub enum EnrollError {
    // -------------------------------------------------------------------------
    // Record Errors (surfaced to callers of the query/mutation layers)
    // -------------------------------------------------------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Capacity exceeded: {0}")]
    Capacity(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("WAL write failed: {0}")]
    WalWrite(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    /// Key absent from a single SSTable (internal to the storage layer)
    #[error("Key not found")]
    KeyNotFound,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Coarse classification of an error, for callers that only care about
/// which of the record-level outcomes occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Capacity,
    Internal,
}

impl EnrollError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnrollError::Validation(_) => ErrorKind::Validation,
            EnrollError::NotFound(_) => ErrorKind::NotFound,
            EnrollError::Capacity(_) => ErrorKind::Capacity,
            _ => ErrorKind::Internal,
        }
    }
}

impl From<bincode::Error> for EnrollError {
    fn from(err: bincode::Error) -> Self {
        EnrollError::Serialization(err.to_string())
    }
}
