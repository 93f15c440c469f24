//! # Enrollkv
//!
//! A durable student-record store with:
//! - An ordered, WAL-backed key-value engine underneath
//! - Crash recovery with partial write handling
//! - Typed record store with capacity limits
//! - Query and mutation layers over a single `Student` entity
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    StudentService                            │
//! │         (Request router, serialized mutations)               │
//! └───────────────┬─────────────────────────────┬───────────────┘
//!                 │                             │
//!        ┌────────▼────────┐           ┌────────▼────────┐
//!        │   QueryLayer    │           │  MutationLayer  │
//!        │ (filters, sort, │           │ (validate, merge│
//!        │   paginate)     │           │   timestamp)    │
//!        └────────┬────────┘           └────────┬────────┘
//!                 └──────────────┬──────────────┘
//!                                ▼
//!                       ┌─────────────────┐
//!                       │   RecordStore   │
//!                       │ (id → Student)  │
//!                       └────────┬────────┘
//!                                ▼
//!          ┌─────────────────────────────────────────┐
//!          │                 Engine                  │
//!          ├─────────────┬─────────────┬─────────────┤
//!          │     WAL     │  MemTable   │   Storage   │
//!          │  (Append)   │  (RwLock)   │  (SSTable)  │
//!          └─────────────┴─────────────┴─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod memtable;
pub mod storage;
pub mod engine;

pub mod clock;
pub mod ident;
pub mod student;
pub mod store;
pub mod mutation;
pub mod query;
pub mod service;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{EnrollError, ErrorKind, Result};
pub use config::Config;
pub use engine::Engine;
pub use store::RecordStore;
pub use student::{NewStudent, Student, StudentField, StudentPatch};
pub use service::{Reply, Request, StudentService};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Enrollkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
