//! Write-Ahead Log
//!
//! Every engine write is appended here before it reaches the memtable, and
//! the log is emptied once its entries are safe in an SSTable. After a crash
//! the valid prefix of the log is replayed; a torn or corrupted tail is cut
//! off.
//!
//! ## Entry Framing
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────────────────────┐
//! │ LSN u64  │ CRC u32  │ Len u32  │ bincode(WalEntry)       │
//! └──────────┴──────────┴──────────┴─────────────────────────┘
//!   little-endian; the CRC covers the data bytes only
//! ```

mod entry;
mod reader;
mod recovery;
mod writer;

pub use entry::{Operation, WalEntry, HEADER_SIZE};
pub use reader::{WalIterator, WalReader};
pub use recovery::{RecoveryResult, WalRecovery};
pub use writer::WalWriter;
