//! Tests for WAL Writer and Reader
//!
//! These tests verify:
//! - LSN sequencing, including across reopen
//! - Sync strategies (EveryWrite, EveryNEntries)
//! - Truncation
//! - Reading back what was written

use std::path::PathBuf;

use enrollkv::config::WalSyncStrategy;
use enrollkv::wal::{Operation, WalReader, WalWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

fn insert(key: &str) -> Operation {
    Operation::Insert {
        key: key.as_bytes().to_vec(),
        value: b"v".to_vec(),
    }
}

// =============================================================================
// LSN Tests
// =============================================================================

#[test]
fn test_lsns_are_sequential() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    assert_eq!(writer.append(insert("a")).unwrap(), 1);
    assert_eq!(writer.append(insert("b")).unwrap(), 2);
    assert_eq!(writer.append(Operation::Remove { key: b"a".to_vec() }).unwrap(), 3);
    assert_eq!(writer.current_lsn(), 4);
}

#[test]
fn test_lsn_continues_after_reopen() {
    let (_temp, wal_path) = setup_temp_wal();
    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(insert("a")).unwrap();
        writer.append(insert("b")).unwrap();
    }

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    assert_eq!(writer.current_lsn(), 3);
    assert_eq!(writer.append(insert("c")).unwrap(), 3);
}

// =============================================================================
// Sync Strategy Tests
// =============================================================================

#[test]
fn test_sync_every_write() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    writer.append(insert("k1")).unwrap();
    assert_eq!(writer.uncommitted_count(), 0);
}

#[test]
fn test_sync_every_n_entries() {
    let (_temp, wal_path) = setup_temp_wal();
    let mut writer =
        WalWriter::open(&wal_path, WalSyncStrategy::EveryNEntries { count: 3 }).unwrap();

    writer.append(insert("k1")).unwrap();
    writer.append(insert("k2")).unwrap();
    assert_eq!(writer.uncommitted_count(), 2);

    writer.append(insert("k3")).unwrap();
    assert_eq!(writer.uncommitted_count(), 0);

    writer.append(insert("k4")).unwrap();
    writer.sync().unwrap();
    assert_eq!(writer.uncommitted_count(), 0);
}

// =============================================================================
// Truncate Tests
// =============================================================================

#[test]
fn test_truncate_resets_lsn_and_file() {
    let (_temp, wal_path) = setup_temp_wal();
    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(insert("old")).unwrap();
        writer.truncate().unwrap();
        assert_eq!(writer.current_lsn(), 1);
        assert_eq!(writer.append(insert("new")).unwrap(), 1);
    }

    let mut reader = WalReader::open(&wal_path).unwrap();
    let entry = reader.next_entry().unwrap().unwrap();
    assert_eq!(entry.operation.key(), b"new");
    assert!(reader.next_entry().unwrap().is_none());
}

// =============================================================================
// Read-back Tests
// =============================================================================

#[test]
fn test_write_then_iterate() {
    let (_temp, wal_path) = setup_temp_wal();
    {
        let mut writer =
            WalWriter::open(&wal_path, WalSyncStrategy::EveryNEntries { count: 100 }).unwrap();
        for i in 0..250 {
            writer.append(insert(&format!("key{}", i))).unwrap();
        }
    } // Drop syncs the tail

    let reader = WalReader::open(&wal_path).unwrap();
    let entries: Vec<_> = reader.entries().collect::<Result<Vec<_>, _>>().unwrap();

    assert_eq!(entries.len(), 250);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.lsn, (i + 1) as u64);
    }
}

#[test]
fn test_read_empty_file() {
    let (_temp, wal_path) = setup_temp_wal();
    std::fs::File::create(&wal_path).unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_none());
}
