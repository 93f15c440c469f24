//! Tests for Engine
//!
//! These tests verify:
//! - insert/get/remove with previous-value returns
//! - Ordered scans across memtable and SSTables
//! - Flush and automatic compaction
//! - Crash recovery from WAL
//! - Engine lifecycle (open/close/reopen)
//! - Scans that race with flushes

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use enrollkv::config::{Config, WalSyncStrategy};
use enrollkv::engine::Engine;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn config_for(temp_dir: &TempDir, memtable_limit: usize) -> Config {
    Config::builder()
        .data_dir(temp_dir.path())
        .wal_sync_strategy(WalSyncStrategy::EveryWrite)
        .memtable_size_limit(memtable_limit)
        .compaction_trigger(4)
        .build()
}

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open(config_for(&temp_dir, 1024 * 1024)).unwrap();
    (temp_dir, engine)
}

fn keys(engine: &Engine) -> Vec<String> {
    engine
        .scan()
        .unwrap()
        .into_iter()
        .map(|(k, _)| String::from_utf8(k).unwrap())
        .collect()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_engine_open_creates_layout() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("db");

    let _engine = Engine::open(Config::builder().data_dir(&data_dir).build()).unwrap();

    assert!(data_dir.join("sstables").is_dir());
    assert!(data_dir.join("wal.log").is_file());
}

#[test]
fn test_engine_rejects_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .memtable_size_limit(0)
        .build();

    assert!(Engine::open(config).is_err());
}

#[test]
fn test_insert_returns_previous() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(engine.insert(b"k", b"v1").unwrap(), None);
    assert_eq!(engine.insert(b"k", b"v2").unwrap(), Some(b"v1".to_vec()));
    assert_eq!(engine.get(b"k").unwrap(), Some(b"v2".to_vec()));
}

#[test]
fn test_remove_returns_removed() {
    let (_temp, engine) = setup_temp_engine();

    engine.insert(b"k", b"v").unwrap();

    assert_eq!(engine.remove(b"k").unwrap(), Some(b"v".to_vec()));
    assert_eq!(engine.remove(b"k").unwrap(), None);
    assert_eq!(engine.get(b"k").unwrap(), None);
}

#[test]
fn test_remove_absent_writes_nothing() {
    let (_temp, engine) = setup_temp_engine();

    assert_eq!(engine.remove(b"ghost").unwrap(), None);
    assert_eq!(engine.memtable_entry_count(), 0);
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scan_orders_keys_across_layers() {
    let (_temp, engine) = setup_temp_engine();

    engine.insert(b"charlie", b"3").unwrap();
    engine.insert(b"alpha", b"1").unwrap();
    engine.flush().unwrap();
    engine.insert(b"bravo", b"2").unwrap();
    engine.remove(b"charlie").unwrap();

    assert_eq!(keys(&engine), vec!["alpha", "bravo"]);
}

#[test]
fn test_scan_prefers_memtable_value() {
    let (_temp, engine) = setup_temp_engine();

    engine.insert(b"k", b"old").unwrap();
    engine.flush().unwrap();
    engine.insert(b"k", b"new").unwrap();

    assert_eq!(engine.scan().unwrap(), vec![(b"k".to_vec(), b"new".to_vec())]);
}

// =============================================================================
// Flush / Compaction Tests
// =============================================================================

#[test]
fn test_flush_truncates_wal() {
    let (temp, engine) = setup_temp_engine();

    engine.insert(b"k", b"v").unwrap();
    engine.flush().unwrap();

    assert_eq!(engine.memtable_entry_count(), 0);
    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(std::fs::metadata(temp.path().join("wal.log")).unwrap().len(), 0);
}

#[test]
fn test_small_memtable_flushes_and_compacts() {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open(config_for(&temp_dir, 64)).unwrap();

    for i in 0..100 {
        let key = format!("key{:03}", i);
        engine.insert(key.as_bytes(), &[b'x'; 40]).unwrap();
    }

    assert!(engine.sstable_count() < 4);
    assert_eq!(engine.scan().unwrap().len(), 100);
    assert_eq!(engine.get(b"key042").unwrap(), Some(vec![b'x'; 40]));
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_recovery_after_crash() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = Engine::open(config_for(&temp_dir, 1024 * 1024)).unwrap();
        engine.insert(b"a", b"1").unwrap();
        engine.insert(b"b", b"2").unwrap();
        engine.remove(b"a").unwrap();
        // Dropped without close: only the WAL has these writes
    }

    let engine = Engine::open(config_for(&temp_dir, 1024 * 1024)).unwrap();

    assert_eq!(engine.get(b"a").unwrap(), None);
    assert_eq!(engine.get(b"b").unwrap(), Some(b"2".to_vec()));
    assert_eq!(engine.sstable_count(), 1);
    assert_eq!(engine.memtable_entry_count(), 0);
}

#[test]
fn test_close_and_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = Engine::open(config_for(&temp_dir, 1024 * 1024)).unwrap();
        engine.insert(b"k", b"v").unwrap();
        engine.close().unwrap();
    }

    let engine = Engine::open(config_for(&temp_dir, 1024 * 1024)).unwrap();
    assert_eq!(engine.get(b"k").unwrap(), Some(b"v".to_vec()));
}

#[test]
fn test_reopen_twice_does_not_duplicate_tables() {
    let temp_dir = TempDir::new().unwrap();
    {
        let engine = Engine::open(config_for(&temp_dir, 1024 * 1024)).unwrap();
        engine.insert(b"k", b"v").unwrap();
    }
    drop(Engine::open(config_for(&temp_dir, 1024 * 1024)).unwrap());

    let engine = Engine::open(config_for(&temp_dir, 1024 * 1024)).unwrap();
    assert_eq!(engine.sstable_count(), 1);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writers() {
    let (_temp, engine) = setup_temp_engine();
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..50 {
                    let key = format!("t{}-{:02}", t, i);
                    engine.insert(key.as_bytes(), b"v").unwrap();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(engine.scan().unwrap().len(), 200);
}

#[test]
fn test_scan_during_flushes_sees_every_written_key() {
    let temp_dir = TempDir::new().unwrap();
    let engine = Arc::new(Engine::open(config_for(&temp_dir, 256)).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let engine = Arc::clone(&engine);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..500 {
                let key = format!("key{:04}", i);
                engine.insert(key.as_bytes(), b"value").unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let mut last = 0;
    while !done.load(Ordering::SeqCst) {
        let seen = engine.scan().unwrap().len();
        assert!(seen >= last, "scan shrank from {} to {}", last, seen);
        last = seen;
    }
    writer.join().unwrap();

    assert_eq!(engine.scan().unwrap().len(), 500);
    assert!(engine.sstable_count() > 0);
}
