//! Tests for WAL Entry framing
//!
//! These tests verify:
//! - Decoding what was encoded, for both operation kinds
//! - CRC32 corruption detection
//! - Truncated input handling

use enrollkv::wal::{Operation, WalEntry, HEADER_SIZE};
use enrollkv::EnrollError;

fn insert(key: &str, value: &str) -> Operation {
    Operation::Insert {
        key: key.as_bytes().to_vec(),
        value: value.as_bytes().to_vec(),
    }
}

// =============================================================================
// Framing Tests
// =============================================================================

#[test]
fn test_insert_entry_decodes() {
    let entry = WalEntry::new(1, insert("student-1", "record bytes"));

    let bytes = entry.serialize().unwrap();
    let recovered = WalEntry::deserialize(&bytes).unwrap();

    assert_eq!(entry, recovered);
    assert_eq!(recovered.operation.key(), b"student-1");
}

#[test]
fn test_remove_entry_decodes() {
    let entry = WalEntry::new(42, Operation::Remove { key: b"student-9".to_vec() });

    let recovered = WalEntry::deserialize(&entry.serialize().unwrap()).unwrap();

    assert_eq!(recovered.lsn, 42);
    assert!(matches!(recovered.operation, Operation::Remove { .. }));
}

#[test]
fn test_header_layout() {
    let entry = WalEntry::new(7, insert("k", "v"));
    let bytes = entry.serialize().unwrap();

    assert_eq!(u64::from_le_bytes(bytes[0..8].try_into().unwrap()), 7);
    assert_eq!(
        u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
        entry.compute_crc().unwrap()
    );
    let len = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;
    assert_eq!(bytes.len(), HEADER_SIZE + len);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_data_corruption_detected() {
    let mut bytes = WalEntry::new(1, insert("key", "value")).serialize().unwrap();

    if let Some(byte) = bytes.last_mut() {
        *byte ^= 0xFF;
    }

    let result = WalEntry::deserialize(&bytes);
    assert!(matches!(result, Err(EnrollError::WalCorruption(_))));
}

#[test]
fn test_crc_field_corruption_detected() {
    let mut bytes = WalEntry::new(1, insert("key", "value")).serialize().unwrap();
    bytes[8] ^= 0xFF;

    assert!(WalEntry::deserialize(&bytes).is_err());
}

#[test]
fn test_truncated_input_rejected() {
    let bytes = WalEntry::new(1, insert("key", "value")).serialize().unwrap();

    assert!(WalEntry::deserialize(&bytes[..HEADER_SIZE - 1]).is_err());
    assert!(WalEntry::deserialize(&bytes[..bytes.len() - 1]).is_err());
}
