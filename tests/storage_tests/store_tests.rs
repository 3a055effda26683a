//! Tests for RecordStore
//!
//! These tests verify:
//! - Save assigns ids and writes one file per record
//! - Atomic replace leaves no temp files behind
//! - Load errors (missing file, malformed bytes)
//! - Idempotent delete
//! - Ids that normalize onto another record's file are rejected
//! - Count and lazy enumeration

use std::collections::HashSet;
use std::fs;

use fsdb::id::FnIdGenerator;
use fsdb::storage::RecordStore;
use fsdb::{Codec, Config, DeleteOutcome, FnCodec, FsdbError, JsonCodec, Record};
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, RecordStore) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder().base_path(temp_dir.path()).build();
    let store = RecordStore::new(&config);
    store.create_collection("users").unwrap();
    (temp_dir, store)
}

// =============================================================================
// Save Tests
// =============================================================================

#[test]
fn test_save_assigns_id() {
    let (_temp, store) = setup_temp_store();

    let saved = store.save("users", Record::new().with("name", "brian")).unwrap();

    let id = saved.id().unwrap();
    assert!(!id.is_empty());
    assert_eq!(saved.get("name"), Some(&json!("brian")));
}

#[test]
fn test_save_keeps_existing_id() {
    let (_temp, store) = setup_temp_store();

    let saved = store
        .save("users", Record::new().with("id", "u1").with("name", "brian"))
        .unwrap();

    assert_eq!(saved.id().unwrap(), "u1");
}

#[test]
fn test_save_writes_json_file() {
    let (temp, store) = setup_temp_store();

    let saved = store.save("users", Record::new().with("name", "brian")).unwrap();
    let path = store.resolver().record_path("users", &saved).unwrap();

    assert!(path.starts_with(temp.path().join("users")));
    assert!(path.exists());

    let data: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(data["id"], json!(saved.id().unwrap()));
    assert_eq!(data["name"], json!("brian"));
}

#[test]
fn test_save_overwrites_and_leaves_no_temp_file() {
    let (temp, store) = setup_temp_store();

    let saved = store.save("users", Record::new().with("name", "brian")).unwrap();
    let mut updated = saved.clone();
    updated.insert("name", "tom");
    store.save("users", updated).unwrap();

    let files: Vec<_> = fs::read_dir(temp.path().join("users"))
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(files.len(), 1);

    let loaded = store.load_record("users", &saved).unwrap();
    assert_eq!(loaded.get("name"), Some(&json!("tom")));
}

#[test]
fn test_save_rejects_id_that_normalizes_onto_another_record() {
    let (_temp, store) = setup_temp_store();

    store
        .save("users", Record::new().with("id", "a-b").with("name", "ann"))
        .unwrap();

    // "ab" lands on ab.json, which "a-b" already owns
    let result = store.save("users", Record::new().with("id", "ab").with("name", "bob"));
    match result {
        Err(FsdbError::IdCollision { id, existing, .. }) => {
            assert_eq!(id, "ab");
            assert_eq!(existing, "a-b");
        }
        other => panic!("expected IdCollision, got {:?}", other),
    }

    let stored = store.load_record("users", "a-b").unwrap();
    assert_eq!(stored.get("name"), Some(&json!("ann")));
    assert_eq!(store.count("users").unwrap(), 1);

    // The owner itself may still update its record
    store
        .save("users", Record::new().with("id", "a-b").with("name", "anna"))
        .unwrap();
    assert_eq!(store.load_record("users", "ab").unwrap().get("name"), Some(&json!("anna")));
}

#[test]
fn test_save_overwrites_undecodable_file() {
    let (temp, store) = setup_temp_store();
    fs::write(temp.path().join("users/u1.json"), b"not json").unwrap();

    store
        .save("users", Record::new().with("id", "u1").with("name", "brian"))
        .unwrap();
    assert_eq!(store.load_record("users", "u1").unwrap().get("name"), Some(&json!("brian")));
}

#[cfg(unix)]
#[test]
fn test_sync_collection_reports_directory_errors() {
    let (_temp, store) = setup_temp_store();

    store.sync_collection("users").unwrap();
    let err = store.sync_collection("missing").unwrap_err();
    assert!(matches!(err, FsdbError::Io(_)));
}

#[test]
fn test_sync_collection_is_noop_without_sync_writes() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .base_path(temp.path())
        .sync_writes(false)
        .build();
    let store = RecordStore::new(&config);

    store.sync_collection("missing").unwrap();
}

#[test]
fn test_generated_ids_are_unique() {
    let (_temp, store) = setup_temp_store();

    let ids: HashSet<String> = (0..50)
        .map(|i| {
            store
                .save("users", Record::new().with("n", i))
                .unwrap()
                .id()
                .unwrap()
                .into_owned()
        })
        .collect();

    assert_eq!(ids.len(), 50);
    assert_eq!(store.count("users").unwrap(), 50);
}

#[test]
fn test_custom_id_generator() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .base_path(temp.path())
        .id_generator(FnIdGenerator(|| "fixed".to_string()))
        .build();
    let store = RecordStore::new(&config);
    store.create_collection("users").unwrap();

    let saved = store.save("users", Record::new()).unwrap();
    assert_eq!(saved.id().unwrap(), "fixed");
    assert!(temp.path().join("users/fixed.json").exists());
}

#[test]
fn test_save_rejects_non_scalar_id() {
    let (_temp, store) = setup_temp_store();

    let result = store.save("users", Record::new().with("id", json!({"nested": true})));
    assert!(matches!(result, Err(FsdbError::InvalidId(_))));
}

// =============================================================================
// Load Tests
// =============================================================================

#[test]
fn test_load_missing_is_not_found() {
    let (_temp, store) = setup_temp_store();

    let err = store.load_record("users", "nope").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_load_malformed_is_decode_error() {
    let (temp, store) = setup_temp_store();
    fs::write(temp.path().join("users/bad.json"), b"{not json").unwrap();

    let err = store.load_record("users", "bad").unwrap_err();
    assert!(matches!(err, FsdbError::Decode(_)));
}

#[test]
fn test_custom_codec() {
    let temp = TempDir::new().unwrap();
    let codec = FnCodec::new(
        |record: &Record| {
            let mut bytes = b"v1:".to_vec();
            bytes.extend(JsonCodec::default().encode(record)?);
            Ok(bytes)
        },
        |bytes: &[u8]| {
            let body = bytes
                .strip_prefix(b"v1:")
                .ok_or_else(|| FsdbError::Decode("missing header".to_string()))?;
            JsonCodec::default().decode(body)
        },
    );
    let config = Config::builder()
        .base_path(temp.path())
        .file_extension("rec")
        .codec(codec)
        .build();
    let store = RecordStore::new(&config);
    store.create_collection("users").unwrap();

    let saved = store.save("users", Record::new().with("name", "brian")).unwrap();
    let path = store.resolver().record_path("users", &saved).unwrap();

    assert!(fs::read(&path).unwrap().starts_with(b"v1:"));
    assert_eq!(store.load(&path).unwrap(), saved);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_removes_file() {
    let (_temp, store) = setup_temp_store();

    let saved = store.save("users", Record::new().with("name", "brian")).unwrap();
    let path = store.resolver().record_path("users", &saved).unwrap();

    assert_eq!(store.delete("users", &saved).unwrap(), DeleteOutcome::Removed);
    assert!(!path.exists());
    assert_eq!(store.count("users").unwrap(), 0);
}

#[test]
fn test_delete_missing_is_absent() {
    let (_temp, store) = setup_temp_store();

    assert_eq!(store.delete("users", "ghost").unwrap(), DeleteOutcome::Absent);
    assert_eq!(store.delete("users", "ghost").unwrap(), DeleteOutcome::Absent);
}

#[test]
fn test_delete_other_io_errors_propagate() {
    let (temp, store) = setup_temp_store();
    // A directory where the record file should be cannot be removed as a file
    fs::create_dir(temp.path().join("users/blocker.json")).unwrap();

    let result = store.delete("users", "blocker");
    assert!(matches!(result, Err(FsdbError::Io(_))));
}

// =============================================================================
// Enumeration Tests
// =============================================================================

#[test]
fn test_records_and_ids() {
    let (_temp, store) = setup_temp_store();

    let a = store.save("users", Record::new().with("name", "brian")).unwrap();
    let b = store.save("users", Record::new().with("name", "joe")).unwrap();

    let records: Vec<Record> = store.records("users").unwrap().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert!(records.contains(&a));
    assert!(records.contains(&b));

    let ids: Vec<String> = store.ids("users").unwrap().map(|r| r.unwrap()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a.id().unwrap().into_owned()));
    assert!(ids.contains(&b.id().unwrap().into_owned()));
}

#[test]
fn test_enumeration_ignores_foreign_files() {
    let (temp, store) = setup_temp_store();

    store.save("users", Record::new().with("name", "brian")).unwrap();
    fs::write(temp.path().join("users/notes.txt"), b"hello").unwrap();
    fs::write(temp.path().join("users/half.json.tmp"), b"{").unwrap();

    assert_eq!(store.count("users").unwrap(), 1);
    assert_eq!(store.records("users").unwrap().count(), 1);
}

#[test]
fn test_enumeration_with_tmp_extension_skips_temp_files() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .base_path(temp.path())
        .file_extension("tmp")
        .build();
    let store = RecordStore::new(&config);
    store.create_collection("users").unwrap();

    let saved = store.save("users", Record::new().with("name", "brian")).unwrap();
    fs::write(temp.path().join("users/half.tmp.tmp"), b"{").unwrap();

    assert_eq!(store.count("users").unwrap(), 1);
    assert_eq!(store.records("users").unwrap().count(), 1);
    let ids: Vec<String> = store.ids("users").unwrap().map(|r| r.unwrap()).collect();
    assert_eq!(ids, vec![saved.id().unwrap().into_owned()]);
}

#[test]
fn test_enumeration_is_restartable() {
    let (_temp, store) = setup_temp_store();

    store.save("users", Record::new().with("name", "brian")).unwrap();
    assert_eq!(store.ids("users").unwrap().count(), 1);

    store.save("users", Record::new().with("name", "joe")).unwrap();
    assert_eq!(store.ids("users").unwrap().count(), 2);
}
