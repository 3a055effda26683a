//! Tests for the per-collection record cache
//!
//! These tests verify:
//! - Read-through on miss, then residency
//! - LRU eviction at capacity
//! - Save refreshes warm entries but does not warm cold ones
//! - Delete always evicts
//! - Disabled caching

use fsdb::{CollectionOptions, Config, EvictionPolicy, Record, Registry, Store};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_store(options: CollectionOptions) -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let mut registry = Registry::new();
    registry.register_collection("users", options).unwrap();
    let store = registry
        .open(Config::builder().base_path(temp_dir.path()).build())
        .unwrap();
    (temp_dir, store)
}

fn save_named(store: &Store, name: &str) -> String {
    store
        .save("users", Record::new().with("name", name))
        .unwrap()
        .id()
        .unwrap()
        .into_owned()
}

// =============================================================================
// Read-Through Tests
// =============================================================================

#[test]
fn test_get_populates_cache() {
    let (_temp, store) = setup_store(CollectionOptions::default());
    let id = save_named(&store, "brian");

    assert!(!store.is_cached("users", id.as_str()).unwrap());
    let record = store.get("users", id.as_str()).unwrap();

    assert_eq!(record.get("name"), Some(&json!("brian")));
    assert!(store.is_cached("users", id.as_str()).unwrap());
}

#[test]
fn test_cache_hit_survives_file_removal() {
    let (_temp, store) = setup_store(CollectionOptions::default());
    let id = save_named(&store, "brian");
    store.get("users", id.as_str()).unwrap();

    // Remove the file behind the store's back; the warm entry still answers
    std::fs::remove_file(store.record_path("users", id.as_str()).unwrap()).unwrap();

    assert_eq!(
        store.get("users", id.as_str()).unwrap().get("name"),
        Some(&json!("brian"))
    );
}

#[test]
fn test_get_missing_is_not_found() {
    let (_temp, store) = setup_store(CollectionOptions::default());

    let err = store.get("users", "ghost").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(store.cached_len("users").unwrap(), 0);
}

// =============================================================================
// Eviction Tests
// =============================================================================

#[test]
fn test_capacity_n_holds_n_after_n_plus_one_gets() {
    let (_temp, store) = setup_store(CollectionOptions::with_capacity(3));
    let ids: Vec<String> = ["a", "b", "c", "d"]
        .iter()
        .map(|name| save_named(&store, name))
        .collect();

    for id in &ids {
        store.get("users", id.as_str()).unwrap();
    }

    assert_eq!(store.cached_len("users").unwrap(), 3);
    assert!(!store.is_cached("users", ids[0].as_str()).unwrap());
    for id in &ids[1..] {
        assert!(store.is_cached("users", id.as_str()).unwrap());
    }
}

#[test]
fn test_save_does_not_warm_cold_cache() {
    let (_temp, store) = setup_store(CollectionOptions::with_capacity(2));

    save_named(&store, "brian");
    save_named(&store, "joe");
    save_named(&store, "ann");

    assert_eq!(store.cached_len("users").unwrap(), 0);
}

#[test]
fn test_get_after_each_save_evicts_first() {
    let (_temp, store) = setup_store(CollectionOptions::with_capacity(2));

    let a = save_named(&store, "brian");
    store.get("users", a.as_str()).unwrap();
    let b = save_named(&store, "joe");
    store.get("users", b.as_str()).unwrap();
    let c = save_named(&store, "ann");
    store.get("users", c.as_str()).unwrap();

    assert_eq!(store.cached_ids("users").unwrap(), vec![c, b]);
    assert!(!store.is_cached("users", a.as_str()).unwrap());
}

#[test]
fn test_recent_get_protects_from_eviction() {
    let (_temp, store) = setup_store(CollectionOptions::with_capacity(2));

    let a = save_named(&store, "brian");
    let b = save_named(&store, "joe");
    let c = save_named(&store, "ann");

    store.get("users", a.as_str()).unwrap();
    store.get("users", b.as_str()).unwrap();
    store.get("users", a.as_str()).unwrap();
    store.get("users", c.as_str()).unwrap();

    assert!(store.is_cached("users", a.as_str()).unwrap());
    assert!(!store.is_cached("users", b.as_str()).unwrap());
}

// =============================================================================
// Save / Delete Interaction Tests
// =============================================================================

#[test]
fn test_save_refreshes_warm_entry() {
    let (_temp, store) = setup_store(CollectionOptions::default());
    let id = save_named(&store, "brian");

    let mut record = store.get("users", id.as_str()).unwrap();
    record.insert("name", "tom");
    store.save("users", record).unwrap();

    assert!(store.is_cached("users", id.as_str()).unwrap());
    assert_eq!(
        store.get("users", id.as_str()).unwrap().get("name"),
        Some(&json!("tom"))
    );
}

#[test]
fn test_delete_evicts_warm_entry() {
    let (_temp, store) = setup_store(CollectionOptions::default());
    let id = save_named(&store, "brian");
    store.get("users", id.as_str()).unwrap();

    store.delete("users", id.as_str()).unwrap();

    assert!(!store.is_cached("users", id.as_str()).unwrap());
    assert!(store.get("users", id.as_str()).unwrap_err().is_not_found());
}

#[test]
fn test_delete_evicts_even_when_file_already_gone() {
    let (_temp, store) = setup_store(CollectionOptions::default());
    let id = save_named(&store, "brian");
    store.get("users", id.as_str()).unwrap();
    std::fs::remove_file(store.record_path("users", id.as_str()).unwrap()).unwrap();

    store.delete("users", id.as_str()).unwrap();

    assert!(!store.is_cached("users", id.as_str()).unwrap());
}

// =============================================================================
// Options Tests
// =============================================================================

#[test]
fn test_disabled_cache_reads_through() {
    let (_temp, store) =
        setup_store(CollectionOptions::default().eviction(EvictionPolicy::Disabled));
    let id = save_named(&store, "brian");

    assert_eq!(
        store.get("users", id.as_str()).unwrap().get("name"),
        Some(&json!("brian"))
    );
    assert_eq!(store.cached_len("users").unwrap(), 0);
}

#[test]
fn test_zero_capacity_lru_fails_to_open() {
    let temp = TempDir::new().unwrap();
    let mut registry = Registry::new();
    registry
        .register_collection("users", CollectionOptions::with_capacity(0))
        .unwrap();

    let result = registry.open(Config::builder().base_path(temp.path()).build());
    assert!(matches!(result, Err(fsdb::FsdbError::Config(_))));
}
