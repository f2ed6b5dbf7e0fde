//! Integration tests for retry cache durability and atomicity.

use nft_batch_tool::cache::{default_cache_path, CacheError, CacheRecord, RetryCache};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_cache_round_trip_preserves_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("airdrop-cache.json");

    let mut cache = RetryCache::load(&path).unwrap();
    cache.ensure_pending("mintA", "walletX");
    cache
        .mark_complete("mintA", CacheRecord::completed("walletX", "tx-a"))
        .unwrap();
    cache.ensure_pending("mintB", "walletY");
    cache.persist().unwrap();

    let loaded = RetryCache::load(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert!(loaded.is_complete("mintA"));
    assert!(!loaded.is_complete("mintB"));
    assert_eq!(loaded.get("mintB").unwrap().to, "walletY");
}

#[test]
fn test_cache_file_shape_matches_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");

    let mut cache = RetryCache::load(&path).unwrap();
    cache
        .mark_complete("mintA", CacheRecord::completed("walletX", "tx-a"))
        .unwrap();
    cache.persist().unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["mintA"]["to"], "walletX");
    assert_eq!(raw["mintA"]["txid"], "tx-a");
    // date is RFC-3339
    let date = raw["mintA"]["date"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(date).is_ok());
}

#[test]
fn test_missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let cache = RetryCache::load(dir.path().join("absent.json")).unwrap();
    assert!(cache.is_empty());
}

#[test]
fn test_malformed_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");
    std::fs::write(&path, "!!").unwrap();

    assert!(matches!(
        RetryCache::load(&path),
        Err(CacheError::Malformed { .. })
    ));
}

#[test]
fn test_schema_drift_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");
    std::fs::write(
        &path,
        r#"{"mintA": {"to": "x", "txid": "t", "status": "done"}}"#,
    )
    .unwrap();

    assert!(matches!(
        RetryCache::load(&path),
        Err(CacheError::Malformed { .. })
    ));
}

#[test]
fn test_atomic_persist_crash_safety() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");

    let mut cache = RetryCache::load(&path).unwrap();
    cache
        .mark_complete("mintA", CacheRecord::completed("x", "tx-1"))
        .unwrap();
    cache.persist().unwrap();

    // Simulate a crash mid-save: a temp file is created in the same
    // directory but never persisted over the target.
    {
        let temp = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
        std::fs::write(temp.path(), b"partial garbage").unwrap();
        // Dropped without persist, as a crashed process would leave it.
    }

    // A subsequent load sees the fully-old content.
    let loaded = RetryCache::load(&path).unwrap();
    assert_eq!(loaded.get("mintA").unwrap().txid.as_deref(), Some("tx-1"));
}

#[test]
fn test_oversized_cache_rejected() {
    use nft_batch_tool::cache::MAX_CACHE_FILE_SIZE;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache.json");
    let file = std::fs::File::create(&path).unwrap();
    file.set_len(MAX_CACHE_FILE_SIZE + 1).unwrap();
    drop(file);

    assert!(matches!(
        RetryCache::load(&path),
        Err(CacheError::TooLarge { .. })
    ));
}

#[test]
fn test_default_cache_path_derivation() {
    assert_eq!(
        default_cache_path(Path::new("drops/batch1.json")),
        Path::new("drops/batch1-cache.json")
    );
    assert_eq!(
        default_cache_path(Path::new("batch1.list.json")),
        Path::new("batch1.list-cache.json")
    );
}
