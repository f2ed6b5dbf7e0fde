//! Integration tests for the resumable batch runner: idempotent resume,
//! order preservation, write-through durability, partial-failure isolation.

use super::support::{airdrop_items, read_cache_file, ScriptedSubmitter};
use nft_batch_tool::batch::{AirdropItem, BatchRunner, ItemError, ItemOutput};
use nft_batch_tool::cache::{CacheRecord, RetryCache};
use nft_batch_tool::retry::{submit_with_retry, RetryPolicy};
use std::time::Duration;

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::from_millis(1))
}

/// Standard op: route each item's submission through the retry loop.
fn scripted_op(
    submitter: &ScriptedSubmitter,
    policy: RetryPolicy,
) -> impl FnMut(AirdropItem) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<ItemOutput, ItemError>>>>
{
    let submitter = submitter.clone();
    move |item: AirdropItem| {
        let submitter = submitter.clone();
        let policy = policy.clone();
        Box::pin(async move {
            let txid = submit_with_retry(&policy, None, || {
                let submitter = submitter.clone();
                let mint = item.mint.clone();
                async move { submitter.submit(&mint).await }
            })
            .await?;
            Ok(ItemOutput::txid(txid))
        })
    }
}

#[tokio::test]
async fn test_scenario_transient_failures_recover() {
    // Ledger fails twice then succeeds for "A", succeeds immediately for "B".
    let dir = tempfile::TempDir::new().unwrap();
    let cache_path = dir.path().join("batch-cache.json");

    let submitter = ScriptedSubmitter::new();
    submitter.fail_first("A", 2);

    let cache = RetryCache::load(&cache_path).unwrap();
    let mut runner = BatchRunner::new().with_cache(cache);

    let items = airdrop_items(&[("A", "X"), ("B", "Y")]);
    let report = runner
        .run(&items, scripted_op(&submitter, fast_policy(5)))
        .await
        .unwrap();

    assert_eq!(report.error_count, 0);
    assert_eq!(report.submitted_count, 2);
    assert_eq!(submitter.attempts("A"), 3);
    assert_eq!(submitter.attempts("B"), 1);

    let file = read_cache_file(&cache_path);
    assert_eq!(file["A"]["txid"], "tx-A-3");
    assert_eq!(file["B"]["txid"], "tx-B-1");
}

#[tokio::test]
async fn test_scenario_partial_failure_isolated() {
    // "B" always fails with max_attempts = 3; "A" succeeds.
    let dir = tempfile::TempDir::new().unwrap();
    let cache_path = dir.path().join("batch-cache.json");

    let submitter = ScriptedSubmitter::new();
    submitter.always_fail("B");

    let cache = RetryCache::load(&cache_path).unwrap();
    let mut runner = BatchRunner::new().with_cache(cache);

    let items = airdrop_items(&[("A", "X"), ("B", "Y")]);
    let report = runner
        .run(&items, scripted_op(&submitter, fast_policy(3)))
        .await
        .unwrap();

    assert_eq!(report.error_count, 1);
    assert_eq!(report.submitted_count, 1);
    assert_eq!(submitter.attempts("B"), 3);
    assert!(report.outcomes[0].is_success());
    assert!(report.outcomes[1].error.is_some());

    // The cache only records A's success.
    let file = read_cache_file(&cache_path);
    assert_eq!(file["A"]["txid"], "tx-A-1");
    assert!(!file.contains_key("B"));
}

#[tokio::test]
async fn test_idempotent_resume_skips_recorded_success() {
    let dir = tempfile::TempDir::new().unwrap();
    let cache_path = dir.path().join("batch-cache.json");

    // Seed the cache with a recorded success for "A".
    let mut seeded = RetryCache::load(&cache_path).unwrap();
    seeded
        .mark_complete("A", CacheRecord::completed("X", "tx-old"))
        .unwrap();
    seeded.persist().unwrap();

    let submitter = ScriptedSubmitter::new();
    let cache = RetryCache::load(&cache_path).unwrap();
    let mut runner = BatchRunner::new().with_cache(cache);

    let items = airdrop_items(&[("A", "X"), ("B", "Y")]);
    let report = runner
        .run(&items, scripted_op(&submitter, fast_policy(5)))
        .await
        .unwrap();

    // "A" is never re-invoked; its cached record is copied into the result.
    assert_eq!(submitter.attempts("A"), 0);
    assert_eq!(submitter.attempts("B"), 1);
    assert_eq!(report.skipped_count, 1);
    assert!(report.outcomes[0].skipped);
    assert_eq!(report.outcomes[0].txid.as_deref(), Some("tx-old"));
}

#[tokio::test]
async fn test_order_preserved_including_skips_and_failures() {
    let dir = tempfile::TempDir::new().unwrap();
    let cache_path = dir.path().join("batch-cache.json");

    let mut seeded = RetryCache::load(&cache_path).unwrap();
    seeded
        .mark_complete("B", CacheRecord::completed("Y", "tx-b"))
        .unwrap();
    seeded.persist().unwrap();

    let submitter = ScriptedSubmitter::new();
    submitter.always_fail("C");

    let cache = RetryCache::load(&cache_path).unwrap();
    let mut runner = BatchRunner::new().with_cache(cache);

    let items = airdrop_items(&[("A", "X"), ("B", "Y"), ("C", "Z"), ("D", "W")]);
    let report = runner
        .run(&items, scripted_op(&submitter, fast_policy(2)))
        .await
        .unwrap();

    let identities: Vec<_> = report
        .outcomes
        .iter()
        .map(|o| o.identity.as_str())
        .collect();
    assert_eq!(identities, vec!["A", "B", "C", "D"]);
    assert_eq!(report.len(), items.len());
    assert!(report.outcomes[1].skipped);
    assert!(report.outcomes[2].error.is_some());
    // The failure of "C" does not block "D".
    assert_eq!(report.outcomes[3].txid.as_deref(), Some("tx-D-1"));
}

#[tokio::test]
async fn test_duplicate_identity_in_one_run_skipped() {
    let dir = tempfile::TempDir::new().unwrap();
    let cache_path = dir.path().join("batch-cache.json");

    let submitter = ScriptedSubmitter::new();
    let cache = RetryCache::load(&cache_path).unwrap();
    let mut runner = BatchRunner::new().with_cache(cache);

    // Same mint twice in one input list.
    let items = airdrop_items(&[("A", "X"), ("A", "Y")]);
    let report = runner
        .run(&items, scripted_op(&submitter, fast_policy(5)))
        .await
        .unwrap();

    assert_eq!(submitter.attempts("A"), 1);
    assert_eq!(report.submitted_count, 1);
    assert_eq!(report.skipped_count, 1);
    assert!(report.outcomes[1].skipped);
}

#[tokio::test]
async fn test_empty_input_no_cache_writes() {
    let dir = tempfile::TempDir::new().unwrap();
    let cache_path = dir.path().join("batch-cache.json");

    let submitter = ScriptedSubmitter::new();
    let cache = RetryCache::load(&cache_path).unwrap();
    let mut runner = BatchRunner::new().with_cache(cache);

    let report = runner
        .run(&[], scripted_op(&submitter, fast_policy(5)))
        .await
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(report.error_count, 0);
    assert!(!cache_path.exists(), "empty run must not write the cache");
}

#[tokio::test]
async fn test_crash_resume_durability() {
    let dir = tempfile::TempDir::new().unwrap();
    let cache_path = dir.path().join("batch-cache.json");

    // First run: item "A" succeeds, then the process "dies" (runner dropped).
    {
        let submitter = ScriptedSubmitter::new();
        let cache = RetryCache::load(&cache_path).unwrap();
        let mut runner = BatchRunner::new().with_cache(cache);
        let items = airdrop_items(&[("A", "X")]);
        runner
            .run(&items, scripted_op(&submitter, fast_policy(5)))
            .await
            .unwrap();
    }

    // The success was flushed before the run ended.
    let file = read_cache_file(&cache_path);
    assert_eq!(file["A"]["txid"], "tx-A-1");
    assert_eq!(file["A"]["to"], "X");

    // Second run over a longer list: "A" must not be re-submitted.
    let cache = RetryCache::load(&cache_path).unwrap();
    let mut runner = BatchRunner::new().with_cache(cache);
    let items = airdrop_items(&[("A", "X"), ("B", "Y")]);

    let report = runner
        .run(&items, move |item: AirdropItem| async move {
            assert_ne!(item.mint, "A", "completed item must not be re-submitted");
            Ok(ItemOutput::txid("tx-B-fresh"))
        })
        .await
        .unwrap();

    assert_eq!(report.skipped_count, 1);
    assert_eq!(report.submitted_count, 1);

    let file = read_cache_file(&cache_path);
    assert_eq!(file["A"]["txid"], "tx-A-1", "original record intact");
    assert_eq!(file["B"]["txid"], "tx-B-fresh");
}

#[tokio::test]
async fn test_runner_without_cache_isolates_failures() {
    let submitter = ScriptedSubmitter::new();
    submitter.always_fail("B");

    let mut runner = BatchRunner::new();
    let items = airdrop_items(&[("A", "X"), ("B", "Y"), ("C", "Z")]);
    let report = runner
        .run(&items, scripted_op(&submitter, fast_policy(2)))
        .await
        .unwrap();

    assert_eq!(report.error_count, 1);
    assert_eq!(report.submitted_count, 2);
    assert_eq!(submitter.attempts("C"), 1);
}
