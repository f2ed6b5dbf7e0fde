//! Integration tests for bounded retry behavior.

use super::support::ScriptedSubmitter;
use nft_batch_tool::ledger::LedgerError;
use nft_batch_tool::retry::{submit_with_retry, RetryPolicy, SubmitError};
use std::time::{Duration, Instant};

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::from_millis(1))
}

#[tokio::test]
async fn test_bounded_retry_exact_attempt_count() {
    // Fails exactly k = 2 times, max_attempts = 5 > k: succeeds on
    // invocation k + 1 and is not invoked again.
    let submitter = ScriptedSubmitter::new();
    submitter.fail_first("item", 2);

    let result = submit_with_retry(&fast_policy(5), None, || {
        let submitter = submitter.clone();
        async move { submitter.submit("item").await }
    })
    .await;

    assert_eq!(result.unwrap(), "tx-item-3");
    assert_eq!(submitter.attempts("item"), 3);
}

#[tokio::test]
async fn test_exhaustion_surfaces_last_error() {
    let submitter = ScriptedSubmitter::new();
    submitter.always_fail("item");

    let result: Result<String, _> = submit_with_retry(&fast_policy(4), None, || {
        let submitter = submitter.clone();
        async move { submitter.submit("item").await }
    })
    .await;

    assert_eq!(submitter.attempts("item"), 4);
    match result {
        Err(SubmitError::Exhausted { attempts, source }) => {
            assert_eq!(attempts, 4);
            // The last underlying error is carried out.
            assert!(source.to_string().contains("attempt 4"));
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fixed_delay_between_attempts() {
    let policy = RetryPolicy::new(3, Duration::from_millis(30));
    let start = Instant::now();

    let _: Result<String, _> = submit_with_retry(&policy, None, || async move {
        Err(LedgerError::Network("down".to_string()))
    })
    .await;

    // Two inter-attempt delays of 30ms each.
    assert!(start.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn test_max_retries_one_means_single_attempt() {
    let submitter = ScriptedSubmitter::new();
    submitter.always_fail("item");

    let result: Result<String, _> = submit_with_retry(&fast_policy(1), None, || {
        let submitter = submitter.clone();
        async move { submitter.submit("item").await }
    })
    .await;

    assert_eq!(submitter.attempts("item"), 1);
    assert!(matches!(result, Err(SubmitError::Exhausted { attempts: 1, .. })));
}
