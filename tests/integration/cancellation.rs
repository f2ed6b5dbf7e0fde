//! Integration tests for cooperative cancellation at item boundaries.

use super::support::airdrop_items;
use nft_batch_tool::batch::{AirdropItem, BatchRunner, ItemOutput};
use nft_batch_tool::shutdown::ShutdownCoordinator;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_shutdown_before_run_starts_no_items() {
    let shutdown = ShutdownCoordinator::shared();
    shutdown.request_shutdown();

    let mut runner = BatchRunner::new().with_shutdown(shutdown);
    let items = airdrop_items(&[("A", "X"), ("B", "Y")]);
    let report = runner
        .run(&items, |_item: AirdropItem| async move {
            unreachable!("no item may start after shutdown was requested")
        })
        .await
        .unwrap();

    assert!(report.cancelled);
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_shutdown_mid_run_finishes_current_item_only() {
    let shutdown = ShutdownCoordinator::shared();
    let calls = Arc::new(AtomicU32::new(0));

    let mut runner = BatchRunner::new().with_shutdown(shutdown.clone());
    let items = airdrop_items(&[("A", "X"), ("B", "Y"), ("C", "Z")]);

    let op = {
        let calls = calls.clone();
        let shutdown = shutdown.clone();
        move |item: AirdropItem| {
            let calls = calls.clone();
            let shutdown = shutdown.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                // Cancellation arrives while the first item is in flight;
                // that item still completes.
                shutdown.request_shutdown();
                Ok(ItemOutput::txid(format!("tx-{}", item.mint)))
            }
        }
    };

    let report = runner.run(&items, op).await.unwrap();

    assert!(report.cancelled);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "no further item may begin");
    assert_eq!(report.len(), 1);
    assert!(report.outcomes[0].is_success());
}
