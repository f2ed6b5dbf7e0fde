//! Resumable batch runner.

use super::item::BatchItem;
use super::report::{BatchReport, ItemOutcome, ItemOutput};
use super::BatchError;
use crate::cache::{CacheRecord, RetryCache};
use crate::retry::SubmitError;
use crate::shutdown::SharedShutdown;
use std::future::Future;
use tracing::{info, warn};

/// Per-item failure surfaced by a submission operation.
///
/// Both variants are recorded in the report and never abort the batch.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    /// Retries exhausted, or cancelled mid-submission
    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// Non-retryable validation failure for this item (e.g. unreadable or
    /// invalid metadata)
    #[error("{0}")]
    Invalid(String),
}

/// Drives an ordered list of items through a submission operation.
///
/// With a cache attached the runner skips identities already recorded
/// successful and writes each fresh success through to durable storage
/// before the next item starts, so a crashed or interrupted run can be
/// resumed without re-executing completed work. Without a cache it is a
/// plain sequential batch with per-item failure isolation.
pub struct BatchRunner {
    cache: Option<RetryCache>,
    shutdown: Option<SharedShutdown>,
}

impl BatchRunner {
    /// Create a runner without resume capability.
    pub fn new() -> Self {
        Self {
            cache: None,
            shutdown: None,
        }
    }

    /// Attach a retry cache for idempotent resume.
    pub fn with_cache(mut self, cache: RetryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach a shared shutdown handle for cooperative cancellation.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Give back the cache, e.g. to inspect it after a run.
    pub fn into_cache(self) -> Option<RetryCache> {
        self.cache
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|s| s.is_shutdown_requested())
            .unwrap_or(false)
    }

    /// Run the batch. See [`Self::run_with`].
    pub async fn run<I, F, Fut>(&mut self, items: &[I], op: F) -> Result<BatchReport, BatchError>
    where
        I: BatchItem + Clone,
        F: FnMut(I) -> Fut,
        Fut: Future<Output = Result<ItemOutput, ItemError>>,
    {
        self.run_with(items, op, |_| {}).await
    }

    /// Run the batch, invoking `on_item` as each outcome is produced.
    ///
    /// Items are processed strictly in input order and the report preserves
    /// that order, including skipped and failed entries. Cancellation is
    /// checked before each item; an in-flight item is allowed to finish,
    /// but no further items begin once shutdown is requested.
    pub async fn run_with<I, F, Fut>(
        &mut self,
        items: &[I],
        mut op: F,
        mut on_item: impl FnMut(&ItemOutcome),
    ) -> Result<BatchReport, BatchError>
    where
        I: BatchItem + Clone,
        F: FnMut(I) -> Fut,
        Fut: Future<Output = Result<ItemOutput, ItemError>>,
    {
        let mut report = BatchReport::with_capacity(items.len());

        info!(items = items.len(), "Starting batch run");

        for item in items {
            if self.shutdown_requested() {
                info!("Shutdown requested - stopping before next item");
                report.cancelled = true;
                break;
            }

            let identity = item.identity();
            let destination = item.destination();

            if let Some(cache) = &mut self.cache {
                if let Some(record) = cache.get(identity) {
                    if record.is_complete() {
                        info!(identity, "Already recorded successful, skipping");
                        crate::metrics::record_item_skipped();
                        let outcome = ItemOutcome::skipped(
                            identity,
                            Some(record.to.as_str()).filter(|to| !to.is_empty()),
                            record.txid.as_deref(),
                        );
                        on_item(&outcome);
                        report.push(outcome);
                        continue;
                    }
                }
                cache.ensure_pending(identity, destination.unwrap_or_default());
            }

            match op(item.clone()).await {
                Ok(output) => {
                    if let Some(cache) = &mut self.cache {
                        let record = CacheRecord::completed(
                            destination.unwrap_or_default(),
                            output.txid.clone(),
                        );
                        cache.mark_complete(identity, record)?;
                        // Write-through: the success must be durable before
                        // the next item starts.
                        cache.persist()?;
                    }
                    crate::metrics::record_item_submitted();
                    let outcome = ItemOutcome::success(identity, destination, output);
                    on_item(&outcome);
                    report.push(outcome);
                }
                Err(ItemError::Submit(SubmitError::Cancelled)) => {
                    warn!(identity, "Cancelled while submitting");
                    let outcome = ItemOutcome::failed(identity, destination, "cancelled");
                    on_item(&outcome);
                    report.push(outcome);
                    report.cancelled = true;
                    break;
                }
                Err(e) => {
                    warn!(identity, error = %e, "Item failed permanently");
                    crate::metrics::record_item_failed();
                    let outcome = ItemOutcome::failed(identity, destination, e.to_string());
                    on_item(&outcome);
                    report.push(outcome);
                }
            }
        }

        info!(
            submitted = report.submitted_count,
            skipped = report.skipped_count,
            failed = report.error_count,
            cancelled = report.cancelled,
            "Batch run finished"
        );

        Ok(report)
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}
