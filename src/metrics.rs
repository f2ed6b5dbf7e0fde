//! Observability metrics for batch execution.
//!
//! Uses the `metrics` crate facade with an optional Prometheus scrape
//! endpoint. Recording is a no-op until a recorder is installed, so the
//! engine emits unconditionally and degrades gracefully when metrics are
//! not configured.

use metrics::{counter, describe_counter, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Global metrics registry initialization flag
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize the metrics system with a Prometheus exporter.
///
/// Should be called once at application startup; subsequent calls are
/// ignored.
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!(%addr, "Initializing metrics system");

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "batch_items_submitted_total",
        Unit::Count,
        "Items submitted successfully to the ledger"
    );
    describe_counter!(
        "batch_items_skipped_total",
        Unit::Count,
        "Items skipped because the cache already records a success"
    );
    describe_counter!(
        "batch_items_failed_total",
        Unit::Count,
        "Items whose retries were exhausted or that failed validation"
    );
    describe_counter!(
        "submit_attempts_failed_total",
        Unit::Count,
        "Individual submission attempts that failed"
    );

    Ok(())
}

/// Record one successfully submitted item.
pub(crate) fn record_item_submitted() {
    counter!("batch_items_submitted_total").increment(1);
}

/// Record one item skipped as already done.
pub(crate) fn record_item_skipped() {
    counter!("batch_items_skipped_total").increment(1);
}

/// Record one permanently failed item.
pub(crate) fn record_item_failed() {
    counter!("batch_items_failed_total").increment(1);
}

/// Record one failed submission attempt.
pub(crate) fn record_retry_attempt() {
    counter!("submit_attempts_failed_total").increment(1);
}
