//! Upload cost estimation and pre-funding.
//!
//! An upload batch is paid for up front: the total payload size (plus the
//! manifest bookkeeping overhead) is priced by the oracle and the payment
//! wallet is funded before the first item is submitted. The caller enforces
//! the ordering by awaiting [`plan_and_fund`] before starting the batch.

use crate::batch::item::UploadItem;
use crate::ledger::{LedgerError, PricingOracle, WalletFunder};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info};

/// Placeholder content id used when estimating manifest size; real ids have
/// the same length.
const MANIFEST_PLACEHOLDER_ID: &str = "artestaC_testsEaEmAGFtestEGtestmMGmgMGAV438";

/// Funding plan for one upload batch, computed once before any submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingPlan {
    /// Total bytes to store, including the manifest estimate
    pub total_bytes: u64,
    /// Lamports per byte, rounded up (derived for reporting)
    pub unit_price: u64,
    /// Total lamports transferred to the payment wallet
    pub required_amount: u64,
}

impl FundingPlan {
    /// Required amount expressed in SOL.
    pub fn required_sol(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.required_amount as i128, 9)
    }
}

/// Fatal funding errors; any of these aborts the run before the first item.
#[derive(Debug, thiserror::Error)]
pub enum FundingError {
    /// Pricing oracle query failed
    #[error("cost oracle error: {0}")]
    Oracle(#[source] LedgerError),

    /// The wallet cannot cover the plan
    #[error("{0}")]
    InsufficientFunds(#[source] LedgerError),

    /// Funding transfer failed
    #[error("funding failed: {0}")]
    Funder(#[source] LedgerError),
}

/// Estimate the serialized size of a path manifest covering `names`.
///
/// Builds the manifest with placeholder content ids of realistic length and
/// measures the serialized document.
pub fn estimate_manifest_size(names: &[&str]) -> u64 {
    let mut paths = serde_json::Map::new();
    for name in names {
        let ext = std::path::Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        paths.insert(
            (*name).to_string(),
            json!({ "id": MANIFEST_PLACEHOLDER_ID, "ext": ext }),
        );
    }

    let manifest = json!({
        "manifest": "content/paths",
        "version": "0.1.0",
        "paths": paths,
        "index": { "path": "metadata.json" },
    });

    let size = manifest.to_string().len() as u64;
    debug!(size, files = names.len(), "Estimated manifest size");
    size
}

/// Compute the funding plan for `items` and fund the payment wallet.
///
/// Returns only after the funding transfer has completed, so the first
/// upload can rely on the payment being in place.
pub async fn plan_and_fund(
    items: &[UploadItem],
    oracle: &dyn PricingOracle,
    funder: &dyn WalletFunder,
) -> Result<FundingPlan, FundingError> {
    let payload_bytes: u64 = items.iter().map(UploadItem::size).sum();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    let total_bytes = payload_bytes + estimate_manifest_size(&names);

    let required_amount = oracle
        .estimate_cost(total_bytes)
        .await
        .map_err(FundingError::Oracle)?;
    let unit_price = required_amount.div_ceil(total_bytes.max(1));

    let plan = FundingPlan {
        total_bytes,
        unit_price,
        required_amount,
    };

    debug!(
        total_bytes = plan.total_bytes,
        required_lamports = plan.required_amount,
        "Computed upload funding plan"
    );

    funder.fund(plan.required_amount).await.map_err(|e| match e {
        LedgerError::InsufficientFunds { .. } => FundingError::InsufficientFunds(e),
        other => FundingError::Funder(other),
    })?;

    info!(
        required_lamports = plan.required_amount,
        required_sol = %plan.required_sol(),
        "Storage funding confirmed"
    );

    Ok(plan)
}
