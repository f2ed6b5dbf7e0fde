//! Integration tests for upload funding: happens-before ordering and
//! fatal resource errors.

use async_trait::async_trait;
use bytes::Bytes;
use nft_batch_tool::batch::{BatchRunner, ItemOutput, UploadItem};
use nft_batch_tool::funding::{plan_and_fund, FundingError};
use nft_batch_tool::ledger::{LedgerError, PricingOracle, WalletFunder};
use std::sync::{Arc, Mutex};

/// Records the order of oracle, funder, and upload calls.
#[derive(Clone, Default)]
struct CallTrace {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallTrace {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

struct TracedOracle {
    trace: CallTrace,
}

#[async_trait]
impl PricingOracle for TracedOracle {
    async fn estimate_cost(&self, byte_count: u64) -> Result<u64, LedgerError> {
        self.trace.record("estimate");
        Ok(byte_count * 3)
    }
}

struct TracedFunder {
    trace: CallTrace,
    insufficient: bool,
}

#[async_trait]
impl WalletFunder for TracedFunder {
    async fn fund(&self, lamports: u64) -> Result<(), LedgerError> {
        if self.insufficient {
            return Err(LedgerError::InsufficientFunds {
                required: lamports,
                available: 0,
            });
        }
        self.trace.record("fund");
        Ok(())
    }
}

fn upload_items() -> Vec<UploadItem> {
    vec![
        UploadItem {
            name: "one.png".to_string(),
            data: Bytes::from(vec![1u8; 64]),
            content_type: "image/png".to_string(),
        },
        UploadItem {
            name: "two.json".to_string(),
            data: Bytes::from(vec![2u8; 32]),
            content_type: "application/json".to_string(),
        },
    ]
}

#[tokio::test]
async fn test_funding_completes_before_first_upload() {
    let trace = CallTrace::default();
    let oracle = TracedOracle {
        trace: trace.clone(),
    };
    let funder = TracedFunder {
        trace: trace.clone(),
        insufficient: false,
    };

    let items = upload_items();

    // The caller sequences funding strictly before the batch.
    let plan = plan_and_fund(&items, &oracle, &funder).await.unwrap();
    assert!(plan.required_amount > 0);

    let mut runner = BatchRunner::new();
    let op_trace = trace.clone();
    let report = runner
        .run(&items, move |item: UploadItem| {
            let trace = op_trace.clone();
            async move {
                trace.record(format!("upload:{}", item.name));
                Ok(ItemOutput::txid(format!("addr-{}", item.name)))
            }
        })
        .await
        .unwrap();

    assert_eq!(report.error_count, 0);
    let calls = trace.calls();
    assert_eq!(
        calls,
        vec!["estimate", "fund", "upload:one.png", "upload:two.json"]
    );
}

#[tokio::test]
async fn test_insufficient_funds_aborts_before_any_upload() {
    let trace = CallTrace::default();
    let oracle = TracedOracle {
        trace: trace.clone(),
    };
    let funder = TracedFunder {
        trace: trace.clone(),
        insufficient: true,
    };

    let err = plan_and_fund(&upload_items(), &oracle, &funder)
        .await
        .unwrap_err();

    assert!(matches!(err, FundingError::InsufficientFunds(_)));
    // Only the estimate happened; no upload was attempted.
    assert_eq!(trace.calls(), vec!["estimate"]);
}
