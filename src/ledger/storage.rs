//! Content storage gateway, pricing oracle, and payment funder.

use super::{ContentStore, LedgerClient, LedgerError, PricingOracle, TxId, WalletFunder};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Payment wallet of the default storage gateway.
pub const DEFAULT_PAYMENT_WALLET: &str = "6FKvsq4ydWFci6nGq9ckbjYMtnmaqAoatz5c9XWjiDuS";

/// Content storage gateway speaking multipart uploads.
pub struct HttpContentStore {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    messages: Vec<UploadMessage>,
}

#[derive(Debug, Deserialize)]
struct UploadMessage {
    filename: String,
    #[serde(rename = "transactionId")]
    transaction_id: Option<String>,
}

impl HttpContentStore {
    /// Create a content store client for `endpoint`.
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn upload_item(
        &self,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<TxId, LedgerError> {
        debug!(name, bytes = data.len(), "Uploading content item");

        let part = Part::bytes(data.to_vec())
            .file_name(name.to_string())
            .mime_str(content_type)
            .map_err(|e| LedgerError::Gateway(format!("invalid content type: {e}")))?;
        let form = Form::new().part("file[]", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Gateway(format!(
                "upload endpoint returned HTTP {status}"
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Parse(e.to_string()))?;

        parsed
            .messages
            .into_iter()
            .find(|m| m.filename == name)
            .and_then(|m| m.transaction_id)
            .ok_or_else(|| LedgerError::Gateway(format!("no transaction id for upload: {name}")))
    }
}

/// Pricing oracle backed by the storage network's price endpoint.
///
/// The endpoint returns the cost of storing N bytes as a plain integer body:
/// `GET {base}/price/{bytes}`.
pub struct HttpPricingOracle {
    client: Client,
    base_url: String,
}

impl HttpPricingOracle {
    /// Create a pricing oracle client for `base_url`.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PricingOracle for HttpPricingOracle {
    async fn estimate_cost(&self, byte_count: u64) -> Result<u64, LedgerError> {
        let url = format!("{}/price/{byte_count}", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Gateway(format!(
                "price endpoint returned HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        body.trim()
            .parse::<u64>()
            .map_err(|e| LedgerError::Parse(format!("invalid price response {body:?}: {e}")))
    }
}

/// Funds the storage payment wallet through the ledger client.
pub struct PaymentFunder {
    ledger: Arc<dyn LedgerClient>,
    payment_wallet: String,
}

impl PaymentFunder {
    /// Create a funder paying into `payment_wallet`.
    pub fn new(ledger: Arc<dyn LedgerClient>, payment_wallet: impl Into<String>) -> Self {
        Self {
            ledger,
            payment_wallet: payment_wallet.into(),
        }
    }
}

#[async_trait]
impl WalletFunder for PaymentFunder {
    async fn fund(&self, lamports: u64) -> Result<(), LedgerError> {
        let txid = self.ledger.pay(&self.payment_wallet, lamports).await?;
        debug!(lamports, txid, "Storage payment confirmed");
        Ok(())
    }
}
