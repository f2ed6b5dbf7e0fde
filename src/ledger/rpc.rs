//! JSON-RPC gateway client.
//!
//! Thin client for a remote gateway that owns transaction construction and
//! signing. Payloads stay opaque here: every method is a single JSON-RPC
//! call that either yields a transaction id (or metadata document) or an
//! error.

use super::{
    AssetMetadata, AssetSelector, LedgerClient, LedgerError, MetadataQuery, MintReceipt, TxId,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// JSON-RPC client for the ledger gateway.
pub struct RpcGateway {
    client: Client,
    rpc_url: String,
    signer: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    txid: String,
}

impl RpcGateway {
    /// Create a gateway client.
    ///
    /// `signer` identifies the wallet the gateway signs with; the signing
    /// material itself never passes through this process.
    pub fn new(client: Client, rpc_url: impl Into<String>, signer: impl Into<String>) -> Self {
        Self {
            client,
            rpc_url: rpc_url.into(),
            signer: signer.into(),
        }
    }

    /// The signer wallet address this gateway submits as.
    pub fn signer(&self) -> &str {
        &self.signer
    }

    async fn call<T>(&self, method: &str, params: Value) -> Result<T, LedgerError>
    where
        T: DeserializeOwned,
    {
        debug!(method, "Submitting RPC request");

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::Network(format!("request timed out: {e}"))
                } else {
                    LedgerError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Network(format!(
                "gateway returned HTTP {status}"
            )));
        }

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| LedgerError::Parse(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        parsed
            .result
            .ok_or_else(|| LedgerError::Parse("response carried neither result nor error".to_string()))
    }
}

#[async_trait]
impl LedgerClient for RpcGateway {
    async fn transfer_asset(&self, mint: &str, to: &str) -> Result<TxId, LedgerError> {
        let result: TxResult = self
            .call(
                "transferAsset",
                json!({ "signer": self.signer, "mint": mint, "to": to }),
            )
            .await?;
        Ok(result.txid)
    }

    async fn mint_asset(&self, metadata_uri: &str) -> Result<MintReceipt, LedgerError> {
        self.call(
            "mintAsset",
            json!({ "signer": self.signer, "uri": metadata_uri }),
        )
        .await
    }

    async fn pay(&self, to: &str, lamports: u64) -> Result<TxId, LedgerError> {
        let result: TxResult = self
            .call(
                "pay",
                json!({ "signer": self.signer, "to": to, "lamports": lamports }),
            )
            .await?;
        Ok(result.txid)
    }

    async fn asset_metadata(&self, query: &MetadataQuery) -> Result<AssetMetadata, LedgerError> {
        let params = match query {
            MetadataQuery::Mint(mint) => json!({ "mint": mint }),
            MetadataQuery::Address(address) => json!({ "address": address }),
        };
        self.call("getAssetMetadata", params).await
    }

    async fn assets_for(&self, selector: &AssetSelector) -> Result<Vec<String>, LedgerError> {
        match selector {
            AssetSelector::Mints(mints) => Ok(mints.clone()),
            AssetSelector::Owner(owner) => {
                self.call("listAssetsByOwner", json!({ "owner": owner })).await
            }
            AssetSelector::Creator(creator) => {
                self.call("listAssetsByCreator", json!({ "creator": creator }))
                    .await
            }
        }
    }
}
