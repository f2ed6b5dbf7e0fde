//! Ledger and storage capabilities consumed by the batch engine.
//!
//! Everything behind these traits is opaque to the orchestration layer:
//! transaction construction, signing, and wire protocol details live in the
//! remote gateway (or in test doubles). The engine only cares about "submit
//! one operation, get a transaction id or an error".
//!
//! # Components
//!
//! - [`LedgerClient`] - submit transfers, mints, and payments
//! - [`PricingOracle`] - estimate storage cost for a byte count
//! - [`WalletFunder`] - move funds to the storage payment wallet
//! - [`ContentStore`] - upload content bytes, returning a content address

pub mod rpc;
pub mod storage;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub use rpc::RpcGateway;
pub use storage::{HttpContentStore, HttpPricingOracle, PaymentFunder};

/// Transaction id returned by the remote ledger on success.
pub type TxId = String;

/// Receipt for a successful mint operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintReceipt {
    /// Address of the newly minted asset
    pub mint: String,
    /// Address of the on-ledger metadata account
    pub metadata: String,
    /// Transaction id of the mint submission
    pub tx_id: TxId,
}

/// On-ledger metadata for an existing asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// Asset display name
    pub name: String,
    /// Short symbol
    pub symbol: String,
    /// Off-ledger metadata URI
    pub uri: String,
    /// Mint address of the asset
    pub mint: String,
    /// Update authority, present while the asset is mutable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_authority: Option<String>,
    /// Whether the metadata can still be changed
    pub mutable: bool,
    /// Royalty fee in basis points
    pub seller_fee_basis_points: u16,
    /// Creator addresses and their shares
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub creators: Vec<Creator>,
}

/// One creator entry on an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creator {
    /// Creator address
    pub address: String,
    /// Share of royalties, 0-100
    pub share: u8,
    /// Whether the creator has signed the asset
    pub verified: bool,
}

/// Query for locating asset metadata. Exactly one addressing mode applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataQuery {
    /// Look up by the asset's mint address
    Mint(String),
    /// Look up by the metadata account address directly
    Address(String),
}

/// Selects which assets an operation applies to. Exactly one selector is
/// allowed per invocation; [`AssetSelector::from_flags`] rejects anything
/// else before a ledger call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSelector {
    /// An explicit list of mint addresses
    Mints(Vec<String>),
    /// Every asset held by this owner
    Owner(String),
    /// Every asset with this verified creator
    Creator(String),
}

impl AssetSelector {
    /// Build a selector from mutually exclusive CLI options.
    pub fn from_flags(
        mints: Option<Vec<String>>,
        owner: Option<String>,
        creator: Option<String>,
    ) -> Result<Self, LedgerError> {
        match (mints, owner, creator) {
            (Some(mints), None, None) => {
                if mints.is_empty() {
                    return Err(LedgerError::InvalidSelector(
                        "at least one mint must be given".to_string(),
                    ));
                }
                Ok(AssetSelector::Mints(mints))
            }
            (None, Some(owner), None) => Ok(AssetSelector::Owner(owner)),
            (None, None, Some(creator)) => Ok(AssetSelector::Creator(creator)),
            (None, None, None) => Err(LedgerError::InvalidSelector(
                "one of --mints, --owner or --creator must be given".to_string(),
            )),
            _ => Err(LedgerError::InvalidSelector(
                "--mints, --owner and --creator are mutually exclusive".to_string(),
            )),
        }
    }
}

/// Errors from ledger and storage capabilities.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Network error (timeout, connection refused, DNS failure)
    #[error("network error: {0}")]
    Network(String),

    /// Error response from the RPC gateway
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// Gateway error code
        code: i64,
        /// Gateway error message
        message: String,
    },

    /// Error from the content storage gateway
    #[error("storage gateway error: {0}")]
    Gateway(String),

    /// The signing wallet cannot cover the requested amount
    #[error("insufficient funds: {required} lamports required, {available} available")]
    InsufficientFunds {
        /// Lamports the operation needs
        required: u64,
        /// Lamports the wallet holds
        available: u64,
    },

    /// Malformed response body
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid asset selector combination
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
}

/// Capability to submit one-shot operations to the remote ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Transfer one unit of `mint` from the signing wallet to `to`.
    async fn transfer_asset(&self, mint: &str, to: &str) -> Result<TxId, LedgerError>;

    /// Mint a new asset pointing at `metadata_uri`.
    async fn mint_asset(&self, metadata_uri: &str) -> Result<MintReceipt, LedgerError>;

    /// Pay `lamports` from the signing wallet to `to`.
    async fn pay(&self, to: &str, lamports: u64) -> Result<TxId, LedgerError>;

    /// Fetch on-ledger metadata for an asset.
    async fn asset_metadata(&self, query: &MetadataQuery) -> Result<AssetMetadata, LedgerError>;

    /// Resolve a selector to a concrete list of mint addresses.
    async fn assets_for(&self, selector: &AssetSelector) -> Result<Vec<String>, LedgerError>;
}

/// Capability to price durable storage.
#[async_trait]
pub trait PricingOracle: Send + Sync {
    /// Cost in lamports of storing `byte_count` bytes.
    async fn estimate_cost(&self, byte_count: u64) -> Result<u64, LedgerError>;
}

/// Capability to fund the storage payment wallet before an upload batch.
#[async_trait]
pub trait WalletFunder: Send + Sync {
    /// Move `lamports` to the payment wallet and wait for confirmation.
    async fn fund(&self, lamports: u64) -> Result<(), LedgerError>;
}

/// Capability to upload one content item.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Upload `data`, returning the content address (storage transaction id).
    async fn upload_item(&self, name: &str, data: Bytes, content_type: &str)
        -> Result<TxId, LedgerError>;
}
