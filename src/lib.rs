//! # NFT Batch Tool Library
//!
//! Batch one-shot NFT operations (mint, transfer, airdrop, content upload)
//! against a remote ledger, built around a resumable orchestration engine.
//!
//! ## Features
//!
//! - **Idempotent resume**: per-item completion is tracked in a durable
//!   write-through cache, so an interrupted batch can be re-run without
//!   re-executing already-succeeded work or double-spending
//! - **Bounded retry**: every submission goes through an explicit retry
//!   loop with a fixed, tunable inter-attempt delay
//! - **Partial-failure isolation**: one item's exhausted retries never
//!   abort the rest of the batch
//! - **Pre-funded uploads**: upload batches are priced and paid for before
//!   the first item is submitted
//! - **Cooperative cancellation**: Ctrl+C stops the batch at the next item
//!   boundary without corrupting the cache
//!
//! ## Quick Start
//!
//! ```no_run
//! use nft_batch_tool::batch::{AirdropItem, BatchRunner, ItemOutput};
//! use nft_batch_tool::cache::RetryCache;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let items = vec![AirdropItem {
//!     mint: "mintAddress".to_string(),
//!     to: "recipientWallet".to_string(),
//! }];
//!
//! let cache = RetryCache::load("airdrop-cache.json")?;
//! let mut runner = BatchRunner::new().with_cache(cache);
//!
//! let report = runner
//!     .run(&items, |item| async move {
//!         // submit item.mint to item.to through the ledger client here
//!         Ok(ItemOutput::txid(format!("tx-{}", item.mint)))
//!     })
//!     .await?;
//!
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`batch`] - resumable batch runner, work items, and result reporting
//! - [`retry`] - bounded fixed-delay retry around one submission
//! - [`cache`] - durable idempotency cache with atomic persistence
//! - [`funding`] - upload cost estimation and pre-funding
//! - [`ledger`] - opaque ledger/storage capabilities behind traits
//! - [`metadata`] - off-ledger metadata documents
//! - [`config`] - tool configuration with explicit path injection
//! - [`output`] - incremental human/JSON result emission
//! - [`shutdown`] - cooperative cancellation shared across modules

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Batch orchestration engine
pub mod batch;

/// Durable retry cache
pub mod cache;

/// CLI command implementations
pub mod cli;

/// Tool configuration
pub mod config;

/// Upload cost estimation and pre-funding
pub mod funding;

/// Ledger and storage capabilities
pub mod ledger;

/// Off-ledger metadata documents
pub mod metadata;

/// Observability metrics
pub mod metrics;

/// Batch result output
pub mod output;

/// Bounded retry around one submission
pub mod retry;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

// Re-export commonly used types
pub use batch::{BatchReport, BatchRunner};
pub use cache::RetryCache;
pub use retry::RetryPolicy;

/// Ledger cluster the tool talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Cluster {
    /// Production cluster
    #[default]
    #[serde(rename = "mainnet-beta")]
    MainnetBeta,
    /// Development cluster
    #[serde(rename = "devnet")]
    Devnet,
    /// Test cluster
    #[serde(rename = "testnet")]
    Testnet,
}

impl Cluster {
    /// Default RPC gateway URL for this cluster.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
        }
    }
}

impl std::fmt::Display for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet-beta" => Ok(Cluster::MainnetBeta),
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            _ => Err(format!("Invalid cluster: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_from_str() {
        assert_eq!(Cluster::from_str("mainnet-beta").unwrap(), Cluster::MainnetBeta);
        assert_eq!(Cluster::from_str("devnet").unwrap(), Cluster::Devnet);
        assert_eq!(Cluster::from_str("testnet").unwrap(), Cluster::Testnet);
        assert!(Cluster::from_str("localnet").is_err());
        assert!(Cluster::from_str("").is_err());
    }

    #[test]
    fn test_cluster_round_trip() {
        for cluster in [Cluster::MainnetBeta, Cluster::Devnet, Cluster::Testnet] {
            let string = cluster.to_string();
            let parsed = Cluster::from_str(&string).unwrap();
            assert_eq!(parsed, cluster);
        }
    }

    #[test]
    fn test_cluster_default_rpc_urls() {
        assert!(Cluster::MainnetBeta.default_rpc_url().starts_with("https://"));
        assert!(Cluster::Devnet.default_rpc_url().contains("devnet"));
        assert!(Cluster::Testnet.default_rpc_url().contains("testnet"));
    }

    #[test]
    fn test_cluster_serde_rename() {
        let json = serde_json::to_string(&Cluster::MainnetBeta).unwrap();
        assert_eq!(json, "\"mainnet-beta\"");
        let back: Cluster = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Cluster::MainnetBeta);
    }
}
