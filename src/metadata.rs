//! Off-ledger metadata documents for mint targets.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Metadata document referenced by a mint target.
///
/// Only the fields the tool needs are modeled; the rest of the document is
/// carried through untouched in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataJson {
    /// Asset display name
    pub name: String,
    /// Short symbol
    #[serde(default)]
    pub symbol: String,
    /// Asset description
    #[serde(default)]
    pub description: String,
    /// Primary image URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// External link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    /// Royalty fee in basis points
    #[serde(default)]
    pub seller_fee_basis_points: u16,
    /// Remaining document fields, preserved as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MetadataJson {
    /// Validate the fields a mint submission depends on.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("metadata name cannot be empty".to_string());
        }

        if self.symbol.len() > 10 {
            return Err(format!(
                "metadata symbol too long ({} chars, max 10)",
                self.symbol.len()
            ));
        }

        if self.image.as_deref().is_some_and(str::is_empty) {
            return Err("metadata image cannot be empty when present".to_string());
        }

        if self.seller_fee_basis_points > 10_000 {
            return Err(format!(
                "seller fee basis points out of range: {}",
                self.seller_fee_basis_points
            ));
        }

        Ok(())
    }
}

/// Errors loading a metadata document.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Local file could not be read
    #[error("could not read metadata file {path}: {message}")]
    Io {
        /// Metadata file path
        path: String,
        /// Underlying IO failure
        message: String,
    },

    /// Remote fetch failed
    #[error("failed to fetch metadata at {uri}: {message}")]
    Fetch {
        /// Metadata URI
        uri: String,
        /// Underlying failure
        message: String,
    },

    /// Document is not valid metadata JSON
    #[error("invalid metadata at {target}: {message}")]
    Parse {
        /// File path or URI
        target: String,
        /// Parse failure detail
        message: String,
    },
}

/// Whether a mint target is a URI (as opposed to a local file path).
pub fn is_url(target: &str) -> bool {
    reqwest::Url::parse(target).is_ok()
}

/// Load a metadata document from a file path or URI.
pub async fn fetch_metadata(client: &Client, target: &str) -> Result<MetadataJson, MetadataError> {
    if is_url(target) {
        debug!(uri = target, "Fetching metadata");
        let response = client
            .get(target)
            .send()
            .await
            .map_err(|e| MetadataError::Fetch {
                uri: target.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Fetch {
                uri: target.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        response.json().await.map_err(|e| MetadataError::Parse {
            target: target.to_string(),
            message: e.to_string(),
        })
    } else {
        debug!(path = target, "Reading metadata file");
        let contents =
            std::fs::read_to_string(Path::new(target)).map_err(|e| MetadataError::Io {
                path: target.to_string(),
                message: e.to_string(),
            })?;

        serde_json::from_str(&contents).map_err(|e| MetadataError::Parse {
            target: target.to_string(),
            message: e.to_string(),
        })
    }
}
