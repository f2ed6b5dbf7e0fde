//! Batch work item types and input parsing.

use super::ValidationError;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::path::Path;

/// One unit of batch work.
///
/// The identity is the stable key used for idempotent resume: re-running a
/// batch never re-executes an identity the cache already records as
/// successful.
pub trait BatchItem {
    /// Stable key distinguishing this item.
    fn identity(&self) -> &str;

    /// Target principal of the operation, when there is one.
    fn destination(&self) -> Option<&str> {
        None
    }
}

/// One airdrop transfer: send `mint` to `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirdropItem {
    /// Mint address of the asset to transfer
    pub mint: String,
    /// Recipient wallet address
    pub to: String,
}

impl BatchItem for AirdropItem {
    fn identity(&self) -> &str {
        &self.mint
    }

    fn destination(&self) -> Option<&str> {
        Some(&self.to)
    }
}

/// One mint target: a file path or URI pointing at metadata JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintTarget {
    /// File path or URI of the metadata JSON
    pub target: String,
}

impl BatchItem for MintTarget {
    fn identity(&self) -> &str {
        &self.target
    }
}

/// One content item to upload.
#[derive(Debug, Clone)]
pub struct UploadItem {
    /// Source name (file path), used as the item identity
    pub name: String,
    /// Payload bytes
    pub data: Bytes,
    /// MIME type of the payload
    pub content_type: String,
}

impl UploadItem {
    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Hex-encoded SHA-256 digest of the payload, reported alongside the
    /// content address so uploads can be verified after the fact.
    pub fn digest(&self) -> String {
        format!("{:x}", Sha256::digest(&self.data))
    }
}

impl BatchItem for UploadItem {
    fn identity(&self) -> &str {
        &self.name
    }
}

/// Load and validate an airdrop list file.
///
/// The expected format is a JSON array of `{"mint": "...", "to": "..."}`
/// objects. Any malformed entry fails the whole load before item processing
/// begins. An empty array is valid and yields an empty batch.
pub fn load_airdrop_list(path: &Path) -> Result<Vec<AirdropItem>, ValidationError> {
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|e| ValidationError::Io {
        path: display.clone(),
        message: e.to_string(),
    })?;

    let value: serde_json::Value =
        serde_json::from_str(&contents).map_err(|e| ValidationError::Parse {
            path: display.clone(),
            message: e.to_string(),
        })?;

    let entries = value
        .as_array()
        .ok_or(ValidationError::NotAnArray { path: display })?;

    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let object = entry.as_object().ok_or(ValidationError::BadItem {
            index,
            expected: "an object with \"mint\" and \"to\" fields",
        })?;

        let mint = non_empty_string(object, "mint")
            .ok_or(ValidationError::MissingField { index, field: "mint" })?;
        let to = non_empty_string(object, "to")
            .ok_or(ValidationError::MissingField { index, field: "to" })?;

        items.push(AirdropItem { mint, to });
    }

    Ok(items)
}

fn non_empty_string(
    object: &serde_json::Map<String, serde_json::Value>,
    field: &str,
) -> Option<String> {
    object
        .get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
