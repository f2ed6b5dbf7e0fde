//! Batch result aggregation.

use serde::Serialize;

/// Operation-specific success details returned by a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemOutput {
    /// Transaction id of the successful submission
    pub txid: String,
    /// Mint address (mint operations)
    pub mint: Option<String>,
    /// Metadata account address (mint operations)
    pub metadata_address: Option<String>,
    /// Display name from the item's metadata (mint operations)
    pub name: Option<String>,
    /// Content address (upload operations)
    pub content_uri: Option<String>,
    /// Payload digest (upload operations)
    pub digest: Option<String>,
}

impl ItemOutput {
    /// Output carrying only a transaction id.
    pub fn txid(txid: impl Into<String>) -> Self {
        Self {
            txid: txid.into(),
            ..Self::default()
        }
    }
}

/// Outcome of one batch item, in input order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ItemOutcome {
    /// Item identity (mint address, file path, URI)
    #[serde(rename = "target")]
    pub identity: String,
    /// Destination principal, when the operation has one
    #[serde(rename = "to", skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Transaction id, present on success (including skipped items whose
    /// cached record carries one)
    #[serde(rename = "txId", skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    /// Mint address of a newly minted asset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint: Option<String>,
    /// Metadata account address of a newly minted asset
    #[serde(rename = "metadata", skip_serializing_if = "Option::is_none")]
    pub metadata_address: Option<String>,
    /// Display name from the item's metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Content address of an uploaded item
    #[serde(rename = "contentUri", skip_serializing_if = "Option::is_none")]
    pub content_uri: Option<String>,
    /// Payload digest of an uploaded item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Error message, present on permanent failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the item was skipped as already done
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

impl ItemOutcome {
    /// Outcome for a fresh success.
    pub fn success(identity: &str, destination: Option<&str>, output: ItemOutput) -> Self {
        Self {
            identity: identity.to_string(),
            destination: destination.map(str::to_string),
            txid: Some(output.txid),
            mint: output.mint,
            metadata_address: output.metadata_address,
            name: output.name,
            content_uri: output.content_uri,
            digest: output.digest,
            error: None,
            skipped: false,
        }
    }

    /// Outcome copied from a cached record; the item was not re-attempted.
    pub fn skipped(identity: &str, destination: Option<&str>, txid: Option<&str>) -> Self {
        Self {
            identity: identity.to_string(),
            destination: destination.map(str::to_string),
            txid: txid.map(str::to_string),
            mint: None,
            metadata_address: None,
            name: None,
            content_uri: None,
            digest: None,
            error: None,
            skipped: true,
        }
    }

    /// Outcome for a permanent failure.
    pub fn failed(identity: &str, destination: Option<&str>, error: impl Into<String>) -> Self {
        Self {
            identity: identity.to_string(),
            destination: destination.map(str::to_string),
            txid: None,
            mint: None,
            metadata_address: None,
            name: None,
            content_uri: None,
            digest: None,
            error: Some(error.into()),
            skipped: false,
        }
    }

    /// Whether this outcome represents a success (fresh or cached).
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Ordered per-item outcomes plus aggregate counts.
///
/// Output order equals input order; for a run that was not cancelled the
/// length equals the input length.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Per-item outcomes in input order
    pub outcomes: Vec<ItemOutcome>,
    /// Items that failed permanently
    pub error_count: usize,
    /// Items skipped as already done
    pub skipped_count: usize,
    /// Items freshly submitted with success
    pub submitted_count: usize,
    /// Whether the run stopped early on a shutdown request
    pub cancelled: bool,
}

impl BatchReport {
    /// Report sized for `len` items.
    pub fn with_capacity(len: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(len),
            ..Self::default()
        }
    }

    /// Append an outcome, maintaining the aggregate counts.
    pub fn push(&mut self, outcome: ItemOutcome) {
        if outcome.error.is_some() {
            self.error_count += 1;
        } else if outcome.skipped {
            self.skipped_count += 1;
        } else {
            self.submitted_count += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Total items the report covers.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the report covers no items.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!(
            "Completed with {} error(s): {} submitted, {} skipped as already done, {} failed{}",
            self.error_count,
            self.submitted_count,
            self.skipped_count,
            self.error_count,
            if self.cancelled { " (cancelled)" } else { "" }
        )
    }
}
