//! Per-identity outcome records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome record for one item identity.
///
/// A record with `txid` set is final: it is never overwritten by a later
/// run, which is what makes re-running a partially completed batch safe.
/// The schema is strict; unknown fields in a cache file fail the load
/// rather than silently carrying malformed state into the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheRecord {
    /// Destination principal of the operation
    pub to: String,
    /// Transaction id, present only on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    /// Completion timestamp, set on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl CacheRecord {
    /// Record for an identity that has been seen but not yet completed.
    pub fn pending(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            txid: None,
            date: None,
        }
    }

    /// Final record for a successful submission.
    pub fn completed(to: impl Into<String>, txid: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            txid: Some(txid.into()),
            date: Some(Utc::now()),
        }
    }

    /// Whether this record is final.
    pub fn is_complete(&self) -> bool {
        self.txid.is_some()
    }
}
