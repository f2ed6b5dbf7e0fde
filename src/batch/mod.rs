//! Batch orchestration engine.
//!
//! Drives an ordered list of work items through an unreliable submission
//! operation, one item at a time:
//!
//! 1. Items already recorded successful in the retry cache are skipped.
//! 2. Each remaining item is submitted (typically through
//!    [`crate::retry::submit_with_retry`]).
//! 3. A success is written through to the cache before the next item starts.
//! 4. An item whose retries are exhausted is recorded and the batch moves on;
//!    a single item's permanent failure never aborts the run.
//!
//! Items are processed strictly sequentially. That keeps the write-through
//! cache consistent without a locking protocol and avoids piling concurrent
//! submissions onto one signing wallet.

pub mod item;
pub mod report;
pub mod runner;

pub use item::{load_airdrop_list, AirdropItem, BatchItem, MintTarget, UploadItem};
pub use report::{BatchReport, ItemOutcome, ItemOutput};
pub use runner::{BatchRunner, ItemError};

use crate::cache::CacheError;

/// Fatal batch errors. Per-item failures are recorded in the report and
/// never surface here.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The durable cache could not be read or written; stopping is safer
    /// than risking a duplicate submission on a future re-run
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Malformed batch input, detected before any item processing begins.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Input file could not be read
    #[error("could not read batch input {path}: {message}")]
    Io {
        /// Input file path
        path: String,
        /// Underlying IO failure
        message: String,
    },

    /// Input file is not valid JSON
    #[error("invalid JSON in batch input {path}: {message}")]
    Parse {
        /// Input file path
        path: String,
        /// Parse failure detail
        message: String,
    },

    /// Input JSON is not an array
    #[error("invalid batch input format in {path}: expected an array")]
    NotAnArray {
        /// Input file path
        path: String,
    },

    /// An array entry is missing a required field
    #[error("invalid batch item at index {index}: missing or empty \"{field}\"")]
    MissingField {
        /// Zero-based index of the offending entry
        index: usize,
        /// Name of the missing field
        field: &'static str,
    },

    /// An array entry has the wrong shape
    #[error("invalid batch item at index {index}: expected {expected}")]
    BadItem {
        /// Zero-based index of the offending entry
        index: usize,
        /// Description of the expected shape
        expected: &'static str,
    },
}
