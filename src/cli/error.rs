//! CLI error types and conversions.

use crate::batch::{BatchError, ValidationError};
use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::funding::FundingError;
use crate::ledger::LedgerError;
use crate::metadata::MetadataError;
use crate::output::OutputError;

/// CLI errors. Every variant is fatal: it stops the run with a non-zero
/// exit. Per-item failures are reported through the batch report instead.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Batch input validation error
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Batch engine error
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),

    /// Retry cache error
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Upload funding error
    #[error("funding error: {0}")]
    Funding(#[from] FundingError),

    /// Ledger capability error
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Metadata lookup error
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
