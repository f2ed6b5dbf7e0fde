//! Durable retry cache for idempotent batch resume.
//!
//! Maps item identity to its outcome record, persisted write-through with
//! atomic file replacement and advisory locking.

pub mod record;
pub mod store;

pub use record::CacheRecord;
pub use store::{default_cache_path, RetryCache, MAX_CACHE_FILE_SIZE};

/// Errors related to the retry cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// IO error reading or writing the cache file
    #[error("cache IO error: {0}")]
    IoError(String),

    /// Cache file exists but does not match the record schema
    #[error("malformed cache file {path}: {message}")]
    Malformed {
        /// Offending file path
        path: String,
        /// Deserialization failure detail
        message: String,
    },

    /// Cache file too large to load
    #[error("cache file too large: {size} bytes (max: {max} bytes)")]
    TooLarge {
        /// Actual file size
        size: u64,
        /// Maximum allowed size
        max: u64,
    },

    /// Serialization error while persisting
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Advisory lock error
    #[error("lock error: {0}")]
    LockError(String),

    /// Attempt to overwrite a record already marked complete
    #[error("record for {identity} is already complete and immutable")]
    AlreadyComplete {
        /// Identity whose record was about to be clobbered
        identity: String,
    },
}
