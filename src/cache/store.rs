//! Retry cache persistence with atomic writes and file locking.

use super::record::CacheRecord;
use super::CacheError;
use fd_lock::RwLock;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Maximum allowed cache file size (10 MB) to prevent memory exhaustion
pub const MAX_CACHE_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Derive the default cache path from a batch input path.
///
/// The input file's extension is replaced with a `-cache.json` suffix:
/// `airdrop.json` becomes `airdrop-cache.json`.
pub fn default_cache_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "batch".to_string());
    input.with_file_name(format!("{stem}-cache.json"))
}

/// Durable map from item identity to [`CacheRecord`].
///
/// The on-disk format is a JSON object keyed by identity, matching the
/// batch tooling's cache files:
///
/// ```json
/// {
///   "mintAddr1": { "to": "recipient1", "txid": "5xY...", "date": "2024-..." },
///   "mintAddr2": { "to": "recipient2" }
/// }
/// ```
///
/// The file is single-writer, single-run; an advisory fd-lock guards each
/// load/persist pair against accidental concurrent runs on the same path.
#[derive(Debug)]
pub struct RetryCache {
    path: PathBuf,
    records: BTreeMap<String, CacheRecord>,
}

impl RetryCache {
    /// Load the cache at `path`, merging with any prior persisted state.
    ///
    /// A missing file yields an empty cache. A file that exists but cannot
    /// be parsed against the record schema is a hard error: proceeding
    /// without a reliable durable record risks duplicate submission on a
    /// future re-run.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();

        if !path.exists() {
            debug!(path = %path.display(), "No cache file found, starting empty");
            return Ok(Self {
                path,
                records: BTreeMap::new(),
            });
        }

        let mut lock = open_lock_file(&path)?;
        let _guard = lock
            .read()
            .map_err(|e| CacheError::LockError(format!("Failed to acquire read lock: {e}")))?;

        let metadata =
            std::fs::metadata(&path).map_err(|e| CacheError::IoError(e.to_string()))?;
        if metadata.len() > MAX_CACHE_FILE_SIZE {
            return Err(CacheError::TooLarge {
                size: metadata.len(),
                max: MAX_CACHE_FILE_SIZE,
            });
        }

        let contents =
            std::fs::read_to_string(&path).map_err(|e| CacheError::IoError(e.to_string()))?;

        let records: BTreeMap<String, CacheRecord> =
            serde_json::from_str(&contents).map_err(|e| CacheError::Malformed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        info!(
            path = %path.display(),
            records = records.len(),
            completed = records.values().filter(|r| r.is_complete()).count(),
            "Loaded retry cache"
        );

        Ok(Self { path, records })
    }

    /// The path this cache persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the record for an identity.
    pub fn get(&self, identity: &str) -> Option<&CacheRecord> {
        self.records.get(identity)
    }

    /// Whether the identity already has a final record.
    pub fn is_complete(&self, identity: &str) -> bool {
        self.records
            .get(identity)
            .is_some_and(CacheRecord::is_complete)
    }

    /// Ensure an in-memory record exists for an identity.
    ///
    /// Creates a pending record on first encounter; an existing record
    /// (pending or complete) is left untouched.
    pub fn ensure_pending(&mut self, identity: &str, to: &str) {
        self.records
            .entry(identity.to_string())
            .or_insert_with(|| CacheRecord::pending(to));
    }

    /// Replace the record for an identity with a final one.
    ///
    /// Refuses to overwrite a record that is already complete.
    pub fn mark_complete(
        &mut self,
        identity: &str,
        record: CacheRecord,
    ) -> Result<(), CacheError> {
        if self.is_complete(identity) {
            return Err(CacheError::AlreadyComplete {
                identity: identity.to_string(),
            });
        }
        self.records.insert(identity.to_string(), record);
        Ok(())
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cache holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all records.
    pub fn records(&self) -> impl Iterator<Item = (&String, &CacheRecord)> {
        self.records.iter()
    }

    /// Persist the full map to disk atomically.
    ///
    /// Writes to a temp file in the same directory, fsyncs, then renames
    /// over the target, so a reader immediately after `persist` sees either
    /// the fully-old or fully-new content.
    pub fn persist(&self) -> Result<(), CacheError> {
        debug!(
            path = %self.path.display(),
            records = self.records.len(),
            "Persisting retry cache"
        );

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::IoError(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;

        let mut lock = open_lock_file(&self.path)?;
        let _guard = lock
            .write()
            .map_err(|e| CacheError::LockError(format!("Failed to acquire write lock: {e}")))?;

        let parent_dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir)
            .map_err(|e| CacheError::IoError(format!("Failed to create temp file: {e}")))?;

        temp_file
            .write_all(json.as_bytes())
            .map_err(|e| CacheError::IoError(format!("Failed to write to temp file: {e}")))?;

        temp_file
            .flush()
            .map_err(|e| CacheError::IoError(format!("Failed to flush temp file: {e}")))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| CacheError::IoError(format!("Failed to sync temp file: {e}")))?;

        temp_file
            .persist(&self.path)
            .map_err(|e| CacheError::IoError(format!("Failed to persist temp file: {e}")))?;

        // Fsync parent directory so the rename is durable across a crash
        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = std::fs::File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }
}

fn open_lock_file(path: &Path) -> Result<RwLock<std::fs::File>, CacheError> {
    let lock_path = path.with_extension("lock");
    let lock_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| CacheError::LockError(format!("Failed to create lock file: {e}")))?;
    Ok(RwLock::new(lock_file))
}
