//! Shared test helpers for batch engine tests.

use nft_batch_tool::batch::AirdropItem;
use nft_batch_tool::ledger::LedgerError;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Scripted submission results keyed by item identity.
///
/// Each identity can be told to fail its first N attempts, or to fail
/// every attempt. Successful attempts yield `tx-{identity}-{attempt}`.
#[derive(Clone, Default)]
pub struct ScriptedSubmitter {
    attempts: Arc<Mutex<HashMap<String, u32>>>,
    fail_first: Arc<Mutex<HashMap<String, u32>>>,
    always_fail: Arc<Mutex<HashSet<String>>>,
}

impl ScriptedSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `n` attempts for `identity`, then succeed.
    pub fn fail_first(&self, identity: &str, n: u32) {
        self.fail_first
            .lock()
            .unwrap()
            .insert(identity.to_string(), n);
    }

    /// Fail every attempt for `identity`.
    pub fn always_fail(&self, identity: &str) {
        self.always_fail
            .lock()
            .unwrap()
            .insert(identity.to_string());
    }

    /// How many attempts `identity` has seen.
    pub fn attempts(&self, identity: &str) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .get(identity)
            .copied()
            .unwrap_or(0)
    }

    /// Perform one scripted attempt.
    pub async fn submit(&self, identity: &str) -> Result<String, LedgerError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let n = attempts.entry(identity.to_string()).or_default();
            *n += 1;
            *n
        };

        if self.always_fail.lock().unwrap().contains(identity) {
            return Err(LedgerError::Network(format!(
                "scripted failure for {identity} (attempt {attempt})"
            )));
        }

        let fail_until = self
            .fail_first
            .lock()
            .unwrap()
            .get(identity)
            .copied()
            .unwrap_or(0);
        if attempt <= fail_until {
            return Err(LedgerError::Network(format!(
                "scripted failure for {identity} (attempt {attempt})"
            )));
        }

        Ok(format!("tx-{identity}-{attempt}"))
    }
}

/// Build airdrop items from (mint, to) pairs.
pub fn airdrop_items(pairs: &[(&str, &str)]) -> Vec<AirdropItem> {
    pairs
        .iter()
        .map(|(mint, to)| AirdropItem {
            mint: mint.to_string(),
            to: to.to_string(),
        })
        .collect()
}

/// Read the raw cache file as a JSON map, as a separate reader would see it.
pub fn read_cache_file(path: &std::path::Path) -> serde_json::Map<String, serde_json::Value> {
    let contents = std::fs::read_to_string(path).expect("cache file should exist");
    serde_json::from_str::<serde_json::Value>(&contents)
        .expect("cache file should be valid JSON")
        .as_object()
        .expect("cache file should be a JSON object")
        .clone()
}
