//! Mint command.

use super::{AppContext, CliError};
use crate::batch::{BatchRunner, ItemError, ItemOutput, MintTarget};
use crate::metadata;
use crate::output::ResultEmitter;
use crate::retry::{submit_with_retry, RetryPolicy};
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Arguments for minting NFTs.
#[derive(Args, Debug)]
pub struct MintArgs {
    /// Metadata JSON file path(s) or URI(s)
    pub targets: Vec<String>,

    /// A JSON list of files/URIs to mint
    #[arg(long)]
    pub json_list: Option<PathBuf>,

    /// Do not retry on failure
    #[arg(long)]
    pub no_retry: bool,

    /// Append results to an output log file
    #[arg(long)]
    pub append: Option<PathBuf>,
}

impl MintArgs {
    /// Execute the mint command.
    pub async fn execute(&self, ctx: &AppContext) -> Result<(), CliError> {
        let mut targets = self.targets.clone();
        if let Some(list_path) = &self.json_list {
            targets.extend(load_target_list(list_path)?);
        }

        if targets.is_empty() {
            return Err(CliError::InvalidArgument(
                "at least one metadata target or --json-list must be specified".to_string(),
            ));
        }

        let items: Vec<MintTarget> = targets
            .into_iter()
            .map(|target| MintTarget { target })
            .collect();

        info!(targets = items.len(), "Starting mint batch");

        let policy = if self.no_retry {
            RetryPolicy::disabled()
        } else {
            ctx.policy.clone()
        };

        let mut emitter = ResultEmitter::new(ctx.output_format, self.append.clone());
        emitter.begin();

        let ledger = ctx.ledger.clone();
        let http = ctx.http.clone();
        let shutdown = ctx.shutdown.clone();

        let op = move |item: MintTarget| {
            let ledger = ledger.clone();
            let http = http.clone();
            let policy = policy.clone();
            let shutdown = shutdown.clone();
            async move {
                // A target whose metadata cannot be fetched or validated is
                // a permanent failure for that item; no submission happens.
                let meta = metadata::fetch_metadata(&http, &item.target)
                    .await
                    .map_err(|e| ItemError::Invalid(e.to_string()))?;
                meta.validate().map_err(ItemError::Invalid)?;

                let receipt = submit_with_retry(&policy, Some(shutdown.as_ref()), || {
                    let ledger = ledger.clone();
                    let uri = item.target.clone();
                    async move { ledger.mint_asset(&uri).await }
                })
                .await?;

                Ok(ItemOutput {
                    txid: receipt.tx_id,
                    mint: Some(receipt.mint),
                    metadata_address: Some(receipt.metadata),
                    name: Some(meta.name),
                    ..ItemOutput::default()
                })
            }
        };

        let mut runner = BatchRunner::new().with_shutdown(ctx.shutdown.clone());
        let report = runner
            .run_with(&items, op, |outcome| {
                if let Err(e) = emitter.emit(outcome) {
                    warn!(error = %e, "Failed to emit item result");
                }
            })
            .await?;

        emitter.finish(&report)?;

        if report.cancelled {
            warn!("Mint batch cancelled before completion");
        }
        Ok(())
    }
}

/// Load a JSON list of target strings.
fn load_target_list(path: &Path) -> Result<Vec<String>, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CliError::InvalidArgument(format!("could not read json list {}: {e}", path.display()))
    })?;

    let value: serde_json::Value = serde_json::from_str(&contents).map_err(|e| {
        CliError::InvalidArgument(format!("invalid json list {}: {e}", path.display()))
    })?;

    let entries = value.as_array().ok_or_else(|| {
        CliError::InvalidArgument(format!("{} is not an array", path.display()))
    })?;

    entries
        .iter()
        .map(|entry| {
            entry.as_str().map(str::to_string).ok_or_else(|| {
                CliError::InvalidArgument(format!(
                    "json list expected a string but found {entry}"
                ))
            })
        })
        .collect()
}
