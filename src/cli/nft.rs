//! NFT transfer and airdrop commands.

use super::{AppContext, CliError};
use crate::batch::{load_airdrop_list, AirdropItem, BatchRunner, ItemOutput};
use crate::cache::{default_cache_path, RetryCache};
use crate::ledger::AssetSelector;
use crate::output::ResultEmitter;
use crate::retry::submit_with_retry;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

/// NFT operations.
#[derive(Parser, Debug)]
pub struct NftArgs {
    /// Operation to perform
    #[command(subcommand)]
    pub command: NftCommand,
}

/// NFT subcommands.
#[derive(Subcommand, Debug)]
pub enum NftCommand {
    /// Transfer selected assets to one recipient
    Transfer(TransferArgs),

    /// Idempotent batch of transfers driven by a JSON file
    Airdrop(AirdropArgs),
}

/// Arguments for transferring assets.
#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Recipient wallet address
    pub recipient: String,

    /// Mint address(es) to transfer
    #[arg(short = 'm', long, num_args = 1..)]
    pub mints: Option<Vec<String>>,

    /// Transfer every asset held by this owner
    #[arg(long)]
    pub owner: Option<String>,

    /// Transfer every asset with this verified creator
    #[arg(long)]
    pub creator: Option<String>,
}

/// Arguments for an airdrop batch.
#[derive(Args, Debug)]
pub struct AirdropArgs {
    /// JSON file of the form [{"mint": "...", "to": "..."}, ...]
    pub input: PathBuf,

    /// Retry cache path; defaults to the input path with a -cache.json suffix
    #[arg(long)]
    pub cache: Option<PathBuf>,
}

impl NftArgs {
    /// Execute the selected NFT operation.
    pub async fn execute(&self, ctx: &AppContext) -> Result<(), CliError> {
        match &self.command {
            NftCommand::Transfer(args) => args.execute(ctx).await,
            NftCommand::Airdrop(args) => args.execute(ctx).await,
        }
    }
}

impl TransferArgs {
    /// Execute the transfer command.
    pub async fn execute(&self, ctx: &AppContext) -> Result<(), CliError> {
        let selector = AssetSelector::from_flags(
            self.mints.clone(),
            self.owner.clone(),
            self.creator.clone(),
        )
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;

        let mints = ctx.ledger.assets_for(&selector).await?;
        info!(assets = mints.len(), recipient = %self.recipient, "Starting transfer batch");

        let items: Vec<AirdropItem> = mints
            .into_iter()
            .map(|mint| AirdropItem {
                mint,
                to: self.recipient.clone(),
            })
            .collect();

        let mut runner = BatchRunner::new().with_shutdown(ctx.shutdown.clone());
        let report = run_transfers(&mut runner, &items, ctx).await?;

        if report.cancelled {
            warn!("Transfer batch cancelled before completion");
        }
        Ok(())
    }
}

impl AirdropArgs {
    /// Execute the airdrop command.
    pub async fn execute(&self, ctx: &AppContext) -> Result<(), CliError> {
        // Input validation happens in full before any item is processed.
        let items = load_airdrop_list(&self.input)?;

        let cache_path = self
            .cache
            .clone()
            .unwrap_or_else(|| default_cache_path(&self.input));
        info!(cache = %cache_path.display(), items = items.len(), "Starting airdrop batch");

        let cache = RetryCache::load(cache_path)?;
        let mut runner = BatchRunner::new()
            .with_cache(cache)
            .with_shutdown(ctx.shutdown.clone());

        let report = run_transfers(&mut runner, &items, ctx).await?;

        if report.cancelled {
            warn!("Airdrop cancelled before completion; re-run to resume");
        }
        Ok(())
    }
}

/// Drive a list of transfer items through the runner, emitting results
/// incrementally.
async fn run_transfers(
    runner: &mut BatchRunner,
    items: &[AirdropItem],
    ctx: &AppContext,
) -> Result<crate::batch::BatchReport, CliError> {
    let mut emitter = ResultEmitter::new(ctx.output_format, None);
    emitter.begin();

    let ledger = ctx.ledger.clone();
    let policy = ctx.policy.clone();
    let shutdown = ctx.shutdown.clone();

    let op = move |item: AirdropItem| {
        let ledger = ledger.clone();
        let policy = policy.clone();
        let shutdown = shutdown.clone();
        async move {
            let txid = submit_with_retry(&policy, Some(shutdown.as_ref()), || {
                let ledger = ledger.clone();
                let mint = item.mint.clone();
                let to = item.to.clone();
                async move { ledger.transfer_asset(&mint, &to).await }
            })
            .await?;
            Ok(ItemOutput::txid(txid))
        }
    };

    let report = runner
        .run_with(items, op, |outcome| {
            if let Err(e) = emitter.emit(outcome) {
                warn!(error = %e, "Failed to emit item result");
            }
        })
        .await?;

    emitter.finish(&report)?;
    Ok(report)
}
