//! Upload command.

use super::{create_progress_bar, AppContext, CliError};
use crate::batch::{BatchRunner, ItemOutput, UploadItem};
use crate::cache::RetryCache;
use crate::funding::plan_and_fund;
use crate::ledger::storage::{HttpContentStore, HttpPricingOracle, PaymentFunder};
use crate::ledger::{storage::DEFAULT_PAYMENT_WALLET, ContentStore};
use crate::output::{OutputFormat, ResultEmitter};
use crate::retry::submit_with_retry;
use bytes::Bytes;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Default storage gateway upload endpoint.
const DEFAULT_UPLOAD_ENDPOINT: &str =
    "https://us-central1-metaplex-studios.cloudfunctions.net/uploadFile";

/// Default base URL of the storage pricing endpoint.
const DEFAULT_PRICING_URL: &str = "https://arweave.net";

/// Arguments for uploading content.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Files or directories to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Retry cache path; without it the upload batch is not resumable
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Storage gateway upload endpoint
    #[arg(long)]
    pub storage_url: Option<String>,
}

impl UploadArgs {
    /// Execute the upload command.
    pub async fn execute(&self, ctx: &AppContext) -> Result<(), CliError> {
        let paths = collect_files(&self.files)?;
        if paths.is_empty() {
            return Err(CliError::InvalidArgument("no files specified".to_string()));
        }

        let items = load_upload_items(&paths)?;
        info!(files = items.len(), "Starting upload batch");

        let oracle = HttpPricingOracle::new(ctx.http.clone(), DEFAULT_PRICING_URL);
        let funder = PaymentFunder::new(ctx.ledger.clone(), DEFAULT_PAYMENT_WALLET);

        // Funding must complete before the first item submission begins.
        let plan = plan_and_fund(&items, &oracle, &funder).await?;
        if ctx.output_format == OutputFormat::Human {
            println!(
                "Storage cost: {} lamports ({} SOL) for {} bytes",
                plan.required_amount,
                plan.required_sol(),
                plan.total_bytes
            );
        }

        let endpoint = self
            .storage_url
            .clone()
            .or_else(|| ctx.config.storage_url.clone())
            .unwrap_or_else(|| DEFAULT_UPLOAD_ENDPOINT.to_string());
        let store: Arc<dyn ContentStore> =
            Arc::new(HttpContentStore::new(ctx.http.clone(), endpoint));

        let mut runner = BatchRunner::new().with_shutdown(ctx.shutdown.clone());
        if let Some(cache_path) = &self.cache {
            runner = runner.with_cache(RetryCache::load(cache_path)?);
        }

        let mut emitter = ResultEmitter::new(ctx.output_format, None);
        emitter.begin();
        let pb = create_progress_bar(items.len() as u64, "Uploading".to_string());

        let store_for_op = store.clone();
        let policy = ctx.policy.clone();
        let shutdown = ctx.shutdown.clone();

        let op = move |item: UploadItem| {
            let store = store_for_op.clone();
            let policy = policy.clone();
            let shutdown = shutdown.clone();
            async move {
                let digest = item.digest();
                let address = submit_with_retry(&policy, Some(shutdown.as_ref()), || {
                    let store = store.clone();
                    let name = item.name.clone();
                    let data = item.data.clone();
                    let content_type = item.content_type.clone();
                    async move { store.upload_item(&name, data, &content_type).await }
                })
                .await?;

                Ok(ItemOutput {
                    txid: address.clone(),
                    content_uri: Some(format!("https://arweave.net/{address}")),
                    digest: Some(digest),
                    ..ItemOutput::default()
                })
            }
        };

        let report = runner
            .run_with(&items, op, |outcome| {
                pb.inc(1);
                pb.suspend(|| {
                    if let Err(e) = emitter.emit(outcome) {
                        warn!(error = %e, "Failed to emit item result");
                    }
                });
            })
            .await?;

        pb.finish_and_clear();
        emitter.finish(&report)?;

        if report.cancelled {
            warn!("Upload batch cancelled before completion");
        }
        Ok(())
    }
}

/// Expand the given paths, walking directories recursively.
fn collect_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for input in inputs {
        walk(input, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn walk(path: &Path, files: &mut Vec<PathBuf>) -> Result<(), CliError> {
    if path.is_dir() {
        let entries = std::fs::read_dir(path).map_err(|e| {
            CliError::InvalidArgument(format!("could not read directory {}: {e}", path.display()))
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| {
                CliError::InvalidArgument(format!("could not read directory entry: {e}"))
            })?;
            walk(&entry.path(), files)?;
        }
    } else if path.is_file() {
        files.push(path.to_path_buf());
    } else {
        return Err(CliError::InvalidArgument(format!(
            "no such file or directory: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Read file contents into upload items.
fn load_upload_items(paths: &[PathBuf]) -> Result<Vec<UploadItem>, CliError> {
    paths
        .iter()
        .map(|path| {
            let data = std::fs::read(path).map_err(|e| {
                CliError::InvalidArgument(format!("error loading {}: {e}", path.display()))
            })?;
            Ok(UploadItem {
                name: path.display().to_string(),
                data: Bytes::from(data),
                content_type: content_type_for(path).to_string(),
            })
        })
        .collect()
}

/// Guess a MIME type from the file extension.
fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("mp4") => "video/mp4",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}
