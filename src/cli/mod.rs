//! CLI command implementations.

pub mod config_cmd;
pub mod error;
pub mod metadata_cmd;
pub mod mint;
pub mod nft;
pub mod upload;

pub use error::CliError;

use crate::config::{default_config_path, Config};
use crate::ledger::{LedgerClient, RpcGateway};
use crate::output::OutputFormat;
use crate::retry::RetryPolicy;
use crate::shutdown::SharedShutdown;
use crate::Cluster;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// HTTP timeout for gateway and metadata requests.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// NFT batch tool CLI.
#[derive(Parser, Debug)]
#[command(name = "nft-batch-tool")]
#[command(about = "Batch NFT operations against a remote ledger", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Signing wallet for transactions. Overrides config
    #[arg(long, global = true)]
    pub keypair: Option<String>,

    /// Custom RPC gateway URL. Overrides config
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Ledger cluster. Overrides config; ignored if --rpc-url is given
    #[arg(long, global = true)]
    pub cluster: Option<Cluster>,

    /// Output format (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Maximum submission attempts per item (range 1-20)
    #[arg(long, global = true, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_retries: u32,

    /// Fixed delay between attempts in milliseconds
    #[arg(long, global = true, default_value = "2000")]
    pub retry_delay_ms: u64,
}

/// CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mint NFTs from metadata files or URIs
    Mint(mint::MintArgs),

    /// NFT transfer and airdrop operations
    Nft(nft::NftArgs),

    /// Upload content to durable storage
    Upload(upload::UploadArgs),

    /// Look up asset metadata
    Metadata(metadata_cmd::MetadataArgs),

    /// Read or change tool configuration
    Config(config_cmd::ConfigArgs),
}

/// Resolved execution context shared by the submitting commands.
pub struct AppContext {
    /// Loaded configuration
    pub config: Config,
    /// Effective RPC gateway URL
    pub rpc_url: String,
    /// Effective cluster
    pub cluster: Cluster,
    /// Signing wallet
    pub keypair: String,
    /// Retry policy from the global flags
    pub policy: RetryPolicy,
    /// Output format
    pub output_format: OutputFormat,
    /// Shutdown handle for cooperative cancellation
    pub shutdown: SharedShutdown,
    /// Shared HTTP client
    pub http: reqwest::Client,
    /// Ledger gateway client
    pub ledger: Arc<dyn LedgerClient>,
}

impl AppContext {
    /// Resolve the context from CLI flags and the config file.
    ///
    /// The config path is resolved exactly once, here; everything downstream
    /// receives explicit values.
    pub fn build(cli: &Cli, shutdown: SharedShutdown) -> Result<Self, CliError> {
        let config_path = cli.config.clone().unwrap_or_else(default_config_path);
        debug!(path = %config_path.display(), "Loading config");
        let config = Config::load_or_init(&config_path)?;

        let cluster = cli.cluster.unwrap_or(config.cluster);
        let rpc_url = cli
            .rpc_url
            .clone()
            .or_else(|| config.rpc_url.clone())
            .unwrap_or_else(|| cluster.default_rpc_url().to_string());

        let keypair = cli
            .keypair
            .clone()
            .or_else(|| config.keypair.clone())
            .ok_or_else(|| {
                CliError::InvalidArgument(
                    "No keypair found. Set one with `config set keypair <wallet>` or --keypair"
                        .to_string(),
                )
            })?;

        let policy = RetryPolicy::new(
            cli.max_retries,
            Duration::from_millis(cli.retry_delay_ms),
        );

        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| CliError::InvalidArgument(format!("HTTP client setup failed: {e}")))?;

        let ledger: Arc<dyn LedgerClient> =
            Arc::new(RpcGateway::new(http.clone(), rpc_url.clone(), keypair.clone()));

        Ok(Self {
            config,
            rpc_url,
            cluster,
            keypair,
            policy,
            output_format: cli.output_format,
            shutdown,
            http,
            ledger,
        })
    }
}

/// Create a progress bar for a batch of `total` items.
pub(crate) fn create_progress_bar(total: u64, message: String) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .expect("hardcoded template is valid")
            .progress_chars("#>-"),
    );
    pb.set_message(message);
    pb
}
