//! Main entry point for the nft-batch-tool CLI.

use clap::Parser;
use nft_batch_tool::cli::{AppContext, Cli, Commands};
use nft_batch_tool::shutdown::ShutdownCoordinator;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting.
fn init_tracing() {
    // Check if JSON output is requested via environment variable
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nft_batch_tool=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    // Install Ctrl+C handler for cooperative cancellation
    let shutdown = ShutdownCoordinator::shared();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - finishing the current item...");
                shutdown.request_shutdown();
            }
        }
    });

    match &cli.command {
        // Config works without a keypair, so it skips context resolution.
        Commands::Config(args) => args.execute(cli)?,
        Commands::Mint(args) => {
            let ctx = AppContext::build(cli, shutdown)?;
            args.execute(&ctx).await?;
        }
        Commands::Nft(args) => {
            let ctx = AppContext::build(cli, shutdown)?;
            args.execute(&ctx).await?;
        }
        Commands::Upload(args) => {
            let ctx = AppContext::build(cli, shutdown)?;
            args.execute(&ctx).await?;
        }
        Commands::Metadata(args) => {
            let ctx = AppContext::build(cli, shutdown)?;
            args.execute(&ctx).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    // Optional Prometheus endpoint, e.g. METRICS_ADDR=0.0.0.0:9090
    if let Ok(addr) = std::env::var("METRICS_ADDR") {
        match addr.parse() {
            Ok(addr) => {
                if let Err(e) = nft_batch_tool::metrics::init_metrics(addr) {
                    error!("Failed to initialize metrics: {}", e);
                }
            }
            Err(e) => error!("Invalid METRICS_ADDR {addr}: {e}"),
        }
    }

    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
