//! Metadata lookup command.

use super::{AppContext, CliError};
use crate::ledger::{AssetMetadata, MetadataQuery};
use crate::metadata::{self, MetadataJson};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

/// Metadata operations.
#[derive(Parser, Debug)]
pub struct MetadataArgs {
    /// Operation to perform
    #[command(subcommand)]
    pub command: MetadataCommand,
}

/// Metadata subcommands.
#[derive(Subcommand, Debug)]
pub enum MetadataCommand {
    /// Fetch and display asset metadata
    Get(GetArgs),
}

/// Arguments for fetching metadata.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Mint address
    #[arg(short = 'm', long)]
    pub mint: Option<String>,

    /// Metadata account address
    #[arg(short = 'a', long)]
    pub address: Option<String>,

    /// Output single line JSON
    #[arg(long)]
    pub json: bool,

    /// Output multiline JSON
    #[arg(long)]
    pub json_multiline: bool,

    /// Don't fetch and return URI data
    #[arg(long)]
    pub no_fetch_uri: bool,
}

/// Metadata plus the optional document fetched from its URI.
#[derive(Debug, Serialize)]
struct PrintableMetadata {
    #[serde(flatten)]
    metadata: AssetMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri_data: Option<MetadataJson>,
}

impl MetadataArgs {
    /// Execute the selected metadata operation.
    pub async fn execute(&self, ctx: &AppContext) -> Result<(), CliError> {
        match &self.command {
            MetadataCommand::Get(args) => args.execute(ctx).await,
        }
    }
}

impl GetArgs {
    /// Execute the get command.
    pub async fn execute(&self, ctx: &AppContext) -> Result<(), CliError> {
        let query = match (&self.mint, &self.address) {
            (Some(mint), None) => MetadataQuery::Mint(mint.clone()),
            (None, Some(address)) => MetadataQuery::Address(address.clone()),
            _ => {
                return Err(CliError::InvalidArgument(
                    "either --address or --mint must be provided".to_string(),
                ))
            }
        };

        let metadata = ctx.ledger.asset_metadata(&query).await?;

        let uri_data = if self.no_fetch_uri {
            None
        } else {
            match metadata::fetch_metadata(&ctx.http, &metadata.uri).await {
                Ok(doc) => Some(doc),
                Err(e) => {
                    debug!(error = %e, "Could not fetch URI data");
                    None
                }
            }
        };

        let printable = PrintableMetadata { metadata, uri_data };

        if self.json {
            println!(
                "{}",
                serde_json::to_string(&printable)
                    .map_err(|e| CliError::InvalidArgument(e.to_string()))?
            );
        } else if self.json_multiline {
            println!(
                "{}",
                serde_json::to_string_pretty(&printable)
                    .map_err(|e| CliError::InvalidArgument(e.to_string()))?
            );
        } else {
            pretty_print(&printable);
        }

        Ok(())
    }
}

fn pretty_print(printable: &PrintableMetadata) {
    let meta = &printable.metadata;
    println!(
        "\n{} ({}){}",
        meta.name,
        meta.symbol,
        if meta.mutable { " [mutable]" } else { "" }
    );

    if let Some(doc) = &printable.uri_data {
        if !doc.description.is_empty() {
            println!("\n{}", doc.description);
        }
        if let Some(image) = &doc.image {
            println!("\nImage:       {image}");
        }
        if let Some(external) = &doc.external_url {
            println!("ExternalUrl: {external}");
        }
    }

    println!("\nURI:        {}", meta.uri);
    println!("Mint:       {}", meta.mint);
    if let Some(authority) = &meta.update_authority {
        println!("UpdateAuth: {authority}");
    }

    if !meta.creators.is_empty() {
        println!(
            "\nCreators: ({:.2}% fees)",
            f64::from(meta.seller_fee_basis_points) / 100.0
        );
        for creator in &meta.creators {
            println!(
                "  {}: {}{}",
                creator.address,
                creator.share,
                if creator.verified { " [verified]" } else { "" }
            );
        }
    }
}
