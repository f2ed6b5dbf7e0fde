//! Batch result output.
//!
//! Results are emitted incrementally as items complete, either as
//! human-readable blocks or as a JSON array. With `--append`, human output
//! is also appended to a log file, and JSON output is merged into an
//! existing JSON log at the end of the run.

use crate::batch::report::{BatchReport, ItemOutcome};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

/// Output errors.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error writing the append log
    #[error("output IO error: {0}")]
    IoError(String),

    /// Append log exists but is not a JSON array
    #[error("append log {path} is not a JSON array")]
    BadAppendLog {
        /// Append log path
        path: String,
    },
}

/// Render one outcome as a human-readable block.
pub fn outcome_to_string(outcome: &ItemOutcome) -> String {
    if let Some(error) = &outcome.error {
        return format!("[error]  {error} {}\n", outcome.identity);
    }

    if outcome.skipped {
        return format!(
            "[skipped] {} already recorded{}\n",
            outcome.identity,
            outcome
                .txid
                .as_deref()
                .map(|tx| format!(" (txId: {tx})"))
                .unwrap_or_default()
        );
    }

    let mut block = format!(
        "[success] {}\n  target: {}\n",
        outcome.name.as_deref().unwrap_or(&outcome.identity),
        outcome.identity
    );
    if let Some(to) = &outcome.destination {
        block.push_str(&format!("  to: {to}\n"));
    }
    if let Some(mint) = &outcome.mint {
        block.push_str(&format!("  mint: {mint}\n"));
    }
    if let Some(metadata) = &outcome.metadata_address {
        block.push_str(&format!("  metadata: {metadata}\n"));
    }
    if let Some(uri) = &outcome.content_uri {
        block.push_str(&format!("  uri: {uri}\n"));
    }
    if let Some(digest) = &outcome.digest {
        block.push_str(&format!("  sha256: {digest}\n"));
    }
    if let Some(txid) = &outcome.txid {
        block.push_str(&format!("  txId: {txid}\n"));
    }
    block
}

/// Incremental result emitter.
pub struct ResultEmitter {
    format: OutputFormat,
    append: Option<PathBuf>,
    emitted: usize,
    collected: Vec<ItemOutcome>,
}

impl ResultEmitter {
    /// Create an emitter.
    pub fn new(format: OutputFormat, append: Option<PathBuf>) -> Self {
        Self {
            format,
            append,
            emitted: 0,
            collected: Vec::new(),
        }
    }

    /// Emit the opening of the result stream.
    pub fn begin(&self) {
        if self.format == OutputFormat::Json && self.append.is_none() {
            println!("[");
        }
    }

    /// Emit one outcome as it completes.
    pub fn emit(&mut self, outcome: &ItemOutcome) -> Result<(), OutputError> {
        self.emitted += 1;

        match self.format {
            OutputFormat::Json => {
                if self.append.is_some() {
                    self.collected.push(outcome.clone());
                } else {
                    let json = serde_json::to_string_pretty(outcome)
                        .map_err(|e| OutputError::IoError(e.to_string()))?;
                    // Separator goes before every entry but the first, so
                    // the array stays well-formed even if the run stops
                    // early.
                    if self.emitted > 1 {
                        print!(",");
                    }
                    println!("{json}");
                }
            }
            OutputFormat::Human => {
                let block = outcome_to_string(outcome);
                print!("{block}");
                if let Some(path) = &self.append {
                    let mut file = std::fs::OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(path)
                        .map_err(|e| OutputError::IoError(e.to_string()))?;
                    file.write_all(block.as_bytes())
                        .map_err(|e| OutputError::IoError(e.to_string()))?;
                }
            }
        }

        Ok(())
    }

    /// Close the result stream and print the final summary.
    pub fn finish(&mut self, report: &BatchReport) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                if let Some(path) = &self.append {
                    let mut log: Vec<serde_json::Value> = if path.exists() {
                        let contents = std::fs::read_to_string(path)
                            .map_err(|e| OutputError::IoError(e.to_string()))?;
                        serde_json::from_str(&contents).map_err(|_| OutputError::BadAppendLog {
                            path: path.display().to_string(),
                        })?
                    } else {
                        Vec::new()
                    };

                    for outcome in &self.collected {
                        let value = serde_json::to_value(outcome)
                            .map_err(|e| OutputError::IoError(e.to_string()))?;
                        log.push(value);
                    }

                    let json = serde_json::to_string_pretty(&log)
                        .map_err(|e| OutputError::IoError(e.to_string()))?;
                    std::fs::write(path, json).map_err(|e| OutputError::IoError(e.to_string()))?;
                } else {
                    println!("]");
                }
            }
            OutputFormat::Human => {
                println!("{}", report.summary());
            }
        }

        Ok(())
    }
}
