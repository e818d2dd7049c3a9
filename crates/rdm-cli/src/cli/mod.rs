//! CLI for the RDM recording download manager.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rdm_core::config::{self, RdmConfig};
use std::path::PathBuf;

use commands::{run_pipeline, run_status};

/// Top-level CLI for the RDM recording download manager.
#[derive(Debug, Parser)]
#[command(name = "rdm")]
#[command(about = "RDM: resumable bulk downloader for field recordings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every CSV source in the input directory, resuming from its ledger.
    Run {
        /// Directory holding the CSV sources, lookup tables and ledgers.
        #[arg(long, default_value = ".", value_name = "DIR")]
        input_dir: PathBuf,
        /// Root of the output tree.
        #[arg(long, default_value = ".", value_name = "DIR")]
        output_dir: PathBuf,
        /// Concurrent downloads (overrides config; default is available parallelism).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
        /// Only download recordings that have detections, into the detected directory.
        #[arg(long)]
        detected_only: bool,
        /// chrono format of the `datetime` column (overrides config).
        #[arg(long, value_name = "FMT")]
        timestamp_format: Option<String>,
    },

    /// Show per-source resume state: rows, ledgered ids, recorded failures.
    Status {
        /// Directory holding the CSV sources and ledgers.
        #[arg(long, default_value = ".", value_name = "DIR")]
        input_dir: PathBuf,
    },
}

/// Apply command-line overrides on top of the loaded config.
pub(crate) fn apply_overrides(
    mut cfg: RdmConfig,
    workers: Option<usize>,
    timestamp_format: Option<String>,
) -> RdmConfig {
    if let Some(n) = workers {
        cfg.workers = Some(n);
    }
    if let Some(fmt) = timestamp_format {
        cfg.timestamp_format = fmt;
    }
    cfg
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;

        match cli.command {
            CliCommand::Run {
                input_dir,
                output_dir,
                workers,
                detected_only,
                timestamp_format,
            } => {
                let cfg = apply_overrides(cfg, workers, timestamp_format);
                tracing::debug!("loaded config: {:?}", cfg);
                run_pipeline(&cfg, &input_dir, &output_dir, detected_only).await?;
            }
            CliCommand::Status { input_dir } => run_status(&cfg, &input_dir)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
