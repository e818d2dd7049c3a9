//! `rdm status` – show resume state of every download source.

use anyhow::Result;
use rdm_core::config::RdmConfig;
use rdm_core::coordinator::source_status;
use std::path::Path;

pub fn run_status(cfg: &RdmConfig, input_dir: &Path) -> Result<()> {
    let sources = source_status(input_dir, cfg)?;
    if sources.is_empty() {
        println!("No download sources in {}.", input_dir.display());
        return Ok(());
    }
    println!(
        "{:<32} {:>8} {:>8} {:>8} {}",
        "SOURCE", "ROWS", "DONE", "FAILED", "STATE"
    );
    for s in sources {
        let state = if !s.mapped {
            "unmapped"
        } else if s.is_complete() {
            "complete"
        } else {
            "pending"
        };
        println!(
            "{:<32} {:>8} {:>8} {:>8} {}",
            s.source, s.total, s.ledgered, s.failures, state
        );
    }
    Ok(())
}
