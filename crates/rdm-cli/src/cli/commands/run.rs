//! `rdm run` – download every source in the input directory.

use anyhow::{Context, Result};
use rdm_core::config::RdmConfig;
use rdm_core::control::{self, RunCancelled, RunControl};
use rdm_core::coordinator::{Coordinator, ProgressStats, RunSummary, SkipReason};
use rdm_core::extract::FfmpegTrimmer;
use rdm_core::fetch::CurlTransport;
use rdm_core::lookups::Lookups;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

const PROGRESS_INTERVAL_MS: u64 = 500;

fn print_summary(summary: &RunSummary) {
    for r in &summary.sources {
        match &r.skipped {
            Some(SkipReason::NoUrlColumn) => {}
            Some(SkipReason::NoIdMapping) => {
                println!("{}: skipped (no identifier column configured)", r.source);
            }
            Some(SkipReason::AlreadyComplete) => {
                println!("{}: already complete ({} rows)", r.source, r.total);
            }
            None => {
                println!(
                    "{}: {} completed, {} failed, {} without url, {} files in {:.1}s{}",
                    r.source,
                    r.completed,
                    r.failed,
                    r.no_url,
                    r.files,
                    r.elapsed.as_secs_f64(),
                    if r.cancelled { " (interrupted)" } else { "" }
                );
            }
        }
    }
    for (source, err) in &summary.errors {
        println!("{}: aborted: {}", source, err);
    }
}

pub async fn run_pipeline(
    cfg: &RdmConfig,
    input_dir: &Path,
    output_dir: &Path,
    detected_only: bool,
) -> Result<()> {
    let lookups = Lookups::load(input_dir, cfg)
        .with_context(|| format!("load lookup tables from {}", input_dir.display()))?;
    let transport = Arc::new(CurlTransport::new(&cfg.transport.clone().unwrap_or_default()));
    let trimmer = Arc::new(FfmpegTrimmer::new(&cfg.ffmpeg_path));

    let run_control = Arc::new(RunControl::new());
    control::watch_ctrl_c(Arc::clone(&run_control));

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressStats>(16);
    let progress_handle = tokio::spawn(async move {
        let mut last_print = Instant::now();
        while let Some(stats) = progress_rx.recv().await {
            let now = Instant::now();
            if now.duration_since(last_print).as_millis() as u64 >= PROGRESS_INTERVAL_MS
                || stats.done >= stats.total
            {
                let eta = stats
                    .eta_secs()
                    .map(|s| format!("{:.0}s", s))
                    .unwrap_or_else(|| "?".to_string());
                println!(
                    "  {}: {} / {} ({:.1}%)  {} failed  {:.2} items/s  ETA {}",
                    stats.source,
                    stats.done,
                    stats.total,
                    stats.fraction() * 100.0,
                    stats.failed,
                    stats.items_per_sec(),
                    eta
                );
                last_print = now;
            }
        }
    });

    let coordinator = Coordinator::new(
        cfg.clone(),
        input_dir,
        output_dir,
        lookups,
        transport,
        trimmer,
    )
    .detected_only(detected_only)
    .with_control(Arc::clone(&run_control))
    .with_progress(progress_tx);

    let summary = coordinator.run_all().await?;
    drop(coordinator);
    let _ = progress_handle.await;

    print_summary(&summary);
    tracing::info!(
        completed = summary.completed(),
        failed = summary.failed(),
        cancelled = summary.cancelled,
        "run finished"
    );

    if summary.cancelled {
        return Err(RunCancelled.into());
    }
    if !summary.errors.is_empty() {
        anyhow::bail!("{} source(s) aborted", summary.errors.len());
    }
    Ok(())
}
