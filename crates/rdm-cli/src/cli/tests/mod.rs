//! CLI parse tests.

use super::{apply_overrides, Cli, CliCommand};
use clap::Parser;
use rdm_core::config::RdmConfig;
use std::path::Path;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_run_defaults() {
    match parse(&["rdm", "run"]) {
        CliCommand::Run {
            input_dir,
            output_dir,
            workers,
            detected_only,
            timestamp_format,
        } => {
            assert_eq!(input_dir, Path::new("."));
            assert_eq!(output_dir, Path::new("."));
            assert!(workers.is_none());
            assert!(!detected_only);
            assert!(timestamp_format.is_none());
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_all_flags() {
    match parse(&[
        "rdm",
        "run",
        "--input-dir",
        "/data/export",
        "--output-dir",
        "/data/audio",
        "--workers",
        "8",
        "--detected-only",
        "--timestamp-format",
        "%Y-%m-%d %H:%M:%S",
    ]) {
        CliCommand::Run {
            input_dir,
            output_dir,
            workers,
            detected_only,
            timestamp_format,
        } => {
            assert_eq!(input_dir, Path::new("/data/export"));
            assert_eq!(output_dir, Path::new("/data/audio"));
            assert_eq!(workers, Some(8));
            assert!(detected_only);
            assert_eq!(timestamp_format.as_deref(), Some("%Y-%m-%d %H:%M:%S"));
        }
        _ => panic!("expected Run with flags"),
    }
}

#[test]
fn cli_parse_run_rejects_non_numeric_workers() {
    assert!(Cli::try_parse_from(["rdm", "run", "--workers", "many"]).is_err());
}

#[test]
fn cli_parse_status() {
    match parse(&["rdm", "status", "--input-dir", "/data/export"]) {
        CliCommand::Status { input_dir } => assert_eq!(input_dir, Path::new("/data/export")),
        _ => panic!("expected Status"),
    }
}

#[test]
fn cli_parse_unknown_subcommand_fails() {
    assert!(Cli::try_parse_from(["rdm", "add", "https://example.com/a.wav"]).is_err());
}

#[test]
fn overrides_replace_config_values() {
    let cfg = apply_overrides(RdmConfig::default(), Some(3), Some("%d/%m/%Y %H:%M".into()));
    assert_eq!(cfg.workers, Some(3));
    assert_eq!(cfg.timestamp_format, "%d/%m/%Y %H:%M");
}

#[test]
fn no_overrides_keep_config() {
    let base = RdmConfig {
        workers: Some(5),
        ..RdmConfig::default()
    };
    let cfg = apply_overrides(base, None, None);
    assert_eq!(cfg.workers, Some(5));
    assert_eq!(cfg.timestamp_format, "%m/%d/%y %H:%M:%S");
}

#[test]
fn status_on_directory_without_sources() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("species.csv"), "species_id,scientific_name\n").unwrap();
    super::commands::run_status(&RdmConfig::default(), dir.path()).unwrap();
}

#[test]
fn status_missing_directory_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(super::commands::run_status(&RdmConfig::default(), &missing).is_err());
}
