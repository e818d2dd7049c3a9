//! Ledger and failure-list tests (temp directories, no shared state).

use std::collections::HashSet;
use std::fs;

use super::*;

fn set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn missing_file_is_empty_first_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = ledger_path(dir.path(), "recordings");
    assert!(load(&path).unwrap().is_empty());
    let ledger = Ledger::open(&path).unwrap();
    assert!(ledger.is_empty());
    assert!(!path.exists(), "file is created on first append only");
}

#[test]
fn unreadable_path_is_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be cannot be read as a ledger.
    let path = ledger_path(dir.path(), "recordings");
    fs::create_dir(&path).unwrap();
    assert!(matches!(load(&path), Err(LedgerError::Read { .. })));
}

#[test]
fn append_then_reload_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = ledger_path(dir.path(), "recordings");
    let mut ledger = Ledger::open(&path).unwrap();
    for id in ["b", "c", "a"] {
        assert!(ledger.mark_done(id).unwrap());
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), "b;c;a;");
    assert_eq!(load(&path).unwrap(), set(&["a", "b", "c"]));
}

#[test]
fn duplicate_is_recorded_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = ledger_path(dir.path(), "recordings");
    let mut ledger = Ledger::open(&path).unwrap();
    assert!(ledger.mark_done("42").unwrap());
    assert!(!ledger.mark_done("42").unwrap());
    drop(ledger);

    let mut reopened = Ledger::open(&path).unwrap();
    assert!(reopened.contains("42"));
    assert!(!reopened.mark_done("42").unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), "42;");
}

#[test]
fn rejects_unstorable_ids() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = Ledger::open(ledger_path(dir.path(), "x")).unwrap();
    assert!(matches!(ledger.mark_done("a;b"), Err(LedgerError::InvalidId(_))));
    assert!(matches!(ledger.mark_done("  "), Err(LedgerError::InvalidId(_))));
    assert!(ledger.is_empty());
}

#[test]
fn parse_ignores_blanks_and_unterminated_tail() {
    let (ids, len) = parse("a;;b; c ;d");
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(len, "a;;b; c ;".len());
    let (ids, len) = parse("");
    assert!(ids.is_empty());
    assert_eq!(len, 0);
    let (ids, len) = parse("partial");
    assert!(ids.is_empty());
    assert_eq!(len, 0);
}

#[test]
fn interrupted_entry_is_repaired_before_next_append() {
    let dir = tempfile::tempdir().unwrap();
    let path = ledger_path(dir.path(), "recordings");
    fs::write(&path, "1;2;3").unwrap();

    let mut ledger = Ledger::open(&path).unwrap();
    assert_eq!(ledger.len(), 2);
    assert!(!ledger.contains("3"));
    ledger.mark_done("4").unwrap();
    ledger.mark_done("3").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "1;2;4;3;");
    assert_eq!(load(&path).unwrap(), set(&["1", "2", "3", "4"]));
}

#[test]
fn snapshot_is_detached() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = Ledger::open(ledger_path(dir.path(), "r")).unwrap();
    ledger.mark_done("a").unwrap();
    let snap = ledger.snapshot();
    ledger.mark_done("b").unwrap();
    assert!(snap.contains("a"));
    assert!(!snap.contains("b"));
}

#[test]
fn failure_log_roundtrip_skips_torn_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = failures_path(dir.path(), "recordings");
    assert!(load_failures(&path).unwrap().is_empty());

    let mut log = FailureLog::new(&path);
    let rec = FailureRecord {
        id: "7".into(),
        url: "http://h/7.wav".into(),
        kind: "transport".into(),
        message: "HTTP 404".into(),
    };
    log.append(&rec).unwrap();
    drop(log);

    let mut raw = fs::read_to_string(&path).unwrap();
    raw.push_str("{\"id\":\"8\",\"ur");
    fs::write(&path, raw).unwrap();

    assert_eq!(load_failures(&path).unwrap(), vec![rec]);
}

#[test]
fn state_file_names() {
    let dir = std::path::Path::new("/in");
    assert_eq!(
        ledger_path(dir, "recordings.2024"),
        std::path::Path::new("/in/recordings.2024.downloaded.txt")
    );
    assert_eq!(
        failures_path(dir, "recordings"),
        std::path::Path::new("/in/recordings.failed.jsonl")
    );
}
