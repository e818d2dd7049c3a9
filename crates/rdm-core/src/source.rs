//! Tabular input: CSV files read fully into rows of field → value.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One input row, keyed by header name. Missing trailing cells are absent.
pub type Row = HashMap<String, String>;

/// Column holding the media URL. A source without it is not downloaded.
pub const URL_FIELD: &str = "url";

/// A fully materialized CSV source.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub path: PathBuf,
    /// File stem (`recordings.2024` for `recordings.2024.csv`).
    pub stem: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl SourceTable {
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("open {}", path.display()))?;
        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("read header of {}", path.display()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("{}: row {}", path.display(), i + 1))?;
            let row: Row = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect();
            rows.push(row);
        }

        Ok(Self {
            path: path.to_path_buf(),
            stem: file_stem(path),
            headers,
            rows,
        })
    }

    /// Logical source name: the stem up to the first `.` (`recordings.2024` → `recordings`).
    pub fn name(&self) -> &str {
        source_name(&self.stem)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.headers.iter().any(|h| h == field)
    }
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn source_name(stem: &str) -> &str {
    stem.split('.').next().unwrap_or(stem)
}

/// All `*.csv` files directly under `dir`, sorted by name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "csv") {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Value of `field` in `row`, or `None` when absent or blank.
pub fn non_empty<'a>(row: &'a Row, field: &str) -> Option<&'a str> {
    row.get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}
