//! The `;`-delimited ledger file: parsing, loading, appending.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::LedgerError;

/// Entry terminator.
pub const SEPARATOR: char = ';';

/// Parse ledger contents. Returns the complete entries in file order and the
/// byte length covered by them; anything after the last `;` is an
/// unterminated fragment and is ignored. Blank entries are skipped.
pub fn parse(contents: &str) -> (Vec<String>, usize) {
    let complete_len = contents.rfind(SEPARATOR).map(|i| i + 1).unwrap_or(0);
    let ids = contents[..complete_len]
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (ids, complete_len)
}

fn read_contents(path: &Path) -> Result<Option<String>, LedgerError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(LedgerError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load the set of done identifiers. A missing file is an empty set.
pub fn load(path: &Path) -> Result<HashSet<String>, LedgerError> {
    Ok(read_contents(path)?
        .map(|c| parse(&c).0.into_iter().collect())
        .unwrap_or_default())
}

/// In-memory done set plus the append handle for one source.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    done: HashSet<String>,
    file: Option<File>,
    /// Length to cut the file back to before the first append, when the
    /// previous run died mid-entry.
    repair_to: Option<u64>,
}

impl Ledger {
    /// Load the ledger at `path`. Missing file = first run. The file is only
    /// created on the first append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let mut done = HashSet::new();
        let mut repair_to = None;
        if let Some(contents) = read_contents(&path)? {
            let (ids, complete_len) = parse(&contents);
            if complete_len < contents.len() {
                tracing::warn!(
                    path = %path.display(),
                    fragment = %contents[complete_len..].trim(),
                    "ignoring unterminated ledger entry from an interrupted run"
                );
                repair_to = Some(complete_len as u64);
            }
            done.extend(ids);
        }
        Ok(Self {
            path,
            done,
            file: None,
            repair_to,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: &str) -> bool {
        self.done.contains(id)
    }

    pub fn len(&self) -> usize {
        self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Read-only copy of the done set for workers.
    pub fn snapshot(&self) -> Arc<HashSet<String>> {
        Arc::new(self.done.clone())
    }

    fn open_for_append(&mut self) -> Result<File, LedgerError> {
        let write_err = |source| LedgerError::Write {
            path: self.path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        if let Some(len) = self.repair_to {
            file.set_len(len).map_err(write_err)?;
        }
        Ok(file)
    }

    fn handle(&mut self) -> Result<&mut File, LedgerError> {
        let file = match self.file.take() {
            Some(f) => f,
            None => {
                let f = self.open_for_append()?;
                self.repair_to = None;
                f
            }
        };
        Ok(self.file.insert(file))
    }

    /// Append `id` as done. Returns `false` (and writes nothing) if it was
    /// already recorded.
    pub fn mark_done(&mut self, id: &str) -> Result<bool, LedgerError> {
        let id = id.trim();
        if id.is_empty() || id.contains(SEPARATOR) {
            return Err(LedgerError::InvalidId(id.to_string()));
        }
        if self.done.contains(id) {
            return Ok(false);
        }

        let entry = format!("{}{}", id, SEPARATOR);
        let path = self.path.clone();
        let file = self.handle()?;
        file.write_all(entry.as_bytes())
            .and_then(|()| file.sync_data())
            .map_err(|source| LedgerError::Write { path, source })?;

        self.done.insert(id.to_string());
        Ok(true)
    }
}
