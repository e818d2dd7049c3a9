//! Destination layout: where an item's file(s) land under the output root.
//!
//! Resolution is a pure function of (item, lookups, root). Directories are
//! created by the worker, not here.

use std::path::{Path, PathBuf};

use crate::error::ItemError;
use crate::item::WorkItem;
use crate::lookups::{songtype_label, Lookups};
use crate::url_model;

/// Filename timestamp layout (`20240314_090500`).
pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Computed destination for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPath {
    pub dir: PathBuf,
    pub file_name: String,
}

impl DestinationPath {
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Extension with its dot (`.wav`), or empty.
    pub fn extension(&self) -> &str {
        match self.file_name.rfind('.') {
            Some(i) if i > 0 => &self.file_name[i..],
            _ => "",
        }
    }

    /// Filename without the extension; base for segment names.
    pub fn base_name(&self) -> &str {
        &self.file_name[..self.file_name.len() - self.extension().len()]
    }
}

/// Classification fields that decide the species/song-type chain.
struct Classification<'a> {
    species_id: &'a str,
    songtype_id: Option<&'a str>,
    validated: bool,
}

fn classification<'a>(item: &'a WorkItem, lookups: &'a Lookups) -> Option<Classification<'a>> {
    if let Some(c) = item.detection_key().and_then(|id| lookups.classification(id)) {
        return Some(Classification {
            species_id: c.species_id.as_deref()?,
            songtype_id: c.songtype_id.as_deref(),
            validated: c.is_validated(),
        });
    }
    // A row classifies itself only when it names both codes.
    match (item.species_id.as_deref(), item.songtype_id.as_deref()) {
        (Some(species_id), Some(songtype_id)) => Some(Classification {
            species_id,
            songtype_id: Some(songtype_id),
            validated: item.validated.as_deref() == Some("1"),
        }),
        _ => None,
    }
}

/// Path component: spaces → underscores, then filesystem-safe.
fn component(raw: &str) -> String {
    url_model::sanitize_filename_for_linux(&raw.replace(' ', "_"))
}

fn directory(item: &WorkItem, lookups: &Lookups, root: &Path) -> Result<PathBuf, ItemError> {
    let mut dir = root.to_path_buf();
    let site = item.site_id.as_deref().map(component).filter(|s| !s.is_empty());

    if let Some(class) = classification(item, lookups) {
        let species = lookups
            .species
            .name(class.species_id)
            .ok_or_else(|| ItemError::Lookup {
                table: "species",
                code: class.species_id.to_string(),
            })?;
        let songtype_code = class.songtype_id.unwrap_or_default();
        let songtype = songtype_label(songtype_code).ok_or_else(|| ItemError::Lookup {
            table: "songtype",
            code: songtype_code.to_string(),
        })?;
        dir.push(component(&format!("{}_{}", species, songtype)));
        dir.push(if class.validated { "present" } else { "absent" });
    }

    if let Some(site) = site {
        dir.push(site);
    }
    Ok(dir)
}

/// `{timestamp}-{id}{ext}` when both the timestamp and a URL extension exist,
/// otherwise the URL's bare filename.
pub fn file_name(item: &WorkItem) -> String {
    let ext = url_model::extension_from_url_path(&item.url);
    match (item.timestamp, ext) {
        (Some(ts), Some(ext)) => {
            let name = format!("{}-{}{}", ts.format(FILENAME_TIMESTAMP_FORMAT), item.id, ext);
            let safe = url_model::sanitize_filename_for_linux(&name);
            if safe.is_empty() {
                url_model::bare_filename(&item.url)
            } else {
                safe
            }
        }
        _ => url_model::bare_filename(&item.url),
    }
}

/// Resolve the destination for `item` under `root`.
///
/// 1. site id → `root/{site}`
/// 2. classification (recording detections first, then the row's own species
///    and song-type fields when both are present) →
///    `root/{species}_{songtype}/{present|absent}/{site}`; unknown species or
///    song-type codes are `ItemError::Lookup`
/// 3. filename per [`file_name`]
pub fn resolve(item: &WorkItem, lookups: &Lookups, root: &Path) -> Result<DestinationPath, ItemError> {
    Ok(DestinationPath {
        dir: directory(item, lookups, root)?,
        file_name: file_name(item),
    })
}

#[cfg(test)]
mod tests;
