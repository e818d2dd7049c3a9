//! Auxiliary lookup tables, fully loaded before any download starts.
//!
//! - detections: recording id → time windows (+ optional classification)
//! - species: species id → scientific name
//! - song types: fixed code → label table

mod detections;
mod songtype;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::config::RdmConfig;
use crate::item::WorkItem;
use crate::source::{self, SourceTable};

pub use detections::{parse_detection_row, DetectionCoordinate, Detections, RECORDING_ID_FIELD};
pub use songtype::{songtype_label, SONGTYPES};

/// Species id → scientific name.
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    names: HashMap<String, String>,
}

impl SpeciesTable {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load from a table with `species_id` and `scientific_name` columns.
    pub fn from_table(table: &SourceTable) -> Self {
        let mut names = HashMap::new();
        for row in &table.rows {
            let (Some(id), Some(name)) = (
                source::non_empty(row, "species_id"),
                source::non_empty(row, "scientific_name"),
            ) else {
                continue;
            };
            names.insert(id.to_string(), name.to_string());
        }
        Self { names }
    }

    pub fn name(&self, species_id: &str) -> Option<&str> {
        self.names.get(species_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Everything a worker may consult besides its own row. Shared read-only.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    pub detections: Detections,
    pub species: SpeciesTable,
}

impl Lookups {
    /// Time windows for `id`; empty when the item has no detections.
    pub fn coordinates(&self, id: &str) -> &[DetectionCoordinate] {
        self.detections.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The detection that decides the classification directory: the first one
    /// carrying a species id.
    pub fn classification(&self, id: &str) -> Option<&DetectionCoordinate> {
        self.coordinates(id).iter().find(|c| c.species_id.is_some())
    }

    pub fn has_detections(&self, id: &str) -> bool {
        !self.coordinates(id).is_empty()
    }

    /// Windows for `item`; always empty for sources not keyed by recording id.
    pub fn coordinates_for(&self, item: &WorkItem) -> &[DetectionCoordinate] {
        item.detection_key()
            .map(|id| self.coordinates(id))
            .unwrap_or(&[])
    }

    /// Load detection tables (files whose stem starts with `cfg.detection_prefix`)
    /// and the species table from `input_dir`. Missing tables yield empty lookups.
    pub fn load(input_dir: &Path, cfg: &RdmConfig) -> Result<Self> {
        let mut detections = Detections::new();
        let mut rejected = 0usize;
        for path in source::list_csv_files(input_dir)? {
            let stem = source::file_stem(&path);
            if !stem.starts_with(&cfg.detection_prefix) {
                continue;
            }
            let table = SourceTable::read(&path)?;
            for (i, row) in table.rows.iter().enumerate() {
                match parse_detection_row(row) {
                    Ok(Some((id, coord))) => detections.entry(id).or_default().push(coord),
                    Ok(None) => {}
                    Err(e) => {
                        rejected += 1;
                        tracing::warn!(file = %path.display(), row = i + 1, "skipping detection row: {}", e);
                    }
                }
            }
            tracing::info!(file = %path.display(), rows = table.rows.len(), "loaded detection table");
        }
        if rejected > 0 {
            tracing::warn!(rejected, "detection rows rejected");
        }

        let species_path = input_dir.join(&cfg.species_file);
        let species = if species_path.exists() {
            let table = SourceTable::read(&species_path)
                .with_context(|| format!("species table {}", species_path.display()))?;
            SpeciesTable::from_table(&table)
        } else {
            SpeciesTable::default()
        };

        tracing::info!(
            recordings_with_detections = detections.len(),
            species = species.len(),
            "lookups ready"
        );
        Ok(Self {
            detections,
            species,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_collects_detections_and_species() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("pattern_matching_rois.csv"),
            "recording_id,x1,x2,species_id,songtype_id,validated\n\
             10,1.5,3,7,2,1\n\
             10,4,6,,,\n\
             11,0,2.25,7,1,0\n\
             12,5,1,7,1,1\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("species.csv"),
            "species_id,scientific_name\n7,Turdus migratorius\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("recordings.csv"), "recording_id,url\n").unwrap();

        let lookups = Lookups::load(dir.path(), &RdmConfig::default()).unwrap();
        assert_eq!(lookups.coordinates("10").len(), 2);
        assert_eq!(lookups.coordinates("11").len(), 1);
        // x2 < x1 is rejected at load time.
        assert!(lookups.coordinates("12").is_empty());
        assert!(lookups.coordinates("99").is_empty());
        assert_eq!(lookups.species.name("7"), Some("Turdus migratorius"));

        let c = lookups.classification("10").unwrap();
        assert_eq!(c.songtype_id.as_deref(), Some("2"));
        assert!(lookups.has_detections("11"));
    }

    #[test]
    fn load_without_tables_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let lookups = Lookups::load(dir.path(), &RdmConfig::default()).unwrap();
        assert!(lookups.detections.is_empty());
        assert!(lookups.species.is_empty());
    }

    #[test]
    fn classification_skips_unclassified_windows() {
        let mut detections = Detections::new();
        detections.insert(
            "1".into(),
            vec![
                DetectionCoordinate::window(0.0, 1.0),
                DetectionCoordinate {
                    species_id: Some("3".into()),
                    ..DetectionCoordinate::window(2.0, 3.0)
                },
            ],
        );
        let lookups = Lookups {
            detections,
            species: SpeciesTable::default(),
        };
        assert_eq!(lookups.classification("1").unwrap().start, 2.0);
    }
}
