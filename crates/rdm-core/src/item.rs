//! One unit of work parsed from one input row.

use chrono::NaiveDateTime;

use crate::error::ItemError;
use crate::lookups::RECORDING_ID_FIELD;
use crate::source::{non_empty, Row, URL_FIELD};

pub const SITE_FIELD: &str = "site_id";
pub const DATETIME_FIELD: &str = "datetime";
pub const SPECIES_FIELD: &str = "species_id";
pub const SONGTYPE_FIELD: &str = "songtype_id";
pub const VALIDATED_FIELD: &str = "validated";

/// A parsed row. Every optional field is `None` when absent or blank.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    pub id: String,
    /// May be empty: nothing to fetch.
    pub url: String,
    pub timestamp: Option<NaiveDateTime>,
    pub site_id: Option<String>,
    pub species_id: Option<String>,
    pub songtype_id: Option<String>,
    pub validated: Option<String>,
    /// The id is a recording id, so detection tables apply to it.
    pub recording: bool,
}

/// Identifier of a row, if it has one.
pub fn row_id<'a>(row: &'a Row, id_field: &str) -> Option<&'a str> {
    non_empty(row, id_field)
}

impl WorkItem {
    /// Parse a row. Fails only on a missing identifier or a present but
    /// malformed timestamp.
    pub fn from_row(row: &Row, id_field: &str, timestamp_format: &str) -> Result<Self, ItemError> {
        let id = row_id(row, id_field)
            .ok_or_else(|| ItemError::parse(id_field, "missing identifier"))?
            .to_string();

        let timestamp = match non_empty(row, DATETIME_FIELD) {
            Some(raw) => Some(NaiveDateTime::parse_from_str(raw, timestamp_format).map_err(|e| {
                ItemError::parse(DATETIME_FIELD, format!("{:?} vs {:?}: {}", raw, timestamp_format, e))
            })?),
            None => None,
        };

        let opt = |field: &str| non_empty(row, field).map(str::to_string);

        Ok(Self {
            id,
            url: non_empty(row, URL_FIELD).unwrap_or_default().to_string(),
            timestamp,
            site_id: opt(SITE_FIELD),
            species_id: opt(SPECIES_FIELD),
            songtype_id: opt(SONGTYPE_FIELD),
            validated: opt(VALIDATED_FIELD),
            recording: id_field == RECORDING_ID_FIELD,
        })
    }

    /// A bare item: id and URL only, not a recording.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            timestamp: None,
            site_id: None,
            species_id: None,
            songtype_id: None,
            validated: None,
            recording: false,
        }
    }

    /// A bare recording item.
    pub fn recording(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            recording: true,
            ..Self::new(id, url)
        }
    }

    /// Key into the detection tables, if they apply to this item.
    pub fn detection_key(&self) -> Option<&str> {
        self.recording.then_some(self.id.as_str())
    }
}
