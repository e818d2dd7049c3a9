//! Detection coordinates (time windows) parsed from pattern-matching tables.

use std::collections::HashMap;

use crate::error::ItemError;
use crate::source::{non_empty, Row};

/// Column linking a detection row to its recording.
pub const RECORDING_ID_FIELD: &str = "recording_id";

/// Recording id → its detections, in table order.
pub type Detections = HashMap<String, Vec<DetectionCoordinate>>;

/// One detected time window within a recording, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionCoordinate {
    pub start: f64,
    pub end: f64,
    /// Offsets as written in the table; segment files are named from these.
    pub start_text: String,
    pub end_text: String,
    pub species_id: Option<String>,
    pub songtype_id: Option<String>,
    /// Raw validation flag; only the literal `"1"` means present.
    pub validated: Option<String>,
}

impl DetectionCoordinate {
    /// A bare window with no classification.
    pub fn window(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            start_text: start.to_string(),
            end_text: end.to_string(),
            species_id: None,
            songtype_id: None,
            validated: None,
        }
    }

    pub fn is_validated(&self) -> bool {
        self.validated.as_deref() == Some("1")
    }
}

fn parse_offset<'a>(row: &'a Row, field: &str) -> Result<(f64, &'a str), ItemError> {
    let raw = non_empty(row, field).ok_or_else(|| ItemError::parse(field, "missing"))?;
    let v: f64 = raw
        .parse()
        .map_err(|_| ItemError::parse(field, format!("not a number: {:?}", raw)))?;
    if !v.is_finite() || v < 0.0 {
        return Err(ItemError::parse(field, format!("out of range: {}", raw)));
    }
    Ok((v, raw))
}

/// Parse one detection row. `Ok(None)` when the row names no recording.
pub fn parse_detection_row(row: &Row) -> Result<Option<(String, DetectionCoordinate)>, ItemError> {
    let Some(id) = non_empty(row, RECORDING_ID_FIELD) else {
        return Ok(None);
    };
    let (start, start_text) = parse_offset(row, "x1")?;
    let (end, end_text) = parse_offset(row, "x2")?;
    if end <= start {
        return Err(ItemError::parse("x2", format!("window [{}, {}) is empty", start, end)));
    }
    let coord = DetectionCoordinate {
        start,
        end,
        start_text: start_text.to_string(),
        end_text: end_text.to_string(),
        species_id: non_empty(row, "species_id").map(str::to_string),
        songtype_id: non_empty(row, "songtype_id").map(str::to_string),
        validated: non_empty(row, "validated").map(str::to_string),
    };
    Ok(Some((id.to_string(), coord)))
}
