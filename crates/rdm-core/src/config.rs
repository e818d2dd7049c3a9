use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of fetch attempts per item (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// Transport timeouts (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout.
    pub timeout_secs: u64,
    pub max_redirections: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 3600,
            max_redirections: 10,
        }
    }
}

/// Global configuration loaded from `~/.config/rdm/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdmConfig {
    /// Worker pool size. `None` = available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,
    /// chrono format of the `datetime` column. One value for every source.
    pub timestamp_format: String,
    /// Files whose stem starts with this prefix are detection tables, not download sources.
    pub detection_prefix: String,
    /// Species table (`species_id`, `scientific_name`), relative to the input directory.
    pub species_file: String,
    /// Output directory used in detected-only mode.
    pub detected_dir: String,
    /// ffmpeg binary used to trim segments.
    pub ffmpeg_path: String,
    /// Source name (file stem before the first `.`) → identifier column.
    pub id_fields: BTreeMap<String, String>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub transport: Option<TransportConfig>,
}

impl Default for RdmConfig {
    fn default() -> Self {
        let id_fields = [
            ("recordings", "recording_id"),
            ("sites", "site_id"),
            ("species", "species_id"),
            ("playlists", "playlist_id"),
            ("pattern_matchings", "pattern_matching_id"),
            ("pattern_matching_rois", "pattern_matching_roi_id"),
            ("templates", "template_id"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            workers: None,
            timestamp_format: "%m/%d/%y %H:%M:%S".to_string(),
            detection_prefix: "pattern_matching_rois".to_string(),
            species_file: "species.csv".to_string(),
            detected_dir: "detected_recordings".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            id_fields,
            retry: None,
            transport: None,
        }
    }
}

impl RdmConfig {
    /// Effective worker count (at least 1).
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            })
            .max(1)
    }

    /// Identifier column for a source, if one is configured.
    pub fn id_field_for(&self, source_name: &str) -> Option<&str> {
        self.id_fields.get(source_name).map(String::as_str)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rdm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RdmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RdmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: RdmConfig = toml::from_str(&data)?;
    Ok(cfg)
}
