use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration (persistent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Undo history bound; `None` keeps every edit
    pub max_undo_depth: Option<usize>,

    /// Widen committed selections to the bounds of the cue under the cursor
    pub snap_to_cue: bool,

    /// Blank units a run of pause cues needs to count as a long pause
    pub long_pause_min_blanks: usize,

    /// Cue text that marks a pause, besides whitespace-only text
    pub blank_marker: String,

    /// Minimum distance (seconds) for next/previous highlight jumps
    pub highlight_nav_epsilon: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_undo_depth: Some(100),
            snap_to_cue: false,
            long_pause_min_blanks: 3,
            blank_marker: "BLANK".to_string(),
            highlight_nav_epsilon: 0.1,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load config from a file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Load config, falling back to defaults if the file is malformed
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config from {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load config from the standard per-user location
    pub fn load() -> Self {
        match Self::config_path() {
            Ok(path) => Self::load_or_default(&path),
            Err(e) => {
                log::warn!("{}; using default configuration", e);
                Self::default()
            }
        }
    }

    /// Save config atomically (write to temp, then rename)
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(temp_path, path)?;

        Ok(())
    }

    /// Get cross-platform config file path
    pub fn config_path() -> Result<PathBuf> {
        use directories::ProjectDirs;

        let proj_dirs = ProjectDirs::from("", "", "highlighter").ok_or_else(|| {
            EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "failed to determine config directory",
            ))
        })?;

        Ok(proj_dirs.config_dir().join("engine.json"))
    }
}
