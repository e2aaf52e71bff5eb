//! # Replay Configuration
//!
//! Table physics and playback pacing in one place, loadable from YAML or
//! JSON.
//!
//! ## Usage
//! ```rust
//! use cue_core::engine::config::CueConfig;
//!
//! let config = CueConfig::default();
//! let demo = CueConfig::fast_replay();
//! assert!(demo.playback.speed_factor > config.playback.speed_factor);
//! ```

mod playback_config;
mod table_config;

pub use playback_config::PlaybackConfig;
pub use table_config::TableConfig;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CueConfig {
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

impl CueConfig {
    /// Real-time playback on a standard table
    pub fn standard() -> Self {
        Self::default()
    }

    /// Unattended demo: three times speed, next shot requested automatically
    pub fn fast_replay() -> Self {
        let mut cfg = Self::default();
        cfg.playback.speed_factor = 3.0;
        cfg.playback.frames_per_second = 120;
        cfg.playback.auto_play = true;
        cfg
    }

    /// Quarter speed for inspecting collisions
    pub fn slow_motion() -> Self {
        let mut cfg = Self::default();
        cfg.playback.speed_factor = 0.25;
        cfg
    }

    pub fn validate(&self) -> Result<()> {
        self.table.validate()?;
        self.playback.validate()
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: CueConfig = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: CueConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load by extension: `.yaml` / `.yml` or `.json`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let cfg = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents)?,
            Some("json") => Self::from_json_str(&contents)?,
            other => {
                return Err(CoreError::UnsupportedFormat(format!(
                    "config extension {:?} ({})",
                    other.unwrap_or(""),
                    path.display()
                )))
            }
        };
        log::info!("Loaded config from {}", path.display());
        Ok(cfg)
    }
}

// ========== Tests ==========
