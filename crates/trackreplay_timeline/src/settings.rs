// SPDX-License-Identifier: MIT OR Apache-2.0
//! Replay settings stored as RON.

use crate::error::{ReplayError, Result};
use crate::recording::RecordingSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "trackreplay.ron";

/// Playback defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Initial speed multiplier
    pub speed: f32,
    /// Fixed tick length in seconds for headless playback
    pub tick_interval: f32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            tick_interval: 1.0 / 30.0,
        }
    }
}

/// All replay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaySettings {
    /// Settings format version
    pub version: u32,
    /// Recording configuration
    #[serde(default)]
    pub recording: RecordingSettings,
    /// Playback configuration
    #[serde(default)]
    pub playback: PlaybackSettings,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            recording: RecordingSettings::default(),
            playback: PlaybackSettings::default(),
        }
    }
}

impl ReplaySettings {
    /// Parse settings from RON text
    pub fn from_ron(text: &str) -> Result<Self> {
        let settings: ReplaySettings =
            ron::from_str(text).map_err(|e| ReplayError::Settings(e.to_string()))?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(ReplayError::Settings(format!(
                "Settings version {} is newer than supported version {}",
                settings.version, SETTINGS_FORMAT_VERSION
            )));
        }

        Ok(settings)
    }

    /// Render settings as pretty RON
    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, config).map_err(|e| ReplayError::Settings(e.to_string()))
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&content)
    }

    /// Load settings from a file, falling back to defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_ron()?;
        std::fs::write(path, content).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Saved replay settings to {:?}", path);
        Ok(())
    }
}
