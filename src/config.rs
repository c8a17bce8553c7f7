use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::selection::{DEFAULT_MAX_SPECTRA, MAX_SPECTRA_CHOICES};
use crate::error::{Error, Result};

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "hyperspec-explorer.json";

/// Optional start-up settings. Every field has a default, so a partial file
/// is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Initial cap on saved spectra; snapped to one of the dropdown choices.
    pub default_max_spectra: usize,
    /// Band shown right after a file is opened (clamped to the cube).
    pub initial_band: usize,
    /// Initial window size in points.
    pub window_size: [f32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_max_spectra: DEFAULT_MAX_SPECTRA,
            initial_band: 0,
            window_size: [1200.0, 800.0],
        }
    }
}

impl Settings {
    /// Parse settings from a JSON file and snap values into range.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings = serde_json::from_str(&text).map_err(|source| Error::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        settings.normalize();
        Ok(settings)
    }

    /// [`load`](Self::load), falling back to defaults when the file is
    /// missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings: {e}");
                Self::default()
            }
        }
    }

    fn normalize(&mut self) {
        let snapped = snap_max_spectra(self.default_max_spectra);
        if snapped != self.default_max_spectra {
            log::warn!(
                "default_max_spectra {} is not a valid choice, using {snapped}",
                self.default_max_spectra
            );
            self.default_max_spectra = snapped;
        }
    }
}

/// Nearest entry of [`MAX_SPECTRA_CHOICES`] (lower one on ties).
pub fn snap_max_spectra(value: usize) -> usize {
    MAX_SPECTRA_CHOICES
        .iter()
        .copied()
        .min_by_key(|&c| c.abs_diff(value))
        .unwrap_or(DEFAULT_MAX_SPECTRA)
}
