use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::{snap_max_spectra, Settings};
use crate::data::cube::HyperspectralCube;
use crate::data::display::{normalize_band, save_band_png};
use crate::data::export;
use crate::data::selection::{SavedSpectrum, SpectrumSelection};
use crate::error::SelectionFull;

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Info(s) | Status::Error(s) => s,
        }
    }
}

/// Spectrum under the pointer, not yet saved.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverSpectrum {
    pub x: usize,
    pub y: usize,
    pub values: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Loaded cube (None until the user opens a file).
    pub cube: Option<HyperspectralCube>,

    /// Header path of the loaded cube.
    pub source_path: Option<PathBuf>,

    /// Spectra the user clicked on.
    pub selection: SpectrumSelection,

    /// Band shown in the image view.
    pub band_index: usize,

    /// Preview under the pointer.
    pub hover: Option<HoverSpectrum>,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,

    /// Bumped on every load; rendering keys plot and texture caches on it.
    pub generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let selection = SpectrumSelection::new(snap_max_spectra(settings.default_max_spectra));
        Self {
            settings,
            cube: None,
            source_path: None,
            selection,
            band_index: 0,
            hover: None,
            status: None,
            generation: 0,
        }
    }

    /// Replace the current cube; saved spectra belong to the old image and
    /// are dropped.
    pub fn set_cube(&mut self, cube: HyperspectralCube, path: &Path) {
        self.band_index = self.settings.initial_band.min(cube.bands().saturating_sub(1));
        self.selection.clear();
        self.hover = None;
        self.status = None;
        self.cube = Some(cube);
        self.source_path = Some(path.to_path_buf());
        self.generation += 1;
    }

    /// Open `path` as an ENVI cube. Failures keep the current cube and show
    /// an error status.
    pub fn load_cube(&mut self, path: &Path) {
        let result = crate::data::envi::open(path)
            .with_context(|| format!("opening {}", path.display()));
        match result {
            Ok(cube) => self.set_cube(cube, path),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status = Some(Status::Error(format!("Error: {e:#}")));
            }
        }
    }

    pub fn set_max_spectra(&mut self, max: usize) {
        self.selection.set_max(max);
    }

    pub fn set_band(&mut self, band: usize) {
        let Some(cube) = &self.cube else {
            return;
        };
        let band = band.min(cube.bands().saturating_sub(1));
        if band != self.band_index {
            log::debug!("Showing band {band}");
            self.band_index = band;
        }
    }

    /// Preview the spectrum at `(x, y)`. No preview while the saved list is
    /// full or the pixel is outside the image.
    pub fn preview_pixel(&mut self, x: usize, y: usize) {
        self.hover = match &self.cube {
            Some(cube) if !self.selection.is_full() && cube.contains(x, y) => Some(HoverSpectrum {
                x,
                y,
                values: cube.pixel_spectrum(x, y).to_vec(),
            }),
            _ => None,
        };
    }

    pub fn clear_preview(&mut self) {
        self.hover = None;
    }

    /// Save the spectrum at `(x, y)`, or report that the cap is reached.
    pub fn save_pixel(&mut self, x: usize, y: usize) {
        let Some(cube) = &self.cube else {
            return;
        };
        if self.selection.is_full() {
            let full = SelectionFull {
                max: self.selection.max(),
            };
            self.status = Some(Status::Info(full.to_string()));
            return;
        }
        if !cube.contains(x, y) {
            return;
        }
        let spectrum = SavedSpectrum {
            x,
            y,
            values: cube.pixel_spectrum(x, y).to_vec(),
        };
        match self.selection.push(spectrum) {
            Ok(()) => {
                log::debug!("Saved spectrum at ({x}, {y})");
                self.hover = None;
            }
            Err(full) => self.status = Some(Status::Info(full.to_string())),
        }
    }

    /// Drop one saved spectrum. A pending info message (such as the cap
    /// notice) no longer applies and is cleared.
    pub fn remove_saved(&mut self, index: usize) {
        if self.selection.remove(index).is_some() && matches!(self.status, Some(Status::Info(_))) {
            self.status = None;
        }
    }

    /// Save the displayed band as a grayscale PNG.
    pub fn save_band(&mut self, path: &Path) {
        let Some(cube) = &self.cube else {
            return;
        };
        let pixels = normalize_band(cube.band(self.band_index));
        let result = save_band_png(&pixels, path)
            .with_context(|| format!("saving band {}", self.band_index));
        self.status = Some(match result {
            Ok(()) => {
                log::info!("Saved band {} to {}", self.band_index, path.display());
                Status::Info(format!("Band {} saved", self.band_index))
            }
            Err(e) => {
                log::error!("{e:#}");
                Status::Error(format!("Error: {e:#}"))
            }
        });
    }

    /// Export the saved spectra to a path chosen by `pick_path`.
    ///
    /// With nothing saved the picker is not consulted and no file is written.
    /// A `None` pick does nothing. On success the saved list is cleared.
    pub fn export(&mut self, pick_path: impl FnOnce() -> Option<PathBuf>) -> Option<usize> {
        let cube = match &self.cube {
            Some(cube) if !self.selection.is_empty() => cube,
            _ => {
                self.status = Some(Status::Info("No spectra to export".to_string()));
                return None;
            }
        };

        let path = pick_path()?;
        let result = export::export_csv(&path, self.selection.as_slice(), cube.wavelengths())
            .context("exporting spectra");
        match result {
            Ok(count) => {
                self.selection.clear();
                self.hover = None;
                self.status = Some(Status::Info("CSV exported successfully".to_string()));
                Some(count)
            }
            Err(e) => {
                log::error!("{e:#}");
                self.status = Some(Status::Error(format!("Error: {e:#}")));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn cube(rows: usize, cols: usize, bands: usize) -> HyperspectralCube {
        let data = Array3::from_shape_fn((rows, cols, bands), |(r, c, b)| (r * 100 + c * 10 + b) as f32);
        let wavelengths = (0..bands).map(|b| 400.0 + 10.0 * b as f64).collect();
        HyperspectralCube::new(data, Some(wavelengths), None).unwrap()
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::default();
        state.set_cube(cube(4, 6, 3), Path::new("a.hdr"));
        state
    }

    #[test]
    fn test_selection_capped_and_status_reported() {
        let mut state = loaded_state();
        for i in 0..5 {
            state.save_pixel(i, 0);
        }
        assert!(state.status.is_none());

        state.save_pixel(5, 1);
        assert_eq!(state.selection.len(), 5);
        assert_eq!(
            state.status,
            Some(Status::Info("Maximum 5 spectra selected".to_string()))
        );
    }

    #[test]
    fn test_saved_values_match_pixel() {
        let mut state = loaded_state();
        state.save_pixel(2, 3);
        let saved = &state.selection.as_slice()[0];
        assert_eq!((saved.x, saved.y), (2, 3));
        assert_eq!(saved.values, vec![320.0, 321.0, 322.0]);
    }

    #[test]
    fn test_click_outside_image_is_ignored() {
        let mut state = loaded_state();
        state.save_pixel(6, 0);
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_new_image_clears_saved_spectra() {
        let mut state = loaded_state();
        state.save_pixel(0, 0);
        state.save_pixel(1, 1);
        state.preview_pixel(2, 2);
        let generation = state.generation;

        state.set_cube(cube(2, 2, 3), Path::new("b.hdr"));
        assert!(state.selection.is_empty());
        assert!(state.hover.is_none());
        assert_eq!(state.generation, generation + 1);
    }

    #[test]
    fn test_preview_suppressed_when_full() {
        let mut state = loaded_state();
        state.preview_pixel(1, 1);
        assert_eq!(state.hover.as_ref().map(|h| (h.x, h.y)), Some((1, 1)));

        for i in 0..5 {
            state.save_pixel(i, 0);
        }
        state.preview_pixel(1, 1);
        assert!(state.hover.is_none());
    }

    #[test]
    fn test_preview_does_not_persist() {
        let mut state = loaded_state();
        state.preview_pixel(3, 2);
        state.preview_pixel(4, 1);
        assert!(state.selection.is_empty());
        assert_eq!(state.hover.as_ref().map(|h| h.values.clone()), Some(vec![140.0, 141.0, 142.0]));

        state.clear_preview();
        assert!(state.hover.is_none());
        assert!(state.selection.is_empty());
    }

    #[test]
    fn test_saving_clears_preview() {
        let mut state = loaded_state();
        state.preview_pixel(1, 2);
        assert!(state.hover.is_some());
        state.save_pixel(1, 2);
        assert!(state.hover.is_none());
        assert_eq!(state.selection.len(), 1);
    }

    #[test]
    fn test_full_list_reports_cap_even_outside_image() {
        let mut state = loaded_state();
        for i in 0..5 {
            state.save_pixel(i, 0);
        }
        state.save_pixel(100, 100);
        assert_eq!(
            state.status,
            Some(Status::Info("Maximum 5 spectra selected".to_string()))
        );
        assert_eq!(state.selection.len(), 5);
    }

    #[test]
    fn test_removing_clears_cap_notice() {
        let mut state = loaded_state();
        for i in 0..6 {
            state.save_pixel(i, 0);
        }
        assert!(state.status.is_some());
        state.remove_saved(0);
        assert!(state.status.is_none());
        assert_eq!(state.selection.len(), 4);

        state.status = Some(Status::Error("Error: disk full".to_string()));
        state.remove_saved(0);
        assert!(matches!(state.status, Some(Status::Error(_))));
    }

    #[test]
    fn test_zero_band_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let hdr = dir.path().join("z.hdr");
        std::fs::write(&hdr, "ENVI\nsamples = 2\nlines = 2\nbands = 0\ndata type = 4\n").unwrap();
        std::fs::write(dir.path().join("z.img"), b"").unwrap();

        let mut state = AppState::default();
        state.load_cube(&hdr);
        assert!(state.cube.is_none());
        assert!(matches!(state.status, Some(Status::Error(_))));
    }

    #[test]
    fn test_raising_cap_allows_more() {
        let mut state = loaded_state();
        for i in 0..5 {
            state.save_pixel(i, 0);
        }
        state.set_max_spectra(10);
        state.save_pixel(5, 0);
        assert_eq!(state.selection.len(), 6);
    }

    #[test]
    fn test_export_with_nothing_saved_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut state = loaded_state();

        let result = state.export(|| panic!("picker must not open"));
        assert_eq!(result, None);
        assert!(!path.exists());
        assert_eq!(state.status, Some(Status::Info("No spectra to export".to_string())));

        let mut empty = AppState::default();
        assert_eq!(empty.export(|| Some(path.clone())), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_export_writes_rows_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut state = loaded_state();
        state.save_pixel(0, 0);
        state.save_pixel(5, 3);

        assert_eq!(state.export(|| Some(path.clone())), Some(2));
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["x,y,400,410,420", "0,0,0,1,2", "5,3,350,351,352"]);
        assert!(state.selection.is_empty());
        assert_eq!(state.status, Some(Status::Info("CSV exported successfully".to_string())));
    }

    #[test]
    fn test_cancelled_export_keeps_selection() {
        let mut state = loaded_state();
        state.save_pixel(0, 0);
        assert_eq!(state.export(|| None), None);
        assert_eq!(state.selection.len(), 1);
        assert!(state.status.is_none());
    }

    #[test]
    fn test_band_clamped_to_cube() {
        let mut state = loaded_state();
        state.set_band(10);
        assert_eq!(state.band_index, 2);
    }

    #[test]
    fn test_save_band_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("band.png");
        let mut state = loaded_state();
        state.set_band(1);
        state.save_band(&path);
        assert!(path.is_file());
        assert_eq!(state.status, Some(Status::Info("Band 1 saved".to_string())));
    }

    #[test]
    fn test_load_cube_from_disk_clears_selection() {
        let dir = tempfile::tempdir().unwrap();
        let hdr = dir.path().join("scene.bil.hdr");
        crate::data::envi::save_envi(&hdr, &cube(3, 3, 2), crate::data::envi::Interleave::Bil).unwrap();

        let mut state = loaded_state();
        state.save_pixel(1, 1);
        state.load_cube(&hdr);
        assert!(state.selection.is_empty());
        assert_eq!(state.cube.as_ref().map(|c| c.bands()), Some(2));
        assert_eq!(state.source_path.as_deref(), Some(hdr.as_path()));
    }

    #[test]
    fn test_failed_load_keeps_cube() {
        let mut state = loaded_state();
        state.load_cube(Path::new("/definitely/missing.hdr"));
        assert!(state.cube.is_some());
        assert!(matches!(state.status, Some(Status::Error(_))));
    }
}
