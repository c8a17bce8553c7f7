use ndarray::{s, Array3, ArrayView1, ArrayView2, Axis};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// HyperspectralCube – one loaded image
// ---------------------------------------------------------------------------

/// A hyperspectral image cube indexed `[row, column, band]`, plus the
/// band-centre wavelengths aligned with the band axis.
#[derive(Debug, Clone)]
pub struct HyperspectralCube {
    data: Array3<f32>,
    wavelengths: Vec<f64>,
    wavelength_units: Option<String>,
    has_wavelengths: bool,
}

impl HyperspectralCube {
    /// Build a cube. Without a wavelength table the band axis falls back to
    /// band indices `0..bands`.
    pub fn new(
        data: Array3<f32>,
        wavelengths: Option<Vec<f64>>,
        wavelength_units: Option<String>,
    ) -> Result<Self> {
        let bands = data.dim().2;
        let has_wavelengths = wavelengths.is_some();
        let wavelengths = match wavelengths {
            Some(w) if w.len() != bands => {
                return Err(Error::WavelengthCount {
                    expected: bands,
                    actual: w.len(),
                })
            }
            Some(w) => w,
            None => (0..bands).map(|b| b as f64).collect(),
        };

        Ok(Self {
            data,
            wavelengths,
            wavelength_units,
            has_wavelengths,
        })
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    pub fn bands(&self) -> usize {
        self.data.dim().2
    }

    /// Band centres, one per band.
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Whether [`wavelengths`](Self::wavelengths) came from the file rather
    /// than the band-index fallback.
    pub fn has_wavelengths(&self) -> bool {
        self.has_wavelengths
    }

    pub fn wavelength_units(&self) -> Option<&str> {
        self.wavelength_units.as_deref()
    }

    /// Label for the spectral axis of a plot.
    pub fn axis_label(&self) -> String {
        if !self.has_wavelengths {
            return "Band index".to_string();
        }
        let units = match self.wavelength_units.as_deref() {
            None | Some("") | Some("Unknown") => "nm",
            Some(u) => u,
        };
        format!("Wavelength ({units})")
    }

    /// Whether `(x, y)` (column, row) lies inside the image.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.cols() && y < self.rows()
    }

    /// Spectrum at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the pixel is outside the image; check with
    /// [`contains`](Self::contains) first.
    pub fn pixel_spectrum(&self, x: usize, y: usize) -> ArrayView1<'_, f32> {
        self.data.slice(s![y, x, ..])
    }

    /// One band plane, indexed `[row, column]`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.bands()`.
    pub fn band(&self, index: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(2), index)
    }

    /// Mean spectrum over a `window`×`window` square centred on `(x, y)`,
    /// clipped to the image. `None` when the clipped region is empty.
    pub fn region_mean_spectrum(&self, x: usize, y: usize, window: usize) -> Option<Vec<f32>> {
        let half = window / 2;
        let y0 = y.saturating_sub(half).min(self.rows());
        let y1 = y.saturating_add(half + 1).min(self.rows());
        let x0 = x.saturating_sub(half).min(self.cols());
        let x1 = x.saturating_add(half + 1).min(self.cols());

        let region = self.data.slice(s![y0..y1, x0..x1, ..]);
        let n = region.dim().0 * region.dim().1;
        if n == 0 {
            return None;
        }
        let sums = region.sum_axis(Axis(0)).sum_axis(Axis(0));
        Some(sums.iter().map(|&v| v / n as f32).collect())
    }

    /// Per-band `(minimum, maximum)` over every pixel. Bands without a
    /// finite value report NaN.
    pub fn band_extrema(&self) -> (Vec<f32>, Vec<f32>) {
        (0..self.bands())
            .map(|b| value_range(self.band(b).iter()).unwrap_or((f32::NAN, f32::NAN)))
            .unzip()
    }
}

/// Minimum and maximum of the finite values, `None` if there are none.
pub(crate) fn value_range<'a>(values: impl IntoIterator<Item = &'a f32>) -> Option<(f32, f32)> {
    values
        .into_iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3 rows × 4 columns × 2 bands; value = 100*row + 10*col + band.
    fn sample_cube() -> HyperspectralCube {
        let data = Array3::from_shape_fn((3, 4, 2), |(r, c, b)| (100 * r + 10 * c + b) as f32);
        HyperspectralCube::new(data, Some(vec![450.0, 550.0]), Some("Nanometers".into())).unwrap()
    }

    #[test]
    fn test_pixel_spectrum_uses_column_then_row() {
        let cube = sample_cube();
        let sp = cube.pixel_spectrum(3, 1);
        assert_eq!(sp.to_vec(), vec![130.0, 131.0]);
    }

    #[test]
    #[should_panic]
    fn test_pixel_spectrum_out_of_range_panics() {
        let cube = sample_cube();
        let _ = cube.pixel_spectrum(4, 0);
    }

    #[test]
    fn test_contains() {
        let cube = sample_cube();
        assert!(cube.contains(3, 2));
        assert!(!cube.contains(4, 2));
        assert!(!cube.contains(0, 3));
    }

    #[test]
    fn test_wavelength_count_mismatch() {
        let data = Array3::<f32>::zeros((2, 2, 3));
        let err = HyperspectralCube::new(data, Some(vec![1.0, 2.0]), None).unwrap_err();
        assert!(matches!(err, Error::WavelengthCount { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_missing_wavelengths_fall_back_to_band_index() {
        let data = Array3::<f32>::zeros((2, 2, 3));
        let cube = HyperspectralCube::new(data, None, None).unwrap();
        assert_eq!(cube.wavelengths(), &[0.0, 1.0, 2.0]);
        assert!(!cube.has_wavelengths());
        assert_eq!(cube.axis_label(), "Band index");
    }

    #[test]
    fn test_axis_label_units() {
        assert_eq!(sample_cube().axis_label(), "Wavelength (Nanometers)");
        let data = Array3::<f32>::zeros((1, 1, 1));
        let cube = HyperspectralCube::new(data, Some(vec![500.0]), None).unwrap();
        assert_eq!(cube.axis_label(), "Wavelength (nm)");
    }

    #[test]
    fn test_band_plane() {
        let cube = sample_cube();
        let plane = cube.band(1);
        assert_eq!(plane.dim(), (3, 4));
        assert_eq!(plane[[2, 1]], 211.0);
    }

    #[test]
    fn test_region_mean_is_clipped_at_corner() {
        let cube = sample_cube();
        // 3×3 window at (0, 0) keeps rows 0..2 and columns 0..2.
        let mean = cube.region_mean_spectrum(0, 0, 3).unwrap();
        // band 0 values: 0, 10, 100, 110 → mean 55
        assert!((mean[0] - 55.0).abs() < 1e-4);
        assert!((mean[1] - 56.0).abs() < 1e-4);
    }

    #[test]
    fn test_region_mean_outside_image() {
        let cube = sample_cube();
        assert!(cube.region_mean_spectrum(50, 50, 3).is_none());
    }

    #[test]
    fn test_band_extrema() {
        let cube = sample_cube();
        let (min, max) = cube.band_extrema();
        assert_eq!(min, vec![0.0, 1.0]);
        assert_eq!(max, vec![230.0, 231.0]);
    }

    #[test]
    fn test_value_range_skips_nan() {
        let values = [f32::NAN, 3.0, -1.0, f32::INFINITY];
        assert_eq!(value_range(values.iter()), Some((-1.0, 3.0)));
        assert_eq!(value_range([f32::NAN].iter()), None);
    }
}
