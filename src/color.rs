use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Line colours for saved spectra
// ---------------------------------------------------------------------------

/// Hue step between consecutive saved spectra (golden angle), so neighbours
/// stay distinct however many spectra are saved.
const HUE_STEP: f32 = 137.508;

/// Colour of the `index`-th saved spectrum.
pub fn spectrum_color(index: usize) -> Color32 {
    let hue = (index as f32 * HUE_STEP) % 360.0;
    let hsl = Hsl::new(hue, 0.75, 0.55);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}
