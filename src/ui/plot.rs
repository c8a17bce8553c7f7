use eframe::egui::Ui;
use egui_plot::{Legend, Line, LineStyle, Plot};

use crate::color::spectrum_color;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Spectral plot (central panel)
// ---------------------------------------------------------------------------

/// Render saved spectra and the hover preview against the band axis. The
/// whole plot is rebuilt every frame.
pub fn spectral_plot(ui: &mut Ui, state: &AppState) {
    ui.heading("Spectral Signatures");

    let (x_label, wavelengths) = match &state.cube {
        Some(cube) => (cube.axis_label(), cube.wavelengths()),
        None => ("Wavelength (nm)".to_string(), &[][..]),
    };
    let hover_color = ui.visuals().strong_text_color();

    // Keyed on the load generation so opening a file resets zoom and pan.
    Plot::new(("spectral_plot", state.generation))
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label("Reflectance")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (i, sp) in state.selection.iter().enumerate() {
                let line = Line::new(series(wavelengths, &sp.values))
                    .name(format!("({}, {})", sp.x, sp.y))
                    .color(spectrum_color(i))
                    .width(1.5);
                plot_ui.line(line);
            }

            if let Some(hover) = &state.hover {
                let line = Line::new(series(wavelengths, &hover.values))
                    .name("Hover")
                    .color(hover_color)
                    .style(LineStyle::dashed_dense())
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

/// Pair band-axis positions with spectrum values.
pub fn series(axis: &[f64], values: &[f32]) -> Vec<[f64; 2]> {
    axis.iter()
        .zip(values)
        .map(|(&x, &y)| [x, f64::from(y)])
        .collect()
}
