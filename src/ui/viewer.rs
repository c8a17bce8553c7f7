use eframe::egui::{
    self, Color32, ColorImage, Pos2, Rect, Sense, TextureHandle, TextureOptions, Ui, Vec2,
};

use crate::data::display::normalize_band;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Band image view (left panel)
// ---------------------------------------------------------------------------

/// Grayscale view of the current band. Holds the uploaded texture so it is
/// only rebuilt when the cube or the band changes.
#[derive(Default)]
pub struct BandView {
    texture: Option<TextureHandle>,
    /// `(generation, band)` the texture was built from.
    key: Option<(u64, usize)>,
}

impl BandView {
    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState) {
        let Some(cube) = &state.cube else {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Load a hyperspectral image  (File → Open…)");
            });
            return;
        };

        let key = (state.generation, state.band_index);
        if self.key != Some(key) {
            let pixels = normalize_band(cube.band(state.band_index));
            let (rows, cols) = pixels.dim();
            let gray: Vec<u8> = pixels.iter().copied().collect();
            let image = ColorImage::from_gray([cols, rows], &gray);
            self.texture = Some(ui.ctx().load_texture("band", image, TextureOptions::NEAREST));
            self.key = Some(key);
        }
        let Some(texture) = &self.texture else {
            return;
        };

        let (cols, rows) = (cube.cols(), cube.rows());
        let footer = ui.spacing().interact_size.y + ui.spacing().item_spacing.y;
        let available = ui.available_size() - Vec2::new(0.0, footer);
        let (rect, response) = ui.allocate_exact_size(fit_size(available, cols, rows), Sense::click());
        ui.painter().image(
            texture.id(),
            rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );

        let hovered = response
            .hover_pos()
            .and_then(|p| pointer_to_pixel(p, rect, cols, rows));
        let clicked = if response.clicked() {
            response
                .interact_pointer_pos()
                .and_then(|p| pointer_to_pixel(p, rect, cols, rows))
        } else {
            None
        };

        match hovered {
            Some((x, y)) => {
                state.preview_pixel(x, y);
                ui.label(format!("x {x}, y {y}  ·  click to save"));
            }
            None => {
                state.clear_preview();
                ui.label(egui::RichText::new("Hover to preview, click to save").weak());
            }
        }
        if let Some((x, y)) = clicked {
            state.save_pixel(x, y);
        }
    }
}

/// Largest size with the image's aspect ratio that fits in `available`.
pub fn fit_size(available: Vec2, cols: usize, rows: usize) -> Vec2 {
    if cols == 0 || rows == 0 {
        return Vec2::ZERO;
    }
    let scale = (available.x / cols as f32).min(available.y / rows as f32);
    let scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
    Vec2::new(cols as f32 * scale, rows as f32 * scale)
}

/// Map a screen position inside `rect` to a `(column, row)` pixel of a
/// `cols`×`rows` image drawn over the whole rect.
pub fn pointer_to_pixel(pos: Pos2, rect: Rect, cols: usize, rows: usize) -> Option<(usize, usize)> {
    if cols == 0 || rows == 0 || !rect.contains(pos) || rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    let u = (pos.x - rect.min.x) / rect.width();
    let v = (pos.y - rect.min.y) / rect.height();
    let x = ((u * cols as f32) as usize).min(cols - 1);
    let y = ((v * rows as f32) as usize).min(rows - 1);
    Some((x, y))
}
