use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::spectrum_color;
use crate::data::selection::MAX_SPECTRA_CHOICES;
use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Right side panel – controls
// ---------------------------------------------------------------------------

/// Render the control panel: cap, band, export, status and saved list.
pub fn control_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    ui.strong("Max Spectra");
    let current = state.selection.max();
    let mut chosen = current;
    egui::ComboBox::from_id_salt("max_spectra")
        .selected_text(current.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for choice in MAX_SPECTRA_CHOICES {
                ui.selectable_value(&mut chosen, choice, choice.to_string());
            }
        });
    if chosen != current {
        state.set_max_spectra(chosen);
    }

    ui.add_space(6.0);
    band_controls(ui, state);
    ui.add_space(6.0);

    if ui.button("Export CSV").clicked() {
        state.export(save_csv_dialog);
    }

    if let Some(status) = &state.status {
        let text = RichText::new(status.text());
        let text = match status {
            Status::Info(_) => text,
            Status::Error(_) => text.color(Color32::RED),
        };
        ui.label(text);
    }

    ui.separator();
    saved_list(ui, state);
}

fn band_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(cube) = &state.cube else {
        return;
    };
    let last = cube.bands().saturating_sub(1);
    let centre = cube
        .has_wavelengths()
        .then(|| cube.wavelengths().get(state.band_index).copied())
        .flatten();

    ui.strong("Band");
    let mut band = state.band_index;
    ui.add(egui::Slider::new(&mut band, 0..=last));
    if let Some(wl) = centre {
        ui.label(format!("{wl:.1}"));
    }
    state.set_band(band);
}

fn saved_list(ui: &mut Ui, state: &mut AppState) {
    ui.strong(format!(
        "Saved spectra  ({}/{})",
        state.selection.len(),
        state.selection.max()
    ));

    let mut remove = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, sp) in state.selection.iter().enumerate() {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(RichText::new("■").color(spectrum_color(i)));
                    ui.label(format!("({}, {})", sp.x, sp.y));
                    if ui.small_button("✕").on_hover_text("Remove").clicked() {
                        remove = Some(i);
                    }
                });
            }
        });

    if let Some(i) = remove {
        state.remove_saved(i);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_cube = state.cube.is_some();
            if ui
                .add_enabled(has_cube, egui::Button::new("Save band as PNG…"))
                .clicked()
            {
                save_band_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(cube), Some(path)) = (&state.cube, &state.source_path) {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}  ·  {} × {} px, {} bands",
                cube.cols(),
                cube.rows(),
                cube.bands()
            ));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open Hyperspectral Image")
        .add_filter("ENVI Header", &["hdr"])
        .pick_file();

    if let Some(path) = file {
        state.load_cube(&path);
    }
}

fn save_csv_dialog() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Save CSV")
        .add_filter("CSV Files", &["csv"])
        .set_file_name("spectra.csv")
        .save_file()
}

fn save_band_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save band as PNG")
        .add_filter("PNG", &["png"])
        .set_file_name(format!("band_{}.png", state.band_index))
        .save_file();

    if let Some(path) = file {
        state.save_band(&path);
    }
}
