use std::path::Path;

use eframe::egui;
use hyperspec_explorer::app::HyperspecApp;
use hyperspec_explorer::config::{Settings, SETTINGS_FILE};

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load_or_default(Path::new(SETTINGS_FILE));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(settings.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Hyperspectral Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(HyperspecApp::new(settings)))),
    )
}
