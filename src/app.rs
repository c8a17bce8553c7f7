use eframe::egui;

use crate::config::Settings;
use crate::state::AppState;
use crate::ui::viewer::BandView;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HyperspecApp {
    pub state: AppState,
    band_view: BandView,
}

impl HyperspecApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
            band_view: BandView::default(),
        }
    }
}

impl Default for HyperspecApp {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl eframe::App for HyperspecApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Right side panel: controls ----
        egui::SidePanel::right("control_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::control_panel(ui, &mut self.state);
            });

        // ---- Left side panel: band image ----
        egui::SidePanel::left("image_panel")
            .default_width(520.0)
            .resizable(true)
            .show(ctx, |ui| {
                self.band_view.show(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::spectral_plot(ui, &self.state);
        });
    }
}
