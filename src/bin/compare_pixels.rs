use std::path::PathBuf;

use anyhow::{bail, Context};
use eframe::egui;
use egui_plot::{Legend, Line, LineStyle, Plot};
use hyperspec_explorer::color::spectrum_color;
use hyperspec_explorer::data::cube::HyperspectralCube;
use hyperspec_explorer::data::envi;

const DEFAULT_HEADER: &str = "data/I99.bil.hdr";

/// Fixed pixels compared by this tool, as `(x, y)`.
const PIXEL_A: (usize, usize) = (120, 50);
const PIXEL_B: (usize, usize) = (123, 75);

/// Side of the square window averaged around the image centre.
const REGION_WINDOW: usize = 5;

struct Series {
    name: String,
    values: Vec<f32>,
    dashed: bool,
}

struct CompareApp {
    comparison: Vec<Series>,
    envelope: Vec<Series>,
}

fn pixel_series(cube: &HyperspectralCube, label: &str, (x, y): (usize, usize)) -> anyhow::Result<Series> {
    if !cube.contains(x, y) {
        bail!(
            "pixel {label} ({x},{y}) is outside the {}×{} image",
            cube.cols(),
            cube.rows()
        );
    }
    Ok(Series {
        name: format!("Pixel {label} ({x},{y})"),
        values: cube.pixel_spectrum(x, y).to_vec(),
        dashed: false,
    })
}

impl CompareApp {
    fn new(cube: &HyperspectralCube) -> anyhow::Result<Self> {
        let a = pixel_series(cube, "A", PIXEL_A)?;
        let b = pixel_series(cube, "B", PIXEL_B)?;
        println!("Spectrum at Pixel A ({},{}): {:?}", PIXEL_A.0, PIXEL_A.1, a.values);

        let (min, max) = cube.band_extrema();
        let mut envelope = vec![
            Series {
                name: "Min".to_string(),
                values: min,
                dashed: false,
            },
            Series {
                name: "Max".to_string(),
                values: max,
                dashed: false,
            },
        ];
        let (cx, cy) = (cube.cols() / 2, cube.rows() / 2);
        if let Some(mean) = cube.region_mean_spectrum(cx, cy, REGION_WINDOW) {
            envelope.push(Series {
                name: "Mean".to_string(),
                values: mean,
                dashed: true,
            });
        }

        Ok(Self {
            comparison: vec![a, b],
            envelope,
        })
    }
}

/// Plot every series against band index.
fn band_plot(ui: &mut egui::Ui, id: &str, y_label: &str, series: &[Series]) {
    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label("Band index")
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            for (i, s) in series.iter().enumerate() {
                let points: Vec<[f64; 2]> = s
                    .values
                    .iter()
                    .enumerate()
                    .map(|(b, &v)| [b as f64, f64::from(v)])
                    .collect();
                let mut line = Line::new(points).name(&s.name).color(spectrum_color(i)).width(1.5);
                if s.dashed {
                    line = line.style(LineStyle::dashed_loose());
                }
                plot_ui.line(line);
            }
        });
}

impl eframe::App for CompareApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::bottom("envelope")
            .resizable(true)
            .default_height(300.0)
            .show(ctx, |ui| {
                ui.heading("Band-wise Min / Max");
                band_plot(ui, "envelope_plot", "Value", &self.envelope);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Spectral Comparison of Two Pixels");
            band_plot(ui, "comparison_plot", "Intensity / Reflectance", &self.comparison);
        });
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let header = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HEADER));
    let cube = envi::open(&header).with_context(|| format!("opening {}", header.display()))?;
    log::info!(
        "Shape: ({}, {}, {})",
        cube.rows(),
        cube.cols(),
        cube.bands()
    );
    let app = CompareApp::new(&cube)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Pixel Spectrum Comparison",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
