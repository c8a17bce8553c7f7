use std::path::Path;

use anyhow::Context;
use hyperspec_explorer::data::cube::HyperspectralCube;
use hyperspec_explorer::data::envi::{save_envi, Interleave};
use ndarray::Array3;

const ROWS: usize = 150;
const COLS: usize = 200;
const BANDS: usize = 120;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// A surface material: flat baseline plus Gaussian reflectance features.
struct Material {
    baseline: f64,
    peaks: &'static [(f64, f64, f64)],
}

const VEGETATION: Material = Material {
    baseline: 0.05,
    peaks: &[(550.0, 30.0, 0.10), (850.0, 120.0, 0.45)],
};

const SOIL: Material = Material {
    baseline: 0.15,
    peaks: &[(700.0, 200.0, 0.20), (950.0, 60.0, 0.08)],
};

const WATER: Material = Material {
    baseline: 0.02,
    peaks: &[(480.0, 60.0, 0.08)],
};

impl Material {
    fn reflectance(&self, wavelength: f64) -> f64 {
        self.baseline
            + self
                .peaks
                .iter()
                .map(|&(mu, sigma, amp)| gaussian(wavelength, mu, sigma, amp))
                .sum::<f64>()
    }
}

fn material_at(row: usize, col: usize) -> &'static Material {
    let (dr, dc) = (row as f64 - 75.0, col as f64 - 140.0);
    if dr * dr + dc * dc < 35.0 * 35.0 {
        &WATER
    } else if col < 70 {
        &VEGETATION
    } else {
        &SOIL
    }
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    // 400 → 1000 nm
    let step = 600.0 / (BANDS - 1) as f64;
    let wavelengths: Vec<f64> = (0..BANDS).map(|b| 400.0 + b as f64 * step).collect();

    let data = Array3::from_shape_fn((ROWS, COLS, BANDS), |(r, c, b)| {
        let value = material_at(r, c).reflectance(wavelengths[b]) + rng.gauss(0.0, 0.005);
        value as f32
    });

    let cube = HyperspectralCube::new(data, Some(wavelengths), Some("Nanometers".to_string()))?;

    let header = Path::new("sample_cube.bil.hdr");
    let data_path = save_envi(header, &cube, Interleave::Bil)
        .with_context(|| format!("writing {}", header.display()))?;

    println!(
        "Wrote {ROWS}×{COLS} cube with {BANDS} bands to {} (+ {})",
        header.display(),
        data_path.display()
    );
    Ok(())
}
