/// Data layer: cube loading, band display, saved spectra and export.
///
/// Architecture:
/// ```text
///   .hdr + raw raster
///        │
///        ▼
///   ┌──────────┐
///   │   envi    │  parse header, decode interleave → Array3 [row, col, band]
///   └──────────┘
///        │
///        ▼
///   ┌───────────────────┐
///   │ HyperspectralCube  │  pixel spectra, band planes, wavelengths
///   └───────────────────┘
///        │                    │
///        ▼                    ▼
///   ┌──────────┐        ┌───────────┐
///   │ display   │        │ selection │  capped list of clicked spectra
///   └──────────┘        └───────────┘
///    min/max → u8             │
///                             ▼
///                        ┌──────────┐
///                        │  export   │  CSV rows
///                        └──────────┘
/// ```

pub mod cube;
pub mod display;
pub mod envi;
pub mod export;
pub mod selection;
