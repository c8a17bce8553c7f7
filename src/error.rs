use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the cube, export and settings layers.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not an ENVI header (first line must start with 'ENVI')")]
    NotEnvi,

    #[error("ENVI header is missing required key '{key}'")]
    MissingKey { key: &'static str },

    #[error("ENVI header key '{key}' has invalid value '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("raster of {lines} lines × {samples} samples × {bands} bands is too large")]
    TooLarge {
        lines: usize,
        samples: usize,
        bands: usize,
    },

    #[error("unsupported ENVI data type {0}")]
    UnsupportedDataType(u32),

    #[error("no data file found next to header {header}")]
    DataFileNotFound { header: PathBuf },

    #[error("{path}: expected at least {expected} bytes of image data, found {actual}")]
    Truncated {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("header lists {actual} wavelengths for {expected} bands")]
    WavelengthCount { expected: usize, actual: usize },

    #[error("cube shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("failed to write CSV to {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write image to {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A click was refused because the saved list already holds `max` spectra.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Maximum {max} spectra selected")]
pub struct SelectionFull {
    pub max: usize,
}
