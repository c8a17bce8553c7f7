//! Interactive explorer for ENVI hyperspectral cubes.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;

pub use error::{Error, Result};
