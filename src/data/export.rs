use std::io::Write;
use std::path::Path;

use super::selection::SavedSpectrum;
use crate::error::{Error, Result};

/// Write saved spectra as CSV: a header `x, y, <wavelength>…` and one row
/// per spectrum. Returns the number of data rows.
pub fn write_csv<W: Write>(
    spectra: &[SavedSpectrum],
    wavelengths: &[f64],
    writer: W,
    path: &Path,
) -> Result<usize> {
    let csv_err = |source: csv::Error| Error::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    let header = ["x".to_string(), "y".to_string()]
        .into_iter()
        .chain(wavelengths.iter().map(|w| w.to_string()));
    csv_writer.write_record(header).map_err(csv_err)?;

    for sp in spectra {
        let row = [sp.x.to_string(), sp.y.to_string()]
            .into_iter()
            .chain(sp.values.iter().map(|v| v.to_string()));
        csv_writer.write_record(row).map_err(csv_err)?;
    }

    csv_writer.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(spectra.len())
}

/// Create `path` and write the spectra into it.
pub fn export_csv(path: &Path, spectra: &[SavedSpectrum], wavelengths: &[f64]) -> Result<usize> {
    let file = std::fs::File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let count = write_csv(spectra, wavelengths, file, path)?;
    log::info!("Exported {count} spectra to {}", path.display());
    Ok(count)
}
