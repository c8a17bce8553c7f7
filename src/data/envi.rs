use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array3;

use super::cube::HyperspectralCube;
use crate::error::{Error, Result};

/// Extensions tried for the binary data file when the header name alone
/// does not point at one.
const DATA_EXTENSIONS: [&str; 6] = ["img", "dat", "raw", "bil", "bsq", "bip"];

// ---------------------------------------------------------------------------
// Header value types
// ---------------------------------------------------------------------------

/// On-disk sample ordering of an ENVI raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interleave {
    /// Band sequential: `[band][line][sample]`.
    Bsq,
    /// Band interleaved by line: `[line][band][sample]`.
    Bil,
    /// Band interleaved by pixel: `[line][sample][band]`.
    Bip,
}

impl Interleave {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bsq" => Some(Interleave::Bsq),
            "bil" => Some(Interleave::Bil),
            "bip" => Some(Interleave::Bip),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Interleave::Bsq => "bsq",
            Interleave::Bil => "bil",
            Interleave::Bip => "bip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// ENVI `data type` codes understood by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    U8,
    I16,
    I32,
    F32,
    F64,
    U16,
    U32,
    I64,
    U64,
}

impl DataType {
    pub fn from_code(code: u32) -> Result<Self> {
        Ok(match code {
            1 => DataType::U8,
            2 => DataType::I16,
            3 => DataType::I32,
            4 => DataType::F32,
            5 => DataType::F64,
            12 => DataType::U16,
            13 => DataType::U32,
            14 => DataType::I64,
            15 => DataType::U64,
            other => return Err(Error::UnsupportedDataType(other)),
        })
    }

    pub fn code(self) -> u32 {
        match self {
            DataType::U8 => 1,
            DataType::I16 => 2,
            DataType::I32 => 3,
            DataType::F32 => 4,
            DataType::F64 => 5,
            DataType::U16 => 12,
            DataType::U32 => 13,
            DataType::I64 => 14,
            DataType::U64 => 15,
        }
    }

    /// Bytes per sample.
    pub fn size(self) -> usize {
        match self {
            DataType::U8 => 1,
            DataType::I16 | DataType::U16 => 2,
            DataType::I32 | DataType::U32 | DataType::F32 => 4,
            DataType::F64 | DataType::I64 | DataType::U64 => 8,
        }
    }

    /// Decode one sample; `bytes` holds exactly [`size`](Self::size) bytes.
    fn decode(self, bytes: &[u8], order: ByteOrder) -> f32 {
        macro_rules! read {
            ($t:ty, $n:literal) => {{
                let raw = fixed::<$n>(bytes);
                let v = match order {
                    ByteOrder::Little => <$t>::from_le_bytes(raw),
                    ByteOrder::Big => <$t>::from_be_bytes(raw),
                };
                v as f32
            }};
        }
        match self {
            DataType::U8 => f32::from(bytes[0]),
            DataType::I16 => read!(i16, 2),
            DataType::U16 => read!(u16, 2),
            DataType::I32 => read!(i32, 4),
            DataType::U32 => read!(u32, 4),
            DataType::F32 => read!(f32, 4),
            DataType::F64 => read!(f64, 8),
            DataType::I64 => read!(i64, 8),
            DataType::U64 => read!(u64, 8),
        }
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

// ---------------------------------------------------------------------------
// EnviHeader
// ---------------------------------------------------------------------------

/// The parsed subset of an ENVI `.hdr` file.
#[derive(Debug, Clone, PartialEq)]
pub struct EnviHeader {
    pub samples: usize,
    pub lines: usize,
    pub bands: usize,
    pub header_offset: usize,
    pub data_type: DataType,
    pub interleave: Interleave,
    pub byte_order: ByteOrder,
    pub wavelengths: Option<Vec<f64>>,
    pub wavelength_units: Option<String>,
    pub description: Option<String>,
}

impl EnviHeader {
    /// Parse header text.
    ///
    /// Keys are case-insensitive; `{ … }` values may span several lines.
    pub fn parse(text: &str) -> Result<Self> {
        let fields = parse_fields(text)?;

        let samples = required_dim(&fields, "samples")?;
        let lines = required_dim(&fields, "lines")?;
        let bands = required_dim(&fields, "bands")?;
        let header_offset = match fields.get("header offset") {
            Some(v) => parse_usize("header offset", v)?,
            None => 0,
        };

        let code = fields
            .get("data type")
            .ok_or(Error::MissingKey { key: "data type" })?;
        let data_type = DataType::from_code(parse_usize("data type", code)? as u32)?;

        let interleave = match fields.get("interleave") {
            Some(v) => Interleave::parse(v).ok_or_else(|| invalid("interleave", v))?,
            None => Interleave::Bsq,
        };

        let byte_order = match fields.get("byte order").map(|v| v.trim()) {
            None | Some("0") => ByteOrder::Little,
            Some("1") => ByteOrder::Big,
            Some(v) => return Err(invalid("byte order", v)),
        };

        let wavelengths = fields
            .get("wavelength")
            .map(|v| parse_float_list("wavelength", v))
            .transpose()?;

        let header = EnviHeader {
            samples,
            lines,
            bands,
            header_offset,
            data_type,
            interleave,
            byte_order,
            wavelengths,
            wavelength_units: fields.get("wavelength units").map(|v| v.trim().to_string()),
            description: fields.get("description").map(|v| brace_contents(v).to_string()),
        };
        header.data_len()?;
        Ok(header)
    }

    /// Serialise back to header text.
    pub fn to_text(&self) -> String {
        let mut out = String::from("ENVI\n");
        if let Some(desc) = &self.description {
            let _ = writeln!(out, "description = {{{desc}}}");
        }
        let _ = writeln!(out, "samples = {}", self.samples);
        let _ = writeln!(out, "lines = {}", self.lines);
        let _ = writeln!(out, "bands = {}", self.bands);
        let _ = writeln!(out, "header offset = {}", self.header_offset);
        out.push_str("file type = ENVI Standard\n");
        let _ = writeln!(out, "data type = {}", self.data_type.code());
        let _ = writeln!(out, "interleave = {}", self.interleave.label());
        let order = match self.byte_order {
            ByteOrder::Little => 0,
            ByteOrder::Big => 1,
        };
        let _ = writeln!(out, "byte order = {order}");
        if let Some(units) = &self.wavelength_units {
            let _ = writeln!(out, "wavelength units = {units}");
        }
        if let Some(wl) = &self.wavelengths {
            let list: Vec<String> = wl.iter().map(|w| w.to_string()).collect();
            let _ = writeln!(out, "wavelength = {{\n {}}}", list.join(", "));
        }
        out
    }

    /// Number of samples in the raster, `None` on overflow.
    pub fn sample_count(&self) -> Option<usize> {
        self.lines.checked_mul(self.samples)?.checked_mul(self.bands)
    }

    /// Bytes the data file must hold, header offset included.
    pub fn data_len(&self) -> Result<usize> {
        self.sample_count()
            .and_then(|n| n.checked_mul(self.data_type.size()))
            .and_then(|n| n.checked_add(self.header_offset))
            .ok_or(Error::TooLarge {
                lines: self.lines,
                samples: self.samples,
                bands: self.bands,
            })
    }
}

fn parse_fields(text: &str) -> Result<BTreeMap<String, String>> {
    let mut lines = text.lines();
    let magic = lines.by_ref().find(|l| !l.trim().is_empty());
    if !magic.is_some_and(|l| l.trim_start().starts_with("ENVI")) {
        return Err(Error::NotEnvi);
    }

    let mut fields = BTreeMap::new();
    let mut pending: Option<(String, String)> = None;

    for line in lines {
        if let Some((key, mut value)) = pending.take() {
            value.push('\n');
            value.push_str(line);
            if line.contains('}') {
                fields.insert(key, value);
            } else {
                pending = Some((key, value));
            }
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().to_string();
        if value.starts_with('{') && !value.contains('}') {
            pending = Some((key, value));
        } else {
            fields.insert(key, value);
        }
    }

    // Unterminated brace: keep what was read.
    if let Some((key, value)) = pending {
        fields.insert(key, value);
    }

    Ok(fields)
}

fn brace_contents(value: &str) -> &str {
    let v = value.trim();
    let v = v.strip_prefix('{').unwrap_or(v);
    let v = v.strip_suffix('}').unwrap_or(v);
    v.trim()
}

fn invalid(key: &str, value: &str) -> Error {
    Error::InvalidValue {
        key: key.to_string(),
        value: value.trim().to_string(),
    }
}

fn parse_usize(key: &str, value: &str) -> Result<usize> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

/// A required raster dimension; zero is rejected.
fn required_dim(fields: &BTreeMap<String, String>, key: &'static str) -> Result<usize> {
    let value = fields.get(key).ok_or(Error::MissingKey { key })?;
    match parse_usize(key, value)? {
        0 => Err(invalid(key, value)),
        n => Ok(n),
    }
}

fn parse_float_list(key: &str, value: &str) -> Result<Vec<f64>> {
    brace_contents(value)
        .split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(|tok| tok.parse::<f64>().map_err(|_| invalid(key, tok)))
        .collect()
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Locate the binary data file that belongs to a header.
///
/// `I99.bil.hdr` → `I99.bil`; otherwise the stem with one of the usual
/// raster extensions.
pub fn data_file_for(header_path: &Path) -> Result<PathBuf> {
    let is_hdr = header_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("hdr"));

    let stem = if is_hdr {
        header_path.with_extension("")
    } else {
        header_path.to_path_buf()
    };

    let mut candidates = Vec::with_capacity(DATA_EXTENSIONS.len() + 1);
    if is_hdr {
        candidates.push(stem.clone());
    }
    candidates.extend(DATA_EXTENSIONS.iter().map(|ext| stem.with_extension(ext)));

    candidates
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| Error::DataFileNotFound {
            header: header_path.to_path_buf(),
        })
}

/// Decode a raw raster into a `[row, column, band]` array.
pub fn read_raster(header: &EnviHeader, data_path: &Path) -> Result<Array3<f32>> {
    let bytes = fs::read(data_path).map_err(|source| Error::Io {
        path: data_path.to_path_buf(),
        source,
    })?;

    let size = header.data_type.size();
    let expected = header.data_len()?;
    if bytes.len() < expected {
        return Err(Error::Truncated {
            path: data_path.to_path_buf(),
            expected,
            actual: bytes.len(),
        });
    }

    let values: Vec<f32> = bytes[header.header_offset..expected]
        .chunks_exact(size)
        .map(|chunk| header.data_type.decode(chunk, header.byte_order))
        .collect();

    let (lines, samples, bands) = (header.lines, header.samples, header.bands);
    let cube = match header.interleave {
        Interleave::Bsq => Array3::from_shape_vec((bands, lines, samples), values)?.permuted_axes([1, 2, 0]),
        Interleave::Bil => Array3::from_shape_vec((lines, bands, samples), values)?.permuted_axes([0, 2, 1]),
        Interleave::Bip => Array3::from_shape_vec((lines, samples, bands), values)?,
    };

    Ok(cube.as_standard_layout().into_owned())
}

/// Open an ENVI header and its data file as a [`HyperspectralCube`].
pub fn open(header_path: &Path) -> Result<HyperspectralCube> {
    let text = fs::read_to_string(header_path).map_err(|source| Error::Io {
        path: header_path.to_path_buf(),
        source,
    })?;
    let header = EnviHeader::parse(&text)?;
    let data_path = data_file_for(header_path)?;
    let data = read_raster(&header, &data_path)?;

    log::info!(
        "Loaded {} ({} lines × {} samples × {} bands, {}, data type {})",
        data_path.display(),
        header.lines,
        header.samples,
        header.bands,
        header.interleave.label(),
        header.data_type.code()
    );

    HyperspectralCube::new(data, header.wavelengths, header.wavelength_units)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write `cube` as a little-endian f32 ENVI pair and return the data path.
///
/// A `name.<ext>.hdr` header gets its data in `name.<ext>`; any other header
/// name gets the interleave as extension.
pub fn save_envi(header_path: &Path, cube: &HyperspectralCube, interleave: Interleave) -> Result<PathBuf> {
    let (lines, samples, bands) = cube.data().dim();
    let header = EnviHeader {
        samples,
        lines,
        bands,
        header_offset: 0,
        data_type: DataType::F32,
        interleave,
        byte_order: ByteOrder::Little,
        wavelengths: cube.has_wavelengths().then(|| cube.wavelengths().to_vec()),
        wavelength_units: cube.wavelength_units().map(str::to_owned),
        description: Some("Written by hyperspec-explorer".to_string()),
    };

    fs::write(header_path, header.to_text()).map_err(|source| Error::Io {
        path: header_path.to_path_buf(),
        source,
    })?;

    let stripped = header_path.with_extension("");
    let data_path = if header_path.extension().is_some_and(|e| e == "hdr") && stripped.extension().is_some() {
        stripped
    } else {
        stripped.with_extension(interleave.label())
    };

    let view = cube.data().view();
    let ordered = match interleave {
        Interleave::Bsq => view.permuted_axes([2, 0, 1]),
        Interleave::Bil => view.permuted_axes([0, 2, 1]),
        Interleave::Bip => view,
    };
    let mut bytes = Vec::with_capacity(ordered.len() * DataType::F32.size());
    for v in ordered.iter() {
        bytes.extend_from_slice(&v.to_le_bytes());
    }

    fs::write(&data_path, bytes).map_err(|source| Error::Io {
        path: data_path.clone(),
        source,
    })?;

    Ok(data_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "ENVI
description = {
  Test cube }
samples = 4
lines   = 3
bands   = 2
header offset = 0
file type = ENVI Standard
data type = 4
interleave = bil
byte order = 0
Wavelength Units = Nanometers
wavelength = {
 450.5, 550.0
 }
";

    fn sample_cube() -> HyperspectralCube {
        let data = Array3::from_shape_fn((3, 4, 2), |(r, c, b)| (100 * r + 10 * c + b) as f32);
        HyperspectralCube::new(data, Some(vec![450.5, 550.0]), Some("Nanometers".into())).unwrap()
    }

    #[test]
    fn test_parse_header() {
        let h = EnviHeader::parse(HEADER).unwrap();
        assert_eq!((h.lines, h.samples, h.bands), (3, 4, 2));
        assert_eq!(h.data_type, DataType::F32);
        assert_eq!(h.interleave, Interleave::Bil);
        assert_eq!(h.byte_order, ByteOrder::Little);
        assert_eq!(h.wavelengths, Some(vec![450.5, 550.0]));
        assert_eq!(h.wavelength_units.as_deref(), Some("Nanometers"));
        assert_eq!(h.description.as_deref(), Some("Test cube"));
    }

    #[test]
    fn test_header_defaults() {
        let h = EnviHeader::parse("ENVI\nsamples = 1\nlines = 1\nbands = 1\ndata type = 1\n").unwrap();
        assert_eq!(h.interleave, Interleave::Bsq);
        assert_eq!(h.byte_order, ByteOrder::Little);
        assert_eq!(h.header_offset, 0);
        assert!(h.wavelengths.is_none());
    }

    #[test]
    fn test_not_envi() {
        let err = EnviHeader::parse("samples = 4\n").unwrap_err();
        assert!(matches!(err, Error::NotEnvi));
    }

    #[test]
    fn test_missing_key() {
        let err = EnviHeader::parse("ENVI\nsamples = 4\nlines = 2\ndata type = 4\n").unwrap_err();
        assert!(matches!(err, Error::MissingKey { key: "bands" }));
    }

    #[test]
    fn test_unsupported_data_type() {
        let text = "ENVI\nsamples = 1\nlines = 1\nbands = 1\ndata type = 6\n";
        assert!(matches!(
            EnviHeader::parse(text).unwrap_err(),
            Error::UnsupportedDataType(6)
        ));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        for key in ["samples", "lines", "bands"] {
            let text = format!("ENVI\nsamples = 2\nlines = 2\nbands = 2\ndata type = 4\n{key} = 0\n");
            let err = EnviHeader::parse(&text).unwrap_err();
            assert!(
                matches!(&err, Error::InvalidValue { key: k, value } if k == key && value == "0"),
                "{key}: {err}"
            );
        }
    }

    #[test]
    fn test_oversized_raster_rejected() {
        let text = "ENVI\nsamples = 4294967296\nlines = 4294967296\nbands = 2\ndata type = 4\n";
        assert!(matches!(
            EnviHeader::parse(text).unwrap_err(),
            Error::TooLarge { bands: 2, .. }
        ));

        let h = EnviHeader::parse("ENVI\nsamples = 2\nlines = 3\nbands = 4\nheader offset = 5\ndata type = 2\n").unwrap();
        assert_eq!(h.sample_count(), Some(24));
        assert_eq!(h.data_len().unwrap(), 53);
    }

    #[test]
    fn test_invalid_interleave() {
        let text = "ENVI\nsamples = 1\nlines = 1\nbands = 1\ndata type = 1\ninterleave = xyz\n";
        assert!(matches!(
            EnviHeader::parse(text).unwrap_err(),
            Error::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_header_text_reparses() {
        let h = EnviHeader::parse(HEADER).unwrap();
        assert_eq!(EnviHeader::parse(&h.to_text()).unwrap(), h);
    }

    #[test]
    fn test_every_interleave_decodes_to_same_cube() {
        let dir = tempfile::tempdir().unwrap();
        let cube = sample_cube();
        for interleave in [Interleave::Bsq, Interleave::Bil, Interleave::Bip] {
            let hdr = dir.path().join(format!("cube_{}.hdr", interleave.label()));
            save_envi(&hdr, &cube, interleave).unwrap();
            let loaded = open(&hdr).unwrap();
            assert_eq!(loaded.data(), cube.data(), "{interleave:?}");
            assert_eq!(loaded.wavelengths(), cube.wavelengths());
        }
    }

    #[test]
    fn test_big_endian_i16_with_offset() {
        let dir = tempfile::tempdir().unwrap();
        let hdr = dir.path().join("be.hdr");
        fs::write(
            &hdr,
            "ENVI\nsamples = 2\nlines = 1\nbands = 1\nheader offset = 3\ndata type = 2\nbyte order = 1\n",
        )
        .unwrap();
        let mut bytes = vec![0xAA, 0xBB, 0xCC];
        bytes.extend_from_slice(&(-2i16).to_be_bytes());
        bytes.extend_from_slice(&300i16.to_be_bytes());
        fs::write(dir.path().join("be.img"), bytes).unwrap();

        let cube = open(&hdr).unwrap();
        assert_eq!(cube.pixel_spectrum(0, 0).to_vec(), vec![-2.0]);
        assert_eq!(cube.pixel_spectrum(1, 0).to_vec(), vec![300.0]);
    }

    #[test]
    fn test_truncated_data() {
        let dir = tempfile::tempdir().unwrap();
        let hdr = dir.path().join("short.hdr");
        fs::write(&hdr, "ENVI\nsamples = 2\nlines = 2\nbands = 1\ndata type = 4\n").unwrap();
        fs::write(dir.path().join("short.raw"), [0u8; 10]).unwrap();

        let err = open(&hdr).unwrap_err();
        assert!(matches!(err, Error::Truncated { expected: 16, actual: 10, .. }));
    }

    #[test]
    fn test_data_file_for_double_extension() {
        let dir = tempfile::tempdir().unwrap();
        let hdr = dir.path().join("I99.bil.hdr");
        fs::write(&hdr, "").unwrap();
        fs::write(dir.path().join("I99.bil"), "").unwrap();
        assert_eq!(data_file_for(&hdr).unwrap(), dir.path().join("I99.bil"));
    }

    #[test]
    fn test_data_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let hdr = dir.path().join("lonely.hdr");
        assert!(matches!(
            data_file_for(&hdr).unwrap_err(),
            Error::DataFileNotFound { .. }
        ));
    }

    #[test]
    fn test_save_envi_data_path() {
        let dir = tempfile::tempdir().unwrap();
        let cube = sample_cube();
        let data = save_envi(&dir.path().join("scene.bil.hdr"), &cube, Interleave::Bil).unwrap();
        assert_eq!(data, dir.path().join("scene.bil"));
        let data = save_envi(&dir.path().join("plain.hdr"), &cube, Interleave::Bsq).unwrap();
        assert_eq!(data, dir.path().join("plain.bsq"));
    }
}
