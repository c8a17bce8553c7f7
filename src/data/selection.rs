use crate::error::SelectionFull;

/// Choices offered for the maximum number of saved spectra.
pub const MAX_SPECTRA_CHOICES: [usize; 10] = [5, 10, 15, 20, 25, 30, 35, 40, 45, 50];

pub const DEFAULT_MAX_SPECTRA: usize = 5;

/// A spectrum the user clicked on.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedSpectrum {
    /// Pixel column.
    pub x: usize,
    /// Pixel row.
    pub y: usize,
    /// One value per band.
    pub values: Vec<f32>,
}

/// Ordered list of saved spectra, capped at `max` entries.
#[derive(Debug, Clone)]
pub struct SpectrumSelection {
    items: Vec<SavedSpectrum>,
    max: usize,
}

impl Default for SpectrumSelection {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPECTRA)
    }
}

impl SpectrumSelection {
    pub fn new(max: usize) -> Self {
        Self {
            items: Vec::new(),
            max,
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Change the cap. Entries beyond a lowered cap are kept; further pushes
    /// are refused until the list drops below it.
    pub fn set_max(&mut self, max: usize) {
        self.max = max;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max
    }

    pub fn push(&mut self, spectrum: SavedSpectrum) -> Result<(), SelectionFull> {
        if self.is_full() {
            return Err(SelectionFull { max: self.max });
        }
        self.items.push(spectrum);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<SavedSpectrum> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn as_slice(&self) -> &[SavedSpectrum] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SavedSpectrum> {
        self.items.iter()
    }
}
