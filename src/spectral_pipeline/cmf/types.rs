//! CMF table types

use crate::spectral_pipeline::common::error::{Result, SpectralError};

/// One tabulated wavelength and its three matching-function weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CmfRow {
    /// Wavelength in nanometers
    pub wavelength: f64,
    /// Weights (X̄, Ȳ, Z̄) or their linear sRGB counterparts
    pub weights: [f64; 3],
}

/// Matching functions over a strictly increasing wavelength axis
#[derive(Debug, Clone, PartialEq)]
pub struct CmfTable {
    rows: Vec<CmfRow>,
}

impl CmfTable {
    /// Builds a table, rejecting duplicate or decreasing wavelengths.
    pub fn new(rows: Vec<CmfRow>) -> Result<Self> {
        for (i, pair) in rows.windows(2).enumerate() {
            if pair[1].wavelength <= pair[0].wavelength {
                if pair[1].wavelength == pair[0].wavelength {
                    return Err(SpectralError::DuplicateWavelength(pair[1].wavelength));
                }
                return Err(SpectralError::NonMonotonicCmf {
                    line: i as u64 + 2,
                    previous: pair[0].wavelength,
                    current: pair[1].wavelength,
                });
            }
        }
        Ok(Self { rows })
    }

    /// Callers guarantee the ordering invariant already holds.
    pub(crate) fn from_sorted_rows(rows: Vec<CmfRow>) -> Self {
        debug_assert!(rows.windows(2).all(|p| p[0].wavelength < p[1].wavelength));
        Self { rows }
    }

    pub fn rows(&self) -> &[CmfRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn wavelengths(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.wavelength).collect()
    }

    /// The weight column for channel `c` (0, 1 or 2).
    pub fn channel(&self, c: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r.weights[c]).collect()
    }
}
