//! Spectral stack types

use crate::spectral_pipeline::common::error::{Result, SpectralError};

/// One decoded single-channel radiance slice
#[derive(Debug, Clone, PartialEq)]
pub struct MonoImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Radiance samples, row-major
    pub data: Vec<f32>,
}

/// Radiance volume indexed by (row, column, wavelength index)
///
/// Samples of one pixel are contiguous, so `spectrum(row, col)` is a plain
/// slice ordered like `wavelengths`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralStack {
    width: usize,
    height: usize,
    wavelengths: Vec<f64>,
    data: Vec<f32>,
}

impl SpectralStack {
    /// Wraps pixel-major data (`(row * width + col) * n + k`).
    pub fn new(width: usize, height: usize, wavelengths: Vec<f64>, data: Vec<f32>) -> Result<Self> {
        if data.len() != width * height * wavelengths.len() {
            return Err(SpectralError::Config(format!(
                "stack data holds {} samples, expected {}x{}x{}",
                data.len(),
                width,
                height,
                wavelengths.len()
            )));
        }
        Ok(Self {
            width,
            height,
            wavelengths,
            data,
        })
    }

    /// Interleaves equally sized slices along a new wavelength axis.
    ///
    /// Slices must already be sorted by wavelength and share dimensions.
    pub(crate) fn from_slices(wavelengths: Vec<f64>, slices: &[MonoImage]) -> Self {
        let (width, height) = slices
            .first()
            .map(|s| (s.width, s.height))
            .unwrap_or((0, 0));
        let n = slices.len();
        let mut data = vec![0.0f32; width * height * n];
        for (k, slice) in slices.iter().enumerate() {
            for (p, &value) in slice.data.iter().enumerate() {
                data[p * n + k] = value;
            }
        }
        Self {
            width,
            height,
            wavelengths,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Number of wavelength samples per pixel.
    pub fn depth(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn spectrum(&self, row: usize, col: usize) -> &[f32] {
        let n = self.depth();
        let base = (row * self.width + col) * n;
        &self.data[base..base + n]
    }

    /// Multiplies every sample by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            data: self.data.iter().map(|&v| v * factor).collect(),
            ..self.clone()
        }
    }
}
