use crate::spectral_pipeline::common::error::{Result, SpectralError};

/// Half-open integer wavelength range `[begin, end)` walked in `step` nm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavelengthRange {
    pub begin: u32,
    pub end: u32,
    pub step: u32,
}

impl Default for WavelengthRange {
    fn default() -> Self {
        Self {
            begin: 390,
            end: 781,
            step: 10,
        }
    }
}

impl WavelengthRange {
    pub fn new(begin: u32, end: u32, step: u32) -> Self {
        Self { begin, end, step }
    }

    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(SpectralError::Config("wavelength step must be positive".to_string()));
        }
        if self.begin >= self.end {
            return Err(SpectralError::Config(format!(
                "wavelength range [{}, {}) is empty",
                self.begin, self.end
            )));
        }
        Ok(())
    }

    /// Sampled wavelengths in increasing order. Empty if the range is invalid.
    pub fn wavelengths(&self) -> Vec<f64> {
        if self.step == 0 {
            return Vec::new();
        }
        (self.begin..self.end)
            .step_by(self.step as usize)
            .map(f64::from)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.wavelengths().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
