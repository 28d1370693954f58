//! Directory to spectral stack assembly.
//!
//! Every file carrying the slice extension is one wavelength; its stem is the
//! wavelength in nanometers. Files are ordered by the parsed numeric value,
//! so `900.exr` sorts after `1000.exr` only if it really is larger.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::spectral_pipeline::common::error::{Result, SpectralError};
use crate::spectral_pipeline::stack::reader::{AnySliceReader, SliceReader};
use crate::spectral_pipeline::stack::types::{MonoImage, SpectralStack};

pub struct StackLoader<S: SliceReader> {
    reader: S,
    extension: String,
}

impl StackLoader<AnySliceReader> {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            reader: AnySliceReader,
            extension: extension.into(),
        }
    }
}

impl<S: SliceReader> StackLoader<S> {
    pub fn with_reader(reader: S, extension: impl Into<String>) -> Self {
        Self {
            reader,
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Lists `(wavelength, path)` for every slice in `dir`, sorted by
    /// wavelength.
    pub fn list_slices(&self, dir: &Path) -> Result<Vec<(f64, PathBuf)>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| SpectralError::InputReadError(format!("{}: {}", dir.display(), e)))?;

        let mut slices = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || !self.matches_extension(&path) {
                continue;
            }
            let wavelength = parse_wavelength(&path)?;
            slices.push((wavelength, path));
        }

        slices.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(pair) = slices.windows(2).find(|p| p[0].0 == p[1].0) {
            return Err(SpectralError::DuplicateWavelength(pair[0].0));
        }
        Ok(slices)
    }

    /// Loads every slice in `dir` into one stack.
    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display()))]
    pub fn load_dir<P: AsRef<Path>>(&self, dir: P) -> Result<SpectralStack> {
        let dir = dir.as_ref();
        let slices = self.list_slices(dir)?;
        if slices.is_empty() {
            return Err(SpectralError::EmptyStack(dir.to_path_buf()));
        }
        self.load_slices(&slices)
    }

    /// Loads the given `(wavelength, path)` slices, which must be sorted by
    /// strictly increasing wavelength.
    pub fn load_slices(&self, slices: &[(f64, PathBuf)]) -> Result<SpectralStack> {
        if slices.is_empty() {
            return Err(SpectralError::TooFewSamples {
                what: "slices",
                required: 1,
                actual: 0,
            });
        }

        let mut wavelengths = Vec::with_capacity(slices.len());
        let mut images: Vec<MonoImage> = Vec::with_capacity(slices.len());
        for (wavelength, path) in slices {
            let bytes = std::fs::read(path).map_err(|e| {
                SpectralError::InputReadError(format!("{}: {}", path.display(), e))
            })?;
            let image = self.reader.read_slice(&bytes)?;

            if image.width == 0 || image.height == 0 {
                return Err(SpectralError::InvalidDimensions(image.width, image.height));
            }
            if let Some(first) = images.first() {
                if (image.width, image.height) != (first.width, first.height) {
                    return Err(SpectralError::DimensionMismatch {
                        path: path.clone(),
                        expected: (first.width, first.height),
                        actual: (image.width, image.height),
                    });
                }
            }

            debug!(wavelength, path = %path.display(), "Loaded slice");
            wavelengths.push(*wavelength);
            images.push(image);
        }

        let stack = SpectralStack::from_slices(wavelengths, &images);
        info!(
            width = stack.width(),
            height = stack.height(),
            wavelengths = stack.depth(),
            "Assembled spectral stack"
        );
        Ok(stack)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }
}

/// Parses the wavelength encoded in a slice file stem, e.g. `550.exr`.
pub fn parse_wavelength(path: &Path) -> Result<f64> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|w| w.is_finite())
        .ok_or_else(|| SpectralError::InvalidFilename(path.to_path_buf()))
}
