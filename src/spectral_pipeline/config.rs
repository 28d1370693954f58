//! Pipeline configuration types

use std::path::PathBuf;

use crate::spectral_pipeline::cmf::MIN_SPLINE_POINTS;
use crate::spectral_pipeline::common::error::{Result, SpectralError};
use crate::spectral_pipeline::output::types::{Container, TiffCompression};
use crate::spectral_pipeline::render::WavelengthRange;
use crate::spectral_pipeline::tonemap::Quantization;

/// Configuration for one spectral to RGB run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Output path without extension; writers append their own suffix
    pub output_base: PathBuf,
    /// Color matching function table (CSV: wavelength, x̄, ȳ, z̄)
    pub cmf_path: PathBuf,
    /// Wavelengths handed to the renderer
    pub wavelengths: WavelengthRange,
    /// Exposure constant of the exponential tonemap
    pub exposure: f64,
    /// Concurrent renderer invocations. 1 keeps the sequential fail-fast order.
    pub jobs: usize,
    pub quantization: Quantization,
    pub container: Container,
    /// Only used by [`Container::Tiff`]
    pub tiff_compression: TiffCompression,
    /// TIFF predictor tag for the 8-bit image (2 = horizontal differencing)
    pub tiff_predictor: Option<u16>,
    /// Extension of the slices written by the renderer
    pub slice_extension: String,
    /// Render into this directory and keep it instead of a scratch directory
    pub keep_slices: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_base: PathBuf::from("out"),
            cmf_path: PathBuf::from("lin2012xyz2e_1_7sf.csv"),
            wavelengths: WavelengthRange::default(),
            exposure: 0.05,
            jobs: 1,
            quantization: Quantization::default(),
            container: Container::default(),
            tiff_compression: TiffCompression::default(),
            tiff_predictor: None,
            slice_extension: "exr".to_string(),
            keep_slices: None,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Rejects settings that cannot produce an image.
    pub fn validate(&self) -> Result<()> {
        self.wavelengths.validate()?;
        let samples = self.wavelengths.len();
        if samples < MIN_SPLINE_POINTS {
            return Err(SpectralError::TooFewSamples {
                what: "wavelength range",
                required: MIN_SPLINE_POINTS,
                actual: samples,
            });
        }
        if !(self.exposure.is_finite() && self.exposure > 0.0) {
            return Err(SpectralError::Config(format!(
                "exposure must be a positive finite number, got {}",
                self.exposure
            )));
        }
        if self.jobs == 0 {
            return Err(SpectralError::Config("jobs must be at least 1".to_string()));
        }
        if self.slice_extension.is_empty() {
            return Err(SpectralError::Config("slice extension must not be empty".to_string()));
        }
        if self.output_base.as_os_str().is_empty() {
            return Err(SpectralError::Config("output path must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    output_base: Option<PathBuf>,
    cmf_path: Option<PathBuf>,
    wavelengths: Option<WavelengthRange>,
    exposure: Option<f64>,
    jobs: Option<usize>,
    quantization: Option<Quantization>,
    container: Option<Container>,
    tiff_compression: Option<TiffCompression>,
    tiff_predictor: Option<Option<u16>>,
    slice_extension: Option<String>,
    keep_slices: Option<Option<PathBuf>>,
}

impl PipelineConfigBuilder {
    pub fn output_base(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_base = Some(path.into());
        self
    }

    pub fn cmf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cmf_path = Some(path.into());
        self
    }

    pub fn wavelengths(mut self, range: WavelengthRange) -> Self {
        self.wavelengths = Some(range);
        self
    }

    pub fn exposure(mut self, exposure: f64) -> Self {
        self.exposure = Some(exposure);
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn quantization(mut self, quantization: Quantization) -> Self {
        self.quantization = Some(quantization);
        self
    }

    pub fn container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    pub fn tiff_compression(mut self, compression: TiffCompression) -> Self {
        self.tiff_compression = Some(compression);
        self
    }

    pub fn tiff_predictor(mut self, predictor: Option<u16>) -> Self {
        self.tiff_predictor = Some(predictor);
        self
    }

    pub fn slice_extension(mut self, extension: impl Into<String>) -> Self {
        self.slice_extension = Some(extension.into());
        self
    }

    pub fn keep_slices(mut self, dir: Option<PathBuf>) -> Self {
        self.keep_slices = Some(dir);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            output_base: self.output_base.unwrap_or(default.output_base),
            cmf_path: self.cmf_path.unwrap_or(default.cmf_path),
            wavelengths: self.wavelengths.unwrap_or(default.wavelengths),
            exposure: self.exposure.unwrap_or(default.exposure),
            jobs: self.jobs.unwrap_or(default.jobs),
            quantization: self.quantization.unwrap_or(default.quantization),
            container: self.container.unwrap_or(default.container),
            tiff_compression: self.tiff_compression.unwrap_or(default.tiff_compression),
            tiff_predictor: self.tiff_predictor.unwrap_or(default.tiff_predictor),
            slice_extension: self.slice_extension.unwrap_or(default.slice_extension),
            keep_slices: self.keep_slices.unwrap_or(default.keep_slices),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.output_base, PathBuf::from("out"));
        assert_eq!(config.cmf_path, PathBuf::from("lin2012xyz2e_1_7sf.csv"));
        assert_eq!(config.wavelengths, WavelengthRange::new(390, 781, 10));
        assert_eq!(config.exposure, 0.05);
        assert_eq!(config.jobs, 1);
        assert_eq!(config.quantization, Quantization::Truncate);
        assert_eq!(config.container, Container::ExrPng);
        assert_eq!(config.slice_extension, "exr");
        assert!(config.keep_slices.is_none());
        assert!(config.tiff_predictor.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::builder()
            .output_base("renders/sky")
            .wavelengths(WavelengthRange::new(400, 700, 5))
            .exposure(0.2)
            .jobs(4)
            .quantization(Quantization::Round)
            .container(Container::Tiff)
            .tiff_compression(TiffCompression::Lzw)
            .tiff_predictor(Some(2))
            .keep_slices(Some(PathBuf::from("slices")))
            .build();

        assert_eq!(config.output_base, PathBuf::from("renders/sky"));
        assert_eq!(config.wavelengths.len(), 60);
        assert_eq!(config.exposure, 0.2);
        assert_eq!(config.jobs, 4);
        assert_eq!(config.quantization, Quantization::Round);
        assert_eq!(config.container, Container::Tiff);
        assert_eq!(config.tiff_compression, TiffCompression::Lzw);
        assert_eq!(config.tiff_predictor, Some(2));
        assert_eq!(config.keep_slices, Some(PathBuf::from("slices")));
        assert_eq!(config.cmf_path, PipelineConfig::default().cmf_path);
    }

    #[test]
    fn test_validation_failures() {
        let invalid = [
            PipelineConfig::builder().wavelengths(WavelengthRange::new(500, 400, 10)).build(),
            PipelineConfig::builder().wavelengths(WavelengthRange::new(400, 500, 0)).build(),
            PipelineConfig::builder().exposure(0.0).build(),
            PipelineConfig::builder().exposure(-1.0).build(),
            PipelineConfig::builder().exposure(f64::NAN).build(),
            PipelineConfig::builder().jobs(0).build(),
            PipelineConfig::builder().slice_extension("").build(),
            PipelineConfig::builder().output_base("").build(),
        ];
        for config in &invalid {
            assert!(
                matches!(config.validate(), Err(SpectralError::Config(_))),
                "accepted {:?}",
                config
            );
        }
    }

    #[test]
    fn test_range_too_short_for_resampling() {
        let short = PipelineConfig::builder()
            .wavelengths(WavelengthRange::new(400, 430, 10))
            .build();
        assert!(matches!(
            short.validate(),
            Err(SpectralError::TooFewSamples { required: 4, actual: 3, .. })
        ));

        let shortest_valid = PipelineConfig::builder()
            .wavelengths(WavelengthRange::new(400, 431, 10))
            .build();
        assert!(shortest_valid.validate().is_ok());
    }
}
