//! Spectral to tristimulus image pipeline
//!
//! This module turns a stack of monospectral radiance images into one RGB
//! image: CMF resampling, per-pixel Simpson integration, colorspace
//! conversion and tonemapping, plus the orchestration around an external
//! per-wavelength renderer.

pub mod common;
pub mod colorimetry;
pub mod cmf;
pub mod stack;
pub mod integrate;
pub mod tonemap;
pub mod output;
pub mod render;
pub mod config;
pub mod conversions;

pub use common::{
    SpectralError,
    Result,
    TristimulusImage,
    LdrImage,
};

pub use cmf::{
    CmfRow,
    CmfTable,
    load_cmf_csv,
    resample_cmf,
};

pub use stack::{
    MonoImage,
    SpectralStack,
    SliceReader,
    ExrSliceReader,
    TiffSliceReader,
    AnySliceReader,
    StackLoader,
};

pub use output::{
    HdrWriter,
    LdrWriter,
    ExrWriter,
    PngWriter,
    StandardTiffWriter,
    ContainerWriter,
    Container,
    TiffCompression,
};

pub use render::{
    SpectralRenderer,
    ExternalRenderer,
    WavelengthRange,
    FORBIDDEN_RENDERER_ARGS,
};

pub use tonemap::{Quantization, to_ldr};

pub use config::{
    PipelineConfig,
    PipelineConfigBuilder,
};

pub use conversions::{
    SpectralToRgbPipeline,
    PipelineTimings,
    OutputPaths,
};
