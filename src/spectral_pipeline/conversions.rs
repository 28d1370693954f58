//! End-to-end conversions built from the pipeline stages

mod spectral_to_rgb;
mod timing;


pub use spectral_to_rgb::{OutputPaths, SpectralToRgbPipeline};
pub use timing::{PipelineTimings, StepTiming, Timer};
