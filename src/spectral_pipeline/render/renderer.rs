use std::path::Path;

use crate::spectral_pipeline::common::error::Result;

/// Produces one radiance slice for a single wavelength.
///
/// Implementations must leave an image at `output` when they return `Ok`.
pub trait SpectralRenderer: Sync {
    fn render(&self, wavelength: f64, output: &Path) -> Result<()>;
}
