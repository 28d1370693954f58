//! Per-wavelength rendering module
//!
//! This module drives the external spectral renderer: one invocation per
//! sampled wavelength, each producing one slice file named after its
//! wavelength.

mod renderer;
mod external_renderer;
mod range;
mod scheduler;


pub use renderer::SpectralRenderer;
pub use external_renderer::{ExternalRenderer, FORBIDDEN_RENDERER_ARGS, check_renderer_args};
pub use range::WavelengthRange;
pub use scheduler::{render_all, slice_path};
