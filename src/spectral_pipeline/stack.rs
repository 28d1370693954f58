//! Spectral stack loading module
//!
//! This module reads per-wavelength radiance slices and assembles them into a
//! single (row, column, wavelength) volume.

mod reader;
mod exr_reader;
mod tiff_reader;
mod loader;
pub mod types;


pub use reader::{SliceReader, AnySliceReader};
pub use exr_reader::ExrSliceReader;
pub use tiff_reader::TiffSliceReader;
pub use loader::{StackLoader, parse_wavelength};
pub use types::{MonoImage, SpectralStack};
