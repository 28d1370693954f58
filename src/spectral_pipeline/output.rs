//! Result image writing module
//!
//! This module writes the HDR tristimulus image and the quantized LDR image,
//! as OpenEXR + PNG or as a pair of TIFF files.

mod writer;
mod exr_writer;
mod png_writer;
mod standard_tiff_writer;
mod container;
pub mod types;


pub use writer::{HdrWriter, LdrWriter};
pub use exr_writer::ExrWriter;
pub use png_writer::PngWriter;
pub use standard_tiff_writer::StandardTiffWriter;
pub use container::ContainerWriter;
pub use types::{Container, TiffCompression};
