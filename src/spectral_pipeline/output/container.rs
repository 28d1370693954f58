use std::io::Write;

use crate::spectral_pipeline::common::error::Result;
use crate::spectral_pipeline::common::types::{LdrImage, TristimulusImage};
use crate::spectral_pipeline::output::exr_writer::ExrWriter;
use crate::spectral_pipeline::output::png_writer::PngWriter;
use crate::spectral_pipeline::output::standard_tiff_writer::StandardTiffWriter;
use crate::spectral_pipeline::output::types::{Container, TiffCompression};
use crate::spectral_pipeline::output::writer::{HdrWriter, LdrWriter};

/// Writer pair selected at runtime from a [`Container`].
#[derive(Debug, Clone, Copy)]
pub enum ContainerWriter {
    ExrPng,
    Tiff(StandardTiffWriter),
}

impl ContainerWriter {
    /// `compression` and `predictor` only affect [`Container::Tiff`].
    pub fn new(container: Container, compression: TiffCompression, predictor: Option<u16>) -> Self {
        match container {
            Container::ExrPng => Self::ExrPng,
            Container::Tiff => Self::Tiff(StandardTiffWriter {
                compression,
                predictor,
            }),
        }
    }
}

impl Default for ContainerWriter {
    fn default() -> Self {
        Self::new(Container::default(), TiffCompression::default(), None)
    }
}

impl HdrWriter for ContainerWriter {
    fn hdr_suffix(&self) -> &'static str {
        match self {
            Self::ExrPng => ExrWriter.hdr_suffix(),
            Self::Tiff(writer) => writer.hdr_suffix(),
        }
    }

    fn write_hdr(&self, image: &TristimulusImage, output: &mut dyn Write) -> Result<()> {
        match self {
            Self::ExrPng => ExrWriter.write_hdr(image, output),
            Self::Tiff(writer) => writer.write_hdr(image, output),
        }
    }
}

impl LdrWriter for ContainerWriter {
    fn ldr_suffix(&self) -> &'static str {
        match self {
            Self::ExrPng => PngWriter.ldr_suffix(),
            Self::Tiff(writer) => writer.ldr_suffix(),
        }
    }

    fn write_ldr(&self, image: &LdrImage, output: &mut dyn Write) -> Result<()> {
        match self {
            Self::ExrPng => PngWriter.write_ldr(image, output),
            Self::Tiff(writer) => writer.write_ldr(image, output),
        }
    }
}
