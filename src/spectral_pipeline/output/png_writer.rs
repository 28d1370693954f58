use std::io::Write;

use tracing::debug;

use crate::spectral_pipeline::common::error::{Result, SpectralError};
use crate::spectral_pipeline::common::types::LdrImage;
use crate::spectral_pipeline::output::writer::LdrWriter;

/// Writes the 8-bit sRGB image as PNG, tagged with the sRGB chunk.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngWriter;

fn encode_err(e: png::EncodingError) -> SpectralError {
    SpectralError::EncodeError(e.to_string())
}

impl LdrWriter for PngWriter {
    fn ldr_suffix(&self) -> &'static str {
        ".png"
    }

    fn write_ldr(&self, image: &LdrImage, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding PNG image: {}x{}", image.width, image.height);

        if !image.is_well_formed() {
            return Err(SpectralError::InvalidDimensions(image.width, image.height));
        }

        let mut encoder = png::Encoder::new(output, image.width as u32, image.height as u32);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);

        let mut writer = encoder.write_header().map_err(encode_err)?;
        writer.write_image_data(&image.data).map_err(encode_err)?;
        writer.finish().map_err(encode_err)?;

        debug!("PNG encoding complete");
        Ok(())
    }
}
