use std::io::{Cursor, Write};
use tracing::debug;
use crate::spectral_pipeline::common::error::{Result, SpectralError};
use crate::spectral_pipeline::common::types::{LdrImage, TristimulusImage};
use crate::spectral_pipeline::output::types::TiffCompression;
use crate::spectral_pipeline::output::writer::{HdrWriter, LdrWriter};

/// TIFF output for both images: RGB 32-bit float and RGB 8-bit.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardTiffWriter {
    pub compression: TiffCompression,
    /// Predictor value for compression (typically 2 for horizontal differencing).
    /// Only applied to the 8-bit image.
    pub predictor: Option<u16>,
}

fn encode_err(e: tiff::TiffError) -> SpectralError {
    SpectralError::EncodeError(e.to_string())
}

impl StandardTiffWriter {
    pub fn new(compression: TiffCompression) -> Self {
        Self {
            compression,
            predictor: None,
        }
    }

    fn encoder<'a>(
        &self,
        buffer: &'a mut Vec<u8>,
        use_predictor: bool,
    ) -> Result<tiff::encoder::TiffEncoder<Cursor<&'a mut Vec<u8>>>> {
        let compression = match self.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Balanced),
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Best),
        };

        let mut encoder = tiff::encoder::TiffEncoder::new(Cursor::new(buffer))
            .map_err(encode_err)?
            .with_compression(compression);

        if use_predictor {
            if let Some(predictor_val) = self.predictor {
                let predictor = match predictor_val {
                    2 => tiff::tags::Predictor::Horizontal,
                    _ => tiff::tags::Predictor::None,
                };
                encoder = encoder.with_predictor(predictor);
            }
        }
        Ok(encoder)
    }
}

impl HdrWriter for StandardTiffWriter {
    fn hdr_suffix(&self) -> &'static str {
        ".tiff"
    }

    fn write_hdr(&self, image: &TristimulusImage, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding float TIFF image: {}x{}", image.width, image.height);

        if !image.is_well_formed() {
            return Err(SpectralError::InvalidDimensions(image.width, image.height));
        }

        let mut buffer = Vec::new();
        self.encoder(&mut buffer, false)?
            .write_image::<tiff::encoder::colortype::RGB32Float>(
                image.width as u32,
                image.height as u32,
                &image.data,
            )
            .map_err(encode_err)?;

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}

impl LdrWriter for StandardTiffWriter {
    fn ldr_suffix(&self) -> &'static str {
        "_ldr.tiff"
    }

    fn write_ldr(&self, image: &LdrImage, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding 8-bit TIFF image: {}x{}", image.width, image.height);

        if !image.is_well_formed() {
            return Err(SpectralError::InvalidDimensions(image.width, image.height));
        }

        let mut buffer = Vec::new();
        self.encoder(&mut buffer, true)?
            .write_image::<tiff::encoder::colortype::RGB8>(
                image.width as u32,
                image.height as u32,
                &image.data,
            )
            .map_err(encode_err)?;

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}
