use std::io::{Cursor, Write};

use exr::prelude::*;
use tracing::debug;

use crate::spectral_pipeline::common::error::{Result, SpectralError};
use crate::spectral_pipeline::common::types::TristimulusImage;
use crate::spectral_pipeline::output::writer::HdrWriter;

/// Writes the raw tristimulus image as 32-bit float RGB OpenEXR (ZIP).
#[derive(Debug, Default, Clone, Copy)]
pub struct ExrWriter;

impl HdrWriter for ExrWriter {
    fn hdr_suffix(&self) -> &'static str {
        ".exr"
    }

    fn write_hdr(&self, image: &TristimulusImage, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding EXR image: {}x{}", image.width, image.height);

        if !image.is_well_formed() {
            return Err(SpectralError::InvalidDimensions(image.width, image.height));
        }

        let width = image.width;
        let layer = Layer::new(
            (image.width, image.height),
            LayerAttributes::named("rgb"),
            Encoding::SMALL_LOSSLESS,
            SpecificChannels::rgb(|pos: Vec2<usize>| {
                let base = (pos.y() * width + pos.x()) * 3;
                (image.data[base], image.data[base + 1], image.data[base + 2])
            }),
        );

        let mut buffer = Vec::new();
        Image::from_layer(layer)
            .write()
            .to_buffered(Cursor::new(&mut buffer))
            .map_err(|e| SpectralError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("EXR encoding complete");
        Ok(())
    }
}
