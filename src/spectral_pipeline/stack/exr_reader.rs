//! OpenEXR slice reader.
//!
//! Renderers write one radiance value per pixel. The reader takes the first
//! valid layer at its largest resolution and picks a single channel from it:
//! the only channel when there is one, otherwise the first of `Y`, `L`, `A`,
//! `R` that exists, otherwise the first channel in name order.

use std::io::Cursor;

use exr::prelude::*;
use tracing::debug;

use crate::spectral_pipeline::common::error::{Result, SpectralError};
use crate::spectral_pipeline::stack::reader::SliceReader;
use crate::spectral_pipeline::stack::types::MonoImage;

const PREFERRED_CHANNELS: [&str; 4] = ["Y", "L", "A", "R"];

#[derive(Debug, Default, Clone, Copy)]
pub struct ExrSliceReader;

impl SliceReader for ExrSliceReader {
    fn read_slice(&self, data: &[u8]) -> Result<MonoImage> {
        debug!("Decoding EXR slice, {} bytes", data.len());

        let image = read()
            .no_deep_data()
            .largest_resolution_level()
            .all_channels()
            .first_valid_layer()
            .all_attributes()
            .from_buffered(Cursor::new(data))
            .map_err(|e| SpectralError::DecodeError(e.to_string()))?;

        let layer = &image.layer_data;
        let width = layer.size.width();
        let height = layer.size.height();
        let channels = &layer.channel_data.list;

        let names: Vec<String> = channels.iter().map(|c| c.name.to_string()).collect();
        let index = if channels.len() == 1 {
            0
        } else {
            PREFERRED_CHANNELS
                .iter()
                .find_map(|wanted| names.iter().position(|n| n == wanted))
                .unwrap_or(0)
        };
        let channel = channels
            .get(index)
            .ok_or_else(|| SpectralError::DecodeError("EXR layer has no channels".to_string()))?;

        let values: Vec<f32> = channel.sample_data.values_as_f32().collect();
        if values.len() != width * height {
            return Err(SpectralError::UnsupportedFormat(format!(
                "EXR channel {} is subsampled ({} samples for {}x{} pixels)",
                names[index],
                values.len(),
                width,
                height
            )));
        }

        debug!(
            "Decoded EXR slice: {}x{}, channel {} of {:?}",
            width, height, names[index], names
        );

        Ok(MonoImage {
            width,
            height,
            data: values,
        })
    }
}
