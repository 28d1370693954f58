use std::io::Cursor;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::spectral_pipeline::common::error::{Result, SpectralError};
use crate::spectral_pipeline::stack::reader::SliceReader;
use crate::spectral_pipeline::stack::types::MonoImage;

/// Reads single-channel TIFF slices.
///
/// Integer samples are normalised to [0, 1]; float samples are kept as is.
/// For multi-sample images only the first sample of each pixel is used.
#[derive(Debug, Default, Clone, Copy)]
pub struct TiffSliceReader;

fn decode_err(e: tiff::TiffError) -> SpectralError {
    SpectralError::DecodeError(e.to_string())
}

impl SliceReader for TiffSliceReader {
    fn read_slice(&self, data: &[u8]) -> Result<MonoImage> {
        debug!("Decoding TIFF slice, {} bytes", data.len());

        let mut decoder = Decoder::new(Cursor::new(data)).map_err(decode_err)?;
        let (width, height) = decoder.dimensions().map_err(decode_err)?;
        let color_type = decoder.colortype().map_err(decode_err)?;

        let samples_per_pixel = match color_type {
            ColorType::Gray(_) => 1,
            ColorType::GrayA(_) => 2,
            ColorType::RGB(_) => 3,
            ColorType::RGBA(_) => 4,
            other => {
                return Err(SpectralError::UnsupportedFormat(format!(
                    "TIFF color type {:?}",
                    other
                )));
            }
        };

        let values: Vec<f32> = match decoder.read_image().map_err(decode_err)? {
            DecodingResult::U8(buf) => buf.iter().map(|&v| v as f32 / u8::MAX as f32).collect(),
            DecodingResult::U16(buf) => buf.iter().map(|&v| v as f32 / u16::MAX as f32).collect(),
            DecodingResult::F32(buf) => buf,
            DecodingResult::F64(buf) => buf.iter().map(|&v| v as f32).collect(),
            _ => {
                return Err(SpectralError::UnsupportedFormat(format!(
                    "TIFF sample format for {:?}",
                    color_type
                )));
            }
        };

        let width = width as usize;
        let height = height as usize;
        let data = if samples_per_pixel == 1 {
            values
        } else {
            values.iter().step_by(samples_per_pixel).copied().collect()
        };

        if data.len() != width * height {
            return Err(SpectralError::DecodeError(format!(
                "TIFF holds {} samples for {}x{} pixels",
                data.len(),
                width,
                height
            )));
        }

        debug!("Decoded TIFF slice: {}x{} ({:?})", width, height, color_type);

        Ok(MonoImage {
            width,
            height,
            data,
        })
    }
}
