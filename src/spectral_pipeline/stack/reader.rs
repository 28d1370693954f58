use crate::spectral_pipeline::common::error::{Result, SpectralError};
use crate::spectral_pipeline::stack::exr_reader::ExrSliceReader;
use crate::spectral_pipeline::stack::tiff_reader::TiffSliceReader;
use crate::spectral_pipeline::stack::types::MonoImage;

pub trait SliceReader {
    fn read_slice(&self, data: &[u8]) -> Result<MonoImage>;
}

const EXR_MAGIC: [u8; 4] = [0x76, 0x2f, 0x31, 0x01];
const TIFF_MAGIC_LE: [u8; 2] = *b"II";
const TIFF_MAGIC_BE: [u8; 2] = *b"MM";

/// Dispatches on the container signature to the EXR or TIFF reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnySliceReader;

impl SliceReader for AnySliceReader {
    fn read_slice(&self, data: &[u8]) -> Result<MonoImage> {
        if data.starts_with(&EXR_MAGIC) {
            ExrSliceReader.read_slice(data)
        } else if data.starts_with(&TIFF_MAGIC_LE) || data.starts_with(&TIFF_MAGIC_BE) {
            TiffSliceReader.read_slice(data)
        } else {
            Err(SpectralError::UnsupportedFormat(
                "slice is neither OpenEXR nor TIFF".to_string(),
            ))
        }
    }
}
