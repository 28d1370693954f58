//! HDR to LDR compression: exponential tonemap, sRGB encoding, 8-bit output.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::spectral_pipeline::colorimetry::gamma_encode;
use crate::spectral_pipeline::common::error::{Result, SpectralError};
use crate::spectral_pipeline::common::types::{LdrImage, TristimulusImage};

/// How encoded values in [0, 1] become 8-bit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantization {
    /// `floor(v * 255)`, as an integer cast does. Saturated white lands on
    /// 254 because the encoded value of 1.0 is one ulp short of 1.0.
    #[default]
    Truncate,
    /// `round(v * 255)`, half away from zero
    Round,
}

impl Quantization {
    #[inline]
    fn apply(self, encoded: f64) -> u8 {
        let scaled = encoded * 255.0;
        match self {
            Quantization::Truncate => scaled as u8,
            Quantization::Round => scaled.round() as u8,
        }
    }
}

/// Tonemaps and gamma-encodes one linear value, returning it in [0, 1].
///
/// NaN inputs stay NaN; quantization maps them to 0.
#[inline]
pub fn tonemap_value(linear: f64, exposure: f64) -> f64 {
    let mapped = (1.0 - (-exposure * linear).exp()).clamp(0.0, 1.0);
    gamma_encode(mapped).clamp(0.0, 1.0)
}

/// Converts an HDR image to 8-bit sRGB with exposure `exposure`.
#[instrument(skip(image), fields(width = image.width, height = image.height))]
pub fn to_ldr(image: &TristimulusImage, exposure: f64, quantization: Quantization) -> Result<LdrImage> {
    if !(exposure.is_finite() && exposure > 0.0) {
        return Err(SpectralError::Config(format!(
            "exposure must be a positive finite number, got {}",
            exposure
        )));
    }

    let mut data = vec![0u8; image.data.len()];
    let row_len = (image.width * 3).max(1);
    data.par_chunks_mut(row_len)
        .zip(image.data.par_chunks(row_len))
        .for_each(|(dst, src)| {
            for (out, &value) in dst.iter_mut().zip(src) {
                *out = quantization.apply(tonemap_value(value as f64, exposure));
            }
        });

    debug!(exposure, ?quantization, "Tonemapped image");
    Ok(LdrImage {
        width: image.width,
        height: image.height,
        data,
    })
}
