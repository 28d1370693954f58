//! Spectral integration against matching functions.
//!
//! Quadrature is composite Simpson over possibly non-uniform samples. With
//! an odd sample count it is the plain composite rule over consecutive
//! interval pairs. With an even count the first `n - 1` samples use the
//! composite rule and the last interval is integrated with the quadratic
//! through the final three samples (Cartwright's correction), which keeps
//! the rule exact for quadratics. Two samples degrade to the trapezoid rule.
//!
//! The rule is linear in the samples, so it is evaluated as a weighted sum
//! with weights computed once per wavelength grid.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::spectral_pipeline::cmf::CmfTable;
use crate::spectral_pipeline::common::error::{Result, SpectralError};
use crate::spectral_pipeline::common::types::TristimulusImage;
use crate::spectral_pipeline::stack::SpectralStack;

/// Fewest samples the quadrature accepts.
pub const MIN_INTEGRATION_POINTS: usize = 2;

/// Relative tolerance when matching CMF and stack wavelengths.
const WAVELENGTH_TOLERANCE: f64 = 1e-6;

/// Quadrature weights `w` such that `∫ y dx ≈ Σ w[k] * y[k]`.
pub fn simpson_weights(x: &[f64]) -> Result<Vec<f64>> {
    let n = x.len();
    if n < MIN_INTEGRATION_POINTS {
        return Err(SpectralError::TooFewSamples {
            what: "Simpson integration",
            required: MIN_INTEGRATION_POINTS,
            actual: n,
        });
    }
    if let Some(i) = x.windows(2).position(|p| p[1] <= p[0]) {
        return Err(SpectralError::WavelengthMismatch(format!(
            "integration abscissae must be strictly increasing ({} then {})",
            x[i],
            x[i + 1]
        )));
    }

    let mut w = vec![0.0; n];
    if n == 2 {
        let h = x[1] - x[0];
        w[0] = 0.5 * h;
        w[1] = 0.5 * h;
        return Ok(w);
    }

    // Composite rule over the largest odd-length prefix.
    let last = if n % 2 == 1 { n - 1 } else { n - 2 };
    for i in (0..last).step_by(2) {
        let h0 = x[i + 1] - x[i];
        let h1 = x[i + 2] - x[i + 1];
        let hsum = h0 + h1;
        let hprod = h0 * h1;
        let ratio = h0 / h1;
        w[i] += hsum / 6.0 * (2.0 - 1.0 / ratio);
        w[i + 1] += hsum / 6.0 * (hsum * hsum / hprod);
        w[i + 2] += hsum / 6.0 * (2.0 - ratio);
    }

    if n % 2 == 0 {
        let h0 = x[n - 2] - x[n - 3];
        let h1 = x[n - 1] - x[n - 2];
        let alpha = (2.0 * h1 * h1 + 3.0 * h0 * h1) / (6.0 * (h0 + h1));
        let beta = (h1 * h1 + 3.0 * h0 * h1) / (6.0 * h0);
        let eta = h1 * h1 * h1 / (6.0 * h0 * (h0 + h1));
        w[n - 1] += alpha;
        w[n - 2] += beta;
        w[n - 3] -= eta;
    }

    Ok(w)
}

/// Integrates samples `y` taken at `x`.
pub fn simpson(y: &[f64], x: &[f64]) -> Result<f64> {
    if y.len() != x.len() {
        return Err(SpectralError::WavelengthMismatch(format!(
            "{} samples for {} abscissae",
            y.len(),
            x.len()
        )));
    }
    let w = simpson_weights(x)?;
    Ok(w.iter().zip(y).map(|(w, y)| w * y).sum())
}

fn check_wavelengths(cmf: &CmfTable, stack: &SpectralStack) -> Result<()> {
    let stack_wl = stack.wavelengths();
    if cmf.len() != stack_wl.len() {
        return Err(SpectralError::WavelengthMismatch(format!(
            "CMF has {} rows, stack has {} wavelengths",
            cmf.len(),
            stack_wl.len()
        )));
    }
    for (row, &w) in cmf.rows().iter().zip(stack_wl) {
        if (row.wavelength - w).abs() > WAVELENGTH_TOLERANCE * w.abs().max(1.0) {
            return Err(SpectralError::WavelengthMismatch(format!(
                "CMF row at {} nm paired with slice at {} nm",
                row.wavelength, w
            )));
        }
    }
    Ok(())
}

/// Integrates radiance times each CMF channel over wavelength, per pixel.
///
/// The CMF rows must line up one-to-one with the stack wavelengths.
#[instrument(skip_all, fields(width = stack.width(), height = stack.height(), depth = stack.depth()))]
pub fn integrate_stack(cmf: &CmfTable, stack: &SpectralStack) -> Result<TristimulusImage> {
    check_wavelengths(cmf, stack)?;
    let quadrature = simpson_weights(stack.wavelengths())?;

    let channel_weights: [Vec<f64>; 3] = std::array::from_fn(|c| {
        quadrature
            .iter()
            .zip(cmf.rows())
            .map(|(q, row)| q * row.weights[c])
            .collect()
    });

    let width = stack.width();
    let mut image = TristimulusImage::zeros(width, stack.height());
    if width == 0 {
        return Ok(image);
    }

    image
        .data
        .par_chunks_mut(width * 3)
        .enumerate()
        .for_each(|(row, out_row)| {
            for (col, out) in out_row.chunks_exact_mut(3).enumerate() {
                let spectrum = stack.spectrum(row, col);
                for (c, weights) in channel_weights.iter().enumerate() {
                    let sum: f64 = weights
                        .iter()
                        .zip(spectrum)
                        .map(|(w, &v)| w * v as f64)
                        .sum();
                    out[c] = sum as f32;
                }
            }
        });

    debug!("Integrated {} pixels", width * stack.height());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral_pipeline::cmf::CmfRow;
    use approx::assert_relative_eq;

    fn constant_cmf(wavelengths: &[f64], weights: [f64; 3]) -> CmfTable {
        CmfTable::new(
            wavelengths
                .iter()
                .map(|&wavelength| CmfRow { wavelength, weights })
                .collect(),
        )
        .unwrap()
    }

    /// 2x2 stack whose every pixel holds its own wavelength as radiance.
    fn wavelength_stack(wavelengths: &[f64]) -> SpectralStack {
        let data: Vec<f32> = (0..4)
            .flat_map(|_| wavelengths.iter().map(|&w| w as f32))
            .collect();
        SpectralStack::new(2, 2, wavelengths.to_vec(), data).unwrap()
    }

    #[test]
    fn test_simpson_linear_three_points() {
        let x = [400.0, 500.0, 600.0];
        assert_relative_eq!(simpson(&x, &x).unwrap(), 100_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_simpson_exact_for_quadratic_nonuniform_odd() {
        let x = [0.0, 0.5, 2.0, 2.2, 3.0];
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        assert_relative_eq!(simpson(&y, &x).unwrap(), 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_simpson_exact_for_quadratic_nonuniform_even() {
        let x = [1.0, 1.5, 2.5, 3.0, 4.25, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v * v - v + 2.0).collect();
        let exact = |t: f64| t * t * t - 0.5 * t * t + 2.0 * t;
        assert_relative_eq!(simpson(&y, &x).unwrap(), exact(5.0) - exact(1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_simpson_exact_for_cubic_uniform() {
        let x: Vec<f64> = (0..9).map(|i| i as f64 * 0.25).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v * v).collect();
        assert_relative_eq!(simpson(&y, &x).unwrap(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_simpson_two_points_is_trapezoid() {
        assert_relative_eq!(simpson(&[1.0, 3.0], &[0.0, 2.0]).unwrap(), 4.0);
    }

    #[test]
    fn test_simpson_needs_two_points() {
        let err = simpson(&[1.0], &[0.0]).unwrap_err();
        assert!(matches!(err, SpectralError::TooFewSamples { required: 2, actual: 1, .. }));
    }

    #[test]
    fn test_end_to_end_constant_cmf() {
        let wavelengths = [400.0, 500.0, 600.0];
        let stack = wavelength_stack(&wavelengths);
        let cmf = constant_cmf(&wavelengths, [1.0, 1.0, 1.0]);

        let image = integrate_stack(&cmf, &stack).unwrap();
        assert_eq!((image.width, image.height), (2, 2));
        for row in 0..2 {
            for col in 0..2 {
                for value in image.pixel(row, col) {
                    assert_relative_eq!(value, 100_000.0, max_relative = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_channels_use_their_own_weights() {
        let wavelengths = [400.0, 450.0, 500.0, 550.0, 600.0];
        let stack = wavelength_stack(&wavelengths);
        let cmf = constant_cmf(&wavelengths, [1.0, 0.5, -2.0]);

        let image = integrate_stack(&cmf, &stack).unwrap();
        let [c0, c1, c2] = image.pixel(1, 0);
        assert_relative_eq!(c0, 100_000.0, max_relative = 1e-6);
        assert_relative_eq!(c1, 50_000.0, max_relative = 1e-6);
        assert_relative_eq!(c2, -200_000.0, max_relative = 1e-6);
    }

    #[test]
    fn test_integration_is_linear() {
        let wavelengths = [390.0, 400.0, 410.0, 420.0, 430.0, 440.0];
        let data: Vec<f32> = (0..3 * 2 * 6).map(|i| ((i * 37) % 11) as f32 * 0.3).collect();
        let stack = SpectralStack::new(3, 2, wavelengths.to_vec(), data).unwrap();
        let cmf = CmfTable::new(
            wavelengths
                .iter()
                .enumerate()
                .map(|(i, &wavelength)| CmfRow {
                    wavelength,
                    weights: [i as f64 * 0.1, 1.0 - i as f64 * 0.1, 0.25],
                })
                .collect(),
        )
        .unwrap();

        let base = integrate_stack(&cmf, &stack).unwrap();
        let scaled = integrate_stack(&cmf, &stack.scaled(4.0)).unwrap();
        for (a, b) in base.data.iter().zip(&scaled.data) {
            assert_relative_eq!(*b, 4.0 * a, epsilon = 1e-4, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_zero_stack_integrates_to_zero() {
        let wavelengths = [400.0, 410.0, 420.0, 430.0];
        let stack = SpectralStack::new(2, 3, wavelengths.to_vec(), vec![0.0; 24]).unwrap();
        let cmf = constant_cmf(&wavelengths, [0.3, 1.2, 0.7]);

        let image = integrate_stack(&cmf, &stack).unwrap();
        assert!(image.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_wavelength_mismatch() {
        let stack = wavelength_stack(&[400.0, 500.0, 600.0]);
        let cmf = constant_cmf(&[400.0, 500.0, 610.0], [1.0, 1.0, 1.0]);
        let err = integrate_stack(&cmf, &stack).unwrap_err();
        assert!(matches!(err, SpectralError::WavelengthMismatch(_)));

        let short = constant_cmf(&[400.0, 500.0], [1.0, 1.0, 1.0]);
        assert!(integrate_stack(&short, &stack).is_err());
    }
}
