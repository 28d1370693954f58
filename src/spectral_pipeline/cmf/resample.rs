//! Cubic spline resampling of matching functions.
//!
//! Each weight channel gets its own interpolating cubic spline with
//! not-a-knot end conditions, the same curve an interpolating (zero
//! smoothing) cubic B-spline fit produces. Outside the tabulated range the
//! first and last cubic pieces are extended, so extrapolated values follow
//! the end polynomials and can overshoot quickly; a warning is logged when
//! that happens.

use tracing::{debug, warn};

use crate::spectral_pipeline::cmf::types::{CmfRow, CmfTable};
use crate::spectral_pipeline::common::error::{Result, SpectralError};

/// Smallest number of knots a not-a-knot cubic spline is defined for.
pub const MIN_SPLINE_POINTS: usize = 4;

/// Interpolating cubic spline stored as knot values plus second derivatives.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl CubicSpline {
    /// Fits a not-a-knot spline through `(xs[i], ys[i])`.
    ///
    /// `xs` must be strictly increasing and hold at least
    /// [`MIN_SPLINE_POINTS`] values.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self> {
        let n = xs.len();
        if n != ys.len() {
            return Err(SpectralError::Config(format!(
                "spline abscissae ({}) and ordinates ({}) differ in length",
                n,
                ys.len()
            )));
        }
        if n < MIN_SPLINE_POINTS {
            return Err(SpectralError::TooFewSamples {
                what: "cubic spline fit",
                required: MIN_SPLINE_POINTS,
                actual: n,
            });
        }

        let h: Vec<f64> = xs.windows(2).map(|p| p[1] - p[0]).collect();
        if let Some(i) = h.iter().position(|&step| step <= 0.0) {
            return if h[i] == 0.0 {
                Err(SpectralError::DuplicateWavelength(xs[i]))
            } else {
                Err(SpectralError::NonMonotonicCmf {
                    line: i as u64 + 2,
                    previous: xs[i],
                    current: xs[i + 1],
                })
            };
        }

        // Tridiagonal system for the interior second derivatives m[1..n-1].
        let k = n - 2;
        let mut lower = vec![0.0; k];
        let mut diag = vec![0.0; k];
        let mut upper = vec![0.0; k];
        let mut rhs = vec![0.0; k];
        for r in 0..k {
            let i = r + 1;
            lower[r] = h[i - 1];
            diag[r] = 2.0 * (h[i - 1] + h[i]);
            upper[r] = h[i];
            rhs[r] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
        }

        // Not-a-knot: the third derivative is continuous across x[1] and
        // x[n-2]. Substitute the resulting expressions for m[0] and m[n-1].
        let (h0, h1) = (h[0], h[1]);
        diag[0] += h0 * (h0 + h1) / h1;
        upper[0] -= h0 * h0 / h1;

        let (ha, hb) = (h[n - 3], h[n - 2]);
        diag[k - 1] += hb * (ha + hb) / ha;
        lower[k - 1] -= hb * hb / ha;

        let interior = solve_tridiagonal(&lower, &diag, &upper, &rhs);

        let mut m = vec![0.0; n];
        m[1..n - 1].copy_from_slice(&interior);
        m[0] = ((h0 + h1) * m[1] - h0 * m[2]) / h1;
        m[n - 1] = ((ha + hb) * m[n - 2] - hb * m[n - 3]) / ha;

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            second_derivatives: m,
        })
    }

    /// Domain covered by the knots.
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let i = self
            .xs
            .partition_point(|&knot| knot <= x)
            .saturating_sub(1)
            .min(n - 2);

        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let (m0, m1) = (self.second_derivatives[i], self.second_derivatives[i + 1]);
        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;

        m0 * a * a * a / (6.0 * h)
            + m1 * b * b * b / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }
}

/// Thomas algorithm. All slices have the same length; `lower[0]` and
/// `upper[last]` are ignored.
fn solve_tridiagonal(lower: &[f64], diag: &[f64], upper: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    c_prime[0] = upper[0] / diag[0];
    d_prime[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denom = diag[i] - lower[i] * c_prime[i - 1];
        c_prime[i] = upper[i] / denom;
        d_prime[i] = (rhs[i] - lower[i] * d_prime[i - 1]) / denom;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }
    x
}

/// Resamples every weight channel of `cmf` at `wavelengths`.
///
/// Both the table and the target grid need at least four points; the
/// returned table has exactly one row per target wavelength.
pub fn resample_cmf(cmf: &CmfTable, wavelengths: &[f64]) -> Result<CmfTable> {
    if wavelengths.len() < MIN_SPLINE_POINTS {
        return Err(SpectralError::TooFewSamples {
            what: "CMF resampling target grid",
            required: MIN_SPLINE_POINTS,
            actual: wavelengths.len(),
        });
    }

    let xs = cmf.wavelengths();
    let splines = [
        CubicSpline::fit(&xs, &cmf.channel(0))?,
        CubicSpline::fit(&xs, &cmf.channel(1))?,
        CubicSpline::fit(&xs, &cmf.channel(2))?,
    ];

    let (lo, hi) = splines[0].domain();
    let outside = wavelengths.iter().filter(|&&w| w < lo || w > hi).count();
    if outside > 0 {
        warn!(
            outside,
            domain_start = lo,
            domain_end = hi,
            "Resampling CMF outside its tabulated range, values are extrapolated"
        );
    }

    let rows = wavelengths
        .iter()
        .map(|&wavelength| CmfRow {
            wavelength,
            weights: [
                splines[0].evaluate(wavelength),
                splines[1].evaluate(wavelength),
                splines[2].evaluate(wavelength),
            ],
        })
        .collect();

    debug!(
        from = cmf.len(),
        to = wavelengths.len(),
        "Resampled color matching functions"
    );
    CmfTable::new(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn bump(x: f64) -> f64 {
        (-((x - 550.0) / 40.0).powi(2)).exp()
    }

    fn table_from(xs: &[f64], f: impl Fn(f64) -> [f64; 3]) -> CmfTable {
        CmfTable::new(
            xs.iter()
                .map(|&x| CmfRow { wavelength: x, weights: f(x) })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_spline_reproduces_cubic() {
        let xs = [0.0, 1.0, 2.5, 3.0, 4.5, 6.0];
        let f = |x: f64| 0.5 * x * x * x - 2.0 * x * x + x - 3.0;
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let spline = CubicSpline::fit(&xs, &ys).unwrap();

        for i in 0..=60 {
            let x = i as f64 * 0.1;
            assert_abs_diff_eq!(spline.evaluate(x), f(x), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_spline_with_four_points_is_single_cubic() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let f = |x: f64| x * x * x - x;
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let spline = CubicSpline::fit(&xs, &ys).unwrap();

        assert_abs_diff_eq!(spline.evaluate(1.5), f(1.5), epsilon = 1e-9);
        // Extension past the last knot follows the same cubic.
        assert_abs_diff_eq!(spline.evaluate(4.0), f(4.0), epsilon = 1e-9);
    }

    #[test]
    fn test_spline_too_few_points() {
        let err = CubicSpline::fit(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap_err();
        assert!(matches!(
            err,
            SpectralError::TooFewSamples { required: 4, actual: 3, .. }
        ));
    }

    #[test]
    fn test_spline_rejects_duplicate_knots() {
        let err = CubicSpline::fit(&[0.0, 1.0, 1.0, 2.0], &[0.0; 4]).unwrap_err();
        assert!(matches!(err, SpectralError::DuplicateWavelength(w) if w == 1.0));
    }

    #[test]
    fn test_resample_at_own_wavelengths() {
        let xs: Vec<f64> = (0..20).map(|i| 400.0 + 15.0 * i as f64).collect();
        let cmf = table_from(&xs, |x| [bump(x), 2.0 * bump(x - 30.0), 0.5 + bump(x + 20.0)]);
        let resampled = resample_cmf(&cmf, &xs).unwrap();

        for (orig, new) in cmf.rows().iter().zip(resampled.rows()) {
            assert_eq!(orig.wavelength, new.wavelength);
            for c in 0..3 {
                let tolerance = 1e-3 * orig.weights[c].abs().max(1e-9);
                assert!(
                    (orig.weights[c] - new.weights[c]).abs() <= tolerance,
                    "channel {} at {} nm: {} vs {}",
                    c,
                    orig.wavelength,
                    orig.weights[c],
                    new.weights[c]
                );
            }
        }
    }

    #[test]
    fn test_resample_onto_finer_grid() {
        let coarse: Vec<f64> = (0..41).map(|i| 380.0 + 10.0 * i as f64).collect();
        let cmf = table_from(&coarse, |x| [bump(x), bump(x), bump(x)]);
        let fine: Vec<f64> = (0..391).map(|i| 390.0 + i as f64).collect();
        let resampled = resample_cmf(&cmf, &fine).unwrap();

        assert_eq!(resampled.len(), fine.len());
        for row in resampled.rows() {
            assert_abs_diff_eq!(row.weights[1], bump(row.wavelength), epsilon = 2e-3);
        }
    }

    #[test]
    fn test_resample_needs_four_targets() {
        let xs: Vec<f64> = (0..10).map(|i| 400.0 + 10.0 * i as f64).collect();
        let cmf = table_from(&xs, |_| [1.0, 1.0, 1.0]);
        let err = resample_cmf(&cmf, &[400.0, 450.0, 490.0]).unwrap_err();
        assert!(matches!(err, SpectralError::TooFewSamples { actual: 3, .. }));
    }

    #[test]
    fn test_resample_needs_four_table_rows() {
        let cmf = table_from(&[400.0, 500.0, 600.0], |_| [1.0, 1.0, 1.0]);
        let err = resample_cmf(&cmf, &[400.0, 450.0, 500.0, 550.0]).unwrap_err();
        assert!(matches!(err, SpectralError::TooFewSamples { actual: 3, .. }));
    }
}
