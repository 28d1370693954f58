//! Fixed CIE XYZ / linear sRGB transforms and the sRGB transfer function.

use crate::spectral_pipeline::cmf::{CmfRow, CmfTable};

/// Linear sRGB (D65) to CIE XYZ, applied as `M * v`.
pub const LINEAR_SRGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

/// CIE XYZ to linear sRGB (D65), the inverse of [`LINEAR_SRGB_TO_XYZ`].
pub const XYZ_TO_LINEAR_SRGB: [[f64; 3]; 3] = [
    [ 3.2404542, -1.5371385, -0.4985314],
    [-0.9692660,  1.8760108,  0.0415560],
    [ 0.0556434, -0.2040259,  1.0572252],
];

/// Breakpoint between the linear toe and the power segment of the sRGB curve.
const SRGB_LINEAR_THRESHOLD: f64 = 0.0031308;

#[inline]
fn mul3(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

pub fn linear_srgb_to_xyz(rgb: [f64; 3]) -> [f64; 3] {
    mul3(&LINEAR_SRGB_TO_XYZ, rgb)
}

pub fn xyz_to_linear_srgb(xyz: [f64; 3]) -> [f64; 3] {
    mul3(&XYZ_TO_LINEAR_SRGB, xyz)
}

/// Re-expresses an XYZ matching-function table in the linear sRGB basis.
///
/// Wavelengths are carried over untouched; only the weight triples change.
pub fn cmf_xyz_to_linear_srgb(cmf: &CmfTable) -> CmfTable {
    let rows = cmf
        .rows()
        .iter()
        .map(|row| CmfRow {
            wavelength: row.wavelength,
            weights: xyz_to_linear_srgb(row.weights),
        })
        .collect();
    CmfTable::from_sorted_rows(rows)
}

/// sRGB opto-electronic transfer function for a single linear value.
#[inline]
pub fn gamma_encode(linear: f64) -> f64 {
    if linear <= SRGB_LINEAR_THRESHOLD {
        12.92 * linear
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_matrix_round_trip() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..1000 {
            let rgb = [
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
            ];
            let back = xyz_to_linear_srgb(linear_srgb_to_xyz(rgb));
            for c in 0..3 {
                assert_abs_diff_eq!(back[c], rgb[c], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_matrices_are_inverse() {
        for r in 0..3 {
            for c in 0..3 {
                let sum: f64 = (0..3)
                    .map(|k| XYZ_TO_LINEAR_SRGB[r][k] * LINEAR_SRGB_TO_XYZ[k][c])
                    .sum();
                let expected = if r == c { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(sum, expected, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_white_maps_to_d65() {
        let xyz = linear_srgb_to_xyz([1.0, 1.0, 1.0]);
        assert_abs_diff_eq!(xyz[0], 0.95047, epsilon = 1e-4);
        assert_abs_diff_eq!(xyz[1], 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(xyz[2], 1.08883, epsilon = 1e-4);
    }

    #[test]
    fn test_gamma_boundaries() {
        assert_eq!(gamma_encode(0.0), 0.0);
        assert_abs_diff_eq!(gamma_encode(1.0), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_gamma_continuous_at_breakpoint() {
        let left = 12.92 * SRGB_LINEAR_THRESHOLD;
        let right = 1.055 * SRGB_LINEAR_THRESHOLD.powf(1.0 / 2.4) - 0.055;
        assert_abs_diff_eq!(left, right, epsilon = 1e-4);
        assert_abs_diff_eq!(
            gamma_encode(SRGB_LINEAR_THRESHOLD),
            gamma_encode(SRGB_LINEAR_THRESHOLD + 1e-12),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_gamma_monotonic() {
        let mut previous = gamma_encode(0.0);
        for i in 1..=10_000 {
            let v = gamma_encode(i as f64 / 10_000.0);
            assert!(v >= previous, "gamma_encode decreased at {}", i);
            previous = v;
        }
    }

    #[test]
    fn test_cmf_basis_keeps_wavelengths() {
        let xyz = CmfTable::new(vec![
            CmfRow { wavelength: 500.0, weights: [0.0049, 0.3230, 0.2720] },
            CmfRow { wavelength: 550.0, weights: [0.4334, 0.9950, 0.0087] },
        ])
        .unwrap();
        let rgb = cmf_xyz_to_linear_srgb(&xyz);

        assert_eq!(rgb.wavelengths(), xyz.wavelengths());
        for (src, dst) in xyz.rows().iter().zip(rgb.rows()) {
            let expected = xyz_to_linear_srgb(src.weights);
            for c in 0..3 {
                assert_abs_diff_eq!(dst.weights[c], expected[c], epsilon = 1e-12);
            }
        }
    }
}
