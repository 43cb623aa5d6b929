//! # Real spherical-harmonic basis
//!
//! Real harmonics without the Condon–Shortley phase, with the polar axis along
//! the line of sight `ẑ` and normalised so that `Y₀₀ = 1`. With this choice the
//! integral of any map over the sphere is `4π·y₀₀`, and the degree-one
//! harmonics read `Y₁,₋₁ = √3 y`, `Y₁₀ = √3 z`, `Y₁₁ = √3 x`.
//!
//! ## Recurrence
//!
//! The associated Legendre part `Sₗₘ(z)` (the `sinᵐθ` factor is carried by
//! `(x + iy)ᵐ`) follows the fully normalised recurrence
//!
//! ```text
//! Sₘₘ     = Sₘ₋₁,ₘ₋₁ · √((2m+1)/(2m))
//! Sₗₘ     = aₗₘ (z Sₗ₋₁,ₘ − bₗₘ Sₗ₋₂,ₘ)
//! aₗₘ     = √((4l² − 1)/(l² − m²))
//! bₗₘ     = √(((l−1)² − m²)/(4(l−1)² − 1))
//! ```
//!
//! and the real harmonics are `Yₗ₀ = Sₗ₀`, `Yₗₘ = √2 Sₗₘ Re(x + iy)ᵐ` and
//! `Yₗ,₋ₘ = √2 Sₗₘ Im(x + iy)ᵐ` for `m > 0`. The recurrence is stable to the
//! degree ceiling of the crate.
use nalgebra::{DMatrix, DVector, Vector3};

use crate::scalar::Numeric;

#[inline]
fn n<T: Numeric>(v: usize) -> T {
    T::cast(v as f64)
}

/// Evaluate every harmonic up to `ydeg` at the point `p` of the unit sphere.
///
/// Arguments
/// -----------------
/// * `ydeg`: maximum degree.
/// * `p`: unit vector.
///
/// Return
/// ----------
/// * Vector of length `(ydeg + 1)²` indexed by `l² + l + m`.
pub fn ylm_basis<T: Numeric>(ydeg: usize, p: &Vector3<T>) -> DVector<T> {
    let mut out = DVector::zeros((ydeg + 1) * (ydeg + 1));
    fill_basis(ydeg, p, out.as_mut_slice());
    out
}

/// Evaluate the basis at several points, one row per point.
pub fn ylm_matrix<T: Numeric>(ydeg: usize, points: &[Vector3<T>]) -> DMatrix<T> {
    let ny = (ydeg + 1) * (ydeg + 1);
    let mut out = DMatrix::zeros(points.len(), ny);
    for (i, p) in points.iter().enumerate() {
        out.set_row(i, &ylm_basis(ydeg, p).transpose());
    }
    out
}

fn fill_basis<T: Numeric>(ydeg: usize, p: &Vector3<T>, out: &mut [T]) {
    let (x, y, z) = (p.x, p.y, p.z);
    let sqrt2 = n::<T>(2).sqrt();

    let mut put = |l: usize, m: usize, s: T, re: T, im: T| {
        let centre = l * l + l;
        if m == 0 {
            out[centre] = s;
        } else {
            out[centre + m] = sqrt2 * s * re;
            out[centre - m] = sqrt2 * s * im;
        }
    };

    let mut smm = T::one();
    let (mut re, mut im) = (T::one(), T::zero());
    for m in 0..=ydeg {
        if m > 0 {
            smm *= (n::<T>(2 * m + 1) / n::<T>(2 * m)).sqrt();
            (re, im) = (re * x - im * y, re * y + im * x);
        }
        put(m, m, smm, re, im);
        if m == ydeg {
            continue;
        }

        let mut s_prev = smm;
        let mut s_curr = z * n::<T>(2 * m + 3).sqrt() * smm;
        put(m + 1, m, s_curr, re, im);

        for l in (m + 2)..=ydeg {
            let a = (n::<T>(4 * l * l - 1) / n::<T>(l * l - m * m)).sqrt();
            let b = (n::<T>((l - 1) * (l - 1) - m * m) / n::<T>(4 * (l - 1) * (l - 1) - 1)).sqrt();
            let s_next = a * (z * s_curr - b * s_prev);
            put(l, m, s_next, re, im);
            s_prev = s_curr;
            s_curr = s_next;
        }
    }
}

#[cfg(test)]
mod ylm_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_low_degrees() {
        let p = Vector3::new(0.48_f64, 0.6, 0.64);
        let b = ylm_basis(2, &p);
        let s3 = 3.0_f64.sqrt();
        let s15 = 15.0_f64.sqrt();

        assert_eq!(b[0], 1.0);
        assert_relative_eq!(b[1], s3 * p.y, epsilon = 1e-14);
        assert_relative_eq!(b[2], s3 * p.z, epsilon = 1e-14);
        assert_relative_eq!(b[3], s3 * p.x, epsilon = 1e-14);

        assert_relative_eq!(b[4], s15 * p.x * p.y, epsilon = 1e-14);
        assert_relative_eq!(b[5], s15 * p.y * p.z, epsilon = 1e-14);
        assert_relative_eq!(
            b[6],
            5.0_f64.sqrt() / 2.0 * (3.0 * p.z * p.z - 1.0),
            epsilon = 1e-14
        );
        assert_relative_eq!(b[7], s15 * p.x * p.z, epsilon = 1e-14);
        assert_relative_eq!(b[8], s15 / 2.0 * (p.x * p.x - p.y * p.y), epsilon = 1e-14);
    }

    #[test]
    fn test_unit_mean_square() {
        // Addition theorem: Σₘ Yₗₘ² = 2l + 1 everywhere on the sphere
        let p = Vector3::new(-0.3_f64, 0.2, -0.8).normalize();
        let b = ylm_basis(10, &p);
        for l in 0..=10 {
            let sum: f64 = (l * l..(l + 1) * (l + 1)).map(|i| b[i] * b[i]).sum();
            assert_relative_eq!(sum, (2 * l + 1) as f64, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_matrix_rows() {
        let points = [Vector3::new(0.0_f64, 0.0, 1.0), Vector3::new(1.0, 0.0, 0.0)];
        let m = ylm_matrix(1, &points);
        assert_eq!(m.shape(), (2, 4));
        assert_relative_eq!(m[(0, 2)], 3.0_f64.sqrt());
        assert_relative_eq!(m[(1, 3)], 3.0_f64.sqrt());
        assert_eq!(m[(1, 2)], 0.0);
    }
}
