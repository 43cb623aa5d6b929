//! # Gaussian spot expansion
//!
//! A circular spot centred on the pole is azimuthally symmetric, so it only
//! excites the zonal harmonics `Yₗ₀`. Its profile in `x = cos Δ` (with `Δ`
//! the angular distance from the spot centre) is
//!
//! ```text
//! g(x) = exp(−(1 − x)² / (2σ²))
//! ```
//!
//! and its Legendre coefficients `bₗ = (2l+1)/2 ∫₋₁¹ g Pₗ dx` are computed with a
//! composite Simpson rule of [`SPOT_QUADRATURE_PANELS`] panels. Because
//! `Yₗ₀ = √(2l+1) Pₗ` in the crate normalisation, the coefficient of `Yₗ₀` is
//! `bₗ / √(2l+1)`.
use crate::{constants::SPOT_QUADRATURE_PANELS, scalar::Numeric, starmap_errors::StarmapError};

/// Legendre polynomials `P₀ … P_lmax` at `x` (Bonnet recursion).
fn legendre<T: Numeric>(lmax: usize, x: T, out: &mut [T]) {
    out[0] = T::one();
    if lmax == 0 {
        return;
    }
    out[1] = x;
    for l in 1..lmax {
        let lf = T::cast(l as f64);
        out[l + 1] = ((T::cast((2 * l + 1) as f64)) * x * out[l] - lf * out[l - 1])
            / T::cast((l + 1) as f64);
    }
}

/// Coefficients of `Y₀₀ … Y_lmax,0` of a unit-height polar Gaussian spot.
///
/// Arguments
/// -----------------
/// * `sigma`: angular width of the profile in `cos Δ` units, strictly positive.
/// * `lmax`: highest degree of the expansion.
///
/// Return
/// ----------
/// * `lmax + 1` zonal coefficients.
pub fn gaussian_zonal<T: Numeric>(sigma: T, lmax: usize) -> Result<Vec<T>, StarmapError> {
    if !(sigma > T::zero()) {
        return Err(StarmapError::Configuration(format!(
            "spot width must be strictly positive (got {sigma})"
        )));
    }

    let panels = SPOT_QUADRATURE_PANELS;
    let h = T::cast(2.0 / panels as f64);
    let two_var = T::cast(2.0) * sigma * sigma;

    let mut integral = vec![T::zero(); lmax + 1];
    let mut p = vec![T::zero(); lmax + 1];
    for i in 0..=panels {
        let x = -T::one() + h * T::cast(i as f64);
        let simpson = if i == 0 || i == panels {
            T::one()
        } else if i % 2 == 1 {
            T::cast(4.0)
        } else {
            T::cast(2.0)
        };
        let d = T::one() - x;
        let g = (-(d * d) / two_var).exp();
        legendre(lmax, x, &mut p);
        for (acc, pl) in integral.iter_mut().zip(p.iter()) {
            *acc += simpson * g * *pl;
        }
    }

    let third = h / T::cast(3.0);
    Ok(integral
        .into_iter()
        .enumerate()
        .map(|(l, acc)| {
            let two_l1 = T::cast((2 * l + 1) as f64);
            // (2l+1)/2 · ∫ / √(2l+1)
            acc * third * two_l1.sqrt() / T::cast(2.0)
        })
        .collect())
}
