//! # Constants and type definitions for Starmap
//!
//! This module centralizes the **numerical ceilings**, **conversion factors**, and
//! **shared unit vectors** used throughout the `starmap` library.
//!
//! ## Overview
//!
//! - Degree ceiling for the spherical-harmonic expansion ([`MAX_LMAX`])
//! - Unit conversions (degrees ↔ radians)
//! - Core type aliases used across the crate
//! - Process-wide immutable Cartesian unit vectors ([`XHAT`], [`YHAT`], [`ZHAT`])
//!   and their casts into any [`Numeric`](crate::scalar::Numeric) backend
//!
//! ## Frame convention
//!
//! The observer looks down the `-z` axis: `x` points right, `y` points up and
//! `z` points out of the sky plane toward the observer. A point on the visible
//! hemisphere of the unit sphere is therefore `(x, y, √(1 − x² − y²))`.

use nalgebra::Vector3;

use crate::scalar::Numeric;

// -------------------------------------------------------------------------------------------------
// Numerical ceilings and unit conversions
// -------------------------------------------------------------------------------------------------

/// Highest spherical-harmonic degree accepted by a map.
///
/// The rotation and rendering bases become numerically unstable above this degree.
pub const MAX_LMAX: usize = 50;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Number of Simpson panels used by the zonal spot projection
pub const SPOT_QUADRATURE_PANELS: usize = 4096;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;

// -------------------------------------------------------------------------------------------------
// Unit vectors
// -------------------------------------------------------------------------------------------------

/// Unit vector along `x` (toward the right of the sky plane)
pub const XHAT: [f64; 3] = [1.0, 0.0, 0.0];

/// Unit vector along `y` (default rotation axis)
pub const YHAT: [f64; 3] = [0.0, 1.0, 0.0];

/// Unit vector along `z` (toward the observer)
pub const ZHAT: [f64; 3] = [0.0, 0.0, 1.0];

/// Cast one of the constant unit vectors into the scalar type `T`.
pub fn unit<T: Numeric>(v: [f64; 3]) -> Vector3<T> {
    Vector3::new(T::cast(v[0]), T::cast(v[1]), T::cast(v[2]))
}

/// `x̂` in the scalar type `T`.
pub fn xhat<T: Numeric>() -> Vector3<T> {
    unit(XHAT)
}

/// `ŷ` in the scalar type `T`.
pub fn yhat<T: Numeric>() -> Vector3<T> {
    unit(YHAT)
}

/// `ẑ` in the scalar type `T`.
pub fn zhat<T: Numeric>() -> Vector3<T> {
    unit(ZHAT)
}
