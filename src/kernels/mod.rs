//! # Numerical kernels
//!
//! Pure functions and precomputed operators shared by every map variant:
//!
//! * [`ylm`] – evaluation of the real spherical-harmonic basis,
//! * [`wigner`] – rotation operators on coefficient vectors,
//! * [`disk`] – flux projection over the (possibly occulted) visible disk,
//! * [`spot`] – zonal expansion of a Gaussian spot.
//!
//! None of these hold map state; the [`Map`](crate::map::Map) façade owns
//! the coefficients and decides when each kernel runs.
pub mod disk;
pub mod spot;
pub mod wigner;
pub mod ylm;
