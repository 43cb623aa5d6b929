//! # Scalar type contract
//!
//! Every coefficient buffer, rotation block and quadrature weight in `starmap` is
//! generic over a [`Numeric`] scalar. The contract is small: the
//! algebra and ordering come from [`nalgebra::RealField`], and this trait only
//! adds the named constants and the lossy bridge to the `f64` display type used
//! at the public boundary.
//!
//! Two backends ship with the crate:
//!
//! * `f64` – the default, used by every host-facing accessor.
//! * `f32` – reduced precision, handy for large batched renders.
//!
//! Arbitrary-precision or dual-number scalars plug in by implementing
//! `RealField` and [`Numeric`]; nothing in the core names a concrete backend.
//!
//! ## See also
//!
//! * [`Map`](crate::map::Map) – the only owner of a monomorphic coefficient store.
use nalgebra::RealField;

/// Numeric backend of a map.
///
/// Invariant: a map is monomorphic in its scalar for its whole lifetime; the
/// only precision boundary is [`Numeric::cast`] on writes and
/// [`Numeric::as_f64`] on reads.
pub trait Numeric: RealField + Copy + Send + Sync {
    /// `true` when the backend carries more precision than `f64`.
    const MULTI: bool = false;

    /// Cast a host value into the backend.
    fn cast(x: f64) -> Self {
        nalgebra::convert::<f64, Self>(x)
    }

    /// Narrow a backend value to the `f64` display type.
    fn as_f64(self) -> f64;

    /// √π in the backend precision.
    fn root_pi() -> Self {
        Self::pi().sqrt()
    }

    /// Machine epsilon of the backend.
    fn mach_eps() -> Self;
}

impl Numeric for f64 {
    fn cast(x: f64) -> Self {
        x
    }

    fn as_f64(self) -> f64 {
        self
    }

    fn mach_eps() -> Self {
        f64::EPSILON
    }
}

impl Numeric for f32 {
    fn cast(x: f64) -> Self {
        x as f32
    }

    fn as_f64(self) -> f64 {
        self as f64
    }

    fn mach_eps() -> Self {
        f32::EPSILON
    }
}

#[cfg(test)]
mod scalar_test {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(<f64 as Numeric>::root_pi(), std::f64::consts::PI.sqrt());
        assert!((<f32 as Numeric>::root_pi() - 1.7724539_f32).abs() < 1e-6);
        assert_eq!(<f64 as Numeric>::mach_eps(), f64::EPSILON);
        assert!(!<f64 as Numeric>::MULTI);
    }

    #[test]
    fn test_round_trip_narrowing() {
        let x = 0.123_456_789_012_345_f64;
        assert_eq!(<f64 as Numeric>::cast(x).as_f64(), x);

        let narrowed = <f32 as Numeric>::cast(x).as_f64();
        assert!((narrowed - x).abs() < 1e-7);
        assert_ne!(narrowed, x);
    }
}
