//! # Light modes
//!
//! A map is either self-luminous ([`Emitted`]) or lit by a distant point
//! source ([`Reflected`]). The mode owns the per-map light state and turns it,
//! together with an optional per-frame override, into a [`Shade`] weight that
//! multiplies the harmonic expansion at every visible point of the disk.
//!
//! | Mode          | State                              | Weight at `p`          |
//! |---------------|------------------------------------|------------------------|
//! | [`Emitted`]   | limb darkening `u`, `u₀ = -1`      | `−Σ uₗ (1 − μ)ˡ`, `μ = z` |
//! | [`Reflected`] | unit source direction `ŝ`          | `max(0, p · ŝ)`        |
//!
//! Capabilities differ: only emitted maps support occultation and the linear
//! flux model.
use std::fmt;

use nalgebra::{DVector, Vector3};

use crate::{
    constants::{xhat, zhat},
    scalar::Numeric,
    starmap_errors::StarmapError,
};

/// Per-point weight applied to the harmonic expansion.
pub trait Shade<T: Numeric>: Send + Sync {
    fn weight(&self, p: &Vector3<T>) -> T;
}

pub trait LightMode: Clone + fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;

    type State<T: Numeric>: Clone + fmt::Debug + Send + Sync;
    type Shader<T: Numeric>: Shade<T>;

    /// Light state of a fresh map with limb-darkening degree `udeg`.
    fn new_state<T: Numeric>(udeg: usize) -> Result<Self::State<T>, StarmapError>;

    fn reset_state<T: Numeric>(state: &mut Self::State<T>);

    /// Number of stored limb-darkening coefficients.
    fn nu(udeg: usize) -> usize;

    /// Build the shader of one frame, honouring a per-frame source override.
    fn shader<T: Numeric>(
        state: &Self::State<T>,
        source: Option<&Vector3<f64>>,
    ) -> Result<Self::Shader<T>, StarmapError>;

    fn check_occultation() -> Result<(), StarmapError>;

    fn check_linear_flux() -> Result<(), StarmapError>;
}

// -------------------------------------------------------------------------------------------------
// Emitted light
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Emitted;

/// Polynomial limb-darkening law in `(1 − μ)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LimbDarkening<T: Numeric> {
    pub u: DVector<T>,
}

impl<T: Numeric> LimbDarkening<T> {
    /// Uniform disk of degree `udeg`: `u = [-1, 0, …, 0]`.
    pub fn uniform(udeg: usize) -> Self {
        let mut u = DVector::zeros(udeg + 1);
        u[0] = -T::one();
        LimbDarkening { u }
    }
}

/// Samples of `μ` used by [`LimbDarkening::is_physical`].
const PHYSICAL_CHECK_SAMPLES: usize = 1000;

impl<T: Numeric> LimbDarkening<T> {
    /// Whether the profile is non-negative on `μ ∈ [0, 1]` and never brightens
    /// toward the limb.
    ///
    /// The profile is evaluated on a regular grid in `μ`, walking from the
    /// limb to the disk centre, so the intensity must be non-decreasing along
    /// the walk.
    pub fn is_physical(&self) -> bool {
        let tol = T::cast(1e3) * T::mach_eps();
        let mut previous: Option<T> = None;
        for i in 0..=PHYSICAL_CHECK_SAMPLES {
            let mu = T::cast(i as f64 / PHYSICAL_CHECK_SAMPLES as f64);
            let p = zhat::<T>() * mu + xhat::<T>() * (T::one() - mu * mu).sqrt();
            let w = self.weight(&p);
            if !w.is_finite() || w < -tol {
                return false;
            }
            if matches!(previous, Some(prev) if w < prev - tol) {
                return false;
            }
            previous = Some(w);
        }
        true
    }
}

impl<T: Numeric> Shade<T> for LimbDarkening<T> {
    fn weight(&self, p: &Vector3<T>) -> T {
        let x = T::one() - p.z;
        // Horner on -Σ uₗ xˡ
        let acc = self.u.iter().rev().fold(T::zero(), |acc, &ul| acc * x + ul);
        -acc
    }
}

impl LightMode for Emitted {
    const NAME: &'static str = "Emitted";

    type State<T: Numeric> = LimbDarkening<T>;
    type Shader<T: Numeric> = LimbDarkening<T>;

    fn new_state<T: Numeric>(udeg: usize) -> Result<Self::State<T>, StarmapError> {
        Ok(LimbDarkening::uniform(udeg))
    }

    fn reset_state<T: Numeric>(state: &mut Self::State<T>) {
        *state = LimbDarkening::uniform(state.u.len() - 1);
    }

    fn nu(udeg: usize) -> usize {
        udeg + 1
    }

    fn shader<T: Numeric>(
        state: &Self::State<T>,
        source: Option<&Vector3<f64>>,
    ) -> Result<Self::Shader<T>, StarmapError> {
        if source.is_some() {
            return Err(StarmapError::Capability(
                "emitted-light maps have no illumination source".into(),
            ));
        }
        Ok(state.clone())
    }

    fn check_occultation() -> Result<(), StarmapError> {
        Ok(())
    }

    fn check_linear_flux() -> Result<(), StarmapError> {
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
// Reflected light
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reflected;

/// Direction of the illuminating source, seen from the body.
#[derive(Debug, Clone, PartialEq)]
pub struct Illumination<T: Numeric> {
    pub source: Vector3<T>,
}

impl<T: Numeric> Default for Illumination<T> {
    fn default() -> Self {
        Illumination { source: -xhat::<T>() }
    }
}

impl<T: Numeric> Illumination<T> {
    /// Normalise a host direction; the zero vector has no direction.
    pub fn from_direction(v: &Vector3<f64>) -> Result<Self, StarmapError> {
        let norm = v.norm();
        if !norm.is_finite() || norm == 0.0 {
            return Err(StarmapError::Configuration(
                "source direction must be a non-zero vector".into(),
            ));
        }
        let s = v / norm;
        Ok(Illumination {
            source: Vector3::new(T::cast(s.x), T::cast(s.y), T::cast(s.z)),
        })
    }
}

impl<T: Numeric> Shade<T> for Illumination<T> {
    fn weight(&self, p: &Vector3<T>) -> T {
        let cos = p.dot(&self.source);
        if cos > T::zero() {
            cos
        } else {
            T::zero()
        }
    }
}

impl LightMode for Reflected {
    const NAME: &'static str = "Reflected";

    type State<T: Numeric> = Illumination<T>;
    type Shader<T: Numeric> = Illumination<T>;

    fn new_state<T: Numeric>(udeg: usize) -> Result<Self::State<T>, StarmapError> {
        if udeg != 0 {
            return Err(StarmapError::Configuration(format!(
                "reflected-light maps do not support limb darkening (udeg = {udeg})"
            )));
        }
        Ok(Illumination::default())
    }

    fn reset_state<T: Numeric>(state: &mut Self::State<T>) {
        *state = Illumination::default();
    }

    fn nu(_udeg: usize) -> usize {
        0
    }

    fn shader<T: Numeric>(
        state: &Self::State<T>,
        source: Option<&Vector3<f64>>,
    ) -> Result<Self::Shader<T>, StarmapError> {
        match source {
            Some(v) => Illumination::from_direction(v),
            None => Ok(state.clone()),
        }
    }

    fn check_occultation() -> Result<(), StarmapError> {
        Err(StarmapError::Capability(
            "occultations are not implemented for reflected-light maps".into(),
        ))
    }

    fn check_linear_flux() -> Result<(), StarmapError> {
        Err(StarmapError::Capability(
            "the linear flux model is not implemented for reflected-light maps".into(),
        ))
    }
}
