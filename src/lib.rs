//! # starmap
//!
//! Spherical-harmonic surface maps of stars and planets: a coefficient store
//! addressed by symbolic `(l, m)` indices, and an evaluation pipeline that
//! renders the visible disk and computes disk-integrated (optionally occulted)
//! flux at arbitrary rotational phases.
//!
//! ## Overview
//!
//! - [`map::Map`] – the façade owning coefficients, light state and kernels.
//! - [`variant`] – storage layouts (single, spectral, temporal) and light
//!   modes (emitted, reflected).
//! - [`indices`] – symbolic index resolution.
//! - [`kernels`] – harmonic basis, rotation operators, flux quadrature and
//!   spot expansion.
//! - [`imaging`] – contract of the external display / image-import backend.
//!
//! ```rust
//! use starmap::prelude::*;
//!
//! let mut map: Map<Single, Emitted> = Map::new(3, 1).unwrap();
//! map.add_spot(-0.05, 0.1, 30.0, 0.0, None).unwrap();
//! let image = map.render(&Frame::at_phase(15.0), 16).unwrap();
//! assert_eq!(image.shape(), (256, 1));
//! ```
pub mod coefficients;
pub mod constants;
pub mod eval_params;
pub mod frame;
pub mod imaging;
pub mod indices;
pub mod kernels;
pub mod map;
pub mod scalar;
pub mod starmap_errors;
pub mod variant;

pub mod prelude {
    pub use crate::{
        coefficients::Coefficients,
        eval_params::EvalParams,
        frame::{Frame, Occultor},
        imaging::{ImagingService, ShowOptions},
        indices::{Selector, YlmIndex},
        map::{EmittedMap, Map, ReflectedMap, SpectralMap, TemporalMap},
        scalar::Numeric,
        starmap_errors::StarmapError,
        variant::{Emitted, Layout, LightMode, Reflected, Single, Spectral, Temporal},
    };
}
