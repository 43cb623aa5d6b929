//! # Map variants
//!
//! A [`Map`](crate::map::Map) is parameterised over two independent strategy
//! axes resolved at compile time:
//!
//! * a [`Layout`] fixing the shape of the harmonic buffer
//!   ([`Single`], [`Spectral`], [`Temporal`]),
//! * a [`LightMode`] fixing how the disk is lit ([`Emitted`], [`Reflected`]).
//!
//! Every combination is valid. Operations a combination cannot support
//! (occultation of a reflected-light map, for instance) fail with
//! [`StarmapError::Capability`](crate::starmap_errors::StarmapError::Capability).
pub mod layout;
pub mod light;

pub use layout::{Layout, Resolved, Single, Spectral, Temporal};
pub use light::{Emitted, Illumination, LightMode, LimbDarkening, Reflected, Shade};
