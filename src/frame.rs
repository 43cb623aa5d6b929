//! Observation geometry of one evaluation: the time, rotational phase and
//! optional illumination of a [`Frame`], and the disk of an [`Occultor`].
use std::fmt;

use nalgebra::Vector3;

use crate::constants::Degree;

/// A single evaluation epoch.
///
/// `t` only matters for temporal maps; `theta` is the rotational phase about
/// the map axis in degrees. `source` overrides the illumination direction of
/// a reflected-light map for this frame only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub t: f64,
    pub theta: Degree,
    pub source: Option<Vector3<f64>>,
}

impl Frame {
    pub fn new(t: f64, theta: Degree) -> Self {
        Frame {
            t,
            theta,
            source: None,
        }
    }

    /// A frame at `t = 0` and the given phase.
    pub fn at_phase(theta: Degree) -> Self {
        Frame::new(0.0, theta)
    }

    pub fn with_source(mut self, source: Vector3<f64>) -> Self {
        self.source = Some(source);
        self
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame(t = {}, theta = {}°", self.t, self.theta)?;
        if let Some(s) = self.source {
            write!(f, ", source = [{}, {}, {}]", s.x, s.y, s.z)?;
        }
        write!(f, ")")
    }
}

/// Opaque disk passing in front of the map, in units of the map radius.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Occultor {
    pub xo: f64,
    pub yo: f64,
    pub zo: f64,
    pub ro: f64,
}

impl Occultor {
    pub fn new(xo: f64, yo: f64, zo: f64, ro: f64) -> Self {
        Occultor { xo, yo, zo, ro }
    }

    /// No occultation at all.
    pub fn none() -> Self {
        Occultor {
            zo: 1.0,
            ..Default::default()
        }
    }

    /// `true` when the occultor actually blocks part of the sky plane.
    pub fn is_active(&self) -> bool {
        self.zo > 0.0 && self.ro > 0.0
    }

    /// Whether the sky-plane point `(x, y)` is hidden.
    #[inline]
    pub fn covers(&self, x: f64, y: f64) -> bool {
        if !self.is_active() {
            return false;
        }
        let (dx, dy) = (x - self.xo, y - self.yo);
        dx * dx + dy * dy < self.ro * self.ro
    }
}
