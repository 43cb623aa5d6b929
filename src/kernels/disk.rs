//! # Disk-integrated flux
//!
//! The flux of a map is the integral of its intensity over the visible disk.
//! Because intensity is linear in the harmonic coefficients, the integral
//! reduces to a dot product with a *projection vector*
//!
//! ```text
//! sₙ = (1/π) ∬_disk w(p) Yₙ(p) dx dy
//! ```
//!
//! where `w` is the light weight of the frame and points hidden by an
//! occultor are left out of the domain.
//!
//! ## Quadrature
//!
//! A polar midpoint rule: `rings` annuli of equal width, each cut into
//! `sectors` equal wedges, one node at the centre of each cell weighted by the
//! cell area `r Δr Δφ`. The weights of the rule sum to `π`, so a uniform
//! map has unit flux, and a centred occultor of radius `k / rings` hides
//! exactly the `k` innermost rings.
use nalgebra::{DVector, Vector3};

use crate::{
    frame::Occultor,
    kernels::ylm::ylm_basis,
    scalar::Numeric,
    starmap_errors::StarmapError,
    variant::Shade,
};

#[derive(Debug, Clone)]
struct Node<T: Numeric> {
    x: f64,
    y: f64,
    p: Vector3<T>,
    weight: T,
}

/// Midpoint nodes over the unit disk.
#[derive(Debug, Clone)]
pub struct DiskQuadrature<T: Numeric> {
    nodes: Vec<Node<T>>,
}

impl<T: Numeric> DiskQuadrature<T> {
    pub fn new(rings: usize, sectors: usize) -> Result<Self, StarmapError> {
        if rings == 0 || sectors == 0 {
            return Err(StarmapError::Configuration(format!(
                "flux quadrature needs at least one ring and one sector (got {rings} × {sectors})"
            )));
        }
        let dr = 1.0 / rings as f64;
        let dphi = 2.0 * std::f64::consts::PI / sectors as f64;

        let mut nodes = Vec::with_capacity(rings * sectors);
        for i in 0..rings {
            let r = (i as f64 + 0.5) * dr;
            let z = (1.0 - r * r).sqrt();
            let weight = T::cast(r * dr * dphi);
            for j in 0..sectors {
                let phi = (j as f64 + 0.5) * dphi;
                let (x, y) = (r * phi.cos(), r * phi.sin());
                nodes.push(Node {
                    x,
                    y,
                    p: Vector3::new(T::cast(x), T::cast(y), T::cast(z)),
                    weight,
                });
            }
        }
        Ok(DiskQuadrature { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Projection vector of length `(ydeg + 1)²` for one frame.
    ///
    /// Arguments
    /// -----------------
    /// * `ydeg`: maximum degree of the map.
    /// * `shader`: light weight of the frame.
    /// * `occultor`: occulting disk, possibly inactive.
    ///
    /// Return
    /// ----------
    /// * `s` such that the flux of a (rotated) coefficient vector `ŷ` is `s · ŷ`.
    pub fn projection<S: Shade<T>>(&self, ydeg: usize, shader: &S, occultor: &Occultor) -> DVector<T> {
        let ny = (ydeg + 1) * (ydeg + 1);
        let mut s = DVector::zeros(ny);
        for node in self.nodes.iter().filter(|n| !occultor.covers(n.x, n.y)) {
            let w = shader.weight(&node.p) * node.weight;
            if w == T::zero() {
                continue;
            }
            s.axpy(w, &ylm_basis(ydeg, &node.p), T::one());
        }
        s / T::pi()
    }
}
