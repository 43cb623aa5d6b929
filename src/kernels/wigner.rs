//! # Rotation operators on the harmonic basis
//!
//! A rotation `R` of the sphere maps each degree-`l` subspace onto itself, so
//! the operator acting on a coefficient vector is block diagonal with one
//! `(2l+1) × (2l+1)` block per degree.
//!
//! ## Overview
//!
//! Rather than carrying Wigner-D recurrences, the kernel solves each block by
//! collocation. With `Aₗ` the degree-`l` columns of the basis evaluated on a
//! fixed Fibonacci point set `{pₖ}` and `Bₗ` the same columns evaluated at
//! `Rᵀpₖ`, the rotated expansion must agree with the original one at every
//! point, which gives
//!
//! ```text
//! Dₗ = Aₗ⁺ · Bₗ
//! ```
//!
//! where `Aₗ⁺` is the SVD pseudo-inverse. The pseudo-inverses depend only on
//! the degree and are computed once when the kernel is built; each rotation
//! then costs one basis evaluation per point and one small product per degree.
//!
//! A zero angle short-circuits to the exact identity.
//!
//! ## See also
//!
//! * [`ylm_basis`](crate::kernels::ylm::ylm_basis) – the basis being rotated.
use nalgebra::{DMatrix, Rotation3, Unit, Vector3};

use crate::{
    kernels::ylm::{ylm_basis, ylm_matrix},
    scalar::Numeric,
    starmap_errors::StarmapError,
};

/// Quasi-uniform points on the unit sphere (golden-angle spiral).
pub fn fibonacci_sphere<T: Numeric>(npts: usize) -> Vec<Vector3<T>> {
    let golden = T::pi() * (T::cast(3.0) - T::cast(5.0).sqrt());
    let total = T::cast(npts as f64);
    (0..npts)
        .map(|k| {
            let kf = T::cast(k as f64);
            let z = T::one() - (T::cast(2.0) * kf + T::one()) / total;
            let r = (T::one() - z * z).sqrt();
            let phi = golden * kf;
            Vector3::new(r * phi.cos(), r * phi.sin(), z)
        })
        .collect()
}

/// Precomputed collocation operators for maps of degree `ydeg`.
#[derive(Debug, Clone)]
pub struct WignerKernel<T: Numeric> {
    ydeg: usize,
    points: Vec<Vector3<T>>,
    /// `Aₗ⁺`, one `(2l+1) × npts` matrix per degree
    pinv: Vec<DMatrix<T>>,
}

impl<T: Numeric> WignerKernel<T> {
    /// Build the kernel.
    ///
    /// Arguments
    /// -----------------
    /// * `ydeg`: maximum degree of the rotated vectors.
    ///
    /// Return
    /// ----------
    /// * The kernel, or [`StarmapError::Kernel`] if a collocation block is
    ///   rank deficient.
    pub fn new(ydeg: usize) -> Result<Self, StarmapError> {
        let npts = 3 * (2 * ydeg + 1) + 1;
        let points = fibonacci_sphere::<T>(npts);
        let a = ylm_matrix(ydeg, &points);
        let eps = T::mach_eps().sqrt();

        let mut pinv = Vec::with_capacity(ydeg + 1);
        for l in 0..=ydeg {
            let block = a.columns(l * l, 2 * l + 1).into_owned();
            let inv = block
                .pseudo_inverse(eps)
                .map_err(|e| StarmapError::Kernel(format!("degree {l} collocation: {e}")))?;
            pinv.push(inv);
        }

        Ok(WignerKernel { ydeg, points, pinv })
    }

    pub fn ydeg(&self) -> usize {
        self.ydeg
    }

    /// Operator rotating a coefficient vector by `angle` radians about `axis`.
    ///
    /// The rotation is right-handed: with `axis = ŷ` the point `ẑ` moves toward
    /// `x̂`.
    pub fn rotation(&self, axis: &Unit<Vector3<T>>, angle: T) -> DMatrix<T> {
        let ny = (self.ydeg + 1) * (self.ydeg + 1);
        if angle == T::zero() {
            return DMatrix::identity(ny, ny);
        }
        let inverse = Rotation3::from_axis_angle(axis, -angle);

        let mut b = DMatrix::zeros(self.points.len(), ny);
        for (i, p) in self.points.iter().enumerate() {
            b.set_row(i, &ylm_basis(self.ydeg, &(inverse * p)).transpose());
        }

        let mut d = DMatrix::zeros(ny, ny);
        for (l, inv) in self.pinv.iter().enumerate() {
            let size = 2 * l + 1;
            let block = inv * b.columns(l * l, size);
            d.view_mut((l * l, l * l), (size, size)).copy_from(&block);
        }
        d
    }

    /// Compose `rotation(axis₂, angle₂) · rotation(axis₁, angle₁)`.
    pub fn rotation_sequence(&self, steps: &[(Unit<Vector3<T>>, T)]) -> DMatrix<T> {
        let ny = (self.ydeg + 1) * (self.ydeg + 1);
        steps
            .iter()
            .fold(DMatrix::identity(ny, ny), |acc, (axis, angle)| {
                self.rotation(axis, *angle) * acc
            })
    }
}
