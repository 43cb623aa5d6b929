//! # Map: coefficient store, accessors and evaluation façade
//!
//! This module defines [`Map`], the central object of the crate. A map owns:
//!
//! 1. **Harmonic coefficients** `y` describing the surface brightness, shaped by
//!    its [`Layout`] (single column, one column per wavelength bin, or stacked
//!    time-derivative blocks).
//! 2. **Light state** owned by its [`LightMode`]: limb-darkening coefficients
//!    `u` for emitted light, or a source direction for reflected light.
//! 3. **Rotation axis**, about which the phase `θ` of every frame is applied.
//! 4. **Lazily built kernels** (rotation collocation, disk quadrature) created
//!    on first use through [`OnceCell`], and a one-entry evaluation cache.
//!
//! ## Key responsibilities
//!
//! - Symbolic reads and writes through [`Map::get`] / [`Map::set`] and, for
//!   emitted light, [`Map::get_u`] / [`Map::set_u`]. Every write is
//!   all-or-nothing: shapes are checked before the first value lands.
//! - Evaluation: [`Map::intensity`], [`Map::render`], [`Map::flux`], their batched
//!   forms and the linear design matrices.
//! - Surface edits: [`Map::rotate`], [`Map::add_spot`], [`Map::random`],
//!   [`Map::load_image`].
//!
//! ## Typical usage
//!
//! ```rust
//! use starmap::prelude::*;
//!
//! let mut map: Map<Single, Emitted> = Map::new(2, 2).unwrap();
//! assert_eq!((map.ny(), map.nu(), map.n()), (9, 3, 9));
//!
//! map.set(&YlmIndex::new(1, 0), 0.25).unwrap();
//! map.set_u(1, 0.5).unwrap();
//! assert_eq!(map.get_u(1).unwrap(), Coefficients::Scalar(0.5));
//!
//! let flux = map.flux(&Frame::at_phase(30.0), &Occultor::none()).unwrap();
//! assert_eq!(flux.len(), 1);
//! ```
//!
//! ## See also
//! ------------
//! * [`indices`](crate::indices) – symbolic index resolution.
//! * [`kernels`](crate::kernels) – basis, rotation, flux and spot kernels.
//! * [`EvalParams`] – render resolution and quadrature settings.
use std::{fmt, sync::Mutex};

use nalgebra::{DMatrix, DVector, Unit, Vector3};
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::{
    constants::{yhat, MAX_LMAX},
    eval_params::EvalParams,
    kernels::{disk::DiskQuadrature, wigner::WignerKernel},
    scalar::Numeric,
    starmap_errors::StarmapError,
    variant::{Emitted, Illumination, Layout, LightMode, Reflected, Single, Spectral, Temporal},
};

mod access;
mod cache;
mod evaluate;
mod features;
mod imaging;
mod store;

use cache::EvalCache;
use store::CoefficientStore;

/// Single-column, emitted-light map.
pub type EmittedMap<T = f64> = Map<Single, Emitted, T>;
/// Single-column, reflected-light map.
pub type ReflectedMap<T = f64> = Map<Single, Reflected, T>;
/// One coefficient column per wavelength bin.
pub type SpectralMap<M = Emitted, T = f64> = Map<Spectral, M, T>;
/// Coefficients plus time derivatives.
pub type TemporalMap<M = Emitted, T = f64> = Map<Temporal, M, T>;

/// A spherical-harmonic surface map.
///
/// Construct it through [`Map::new`], [`Map::spectral`], [`Map::temporal`] or
/// [`Map::with_layout`]. The scalar backend `T` defaults to `f64`.
///
/// The `Mutex` around the evaluation cache only memoizes the last
/// evaluation so that `&self` methods can refresh it. It is not a
/// synchronization guarantee: mutation still requires `&mut self`, and
/// sharing a map across threads relies on the usual `Send`/`Sync` rules.
#[derive(Debug)]
pub struct Map<L: Layout, M: LightMode, T: Numeric = f64> {
    ydeg: usize,
    udeg: usize,
    layout: L,
    store: CoefficientStore<M, T>,
    axis: Unit<Vector3<T>>,
    params: EvalParams,
    kernel: OnceCell<WignerKernel<T>>,
    quadrature: OnceCell<DiskQuadrature<T>>,
    cache: Mutex<EvalCache<T>>,
}

impl<M: LightMode, T: Numeric> Map<Single, M, T> {
    /// Single-column map of degree `ydeg` with limb-darkening degree `udeg`.
    pub fn new(ydeg: usize, udeg: usize) -> Result<Self, StarmapError> {
        Self::with_layout(ydeg, udeg, Single)
    }
}

impl<M: LightMode, T: Numeric> Map<Spectral, M, T> {
    /// Map with `nw` wavelength bins.
    pub fn spectral(ydeg: usize, udeg: usize, nw: usize) -> Result<Self, StarmapError> {
        Self::with_layout(ydeg, udeg, Spectral { nw })
    }
}

impl<M: LightMode, T: Numeric> Map<Temporal, M, T> {
    /// Map with `nt` Taylor terms (the static map and `nt - 1` derivatives).
    pub fn temporal(ydeg: usize, udeg: usize, nt: usize) -> Result<Self, StarmapError> {
        Self::with_layout(ydeg, udeg, Temporal { nt })
    }
}

impl<L: Layout, M: LightMode, T: Numeric> Map<L, M, T> {
    /// Build a map with an explicit layout.
    ///
    /// Arguments
    /// -----------------
    /// * `ydeg`: maximum spherical-harmonic degree, at most [`MAX_LMAX`].
    /// * `udeg`: limb-darkening degree (must be `0` for reflected light).
    /// * `layout`: storage layout.
    ///
    /// Return
    /// ----------
    /// * A map in its canonical state (`Y₀₀ = 1`, uniform disk, axis `ŷ`),
    ///   or a [`StarmapError::Configuration`].
    pub fn with_layout(ydeg: usize, udeg: usize, layout: L) -> Result<Self, StarmapError> {
        if ydeg > MAX_LMAX {
            return Err(StarmapError::Configuration(format!(
                "ydeg = {ydeg} exceeds the maximum degree {MAX_LMAX}"
            )));
        }
        layout.validate()?;
        let store = CoefficientStore::new(&layout, ydeg, udeg)?;

        debug!(
            ydeg,
            udeg,
            layout = L::NAME,
            light = M::NAME,
            ncoly = layout.ncoly(),
            "new map"
        );

        Ok(Map {
            ydeg,
            udeg,
            layout,
            store,
            axis: Unit::new_normalize(yhat()),
            params: EvalParams::default(),
            kernel: OnceCell::new(),
            quadrature: OnceCell::new(),
            cache: Mutex::new(EvalCache::default()),
        })
    }

    /// Replace the evaluation parameters (builder style).
    pub fn with_params(mut self, params: EvalParams) -> Self {
        self.set_params(params);
        self
    }

    pub fn params(&self) -> &EvalParams {
        &self.params
    }

    pub fn set_params(&mut self, params: EvalParams) {
        self.params = params;
        self.quadrature = OnceCell::new();
        self.invalidate();
    }

    pub fn ydeg(&self) -> usize {
        self.ydeg
    }

    pub fn udeg(&self) -> usize {
        self.udeg
    }

    /// Number of harmonics per column, `(ydeg + 1)²`.
    pub fn ny(&self) -> usize {
        (self.ydeg + 1) * (self.ydeg + 1)
    }

    /// Number of limb-darkening coefficients (`0` for reflected light).
    pub fn nu(&self) -> usize {
        M::nu(self.udeg)
    }

    pub fn nt(&self) -> usize {
        self.layout.nt()
    }

    pub fn nw(&self) -> usize {
        self.layout.nw()
    }

    /// Total number of harmonic coefficients, `Ny` times the number of columns.
    pub fn n(&self) -> usize {
        self.ny() * self.layout.ncoly()
    }

    /// `true` when the scalar backend is wider than `f64`.
    pub fn multi(&self) -> bool {
        T::MULTI
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Detached `f64` copy of the whole harmonic buffer in storage shape.
    pub fn y(&self) -> DMatrix<f64> {
        self.store.y.map(|v| v.as_f64())
    }

    /// Unit rotation axis.
    pub fn axis(&self) -> Vector3<f64> {
        self.axis.map(|v| v.as_f64())
    }

    /// Set the rotation axis; any non-zero vector is normalised.
    pub fn set_axis(&mut self, axis: Vector3<f64>) -> Result<(), StarmapError> {
        let norm = axis.norm();
        if !norm.is_finite() || norm == 0.0 {
            return Err(StarmapError::Configuration(
                "rotation axis must be a non-zero vector".into(),
            ));
        }
        let unit = axis / norm;
        self.axis = Unit::new_unchecked(unit.map(T::cast));
        self.invalidate();
        Ok(())
    }

    /// Restore the canonical state: `Y₀₀ = 1` (static block only for temporal
    /// maps), uniform limb darkening or default source, axis `ŷ`.
    pub fn reset(&mut self) {
        let ny = self.ny();
        self.store.reset(&self.layout, ny);
        self.axis = Unit::new_normalize(yhat());
        self.invalidate();
        debug!(layout = L::NAME, "map reset");
    }

    /// Flag the evaluation cache as stale.
    pub(crate) fn invalidate(&mut self) {
        match self.cache.get_mut() {
            Ok(cache) => cache.mark_dirty(),
            Err(poisoned) => poisoned.into_inner().mark_dirty(),
        }
    }

    pub(crate) fn kernel(&self) -> Result<&WignerKernel<T>, StarmapError> {
        self.kernel.get_or_try_init(|| {
            debug!(ydeg = self.ydeg, "building rotation kernel");
            WignerKernel::new(self.ydeg)
        })
    }

    pub(crate) fn quadrature(&self) -> Result<&DiskQuadrature<T>, StarmapError> {
        self.quadrature
            .get_or_try_init(|| DiskQuadrature::new(self.params.flux_rings, self.params.flux_sectors))
    }

    /// Apply a `Ny × Ny` operator to the given logical columns.
    pub(crate) fn apply_to_columns(&mut self, op: &DMatrix<T>, cols: impl IntoIterator<Item = usize>) {
        let ny = self.ny();
        for k in cols {
            let column = self.store.column(&self.layout, ny, k);
            let updated: DVector<T> = op * column;
            self.store.set_column(&self.layout, ny, k, &updated);
        }
        self.invalidate();
    }
}

impl<L: Layout, T: Numeric> Map<L, Emitted, T> {
    /// Detached `f64` copy of the limb-darkening vector, `u₀` included.
    pub fn u(&self) -> DVector<f64> {
        self.store.light.u.map(|v| v.as_f64())
    }

    /// Whether the limb-darkening profile is non-negative everywhere on the
    /// disk and decreases monotonically toward the limb.
    pub fn limbdark_is_physical(&self) -> bool {
        self.store.light.is_physical()
    }
}

impl<L: Layout, T: Numeric> Map<L, Reflected, T> {
    /// Unit direction of the illuminating source.
    pub fn source(&self) -> Vector3<f64> {
        self.store.light.source.map(|v| v.as_f64())
    }

    /// Set the default source direction; any non-zero vector is normalised.
    pub fn set_source(&mut self, source: Vector3<f64>) -> Result<(), StarmapError> {
        self.store.light = Illumination::from_direction(&source)?;
        self.invalidate();
        Ok(())
    }
}

impl<L: Layout, M: LightMode, T: Numeric> fmt::Display for Map<L, M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<starmap.Map(ydeg={}, udeg={}, layout={}, nw={}, nt={}, light={}, multi={})>",
            self.ydeg,
            self.udeg,
            L::NAME,
            self.nw(),
            self.nt(),
            M::NAME,
            self.multi()
        )
    }
}

#[cfg(test)]
mod map_test {
    use super::*;
    use crate::{constants::zhat, indices::Selector};

    #[test]
    fn test_dimensions() {
        let map: Map<Single, Emitted> = Map::new(2, 2).unwrap();
        assert_eq!(map.ny(), 9);
        assert_eq!(map.nu(), 3);
        assert_eq!(map.n(), 9);

        let map: Map<Spectral, Emitted> = Map::spectral(2, 0, 4).unwrap();
        assert_eq!(map.n(), 36);
        assert_eq!(map.y().shape(), (9, 4));

        let map: Map<Temporal, Emitted> = Map::temporal(1, 0, 3).unwrap();
        assert_eq!(map.n(), 12);
        assert_eq!(map.y().shape(), (12, 1));
    }

    #[test]
    fn test_construction_errors() {
        assert!(Map::<Single, Emitted>::new(MAX_LMAX + 1, 0).is_err());
        assert!(Map::<Single, Reflected>::new(2, 1).is_err());
        assert!(Map::<Spectral, Emitted>::spectral(2, 0, 0).is_err());
        assert!(Map::<Temporal, Emitted>::temporal(2, 0, 0).is_err());
    }

    #[test]
    fn test_axis() {
        let mut map: Map<Single, Emitted> = Map::new(1, 0).unwrap();
        assert_eq!(map.axis(), Vector3::new(0.0, 1.0, 0.0));
        map.set_axis(Vector3::new(0.0, 0.0, 2.0)).unwrap();
        assert_eq!(map.axis(), zhat::<f64>());
        assert!(map.set_axis(Vector3::zeros()).is_err());
        map.reset();
        assert_eq!(map.axis(), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_limbdark_is_physical() {
        let mut map: Map<Single, Emitted> = Map::new(1, 2).unwrap();
        assert!(map.limbdark_is_physical());
        map.set_u(Selector::All, vec![0.4, 0.26]).unwrap();
        assert!(map.limbdark_is_physical());
        map.set_u(1, -1.0).unwrap();
        assert!(!map.limbdark_is_physical());
        map.set_u(Selector::All, vec![2.0, 0.0]).unwrap();
        assert!(!map.limbdark_is_physical());
    }

    #[test]
    fn test_reflected_source() {
        let mut map: Map<Single, Reflected> = Map::new(1, 0).unwrap();
        assert_eq!(map.source(), Vector3::new(-1.0, 0.0, 0.0));
        map.set_source(Vector3::new(0.0, 3.0, 0.0)).unwrap();
        assert_eq!(map.source(), Vector3::new(0.0, 1.0, 0.0));
        map.reset();
        assert_eq!(map.source(), Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_display() {
        let map: Map<Single, Emitted> = Map::new(2, 2).unwrap();
        assert_eq!(
            format!("{map}"),
            "<starmap.Map(ydeg=2, udeg=2, layout=Single, nw=1, nt=1, light=Emitted, multi=false)>"
        );
    }

    #[test]
    fn test_single_precision_backend() {
        let map: Map<Single, Emitted, f32> = Map::new(2, 1).unwrap();
        assert!(!map.multi());
        assert_eq!(map.y()[(0, 0)], 1.0);
    }
}
