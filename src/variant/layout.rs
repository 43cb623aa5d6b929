//! # Structural layouts of the harmonic coefficient buffer
//!
//! A map stores its harmonic coefficients `y` in one of three shapes:
//!
//! | Layout       | Storage            | Logical column `k`                        |
//! |--------------|--------------------|-------------------------------------------|
//! | [`Single`]   | `Ny × 1`           | the only column                           |
//! | [`Spectral`] | `Ny × Nw`          | wavelength bin `k`                        |
//! | [`Temporal`] | `(Ny·Nt) × 1`      | `k`-th time-derivative block of `Ny` rows |
//!
//! The layout owns every decision that depends on this shape: the index
//! resolver, the canonical reset state, and the Taylor weights that collapse a
//! temporal map into a single harmonic vector at a requested time.
//!
//! All three are plain configuration structs resolved once at construction and
//! threaded through [`Map`](crate::map::Map) as a type parameter.
use std::fmt;

use nalgebra::DMatrix;

use crate::{
    indices::{column_inds, ylm_inds, ylmt_inds, ylmw_inds, YlmIndex},
    scalar::Numeric,
    starmap_errors::StarmapError,
};

/// Index lists produced by a layout's resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Rows of the single column.
    Column(Vec<usize>),
    /// Full `rows × cols` grid of a spectral buffer.
    Grid { rows: Vec<usize>, cols: Vec<usize> },
    /// Rows of a flattened temporal buffer, `(l, m)`-major, plus the number of
    /// resolved derivative orders.
    Flattened { rows: Vec<usize>, ncols: usize },
}

/// Shape strategy of a map's harmonic buffer.
pub trait Layout: Clone + fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;

    /// Number of wavelength bins.
    fn nw(&self) -> usize {
        1
    }

    /// Number of time-derivative orders.
    fn nt(&self) -> usize {
        1
    }

    /// Number of logical columns (wavelength bins or derivative orders).
    fn ncoly(&self) -> usize;

    /// Number of columns of an evaluated intensity or flux.
    fn nflx(&self) -> usize;

    /// `(rows, cols)` of the storage buffer for `ny` harmonics.
    fn storage_shape(&self, ny: usize) -> (usize, usize);

    /// Storage position of harmonic `n` in logical column `k`.
    fn slot(&self, ny: usize, n: usize, k: usize) -> (usize, usize);

    fn resolve(&self, ydeg: usize, idx: &YlmIndex) -> Result<Resolved, StarmapError>;

    /// Weight of each stored `Ny`-row block once collapsed at time `t`.
    fn taylor_weights<T: Numeric>(&self, t: T) -> Vec<T>;

    /// Amplitude per logical column when a scalar amplitude is broadcast.
    fn broadcast_amplitude(&self, amp: f64) -> Vec<f64> {
        vec![amp; self.ncoly()]
    }

    /// Logical columns whose `Y₀₀` term is set to one by a reset.
    fn normalized_columns(&self) -> usize {
        self.ncoly()
    }

    fn validate(&self) -> Result<(), StarmapError> {
        if self.ncoly() == 0 {
            return Err(StarmapError::Configuration(format!(
                "a {} map needs at least one column",
                Self::NAME
            )));
        }
        Ok(())
    }

    /// Collapse the storage buffer into the `Ny × nflx` harmonic matrix seen at `t`.
    fn collapse<T: Numeric>(&self, y: &DMatrix<T>, ny: usize, t: T) -> DMatrix<T> {
        let weights = self.taylor_weights(t);
        if weights.len() == 1 {
            return y.rows(0, ny).into_owned();
        }
        let mut out = DMatrix::zeros(ny, y.ncols());
        for (k, w) in weights.into_iter().enumerate() {
            out += y.rows(k * ny, ny) * w;
        }
        out
    }
}

/// Default single-column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Single;

impl Layout for Single {
    const NAME: &'static str = "Single";

    fn ncoly(&self) -> usize {
        1
    }

    fn nflx(&self) -> usize {
        1
    }

    fn storage_shape(&self, ny: usize) -> (usize, usize) {
        (ny, 1)
    }

    fn slot(&self, _ny: usize, n: usize, _k: usize) -> (usize, usize) {
        (n, 0)
    }

    fn resolve(&self, ydeg: usize, idx: &YlmIndex) -> Result<Resolved, StarmapError> {
        column_inds("col", 1, &idx.col)?;
        Ok(Resolved::Column(ylm_inds(ydeg, &idx.l, &idx.m)?))
    }

    fn taylor_weights<T: Numeric>(&self, _t: T) -> Vec<T> {
        vec![T::one()]
    }
}

/// One harmonic column per wavelength bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spectral {
    pub nw: usize,
}

impl Layout for Spectral {
    const NAME: &'static str = "Spectral";

    fn nw(&self) -> usize {
        self.nw
    }

    fn ncoly(&self) -> usize {
        self.nw
    }

    fn nflx(&self) -> usize {
        self.nw
    }

    fn storage_shape(&self, ny: usize) -> (usize, usize) {
        (ny, self.nw)
    }

    fn slot(&self, _ny: usize, n: usize, k: usize) -> (usize, usize) {
        (n, k)
    }

    fn resolve(&self, ydeg: usize, idx: &YlmIndex) -> Result<Resolved, StarmapError> {
        let (rows, cols) = ylmw_inds(ydeg, self.nw, &idx.l, &idx.m, &idx.col)?;
        Ok(Resolved::Grid { rows, cols })
    }

    fn taylor_weights<T: Numeric>(&self, _t: T) -> Vec<T> {
        vec![T::one()]
    }
}

/// Harmonic coefficients plus `nt - 1` time derivatives, expanded as a Taylor
/// series at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temporal {
    pub nt: usize,
}

impl Layout for Temporal {
    const NAME: &'static str = "Temporal";

    fn nt(&self) -> usize {
        self.nt
    }

    fn ncoly(&self) -> usize {
        self.nt
    }

    fn nflx(&self) -> usize {
        1
    }

    fn storage_shape(&self, ny: usize) -> (usize, usize) {
        (ny * self.nt, 1)
    }

    fn slot(&self, ny: usize, n: usize, k: usize) -> (usize, usize) {
        (k * ny + n, 0)
    }

    fn resolve(&self, ydeg: usize, idx: &YlmIndex) -> Result<Resolved, StarmapError> {
        let (rows, ncols) = ylmt_inds(ydeg, self.nt, &idx.l, &idx.m, &idx.col)?;
        Ok(Resolved::Flattened { rows, ncols })
    }

    /// `tᵏ / k!` for `k < nt`.
    fn taylor_weights<T: Numeric>(&self, t: T) -> Vec<T> {
        let mut weights = Vec::with_capacity(self.nt);
        let mut w = T::one();
        for k in 0..self.nt {
            if k > 0 {
                w = w * t / T::cast(k as f64);
            }
            weights.push(w);
        }
        weights
    }

    // A scalar spot or image lands on the static term only.
    fn broadcast_amplitude(&self, amp: f64) -> Vec<f64> {
        let mut amps = vec![0.0; self.nt];
        if let Some(first) = amps.first_mut() {
            *first = amp;
        }
        amps
    }

    fn normalized_columns(&self) -> usize {
        1
    }
}
