//! Evaluation pipeline: time expansion, rotation, shading and projection.
//!
//! Every evaluation of a frame runs the same stages:
//!
//! 1. collapse the stored columns at the frame time (Taylor series on
//!    temporal maps, identity otherwise),
//! 2. rotate the collapsed matrix by the frame phase about the map axis,
//! 3. weight the basis by the light law of the frame,
//! 4. project on pixels ([`Map::render`]) or on the disk ([`Map::flux`]).
//!
//! Single-frame calls memoise stages 1–2 for the last `(t, θ)`; batched calls
//! run frames in parallel with [`rayon`] and never touch the memo.
use std::sync::PoisonError;

use itertools::Itertools;
use nalgebra::{DMatrix, DVector, Vector3};
use rayon::prelude::*;
use tracing::trace;

use crate::{
    constants::RADEG,
    frame::{Frame, Occultor},
    kernels::ylm::ylm_basis,
    scalar::Numeric,
    starmap_errors::StarmapError,
    variant::{Layout, LightMode, Shade},
};

use super::Map;

/// Sky-plane pixel centres of a `res × res` render, `y`-major.
pub(crate) fn pixel_grid(res: usize) -> Result<Vec<(f64, f64)>, StarmapError> {
    if res == 0 {
        return Err(StarmapError::Configuration(
            "render resolution must be >= 1".into(),
        ));
    }
    let axis: Vec<f64> = if res == 1 {
        vec![0.0]
    } else {
        let step = 2.0 / (res - 1) as f64;
        (0..res).map(|i| -1.0 + step * i as f64).collect()
    };
    Ok(axis
        .iter()
        .cartesian_product(axis.iter())
        .map(|(&y, &x)| (x, y))
        .collect())
}

/// Visible point of the unit sphere under sky-plane position `(x, y)`.
#[inline]
fn surface_point<T: Numeric>(x: f64, y: f64) -> Option<Vector3<T>> {
    let r2 = x * x + y * y;
    if r2 > 1.0 {
        return None;
    }
    let z = (1.0 - r2).sqrt();
    Some(Vector3::new(T::cast(x), T::cast(y), T::cast(z)))
}

impl<L: Layout, M: LightMode, T: Numeric> Map<L, M, T> {
    fn shader(&self, frame: &Frame) -> Result<M::Shader<T>, StarmapError> {
        M::shader(&self.store.light, frame.source.as_ref())
    }

    fn check_occultor(occultor: &Occultor) -> Result<(), StarmapError> {
        if occultor.is_active() {
            M::check_occultation()?;
        }
        Ok(())
    }

    /// Rotation operator for a phase in degrees, `None` at zero phase.
    fn phase_operator(&self, theta: f64) -> Result<Option<DMatrix<T>>, StarmapError> {
        if theta == 0.0 {
            return Ok(None);
        }
        Ok(Some(
            self.kernel()?
                .rotation(&self.axis, T::cast(theta * RADEG)),
        ))
    }

    /// Time-collapsed, rotated `Ny × nflx` coefficients of a frame.
    fn prepare(&self, frame: &Frame) -> Result<DMatrix<T>, StarmapError> {
        let collapsed = self
            .layout
            .collapse(&self.store.y, self.ny(), T::cast(frame.t));
        Ok(match self.phase_operator(frame.theta)? {
            Some(op) => op * collapsed,
            None => collapsed,
        })
    }

    /// [`prepare`](Self::prepare) through the one-entry memo.
    fn prepare_cached(&self, frame: &Frame) -> Result<DMatrix<T>, StarmapError> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.refresh();
        if let Some(hit) = cache.lookup(frame.t, frame.theta) {
            trace!(t = frame.t, theta = frame.theta, "evaluation cache hit");
            return Ok(hit.clone());
        }
        trace!(t = frame.t, theta = frame.theta, "evaluation cache miss");
        let prepared = self.prepare(frame)?;
        cache.store(frame.t, frame.theta, prepared.clone());
        Ok(prepared)
    }

    /// Intensity rows (`points × nflx`) of prepared coefficients.
    fn intensity_rows<S: Shade<T>>(
        &self,
        prepared: &DMatrix<T>,
        shader: &S,
        points: &[(f64, f64)],
    ) -> DMatrix<f64> {
        let mut out = DMatrix::from_element(points.len(), prepared.ncols(), f64::NAN);
        for (i, &(x, y)) in points.iter().enumerate() {
            let Some(p) = surface_point::<T>(x, y) else {
                continue;
            };
            let scale = shader.weight(&p) / T::pi();
            let values = prepared.tr_mul(&ylm_basis(self.ydeg, &p)) * scale;
            for (j, v) in values.iter().enumerate() {
                out[(i, j)] = v.as_f64();
            }
        }
        out
    }

    fn flux_of(&self, prepared: &DMatrix<T>, frame: &Frame, occultor: &Occultor) -> Result<DVector<f64>, StarmapError> {
        Self::check_occultor(occultor)?;
        let shader = self.shader(frame)?;
        let s = self.quadrature()?.projection(self.ydeg, &shader, occultor);
        Ok(prepared.tr_mul(&s).map(|v| v.as_f64()))
    }

    /// Expand a `Ny` design row over the stored blocks with the Taylor weights of `t`.
    fn expand_row(&self, row: &DVector<T>, t: f64) -> Vec<f64> {
        self.layout
            .taylor_weights(T::cast(t))
            .into_iter()
            .flat_map(|w| row.iter().map(move |&v| (w * v).as_f64()))
            .collect()
    }

    /// Specific intensity at the sky-plane point `(x, y)`, one value per flux column.
    ///
    /// Points off the disk evaluate to NaN.
    pub fn intensity(&self, frame: &Frame, x: f64, y: f64) -> Result<DVector<f64>, StarmapError> {
        let rows = self.intensity_at(frame, &[(x, y)])?;
        Ok(rows.row(0).transpose())
    }

    /// Specific intensity at several sky-plane points, `points × nflx`.
    pub fn intensity_at(&self, frame: &Frame, points: &[(f64, f64)]) -> Result<DMatrix<f64>, StarmapError> {
        let shader = self.shader(frame)?;
        let prepared = self.prepare_cached(frame)?;
        Ok(self.intensity_rows(&prepared, &shader, points))
    }

    /// Render the disk on a `res × res` grid spanning `[-1, 1]²`.
    ///
    /// Arguments
    /// -----------------
    /// * `frame`: time, phase and optional source of the frame.
    /// * `res`: pixels per side, at least 1.
    ///
    /// Return
    /// ----------
    /// * A `res² × nflx` matrix; row `j·res + i` is the pixel at
    ///   `(xᵢ, yⱼ)`. Pixels off the disk hold NaN.
    pub fn render(&self, frame: &Frame, res: usize) -> Result<DMatrix<f64>, StarmapError> {
        let grid = pixel_grid(res)?;
        trace!(res, theta = frame.theta, t = frame.t, "render frame");
        self.intensity_at(frame, &grid)
    }

    /// Render several frames in parallel.
    ///
    /// Return
    /// ----------
    /// * A `(frames · res²) × nflx` matrix, frame blocks in input order, equal
    ///   to stacking sequential [`render`](Self::render) calls.
    pub fn render_frames(&self, frames: &[Frame], res: usize) -> Result<DMatrix<f64>, StarmapError> {
        let grid = pixel_grid(res)?;
        let blocks = frames
            .par_iter()
            .map(|frame| {
                trace!(res, theta = frame.theta, t = frame.t, "render frame (batch)");
                let shader = self.shader(frame)?;
                let prepared = self.prepare(frame)?;
                Ok(self.intensity_rows(&prepared, &shader, &grid))
            })
            .collect::<Result<Vec<_>, StarmapError>>()?;
        Ok(stack_rows(&blocks, grid.len(), self.layout.nflx()))
    }

    /// Disk-integrated flux of a frame, one value per flux column.
    ///
    /// A uniform, unocculted map has unit flux.
    pub fn flux(&self, frame: &Frame, occultor: &Occultor) -> Result<DVector<f64>, StarmapError> {
        let prepared = self.prepare_cached(frame)?;
        self.flux_of(&prepared, frame, occultor)
    }

    /// Flux of several frames in parallel, `frames × nflx`.
    ///
    /// `occultors` holds either one occultor per frame or a single occultor
    /// shared by all frames.
    pub fn flux_frames(&self, frames: &[Frame], occultors: &[Occultor]) -> Result<DMatrix<f64>, StarmapError> {
        let occultors = pair_occultors(frames.len(), occultors)?;
        let rows = frames
            .par_iter()
            .zip(occultors.par_iter())
            .map(|(frame, occultor)| {
                let prepared = self.prepare(frame)?;
                self.flux_of(&prepared, frame, occultor)
            })
            .collect::<Result<Vec<_>, StarmapError>>()?;

        let nflx = self.layout.nflx();
        Ok(DMatrix::from_fn(rows.len(), nflx, |i, j| rows[i][j]))
    }

    /// Linear intensity operator at sky-plane points.
    ///
    /// Return
    /// ----------
    /// * A `points × rows(y)` matrix `A` such that `A · y` is the intensity of
    ///   each stored column at `frame`. Rows of off-disk points hold NaN.
    pub fn linear_intensity_model(
        &self,
        frame: &Frame,
        points: &[(f64, f64)],
    ) -> Result<DMatrix<f64>, StarmapError> {
        let shader = self.shader(frame)?;
        let op = self.phase_operator(frame.theta)?;
        let width = self.store.y.nrows();

        let mut out = DMatrix::from_element(points.len(), width, f64::NAN);
        for (i, &(x, y)) in points.iter().enumerate() {
            let Some(p) = surface_point::<T>(x, y) else {
                continue;
            };
            let b = ylm_basis(self.ydeg, &p) * (shader.weight(&p) / T::pi());
            let row = match &op {
                Some(d) => d.tr_mul(&b),
                None => b,
            };
            for (j, v) in self.expand_row(&row, frame.t).into_iter().enumerate() {
                out[(i, j)] = v;
            }
        }
        Ok(out)
    }

    /// Linear flux operator over several frames.
    ///
    /// Return
    /// ----------
    /// * A `frames × rows(y)` matrix `A` such that `A · y` equals
    ///   [`flux_frames`](Self::flux_frames), or a
    ///   [`StarmapError::Capability`] on reflected-light maps.
    pub fn linear_flux_model(&self, frames: &[Frame], occultors: &[Occultor]) -> Result<DMatrix<f64>, StarmapError> {
        M::check_linear_flux()?;
        let occultors = pair_occultors(frames.len(), occultors)?;
        let quadrature = self.quadrature()?;

        let rows = frames
            .par_iter()
            .zip(occultors.par_iter())
            .map(|(frame, occultor)| {
                Self::check_occultor(occultor)?;
                let shader = self.shader(frame)?;
                let s = quadrature.projection(self.ydeg, &shader, occultor);
                let row = match self.phase_operator(frame.theta)? {
                    Some(d) => d.tr_mul(&s),
                    None => s,
                };
                Ok(self.expand_row(&row, frame.t))
            })
            .collect::<Result<Vec<_>, StarmapError>>()?;

        let width = self.store.y.nrows();
        Ok(DMatrix::from_fn(rows.len(), width, |i, j| rows[i][j]))
    }
}

fn pair_occultors(nframes: usize, occultors: &[Occultor]) -> Result<Vec<Occultor>, StarmapError> {
    match occultors.len() {
        n if n == nframes => Ok(occultors.to_vec()),
        1 => Ok(vec![occultors[0]; nframes]),
        0 => Ok(vec![Occultor::none(); nframes]),
        n => Err(StarmapError::ShapeMismatch {
            expected: (nframes, 1),
            found: (n, 1),
        }),
    }
}

fn stack_rows(blocks: &[DMatrix<f64>], block_rows: usize, ncols: usize) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(blocks.len() * block_rows, ncols);
    for (k, block) in blocks.iter().enumerate() {
        out.rows_mut(k * block_rows, block_rows).copy_from(block);
    }
    out
}
