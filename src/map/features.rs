//! Surface edits: permanent rotation, Gaussian spots and random maps.
use std::time::{SystemTime, UNIX_EPOCH};

use nalgebra::{DVector, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use tracing::debug;

use crate::{
    coefficients::Coefficients,
    constants::{Degree, RADEG},
    indices::ylm_row,
    kernels::spot::gaussian_zonal,
    scalar::Numeric,
    starmap_errors::StarmapError,
    variant::{Layout, LightMode},
};

use super::Map;

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

impl<L: Layout, M: LightMode, T: Numeric> Map<L, M, T> {
    /// Resolve an optional logical column into the list of columns to edit.
    fn target_columns(&self, col: Option<usize>) -> Result<Vec<usize>, StarmapError> {
        let ncoly = self.layout.ncoly();
        match col {
            None => Ok((0..ncoly).collect()),
            Some(c) if c < ncoly => Ok(vec![c]),
            Some(c) => Err(StarmapError::IndexOutOfRange {
                name: "col",
                value: c as i64,
                min: 0,
                max: ncoly as i64 - 1,
            }),
        }
    }

    /// Permanently rotate every column by `theta` degrees about the map axis.
    pub fn rotate(&mut self, theta: Degree) -> Result<(), StarmapError> {
        if theta == 0.0 {
            return Ok(());
        }
        let op = self
            .kernel()?
            .rotation(&self.axis, T::cast(theta * RADEG));
        self.apply_to_columns(&op, 0..self.layout.ncoly());
        debug!(theta, "map rotated");
        Ok(())
    }

    /// Add a Gaussian spot centred at (`lat`, `lon`).
    ///
    /// The spot profile is `exp(−(1 − cos Δ)² / (2σ²))` with `Δ` the angular
    /// distance to the centre, expanded up to degree `lmax` and scaled so that
    /// the `Y₀₀` coefficient of each column changes by its amplitude.
    ///
    /// Arguments
    /// -----------------
    /// * `amp`: one amplitude per logical column, or a scalar. On temporal maps
    ///   a scalar only affects the static term.
    /// * `sigma`: width of the profile, `> 0`.
    /// * `lat`, `lon`: centre in degrees; `(0, 0)` faces the observer.
    /// * `lmax`: expansion degree, defaults to `ydeg`.
    ///
    /// Return
    /// ----------
    /// * `Ok(())`; on error the map is unchanged.
    pub fn add_spot(
        &mut self,
        amp: impl Into<Coefficients>,
        sigma: f64,
        lat: Degree,
        lon: Degree,
        lmax: Option<usize>,
    ) -> Result<(), StarmapError> {
        let ncoly = self.layout.ncoly();
        let amps: Vec<f64> = match amp.into() {
            Coefficients::Scalar(a) => self.layout.broadcast_amplitude(a),
            Coefficients::Vector(v) if v.len() == ncoly => v.iter().copied().collect(),
            Coefficients::Vector(v) => {
                return Err(StarmapError::ShapeMismatch {
                    expected: (ncoly, 1),
                    found: (v.len(), 1),
                })
            }
            Coefficients::Matrix(_) => return Err(StarmapError::InvalidArrayShape),
        };

        let lmax = match lmax {
            Some(l) if l > self.ydeg => {
                return Err(StarmapError::Configuration(format!(
                    "spot degree {l} exceeds the map degree {}",
                    self.ydeg
                )))
            }
            Some(l) => l,
            None => self.ydeg,
        };

        let zonal = gaussian_zonal(T::cast(sigma), lmax)?;
        let c0 = zonal[0];
        if c0 == T::zero() {
            return Err(StarmapError::Kernel(format!(
                "spot of width {sigma} is too narrow to expand"
            )));
        }

        let mut spot = DVector::zeros(self.ny());
        for (l, cl) in zonal.into_iter().enumerate() {
            spot[ylm_row(l, 0)] = cl / c0;
        }

        let op = self.kernel()?.rotation_sequence(&[
            (Vector3::x_axis(), T::cast(-lat * RADEG)),
            (Vector3::y_axis(), T::cast(lon * RADEG)),
        ]);
        let spot = op * spot;

        let ny = self.ny();
        for (k, a) in amps.into_iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            let column = self.store.column(&self.layout, ny, k) + &spot * T::cast(a);
            self.store.set_column(&self.layout, ny, k, &column);
        }
        self.invalidate();
        debug!(sigma, lat, lon, lmax, "spot added");
        Ok(())
    }

    /// Draw an isotropic random map with the given angular power spectrum.
    ///
    /// When `seed` is `None` a seed is derived from the system clock and
    /// logged, so the draw can be reproduced.
    ///
    /// Arguments
    /// -----------------
    /// * `power`: power of degrees `0..power.len()`; entry 0 is ignored and
    ///   every entry must be finite and non-negative.
    /// * `seed`: optional seed of the generator.
    /// * `col`: logical column to fill, or every column when `None`.
    ///
    /// `Y₀₀` is set to 1 in normalised columns and to 0 in time-derivative
    /// columns, so a random temporal map keeps a constant luminosity.
    pub fn random(&mut self, power: &[f64], seed: Option<u64>, col: Option<usize>) -> Result<(), StarmapError> {
        let seed = seed.unwrap_or_else(clock_seed);
        debug!(seed, "random map");
        let mut rng = StdRng::seed_from_u64(seed);
        self.random_with_rng(power, &mut rng, col)
    }

    /// [`random`](Self::random) with a caller-supplied generator.
    pub fn random_with_rng(
        &mut self,
        power: &[f64],
        rng: &mut impl Rng,
        col: Option<usize>,
    ) -> Result<(), StarmapError> {
        if power.len() > self.ydeg + 1 {
            return Err(StarmapError::Configuration(format!(
                "power spectrum has {} degrees but the map stops at l = {}",
                power.len(),
                self.ydeg
            )));
        }
        if let Some(bad) = power.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(StarmapError::Configuration(format!(
                "power must be finite and non-negative (got {bad})"
            )));
        }
        let cols = self.target_columns(col)?;

        let mut draw = DVector::<T>::zeros(self.ny());
        draw[0] = T::one();
        for (l, &p) in power.iter().enumerate().skip(1) {
            let samples: Vec<f64> = (0..2 * l + 1).map(|_| rng.sample(StandardNormal)).collect();
            let norm = samples.iter().map(|s| s * s).sum::<f64>().sqrt();
            if norm == 0.0 {
                continue;
            }
            let scale = p.sqrt() / norm;
            for (i, s) in samples.into_iter().enumerate() {
                draw[l * l + i] = T::cast(s * scale);
            }
        }

        // Only the normalised columns carry the unit Y₀₀ term
        let mut derivative = draw.clone();
        derivative[0] = T::zero();
        let ny = self.ny();
        let nnorm = self.layout.normalized_columns();
        for k in cols {
            let column = if k < nnorm { &draw } else { &derivative };
            self.store.set_column(&self.layout, ny, k, column);
        }
        self.invalidate();
        Ok(())
    }
}
