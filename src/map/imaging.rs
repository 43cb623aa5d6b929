//! Bridges between a map and an [`ImagingService`].
use std::path::Path;

use nalgebra::{DVector, Vector3};
use tracing::{debug, warn};

use crate::{
    constants::RADEG,
    frame::Frame,
    imaging::{ImagingService, ShowOptions},
    scalar::Numeric,
    starmap_errors::StarmapError,
    variant::{Layout, LightMode},
};

use super::Map;

impl<L: Layout, M: LightMode, T: Numeric> Map<L, M, T> {
    fn show_res(&self, options: &ShowOptions) -> usize {
        options.res.unwrap_or(self.params.res)
    }

    /// Render one frame and hand it to the imaging service.
    pub fn show<S: ImagingService>(
        &self,
        imaging: &S,
        frame: &Frame,
        options: &ShowOptions,
    ) -> Result<S::Handle, StarmapError> {
        let res = self.show_res(options);
        let image = self.render(frame, res)?;
        imaging.render(&image, res, options)
    }

    /// Render an animation over `frames` and hand it to the imaging service.
    pub fn animate<S: ImagingService>(
        &self,
        imaging: &S,
        frames: &[Frame],
        options: &ShowOptions,
    ) -> Result<S::Handle, StarmapError> {
        let res = self.show_res(options);
        let images = self.render_frames(frames, res)?;
        debug!(frames = frames.len(), res, "animation rendered");
        imaging.render(&images, res, options)
    }

    /// Replace the low-degree coefficients with the expansion of an image.
    ///
    /// The image is expanded by the imaging service, optionally normalised by
    /// its `Y₀₀` term, written into the target column(s), and re-oriented from
    /// the image frame (latitude–longitude with the north pole up) to the map
    /// frame by rotations of −90° about `x̂` and then `ŷ`.
    ///
    /// Arguments
    /// -----------------
    /// * `imaging`: backend performing the expansion.
    /// * `path`: image file.
    /// * `lmax`: expansion degree; clamped to `ydeg` with a warning.
    /// * `col`: logical column to fill, or every column when `None`.
    /// * `normalize`: divide by the first coefficient so that `Y₀₀ = 1`.
    /// * `sampling_factor`: oversampling forwarded to the backend.
    pub fn load_image<S: ImagingService>(
        &mut self,
        imaging: &S,
        path: &Path,
        lmax: Option<usize>,
        col: Option<usize>,
        normalize: bool,
        sampling_factor: usize,
    ) -> Result<(), StarmapError> {
        let lmax = match lmax {
            Some(l) if l > self.ydeg => {
                warn!(requested = l, ydeg = self.ydeg, "image degree clamped to the map degree");
                self.ydeg
            }
            Some(l) => l,
            None => self.ydeg,
        };
        let cols: Vec<usize> = match col {
            None => (0..self.layout.ncoly()).collect(),
            Some(c) if c < self.layout.ncoly() => vec![c],
            Some(c) => {
                return Err(StarmapError::IndexOutOfRange {
                    name: "col",
                    value: c as i64,
                    min: 0,
                    max: self.layout.ncoly() as i64 - 1,
                })
            }
        };

        let nlm = (lmax + 1) * (lmax + 1);
        let mut coeffs = imaging.load_map(path, lmax, sampling_factor)?;
        if coeffs.len() < nlm {
            return Err(StarmapError::Imaging(format!(
                "expected {nlm} coefficients for lmax = {lmax}, got {}",
                coeffs.len()
            )));
        }
        coeffs.truncate(nlm);
        if normalize {
            let y00 = coeffs[0];
            if y00 == 0.0 || !y00.is_finite() {
                return Err(StarmapError::Imaging(
                    "cannot normalise an image with a vanishing mean".into(),
                ));
            }
            coeffs.iter_mut().for_each(|c| *c /= y00);
        }

        let reorient = self.kernel()?.rotation_sequence(&[
            (Vector3::x_axis(), T::cast(-90.0 * RADEG)),
            (Vector3::y_axis(), T::cast(-90.0 * RADEG)),
        ]);

        let ny = self.ny();
        for &k in &cols {
            let mut column = self.store.column(&self.layout, ny, k);
            for (n, c) in coeffs.iter().enumerate() {
                column[n] = T::cast(*c);
            }
            let column: DVector<T> = &reorient * column;
            self.store.set_column(&self.layout, ny, k, &column);
        }
        self.invalidate();
        debug!(path = %path.display(), lmax, columns = cols.len(), "image loaded");
        Ok(())
    }
}
