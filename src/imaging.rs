//! # Imaging collaborator
//!
//! Turning an intensity buffer into pixels on a screen (or a GIF on disk), and
//! turning an image file into harmonic coefficients, are delegated to an
//! external service. The crate only defines the contract in
//! [`ImagingService`]; hosts plug in their own backend.
//!
//! ## See also
//! ------------
//! * [`Map::show`](crate::map::Map::show) / [`Map::animate`](crate::map::Map::animate)
//! * [`Map::load_image`](crate::map::Map::load_image)
use std::path::{Path, PathBuf};

use nalgebra::DMatrix;

use crate::starmap_errors::StarmapError;

/// Display settings forwarded to the imaging service.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowOptions {
    /// Pixels per side; `None` uses the map's [`EvalParams`](crate::eval_params::EvalParams).
    pub res: Option<usize>,
    pub cmap: String,
    /// Delay between animation frames, in milliseconds.
    pub interval: u32,
    /// Write the animation to this file instead of displaying it.
    pub gif: Option<PathBuf>,
}

impl Default for ShowOptions {
    fn default() -> Self {
        ShowOptions {
            res: None,
            cmap: "plasma".into(),
            interval: 75,
            gif: None,
        }
    }
}

/// External rendering and image-import backend.
pub trait ImagingService {
    type Handle;

    /// Display an intensity buffer.
    ///
    /// Arguments
    /// -----------------
    /// * `intensity`: `(frames · res²) × nflx` buffer as produced by
    ///   [`Map::render_frames`](crate::map::Map::render_frames); NaN marks
    ///   pixels off the disk.
    /// * `res`: pixels per side.
    /// * `options`: colormap, frame interval and optional output path.
    fn render(
        &self,
        intensity: &DMatrix<f64>,
        res: usize,
        options: &ShowOptions,
    ) -> Result<Self::Handle, StarmapError>;

    /// Expand an image file on the harmonics up to `lmax`.
    ///
    /// Return
    /// ----------
    /// * At least `(lmax + 1)²` coefficients in `l² + l + m` order.
    fn load_map(&self, path: &Path, lmax: usize, sampling_factor: usize) -> Result<Vec<f64>, StarmapError>;
}
