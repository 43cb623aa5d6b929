#![allow(dead_code)]

use std::{
    cell::RefCell,
    path::{Path, PathBuf},
};

use approx::assert_relative_eq;
use nalgebra::DMatrix;
use starmap::{
    imaging::{ImagingService, ShowOptions},
    starmap_errors::StarmapError,
};

/// Element-wise closeness, treating NaN as equal to NaN.
pub fn assert_matrix_close(actual: &DMatrix<f64>, expected: &DMatrix<f64>, epsilon: f64) {
    assert_eq!(actual.shape(), expected.shape());
    for (a, e) in actual.iter().zip(expected.iter()) {
        if e.is_nan() {
            assert!(a.is_nan(), "expected NaN, got {a}");
        } else {
            assert_relative_eq!(*a, *e, epsilon = epsilon);
        }
    }
}

/// In-memory imaging backend recording what it was asked to draw.
#[derive(Default)]
pub struct RecordingImaging {
    pub coefficients: Vec<f64>,
    pub rendered: RefCell<Vec<(usize, usize, usize)>>,
    pub loaded: RefCell<Vec<(PathBuf, usize)>>,
}

impl RecordingImaging {
    pub fn with_coefficients(coefficients: Vec<f64>) -> Self {
        RecordingImaging {
            coefficients,
            ..Default::default()
        }
    }
}

impl ImagingService for RecordingImaging {
    type Handle = usize;

    fn render(
        &self,
        intensity: &DMatrix<f64>,
        res: usize,
        _options: &ShowOptions,
    ) -> Result<Self::Handle, StarmapError> {
        let frames = intensity.nrows() / (res * res);
        self.rendered
            .borrow_mut()
            .push((frames, res, intensity.ncols()));
        Ok(frames)
    }

    fn load_map(&self, path: &Path, lmax: usize, _sampling_factor: usize) -> Result<Vec<f64>, StarmapError> {
        self.loaded.borrow_mut().push((path.to_path_buf(), lmax));
        let n = (lmax + 1) * (lmax + 1);
        if self.coefficients.len() < n {
            return Err(StarmapError::Imaging("image too small".into()));
        }
        Ok(self.coefficients[..n].to_vec())
    }
}
