//! Owned coefficient buffers of a map.
use std::marker::PhantomData;

use nalgebra::{DMatrix, DVector};

use crate::{
    scalar::Numeric,
    starmap_errors::StarmapError,
    variant::{Layout, LightMode},
};

/// Harmonic coefficients `y` plus the light-mode state (`u` or source).
///
/// The buffer shape is fixed by the layout at construction and never changes.
#[derive(Debug, Clone)]
pub(crate) struct CoefficientStore<M: LightMode, T: Numeric> {
    pub(crate) y: DMatrix<T>,
    pub(crate) light: M::State<T>,
    _mode: PhantomData<M>,
}

impl<M: LightMode, T: Numeric> CoefficientStore<M, T> {
    pub(crate) fn new<L: Layout>(layout: &L, ydeg: usize, udeg: usize) -> Result<Self, StarmapError> {
        let ny = (ydeg + 1) * (ydeg + 1);
        let (rows, cols) = layout.storage_shape(ny);
        let mut store = CoefficientStore {
            y: DMatrix::zeros(rows, cols),
            light: M::new_state(udeg)?,
            _mode: PhantomData,
        };
        store.reset(layout, ny);
        Ok(store)
    }

    /// Canonical state: `Y₀₀ = 1` on the normalised columns, everything else zero.
    pub(crate) fn reset<L: Layout>(&mut self, layout: &L, ny: usize) {
        self.y.fill(T::zero());
        for k in 0..layout.normalized_columns() {
            let (r, c) = layout.slot(ny, 0, k);
            self.y[(r, c)] = T::one();
        }
        M::reset_state(&mut self.light);
    }

    /// Copy of logical column `k` as a length-`ny` vector.
    pub(crate) fn column<L: Layout>(&self, layout: &L, ny: usize, k: usize) -> DVector<T> {
        DVector::from_fn(ny, |n, _| {
            let (r, c) = layout.slot(ny, n, k);
            self.y[(r, c)]
        })
    }

    pub(crate) fn set_column<L: Layout>(&mut self, layout: &L, ny: usize, k: usize, v: &DVector<T>) {
        for (n, value) in v.iter().enumerate().take(ny) {
            let (r, c) = layout.slot(ny, n, k);
            self.y[(r, c)] = *value;
        }
    }
}

#[cfg(test)]
mod store_test {
    use super::*;
    use crate::variant::{Emitted, Spectral, Temporal};

    #[test]
    fn test_reset_per_layout() {
        let spectral = CoefficientStore::<Emitted, f64>::new(&Spectral { nw: 3 }, 1, 0).unwrap();
        assert_eq!(spectral.y.row(0).iter().copied().collect::<Vec<_>>(), vec![1.0; 3]);
        assert_eq!(spectral.y.rows(1, 3).sum(), 0.0);

        let temporal = CoefficientStore::<Emitted, f64>::new(&Temporal { nt: 2 }, 1, 0).unwrap();
        assert_eq!(temporal.y[(0, 0)], 1.0);
        // Derivative blocks start at zero
        assert_eq!(temporal.y[(4, 0)], 0.0);
    }

    #[test]
    fn test_logical_columns() {
        let layout = Temporal { nt: 2 };
        let mut store = CoefficientStore::<Emitted, f64>::new(&layout, 1, 0).unwrap();
        let v = DVector::from_vec(vec![0.0, 1.0, 2.0, 3.0]);
        store.set_column(&layout, 4, 1, &v);
        assert_eq!(store.y[(7, 0)], 3.0);
        assert_eq!(store.column(&layout, 4, 1), v);
        assert_eq!(store.column(&layout, 4, 0)[0], 1.0);
    }
}
