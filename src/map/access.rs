//! Symbolic coefficient reads and writes.
//!
//! Reads return detached `f64` copies. Writes reconcile the incoming value
//! shape with the resolved index lists *before* touching the store, so a
//! rejected write leaves the map exactly as it was.
use nalgebra::{DMatrix, DVector};

use crate::{
    coefficients::Coefficients,
    indices::{ul_inds, Selector, YlmIndex},
    scalar::Numeric,
    starmap_errors::StarmapError,
    variant::{Emitted, Layout, LightMode, Resolved},
};

use super::Map;

fn squeeze_vector(values: Vec<f64>) -> Coefficients {
    match values.as_slice() {
        [single] => Coefficients::Scalar(*single),
        _ => Coefficients::Vector(DVector::from_vec(values)),
    }
}

fn squeeze_matrix(values: DMatrix<f64>) -> Coefficients {
    if values.len() == 1 {
        Coefficients::Scalar(values[(0, 0)])
    } else {
        Coefficients::Matrix(values)
    }
}

/// Reconcile `values` with a `nrows × ncols` target grid.
///
/// * rank 0 broadcasts,
/// * rank 1 fills a single column positionally, or a single row,
/// * rank 2 must match exactly.
fn grid_values(values: &Coefficients, nrows: usize, ncols: usize) -> Result<DMatrix<f64>, StarmapError> {
    match values {
        Coefficients::Scalar(v) => Ok(DMatrix::from_element(nrows, ncols, *v)),
        Coefficients::Vector(v) if ncols == 1 => {
            if v.len() != nrows {
                return Err(StarmapError::ShapeMismatch {
                    expected: (nrows, 1),
                    found: (v.len(), 1),
                });
            }
            Ok(DMatrix::from_column_slice(nrows, 1, v.as_slice()))
        }
        Coefficients::Vector(v) if nrows == 1 => {
            if v.len() != ncols {
                return Err(StarmapError::ShapeMismatch {
                    expected: (1, ncols),
                    found: (1, v.len()),
                });
            }
            Ok(DMatrix::from_row_slice(1, ncols, v.as_slice()))
        }
        Coefficients::Vector(_) => Err(StarmapError::InvalidArrayShape),
        Coefficients::Matrix(m) => {
            if m.shape() != (nrows, ncols) {
                return Err(StarmapError::ShapeMismatch {
                    expected: (nrows, ncols),
                    found: m.shape(),
                });
            }
            Ok(m.clone())
        }
    }
}

/// Reconcile `values` with a flattened temporal selection of `nlm` harmonics
/// times `ncols` derivative orders, returned in flattened row order.
fn flat_values(values: &Coefficients, nlm: usize, ncols: usize) -> Result<Vec<f64>, StarmapError> {
    let total = nlm * ncols;
    match values {
        Coefficients::Scalar(v) => Ok(vec![*v; total]),
        Coefficients::Vector(v) => {
            if v.len() != total {
                return Err(StarmapError::ShapeMismatch {
                    expected: (total, 1),
                    found: (v.len(), 1),
                });
            }
            Ok(v.iter().copied().collect())
        }
        Coefficients::Matrix(m) => {
            if m.shape() != (nlm, ncols) {
                return Err(StarmapError::ShapeMismatch {
                    expected: (nlm, ncols),
                    found: m.shape(),
                });
            }
            Ok(values.to_vec())
        }
    }
}

impl<L: Layout, M: LightMode, T: Numeric> Map<L, M, T> {
    /// Read the harmonic coefficients selected by `idx`.
    ///
    /// Arguments
    /// -----------------
    /// * `idx`: symbolic `(l, m[, col])` coordinate.
    ///
    /// Return
    /// ----------
    /// * A scalar for a single coefficient, otherwise a vector (single column)
    ///   or a matrix (`rows × wavelengths`, or `(l, m) × derivative order`).
    pub fn get(&self, idx: &YlmIndex) -> Result<Coefficients, StarmapError> {
        let y = &self.store.y;
        Ok(match self.layout.resolve(self.ydeg, idx)? {
            Resolved::Column(rows) => squeeze_vector(rows.iter().map(|&r| y[(r, 0)].as_f64()).collect()),
            Resolved::Grid { rows, cols } => squeeze_matrix(DMatrix::from_fn(rows.len(), cols.len(), |i, j| {
                y[(rows[i], cols[j])].as_f64()
            })),
            Resolved::Flattened { rows, ncols } => {
                let flat: Vec<f64> = rows.iter().map(|&r| y[(r, 0)].as_f64()).collect();
                squeeze_matrix(DMatrix::from_row_slice(flat.len() / ncols, ncols, &flat))
            }
        })
    }

    /// Write harmonic coefficients selected by `idx`.
    ///
    /// Arguments
    /// -----------------
    /// * `idx`: symbolic `(l, m[, col])` coordinate.
    /// * `values`: a scalar (broadcast), a vector aligned with the resolved
    ///   indices, or a matrix of exactly the resolved shape.
    ///
    /// Return
    /// ----------
    /// * `Ok(())`, or the resolution / shape error. On error nothing is written.
    pub fn set(&mut self, idx: &YlmIndex, values: impl Into<Coefficients>) -> Result<(), StarmapError> {
        let values = values.into();
        let writes: Vec<((usize, usize), f64)> = match self.layout.resolve(self.ydeg, idx)? {
            Resolved::Column(rows) => {
                let grid = grid_values(&values, rows.len(), 1)?;
                rows.iter().zip(grid.iter()).map(|(&r, &v)| ((r, 0), v)).collect()
            }
            Resolved::Grid { rows, cols } => {
                let grid = grid_values(&values, rows.len(), cols.len())?;
                cols.iter()
                    .enumerate()
                    .flat_map(|(j, &c)| rows.iter().enumerate().map(move |(i, &r)| ((r, c), (i, j))))
                    .map(|(slot, ij)| (slot, grid[ij]))
                    .collect()
            }
            Resolved::Flattened { rows, ncols } => {
                let flat = flat_values(&values, rows.len() / ncols, ncols)?;
                rows.iter().zip(flat).map(|(&r, v)| ((r, 0), v)).collect()
            }
        };

        for (slot, v) in writes {
            self.store.y[slot] = T::cast(v);
        }
        self.invalidate();
        Ok(())
    }
}

impl<L: Layout, T: Numeric> Map<L, Emitted, T> {
    /// Read limb-darkening coefficients of degree(s) `l ∈ [1, udeg]`.
    pub fn get_u(&self, l: impl Into<Selector>) -> Result<Coefficients, StarmapError> {
        let rows = ul_inds(self.udeg, &l.into())?;
        let u = &self.store.light.u;
        Ok(squeeze_vector(rows.iter().map(|&r| u[r].as_f64()).collect()))
    }

    /// Write limb-darkening coefficients of degree(s) `l ∈ [1, udeg]`.
    ///
    /// `u₀` is fixed at `-1` and cannot be addressed. Matrices are rejected
    /// with [`StarmapError::InvalidArrayShape`].
    pub fn set_u(&mut self, l: impl Into<Selector>, values: impl Into<Coefficients>) -> Result<(), StarmapError> {
        let rows = ul_inds(self.udeg, &l.into())?;
        let values: Vec<f64> = match values.into() {
            Coefficients::Scalar(v) => vec![v; rows.len()],
            Coefficients::Vector(v) if v.len() == rows.len() => v.iter().copied().collect(),
            Coefficients::Vector(v) => {
                return Err(StarmapError::ShapeMismatch {
                    expected: (rows.len(), 1),
                    found: (v.len(), 1),
                })
            }
            Coefficients::Matrix(_) => return Err(StarmapError::InvalidArrayShape),
        };

        for (r, v) in rows.into_iter().zip(values) {
            self.store.light.u[r] = T::cast(v);
        }
        self.invalidate();
        Ok(())
    }
}

#[cfg(test)]
mod access_test {
    use super::*;

    #[test]
    fn test_grid_values_rules() {
        let col = grid_values(&vec![1.0, 2.0, 3.0].into(), 3, 1).unwrap();
        assert_eq!(col.shape(), (3, 1));

        let row = grid_values(&vec![1.0, 2.0].into(), 1, 2).unwrap();
        assert_eq!(row, DMatrix::from_row_slice(1, 2, &[1.0, 2.0]));

        assert_eq!(
            grid_values(&vec![1.0, 2.0].into(), 2, 2),
            Err(StarmapError::InvalidArrayShape)
        );
        assert_eq!(
            grid_values(&vec![1.0, 2.0].into(), 3, 1),
            Err(StarmapError::ShapeMismatch {
                expected: (3, 1),
                found: (2, 1)
            })
        );
        assert_eq!(grid_values(&4.0.into(), 2, 3).unwrap(), DMatrix::from_element(2, 3, 4.0));
    }

    #[test]
    fn test_flat_values_row_major() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(flat_values(&m.into(), 2, 2).unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert!(flat_values(&vec![1.0].into(), 2, 2).is_err());
    }

    #[test]
    fn test_squeeze() {
        assert_eq!(squeeze_vector(vec![2.0]), Coefficients::Scalar(2.0));
        assert_eq!(squeeze_matrix(DMatrix::from_element(1, 1, 3.0)), Coefficients::Scalar(3.0));
    }
}
