//! # Symbolic coordinate resolution
//!
//! Users address map coefficients symbolically: a spherical-harmonic degree `l`,
//! an order `m`, and, for multi-column maps, a column (a wavelength bin or a
//! time-derivative order). This module turns those requests into concrete,
//! ordered index lists into the coefficient buffers. Nothing here mutates state.
//!
//! ## Index layout
//!
//! The harmonic `(l, m)` lives at row `l² + l + m`. Temporal maps stack one
//! `Ny`-row block per derivative order `k`, so `(l, m, k)` lives at row
//! `k·Ny + l² + l + m` of a single column. Limb-darkening degree `l` lives at
//! row `l` of the `u` vector.
//!
//! ## Ordering
//!
//! Wildcards expand in ascending order of the expanded index; explicit lists keep
//! the caller's order. Callers rely on this to align a flat value array
//! positionally with the resolved indices.
//!
//! ## Example
//!
//! ```rust
//! use starmap::indices::{ylm_inds, Selector};
//!
//! // Every order of degree 1: m = -1, 0, 1
//! let rows = ylm_inds(2, &Selector::Index(1), &Selector::All).unwrap();
//! assert_eq!(rows, vec![1, 2, 3]);
//!
//! // |m| > l is rejected, never clamped
//! assert!(ylm_inds(2, &Selector::Index(1), &Selector::Index(2)).is_err());
//! ```
use crate::starmap_errors::StarmapError;

/// One component of a symbolic coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A single concrete value.
    Index(i64),
    /// Several concrete values, resolved in the given order.
    List(Vec<i64>),
    /// Every valid value of this component.
    All,
}

impl From<i64> for Selector {
    fn from(v: i64) -> Self {
        Selector::Index(v)
    }
}

impl From<i32> for Selector {
    fn from(v: i32) -> Self {
        Selector::Index(v as i64)
    }
}

impl From<usize> for Selector {
    fn from(v: usize) -> Self {
        Selector::Index(v as i64)
    }
}

impl From<Vec<i64>> for Selector {
    fn from(v: Vec<i64>) -> Self {
        Selector::List(v)
    }
}

impl From<&[i64]> for Selector {
    fn from(v: &[i64]) -> Self {
        Selector::List(v.to_vec())
    }
}

impl Selector {
    fn is_wildcard(&self) -> bool {
        matches!(self, Selector::All)
    }

    /// Expand against the closed interval `[min, max]`.
    ///
    /// Concrete values outside the interval fail with
    /// [`StarmapError::IndexOutOfRange`] naming the component, and an empty
    /// list fails with [`StarmapError::EmptySelection`].
    fn expand(&self, name: &'static str, min: i64, max: i64) -> Result<Vec<i64>, StarmapError> {
        let check = |v: i64| {
            if v < min || v > max {
                Err(StarmapError::IndexOutOfRange {
                    name,
                    value: v,
                    min,
                    max,
                })
            } else {
                Ok(v)
            }
        };
        match self {
            Selector::Index(v) => Ok(vec![check(*v)?]),
            Selector::List(vs) if vs.is_empty() => Err(StarmapError::EmptySelection(format!(
                "empty list of `{name}` values"
            ))),
            Selector::List(vs) => vs.iter().map(|v| check(*v)).collect(),
            Selector::All => Ok((min..=max).collect()),
        }
    }
}

/// Symbolic coordinate of one or more harmonic coefficients.
///
/// `col` selects the wavelength bin on spectral maps and the time-derivative
/// order on temporal maps. Left unset it means "every column".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YlmIndex {
    pub l: Selector,
    pub m: Selector,
    pub col: Selector,
}

impl YlmIndex {
    /// Build an `(l, m)` coordinate spanning every column.
    pub fn new(l: impl Into<Selector>, m: impl Into<Selector>) -> Self {
        YlmIndex {
            l: l.into(),
            m: m.into(),
            col: Selector::All,
        }
    }

    /// Restrict the coordinate to the given column(s).
    pub fn col(mut self, col: impl Into<Selector>) -> Self {
        self.col = col.into();
        self
    }

    /// Every coefficient of the map.
    pub fn all() -> Self {
        YlmIndex::new(Selector::All, Selector::All)
    }
}

/// Row of the harmonic `(l, m)` in a single-column vector.
#[inline]
pub fn ylm_row(l: usize, m: i64) -> usize {
    ((l * l + l) as i64 + m) as usize
}

/// Resolve harmonic `(l, m)` selectors on a single column.
///
/// Degrees expand over `0..=ydeg`. With a wildcard degree, a concrete order only
/// picks the degrees where it is valid; with a concrete degree, an invalid order
/// is an error.
///
/// Arguments
/// -----------------
/// * `ydeg`: maximum harmonic degree of the map.
/// * `l`, `m`: degree and order selectors.
///
/// Return
/// ----------
/// * Row indices ordered by `l` then `m`, or the first violated bound.
pub fn ylm_inds(ydeg: usize, l: &Selector, m: &Selector) -> Result<Vec<usize>, StarmapError> {
    let ydeg = ydeg as i64;
    let mut rows = Vec::new();
    for ell in l.expand("l", 0, ydeg)? {
        let orders = match m.expand("m", -ell, ell) {
            Ok(orders) => orders,
            Err(_) if l.is_wildcard() => continue,
            Err(err) => return Err(err),
        };
        rows.extend(orders.into_iter().map(|em| ylm_row(ell as usize, em)));
    }
    if rows.is_empty() {
        return Err(StarmapError::EmptySelection(format!(
            "no valid (l, m) pair for l = {l:?}, m = {m:?}"
        )));
    }
    Ok(rows)
}

/// Resolve `(l, m, w)` selectors on a spectral map.
///
/// Rows and wavelength columns resolve independently; together they describe
/// the full `rows × cols` grid.
///
/// Arguments
/// -----------------
/// * `ydeg`: maximum harmonic degree.
/// * `nw`: number of wavelength bins.
/// * `l`, `m`, `w`: degree, order and wavelength selectors.
///
/// Return
/// ----------
/// * `(rows, cols)`.
pub fn ylmw_inds(
    ydeg: usize,
    nw: usize,
    l: &Selector,
    m: &Selector,
    w: &Selector,
) -> Result<(Vec<usize>, Vec<usize>), StarmapError> {
    let rows = ylm_inds(ydeg, l, m)?;
    let cols = column_inds("w", nw, w)?;
    Ok((rows, cols))
}

/// Resolve `(l, m, t)` selectors on a temporal map.
///
/// The returned rows index the flattened `(Ny·Nt) × 1` buffer and are ordered
/// `(l, m)`-major with the derivative order varying fastest. The second value is
/// the number of resolved derivative orders, needed to reshape a flat read into a
/// `(l, m) × order` matrix.
pub fn ylmt_inds(
    ydeg: usize,
    nt: usize,
    l: &Selector,
    m: &Selector,
    t: &Selector,
) -> Result<(Vec<usize>, usize), StarmapError> {
    let ny = (ydeg + 1) * (ydeg + 1);
    let lm = ylm_inds(ydeg, l, m)?;
    let orders = column_inds("t", nt, t)?;
    let rows = lm
        .iter()
        .flat_map(|n| orders.iter().map(move |k| k * ny + n))
        .collect();
    Ok((rows, orders.len()))
}

/// Resolve a column selector against `[0, ncols)`.
pub fn column_inds(name: &'static str, ncols: usize, col: &Selector) -> Result<Vec<usize>, StarmapError> {
    if ncols == 0 {
        return Err(StarmapError::Configuration(format!(
            "`{name}` has no valid columns"
        )));
    }
    Ok(col
        .expand(name, 0, ncols as i64 - 1)?
        .into_iter()
        .map(|c| c as usize)
        .collect())
}

/// Resolve limb-darkening degree selectors.
///
/// `u₀` is fixed by normalization and cannot be addressed: degrees live in
/// `[1, udeg]` and the wildcard expands to `1..=udeg`.
pub fn ul_inds(udeg: usize, l: &Selector) -> Result<Vec<usize>, StarmapError> {
    if udeg == 0 {
        return Err(StarmapError::EmptySelection(
            "map has no adjustable limb darkening coefficients".into(),
        ));
    }
    Ok(l.expand("l", 1, udeg as i64)?
        .into_iter()
        .map(|v| v as usize)
        .collect())
}
