//! Memo of the last prepared coefficient matrix.
//!
//! Preparing a frame (time expansion followed by rotation) dominates the cost
//! of repeated renders at a fixed phase. The cache keeps the last
//! `(t, θ) → prepared` pair and is dropped wholesale as soon as a mutation
//! has flagged it dirty.
use nalgebra::DMatrix;

use crate::scalar::Numeric;

#[derive(Debug, Clone)]
pub(crate) struct EvalCache<T: Numeric> {
    dirty: bool,
    entry: Option<((u64, u64), DMatrix<T>)>,
}

impl<T: Numeric> Default for EvalCache<T> {
    fn default() -> Self {
        EvalCache {
            dirty: false,
            entry: None,
        }
    }
}

impl<T: Numeric> EvalCache<T> {
    #[inline]
    fn key(t: f64, theta: f64) -> (u64, u64) {
        (t.to_bits(), theta.to_bits())
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Drop the memo if a mutation happened since the last evaluation.
    pub(crate) fn refresh(&mut self) {
        if self.is_dirty() {
            self.entry = None;
            self.dirty = false;
        }
    }

    pub(crate) fn lookup(&self, t: f64, theta: f64) -> Option<&DMatrix<T>> {
        match &self.entry {
            Some((key, prepared)) if *key == Self::key(t, theta) => Some(prepared),
            _ => None,
        }
    }

    pub(crate) fn store(&mut self, t: f64, theta: f64, prepared: DMatrix<T>) {
        self.entry = Some((Self::key(t, theta), prepared));
    }
}
