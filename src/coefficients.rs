//! Rank-0/1/2 containers exchanged with callers by the coefficient accessors.
//!
//! The same type carries values *into* [`Map::set`](crate::map::Map::set) and
//! *out of* [`Map::get`](crate::map::Map::get). Reads always hand back a fresh,
//! owned copy in `f64`; nothing returned here aliases the live store.
use std::fmt;

use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, PartialEq)]
pub enum Coefficients {
    Scalar(f64),
    Vector(DVector<f64>),
    Matrix(DMatrix<f64>),
}

impl Coefficients {
    pub fn rank(&self) -> usize {
        match self {
            Coefficients::Scalar(_) => 0,
            Coefficients::Vector(_) => 1,
            Coefficients::Matrix(_) => 2,
        }
    }

    /// Number of values held.
    pub fn len(&self) -> usize {
        match self {
            Coefficients::Scalar(_) => 1,
            Coefficients::Vector(v) => v.len(),
            Coefficients::Matrix(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value of a rank-0 container.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Coefficients::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&DVector<f64>> {
        match self {
            Coefficients::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&DMatrix<f64>> {
        match self {
            Coefficients::Matrix(m) => Some(m),
            _ => None,
        }
    }

    /// Values in row-major order, whatever the rank.
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Coefficients::Scalar(v) => vec![*v],
            Coefficients::Vector(v) => v.iter().copied().collect(),
            Coefficients::Matrix(m) => m.transpose().iter().copied().collect(),
        }
    }
}

impl From<f64> for Coefficients {
    fn from(v: f64) -> Self {
        Coefficients::Scalar(v)
    }
}

impl From<Vec<f64>> for Coefficients {
    fn from(v: Vec<f64>) -> Self {
        Coefficients::Vector(DVector::from_vec(v))
    }
}

impl From<&[f64]> for Coefficients {
    fn from(v: &[f64]) -> Self {
        Coefficients::Vector(DVector::from_column_slice(v))
    }
}

impl<const N: usize> From<[f64; N]> for Coefficients {
    fn from(v: [f64; N]) -> Self {
        Coefficients::Vector(DVector::from_column_slice(&v))
    }
}

impl From<DVector<f64>> for Coefficients {
    fn from(v: DVector<f64>) -> Self {
        Coefficients::Vector(v)
    }
}

impl From<DMatrix<f64>> for Coefficients {
    fn from(m: DMatrix<f64>) -> Self {
        Coefficients::Matrix(m)
    }
}

impl fmt::Display for Coefficients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coefficients::Scalar(v) => write!(f, "{v}"),
            Coefficients::Vector(v) => write!(f, "{}", v.transpose()),
            Coefficients::Matrix(m) => write!(f, "{m}"),
        }
    }
}
