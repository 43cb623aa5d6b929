//! # Evaluation parameters
//!
//! Resolution and quadrature settings shared by the rendering and flux
//! pipelines of a [`Map`](crate::map::Map).
use std::fmt;

use crate::starmap_errors::StarmapError;

/// Tunable settings of the evaluation pipeline.
///
/// Defaults
/// -----------------
/// * `res`: 300 pixels per side for [`Map::render`](crate::map::Map::render)
///   when no explicit resolution is requested.
/// * `flux_rings`: 100 annuli in the disk quadrature.
/// * `flux_sectors`: 200 wedges per annulus.
///
/// Notes & Validation
/// -----------------
/// * Every field must be `≥ 1`.
/// * The quadrature hides a centred occultor of radius `k / flux_rings`
///   exactly, so choose `flux_rings` accordingly when testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalParams {
    pub res: usize,
    pub flux_rings: usize,
    pub flux_sectors: usize,
}

impl EvalParams {
    pub fn builder() -> EvalParamsBuilder {
        EvalParamsBuilder::new()
    }
}

impl Default for EvalParams {
    fn default() -> Self {
        EvalParams {
            res: 300,
            flux_rings: 100,
            flux_sectors: 200,
        }
    }
}

/// Validating builder for [`EvalParams`].
#[derive(Debug, Clone)]
pub struct EvalParamsBuilder {
    params: EvalParams,
}

impl Default for EvalParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: EvalParams::default(),
        }
    }

    pub fn res(mut self, v: usize) -> Self {
        self.params.res = v;
        self
    }

    pub fn flux_rings(mut self, v: usize) -> Self {
        self.params.flux_rings = v;
        self
    }

    pub fn flux_sectors(mut self, v: usize) -> Self {
        self.params.flux_sectors = v;
        self
    }

    pub fn build(self) -> Result<EvalParams, StarmapError> {
        let p = &self.params;
        if p.res == 0 {
            return Err(StarmapError::Configuration(
                "res must be >= 1".into(),
            ));
        }
        if p.flux_rings == 0 || p.flux_sectors == 0 {
            return Err(StarmapError::Configuration(
                "flux_rings and flux_sectors must be >= 1".into(),
            ));
        }
        Ok(self.params)
    }
}

impl fmt::Display for EvalParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 32;
            writeln!(f, "Evaluation Parameters")?;
            writeln!(f, "---------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            line!("res          = {}", self.res, "Default render resolution (pixels per side)")?;
            line!("flux_rings   = {}", self.flux_rings, "Annuli in the disk quadrature")?;
            line!("flux_sectors = {}", self.flux_sectors, "Wedges per annulus")?;
            Ok(())
        } else {
            write!(
                f,
                "EvalParams(res={}, flux_rings={}, flux_sectors={})",
                self.res, self.flux_rings, self.flux_sectors
            )
        }
    }
}

#[cfg(test)]
mod eval_params_test {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = EvalParams::builder().build().unwrap();
        assert_eq!(p, EvalParams::default());
        assert_eq!(p.res, 300);
        assert_eq!(p.flux_rings, 100);
        assert_eq!(p.flux_sectors, 200);
    }

    #[test]
    fn test_validation() {
        assert!(EvalParams::builder().res(0).build().is_err());
        assert!(EvalParams::builder().flux_rings(0).build().is_err());
        assert!(EvalParams::builder().flux_sectors(0).build().is_err());
        let p = EvalParams::builder().res(1).flux_rings(7).build().unwrap();
        assert_eq!(p.flux_rings, 7);
    }

    #[test]
    fn test_display() {
        let p = EvalParams::default();
        assert_eq!(
            format!("{p}"),
            "EvalParams(res=300, flux_rings=100, flux_sectors=200)"
        );
        let pretty = format!("{p:#}");
        assert!(pretty.starts_with("Evaluation Parameters"));
        assert!(pretty.contains("flux_rings   = 100"));
    }
}
