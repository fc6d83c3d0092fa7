//! Breakpoint curves
//!
//! A `Curve` is a validated table of `(breakpoint, value)` pairs used for
//! speed and distance scheduled quantities such as gain schedules and
//! actuation limits. In parameter files a curve is written as
//!
//! ```toml
//! kp = { bp = [0.0, 5.0, 35.0], v = [3.6, 2.4, 1.5] }
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use thiserror::Error;

use crate::maths::interp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A piecewise-linear curve with strictly increasing breakpoints.
///
/// Curves are immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveDef")]
pub struct Curve {
    bp: Vec<f64>,
    v: Vec<f64>
}

/// Unvalidated curve as it appears in a parameter file.
#[derive(Deserialize)]
struct CurveDef {
    bp: Vec<f64>,
    v: Vec<f64>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reasons a breakpoint table cannot be made into a curve.
#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    #[error("A curve must contain at least one breakpoint")]
    Empty,

    #[error("Curve has {0} breakpoints but {1} values")]
    LengthMismatch(usize, usize),

    #[error("Curve breakpoints must be strictly increasing (index {0})")]
    NotIncreasing(usize),

    #[error("Curve contains a non-finite number at index {0}")]
    NonFinite(usize)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Curve {
    /// Build a new curve from breakpoints and values.
    pub fn new(bp: Vec<f64>, v: Vec<f64>) -> Result<Self, CurveError> {
        if bp.is_empty() {
            return Err(CurveError::Empty)
        }

        if bp.len() != v.len() {
            return Err(CurveError::LengthMismatch(bp.len(), v.len()))
        }

        for i in 0..bp.len() {
            if !bp[i].is_finite() || !v[i].is_finite() {
                return Err(CurveError::NonFinite(i))
            }
            if i > 0 && bp[i] <= bp[i - 1] {
                return Err(CurveError::NotIncreasing(i))
            }
        }

        Ok(Self { bp, v })
    }

    /// A curve which has the same value everywhere.
    pub fn constant(value: f64) -> Self {
        Self {
            bp: vec![0.0],
            v: vec![value]
        }
    }

    /// Interpolate the curve at `x`, clamping to the end values outside the
    /// breakpoint domain.
    pub fn interp(&self, x: f64) -> f64 {
        interp(x, &self.bp, &self.v)
    }

    /// The breakpoints of the curve.
    pub fn breakpoints(&self) -> &[f64] {
        &self.bp
    }

    /// The values of the curve.
    pub fn values(&self) -> &[f64] {
        &self.v
    }
}

impl Default for Curve {
    /// The zero curve.
    fn default() -> Self {
        Self::constant(0.0)
    }
}

impl TryFrom<CurveDef> for Curve {
    type Error = CurveError;

    fn try_from(def: CurveDef) -> Result<Self, Self::Error> {
        Curve::new(def.bp, def.v)
    }
}
