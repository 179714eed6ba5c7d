//! Sample axes described as `start:stop:step`.
//!
//! Axes are half-open: `stop` itself is never produced, and the number of
//! samples is `ceil((stop - start) / step)`. Each sample is computed as
//! `start + i * step` rather than by repeated addition so long axes do not
//! accumulate rounding drift.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing or expanding an axis specification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AxisError {
    #[error("Axis must be in format 'start:stop:step', got '{0}'")]
    Format(String),

    #[error("Invalid {component} value '{value}'")]
    InvalidNumber {
        component: &'static str,
        value: String,
    },

    #[error("Axis values must be finite")]
    NonFinite,

    #[error("Step size cannot be zero")]
    ZeroStep,

    #[error("Step {step} does not move from {start} towards {stop}")]
    WrongDirection { start: f64, stop: f64, step: f64 },
}

/// A sampled axis in `start:stop:step` form.
///
/// Serialized as the string `"start:stop:step"` so configuration files stay
/// readable.
///
/// # Examples
/// - Redshift rows: `"0:1:0.01"` gives 0.00, 0.01, ..., 0.99
/// - Magnitude grid: `"-25:0:0.001"` gives 25000 samples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AxisRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl AxisRange {
    /// Create an axis without validating it; validation happens in [`AxisRange::to_vec`].
    pub const fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    /// Check the axis is finite, has a non-zero step, and steps towards `stop`.
    pub fn validate(&self) -> Result<(), AxisError> {
        let (start, stop, step) = (self.start, self.stop, self.step);

        if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
            return Err(AxisError::NonFinite);
        }

        if step == 0.0 {
            return Err(AxisError::ZeroStep);
        }

        if (stop - start) * step <= 0.0 {
            return Err(AxisError::WrongDirection { start, stop, step });
        }

        Ok(())
    }

    /// Number of samples on the axis.
    pub fn len(&self) -> Result<usize, AxisError> {
        self.validate()?;
        Ok(((self.stop - self.start) / self.step).ceil() as usize)
    }

    /// Whether the axis has no samples.
    pub fn is_empty(&self) -> bool {
        matches!(self.len(), Ok(0) | Err(_))
    }

    /// Generate every sample on the axis.
    ///
    /// # Returns
    /// `Ok(Vec<f64>)` with `start + i * step` for `i` in `0..len`
    /// `Err(AxisError)` if the axis is malformed
    pub fn to_vec(&self) -> Result<Vec<f64>, AxisError> {
        let n = self.len()?;
        Ok((0..n).map(|i| self.start + i as f64 * self.step).collect())
    }
}

impl FromStr for AxisRange {
    type Err = AxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(AxisError::Format(s.to_string()));
        }

        let parse = |component: &'static str, value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| AxisError::InvalidNumber {
                    component,
                    value: value.trim().to_string(),
                })
        };

        let axis = AxisRange::new(
            parse("start", parts[0])?,
            parse("stop", parts[1])?,
            parse("step", parts[2])?,
        );
        axis.validate()?;
        Ok(axis)
    }
}

impl TryFrom<String> for AxisRange {
    type Error = AxisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AxisRange> for String {
    fn from(axis: AxisRange) -> Self {
        axis.to_string()
    }
}

impl fmt::Display for AxisRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.start, self.stop, self.step)
    }
}
