//! Error type shared by every luminosity-function component.

use std::path::PathBuf;

use lf_math::{AxisError, InterpolationError, SplineError};
use thiserror::Error;

/// Errors raised while building or using luminosity-function components.
///
/// Construction-time problems (bad parameters, malformed files, non-finite
/// table entries) are fatal for the object being built. Lookups outside a
/// table's sampled range are never errors; they extrapolate.
#[derive(Debug, Error)]
pub enum LuminosityError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Non-finite value while building table: {0}")]
    NumericDomain(String),

    #[error("Redshift {redshift} is outside the rescaling range [{min}, {max}]")]
    RedshiftOutOfRange { redshift: f64, min: f64, max: f64 },

    #[error("Number density {0} is negative or not finite")]
    InvalidDensity(f64),

    #[error("Input length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Invalid axis: {0}")]
    Axis(#[from] AxisError),

    #[error("Interpolation setup failed: {0}")]
    Interpolation(#[from] InterpolationError),

    #[error("Spline fit failed: {0}")]
    Spline(#[from] SplineError),
}

pub type Result<T> = std::result::Result<T, LuminosityError>;
