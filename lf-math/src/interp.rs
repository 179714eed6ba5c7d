//! One-dimensional linear interpolation with linear extrapolation.
//!
//! Lookups never fail: queries outside the sampled range extend the first or
//! last segment. Callers that need to know whether a value was extrapolated
//! use [`LinearInterpolator::evaluate_checked`] or [`LinearInterpolator::contains`].

use thiserror::Error;

/// Errors that can occur while constructing an interpolator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpolationError {
    #[error("Input vectors must have at least 2 points, got {0}")]
    InsufficientData(usize),
    #[error("Coordinate length {coords} does not match data length {data}")]
    MismatchedLengths { coords: usize, data: usize },
    #[error("{axis} coordinates must be strictly ascending (index {index})")]
    UnsortedData { axis: &'static str, index: usize },
    #[error("{axis} contains a non-finite value at index {index}")]
    NonFinite { axis: &'static str, index: usize },
}

/// Locate the segment of `coords` used to interpolate `value`.
///
/// Returns `(lower_index, upper_index, weight)` where `weight` is the fraction
/// of the way from lower to upper. Values beyond either end use the outermost
/// segment and produce a weight outside `[0, 1]`, which turns linear
/// interpolation into linear extrapolation.
///
/// `coords` must hold at least two strictly ascending values.
pub fn bracket(coords: &[f64], value: f64) -> (usize, usize, f64) {
    let n = coords.len();
    debug_assert!(n >= 2, "bracket needs at least two coordinates");

    // partition_point returns the index of the first element > value
    let upper = coords.partition_point(|&c| c <= value).clamp(1, n - 1);
    let lower = upper - 1;

    let weight = (value - coords[lower]) / (coords[upper] - coords[lower]);
    (lower, upper, weight)
}

/// Validate an axis: at least two points, finite, strictly ascending.
pub(crate) fn validate_axis(axis: &'static str, coords: &[f64]) -> Result<(), InterpolationError> {
    if coords.len() < 2 {
        return Err(InterpolationError::InsufficientData(coords.len()));
    }

    if let Some(index) = coords.iter().position(|c| !c.is_finite()) {
        return Err(InterpolationError::NonFinite { axis, index });
    }

    if let Some(index) = coords.windows(2).position(|w| w[1] <= w[0]) {
        return Err(InterpolationError::UnsortedData {
            axis,
            index: index + 1,
        });
    }

    Ok(())
}

/// Piecewise-linear curve through tabulated points.
///
/// # Examples
///
/// ```
/// use lf_math::LinearInterpolator;
///
/// let curve = LinearInterpolator::new(vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]).unwrap();
/// assert_eq!(curve.evaluate(2.5), 25.0);
///
/// let (value, in_bounds) = curve.evaluate_checked(4.0);
/// assert_eq!(value, 40.0);
/// assert!(!in_bounds);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolator {
    /// Create a new interpolator.
    ///
    /// # Arguments
    /// * `xs` - Sample coordinates (strictly ascending, finite)
    /// * `ys` - Values at each coordinate
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, InterpolationError> {
        if xs.len() != ys.len() {
            return Err(InterpolationError::MismatchedLengths {
                coords: xs.len(),
                data: ys.len(),
            });
        }
        validate_axis("X", &xs)?;

        Ok(Self { xs, ys })
    }

    /// Evaluate at `x`, extrapolating linearly outside the sampled range.
    pub fn evaluate(&self, x: f64) -> f64 {
        let (lo, hi, w) = bracket(&self.xs, x);
        self.ys[lo] + w * (self.ys[hi] - self.ys[lo])
    }

    /// Evaluate at `x` and report whether `x` was inside the sampled range.
    pub fn evaluate_checked(&self, x: f64) -> (f64, bool) {
        (self.evaluate(x), self.contains(x))
    }

    /// Check if `x` lies within the sampled range.
    pub fn contains(&self, x: f64) -> bool {
        let (min, max) = self.domain();
        x >= min && x <= max
    }

    /// Sampled range `(min, max)`.
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }
}
