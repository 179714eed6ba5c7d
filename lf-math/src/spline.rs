//! Cubic spline interpolation for smooth curve fitting
//!
//! Natural cubic spline (second derivatives zero at the endpoints) through a
//! set of data points. Each segment has the form
//!
//! S(x) = a + b(x-xi) + c(x-xi)² + d(x-xi)³
//!
//! and the whole curve is C² continuous. Outside the knot range the first and
//! last segment polynomials are extended, so the spline extrapolates instead of
//! clamping to the boundary value.
//!
//! # Examples
//!
//! ```rust
//! use lf_math::spline::CubicSpline;
//!
//! let x = vec![0.0, 1.0, 2.0, 3.0];
//! let y = vec![0.0, 1.0, 4.0, 9.0];
//! let spline = CubicSpline::new(x, y).unwrap();
//!
//! assert!((spline.evaluate(2.0) - 4.0).abs() < 1e-12);
//! let beyond = spline.evaluate(3.5);
//! assert!(beyond > 9.0);
//! ```

use thiserror::Error;

/// Errors that can occur when fitting a spline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineError {
    #[error("X and Y vectors must have same length ({x} vs {y})")]
    MismatchedLengths { x: usize, y: usize },
    #[error("Need at least 2 points for interpolation, got {0}")]
    InsufficientData(usize),
    #[error("X values must be sorted in ascending order (index {0})")]
    UnsortedData(usize),
    #[error("Non-finite knot value at index {0}")]
    NonFinite(usize),
}

#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    coeffs: Vec<[f64; 4]>, // a, b, c, d coefficients for each segment
}

impl CubicSpline {
    /// Create a new cubic spline from input points
    ///
    /// # Arguments
    /// * `x` - X coordinates (strictly ascending, finite)
    /// * `y` - Y coordinates corresponding to x values (finite)
    ///
    /// # Performance
    /// Construction time is O(n) where n is the number of points.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, SplineError> {
        if x.len() != y.len() {
            return Err(SplineError::MismatchedLengths {
                x: x.len(),
                y: y.len(),
            });
        }
        if x.len() < 2 {
            return Err(SplineError::InsufficientData(x.len()));
        }
        if let Some(i) = (0..x.len()).find(|&i| !x[i].is_finite() || !y[i].is_finite()) {
            return Err(SplineError::NonFinite(i));
        }
        if let Some(i) = (1..x.len()).find(|&i| x[i] <= x[i - 1]) {
            return Err(SplineError::UnsortedData(i));
        }

        let coeffs = natural_coefficients(&x, &y);
        Ok(CubicSpline { x, coeffs })
    }

    /// Evaluate the spline at a given x value
    ///
    /// Uses binary search to locate the segment. Values outside the knot
    /// range are evaluated on the nearest end segment's polynomial.
    pub fn evaluate(&self, x: f64) -> f64 {
        let segment = self.find_segment(x);
        let dx = x - self.x[segment];
        let [a, b, c, d] = self.coeffs[segment];

        a + dx * (b + dx * (c + dx * d))
    }

    /// Knot range `(min, max)`.
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Index of the segment whose polynomial is used at `x`.
    fn find_segment(&self, x: f64) -> usize {
        let segments = self.coeffs.len();
        self.x
            .partition_point(|&knot| knot <= x)
            .saturating_sub(1)
            .min(segments - 1)
    }
}

/// Solve the tridiagonal system for a natural spline (Thomas algorithm) and
/// return `[a, b, c, d]` for each segment.
fn natural_coefficients(x: &[f64], y: &[f64]) -> Vec<[f64; 4]> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    let mut alpha = vec![0.0; n - 1];
    for i in 1..n - 1 {
        alpha[i] = (3.0 / h[i]) * (y[i + 1] - y[i]) - (3.0 / h[i - 1]) * (y[i] - y[i - 1]);
    }

    let mut l = vec![1.0; n];
    let mut mu = vec![0.0; n];
    let mut z = vec![0.0; n];

    for i in 1..n - 1 {
        l[i] = 2.0 * (x[i + 1] - x[i - 1]) - h[i - 1] * mu[i - 1];
        mu[i] = h[i] / l[i];
        z[i] = (alpha[i] - h[i - 1] * z[i - 1]) / l[i];
    }

    let mut c = vec![0.0; n];
    let mut coeffs = vec![[0.0; 4]; n - 1];

    // Back substitution
    for j in (0..n - 1).rev() {
        c[j] = z[j] - mu[j] * c[j + 1];
        let b = (y[j + 1] - y[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
        let d = (c[j + 1] - c[j]) / (3.0 * h[j]);
        coeffs[j] = [y[j], b, c[j], d];
    }

    coeffs
}
