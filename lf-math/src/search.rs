//! Inversion of monotone tabulated rows.
//!
//! Given a grid `xs` and a row of values `ys(xs)` that is non-decreasing, find
//! the `x` at which the row reaches a target value. The search is a binary
//! search for the first sample that meets or exceeds the target followed by
//! linear refinement between the bracketing samples.

/// Invert a non-decreasing row at `target`.
///
/// Targets below the first value or above the last are linearly extrapolated
/// from the first or last segment. Values of `-inf` in the row (the logarithm
/// of an underflowed zero) sort below every finite target; when the lower
/// bracket is not finite the upper grid value is returned instead of a NaN.
/// A row that is locally decreasing still yields a value, but it is only
/// meaningful where the row is monotone.
///
/// # Panics
/// Panics if `xs` and `ys` differ in length or hold fewer than 2 samples.
///
/// # Examples
///
/// ```
/// use lf_math::invert_monotone;
///
/// let mags = [-22.0, -21.0, -20.0];
/// let log_n = [-6.0, -4.0, -3.0];
/// assert_eq!(invert_monotone(&mags, &log_n, -5.0), -21.5);
/// ```
pub fn invert_monotone(xs: &[f64], ys: &[f64], target: f64) -> f64 {
    assert_eq!(xs.len(), ys.len(), "Grid and row must have same length");
    assert!(xs.len() >= 2, "Need at least 2 samples to invert a row");

    let n = ys.len();
    // First index whose value meets or exceeds the target
    let idx = ys.partition_point(|&v| v < target).clamp(1, n - 1);

    let (x0, x1) = (xs[idx - 1], xs[idx]);
    let (y0, y1) = (ys[idx - 1], ys[idx]);

    if !y0.is_finite() {
        return x1;
    }
    if !y1.is_finite() || y1 == y0 {
        return x0;
    }

    let frac = (target - y0) / (y1 - y0);
    x0 + frac * (x1 - x0)
}

/// Count the steps where a row decreases.
pub fn count_decreasing(ys: &[f64]) -> usize {
    ys.windows(2).filter(|w| w[1] < w[0]).count()
}
