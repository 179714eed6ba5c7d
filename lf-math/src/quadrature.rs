//! Composite Simpson integration.

/// Integrate `f` over `[a, b]` with the composite Simpson rule.
///
/// `intervals` is rounded up to the next even number (minimum 2). Reversed
/// limits give the negated integral.
///
/// # Examples
///
/// ```
/// use lf_math::simpson;
///
/// // Simpson's rule is exact for cubics
/// let area = simpson(|x| x * x * x, 0.0, 2.0, 2);
/// assert!((area - 4.0).abs() < 1e-12);
/// ```
pub fn simpson<F>(f: F, a: f64, b: f64, intervals: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    if a == b {
        return 0.0;
    }

    let n = intervals.max(2).next_multiple_of(2);
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * f(a + i as f64 * h);
    }

    sum * h / 3.0
}
