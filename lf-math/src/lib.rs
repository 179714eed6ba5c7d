//! lf-math - Numerical building blocks for luminosity-function tables
//!
//! This crate provides the grid-based numerics used to build and query
//! luminosity-function lookup tables:
//!
//! - **AxisRange** - `start:stop:step` sample axes with half-open semantics
//! - **Interpolation** - 1-D and 2-D linear interpolation with extrapolation
//! - **Spline** - Interpolating cubic spline that extrapolates with its end segments
//! - **Search** - Inversion of monotone tabulated rows
//! - **Quadrature** - Composite Simpson integration
//!
//! # Example
//!
//! ```
//! use lf_math::{AxisRange, LinearInterpolator};
//!
//! let xs = AxisRange::new(0.0, 1.0, 0.25).to_vec().unwrap();
//! let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x).collect();
//! let line = LinearInterpolator::new(xs, ys).unwrap();
//!
//! assert!((line.evaluate(0.5) - 1.0).abs() < 1e-12);
//! // Outside the samples the end segment is extended
//! assert!((line.evaluate(2.0) - 4.0).abs() < 1e-12);
//! ```

pub mod axis;
pub mod bilinear;
pub mod interp;
pub mod quadrature;
pub mod search;
pub mod spline;

// Re-export commonly used types
pub use axis::{AxisError, AxisRange};
pub use bilinear::BilinearInterpolator;
pub use interp::{bracket, InterpolationError, LinearInterpolator};
pub use quadrature::simpson;
pub use search::{count_decreasing, invert_monotone};
pub use spline::{CubicSpline, SplineError};
