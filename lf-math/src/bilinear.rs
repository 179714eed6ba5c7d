//! Bilinear interpolation on rectangular 2D grids.
//!
//! The grid may be irregularly spaced along either axis. Queries outside the
//! grid are linearly extrapolated from the outermost cells, so a lookup always
//! yields a number; [`BilinearInterpolator::contains`] tells the caller whether
//! the result was interpolated or extrapolated.

use ndarray::Array2;

use crate::interp::{bracket, validate_axis, InterpolationError};

/// Bilinear interpolator for 2D data on a rectangular grid.
///
/// Data is indexed as `data[[x_index, y_index]]`, i.e. the first array axis
/// follows `x_coords` and the second follows `y_coords`.
#[derive(Debug, Clone)]
pub struct BilinearInterpolator {
    /// X-axis coordinates (strictly ascending)
    x_coords: Vec<f64>,
    /// Y-axis coordinates (strictly ascending)
    y_coords: Vec<f64>,
    /// 2D data array with shape (x_coords.len(), y_coords.len())
    data: Array2<f64>,
}

impl BilinearInterpolator {
    /// Create a new bilinear interpolator.
    ///
    /// # Arguments
    /// * `x_coords` - X-axis coordinates (strictly ascending, at least 2)
    /// * `y_coords` - Y-axis coordinates (strictly ascending, at least 2)
    /// * `data` - 2D data array with shape (x_coords.len(), y_coords.len())
    pub fn new(
        x_coords: Vec<f64>,
        y_coords: Vec<f64>,
        data: Array2<f64>,
    ) -> Result<Self, InterpolationError> {
        validate_axis("X", &x_coords)?;
        validate_axis("Y", &y_coords)?;

        let (nx, ny) = data.dim();
        if nx != x_coords.len() {
            return Err(InterpolationError::MismatchedLengths {
                coords: x_coords.len(),
                data: nx,
            });
        }
        if ny != y_coords.len() {
            return Err(InterpolationError::MismatchedLengths {
                coords: y_coords.len(),
                data: ny,
            });
        }

        Ok(Self {
            x_coords,
            y_coords,
            data,
        })
    }

    /// Evaluate at `(x, y)`, extrapolating linearly beyond the grid.
    pub fn extrapolate(&self, x: f64, y: f64) -> f64 {
        let (x_low, x_high, x_weight) = bracket(&self.x_coords, x);
        let (y_low, y_high, y_weight) = bracket(&self.y_coords, y);

        // Get the four corner values
        let q11 = self.data[[x_low, y_low]];
        let q12 = self.data[[x_low, y_high]];
        let q21 = self.data[[x_high, y_low]];
        let q22 = self.data[[x_high, y_high]];

        q11 * (1.0 - x_weight) * (1.0 - y_weight)
            + q21 * x_weight * (1.0 - y_weight)
            + q12 * (1.0 - x_weight) * y_weight
            + q22 * x_weight * y_weight
    }

    /// Check if `(x, y)` lies inside the sampled grid.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let within = |coords: &[f64], v: f64| v >= coords[0] && v <= coords[coords.len() - 1];
        within(&self.x_coords, x) && within(&self.y_coords, y)
    }

    pub fn x_coords(&self) -> &[f64] {
        &self.x_coords
    }

    pub fn y_coords(&self) -> &[f64] {
        &self.y_coords
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }
}
