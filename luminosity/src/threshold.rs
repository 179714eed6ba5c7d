//! Magnitude-threshold lookup tables.
//!
//! For a luminosity function n(<M, z) the threshold table answers the inverse
//! question: at redshift z, which magnitude M has a cumulative density of n?
//! The table is sampled on a (redshift, log10 density) grid by inverting the
//! cumulative curve row by row, then queried with bilinear interpolation.

use lf_math::{count_decreasing, invert_monotone, AxisRange, BilinearInterpolator};
use log::{debug, warn};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{LuminosityError, Result};
use crate::model::LuminosityFunction;

/// Axes of the threshold table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdGridConfig {
    /// Redshift rows
    pub redshifts: AxisRange,
    /// `log10` cumulative densities [h^3/Mpc^3] to invert at
    pub log_densities: AxisRange,
    /// Magnitude samples of each cumulative row
    pub magnitudes: AxisRange,
}

impl Default for ThresholdGridConfig {
    fn default() -> Self {
        Self {
            redshifts: AxisRange::new(0.0, 1.0, 0.01),
            log_densities: AxisRange::new(-12.0, -0.5, 0.01),
            magnitudes: AxisRange::new(-25.0, 0.0, 0.001),
        }
    }
}

impl ThresholdGridConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, axis) in [
            ("redshifts", &self.redshifts),
            ("log_densities", &self.log_densities),
            ("magnitudes", &self.magnitudes),
        ] {
            axis.validate()?;
            if axis.step <= 0.0 || axis.len()? < 2 {
                return Err(LuminosityError::Configuration(format!(
                    "threshold axis {name} ({axis}) must ascend through at least 2 samples"
                )));
            }
        }
        Ok(())
    }
}

/// Magnitudes sampled on a (redshift, log10 density) grid.
#[derive(Debug, Clone)]
pub struct ThresholdGrid {
    pub redshifts: Vec<f64>,
    pub log_densities: Vec<f64>,
    /// Shape (redshifts.len(), log_densities.len())
    pub magnitudes: Array2<f64>,
}

/// Tabulate the magnitude thresholds of `model`.
///
/// Each redshift row evaluates `log10 n(<M, z)` on the magnitude axis and
/// inverts it at every log density. Rows that decrease locally are inverted
/// anyway and reported with `warn!`.
///
/// # Errors
/// * `Configuration` for unusable axes
/// * `NumericDomain` if a cumulative row holds NaN or an inverted magnitude is
///   not finite
pub fn build_threshold_grid<L>(model: &L, config: &ThresholdGridConfig) -> Result<ThresholdGrid>
where
    L: LuminosityFunction + ?Sized,
{
    config.validate()?;

    let redshifts = config.redshifts.to_vec()?;
    let log_densities = config.log_densities.to_vec()?;
    let magnitude_axis = config.magnitudes.to_vec()?;

    debug!(
        "Building threshold grid: {} redshifts x {} densities from {} magnitudes",
        redshifts.len(),
        log_densities.len(),
        magnitude_axis.len()
    );

    let mut magnitudes = Array2::zeros((redshifts.len(), log_densities.len()));

    for (iz, &z) in redshifts.iter().enumerate() {
        let row = model.log_phi_cumulative_row(&magnitude_axis, z);

        if let Some(i) = row.iter().position(|v| v.is_nan()) {
            return Err(LuminosityError::NumericDomain(format!(
                "cumulative density is NaN at M={} z={z}",
                magnitude_axis[i]
            )));
        }

        let decreasing = count_decreasing(&row);
        if decreasing > 0 {
            warn!("Cumulative row at z={z} decreases at {decreasing} steps");
        }

        for (jn, &log_n) in log_densities.iter().enumerate() {
            let m = invert_monotone(&magnitude_axis, &row, log_n);
            if !m.is_finite() {
                return Err(LuminosityError::NumericDomain(format!(
                    "threshold magnitude is {m} at z={z} log10(n)={log_n}"
                )));
            }
            magnitudes[[iz, jn]] = m;
        }
    }

    Ok(ThresholdGrid {
        redshifts,
        log_densities,
        magnitudes,
    })
}

/// Bilinear lookup of magnitude thresholds.
#[derive(Debug, Clone)]
pub struct ThresholdInterpolator {
    table: BilinearInterpolator,
}

impl ThresholdInterpolator {
    pub fn new(grid: ThresholdGrid) -> Result<Self> {
        let table =
            BilinearInterpolator::new(grid.redshifts, grid.log_densities, grid.magnitudes)?;
        Ok(Self { table })
    }

    /// Build the grid for `model` and wrap it.
    pub fn from_model<L>(model: &L, config: &ThresholdGridConfig) -> Result<Self>
    where
        L: LuminosityFunction + ?Sized,
    {
        Self::new(build_threshold_grid(model, config)?)
    }

    /// Magnitude whose cumulative density at `redshift` is `number_density`.
    ///
    /// Queries outside the table are linearly extrapolated. A density of zero
    /// has no galaxy brighter than it and maps to `-inf`; negative or
    /// non-finite densities map to NaN.
    pub fn magnitude(&self, number_density: f64, redshift: f64) -> f64 {
        self.lookup(number_density, redshift).0
    }

    /// Like [`magnitude`](Self::magnitude), also reporting whether the query
    /// fell inside the sampled table. Zero, negative and non-finite densities
    /// are never inside it.
    pub fn magnitude_checked(&self, number_density: f64, redshift: f64) -> (f64, bool) {
        self.lookup(number_density, redshift)
    }

    /// Batch lookup, evaluated in parallel.
    ///
    /// # Errors
    /// * `LengthMismatch` if the slices differ in length
    /// * `InvalidDensity` for a negative or non-finite density
    pub fn magnitudes(&self, number_densities: &[f64], redshifts: &[f64]) -> Result<Vec<f64>> {
        if number_densities.len() != redshifts.len() {
            return Err(LuminosityError::LengthMismatch {
                expected: number_densities.len(),
                actual: redshifts.len(),
            });
        }
        if let Some(&n) = number_densities
            .iter()
            .find(|&&n| !(n >= 0.0 && n.is_finite()))
        {
            return Err(LuminosityError::InvalidDensity(n));
        }

        Ok(number_densities
            .par_iter()
            .zip(redshifts.par_iter())
            .map(|(&n, &z)| self.magnitude(n, z))
            .collect())
    }

    fn lookup(&self, number_density: f64, redshift: f64) -> (f64, bool) {
        if number_density == 0.0 {
            return (f64::NEG_INFINITY, false);
        }
        if !(number_density > 0.0 && number_density.is_finite()) {
            return (f64::NAN, false);
        }
        let log_n = number_density.log10();
        (
            self.table.extrapolate(redshift, log_n),
            self.table.contains(redshift, log_n),
        )
    }

    pub fn redshifts(&self) -> &[f64] {
        self.table.x_coords()
    }

    pub fn log_densities(&self) -> &[f64] {
        self.table.y_coords()
    }

    /// Tabulated magnitudes, shape (redshifts, log densities).
    pub fn table(&self) -> &Array2<f64> {
        self.table.data()
    }
}
