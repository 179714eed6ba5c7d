//! Comoving distance to redshift inversion.
//!
//! Distances are tabulated on a fine redshift grid once, and the inverse is
//! read back by linear interpolation. Precision is set by the grid step.

use lf_math::{AxisRange, LinearInterpolator};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::cosmology::Cosmology;
use crate::error::{LuminosityError, Result};

/// Redshift sampling of the distance table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceGridConfig {
    /// Table covers `[0, max_redshift)`
    pub max_redshift: f64,
    pub step: f64,
}

impl Default for DistanceGridConfig {
    fn default() -> Self {
        Self {
            max_redshift: 3.0,
            step: 1e-4,
        }
    }
}

impl DistanceGridConfig {
    pub fn validate(&self) -> Result<()> {
        let axis = self.axis();
        axis.validate()?;
        if self.step <= 0.0 || axis.len()? < 2 {
            return Err(LuminosityError::Configuration(format!(
                "distance grid {axis} must ascend through at least 2 redshifts"
            )));
        }
        Ok(())
    }

    fn axis(&self) -> AxisRange {
        AxisRange::new(0.0, self.max_redshift, self.step)
    }
}

/// Lookup from comoving distance to redshift.
#[derive(Debug, Clone)]
pub struct DistanceRedshiftInverter {
    table: LinearInterpolator,
}

impl DistanceRedshiftInverter {
    /// Tabulate an arbitrary comoving-distance function.
    pub fn from_fn<F>(comoving_distance: F, config: &DistanceGridConfig) -> Result<Self>
    where
        F: Fn(f64) -> f64,
    {
        config.validate()?;
        let redshifts = config.axis().to_vec()?;
        let distances = redshifts.iter().map(|&z| comoving_distance(z)).collect();
        Self::from_table(redshifts, distances)
    }

    /// Tabulate the distances of `cosmology` in a single batch call.
    pub fn from_cosmology<C>(cosmology: &C, config: &DistanceGridConfig) -> Result<Self>
    where
        C: Cosmology + ?Sized,
    {
        config.validate()?;
        let redshifts = config.axis().to_vec()?;
        let distances = cosmology.comoving_distances(&redshifts);
        Self::from_table(redshifts, distances)
    }

    fn from_table(redshifts: Vec<f64>, distances: Vec<f64>) -> Result<Self> {
        if let Some(i) = distances.iter().position(|d| !d.is_finite()) {
            return Err(LuminosityError::Configuration(format!(
                "comoving distance at z={} is not finite",
                redshifts[i]
            )));
        }
        if let Some(i) = distances.windows(2).position(|w| w[1] <= w[0]) {
            return Err(LuminosityError::Configuration(format!(
                "comoving distance must increase with redshift, but D({}) >= D({})",
                redshifts[i],
                redshifts[i + 1]
            )));
        }

        debug!(
            "Distance table: {} samples up to D={:.1} Mpc/h",
            distances.len(),
            distances[distances.len() - 1]
        );

        let table = LinearInterpolator::new(distances, redshifts)?;
        Ok(Self { table })
    }

    /// Redshift at comoving `distance`, extrapolated beyond the table.
    pub fn redshift(&self, distance: f64) -> f64 {
        self.table.evaluate(distance)
    }

    /// Redshift and whether `distance` was inside the table.
    pub fn redshift_checked(&self, distance: f64) -> (f64, bool) {
        self.table.evaluate_checked(distance)
    }

    /// Covered distance range [Mpc/h].
    pub fn distance_range(&self) -> (f64, f64) {
        self.table.domain()
    }
}
