//! Differential luminosity function derived from a cumulative curve.
//!
//! Models that only know their cumulative density (tabulated curves) obtain
//! Φ(M, z) by finite-differencing the cumulative curve at the reference
//! redshift on a fine magnitude grid, fitting a cubic spline through
//! `log10 Φ`, and applying the P/Q evolution when evaluating:
//!
//! log10 Φ(M, z) = spline(M + Q (z - z_ref)) + 0.4 P (z - z_ref)

use lf_math::{AxisRange, CubicSpline};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{LuminosityError, Result};
use crate::model::Evolution;

/// Magnitude sampling used to difference the cumulative curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Brightest sampled magnitude
    pub bright_limit: f64,
    /// Faintest sampled magnitude (the grid starts here)
    pub faint_limit: f64,
    /// Spacing of the finite differences
    pub step: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            bright_limit: -25.0,
            faint_limit: 0.0,
            step: 0.001,
        }
    }
}

impl SmoothingConfig {
    pub fn validate(&self) -> Result<()> {
        self.axis().validate()?;
        Ok(())
    }

    /// Sample axis running from the faint limit towards the bright limit.
    fn axis(&self) -> AxisRange {
        AxisRange::new(self.faint_limit, self.bright_limit, -self.step)
    }
}

/// Spline fit to `log10 Φ` at the reference redshift plus its evolution.
#[derive(Debug, Clone)]
pub struct SmoothedDifferential {
    log_phi: CubicSpline,
    evolution: Evolution,
}

impl SmoothedDifferential {
    /// Fit the differential curve of `cumulative`, which is evaluated only at
    /// the reference redshift.
    ///
    /// Finite differences that are zero, negative, or non-finite (underflow
    /// at the bright end, noise in a tabulated curve) are left out of the
    /// fit.
    ///
    /// # Errors
    /// `NumericDomain` if fewer than two usable differences remain.
    pub fn from_cumulative<F>(
        cumulative: F,
        evolution: Evolution,
        config: &SmoothingConfig,
    ) -> Result<Self>
    where
        F: Fn(f64) -> f64,
    {
        let mags = config.axis().to_vec()?;
        let cums: Vec<f64> = mags.iter().map(|&m| cumulative(m)).collect();

        // mags run faint to bright, so each difference is the density in one bin
        let mut knots: Vec<(f64, f64)> = mags
            .windows(2)
            .zip(cums.windows(2))
            .filter_map(|(m, c)| {
                let phi = (c[0] - c[1]) / config.step;
                (phi > 0.0 && phi.is_finite()).then(|| (0.5 * (m[0] + m[1]), phi.log10()))
            })
            .collect();

        let dropped = mags.len().saturating_sub(1) - knots.len();
        if dropped > 0 {
            debug!("Dropped {dropped} non-positive finite differences before spline fit");
        }
        if knots.len() < 2 {
            return Err(LuminosityError::NumericDomain(format!(
                "only {} positive differential densities between M={} and M={}",
                knots.len(),
                config.bright_limit,
                config.faint_limit
            )));
        }

        knots.reverse();
        let (x, y): (Vec<f64>, Vec<f64>) = knots.into_iter().unzip();
        let log_phi = CubicSpline::new(x, y)?;

        Ok(Self { log_phi, evolution })
    }

    /// Differential density at `magnitude` and `redshift`.
    pub fn phi(&self, magnitude: f64, redshift: f64) -> f64 {
        let reference_magnitude = self.evolution.to_reference_magnitude(magnitude, redshift);
        let log_phi = self.log_phi.evaluate(reference_magnitude)
            + self.evolution.log_density_shift(redshift);
        10f64.powf(log_phi)
    }
}
