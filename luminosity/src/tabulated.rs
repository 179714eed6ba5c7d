//! Luminosity function interpolated from a tabulated cumulative curve.
//!
//! The table holds `(M, log10 n(<M))` at the reference redshift. Other
//! redshifts are reached through the P/Q evolution: the magnitude is shifted
//! to the reference epoch, the table is interpolated (linearly, extrapolating
//! beyond its ends), and the density shift is added back.

use std::path::Path;

use lf_math::LinearInterpolator;

use crate::error::{LuminosityError, Result};
use crate::io::load_tabulated;
use crate::model::{Evolution, LuminosityFunction};
use crate::smoothing::{SmoothedDifferential, SmoothingConfig};

/// Tabulated luminosity function with evolution.
#[derive(Debug, Clone)]
pub struct TabulatedLuminosityFunction {
    log_cumulative: LinearInterpolator,
    evolution: Evolution,
    differential: SmoothedDifferential,
}

impl TabulatedLuminosityFunction {
    /// Build from magnitudes (strictly ascending) and `log10` cumulative densities.
    ///
    /// The differential curve is fitted immediately so later `phi` calls are
    /// cheap lookups.
    pub fn new(
        magnitudes: Vec<f64>,
        log_number_densities: Vec<f64>,
        evolution: Evolution,
        smoothing: &SmoothingConfig,
    ) -> Result<Self> {
        if !evolution.is_finite() {
            return Err(LuminosityError::Configuration(format!(
                "evolution parameters must be finite: {evolution:?}"
            )));
        }
        if let Some(i) = log_number_densities.iter().position(|v| !v.is_finite()) {
            return Err(LuminosityError::Configuration(format!(
                "tabulated log density at row {i} is not finite"
            )));
        }

        let log_cumulative = LinearInterpolator::new(magnitudes, log_number_densities)?;

        let reference = evolution.reference_redshift;
        let differential = SmoothedDifferential::from_cumulative(
            |m| cumulative_at(&log_cumulative, &evolution, m, reference),
            evolution,
            smoothing,
        )?;

        Ok(Self {
            log_cumulative,
            evolution,
            differential,
        })
    }

    /// Load the two-column table from `path`.
    pub fn from_file(
        path: &Path,
        evolution: Evolution,
        smoothing: &SmoothingConfig,
    ) -> Result<Self> {
        let (magnitudes, log_number_densities) = load_tabulated(path)?;
        Self::new(magnitudes, log_number_densities, evolution, smoothing)
    }

    pub fn evolution(&self) -> Evolution {
        self.evolution
    }

    /// Tabulated magnitude range; queries outside it are extrapolated.
    pub fn magnitude_range(&self) -> (f64, f64) {
        self.log_cumulative.domain()
    }
}

fn log_cumulative_at(
    table: &LinearInterpolator,
    evolution: &Evolution,
    magnitude: f64,
    redshift: f64,
) -> f64 {
    let reference_magnitude = evolution.to_reference_magnitude(magnitude, redshift);
    table.evaluate(reference_magnitude) + evolution.log_density_shift(redshift)
}

fn cumulative_at(
    table: &LinearInterpolator,
    evolution: &Evolution,
    magnitude: f64,
    redshift: f64,
) -> f64 {
    10f64.powf(log_cumulative_at(table, evolution, magnitude, redshift))
}

impl LuminosityFunction for TabulatedLuminosityFunction {
    fn phi(&self, magnitude: f64, redshift: f64) -> f64 {
        self.differential.phi(magnitude, redshift)
    }

    fn phi_cumulative(&self, magnitude: f64, redshift: f64) -> f64 {
        cumulative_at(&self.log_cumulative, &self.evolution, magnitude, redshift)
    }

    fn log_phi_cumulative(&self, magnitude: f64, redshift: f64) -> f64 {
        log_cumulative_at(&self.log_cumulative, &self.evolution, magnitude, redshift)
    }
}
