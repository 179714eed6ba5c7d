//! Target luminosity function for mock catalogues.
//!
//! A tabulated curve at low redshift blended into an evolving Schechter fit
//! at high redshift, together with the tables needed to assign magnitudes
//! from number densities and to move magnitudes between redshifts.

use std::path::Path;

use log::info;

use crate::blended::BlendedLuminosityFunction;
use crate::config::LuminosityConfig;
use crate::error::Result;
use crate::io::load_schechter_parameters;
use crate::model::LuminosityFunction;
use crate::rescale::MagnitudeRescaler;
use crate::schechter::{SchechterLuminosityFunction, SchechterParameters};
use crate::tabulated::TabulatedLuminosityFunction;
use crate::threshold::ThresholdInterpolator;

#[derive(Debug)]
pub struct TargetLuminosityFunction {
    model: BlendedLuminosityFunction,
    thresholds: ThresholdInterpolator,
    rescaler: MagnitudeRescaler,
}

impl TargetLuminosityFunction {
    /// Blend `tabulated` (near) with `schechter` (far) and build the lookup
    /// tables described by `config`.
    pub fn new(
        tabulated: TabulatedLuminosityFunction,
        schechter: SchechterLuminosityFunction,
        config: &LuminosityConfig,
    ) -> Result<Self> {
        config.validate()?;

        let model = BlendedLuminosityFunction::new(
            Box::new(tabulated),
            Box::new(schechter),
            config.transition,
        )?;
        let thresholds = ThresholdInterpolator::from_model(&model, &config.threshold)?;
        let rescaler = MagnitudeRescaler::new(&config.rescale)?;

        Ok(Self {
            model,
            thresholds,
            rescaler,
        })
    }

    /// Load the tabulated curve from `table` and the Schechter fit with its
    /// shared P/Q evolution from `params`.
    pub fn from_files(table: &Path, params: &Path, config: &LuminosityConfig) -> Result<Self> {
        config.validate()?;

        let (parameters, evolution) = load_schechter_parameters(params)?;
        let evolution = evolution.with_reference_redshift(config.reference_redshift);
        let SchechterParameters {
            phi_star,
            m_star,
            alpha,
        } = parameters;
        info!(
            "Schechter fit Phi*={phi_star} M*={m_star} alpha={alpha}, evolution P={} Q={}",
            evolution.p, evolution.q
        );

        let tabulated =
            TabulatedLuminosityFunction::from_file(table, evolution, &config.smoothing)?;
        let schechter = SchechterLuminosityFunction::new(parameters, evolution)?;
        Self::new(tabulated, schechter, config)
    }

    /// Magnitude at which the cumulative density at `redshift` equals
    /// `number_density`.
    pub fn magnitude(&self, number_density: f64, redshift: f64) -> f64 {
        self.thresholds.magnitude(number_density, redshift)
    }

    pub fn magnitude_checked(&self, number_density: f64, redshift: f64) -> (f64, bool) {
        self.thresholds.magnitude_checked(number_density, redshift)
    }

    pub fn magnitudes(&self, number_densities: &[f64], redshifts: &[f64]) -> Result<Vec<f64>> {
        self.thresholds.magnitudes(number_densities, redshifts)
    }

    /// Move magnitudes from their original to their new redshifts at fixed
    /// cumulative density.
    pub fn rescale_magnitude(
        &self,
        magnitudes: &[f64],
        original_redshifts: &[f64],
        new_redshifts: &[f64],
    ) -> Result<Vec<f64>> {
        self.rescaler
            .rescale(&self.model, magnitudes, original_redshifts, new_redshifts)
    }

    pub fn model(&self) -> &BlendedLuminosityFunction {
        &self.model
    }

    pub fn thresholds(&self) -> &ThresholdInterpolator {
        &self.thresholds
    }
}

impl LuminosityFunction for TargetLuminosityFunction {
    fn phi(&self, magnitude: f64, redshift: f64) -> f64 {
        self.model.phi(magnitude, redshift)
    }

    fn phi_cumulative(&self, magnitude: f64, redshift: f64) -> f64 {
        self.model.phi_cumulative(magnitude, redshift)
    }

    fn log_phi_cumulative(&self, magnitude: f64, redshift: f64) -> f64 {
        self.model.log_phi_cumulative(magnitude, redshift)
    }
}
