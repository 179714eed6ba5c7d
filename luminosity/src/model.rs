//! The luminosity-function capability shared by every model.

use serde::{Deserialize, Serialize};

/// Redshift at which evolving models are anchored unless configured otherwise.
pub const DEFAULT_REFERENCE_REDSHIFT: f64 = 0.1;

/// A galaxy luminosity function Φ(M, z).
///
/// Implementors are immutable after construction, so a single instance can
/// be shared between threads and queried concurrently.
///
/// Magnitudes are absolute magnitudes [M-5logh]; densities are in h^3/Mpc^3.
pub trait LuminosityFunction: Send + Sync {
    /// Differential number density per unit magnitude at `magnitude`.
    fn phi(&self, magnitude: f64, redshift: f64) -> f64;

    /// Number density of galaxies brighter than `magnitude`.
    ///
    /// Must be non-decreasing as `magnitude` gets fainter (larger).
    fn phi_cumulative(&self, magnitude: f64, redshift: f64) -> f64;

    /// Cumulative density at each magnitude, at one redshift.
    fn phi_cumulative_many(&self, magnitudes: &[f64], redshift: f64) -> Vec<f64> {
        magnitudes
            .iter()
            .map(|&m| self.phi_cumulative(m, redshift))
            .collect()
    }

    /// `log10` of the cumulative density.
    ///
    /// Models whose density underflows far from M* override this to stay
    /// finite where `phi_cumulative` has already reached zero.
    fn log_phi_cumulative(&self, magnitude: f64, redshift: f64) -> f64 {
        self.phi_cumulative(magnitude, redshift).log10()
    }

    /// `log10` of the cumulative density at each magnitude, at one redshift.
    fn log_phi_cumulative_row(&self, magnitudes: &[f64], redshift: f64) -> Vec<f64> {
        magnitudes
            .iter()
            .map(|&m| self.log_phi_cumulative(m, redshift))
            .collect()
    }
}

impl<T: LuminosityFunction + ?Sized> LuminosityFunction for Box<T> {
    fn phi(&self, magnitude: f64, redshift: f64) -> f64 {
        (**self).phi(magnitude, redshift)
    }

    fn phi_cumulative(&self, magnitude: f64, redshift: f64) -> f64 {
        (**self).phi_cumulative(magnitude, redshift)
    }

    fn phi_cumulative_many(&self, magnitudes: &[f64], redshift: f64) -> Vec<f64> {
        (**self).phi_cumulative_many(magnitudes, redshift)
    }

    fn log_phi_cumulative(&self, magnitude: f64, redshift: f64) -> f64 {
        (**self).log_phi_cumulative(magnitude, redshift)
    }

    fn log_phi_cumulative_row(&self, magnitudes: &[f64], redshift: f64) -> Vec<f64> {
        (**self).log_phi_cumulative_row(magnitudes, redshift)
    }
}

/// Empirical redshift evolution of a luminosity function.
///
/// `q` shifts the magnitude scale, `M(z_ref) = M(z) + q (z - z_ref)`, and `p`
/// shifts the density normalization, `log10 n(z) = log10 n(z_ref) + 0.4 p (z - z_ref)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evolution {
    /// Number density evolution parameter
    pub p: f64,
    /// Magnitude evolution parameter
    pub q: f64,
    /// Anchor redshift of the evolution
    pub reference_redshift: f64,
}

impl Evolution {
    pub fn new(p: f64, q: f64) -> Self {
        Self {
            p,
            q,
            reference_redshift: DEFAULT_REFERENCE_REDSHIFT,
        }
    }

    pub fn with_reference_redshift(mut self, reference_redshift: f64) -> Self {
        self.reference_redshift = reference_redshift;
        self
    }

    /// Magnitude at the reference redshift equivalent to `magnitude` at `redshift`.
    pub fn to_reference_magnitude(&self, magnitude: f64, redshift: f64) -> f64 {
        magnitude + self.q * (redshift - self.reference_redshift)
    }

    /// Change in `log10` density from the reference redshift to `redshift`.
    pub fn log_density_shift(&self, redshift: f64) -> f64 {
        0.4 * self.p * (redshift - self.reference_redshift)
    }

    pub fn is_finite(&self) -> bool {
        self.p.is_finite() && self.q.is_finite() && self.reference_redshift.is_finite()
    }
}
