//! Redshift-weighted blend of two luminosity functions.
//!
//! The near model dominates at low redshift and the far model at high
//! redshift. The weight of the near model is a logistic step
//!
//! w(z) = 1 / (1 + exp(k (z - z_c)))
//!
//! with steepness `k` (default 120) and center `z_c` (default 0.15), i.e. an
//! almost hard switch smoothed over a band of width ~1/60 in redshift.

use serde::{Deserialize, Serialize};

use crate::error::{LuminosityError, Result};
use crate::model::LuminosityFunction;

/// Logistic transition between the near and far models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transition {
    pub steepness: f64,
    pub center: f64,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            steepness: 120.0,
            center: 0.15,
        }
    }
}

impl Transition {
    /// Weight of the near model at `redshift`, in [0, 1].
    pub fn weight(&self, redshift: f64) -> f64 {
        1.0 / (1.0 + (self.steepness * (redshift - self.center)).exp())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.steepness.is_finite() && self.steepness > 0.0 && self.center.is_finite()) {
            return Err(LuminosityError::Configuration(format!(
                "transition needs positive finite steepness and finite center, got {self:?}"
            )));
        }
        Ok(())
    }
}

/// Blend of a near (low redshift) and far (high redshift) model.
pub struct BlendedLuminosityFunction {
    near: Box<dyn LuminosityFunction>,
    far: Box<dyn LuminosityFunction>,
    transition: Transition,
}

impl BlendedLuminosityFunction {
    pub fn new(
        near: Box<dyn LuminosityFunction>,
        far: Box<dyn LuminosityFunction>,
        transition: Transition,
    ) -> Result<Self> {
        transition.validate()?;
        Ok(Self {
            near,
            far,
            transition,
        })
    }

    /// Weight of the near model at `redshift`.
    pub fn transition(&self, redshift: f64) -> f64 {
        self.transition.weight(redshift)
    }

    pub fn near(&self) -> &dyn LuminosityFunction {
        self.near.as_ref()
    }

    pub fn far(&self) -> &dyn LuminosityFunction {
        self.far.as_ref()
    }
}

impl std::fmt::Debug for BlendedLuminosityFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlendedLuminosityFunction")
            .field("transition", &self.transition)
            .finish_non_exhaustive()
    }
}

impl LuminosityFunction for BlendedLuminosityFunction {
    fn phi(&self, magnitude: f64, redshift: f64) -> f64 {
        let w = self.transition(redshift);
        w * self.near.phi(magnitude, redshift) + (1.0 - w) * self.far.phi(magnitude, redshift)
    }

    fn phi_cumulative(&self, magnitude: f64, redshift: f64) -> f64 {
        let w = self.transition(redshift);
        w * self.near.phi_cumulative(magnitude, redshift)
            + (1.0 - w) * self.far.phi_cumulative(magnitude, redshift)
    }

    /// Weighted sum evaluated in log space, so it stays finite where both
    /// models have underflowed.
    fn log_phi_cumulative(&self, magnitude: f64, redshift: f64) -> f64 {
        let w = self.transition(redshift);
        let near = w.log10() + self.near.log_phi_cumulative(magnitude, redshift);
        let far = (1.0 - w).log10() + self.far.log_phi_cumulative(magnitude, redshift);

        let (high, low) = if near >= far { (near, far) } else { (far, near) };
        if high == f64::NEG_INFINITY {
            return high;
        }
        high + (1.0 + 10f64.powf(low - high)).log10()
    }
}
