//! Evolving Schechter luminosity function.
//!
//! With `t = 10^(0.4 (M*(z) - M))` the differential form is
//!
//! Φ(M, z) = 0.4 ln10 Φ*(z) t^(α+1) exp(-t)
//!
//! and the cumulative form, written with the regularized upper incomplete
//! gamma function Q(a, t), is
//!
//! Φ(<M, z) = Φ*(z) (Q(α+2, t) Γ(α+2) - t^(α+1) exp(-t)) / (α+1)
//!
//! which is the unnormalized upper incomplete gamma Γ(α+1, t) expressed so it
//! stays valid for -2 < α < -1. The characteristic magnitude evolves as
//! `M*(z) = M* - Q (z - z_ref)` and the normalization as
//! `Φ*(z) = Φ* 10^(0.4 P z)`.
//!
//! For bright galaxies (t above [`ASYMPTOTIC_T`]) the closed form cancels
//! badly and then underflows, so Γ(α+1, t) is instead evaluated in log space
//! from its asymptotic expansion. `log10 Φ(<M, z)` stays finite and strictly
//! increasing in M until `t` itself overflows, about 770 magnitudes brighter
//! than M*, where it becomes `-inf`. `Φ(<M, z)` itself underflows to zero about
//! 7 magnitudes brighter than M*.

use serde::{Deserialize, Serialize};
use statrs::function::gamma::{gamma, gamma_ur};

use crate::error::{LuminosityError, Result};
use crate::model::{Evolution, LuminosityFunction};

/// Above this `t` the cumulative density comes from the asymptotic series.
pub const ASYMPTOTIC_T: f64 = 50.0;

/// Cap on the number of asymptotic series terms.
const SERIES_TERMS: usize = 60;

/// Half-width of the band around α = -1 where the closed form is averaged
/// from either side instead of divided by (α+1).
const ALPHA_GUARD: f64 = 1e-4;

const LN_10: f64 = std::f64::consts::LN_10;

/// Schechter function parameters at the reference redshift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchechterParameters {
    /// Normalization [h^3/Mpc^3]
    pub phi_star: f64,
    /// Characteristic absolute magnitude [M-5logh]
    pub m_star: f64,
    /// Faint end slope
    pub alpha: f64,
}

/// Schechter luminosity function with P/Q evolution.
#[derive(Debug, Clone)]
pub struct SchechterLuminosityFunction {
    params: SchechterParameters,
    evolution: Evolution,
}

impl SchechterLuminosityFunction {
    /// Create a new evolving Schechter function.
    ///
    /// # Errors
    /// `Configuration` if any parameter is non-finite, `phi_star <= 0`, or
    /// `alpha <= -2` (the cumulative density diverges).
    pub fn new(params: SchechterParameters, evolution: Evolution) -> Result<Self> {
        let SchechterParameters {
            phi_star,
            m_star,
            alpha,
        } = params;

        if !(phi_star.is_finite() && m_star.is_finite() && alpha.is_finite()) {
            return Err(LuminosityError::Configuration(format!(
                "Schechter parameters must be finite: {params:?}"
            )));
        }
        if !evolution.is_finite() {
            return Err(LuminosityError::Configuration(format!(
                "evolution parameters must be finite: {evolution:?}"
            )));
        }
        if phi_star <= 0.0 {
            return Err(LuminosityError::Configuration(format!(
                "phi_star must be positive, got {phi_star}"
            )));
        }
        if alpha <= -2.0 {
            return Err(LuminosityError::Configuration(format!(
                "alpha must be greater than -2, got {alpha}"
            )));
        }

        Ok(Self { params, evolution })
    }

    pub fn parameters(&self) -> SchechterParameters {
        self.params
    }

    pub fn evolution(&self) -> Evolution {
        self.evolution
    }

    /// Characteristic magnitude at `redshift`.
    pub fn m_star_at(&self, redshift: f64) -> f64 {
        self.params.m_star - self.evolution.q * (redshift - self.evolution.reference_redshift)
    }

    /// Normalization at `redshift`.
    pub fn phi_star_at(&self, redshift: f64) -> f64 {
        self.params.phi_star * 10f64.powf(0.4 * self.evolution.p * redshift)
    }

    /// `ln t` for luminosity `t` in units of L*, floored so `t` stays positive.
    fn ln_scaled_luminosity(&self, magnitude: f64, redshift: f64) -> f64 {
        let ln_t = 0.4 * LN_10 * (self.m_star_at(redshift) - magnitude);
        let floor = f64::MIN_POSITIVE.ln();
        if ln_t < floor {
            floor
        } else {
            ln_t
        }
    }

    fn use_asymptotic(&self, t: f64) -> bool {
        t > ASYMPTOTIC_T.max(2.0 * (self.params.alpha + 1.0).abs())
    }
}

/// `t^s exp(-t)` from `ln t` without overflowing the power.
fn power_exp(s: f64, ln_t: f64) -> f64 {
    (s * ln_t - ln_t.exp()).exp()
}

/// Γ(α+1, t) via the closed form; `alpha` must not be -1.
fn upper_gamma_closed(alpha: f64, t: f64) -> f64 {
    let a = alpha + 2.0;
    (gamma_ur(a, t) * gamma(a) - power_exp(alpha + 1.0, t.ln())) / (alpha + 1.0)
}

/// Γ(α+1, t), the integral of the Schechter shape from `t` to infinity.
fn cumulative_shape(alpha: f64, t: f64) -> f64 {
    let value = if (alpha + 1.0).abs() < ALPHA_GUARD {
        // Smooth in alpha, so the average of both sides recovers the limit
        0.5 * (upper_gamma_closed(-1.0 - ALPHA_GUARD, t)
            + upper_gamma_closed(-1.0 + ALPHA_GUARD, t))
    } else {
        upper_gamma_closed(alpha, t)
    };

    // Cancellation at large t can leave a tiny negative residue
    value.max(0.0)
}

/// ln Γ(s, t) from the asymptotic expansion
/// `Γ(s, t) ~ t^(s-1) e^(-t) Σ_k (s-1)(s-2)...(s-k) / t^k`,
/// accurate to rounding once `t` is well above `|s|`.
fn ln_upper_gamma_asymptotic(s: f64, ln_t: f64) -> f64 {
    let t = ln_t.exp();
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..=SERIES_TERMS {
        term *= (s - k as f64) / t;
        sum += term;
        if term.abs() < f64::EPSILON * sum.abs() {
            break;
        }
    }
    (s - 1.0) * ln_t - t + sum.ln()
}

impl LuminosityFunction for SchechterLuminosityFunction {
    fn phi(&self, magnitude: f64, redshift: f64) -> f64 {
        let ln_t = self.ln_scaled_luminosity(magnitude, redshift);
        0.4 * LN_10 * self.phi_star_at(redshift) * power_exp(self.params.alpha + 1.0, ln_t)
    }

    fn phi_cumulative(&self, magnitude: f64, redshift: f64) -> f64 {
        let t = self.ln_scaled_luminosity(magnitude, redshift).exp();
        if self.use_asymptotic(t) {
            return 10f64.powf(self.log_phi_cumulative(magnitude, redshift));
        }
        self.phi_star_at(redshift) * cumulative_shape(self.params.alpha, t)
    }

    fn log_phi_cumulative(&self, magnitude: f64, redshift: f64) -> f64 {
        let ln_t = self.ln_scaled_luminosity(magnitude, redshift);
        let t = ln_t.exp();
        if !self.use_asymptotic(t) {
            return self.phi_cumulative(magnitude, redshift).log10();
        }
        let log_phi_star = self.params.phi_star.log10() + 0.4 * self.evolution.p * redshift;
        log_phi_star + ln_upper_gamma_asymptotic(self.params.alpha + 1.0, ln_t) / LN_10
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_lf() -> SchechterLuminosityFunction {
        SchechterLuminosityFunction::new(
            SchechterParameters {
                phi_star: 0.01,
                m_star: -20.5,
                alpha: -1.2,
            },
            Evolution::new(1.0, 1.0),
        )
        .unwrap()
    }

    fn magnitude_grid() -> Vec<f64> {
        (0..=400).map(|i| -25.0 + i as f64 * 0.05).collect()
    }

    #[test]
    fn test_golden_cumulative_value() {
        let lf = reference_lf();

        // At z = 0.1 and M = M*, t = 1
        let a: f64 = -1.2 + 2.0;
        let phi_star_z = 0.01 * 10f64.powf(0.4 * 1.0 * 0.1);
        let expected =
            phi_star_z * (gamma_ur(a, 1.0) * gamma(a) - (-1.0f64).exp()) / (-1.2 + 1.0);

        assert_relative_eq!(lf.phi_cumulative(-20.5, 0.1), expected, max_relative = 1e-12);
        assert!(expected > 0.0);
    }

    #[test]
    fn test_golden_value_without_density_evolution() {
        let lf = SchechterLuminosityFunction::new(
            SchechterParameters {
                phi_star: 0.01,
                m_star: -20.5,
                alpha: -1.2,
            },
            Evolution::new(0.0, 1.0),
        )
        .unwrap();

        let a: f64 = 0.8;
        let expected = 0.01 * (gamma_ur(a, 1.0) * gamma(a) - (-1.0f64).exp()) / -0.2;
        assert_relative_eq!(lf.phi_cumulative(-20.5, 0.1), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_differential_at_m_star() {
        let lf = reference_lf();
        let phi_star_z = 0.01 * 10f64.powf(0.04);
        let expected = 0.4 * LN_10 * phi_star_z * (-1.0f64).exp();
        assert_relative_eq!(lf.phi(-20.5, 0.1), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_cumulative_monotone_in_magnitude() {
        let parameter_sets = [
            (0.01, -20.5, -1.2),
            (0.005, -21.0, -0.5),
            (0.02, -20.0, 0.3),
            (0.01, -20.7, -1.00005),
            (0.003, -21.5, -1.9),
        ];

        for (phi_star, m_star, alpha) in parameter_sets {
            let lf = SchechterLuminosityFunction::new(
                SchechterParameters {
                    phi_star,
                    m_star,
                    alpha,
                },
                Evolution::new(1.2, 0.8),
            )
            .unwrap();

            for z in [0.0, 0.1, 0.5, 1.0] {
                let values: Vec<f64> = magnitude_grid()
                    .iter()
                    .map(|&m| lf.phi_cumulative(m, z))
                    .collect();
                for w in values.windows(2) {
                    assert!(w[1].is_finite());
                    assert!(
                        w[1] >= w[0],
                        "alpha={alpha} z={z}: {} then {}",
                        w[0],
                        w[1]
                    );
                }
            }
        }
    }

    #[test]
    fn test_alpha_near_minus_one_is_continuous() {
        let make = |alpha| {
            SchechterLuminosityFunction::new(
                SchechterParameters {
                    phi_star: 0.01,
                    m_star: -20.5,
                    alpha,
                },
                Evolution::new(0.0, 0.0),
            )
            .unwrap()
        };

        let guarded = make(-1.0);
        let left = make(-1.001);
        let right = make(-0.999);

        for m in [-23.0, -21.0, -20.5, -19.0, -16.0] {
            let value = guarded.phi_cumulative(m, 0.1);
            assert!(value.is_finite() && value > 0.0);
            let either_side = 0.5 * (left.phi_cumulative(m, 0.1) + right.phi_cumulative(m, 0.1));
            assert_relative_eq!(value, either_side, max_relative = 1e-4);
        }
    }

    #[test]
    fn test_cumulative_is_integral_of_differential() {
        let lf = reference_lf();
        let z = 0.3;

        // Integrate phi from the bright end to -19.0
        let integral = lf_math::simpson(|m| lf.phi(m, z), -30.0, -19.0, 4000);
        assert_relative_eq!(lf.phi_cumulative(-19.0, z), integral, max_relative = 1e-6);
    }

    #[test]
    fn test_extreme_magnitudes_stay_finite() {
        let lf = reference_lf();
        for m in [-60.0, -40.0, 20.0, 40.0] {
            assert!(lf.phi(m, 0.5).is_finite());
            assert!(lf.phi_cumulative(m, 0.5).is_finite());
            assert!(lf.phi_cumulative(m, 0.5) >= 0.0);
        }
    }

    #[test]
    fn test_asymptotic_series_matches_closed_form() {
        for alpha in [-1.7, -1.2, -0.5, 0.3] {
            for t in [51.0f64, 60.0, 80.0] {
                let series = ln_upper_gamma_asymptotic(alpha + 1.0, t.ln()).exp();
                assert_relative_eq!(series, upper_gamma_closed(alpha, t), max_relative = 1e-8);
            }
        }
    }

    #[test]
    fn test_cumulative_continuous_across_series_switch() {
        let lf = reference_lf();
        // t = 50 at the reference redshift
        let m_switch = -20.5 - 2.5 * ASYMPTOTIC_T.log10();

        let below = lf.phi_cumulative(m_switch + 1e-6, 0.1);
        let above = lf.phi_cumulative(m_switch - 1e-6, 0.1);
        assert!(above > 0.0 && above < below);
        assert_relative_eq!(above, below, max_relative = 1e-3);
    }

    #[test]
    fn test_bright_log_cumulative_stays_distinct() {
        let lf = reference_lf();
        let mags = [-60.0, -35.0, -30.0, -25.0];
        let log_n: Vec<f64> = mags.iter().map(|&m| lf.log_phi_cumulative(m, 0.3)).collect();

        for w in log_n.windows(2) {
            assert!(w[0].is_finite() && w[1].is_finite());
            assert!(w[0] < w[1], "{} then {}", w[0], w[1]);
        }

        // Roughly -t / ln10 with t = 10^(0.4 (M* - M))
        let t = 10f64.powf(0.4 * (lf.m_star_at(0.3) + 30.0));
        assert_relative_eq!(log_n[2], -t / LN_10, max_relative = 0.01);

        // The linear density has long underflowed
        assert_eq!(lf.phi_cumulative(-35.0, 0.3), 0.0);
        assert_eq!(lf.log_phi_cumulative(-1000.0, 0.3), f64::NEG_INFINITY);
    }

    #[test]
    fn test_log_cumulative_matches_linear_near_m_star() {
        let lf = reference_lf();
        for m in [-24.0, -22.0, -20.5, -18.0, -12.0] {
            assert_relative_eq!(
                lf.log_phi_cumulative(m, 0.4),
                lf.phi_cumulative(m, 0.4).log10(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_nan_magnitude_propagates() {
        let lf = reference_lf();
        assert!(lf.phi(f64::NAN, 0.3).is_nan());
        assert!(lf.phi_cumulative(f64::NAN, 0.3).is_nan());
        assert!(lf.log_phi_cumulative(f64::NAN, 0.3).is_nan());
    }

    #[test]
    fn test_evolution_of_characteristic_values() {
        let lf = reference_lf();
        assert_relative_eq!(lf.m_star_at(0.1), -20.5);
        assert_relative_eq!(lf.m_star_at(0.6), -21.0, epsilon = 1e-12);
        assert_relative_eq!(lf.phi_star_at(0.0), 0.01);
        assert_relative_eq!(lf.phi_star_at(2.5), 0.1, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_parameters() {
        let params = |phi_star, alpha| SchechterParameters {
            phi_star,
            m_star: -20.5,
            alpha,
        };
        let evolution = Evolution::new(1.0, 1.0);

        assert!(SchechterLuminosityFunction::new(params(0.01, -2.0), evolution).is_err());
        assert!(SchechterLuminosityFunction::new(params(0.0, -1.2), evolution).is_err());
        assert!(SchechterLuminosityFunction::new(params(f64::NAN, -1.2), evolution).is_err());
        assert!(SchechterLuminosityFunction::new(
            params(0.01, -1.2),
            Evolution::new(f64::INFINITY, 1.0)
        )
        .is_err());
    }
}
