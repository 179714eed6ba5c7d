//! Background cosmology.
//!
//! The luminosity-function code needs only distances and the expansion rate,
//! so it talks to a [`Cosmology`] trait. [`FlatLambdaCdm`] is a matter plus
//! cosmological-constant model (radiation and neutrinos ignored) with presets
//! for the MXXL, Uchuu and FLAMINGO simulations. It also provides the linear
//! growth factor and growth rate used when painting galaxies onto evolving
//! halo catalogues.
//!
//! Units: distances in Mpc/h, densities in Msun h^2 / Mpc^3, ages in Gyr.

use std::f64::consts::PI;

use lf_math::simpson;

use crate::error::{LuminosityError, Result};

/// Speed of light over 100 km/s/Mpc, the Hubble distance in Mpc/h.
pub const HUBBLE_DISTANCE: f64 = 2997.92458;

/// 1/H0 in Gyr for H0 = 100 km/s/Mpc.
const HUBBLE_TIME: f64 = 9.777922;

/// Critical density today for h = 1 [Msun h^2 / Mpc^3].
const CRITICAL_DENSITY_0: f64 = 2.775e11;

/// Redshift spacing of the Simpson integration of 1/E(z).
const INTEGRATION_STEP: f64 = 1e-3;

/// Scale-factor spacing of the growth integral.
const GROWTH_STEP: f64 = 1e-4;

/// Expansion history consumed by the distance inverter.
pub trait Cosmology: Send + Sync {
    /// Comoving distance to `redshift` [Mpc/h].
    fn comoving_distance(&self, redshift: f64) -> f64;

    /// Dimensionless Hubble rate E(z) = H(z)/H0.
    fn efunc(&self, redshift: f64) -> f64;

    /// Comoving distance to each redshift.
    fn comoving_distances(&self, redshifts: &[f64]) -> Vec<f64> {
        redshifts.iter().map(|&z| self.comoving_distance(z)).collect()
    }
}

/// Spatially flat ΛCDM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatLambdaCdm {
    h: f64,
    omega_m: f64,
}

impl FlatLambdaCdm {
    /// # Errors
    /// `Configuration` unless `h > 0` and `0 < omega_m <= 1`.
    pub fn new(h: f64, omega_m: f64) -> Result<Self> {
        if !(h.is_finite() && h > 0.0) {
            return Err(LuminosityError::Configuration(format!(
                "Hubble parameter h must be positive, got {h}"
            )));
        }
        if !(omega_m > 0.0 && omega_m <= 1.0) {
            return Err(LuminosityError::Configuration(format!(
                "omega_m must lie in (0, 1], got {omega_m}"
            )));
        }
        Ok(Self { h, omega_m })
    }

    /// Millennium-XXL.
    pub const fn mxxl() -> Self {
        Self {
            h: 0.73,
            omega_m: 0.25,
        }
    }

    /// Uchuu (Planck 2015).
    pub const fn uchuu() -> Self {
        Self {
            h: 0.6774,
            omega_m: 0.3089,
        }
    }

    /// FLAMINGO (DES Y3 + Planck).
    pub const fn flamingo() -> Self {
        Self {
            h: 0.681,
            omega_m: 0.304611,
        }
    }

    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn omega_m(&self) -> f64 {
        self.omega_m
    }

    pub fn omega_lambda(&self) -> f64 {
        1.0 - self.omega_m
    }

    /// Hubble rate [km/s/Mpc].
    pub fn hubble(&self, redshift: f64) -> f64 {
        100.0 * self.h * self.efunc(redshift)
    }

    /// Critical density [Msun h^2 / Mpc^3].
    pub fn critical_density(&self, redshift: f64) -> f64 {
        CRITICAL_DENSITY_0 * self.efunc(redshift).powi(2)
    }

    /// Mean matter density [Msun h^2 / Mpc^3].
    pub fn mean_density(&self, redshift: f64) -> f64 {
        self.critical_density(0.0) * self.omega_m * (1.0 + redshift).powi(3)
    }

    /// Full-sky comoving volume per unit redshift [(Mpc/h)^3].
    pub fn dvdz(&self, redshift: f64) -> f64 {
        4.0 * PI * HUBBLE_DISTANCE * self.comoving_distance(redshift).powi(2)
            / self.efunc(redshift)
    }

    /// Age of the universe at `redshift` [Gyr].
    pub fn age(&self, redshift: f64) -> f64 {
        let hubble_time = HUBBLE_TIME / self.h;
        let a32 = (1.0 + redshift).powf(-1.5);
        let omega_lambda = self.omega_lambda();

        if omega_lambda <= 0.0 {
            // Einstein-de Sitter
            return 2.0 / 3.0 * hubble_time * a32;
        }

        2.0 / (3.0 * omega_lambda.sqrt())
            * hubble_time
            * ((omega_lambda / self.omega_m).sqrt() * a32).asinh()
    }

    /// Linear growth factor D(z), normalized to D(0) = 1.
    ///
    /// Uses the growing mode of matter plus Λ,
    /// `D(a) ∝ E(a) ∫_0^a da' / (a' E(a'))^3`.
    pub fn growth_factor(&self, redshift: f64) -> f64 {
        let a = 1.0 / (1.0 + redshift);
        self.efunc(redshift) * self.growth_integral(a) / self.growth_integral(1.0)
    }

    /// Logarithmic growth rate f = dlnD/dlna.
    pub fn growth_rate(&self, redshift: f64) -> f64 {
        let a = 1.0 / (1.0 + redshift);
        let e = self.efunc(redshift);
        -1.5 * self.omega_m / (a.powi(3) * e * e)
            + 1.0 / (a * a * e.powi(3) * self.growth_integral(a))
    }

    /// `∫_0^a da' / (a' E(a'))^3`
    fn growth_integral(&self, a: f64) -> f64 {
        let omega_lambda = self.omega_lambda();
        let integrand = |x: f64| (self.omega_m / x + omega_lambda * x * x).powf(-1.5);
        let intervals = (a / GROWTH_STEP).ceil() as usize;
        simpson(integrand, 0.0, a, intervals)
    }

    fn inverse_efunc(&self, redshift: f64) -> f64 {
        1.0 / self.efunc(redshift)
    }

    fn integrate(&self, from: f64, to: f64) -> f64 {
        let intervals = ((to - from).abs() / INTEGRATION_STEP).ceil() as usize;
        simpson(|z| self.inverse_efunc(z), from, to, intervals)
    }
}

impl Cosmology for FlatLambdaCdm {
    fn comoving_distance(&self, redshift: f64) -> f64 {
        HUBBLE_DISTANCE * self.integrate(0.0, redshift)
    }

    fn efunc(&self, redshift: f64) -> f64 {
        (self.omega_m * (1.0 + redshift).powi(3) + self.omega_lambda()).sqrt()
    }

    /// One cumulative integration through the redshifts in ascending order.
    fn comoving_distances(&self, redshifts: &[f64]) -> Vec<f64> {
        let mut order: Vec<usize> = (0..redshifts.len()).collect();
        order.sort_by(|&a, &b| redshifts[a].total_cmp(&redshifts[b]));

        let mut distances = vec![0.0; redshifts.len()];
        let mut previous = 0.0;
        let mut integral = 0.0;
        for i in order {
            let z = redshifts[i];
            if !z.is_finite() {
                distances[i] = f64::NAN;
                continue;
            }
            integral += self.integrate(previous, z);
            previous = z;
            distances[i] = HUBBLE_DISTANCE * integral;
        }
        distances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_efunc() {
        let cosmo = FlatLambdaCdm::uchuu();
        assert_relative_eq!(cosmo.efunc(0.0), 1.0, epsilon = 1e-15);
        assert_relative_eq!(
            cosmo.efunc(1.0),
            (0.3089f64 * 8.0 + 0.6911).sqrt(),
            epsilon = 1e-12
        );
        assert_relative_eq!(cosmo.hubble(0.0), 67.74, epsilon = 1e-12);
    }

    #[test]
    fn test_einstein_de_sitter_distance() {
        let eds = FlatLambdaCdm::new(0.7, 1.0).unwrap();
        for z in [0.1f64, 0.5, 1.0, 2.5] {
            let expected = 2.0 * HUBBLE_DISTANCE * (1.0 - 1.0 / (1.0 + z).sqrt());
            assert_relative_eq!(eds.comoving_distance(z), expected, max_relative = 1e-10);
        }
        assert_eq!(eds.comoving_distance(0.0), 0.0);
    }

    #[test]
    fn test_batch_matches_single() {
        let cosmo = FlatLambdaCdm::mxxl();
        let zs = [0.8, 0.0, 0.25, 2.9, 0.25, 1.3];
        let batch = cosmo.comoving_distances(&zs);
        for (z, d) in zs.iter().zip(&batch) {
            assert_relative_eq!(
                *d,
                cosmo.comoving_distance(*z),
                max_relative = 1e-9,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_ages() {
        let eds = FlatLambdaCdm::new(1.0, 1.0).unwrap();
        assert_relative_eq!(eds.age(0.0), 2.0 / 3.0 * HUBBLE_TIME, epsilon = 1e-12);
        assert_relative_eq!(eds.age(3.0), 2.0 / 3.0 * HUBBLE_TIME / 8.0, epsilon = 1e-12);

        let planck = FlatLambdaCdm::uchuu();
        assert_relative_eq!(planck.age(0.0), 13.80, epsilon = 0.02);
        assert!(planck.age(1.0) < planck.age(0.5));
    }

    #[test]
    fn test_densities() {
        let cosmo = FlatLambdaCdm::flamingo();
        assert_relative_eq!(cosmo.critical_density(0.0), 2.775e11, max_relative = 1e-12);
        assert_relative_eq!(
            cosmo.mean_density(1.0),
            2.775e11 * 0.304611 * 8.0,
            max_relative = 1e-12
        );
        assert!(cosmo.dvdz(0.5) > cosmo.dvdz(0.1));
        assert_eq!(cosmo.dvdz(0.0), 0.0);
    }

    #[test]
    fn test_einstein_de_sitter_growth() {
        let eds = FlatLambdaCdm::new(0.7, 1.0).unwrap();
        for z in [0.0f64, 0.3, 1.0, 4.0] {
            assert_relative_eq!(eds.growth_factor(z), 1.0 / (1.0 + z), max_relative = 1e-8);
            assert_relative_eq!(eds.growth_rate(z), 1.0, max_relative = 1e-8);
        }
    }

    #[test]
    fn test_lambda_growth() {
        let planck = FlatLambdaCdm::uchuu();
        assert_relative_eq!(planck.growth_factor(0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(planck.growth_rate(0.0), 0.3089f64.powf(0.55), epsilon = 0.01);

        let d1 = planck.growth_factor(1.0);
        // Suppressed relative to matter domination, where D(z=1) = 0.5
        assert!(d1 > 0.55 && d1 < 0.65, "D(z=1) = {d1}");
        assert!(planck.growth_rate(1.0) > planck.growth_rate(0.0));
        assert!(planck.growth_rate(5.0) < 1.0 && planck.growth_rate(5.0) > 0.99);
    }

    #[test]
    fn test_growth_rate_is_log_derivative() {
        let cosmo = FlatLambdaCdm::flamingo();
        let (z, h) = (0.5, 1e-3);
        let dln_d = (cosmo.growth_factor(z + h).ln() - cosmo.growth_factor(z - h).ln()) / (2.0 * h);
        assert_relative_eq!(cosmo.growth_rate(z), -(1.0 + z) * dln_d, epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(FlatLambdaCdm::new(0.0, 0.3).is_err());
        assert!(FlatLambdaCdm::new(0.7, 0.0).is_err());
        assert!(FlatLambdaCdm::new(0.7, 1.2).is_err());
        assert!(FlatLambdaCdm::new(f64::NAN, 0.3).is_err());
        assert_eq!(FlatLambdaCdm::new(0.73, 0.25).unwrap(), FlatLambdaCdm::mxxl());
    }
}
