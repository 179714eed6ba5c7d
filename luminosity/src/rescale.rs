//! Rank-preserving magnitude rescaling between redshifts.
//!
//! A galaxy of magnitude M at redshift z has cumulative density n(<M, z). Its
//! rescaled magnitude at z' is the magnitude with the same density at z'. The
//! inversion is done on cumulative curves sampled at fixed redshift bin
//! edges, and the two edge answers of a bin are blended linearly by where z'
//! falls within it.
//!
//! Densities are compared as `log10` values. A galaxy whose density has
//! underflowed to zero (`-inf`) is pinned to the brightest finite sample of
//! each edge curve.

use lf_math::{invert_monotone, AxisRange};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{LuminosityError, Result};
use crate::model::LuminosityFunction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RescaleConfig {
    /// Bin edges for target redshifts
    pub redshift_bins: AxisRange,
    /// Magnitude samples of each edge curve
    pub magnitudes: AxisRange,
}

impl Default for RescaleConfig {
    fn default() -> Self {
        Self {
            redshift_bins: AxisRange::new(0.0, 1.201, 0.05),
            magnitudes: AxisRange::new(-25.0, 10.0, 0.01),
        }
    }
}

impl RescaleConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, axis) in [
            ("redshift_bins", &self.redshift_bins),
            ("magnitudes", &self.magnitudes),
        ] {
            axis.validate()?;
            if axis.step <= 0.0 || axis.len()? < 2 {
                return Err(LuminosityError::Configuration(format!(
                    "rescale axis {name} ({axis}) must ascend through at least 2 samples"
                )));
            }
        }
        Ok(())
    }
}

/// Moves magnitudes between redshifts at constant cumulative density.
#[derive(Debug, Clone)]
pub struct MagnitudeRescaler {
    edges: Vec<f64>,
    magnitudes: Vec<f64>,
}

impl MagnitudeRescaler {
    pub fn new(config: &RescaleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            edges: config.redshift_bins.to_vec()?,
            magnitudes: config.magnitudes.to_vec()?,
        })
    }

    /// Lowest and highest target redshift accepted.
    pub fn redshift_range(&self) -> (f64, f64) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }

    /// Bin `[edges[k], edges[k+1])` holding `redshift`; the last bin is
    /// closed on the right.
    fn bin_index(&self, redshift: f64) -> Result<usize> {
        let (min, max) = self.redshift_range();
        if !(redshift >= min && redshift <= max) {
            return Err(LuminosityError::RedshiftOutOfRange { redshift, min, max });
        }
        let bins = self.edges.len() - 1;
        let upper = self.edges.partition_point(|&e| e <= redshift);
        Ok((upper.max(1) - 1).min(bins - 1))
    }

    /// Rescale each magnitude from its original redshift to its new redshift.
    ///
    /// # Errors
    /// * `LengthMismatch` if the three slices differ in length
    /// * `RedshiftOutOfRange` if a new redshift lies outside the bin edges
    /// * `NumericDomain` if the model density of an input is NaN or infinite
    pub fn rescale<L>(
        &self,
        model: &L,
        magnitudes: &[f64],
        original_redshifts: &[f64],
        new_redshifts: &[f64],
    ) -> Result<Vec<f64>>
    where
        L: LuminosityFunction + ?Sized,
    {
        for other in [original_redshifts.len(), new_redshifts.len()] {
            if other != magnitudes.len() {
                return Err(LuminosityError::LengthMismatch {
                    expected: magnitudes.len(),
                    actual: other,
                });
            }
        }

        let bins = new_redshifts
            .iter()
            .map(|&z| self.bin_index(z))
            .collect::<Result<Vec<usize>>>()?;

        let log_n: Vec<f64> = magnitudes
            .par_iter()
            .zip(original_redshifts.par_iter())
            .map(|(&m, &z)| model.log_phi_cumulative(m, z))
            .collect();

        if let Some(i) = log_n.iter().position(|v| v.is_nan() || *v == f64::INFINITY) {
            return Err(LuminosityError::NumericDomain(format!(
                "log10 cumulative density is {} at M={} z={}",
                log_n[i], magnitudes[i], original_redshifts[i]
            )));
        }

        let mut needed = vec![false; self.edges.len()];
        for &k in &bins {
            needed[k] = true;
            needed[k + 1] = true;
        }
        debug!(
            "Rescaling {} magnitudes using {} of {} redshift edges",
            magnitudes.len(),
            needed.iter().filter(|&&n| n).count(),
            self.edges.len()
        );

        let curves: Vec<Option<Vec<f64>>> = self
            .edges
            .par_iter()
            .zip(needed.par_iter())
            .map(|(&z, &wanted)| {
                wanted.then(|| model.log_phi_cumulative_row(&self.magnitudes, z))
            })
            .collect();

        bins.par_iter()
            .zip(log_n.par_iter())
            .zip(new_redshifts.par_iter())
            .map(|((&k, &log_n), &z)| {
                let (Some(low), Some(high)) = (&curves[k], &curves[k + 1]) else {
                    return Err(LuminosityError::NumericDomain(format!(
                        "no cumulative curve for redshift bin {k}"
                    )));
                };
                let m_low = invert_monotone(&self.magnitudes, low, floor_to_curve(low, log_n));
                let m_high = invert_monotone(&self.magnitudes, high, floor_to_curve(high, log_n));
                let frac = (z - self.edges[k]) / (self.edges[k + 1] - self.edges[k]);
                Ok(m_low + frac * (m_high - m_low))
            })
            .collect()
    }

    /// Rescale a single magnitude.
    pub fn rescale_one<L>(
        &self,
        model: &L,
        magnitude: f64,
        original_redshift: f64,
        new_redshift: f64,
    ) -> Result<f64>
    where
        L: LuminosityFunction + ?Sized,
    {
        let rescaled = self.rescale(model, &[magnitude], &[original_redshift], &[new_redshift])?;
        Ok(rescaled[0])
    }
}

/// Replace an underflowed `-inf` target with the lowest finite value of `curve`.
fn floor_to_curve(curve: &[f64], log_n: f64) -> f64 {
    if log_n != f64::NEG_INFINITY {
        return log_n;
    }
    curve.iter().copied().find(|v| v.is_finite()).unwrap_or(log_n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Evolution;
    use crate::schechter::{SchechterLuminosityFunction, SchechterParameters};
    use approx::assert_relative_eq;

    fn schechter(p: f64, q: f64) -> SchechterLuminosityFunction {
        SchechterLuminosityFunction::new(
            SchechterParameters {
                phi_star: 0.01,
                m_star: -20.5,
                alpha: -1.2,
            },
            Evolution::new(p, q),
        )
        .unwrap()
    }

    fn rescaler() -> MagnitudeRescaler {
        MagnitudeRescaler::new(&RescaleConfig::default()).unwrap()
    }

    #[test]
    fn test_default_edges() {
        let rescaler = rescaler();
        assert_eq!(rescaler.edges.len(), 25);
        assert_eq!(rescaler.redshift_range().0, 0.0);
        assert_relative_eq!(rescaler.redshift_range().1, 1.2, epsilon = 1e-12);
    }

    #[test]
    fn test_same_redshift_is_fixed_point() {
        let rescaler = rescaler();
        let mags = [-23.0, -21.5, -20.0, -18.0, -16.5];
        let zs = [0.0, 0.12, 0.37, 0.8, 1.19];

        let lf = schechter(0.0, 1.0);
        let out = rescaler.rescale(&lf, &mags, &zs, &zs).unwrap();
        for (m, m0) in out.iter().zip(mags) {
            assert_relative_eq!(*m, m0, epsilon = 1e-3);
        }

        let lf = schechter(1.5, 1.0);
        let out = rescaler.rescale(&lf, &mags, &zs, &zs).unwrap();
        for (m, m0) in out.iter().zip(mags) {
            assert_relative_eq!(*m, m0, epsilon = 1e-2);
        }
    }

    #[test]
    fn test_pure_magnitude_evolution() {
        // With P = 0 a galaxy keeps its offset from M*(z)
        let lf = schechter(0.0, 1.0);
        let m = rescaler().rescale_one(&lf, -21.0, 0.1, 0.6).unwrap();
        assert_relative_eq!(m, -21.5, epsilon = 1e-3);
    }

    #[test]
    fn test_bright_galaxies_keep_their_order() {
        let lf = schechter(1.0, 1.0);
        let out = rescaler()
            .rescale(&lf, &[-35.0, -30.0, -25.0], &[0.3; 3], &[0.5; 3])
            .unwrap();

        assert!(out.iter().all(|m| m.is_finite()));
        assert!(out[0] < out[1] && out[1] < out[2], "{out:?}");
    }

    /// Cumulative density that is exactly zero brighter than -22 and NaN
    /// fainter than 5.
    struct Truncated;

    impl LuminosityFunction for Truncated {
        fn phi(&self, _magnitude: f64, _redshift: f64) -> f64 {
            1.0
        }

        fn phi_cumulative(&self, magnitude: f64, _redshift: f64) -> f64 {
            if magnitude > 5.0 {
                f64::NAN
            } else if magnitude < -22.0 {
                0.0
            } else {
                10f64.powf(0.4 * (magnitude + 20.0) - 3.0)
            }
        }
    }

    #[test]
    fn test_zero_density_pins_to_brightest_finite_sample() {
        let config = RescaleConfig {
            redshift_bins: AxisRange::new(0.0, 1.201, 0.05),
            magnitudes: AxisRange::new(-25.0, 5.0, 0.01),
        };
        let rescaler = MagnitudeRescaler::new(&config).unwrap();

        let out = rescaler.rescale_one(&Truncated, -30.0, 0.3, 0.5).unwrap();
        assert!(!out.is_nan());
        assert_relative_eq!(out, -22.0, epsilon = 0.011);
    }

    #[test]
    fn test_nan_density_is_reported() {
        let config = RescaleConfig {
            redshift_bins: AxisRange::new(0.0, 1.201, 0.05),
            magnitudes: AxisRange::new(-25.0, 5.0, 0.01),
        };
        let rescaler = MagnitudeRescaler::new(&config).unwrap();

        assert!(matches!(
            rescaler.rescale(&Truncated, &[-20.0, 8.0], &[0.3, 0.3], &[0.5, 0.5]),
            Err(LuminosityError::NumericDomain(_))
        ));
        assert!(matches!(
            rescaler.rescale_one(&schechter(1.0, 1.0), f64::NAN, 0.3, 0.5),
            Err(LuminosityError::NumericDomain(_))
        ));
    }

    #[test]
    fn test_bin_edges() {
        let rescaler = rescaler();
        assert_eq!(rescaler.bin_index(0.0).unwrap(), 0);
        assert_eq!(rescaler.bin_index(0.05).unwrap(), 1);
        assert_eq!(rescaler.bin_index(0.07).unwrap(), 1);
        // Top edge belongs to the last bin
        assert_eq!(rescaler.bin_index(rescaler.redshift_range().1).unwrap(), 23);
    }

    #[test]
    fn test_out_of_range_redshift() {
        let rescaler = rescaler();
        let lf = schechter(1.0, 1.0);

        match rescaler.rescale(&lf, &[-20.0, -21.0], &[0.1, 0.1], &[0.5, 1.3]) {
            Err(LuminosityError::RedshiftOutOfRange { redshift, min, .. }) => {
                assert_eq!(redshift, 1.3);
                assert_eq!(min, 0.0);
            }
            other => panic!("Expected RedshiftOutOfRange, got {other:?}"),
        }

        assert!(rescaler.rescale_one(&lf, -20.0, 0.1, -0.01).is_err());
        assert!(rescaler.rescale_one(&lf, -20.0, 0.1, f64::NAN).is_err());
    }

    #[test]
    fn test_length_mismatch() {
        let lf = schechter(1.0, 1.0);
        assert!(matches!(
            rescaler().rescale(&lf, &[-20.0, -21.0], &[0.1], &[0.2, 0.3]),
            Err(LuminosityError::LengthMismatch { expected: 2, actual: 1 })
        ));
        assert!(rescaler().rescale(&lf, &[], &[], &[]).unwrap().is_empty());
    }
}
