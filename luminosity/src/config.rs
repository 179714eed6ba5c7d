//! Tunable constants for the luminosity-function engine.
//!
//! Every option has a default matching the values the models were calibrated
//! with, so an empty JSON object `{}` is a complete configuration.
//!
//! ```
//! use luminosity::config::LuminosityConfig;
//!
//! let config: LuminosityConfig =
//!     serde_json::from_str(r#"{ "transition": { "steepness": 60.0 } }"#).unwrap();
//! assert_eq!(config.transition.steepness, 60.0);
//! assert_eq!(config.transition.center, 0.15);
//! assert_eq!(config.reference_redshift, 0.1);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::blended::Transition;
use crate::distance::DistanceGridConfig;
use crate::error::{LuminosityError, Result};
use crate::model::DEFAULT_REFERENCE_REDSHIFT;
use crate::rescale::RescaleConfig;
use crate::smoothing::SmoothingConfig;
use crate::threshold::ThresholdGridConfig;

/// Complete configuration, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LuminosityConfig {
    /// Redshift at which tabulated curves are defined and evolution is anchored
    pub reference_redshift: f64,
    /// Blend between the near and far models
    pub transition: Transition,
    /// Axes of the magnitude-threshold table
    pub threshold: ThresholdGridConfig,
    /// Sampling of the cumulative curve used to derive the differential curve
    pub smoothing: SmoothingConfig,
    /// Redshift bins and magnitude grid of the rescaler
    pub rescale: RescaleConfig,
    /// Redshift sampling of the distance inverter
    pub distance: DistanceGridConfig,
}

impl Default for LuminosityConfig {
    fn default() -> Self {
        Self {
            reference_redshift: DEFAULT_REFERENCE_REDSHIFT,
            transition: Transition::default(),
            threshold: ThresholdGridConfig::default(),
            smoothing: SmoothingConfig::default(),
            rescale: RescaleConfig::default(),
            distance: DistanceGridConfig::default(),
        }
    }
}

impl LuminosityConfig {
    /// Load from a JSON file; missing keys take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| LuminosityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| {
            LuminosityError::Configuration(format!("{}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a JSON file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LuminosityError::Configuration(e.to_string()))?;
        std::fs::write(path, json).map_err(|source| LuminosityError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every option is usable before any table is built.
    pub fn validate(&self) -> Result<()> {
        if !self.reference_redshift.is_finite() || self.reference_redshift < 0.0 {
            return Err(LuminosityError::Configuration(format!(
                "reference_redshift must be a non-negative finite number, got {}",
                self.reference_redshift
            )));
        }
        self.transition.validate()?;
        self.threshold.validate()?;
        self.smoothing.validate()?;
        self.rescale.validate()?;
        self.distance.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_math::AxisRange;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = LuminosityConfig::default();
        assert_eq!(config.reference_redshift, 0.1);
        assert_eq!(config.transition.steepness, 120.0);
        assert_eq!(config.transition.center, 0.15);
        assert_eq!(config.threshold.magnitudes, AxisRange::new(-25.0, 0.0, 0.001));
        assert_eq!(config.smoothing.step, 0.001);
        assert_eq!(config.rescale.redshift_bins, AxisRange::new(0.0, 1.201, 0.05));
        assert_eq!(config.distance.step, 1e-4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: LuminosityConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LuminosityConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config: LuminosityConfig = serde_json::from_str(
            r#"{ "reference_redshift": 0.2, "threshold": { "redshifts": "0:0.5:0.05" } }"#,
        )
        .unwrap();

        assert_eq!(config.reference_redshift, 0.2);
        assert_eq!(config.threshold.redshifts, AxisRange::new(0.0, 0.5, 0.05));
        assert_eq!(config.threshold.log_densities, AxisRange::new(-12.0, -0.5, 0.01));
    }

    #[test]
    fn test_file_round_trip() {
        let mut config = LuminosityConfig::default();
        config.transition.steepness = 80.0;
        config.rescale.magnitudes = AxisRange::new(-24.0, 5.0, 0.02);

        let file = NamedTempFile::new().unwrap();
        config.save_to_file(file.path()).unwrap();
        let loaded = LuminosityConfig::load_from_file(file.path()).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_files() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{ not json").unwrap();
        assert!(matches!(
            LuminosityConfig::load_from_file(file.path()),
            Err(LuminosityError::Configuration(_))
        ));

        std::fs::write(file.path(), r#"{ "reference_redshift": -1.0 }"#).unwrap();
        assert!(matches!(
            LuminosityConfig::load_from_file(file.path()),
            Err(LuminosityError::Configuration(_))
        ));

        assert!(matches!(
            LuminosityConfig::load_from_file(Path::new("/nonexistent/lf.json")),
            Err(LuminosityError::Io { .. })
        ));
    }
}
