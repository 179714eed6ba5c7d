//! Galaxy luminosity functions for synthetic catalogues
//!
//! This crate models the number density of galaxies as a function of
//! absolute magnitude and redshift, and inverts it: given a target number
//! density and a redshift it returns the magnitude threshold, and it moves a
//! galaxy's magnitude between redshifts at fixed rank. It also maps comoving
//! distance back to redshift for a background cosmology.

pub mod blended;
pub mod config;
pub mod cosmology;
pub mod distance;
pub mod error;
pub mod io;
pub mod magnitude;
pub mod model;
pub mod rescale;
pub mod schechter;
pub mod smoothing;
pub mod tabulated;
pub mod target;
pub mod threshold;

// Re-exports for easier access
pub use blended::{BlendedLuminosityFunction, Transition};
pub use config::LuminosityConfig;
pub use cosmology::{Cosmology, FlatLambdaCdm};
pub use distance::{DistanceGridConfig, DistanceRedshiftInverter};
pub use error::{LuminosityError, Result};
pub use magnitude::{lum2mag, mag2lum, SOLAR_ABSOLUTE_MAGNITUDE};
pub use model::{Evolution, LuminosityFunction};
pub use rescale::{MagnitudeRescaler, RescaleConfig};
pub use schechter::{SchechterLuminosityFunction, SchechterParameters};
pub use smoothing::{SmoothedDifferential, SmoothingConfig};
pub use tabulated::TabulatedLuminosityFunction;
pub use target::TargetLuminosityFunction;
pub use threshold::{
    build_threshold_grid, ThresholdGrid, ThresholdGridConfig, ThresholdInterpolator,
};
