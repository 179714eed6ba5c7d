//! Conversions between absolute magnitude and luminosity.
//!
//! Magnitudes follow the M - 5log(h) convention and luminosities are in units
//! of Lsun/h^2.

/// Absolute magnitude of the Sun used as the luminosity zero point.
pub const SOLAR_ABSOLUTE_MAGNITUDE: f64 = 4.76;

/// Convert absolute magnitude [M-5logh] to luminosity [Lsun/h^2].
pub fn mag2lum(magnitude: f64) -> f64 {
    10f64.powf((SOLAR_ABSOLUTE_MAGNITUDE - magnitude) / 2.5)
}

/// Convert luminosity [Lsun/h^2] to absolute magnitude [M-5logh].
pub fn lum2mag(luminosity: f64) -> f64 {
    SOLAR_ABSOLUTE_MAGNITUDE - 2.5 * luminosity.log10()
}
