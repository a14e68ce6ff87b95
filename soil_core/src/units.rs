//! # Units and Display Precision
//!
//! Soil Lab works in laboratory (CGS-flavoured) units throughout:
//! - Mass: grams (g)
//! - Volume: cubic centimetres (cm³)
//! - Density: g/cm³
//! - Length: millimetres for specimen heights and grain diameters, centimetres
//!   for permeameter geometry and hydrometer depth
//! - Stress/pressure: kPa (kN/m²)
//! - Time: minutes for sedimentation and consolidation, seconds for permeability
//!
//! Results keep full `f64` precision. Rounding happens only when a value is
//! shown, via [`format_fixed`] and [`format_exp`].
//!
//! ## Example
//!
//! ```rust
//! use soil_core::units::{format_exp, format_fixed};
//!
//! assert_eq!(format_fixed(1.90678, 3), "1.907");
//! assert_eq!(format_exp(0.0027777, 3), "2.778e-3");
//! ```

/// Density of water (g/cm³)
pub const WATER_DENSITY_G_CM3: f64 = 1.0;

/// Gravitational acceleration (cm/s²)
pub const GRAVITY_CM_S2: f64 = 981.0;

/// Seconds per minute
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Millimetres per centimetre
pub const MM_PER_CM: f64 = 10.0;

/// Convert minutes to seconds.
pub fn minutes_to_seconds(minutes: f64) -> f64 {
    minutes * SECONDS_PER_MINUTE
}

/// Fixed-point display, e.g. `format_fixed(25.0, 2) == "25.00"`.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Exponential display with an explicit exponent sign for positive powers,
/// e.g. `2.778e-3` and `1.500e+2`.
pub fn format_exp(value: f64, digits: usize) -> String {
    let raw = format!("{:.*e}", digits, value);
    match raw.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => raw,
    }
}
