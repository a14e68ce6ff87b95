//! # Hydrometer Analysis
//!
//! Grain diameter of fine-grained soil from a sedimentation reading
//! (ASTM D7928 / IS 2720 Part 4).
//!
//! ## Method
//!
//! 1. Temperature-correct the reading: `Rc = R + 0.1 (T − T_ref)`
//! 2. Effective depth: `L = 10 + 0.5 Rc` (cm)
//! 3. Stokes' law with temperature-dependent viscosity:
//!    `D = √(18 η L / ((Gs − 1) ρw g t))`
//! 4. Percent finer: `(Rc − 1) · 100 / Ms`, clamped to 0..=100
//!
//! The chart pairs the Stokes diameter at fixed time stops with a decayed
//! percent-finer value. The decay is a display approximation, not a
//! sedimentation model.
//!
//! ## Example
//!
//! ```rust
//! use soil_core::calculations::hydrometer::{calculate, HydrometerAssumptions, HydrometerInput};
//!
//! let input = HydrometerInput {
//!     soil_mass_g: 50.0,
//!     hydrometer_reading: 25.0,
//!     temperature_c: None,
//!     elapsed_time_min: 60.0,
//! };
//! let result = calculate(&input, &HydrometerAssumptions::default()).unwrap();
//! assert_eq!(result.chart.len(), 13);
//! ```

use serde::{Deserialize, Serialize};

use super::ChartPoint;
use crate::errors::{CalcError, CalcResult};
use crate::fields::FormFields;
use crate::units::{minutes_to_seconds, GRAVITY_CM_S2, MM_PER_CM, WATER_DENSITY_G_CM3};

/// Chart time stops (minutes)
pub const CHART_TIMES_MIN: [f64; 13] = [
    0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 15.0, 30.0, 60.0, 120.0, 240.0, 480.0, 1440.0,
];

/// Liquid water range accepted for the suspension (°C)
const WATER_TEMPERATURE_RANGE_C: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Sand/silt boundary (mm)
const SAND_LIMIT_MM: f64 = 0.075;
/// Silt/clay boundary (mm)
const SILT_LIMIT_MM: f64 = 0.002;

/// Fixed assumptions for hydrometer reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrometerAssumptions {
    /// Calibration temperature of the hydrometer (°C)
    pub reference_temperature_c: f64,
    /// Temperature used when none is entered (°C)
    pub default_temperature_c: f64,
    /// Reading correction per °C above reference
    pub correction_per_degree: f64,
    /// Assumed specific gravity of solids
    pub specific_gravity: f64,
    /// Chart decay rate per elapsed-time multiple
    pub chart_decay: f64,
}

impl HydrometerAssumptions {
    pub fn validate(&self) -> CalcResult<()> {
        if !self.specific_gravity.is_finite() || self.specific_gravity <= 1.0 {
            return Err(CalcError::domain("specific_gravity", "Specific gravity must exceed 1.0"));
        }
        if !WATER_TEMPERATURE_RANGE_C.contains(&self.default_temperature_c) {
            return Err(CalcError::domain(
                "default_temperature_c",
                "Default temperature must be between 0 and 100 °C",
            ));
        }
        let finite = [
            ("reference_temperature_c", self.reference_temperature_c),
            ("correction_per_degree", self.correction_per_degree),
            ("chart_decay", self.chart_decay),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(CalcError::domain(field, "Value must be a finite number"));
            }
        }
        Ok(())
    }
}

impl Default for HydrometerAssumptions {
    fn default() -> Self {
        HydrometerAssumptions {
            reference_temperature_c: 27.0,
            default_temperature_c: 27.0,
            correction_per_degree: 0.1,
            specific_gravity: 2.65,
            chart_decay: 0.1,
        }
    }
}

/// Hydrometer reading at one elapsed time.
///
/// ## JSON Example
///
/// ```json
/// {
///   "soil_mass_g": 50.0,
///   "hydrometer_reading": 25.0,
///   "temperature_c": 27.0,
///   "elapsed_time_min": 60.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrometerInput {
    /// Oven-dry soil mass in suspension (g)
    pub soil_mass_g: f64,

    /// Raw hydrometer reading
    pub hydrometer_reading: f64,

    /// Suspension temperature (°C); defaults from assumptions
    #[serde(default)]
    pub temperature_c: Option<f64>,

    /// Elapsed time since start of sedimentation (min)
    pub elapsed_time_min: f64,
}

impl HydrometerInput {
    pub fn from_fields(fields: &FormFields) -> CalcResult<Self> {
        Ok(HydrometerInput {
            soil_mass_g: fields.required("soil_mass")?,
            hydrometer_reading: fields.required("hydrometer_reading")?,
            temperature_c: fields.optional("temperature")?,
            elapsed_time_min: fields.required("elapsed_time")?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.soil_mass_g <= 0.0 {
            return Err(CalcError::domain("soil_mass", "Soil mass must be positive"));
        }
        if self.elapsed_time_min <= 0.0 {
            return Err(CalcError::domain("elapsed_time", "Elapsed time must be positive"));
        }
        if let Some(t) = self.temperature_c {
            if !WATER_TEMPERATURE_RANGE_C.contains(&t) {
                return Err(CalcError::domain("temperature", "Temperature must be between 0 and 100 °C"));
            }
        }
        Ok(())
    }
}

/// Size fraction of the computed diameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradationClass {
    Sand,
    Silt,
    Clay,
}

impl GradationClass {
    pub fn from_diameter_mm(diameter_mm: f64) -> Self {
        if diameter_mm > SAND_LIMIT_MM {
            GradationClass::Sand
        } else if diameter_mm > SILT_LIMIT_MM {
            GradationClass::Silt
        } else {
            GradationClass::Clay
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GradationClass::Sand => "Sand Size",
            GradationClass::Silt => "Silt Size",
            GradationClass::Clay => "Clay Size",
        }
    }
}

/// Hydrometer results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrometerResult {
    /// Temperature actually used (°C)
    pub temperature_c: f64,
    pub corrected_reading: f64,
    /// Effective depth L (cm)
    pub effective_depth_cm: f64,
    /// Water viscosity at the test temperature (poise)
    pub viscosity_poise: f64,
    /// Equivalent grain diameter (mm)
    pub grain_diameter_mm: f64,
    /// Percent finer, 0..=100
    pub percent_finer: f64,
    pub classification: GradationClass,
    /// x = diameter (mm), y = percent finer
    pub chart: Vec<ChartPoint>,
}

/// Dynamic viscosity of water in poise (g/cm·s), Poiseuille's fit.
pub fn water_viscosity_poise(temperature_c: f64) -> f64 {
    0.01779 / (1.0 + 0.03368 * temperature_c + 0.000221 * temperature_c * temperature_c)
}

/// Stokes' law diameter in mm for a fall of `depth_cm` over `time_min`.
fn stokes_diameter_mm(viscosity: f64, depth_cm: f64, time_min: f64, specific_gravity: f64) -> f64 {
    let t_s = minutes_to_seconds(time_min);
    let d_cm = (18.0 * viscosity * depth_cm
        / ((specific_gravity - 1.0) * WATER_DENSITY_G_CM3 * GRAVITY_CM_S2 * t_s))
        .sqrt();
    d_cm * MM_PER_CM
}

pub fn calculate(input: &HydrometerInput, assumptions: &HydrometerAssumptions) -> CalcResult<HydrometerResult> {
    input.validate()?;
    assumptions.validate()?;

    let temperature_c = input.temperature_c.unwrap_or(assumptions.default_temperature_c);
    let corrected_reading = input.hydrometer_reading
        + assumptions.correction_per_degree * (temperature_c - assumptions.reference_temperature_c);
    let effective_depth_cm = 10.0 + 0.5 * corrected_reading;
    if effective_depth_cm <= 0.0 {
        return Err(CalcError::domain("hydrometer_reading", "Reading gives a non-positive effective depth"));
    }

    let viscosity_poise = water_viscosity_poise(temperature_c);
    if !viscosity_poise.is_finite() || viscosity_poise <= 0.0 {
        return Err(CalcError::domain("temperature", "No positive water viscosity at this temperature"));
    }
    let grain_diameter_mm = stokes_diameter_mm(
        viscosity_poise,
        effective_depth_cm,
        input.elapsed_time_min,
        assumptions.specific_gravity,
    );

    if !grain_diameter_mm.is_finite() {
        return Err(CalcError::domain("hydrometer_reading", "Readings do not give a finite grain diameter"));
    }

    let percent_finer = ((corrected_reading - 1.0) * 100.0 / input.soil_mass_g).clamp(0.0, 100.0);

    let chart = CHART_TIMES_MIN
        .iter()
        .map(|&t| {
            let relative = (t - input.elapsed_time_min) / input.elapsed_time_min;
            ChartPoint {
                x: stokes_diameter_mm(viscosity_poise, effective_depth_cm, t, assumptions.specific_gravity),
                y: (percent_finer * (-assumptions.chart_decay * relative).exp()).clamp(0.0, 100.0),
            }
        })
        .collect();

    log::debug!("hydrometer: D={:.5} mm, finer={:.1}%", grain_diameter_mm, percent_finer);

    Ok(HydrometerResult {
        temperature_c,
        corrected_reading,
        effective_depth_cm,
        viscosity_poise,
        grain_diameter_mm,
        percent_finer,
        classification: GradationClass::from_diameter_mm(grain_diameter_mm),
        chart,
    })
}
