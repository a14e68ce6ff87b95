//! # Permeability (Constant Head)
//!
//! Coefficient of permeability from Darcy's law (ASTM D2434 / IS 2720 Part 36):
//!
//! ```text
//! k = Q·L / (A·h·t)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use soil_core::calculations::permeability::{calculate, PermeabilityInput, PermeabilityClass};
//!
//! let input = PermeabilityInput {
//!     head_difference_cm: 30.0,
//!     length_cm: 10.0,
//!     area_cm2: 50.0,
//!     discharge_cm3: 25.0,
//!     time_s: 60.0,
//! };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.classification, PermeabilityClass::Medium);
//! ```

use serde::{Deserialize, Serialize};

use super::{ChartPoint, Working};
use crate::errors::{CalcError, CalcResult};
use crate::fields::FormFields;
use crate::units::format_exp;

/// Number of intervals in the cumulative discharge chart
const CHART_INTERVALS: u32 = 10;

/// Constant-head permeameter measurements.
///
/// ## JSON Example
///
/// ```json
/// {
///   "head_difference_cm": 30.0,
///   "length_cm": 10.0,
///   "area_cm2": 50.0,
///   "discharge_cm3": 25.0,
///   "time_s": 60.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermeabilityInput {
    /// Head difference h across the specimen (cm)
    pub head_difference_cm: f64,
    /// Specimen length L between manometer taps (cm)
    pub length_cm: f64,
    /// Cross-sectional area A (cm²)
    pub area_cm2: f64,
    /// Volume collected Q (cm³)
    pub discharge_cm3: f64,
    /// Collection time t (s)
    pub time_s: f64,
}

impl PermeabilityInput {
    pub fn from_fields(fields: &FormFields) -> CalcResult<Self> {
        Ok(PermeabilityInput {
            head_difference_cm: fields.required("head_difference")?,
            length_cm: fields.required("length")?,
            area_cm2: fields.required("area")?,
            discharge_cm3: fields.required("discharge")?,
            time_s: fields.required("time")?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        let positive = [
            ("head_difference", self.head_difference_cm),
            ("length", self.length_cm),
            ("area", self.area_cm2),
            ("time", self.time_s),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(CalcError::domain(field, "Value must be positive"));
            }
        }
        if self.discharge_cm3 < 0.0 {
            return Err(CalcError::domain("discharge", "Discharge cannot be negative"));
        }
        Ok(())
    }
}

/// Permeability band (cm/s), strict lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermeabilityClass {
    /// k > 1
    VeryHigh,
    /// k > 1e-1
    High,
    /// k > 1e-3
    Medium,
    /// k > 1e-5
    Low,
    /// k > 1e-7
    VeryLow,
    PracticallyImpermeable,
}

impl PermeabilityClass {
    pub fn from_k(k_cm_s: f64) -> Self {
        if k_cm_s > 1.0 {
            PermeabilityClass::VeryHigh
        } else if k_cm_s > 1e-1 {
            PermeabilityClass::High
        } else if k_cm_s > 1e-3 {
            PermeabilityClass::Medium
        } else if k_cm_s > 1e-5 {
            PermeabilityClass::Low
        } else if k_cm_s > 1e-7 {
            PermeabilityClass::VeryLow
        } else {
            PermeabilityClass::PracticallyImpermeable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PermeabilityClass::VeryHigh => "Very High Permeability",
            PermeabilityClass::High => "High Permeability",
            PermeabilityClass::Medium => "Medium Permeability",
            PermeabilityClass::Low => "Low Permeability",
            PermeabilityClass::VeryLow => "Very Low Permeability",
            PermeabilityClass::PracticallyImpermeable => "Practically Impermeable",
        }
    }

    /// Representative soil for the band
    pub fn soil_type(&self) -> &'static str {
        match self {
            PermeabilityClass::VeryHigh => "Coarse gravel",
            PermeabilityClass::High => "Clean gravel",
            PermeabilityClass::Medium => "Clean sand, sand-gravel mixtures",
            PermeabilityClass::Low => "Fine sand, silty sand",
            PermeabilityClass::VeryLow => "Silt, clayey silt",
            PermeabilityClass::PracticallyImpermeable => "Homogeneous clay",
        }
    }
}

/// Permeability results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermeabilityResult {
    /// Coefficient of permeability k (cm/s)
    pub permeability_cm_s: f64,
    /// Discharge velocity Q/(A·t) (cm/s)
    pub seepage_velocity_cm_s: f64,
    /// Hydraulic gradient i = h/L
    pub hydraulic_gradient: f64,
    pub classification: PermeabilityClass,
    /// x = time (s), y = cumulative discharge (cm³)
    pub chart: Vec<ChartPoint>,
    pub working: Working,
}

pub fn calculate(input: &PermeabilityInput) -> CalcResult<PermeabilityResult> {
    input.validate()?;

    let k = (input.discharge_cm3 * input.length_cm)
        / (input.area_cm2 * input.head_difference_cm * input.time_s);
    let velocity = input.discharge_cm3 / (input.area_cm2 * input.time_s);
    let gradient = input.head_difference_cm / input.length_cm;

    let chart = (0..=CHART_INTERVALS)
        .map(|i| {
            let fraction = f64::from(i) / f64::from(CHART_INTERVALS);
            ChartPoint {
                x: input.time_s * fraction,
                y: input.discharge_cm3 * fraction,
            }
        })
        .collect();

    let working = Working::new(
        "k = (Q × L) / (A × h × t)",
        format!(
            "k = ({} × {}) / ({} × {} × {})",
            input.discharge_cm3, input.length_cm, input.area_cm2, input.head_difference_cm, input.time_s
        ),
        format!("k = {} cm/s", format_exp(k, 3)),
    );

    log::debug!("permeability: k={:e} cm/s", k);

    Ok(PermeabilityResult {
        permeability_cm_s: k,
        seepage_velocity_cm_s: velocity,
        hydraulic_gradient: gradient,
        classification: PermeabilityClass::from_k(k),
        chart,
        working,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PermeabilityInput {
        PermeabilityInput {
            head_difference_cm: 30.0,
            length_cm: 10.0,
            area_cm2: 50.0,
            discharge_cm3: 25.0,
            time_s: 60.0,
        }
    }

    #[test]
    fn test_darcy_scenario() {
        let result = calculate(&sample()).unwrap();
        assert!((result.permeability_cm_s - 250.0 / 90_000.0).abs() < 1e-15);
        assert_eq!(format_exp(result.permeability_cm_s, 3), "2.778e-3");
        assert_eq!(result.classification.label(), "Medium Permeability");
        assert!((result.hydraulic_gradient - 3.0).abs() < 1e-12);
        assert!((result.seepage_velocity_cm_s - 25.0 / 3000.0).abs() < 1e-15);
    }

    #[test]
    fn test_working_substitutes_measurements() {
        let working = calculate(&sample()).unwrap().working;
        assert_eq!(working.formula, "k = (Q × L) / (A × h × t)");
        assert_eq!(working.values, "k = (25 × 10) / (50 × 30 × 60)");
        assert_eq!(working.result, "k = 2.778e-3 cm/s");
    }

    #[test]
    fn test_k_is_linear_in_discharge() {
        let base = calculate(&sample()).unwrap();
        let mut doubled = sample();
        doubled.discharge_cm3 *= 2.0;
        let doubled = calculate(&doubled).unwrap();
        assert!((doubled.permeability_cm_s - 2.0 * base.permeability_cm_s).abs() < 1e-15);
    }

    #[test]
    fn test_six_bands() {
        assert_eq!(PermeabilityClass::from_k(2.0), PermeabilityClass::VeryHigh);
        assert_eq!(PermeabilityClass::from_k(0.5), PermeabilityClass::High);
        assert_eq!(PermeabilityClass::from_k(1e-2), PermeabilityClass::Medium);
        assert_eq!(PermeabilityClass::from_k(1e-3), PermeabilityClass::Low);
        assert_eq!(PermeabilityClass::from_k(1e-6), PermeabilityClass::VeryLow);
        assert_eq!(PermeabilityClass::from_k(1e-9), PermeabilityClass::PracticallyImpermeable);
        assert_eq!(PermeabilityClass::PracticallyImpermeable.soil_type(), "Homogeneous clay");
    }

    #[test]
    fn test_chart() {
        let result = calculate(&sample()).unwrap();
        assert_eq!(result.chart.len(), 11);
        assert_eq!(result.chart[0], ChartPoint { x: 0.0, y: 0.0 });
        assert_eq!(result.chart[10], ChartPoint { x: 60.0, y: 25.0 });
    }

    #[test]
    fn test_rejects_zero_area() {
        let mut input = sample();
        input.area_cm2 = 0.0;
        assert_eq!(calculate(&input).unwrap_err().error_code(), "DOMAIN_ERROR");
    }
}
