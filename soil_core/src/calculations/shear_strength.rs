//! # Direct Shear (Mohr-Coulomb Fit)
//!
//! Fits `τ = c + σ·tan φ` through three (normal, peak shear) stress pairs by
//! closed-form least squares (IS 2720 Part 13 / ASTM D3080).

use serde::{Deserialize, Serialize};

use super::{ChartPoint, Working};
use crate::errors::{CalcError, CalcResult};
use crate::fields::FormFields;
use crate::units::format_fixed;

/// Envelope extends to this multiple of the largest normal stress
const ENVELOPE_EXTENT: f64 = 1.5;
const ENVELOPE_INTERVALS: u32 = 12;

/// One shear box test (kPa).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressPair {
    pub normal_kpa: f64,
    pub shear_kpa: f64,
}

/// Three direct shear tests at different normal stresses.
///
/// ## JSON Example
///
/// ```json
/// {
///   "tests": [
///     { "normal_kpa": 50.0,  "shear_kpa": 45.0 },
///     { "normal_kpa": 100.0, "shear_kpa": 75.0 },
///     { "normal_kpa": 150.0, "shear_kpa": 105.0 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShearStrengthInput {
    pub tests: [StressPair; 3],
}

impl ShearStrengthInput {
    /// Parse from `normal_1`/`shear_1` through `normal_3`/`shear_3`.
    pub fn from_fields(fields: &FormFields) -> CalcResult<Self> {
        let pair = |n: usize| -> CalcResult<StressPair> {
            Ok(StressPair {
                normal_kpa: fields.required(&format!("normal_{}", n))?,
                shear_kpa: fields.required(&format!("shear_{}", n))?,
            })
        };
        Ok(ShearStrengthInput {
            tests: [pair(1)?, pair(2)?, pair(3)?],
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.tests.iter().any(|t| t.normal_kpa < 0.0) {
            return Err(CalcError::domain("normal_kpa", "Normal stress cannot be negative"));
        }
        let first = self.tests[0].normal_kpa;
        if self.tests.iter().all(|t| t.normal_kpa == first) {
            return Err(CalcError::domain(
                "normal_kpa",
                "Normal stresses must differ to fit a failure envelope",
            ));
        }
        Ok(())
    }
}

/// Soil type and bearing capacity band by friction angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShearStrengthClass {
    /// φ > 35°
    DenseSandGravel,
    /// φ > 30°
    MediumDenseSand,
    /// φ > 25°
    LooseSandStiffClay,
    /// φ > 15°
    SoftToMediumClay,
    VerySoftClay,
}

impl ShearStrengthClass {
    pub fn from_friction_angle(phi_deg: f64) -> Self {
        if phi_deg > 35.0 {
            ShearStrengthClass::DenseSandGravel
        } else if phi_deg > 30.0 {
            ShearStrengthClass::MediumDenseSand
        } else if phi_deg > 25.0 {
            ShearStrengthClass::LooseSandStiffClay
        } else if phi_deg > 15.0 {
            ShearStrengthClass::SoftToMediumClay
        } else {
            ShearStrengthClass::VerySoftClay
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShearStrengthClass::DenseSandGravel => "Dense Sand/Gravel",
            ShearStrengthClass::MediumDenseSand => "Medium Dense Sand",
            ShearStrengthClass::LooseSandStiffClay => "Loose Sand/Stiff Clay",
            ShearStrengthClass::SoftToMediumClay => "Soft to Medium Clay",
            ShearStrengthClass::VerySoftClay => "Very Soft Clay",
        }
    }

    pub fn bearing_capacity(&self) -> &'static str {
        match self {
            ShearStrengthClass::DenseSandGravel => "Very High",
            ShearStrengthClass::MediumDenseSand => "High",
            ShearStrengthClass::LooseSandStiffClay => "Medium",
            ShearStrengthClass::SoftToMediumClay => "Low",
            ShearStrengthClass::VerySoftClay => "Very Low",
        }
    }
}

/// Mohr-Coulomb parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShearStrengthResult {
    /// Cohesion c, floored at 0 (kPa)
    pub cohesion_kpa: f64,
    /// Friction angle φ (degrees)
    pub friction_angle_deg: f64,
    /// Slope of the envelope
    pub tan_phi: f64,
    pub classification: ShearStrengthClass,
    /// Measured points, for plotting over the envelope
    pub test_points: Vec<ChartPoint>,
    /// x = normal stress (kPa), y = shear strength (kPa)
    pub chart: Vec<ChartPoint>,
    pub working: Working,
}

/// Least-squares line through the points: `(slope, intercept)`.
fn fit_line(points: &[StressPair]) -> (f64, f64) {
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.normal_kpa).sum();
    let sum_y: f64 = points.iter().map(|p| p.shear_kpa).sum();
    let sum_xy: f64 = points.iter().map(|p| p.normal_kpa * p.shear_kpa).sum();
    let sum_x2: f64 = points.iter().map(|p| p.normal_kpa * p.normal_kpa).sum();

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}

pub fn calculate(input: &ShearStrengthInput) -> CalcResult<ShearStrengthResult> {
    input.validate()?;

    let (tan_phi, intercept) = fit_line(&input.tests);
    let friction_angle_deg = tan_phi.atan().to_degrees();

    let max_normal = input
        .tests
        .iter()
        .map(|t| t.normal_kpa)
        .fold(f64::MIN, f64::max)
        * ENVELOPE_EXTENT;

    let chart = (0..=ENVELOPE_INTERVALS)
        .map(|i| {
            let sigma = max_normal * f64::from(i) / f64::from(ENVELOPE_INTERVALS);
            ChartPoint {
                x: sigma,
                y: (intercept + sigma * tan_phi).max(0.0),
            }
        })
        .collect();

    let test_points = input
        .tests
        .iter()
        .map(|t| ChartPoint { x: t.normal_kpa, y: t.shear_kpa })
        .collect();

    let cohesion_kpa = intercept.max(0.0);
    let cohesion = format_fixed(cohesion_kpa, 2);
    let angle = format_fixed(friction_angle_deg, 1);
    let working = Working::new(
        "τ = c + σ × tan(φ)",
        format!("τ = {} + σ × tan({}°)", cohesion, angle),
        format!("c = {} kPa, φ = {}°", cohesion, angle),
    );

    log::debug!("shear strength: c={:.2} kPa phi={:.1} deg", intercept, friction_angle_deg);

    Ok(ShearStrengthResult {
        cohesion_kpa,
        friction_angle_deg,
        tan_phi,
        classification: ShearStrengthClass::from_friction_angle(friction_angle_deg),
        test_points,
        chart,
        working,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(normal_kpa: f64, shear_kpa: f64) -> StressPair {
        StressPair { normal_kpa, shear_kpa }
    }

    #[test]
    fn test_exact_line() {
        // τ = 15 + 0.6σ
        let input = ShearStrengthInput {
            tests: [pair(50.0, 45.0), pair(100.0, 75.0), pair(150.0, 105.0)],
        };
        let result = calculate(&input).unwrap();
        assert!((result.tan_phi - 0.6).abs() < 1e-12);
        assert!((result.cohesion_kpa - 15.0).abs() < 1e-9);
        assert!((result.friction_angle_deg - 30.96).abs() < 0.01);
        assert_eq!(result.classification, ShearStrengthClass::MediumDenseSand);
        assert_eq!(result.classification.bearing_capacity(), "High");
        assert_eq!(result.working.formula, "τ = c + σ × tan(φ)");
        assert_eq!(result.working.values, "τ = 15.00 + σ × tan(31.0°)");
        assert_eq!(result.working.result, "c = 15.00 kPa, φ = 31.0°");
    }

    #[test]
    fn test_negative_cohesion_floored() {
        // τ = -10 + 0.5σ
        let input = ShearStrengthInput {
            tests: [pair(100.0, 40.0), pair(200.0, 90.0), pair(300.0, 140.0)],
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.cohesion_kpa, 0.0);
        // Envelope uses the fitted intercept and is floored at zero
        assert_eq!(result.chart[0].y, 0.0);
        assert!((result.chart[12].y - (-10.0 + 450.0 * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_envelope_extent() {
        let input = ShearStrengthInput {
            tests: [pair(50.0, 45.0), pair(100.0, 75.0), pair(150.0, 105.0)],
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.chart.len(), 13);
        assert_eq!(result.chart[0].x, 0.0);
        assert!((result.chart[12].x - 225.0).abs() < 1e-9);
        assert_eq!(result.test_points.len(), 3);
    }

    #[test]
    fn test_rejects_identical_normals() {
        let input = ShearStrengthInput {
            tests: [pair(100.0, 40.0), pair(100.0, 50.0), pair(100.0, 45.0)],
        };
        assert_eq!(calculate(&input).unwrap_err().error_code(), "DOMAIN_ERROR");
    }

    #[test]
    fn test_classification_bands() {
        assert_eq!(ShearStrengthClass::from_friction_angle(36.0), ShearStrengthClass::DenseSandGravel);
        assert_eq!(ShearStrengthClass::from_friction_angle(35.0), ShearStrengthClass::MediumDenseSand);
        assert_eq!(ShearStrengthClass::from_friction_angle(26.0), ShearStrengthClass::LooseSandStiffClay);
        assert_eq!(ShearStrengthClass::from_friction_angle(20.0), ShearStrengthClass::SoftToMediumClay);
        assert_eq!(ShearStrengthClass::from_friction_angle(15.0), ShearStrengthClass::VerySoftClay);
    }

    #[test]
    fn test_from_fields() {
        let fields = FormFields::from_pairs([
            ("normal_1", "50"), ("shear_1", "45"),
            ("normal_2", "100"), ("shear_2", "75"),
            ("normal_3", "150"),
        ]);
        assert_eq!(
            ShearStrengthInput::from_fields(&fields).unwrap_err(),
            CalcError::missing_field("shear_3")
        );
    }
}
