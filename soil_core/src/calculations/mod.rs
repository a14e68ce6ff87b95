//! # Soil Test Calculations
//!
//! One module per laboratory test. Each follows the pattern:
//!
//! - `*Input` - Measurements (JSON-serializable), with `from_fields` to parse form input
//! - `*Result` - Derived values, classification, chart points (JSON-serializable)
//! - `calculate(input) -> Result<*Result, CalcError>` - Pure calculation function
//!
//! Calculators with fixed assumptions (default mold volume, reference
//! temperature, specific gravity) take their assumption table as a second
//! argument; see [`crate::settings::LabSettings`].
//!
//! ## Available Calculations
//!
//! - [`plasticity`] - Atterberg limits
//! - [`hydrometer`] - Sedimentation / Stokes' law
//! - [`compaction`] - Standard Proctor
//! - [`grain_size`] - Sieve analysis
//! - [`permeability`] - Constant head, Darcy's law
//! - [`consolidation`] - Oedometer, time-rate and pressure-increment modes
//! - [`shear_strength`] - Direct shear, Mohr-Coulomb fit
//! - [`specific_gravity`] - Pycnometer

pub mod compaction;
pub mod consolidation;
pub mod grain_size;
pub mod hydrometer;
pub mod permeability;
pub mod plasticity;
pub mod shear_strength;
pub mod specific_gravity;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::fields::FormFields;
use crate::settings::LabSettings;
use crate::units::{format_exp, format_fixed};

pub use compaction::{CompactionInput, CompactionResult};
pub use consolidation::{ConsolidationInput, ConsolidationResult};
pub use grain_size::{GrainSizeInput, GrainSizeResult};
pub use hydrometer::{HydrometerInput, HydrometerResult};
pub use permeability::{PermeabilityInput, PermeabilityResult};
pub use plasticity::{PlasticityInput, PlasticityResult};
pub use shear_strength::{ShearStrengthInput, ShearStrengthResult};
pub use specific_gravity::{SpecificGravityInput, SpecificGravityResult};

/// A point on a result chart. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

/// A formula written out with the measured values substituted, for
/// checking a result by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Working {
    pub formula: String,
    pub values: String,
    pub result: String,
}

impl Working {
    pub(crate) fn new(formula: &str, values: String, result: String) -> Self {
        Working {
            formula: formula.to_string(),
            values,
            result,
        }
    }
}

/// Enum wrapper for all test inputs.
///
/// Lets a single JSON document name the test to run:
///
/// ```json
/// { "type": "Plasticity", "liquid_limit": 45.0, "plastic_limit": 20.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SoilTest {
    Plasticity(PlasticityInput),
    Hydrometer(HydrometerInput),
    Compaction(CompactionInput),
    GrainSize(GrainSizeInput),
    Permeability(PermeabilityInput),
    Consolidation(ConsolidationInput),
    ShearStrength(ShearStrengthInput),
    SpecificGravity(SpecificGravityInput),
}

impl SoilTest {
    /// Test names accepted by [`SoilTest::from_fields`]
    pub const NAMES: [&'static str; 8] = [
        "plasticity",
        "hydrometer",
        "compaction",
        "grain-size",
        "permeability",
        "consolidation",
        "shear-strength",
        "specific-gravity",
    ];

    /// Parse a named test from raw form fields.
    pub fn from_fields(test: &str, fields: &FormFields) -> CalcResult<Self> {
        Ok(match test {
            "plasticity" => SoilTest::Plasticity(PlasticityInput::from_fields(fields)?),
            "hydrometer" => SoilTest::Hydrometer(HydrometerInput::from_fields(fields)?),
            "compaction" => SoilTest::Compaction(CompactionInput::from_fields(fields)?),
            "grain-size" => SoilTest::GrainSize(GrainSizeInput::from_fields(fields)?),
            "permeability" => SoilTest::Permeability(PermeabilityInput::from_fields(fields)?),
            "consolidation" => SoilTest::Consolidation(ConsolidationInput::from_fields(fields)?),
            "shear-strength" => SoilTest::ShearStrength(ShearStrengthInput::from_fields(fields)?),
            "specific-gravity" => SoilTest::SpecificGravity(SpecificGravityInput::from_fields(fields)?),
            other => {
                return Err(CalcError::invalid_input(
                    "test",
                    other,
                    format!("Unknown test; expected one of: {}", Self::NAMES.join(", ")),
                ))
            }
        })
    }

    /// Display name of the test
    pub fn calc_type(&self) -> &'static str {
        match self {
            SoilTest::Plasticity(_) => "Plasticity",
            SoilTest::Hydrometer(_) => "Hydrometer",
            SoilTest::Compaction(_) => "Compaction",
            SoilTest::GrainSize(_) => "Grain Size",
            SoilTest::Permeability(_) => "Permeability",
            SoilTest::Consolidation(_) => "Consolidation",
            SoilTest::ShearStrength(_) => "Shear Strength",
            SoilTest::SpecificGravity(_) => "Specific Gravity",
        }
    }

    /// Run the calculation with the given assumption tables.
    pub fn run(&self, settings: &LabSettings) -> CalcResult<TestReport> {
        Ok(match self {
            SoilTest::Plasticity(i) => TestReport::Plasticity(plasticity::calculate(i)?),
            SoilTest::Hydrometer(i) => TestReport::Hydrometer(hydrometer::calculate(i, &settings.hydrometer)?),
            SoilTest::Compaction(i) => TestReport::Compaction(compaction::calculate(i, &settings.compaction)?),
            SoilTest::GrainSize(i) => TestReport::GrainSize(grain_size::calculate(i)?),
            SoilTest::Permeability(i) => TestReport::Permeability(permeability::calculate(i)?),
            SoilTest::Consolidation(i) => TestReport::Consolidation(consolidation::calculate(i)?),
            SoilTest::ShearStrength(i) => TestReport::ShearStrength(shear_strength::calculate(i)?),
            SoilTest::SpecificGravity(i) => {
                TestReport::SpecificGravity(specific_gravity::calculate(i, &settings.specific_gravity)?)
            }
        })
    }
}

/// Enum wrapper for all test results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TestReport {
    Plasticity(PlasticityResult),
    Hydrometer(HydrometerResult),
    Compaction(CompactionResult),
    GrainSize(GrainSizeResult),
    Permeability(PermeabilityResult),
    Consolidation(ConsolidationResult),
    ShearStrength(ShearStrengthResult),
    SpecificGravity(SpecificGravityResult),
}

impl TestReport {
    /// Headline classification label
    pub fn classification(&self) -> &'static str {
        match self {
            TestReport::Plasticity(r) => r.classification.label(),
            TestReport::Hydrometer(r) => r.classification.label(),
            TestReport::Compaction(r) => r.classification.label(),
            TestReport::GrainSize(r) => r.classification.label(),
            TestReport::Permeability(r) => r.classification.label(),
            TestReport::Consolidation(ConsolidationResult::TimeRate(_)) => "Time-rate consolidation",
            TestReport::Consolidation(ConsolidationResult::PressureIncrement(_)) => "Pressure-increment consolidation",
            TestReport::ShearStrength(r) => r.classification.label(),
            TestReport::SpecificGravity(r) => r.classification.label(),
        }
    }

    /// Chart points (empty where the test has no chart)
    pub fn chart(&self) -> &[ChartPoint] {
        match self {
            TestReport::Plasticity(_) | TestReport::SpecificGravity(_) => &[],
            TestReport::Hydrometer(r) => &r.chart,
            TestReport::Compaction(r) => &r.chart,
            TestReport::GrainSize(r) => &r.chart,
            TestReport::Permeability(r) => &r.chart,
            TestReport::Consolidation(r) => r.chart(),
            TestReport::ShearStrength(r) => &r.chart,
        }
    }

    /// Worked calculation, for the tests that show one
    pub fn working(&self) -> Option<&Working> {
        match self {
            TestReport::Permeability(r) => Some(&r.working),
            TestReport::Consolidation(r) => Some(r.working()),
            TestReport::ShearStrength(r) => Some(&r.working),
            TestReport::SpecificGravity(r) => Some(&r.working),
            TestReport::Plasticity(_)
            | TestReport::Hydrometer(_)
            | TestReport::Compaction(_)
            | TestReport::GrainSize(_) => None,
        }
    }

    /// Title and one-line summary for the completion notification.
    pub fn summary(&self) -> (&'static str, String) {
        match self {
            TestReport::Plasticity(r) => (
                "Calculation Complete",
                format!("Plasticity Index: {}%", format_fixed(r.plasticity_index, 2)),
            ),
            TestReport::Hydrometer(r) => (
                "Analysis Complete",
                format!("Grain diameter: {} mm", format_fixed(r.grain_diameter_mm, 4)),
            ),
            TestReport::Compaction(r) => (
                "Compaction Analysis Complete",
                format!("Dry density: {} g/cm³", format_fixed(r.dry_density_g_cm3, 3)),
            ),
            TestReport::GrainSize(r) => (
                "Grain Size Analysis Complete",
                format!("Primary classification: {}", r.classification.label()),
            ),
            TestReport::Permeability(r) => (
                "Permeability Test Complete",
                format!("Coefficient of permeability: {} cm/s", format_exp(r.permeability_cm_s, 3)),
            ),
            TestReport::Consolidation(ConsolidationResult::TimeRate(r)) => (
                "Consolidation Analysis Complete",
                format!("Total settlement: {} mm", format_fixed(r.total_settlement_mm, 3)),
            ),
            TestReport::Consolidation(ConsolidationResult::PressureIncrement(r)) => (
                "Consolidation Analysis Complete",
                format!("Settlement: {}%", format_fixed(r.settlement_pct, 2)),
            ),
            TestReport::ShearStrength(r) => (
                "Shear Strength Analysis Complete",
                format!(
                    "φ = {}°, c = {} kPa",
                    format_fixed(r.friction_angle_deg, 1),
                    format_fixed(r.cohesion_kpa, 2)
                ),
            ),
            TestReport::SpecificGravity(r) => (
                "Specific Gravity Analysis Complete",
                format!("Specific gravity: {}", format_fixed(r.specific_gravity, 3)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soil_test_json_tag() {
        let json = r#"{ "type": "Plasticity", "liquid_limit": 45.0, "plastic_limit": 20.0 }"#;
        let test: SoilTest = serde_json::from_str(json).unwrap();
        assert_eq!(test.calc_type(), "Plasticity");

        let report = test.run(&LabSettings::default()).unwrap();
        assert_eq!(report.classification(), "Medium Plasticity (CI)");
        let (title, description) = report.summary();
        assert_eq!(title, "Calculation Complete");
        assert_eq!(description, "Plasticity Index: 25.00%");
    }

    #[test]
    fn test_defaulted_fields_may_be_omitted_in_json() {
        let json = r#"{
            "type": "Compaction",
            "wet_mass_g": 1800.0,
            "dry_mass_g": 1600.0,
            "water_content_pct": 12.0
        }"#;
        let test: SoilTest = serde_json::from_str(json).unwrap();
        let TestReport::Compaction(r) = test.run(&LabSettings::default()).unwrap() else {
            panic!("expected compaction report");
        };
        assert_eq!(r.mold_volume_cm3, 944.0);
    }

    #[test]
    fn test_from_fields_dispatch() {
        let fields = FormFields::from_pairs([
            ("head_difference", "30"),
            ("length", "10"),
            ("area", "50"),
            ("discharge", "25"),
            ("time", "60"),
        ]);
        let test = SoilTest::from_fields("permeability", &fields).unwrap();
        let report = test.run(&LabSettings::default()).unwrap();
        assert_eq!(report.classification(), "Medium Permeability");
        assert_eq!(report.chart().len(), 11);
        assert_eq!(
            report.summary().1,
            "Coefficient of permeability: 2.778e-3 cm/s"
        );
    }

    #[test]
    fn test_consolidation_mode_inside_test_json() {
        let json = r#"{
            "type": "Consolidation",
            "mode": "PressureIncrement",
            "initial_void_ratio": 0.9,
            "initial_pressure_kpa": 100.0,
            "final_pressure_kpa": 1000.0,
            "compression_index": 0.3
        }"#;
        let test: SoilTest = serde_json::from_str(json).unwrap();
        let report = test.run(&LabSettings::default()).unwrap();
        assert_eq!(report.summary().1, "Settlement: 15.79%");
        assert_eq!(report.chart().len(), 11);
    }

    #[test]
    fn test_working_only_where_shown() {
        let fields = FormFields::from_pairs([
            ("head_difference", "30"),
            ("length", "10"),
            ("area", "50"),
            ("discharge", "25"),
            ("time", "60"),
        ]);
        let report = SoilTest::from_fields("permeability", &fields)
            .and_then(|test| test.run(&LabSettings::default()))
            .unwrap();
        assert_eq!(report.working().map(|w| w.result.as_str()), Some("k = 2.778e-3 cm/s"));

        let json = r#"{ "type": "Plasticity", "liquid_limit": 45.0, "plastic_limit": 20.0 }"#;
        let report = serde_json::from_str::<SoilTest>(json)
            .unwrap()
            .run(&LabSettings::default())
            .unwrap();
        assert!(report.working().is_none());
    }

    #[test]
    fn test_unusable_settings_reject_run() {
        let mut settings = LabSettings::default();
        settings.compaction.default_mold_volume_cm3 = 0.0;
        let test = SoilTest::Compaction(CompactionInput {
            wet_mass_g: 4000.0,
            dry_mass_g: 3600.0,
            mold_volume_cm3: None,
            water_content_pct: 11.0,
        });
        assert_eq!(test.run(&settings).unwrap_err().error_code(), "DOMAIN_ERROR");
    }

    #[test]
    fn test_unknown_test_name() {
        let err = SoilTest::from_fields("triaxial", &FormFields::new()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_settings_flow_into_calculation() {
        let mut settings = LabSettings::default();
        settings.compaction.default_mold_volume_cm3 = 2124.0;
        let test = SoilTest::Compaction(CompactionInput {
            wet_mass_g: 4000.0,
            dry_mass_g: 3600.0,
            mold_volume_cm3: None,
            water_content_pct: 10.0,
        });
        let TestReport::Compaction(r) = test.run(&settings).unwrap() else {
            panic!("expected compaction report");
        };
        assert_eq!(r.mold_volume_cm3, 2124.0);
    }
}
