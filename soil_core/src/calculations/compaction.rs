//! # Compaction (Standard Proctor)
//!
//! Density, void ratio and degree of saturation of a compacted specimen
//! (ASTM D698 / IS 2720 Part 7).
//!
//! ## Assumptions
//!
//! - Mold volume defaults to 944 cm³ (standard Proctor mold)
//! - Specific gravity of solids Gs = 2.65
//! - Reference maximum dry density 2.1 g/cm³ for compaction efficiency
//!
//! Dry density is taken from the water content, `ρd = ρ / (1 + w)`. The
//! value from the oven-dry mass (`Md / V`) is reported beside it as
//! `dry_density_from_mass`; the two disagree whenever the entered masses and
//! water content are not mutually consistent.
//!
//! ## Example
//!
//! ```rust
//! use soil_core::calculations::compaction::{calculate, CompactionAssumptions, CompactionInput};
//!
//! let input = CompactionInput {
//!     wet_mass_g: 1800.0,
//!     dry_mass_g: 1600.0,
//!     mold_volume_cm3: None,
//!     water_content_pct: 12.0,
//! };
//! let result = calculate(&input, &CompactionAssumptions::default()).unwrap();
//! assert!((result.dry_density_g_cm3 - 1.702).abs() < 5e-4);
//! ```

use serde::{Deserialize, Serialize};

use super::ChartPoint;
use crate::errors::{CalcError, CalcResult};
use crate::fields::FormFields;
use crate::units::WATER_DENSITY_G_CM3;

/// Water-content step between synthetic chart points (%)
const CHART_STEP_PCT: f64 = 2.0;
/// Density reduction per step away from the entered water content
const CHART_FALLOFF: f64 = 0.05;

/// Fixed assumptions for compaction reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactionAssumptions {
    /// Mold volume used when none is entered (cm³)
    pub default_mold_volume_cm3: f64,
    /// Assumed specific gravity of solids
    pub specific_gravity: f64,
    /// Reference maximum dry density (g/cm³)
    pub max_dry_density_g_cm3: f64,
}

impl CompactionAssumptions {
    pub fn validate(&self) -> CalcResult<()> {
        if !self.default_mold_volume_cm3.is_finite() || self.default_mold_volume_cm3 <= 0.0 {
            return Err(CalcError::domain("default_mold_volume_cm3", "Default mold volume must be positive"));
        }
        if !self.specific_gravity.is_finite() || self.specific_gravity <= 1.0 {
            return Err(CalcError::domain("specific_gravity", "Specific gravity must exceed 1.0"));
        }
        if !self.max_dry_density_g_cm3.is_finite() || self.max_dry_density_g_cm3 <= 0.0 {
            return Err(CalcError::domain(
                "max_dry_density_g_cm3",
                "Reference maximum dry density must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for CompactionAssumptions {
    fn default() -> Self {
        CompactionAssumptions {
            default_mold_volume_cm3: 944.0,
            specific_gravity: 2.65,
            max_dry_density_g_cm3: 2.1,
        }
    }
}

/// Compaction specimen measurements.
///
/// ## JSON Example
///
/// ```json
/// {
///   "wet_mass_g": 1800.0,
///   "dry_mass_g": 1600.0,
///   "mold_volume_cm3": 944.0,
///   "water_content_pct": 12.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactionInput {
    /// Mass of wet soil in the mold (g)
    pub wet_mass_g: f64,

    /// Oven-dry mass of the same soil (g)
    pub dry_mass_g: f64,

    /// Mold volume (cm³); defaults from assumptions
    #[serde(default)]
    pub mold_volume_cm3: Option<f64>,

    /// Water content w (%)
    pub water_content_pct: f64,
}

impl CompactionInput {
    pub fn from_fields(fields: &FormFields) -> CalcResult<Self> {
        Ok(CompactionInput {
            wet_mass_g: fields.required("wet_mass")?,
            dry_mass_g: fields.required("dry_mass")?,
            mold_volume_cm3: fields.optional("mold_volume")?,
            water_content_pct: fields.required("water_content")?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.wet_mass_g <= 0.0 {
            return Err(CalcError::domain("wet_mass", "Wet mass must be positive"));
        }
        if self.dry_mass_g < 0.0 {
            return Err(CalcError::domain("dry_mass", "Dry mass cannot be negative"));
        }
        if let Some(volume) = self.mold_volume_cm3 {
            if volume <= 0.0 {
                return Err(CalcError::domain("mold_volume", "Mold volume must be positive"));
            }
        }
        if self.water_content_pct <= -100.0 {
            return Err(CalcError::domain("water_content", "Water content must exceed -100%"));
        }
        Ok(())
    }
}

/// Compaction quality by efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompactionLevel {
    /// ≥ 95 %
    Excellent,
    /// ≥ 90 %
    Good,
    /// ≥ 85 %
    Fair,
    Poor,
}

impl CompactionLevel {
    pub fn from_efficiency(efficiency_pct: f64) -> Self {
        if efficiency_pct >= 95.0 {
            CompactionLevel::Excellent
        } else if efficiency_pct >= 90.0 {
            CompactionLevel::Good
        } else if efficiency_pct >= 85.0 {
            CompactionLevel::Fair
        } else {
            CompactionLevel::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompactionLevel::Excellent => "Excellent",
            CompactionLevel::Good => "Good",
            CompactionLevel::Fair => "Fair",
            CompactionLevel::Poor => "Poor",
        }
    }
}

/// Compaction results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactionResult {
    /// Mold volume actually used (cm³)
    pub mold_volume_cm3: f64,
    pub water_content_pct: f64,
    /// Bulk (wet) density (g/cm³)
    pub wet_density_g_cm3: f64,
    /// Dry density from water content (g/cm³)
    pub dry_density_g_cm3: f64,
    /// Dry density from oven-dry mass (g/cm³)
    pub dry_density_from_mass_g_cm3: f64,
    pub void_ratio: f64,
    /// Degree of saturation, capped at 100 (%)
    pub degree_of_saturation_pct: f64,
    /// Dry density relative to reference maximum, capped at 100 (%)
    pub compaction_efficiency_pct: f64,
    pub classification: CompactionLevel,
    /// x = water content (%), y = dry density (g/cm³); illustrative curve
    pub chart: Vec<ChartPoint>,
}

pub fn calculate(input: &CompactionInput, assumptions: &CompactionAssumptions) -> CalcResult<CompactionResult> {
    input.validate()?;
    assumptions.validate()?;

    let volume = input.mold_volume_cm3.unwrap_or(assumptions.default_mold_volume_cm3);
    let w = input.water_content_pct;
    let gs = assumptions.specific_gravity;

    let wet_density = input.wet_mass_g / volume;
    let dry_density = wet_density / (1.0 + w / 100.0);
    let dry_density_from_mass = input.dry_mass_g / volume;

    let void_ratio = gs * WATER_DENSITY_G_CM3 / dry_density - 1.0;
    let saturation = if void_ratio > 0.0 {
        ((w / 100.0) * gs / void_ratio * 100.0).min(100.0)
    } else {
        100.0
    };
    let efficiency = (dry_density / assumptions.max_dry_density_g_cm3 * 100.0).min(100.0);

    let chart = (-3i32..=3)
        .map(|k| ChartPoint {
            x: w + CHART_STEP_PCT * f64::from(k),
            y: dry_density * (1.0 - CHART_FALLOFF * f64::from(k.abs())),
        })
        .collect();

    log::debug!("compaction: rho_d={:.3} e={:.3} eff={:.1}%", dry_density, void_ratio, efficiency);

    Ok(CompactionResult {
        mold_volume_cm3: volume,
        water_content_pct: w,
        wet_density_g_cm3: wet_density,
        dry_density_g_cm3: dry_density,
        dry_density_from_mass_g_cm3: dry_density_from_mass,
        void_ratio,
        degree_of_saturation_pct: saturation,
        compaction_efficiency_pct: efficiency,
        classification: CompactionLevel::from_efficiency(efficiency),
        chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::format_fixed;

    fn proctor_sample() -> CompactionInput {
        CompactionInput {
            wet_mass_g: 1800.0,
            dry_mass_g: 1600.0,
            mold_volume_cm3: Some(944.0),
            water_content_pct: 12.0,
        }
    }

    #[test]
    fn test_proctor_scenario() {
        let result = calculate(&proctor_sample(), &CompactionAssumptions::default()).unwrap();
        assert_eq!(format_fixed(result.wet_density_g_cm3, 3), "1.907");
        assert_eq!(format_fixed(result.dry_density_g_cm3, 3), "1.702");
        assert_eq!(format_fixed(result.dry_density_from_mass_g_cm3, 3), "1.695");
    }

    #[test]
    fn test_dry_density_and_efficiency_formulas() {
        let input = proctor_sample();
        let result = calculate(&input, &CompactionAssumptions::default()).unwrap();

        let expected_dry = input.wet_mass_g / 944.0 / 1.12;
        assert!((result.dry_density_g_cm3 - expected_dry).abs() < 1e-12);

        let expected_eff = (expected_dry / 2.1 * 100.0).min(100.0);
        assert!((result.compaction_efficiency_pct - expected_eff).abs() < 1e-9);
        assert_eq!(result.classification, CompactionLevel::Poor);
    }

    #[test]
    fn test_void_ratio_and_saturation() {
        let result = calculate(&proctor_sample(), &CompactionAssumptions::default()).unwrap();
        // e = 2.65 / 1.7025 - 1 ≈ 0.5566
        assert!((result.void_ratio - 0.5566).abs() < 1e-3);
        // S = 0.12 * 2.65 / 0.5566 ≈ 57.1 %
        assert!((result.degree_of_saturation_pct - 57.1).abs() < 0.1);
    }

    #[test]
    fn test_default_mold_volume() {
        let mut input = proctor_sample();
        input.mold_volume_cm3 = None;
        let result = calculate(&input, &CompactionAssumptions::default()).unwrap();
        assert_eq!(result.mold_volume_cm3, 944.0);
    }

    #[test]
    fn test_efficiency_capped() {
        let mut input = proctor_sample();
        input.wet_mass_g = 2400.0;
        input.water_content_pct = 5.0;
        let result = calculate(&input, &CompactionAssumptions::default()).unwrap();
        assert_eq!(result.compaction_efficiency_pct, 100.0);
        assert_eq!(result.classification, CompactionLevel::Excellent);
        assert!(result.degree_of_saturation_pct <= 100.0);
    }

    #[test]
    fn test_chart_symmetric() {
        let result = calculate(&proctor_sample(), &CompactionAssumptions::default()).unwrap();
        assert_eq!(result.chart.len(), 7);
        assert_eq!(result.chart[3].x, 12.0);
        assert_eq!(result.chart[3].y, result.dry_density_g_cm3);
        assert_eq!(result.chart[0].x, 6.0);
        assert!((result.chart[0].y - result.chart[6].y).abs() < 1e-12);
        assert!((result.chart[0].y - result.dry_density_g_cm3 * 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(CompactionLevel::from_efficiency(95.0), CompactionLevel::Excellent);
        assert_eq!(CompactionLevel::from_efficiency(94.9), CompactionLevel::Good);
        assert_eq!(CompactionLevel::from_efficiency(85.0), CompactionLevel::Fair);
        assert_eq!(CompactionLevel::from_efficiency(84.9), CompactionLevel::Poor);
    }

    #[test]
    fn test_rejects_bad_assumptions() {
        let mut input = proctor_sample();
        input.mold_volume_cm3 = None;

        let mut assumptions = CompactionAssumptions::default();
        assumptions.default_mold_volume_cm3 = 0.0;
        assert_eq!(
            calculate(&input, &assumptions).unwrap_err(),
            CalcError::domain("default_mold_volume_cm3", "Default mold volume must be positive")
        );

        let mut assumptions = CompactionAssumptions::default();
        assumptions.max_dry_density_g_cm3 = 0.0;
        assert_eq!(calculate(&input, &assumptions).unwrap_err().error_code(), "DOMAIN_ERROR");

        let mut assumptions = CompactionAssumptions::default();
        assumptions.specific_gravity = 0.9;
        assert!(calculate(&input, &assumptions).is_err());
    }

    #[test]
    fn test_invalid_inputs() {
        let mut input = proctor_sample();
        input.mold_volume_cm3 = Some(0.0);
        assert!(calculate(&input, &CompactionAssumptions::default()).is_err());

        let fields = FormFields::from_pairs([("wet_mass", "1800"), ("dry_mass", "abc"), ("water_content", "12")]);
        assert_eq!(
            CompactionInput::from_fields(&fields).unwrap_err().error_code(),
            "INVALID_INPUT"
        );
    }
}
