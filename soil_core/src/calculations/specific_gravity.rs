//! # Specific Gravity (Pycnometer)
//!
//! Specific gravity of soil solids by the pycnometer method
//! (ASTM D854 / IS 2720 Part 3), with a linear water-density correction to
//! the 27 °C reference temperature:
//!
//! ```text
//! K  = 1 − (T − 27) · 0.0002
//! Gs = Ms·K / (Ms + (Mpw − Mp) − (Mpsw − Mp))
//! ```

use serde::{Deserialize, Serialize};

use super::Working;
use crate::errors::{CalcError, CalcResult};
use crate::fields::FormFields;
use crate::units::{format_fixed, WATER_DENSITY_G_CM3};

/// Fixed assumptions for the pycnometer reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecificGravityAssumptions {
    /// Temperature at which K = 1 (°C)
    pub reference_temperature_c: f64,
    /// Temperature used when none is entered (°C)
    pub default_temperature_c: f64,
    /// Change in K per °C
    pub correction_per_degree: f64,
    /// Density of water for the solids volume (g/cm³)
    pub water_density_g_cm3: f64,
}

impl Default for SpecificGravityAssumptions {
    fn default() -> Self {
        SpecificGravityAssumptions {
            reference_temperature_c: 27.0,
            default_temperature_c: 27.0,
            correction_per_degree: 0.0002,
            water_density_g_cm3: WATER_DENSITY_G_CM3,
        }
    }
}

impl SpecificGravityAssumptions {
    pub fn validate(&self) -> CalcResult<()> {
        if !self.water_density_g_cm3.is_finite() || self.water_density_g_cm3 <= 0.0 {
            return Err(CalcError::domain("water_density_g_cm3", "Water density must be positive"));
        }
        let finite = [
            ("reference_temperature_c", self.reference_temperature_c),
            ("default_temperature_c", self.default_temperature_c),
            ("correction_per_degree", self.correction_per_degree),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(CalcError::domain(field, "Value must be a finite number"));
            }
        }
        Ok(())
    }

    /// Temperature correction factor K.
    pub fn correction_factor(&self, temperature_c: f64) -> f64 {
        1.0 - (temperature_c - self.reference_temperature_c) * self.correction_per_degree
    }
}

/// Pycnometer weighings (g).
///
/// ## JSON Example
///
/// ```json
/// {
///   "soil_mass_g": 50.0,
///   "pycnometer_mass_g": 120.0,
///   "pycnometer_water_mass_g": 370.0,
///   "pycnometer_soil_water_mass_g": 401.2,
///   "temperature_c": 27.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificGravityInput {
    /// Oven-dry soil Ms
    pub soil_mass_g: f64,
    /// Empty pycnometer Mp
    pub pycnometer_mass_g: f64,
    /// Pycnometer filled with water Mpw
    pub pycnometer_water_mass_g: f64,
    /// Pycnometer with soil, topped up with water Mpsw
    pub pycnometer_soil_water_mass_g: f64,
    /// Water temperature (°C); defaults from assumptions
    #[serde(default)]
    pub temperature_c: Option<f64>,
}

impl SpecificGravityInput {
    pub fn from_fields(fields: &FormFields) -> CalcResult<Self> {
        Ok(SpecificGravityInput {
            soil_mass_g: fields.required("soil_mass")?,
            pycnometer_mass_g: fields.required("pycnometer_mass")?,
            pycnometer_water_mass_g: fields.required("pycnometer_water_mass")?,
            pycnometer_soil_water_mass_g: fields.required("pycnometer_soil_water_mass")?,
            temperature_c: fields.optional("temperature")?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.soil_mass_g <= 0.0 {
            return Err(CalcError::domain("soil_mass", "Soil mass must be positive"));
        }
        if self.water_displaced_g() <= 0.0 {
            return Err(CalcError::domain(
                "pycnometer_soil_water_mass",
                "Weighings imply no water displaced by the soil",
            ));
        }
        Ok(())
    }

    /// Ms + Mpw − Mpsw
    pub fn water_displaced_g(&self) -> f64 {
        self.soil_mass_g + self.pycnometer_water_mass_g - self.pycnometer_soil_water_mass_g
    }
}

/// Mineral composition band by Gs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MineralComposition {
    /// Gs > 3.0
    HeavyMinerals,
    /// Gs > 2.8
    ClayMinerals,
    /// Gs > 2.6
    QuartzFeldspar,
    /// Gs > 2.0
    MixedOrganic,
    HighOrganic,
}

impl MineralComposition {
    pub fn from_gs(gs: f64) -> Self {
        if gs > 3.0 {
            MineralComposition::HeavyMinerals
        } else if gs > 2.8 {
            MineralComposition::ClayMinerals
        } else if gs > 2.6 {
            MineralComposition::QuartzFeldspar
        } else if gs > 2.0 {
            MineralComposition::MixedOrganic
        } else {
            MineralComposition::HighOrganic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MineralComposition::HeavyMinerals => "Heavy minerals (iron oxides, heavy metals)",
            MineralComposition::ClayMinerals => "Clay minerals dominant",
            MineralComposition::QuartzFeldspar => "Quartz/Feldspar dominant",
            MineralComposition::MixedOrganic => "Mixed minerals with organics",
            MineralComposition::HighOrganic => "High organic content",
        }
    }

    /// Typical soil origin for the band
    pub fn soil_origin(&self) -> &'static str {
        match self {
            MineralComposition::HeavyMinerals => "Lateritic or mineral-rich residual soil",
            MineralComposition::ClayMinerals => "Inorganic clay",
            MineralComposition::QuartzFeldspar => "Inorganic sand or silt",
            MineralComposition::MixedOrganic => "Organic silt or clay",
            MineralComposition::HighOrganic => "Peat or highly organic soil",
        }
    }
}

/// Reference material for the comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialComparison {
    pub material: String,
    pub specific_gravity: f64,
}

/// Typical specific gravities shown beside the sample
pub const REFERENCE_MATERIALS: [(&str, f64); 4] = [
    ("Quartz", 2.65),
    ("Clay Minerals", 2.70),
    ("Organic Matter", 1.50),
    ("Iron Oxide", 3.80),
];

/// Pycnometer results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificGravityResult {
    /// Temperature actually used (°C)
    pub temperature_c: f64,
    /// Temperature correction factor K
    pub correction_factor: f64,
    pub specific_gravity: f64,
    /// Mpw − Mp (g)
    pub water_mass_g: f64,
    /// Ms + Mpw − Mpsw (g)
    pub water_displaced_g: f64,
    /// Volume of solids (cm³)
    pub volume_solids_cm3: f64,
    /// Ms / Vs (g/cm³)
    pub density_solids_g_cm3: f64,
    pub classification: MineralComposition,
    /// Reference materials with the sample inserted third
    pub comparison: Vec<MaterialComparison>,
    pub working: Working,
}

pub fn calculate(
    input: &SpecificGravityInput,
    assumptions: &SpecificGravityAssumptions,
) -> CalcResult<SpecificGravityResult> {
    input.validate()?;
    assumptions.validate()?;

    let temperature_c = input.temperature_c.unwrap_or(assumptions.default_temperature_c);
    let k = assumptions.correction_factor(temperature_c);

    let ms = input.soil_mass_g;
    let mp = input.pycnometer_mass_g;
    let gs = ms * k
        / (ms + (input.pycnometer_water_mass_g - mp) - (input.pycnometer_soil_water_mass_g - mp));

    let water_displaced = input.water_displaced_g();
    let volume_solids = water_displaced / assumptions.water_density_g_cm3;

    let mut comparison: Vec<MaterialComparison> = REFERENCE_MATERIALS
        .iter()
        .map(|&(material, specific_gravity)| MaterialComparison {
            material: material.to_string(),
            specific_gravity,
        })
        .collect();
    comparison.insert(
        2,
        MaterialComparison {
            material: "Your Sample".to_string(),
            specific_gravity: gs,
        },
    );

    let working = Working::new(
        "Gs = (Ms × K) / (Ms + Mpw - Mpsw)",
        format!(
            "Gs = ({} × {}) / ({} + {} - {})",
            ms,
            format_fixed(k, 4),
            ms,
            input.pycnometer_water_mass_g,
            input.pycnometer_soil_water_mass_g
        ),
        format!("Gs = {}", format_fixed(gs, 3)),
    );

    log::debug!("specific gravity: Gs={:.3} K={:.4}", gs, k);

    Ok(SpecificGravityResult {
        temperature_c,
        correction_factor: k,
        specific_gravity: gs,
        water_mass_g: input.pycnometer_water_mass_g - mp,
        water_displaced_g: water_displaced,
        volume_solids_cm3: volume_solids,
        density_solids_g_cm3: ms / volume_solids,
        classification: MineralComposition::from_gs(gs),
        comparison,
        working,
    })
}
