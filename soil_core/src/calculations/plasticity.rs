//! # Plasticity (Atterberg Limits)
//!
//! Plasticity index and consistency classification from the liquid and
//! plastic limits (ASTM D4318 / IS 2720 Part 5).
//!
//! ## Example
//!
//! ```rust
//! use soil_core::calculations::plasticity::{calculate, PlasticityInput, PlasticityClass};
//!
//! let input = PlasticityInput { liquid_limit: 45.0, plastic_limit: 20.0 };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.plasticity_index, 25.0);
//! assert_eq!(result.classification, PlasticityClass::Medium);
//! assert_eq!(result.classification.label(), "Medium Plasticity (CI)");
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::fields::FormFields;

/// Atterberg limits, both in percent water content.
///
/// ## JSON Example
///
/// ```json
/// { "liquid_limit": 45.0, "plastic_limit": 20.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlasticityInput {
    /// Liquid limit LL (%)
    pub liquid_limit: f64,

    /// Plastic limit PL (%)
    pub plastic_limit: f64,
}

impl PlasticityInput {
    /// Parse from form fields `liquid_limit` and `plastic_limit`.
    pub fn from_fields(fields: &FormFields) -> CalcResult<Self> {
        Ok(PlasticityInput {
            liquid_limit: fields.required("liquid_limit")?,
            plastic_limit: fields.required("plastic_limit")?,
        })
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.liquid_limit <= self.plastic_limit {
            return Err(CalcError::domain(
                "liquid_limit",
                "Liquid limit must be greater than plastic limit",
            ));
        }
        Ok(())
    }
}

/// Plasticity band by PI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlasticityClass {
    /// PI < 7
    NonPlastic,
    /// 7 ≤ PI < 17
    Low,
    /// 17 ≤ PI < 35
    Medium,
    /// PI ≥ 35
    High,
}

impl PlasticityClass {
    pub fn from_index(plasticity_index: f64) -> Self {
        if plasticity_index < 7.0 {
            PlasticityClass::NonPlastic
        } else if plasticity_index < 17.0 {
            PlasticityClass::Low
        } else if plasticity_index < 35.0 {
            PlasticityClass::Medium
        } else {
            PlasticityClass::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlasticityClass::NonPlastic => "Non-plastic (NP)",
            PlasticityClass::Low => "Low Plasticity (CL/ML)",
            PlasticityClass::Medium => "Medium Plasticity (CI)",
            PlasticityClass::High => "High Plasticity (CH)",
        }
    }

    /// Clay activity level typically associated with the band
    pub fn activity(&self) -> &'static str {
        match self {
            PlasticityClass::NonPlastic => "Inactive",
            PlasticityClass::Low => "Inactive to Normal",
            PlasticityClass::Medium => "Normal",
            PlasticityClass::High => "Active",
        }
    }
}

/// Plasticity results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlasticityResult {
    pub liquid_limit: f64,
    pub plastic_limit: f64,

    /// PI = LL − PL (%)
    pub plasticity_index: f64,

    pub classification: PlasticityClass,
}

pub fn calculate(input: &PlasticityInput) -> CalcResult<PlasticityResult> {
    input.validate()?;

    let plasticity_index = input.liquid_limit - input.plastic_limit;
    log::debug!("plasticity: LL={} PL={} PI={}", input.liquid_limit, input.plastic_limit, plasticity_index);

    Ok(PlasticityResult {
        liquid_limit: input.liquid_limit,
        plastic_limit: input.plastic_limit,
        plasticity_index,
        classification: PlasticityClass::from_index(plasticity_index),
    })
}
