//! # One-Dimensional Consolidation
//!
//! Oedometer reduction in two modes (ASTM D2435 / IS 2720 Part 15):
//!
//! - **Time-rate**: specimen heights before and after a load increment plus
//!   the time to 90% consolidation give settlement, final void ratio, `mv`
//!   and an approximate `cv = 0.848 H₀² / t₉₀`. The settlement curve uses
//!   `U = 1 − exp(−π² cv t / 4H₀²)`.
//! - **Pressure-increment**: the compression index gives
//!   `Δe = Cc · log₁₀(p_f / p₀)` and an e–log p curve, clamped at e = 0.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "mode": "PressureIncrement",
//!   "initial_void_ratio": 0.9,
//!   "initial_pressure_kpa": 100.0,
//!   "final_pressure_kpa": 200.0,
//!   "compression_index": 0.3
//! }
//! ```

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{ChartPoint, Working};
use crate::errors::{CalcError, CalcResult};
use crate::fields::FormFields;
use crate::units::{format_exp, format_fixed};

/// Time-factor constant for 90% consolidation
const T90_FACTOR: f64 = 0.848;
const TIME_CURVE_INTERVALS: u32 = 20;
const PRESSURE_CURVE_INTERVALS: u32 = 10;

/// Time-rate mode measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRateInput {
    /// Initial specimen height H₀ (mm)
    pub initial_height_mm: f64,
    /// Height at end of the increment (mm)
    pub final_height_mm: f64,
    /// Initial void ratio e₀
    pub initial_void_ratio: f64,
    /// Applied pressure increment (kN/m²)
    pub pressure_kpa: f64,
    /// Time to 90% consolidation (min)
    pub t90_min: f64,
}

/// Pressure-increment mode measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureIncrementInput {
    /// Void ratio at the initial pressure e₀
    pub initial_void_ratio: f64,
    /// p₀ (kN/m²)
    pub initial_pressure_kpa: f64,
    /// p_f (kN/m²)
    pub final_pressure_kpa: f64,
    /// Compression index Cc
    pub compression_index: f64,
}

/// Consolidation input, one variant per mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum ConsolidationInput {
    TimeRate(TimeRateInput),
    PressureIncrement(PressureIncrementInput),
}

impl ConsolidationInput {
    /// Parse from form fields. `mode` selects `time-rate` (default) or
    /// `pressure-increment`.
    pub fn from_fields(fields: &FormFields) -> CalcResult<Self> {
        match fields.text("mode").unwrap_or("time-rate") {
            "time-rate" => Ok(ConsolidationInput::TimeRate(TimeRateInput {
                initial_height_mm: fields.required("initial_height")?,
                final_height_mm: fields.required("final_height")?,
                initial_void_ratio: fields.required("initial_void_ratio")?,
                pressure_kpa: fields.required("pressure")?,
                t90_min: fields.required("time")?,
            })),
            "pressure-increment" => Ok(ConsolidationInput::PressureIncrement(PressureIncrementInput {
                initial_void_ratio: fields.required("initial_void_ratio")?,
                initial_pressure_kpa: fields.required("initial_pressure")?,
                final_pressure_kpa: fields.required("final_pressure")?,
                compression_index: fields.required("compression_index")?,
            })),
            other => Err(CalcError::invalid_input(
                "mode",
                other,
                "Expected 'time-rate' or 'pressure-increment'",
            )),
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        match self {
            ConsolidationInput::TimeRate(input) => {
                if input.initial_height_mm <= 0.0 {
                    return Err(CalcError::domain("initial_height", "Initial height must be positive"));
                }
                if input.final_height_mm <= 0.0 || input.final_height_mm > input.initial_height_mm {
                    return Err(CalcError::domain(
                        "final_height",
                        "Final height must be positive and no greater than the initial height",
                    ));
                }
                if input.initial_void_ratio < 0.0 {
                    return Err(CalcError::domain("initial_void_ratio", "Void ratio cannot be negative"));
                }
                if input.pressure_kpa <= 0.0 {
                    return Err(CalcError::domain("pressure", "Pressure must be positive"));
                }
                if input.t90_min <= 0.0 {
                    return Err(CalcError::domain("time", "Time must be positive"));
                }
            }
            ConsolidationInput::PressureIncrement(input) => {
                if input.initial_void_ratio < 0.0 {
                    return Err(CalcError::domain("initial_void_ratio", "Void ratio cannot be negative"));
                }
                if input.initial_pressure_kpa <= 0.0 {
                    return Err(CalcError::domain("initial_pressure", "Initial pressure must be positive"));
                }
                if input.final_pressure_kpa <= input.initial_pressure_kpa {
                    return Err(CalcError::domain(
                        "final_pressure",
                        "Final pressure must exceed the initial pressure",
                    ));
                }
                if input.compression_index < 0.0 {
                    return Err(CalcError::domain("compression_index", "Compression index cannot be negative"));
                }
            }
        }
        Ok(())
    }
}

/// Time-rate results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRateResult {
    /// ΔH = H₀ − H_f (mm)
    pub total_settlement_mm: f64,
    /// ΔH / H₀ · 100 (%)
    pub strain_pct: f64,
    /// ΔH / H₀
    pub compression_ratio: f64,
    pub final_void_ratio: f64,
    /// Coefficient of volume compressibility mv (m²/kN)
    pub volume_compressibility: f64,
    /// Coefficient of consolidation cv (mm²/min)
    pub coefficient_of_consolidation: f64,
    /// x = time (min), y = settlement (mm)
    pub chart: Vec<ChartPoint>,
    pub working: Working,
}

/// Pressure-increment results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureIncrementResult {
    /// Δe = Cc · log₁₀(p_f / p₀)
    pub void_ratio_change: f64,
    /// e₀ − Δe, floored at 0
    pub final_void_ratio: f64,
    /// Δe / (1 + e₀) · 100 (%)
    pub settlement_pct: f64,
    /// Coefficient of compressibility av = Δe / Δp (m²/kN)
    pub coefficient_of_compressibility: f64,
    /// mv = av / (1 + e₀) (m²/kN)
    pub volume_compressibility: f64,
    /// x = pressure (kPa), y = void ratio
    pub chart: Vec<ChartPoint>,
    pub working: Working,
}

/// Consolidation result, matching the input mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum ConsolidationResult {
    TimeRate(TimeRateResult),
    PressureIncrement(PressureIncrementResult),
}

impl ConsolidationResult {
    pub fn chart(&self) -> &[ChartPoint] {
        match self {
            ConsolidationResult::TimeRate(r) => &r.chart,
            ConsolidationResult::PressureIncrement(r) => &r.chart,
        }
    }

    pub fn working(&self) -> &Working {
        match self {
            ConsolidationResult::TimeRate(r) => &r.working,
            ConsolidationResult::PressureIncrement(r) => &r.working,
        }
    }
}

pub fn calculate(input: &ConsolidationInput) -> CalcResult<ConsolidationResult> {
    input.validate()?;
    let result = match input {
        ConsolidationInput::TimeRate(i) => ConsolidationResult::TimeRate(time_rate(i)),
        ConsolidationInput::PressureIncrement(i) => ConsolidationResult::PressureIncrement(pressure_increment(i)),
    };
    Ok(result)
}

fn time_rate(input: &TimeRateInput) -> TimeRateResult {
    let h0 = input.initial_height_mm;
    let e0 = input.initial_void_ratio;
    let t = input.t90_min;

    let delta_h = h0 - input.final_height_mm;
    let compression_ratio = delta_h / h0;
    let final_void_ratio = e0 - delta_h * (1.0 + e0) / h0;
    let mv = (e0 - final_void_ratio) / (input.pressure_kpa * (1.0 + e0));
    let cv = T90_FACTOR * h0 * h0 / t;

    let chart = (0..=TIME_CURVE_INTERVALS)
        .map(|i| {
            let time = t * f64::from(i) / f64::from(TIME_CURVE_INTERVALS);
            let degree = 1.0 - (-(PI * PI * cv * time) / (4.0 * h0 * h0)).exp();
            ChartPoint { x: time, y: delta_h * degree }
        })
        .collect();

    let working = Working::new(
        "mv = Δe / (Δp × (1 + e₀))",
        format!(
            "mv = {} / ({} × (1 + {}))",
            format_fixed(e0 - final_void_ratio, 3),
            input.pressure_kpa,
            e0
        ),
        format!("mv = {} m²/kN", format_exp(mv, 3)),
    );

    log::debug!("consolidation (time-rate): dH={:.3} mm cv={:.4}", delta_h, cv);

    TimeRateResult {
        total_settlement_mm: delta_h,
        strain_pct: compression_ratio * 100.0,
        compression_ratio,
        final_void_ratio,
        volume_compressibility: mv,
        coefficient_of_consolidation: cv,
        chart,
        working,
    }
}

fn pressure_increment(input: &PressureIncrementInput) -> PressureIncrementResult {
    let e0 = input.initial_void_ratio;
    let p0 = input.initial_pressure_kpa;
    let pf = input.final_pressure_kpa;
    let cc = input.compression_index;

    let delta_e = cc * (pf / p0).log10();
    let av = delta_e / (pf - p0);

    let ratio = pf / p0;
    let chart = (0..=PRESSURE_CURVE_INTERVALS)
        .map(|i| {
            let p = p0 * ratio.powf(f64::from(i) / f64::from(PRESSURE_CURVE_INTERVALS));
            ChartPoint {
                x: p,
                y: (e0 - cc * (p / p0).log10()).max(0.0),
            }
        })
        .collect();

    let working = Working::new(
        "Δe = Cc × log₁₀(p_f / p₀)",
        format!("Δe = {} × log₁₀({} / {})", cc, pf, p0),
        format!("Δe = {}", format_fixed(delta_e, 4)),
    );

    log::debug!("consolidation (pressure-increment): de={:.4}", delta_e);

    PressureIncrementResult {
        void_ratio_change: delta_e,
        final_void_ratio: (e0 - delta_e).max(0.0),
        settlement_pct: delta_e / (1.0 + e0) * 100.0,
        coefficient_of_compressibility: av,
        volume_compressibility: av / (1.0 + e0),
        chart,
        working,
    }
}
