//! # Grain Size Distribution (Sieve Analysis)
//!
//! Gradation, Cu/Cc and a USCS-style coarse classification from the mass
//! retained on four sieves (ASTM D6913 / IS 2720 Part 4).
//!
//! ## Sieve Stack
//!
//! | Sieve   | Opening (mm) | Separates            |
//! |---------|--------------|----------------------|
//! | No. 4   | 4.75         | gravel / coarse sand |
//! | No. 10  | 2.0          | coarse / medium sand |
//! | No. 40  | 0.425        | medium / fine sand   |
//! | No. 200 | 0.075        | fine sand / fines    |
//!
//! Characteristic diameters (D10, D30, D60) come from linear interpolation
//! of percent passing against opening. A target outside the measured range
//! clamps to the coarsest or finest opening.

use serde::{Deserialize, Serialize};

use super::ChartPoint;
use crate::errors::{CalcError, CalcResult};
use crate::fields::FormFields;

/// Sieve openings, coarsest first (mm)
pub const SIEVE_OPENINGS_MM: [f64; 4] = [4.75, 2.0, 0.425, 0.075];

/// Sieve analysis measurements.
///
/// ## JSON Example
///
/// ```json
/// {
///   "total_mass_g": 500.0,
///   "retained_g": [50.0, 100.0, 150.0, 100.0]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrainSizeInput {
    /// Total dry sample mass (g)
    pub total_mass_g: f64,

    /// Mass retained on each sieve, ordered as [`SIEVE_OPENINGS_MM`] (g)
    pub retained_g: [f64; 4],
}

impl GrainSizeInput {
    /// Parse from `total_mass` and `sieve_4`, `sieve_10`, `sieve_40`,
    /// `sieve_200`. Blank sieve fields count as nothing retained.
    pub fn from_fields(fields: &FormFields) -> CalcResult<Self> {
        let total_mass_g = fields.required("total_mass")?;
        let mut retained_g = [0.0; 4];
        for (slot, name) in retained_g
            .iter_mut()
            .zip(["sieve_4", "sieve_10", "sieve_40", "sieve_200"])
        {
            *slot = fields.optional(name)?.unwrap_or(0.0);
        }
        Ok(GrainSizeInput { total_mass_g, retained_g })
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.total_mass_g <= 0.0 {
            return Err(CalcError::domain("total_mass", "Please enter a valid total mass"));
        }
        if self.retained_g.iter().any(|&m| m < 0.0) {
            return Err(CalcError::domain("retained_g", "Retained mass cannot be negative"));
        }
        if self.retained_g.iter().sum::<f64>() > self.total_mass_g {
            return Err(CalcError::domain(
                "retained_g",
                "Retained masses exceed the total sample mass",
            ));
        }
        Ok(())
    }
}

/// Percentage of each size fraction. Sums to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub gravel: f64,
    pub coarse_sand: f64,
    pub medium_sand: f64,
    pub fine_sand: f64,
    pub fines: f64,
}

impl Distribution {
    pub fn sand(&self) -> f64 {
        self.coarse_sand + self.medium_sand + self.fine_sand
    }

    pub fn total(&self) -> f64 {
        self.gravel + self.sand() + self.fines
    }
}

/// Coarse-grained USCS group, or fine-grained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrainSizeClass {
    /// GW
    WellGradedGravel,
    /// GP
    PoorlyGradedGravel,
    /// SW
    WellGradedSand,
    /// SP
    PoorlyGradedSand,
    /// M/C
    FineGrained,
}

impl GrainSizeClass {
    /// Dominant fraction first, then grading from Cu and Cc.
    pub fn classify(distribution: &Distribution, cu: f64, cc: f64) -> Self {
        let sand = distribution.sand();
        let graded_cc = (1.0..=3.0).contains(&cc);

        // Coarse-grained only when gravel or sand holds a majority
        let gravelly = if distribution.gravel > 50.0 {
            true
        } else if sand > 50.0 {
            false
        } else {
            return GrainSizeClass::FineGrained;
        };

        match (gravelly, graded_cc) {
            (true, true) if cu >= 4.0 => GrainSizeClass::WellGradedGravel,
            (true, _) => GrainSizeClass::PoorlyGradedGravel,
            (false, true) if cu >= 6.0 => GrainSizeClass::WellGradedSand,
            (false, _) => GrainSizeClass::PoorlyGradedSand,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GrainSizeClass::WellGradedGravel => "Well-graded Gravel (GW)",
            GrainSizeClass::PoorlyGradedGravel => "Poorly-graded Gravel (GP)",
            GrainSizeClass::WellGradedSand => "Well-graded Sand (SW)",
            GrainSizeClass::PoorlyGradedSand => "Poorly-graded Sand (SP)",
            GrainSizeClass::FineGrained => "Fine-grained (M/C)",
        }
    }
}

/// Sieve analysis results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrainSizeResult {
    /// Cumulative percent retained per sieve
    pub cumulative_retained_pct: [f64; 4],
    /// Percent passing per sieve
    pub percent_passing: [f64; 4],
    pub distribution: Distribution,
    pub d10_mm: f64,
    pub d30_mm: f64,
    pub d60_mm: f64,
    /// Uniformity coefficient Cu = D60/D10
    pub cu: f64,
    /// Coefficient of curvature Cc = D30²/(D60·D10)
    pub cc: f64,
    pub classification: GrainSizeClass,
    /// x = sieve opening (mm), y = percent passing
    pub chart: Vec<ChartPoint>,
}

/// Diameter at which `percent` of the sample passes.
///
/// `passing` must be non-increasing along `sizes` (coarse to fine).
pub fn interpolate_diameter(percent: f64, passing: &[f64], sizes: &[f64]) -> f64 {
    let (Some(&coarsest), Some(&finest)) = (sizes.first(), sizes.last()) else {
        return 0.0;
    };
    if passing.first().is_some_and(|&p| percent > p) {
        return coarsest;
    }
    for i in 0..passing.len().saturating_sub(1) {
        let (upper, lower) = (passing[i], passing[i + 1]);
        if percent <= upper && percent >= lower {
            if upper == lower {
                return sizes[i + 1];
            }
            let ratio = (percent - lower) / (upper - lower);
            return sizes[i + 1] + ratio * (sizes[i] - sizes[i + 1]);
        }
    }
    finest
}

pub fn calculate(input: &GrainSizeInput) -> CalcResult<GrainSizeResult> {
    input.validate()?;

    let mut cumulative_retained_pct = [0.0; 4];
    let mut running = 0.0;
    for (slot, mass) in cumulative_retained_pct.iter_mut().zip(input.retained_g) {
        running += mass;
        *slot = running / input.total_mass_g * 100.0;
    }
    let percent_passing = cumulative_retained_pct.map(|c| 100.0 - c);

    let [c4, c10, c40, c200] = cumulative_retained_pct;
    let distribution = Distribution {
        gravel: c4,
        coarse_sand: c10 - c4,
        medium_sand: c40 - c10,
        fine_sand: c200 - c40,
        fines: 100.0 - c200,
    };

    let d10 = interpolate_diameter(10.0, &percent_passing, &SIEVE_OPENINGS_MM);
    let d30 = interpolate_diameter(30.0, &percent_passing, &SIEVE_OPENINGS_MM);
    let d60 = interpolate_diameter(60.0, &percent_passing, &SIEVE_OPENINGS_MM);

    let cu = if d10 > 0.0 { d60 / d10 } else { 0.0 };
    let cc = if d60 * d10 > 0.0 { d30 * d30 / (d60 * d10) } else { 0.0 };

    let chart = SIEVE_OPENINGS_MM
        .iter()
        .zip(percent_passing)
        .map(|(&x, y)| ChartPoint { x, y })
        .collect();

    let classification = GrainSizeClass::classify(&distribution, cu, cc);
    log::debug!("grain size: Cu={:.2} Cc={:.2} {}", cu, cc, classification.label());

    Ok(GrainSizeResult {
        cumulative_retained_pct,
        percent_passing,
        distribution,
        d10_mm: d10,
        d30_mm: d30,
        d60_mm: d60,
        cu,
        cc,
        classification,
        chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandy_sample() -> GrainSizeInput {
        GrainSizeInput {
            total_mass_g: 500.0,
            retained_g: [50.0, 100.0, 150.0, 100.0],
        }
    }

    #[test]
    fn test_distribution_sums_to_100() {
        let result = calculate(&sandy_sample()).unwrap();
        assert!((result.distribution.total() - 100.0).abs() < 1e-9);

        let odd = GrainSizeInput {
            total_mass_g: 731.3,
            retained_g: [12.7, 301.9, 88.4, 4.1],
        };
        let result = calculate(&odd).unwrap();
        assert!((result.distribution.total() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentages() {
        let result = calculate(&sandy_sample()).unwrap();
        let close = |a: [f64; 4], b: [f64; 4]| a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9);
        assert!(close(result.cumulative_retained_pct, [10.0, 30.0, 60.0, 80.0]));
        assert!(close(result.percent_passing, [90.0, 70.0, 40.0, 20.0]));
        assert!((result.distribution.gravel - 10.0).abs() < 1e-9);
        assert!((result.distribution.sand() - 70.0).abs() < 1e-9);
        assert!((result.distribution.fines - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_characteristic_diameters() {
        let result = calculate(&sandy_sample()).unwrap();
        // D60 between 2.0 (70%) and 0.425 (40%): 0.425 + (20/30)·1.575 = 1.475
        assert!((result.d60_mm - 1.475).abs() < 1e-9);
        // D30 between 0.425 (40%) and 0.075 (20%): 0.075 + 0.5·0.35 = 0.25
        assert!((result.d30_mm - 0.25).abs() < 1e-9);
        // 10% is below the finest measured passing → clamps to 0.075
        assert_eq!(result.d10_mm, 0.075);
        assert!((result.cu - 1.475 / 0.075).abs() < 1e-9);
    }

    #[test]
    fn test_interpolation_clamps_above_range() {
        let passing = [50.0, 40.0, 30.0, 20.0];
        assert_eq!(interpolate_diameter(60.0, &passing, &SIEVE_OPENINGS_MM), 4.75);
        assert_eq!(interpolate_diameter(10.0, &passing, &SIEVE_OPENINGS_MM), 0.075);
        assert_eq!(interpolate_diameter(50.0, &passing, &SIEVE_OPENINGS_MM), 4.75);
    }

    #[test]
    fn test_interpolation_flat_segment() {
        let passing = [100.0, 100.0, 60.0, 10.0];
        assert_eq!(interpolate_diameter(100.0, &passing, &SIEVE_OPENINGS_MM), 2.0);
    }

    #[test]
    fn test_classification() {
        let result = calculate(&sandy_sample()).unwrap();
        // Cc = 0.0625 / (1.475 · 0.075) ≈ 0.565 → poorly graded
        assert_eq!(result.classification, GrainSizeClass::PoorlyGradedSand);

        let gravel = GrainSizeInput {
            total_mass_g: 100.0,
            retained_g: [60.0, 10.0, 10.0, 10.0],
        };
        let result = calculate(&gravel).unwrap();
        assert!(matches!(
            result.classification,
            GrainSizeClass::WellGradedGravel | GrainSizeClass::PoorlyGradedGravel
        ));

        let fine = GrainSizeInput {
            total_mass_g: 100.0,
            retained_g: [0.0, 5.0, 10.0, 20.0],
        };
        assert_eq!(calculate(&fine).unwrap().classification, GrainSizeClass::FineGrained);
    }

    #[test]
    fn test_well_graded_rules() {
        let d = Distribution { gravel: 60.0, coarse_sand: 10.0, medium_sand: 10.0, fine_sand: 10.0, fines: 10.0 };
        assert_eq!(GrainSizeClass::classify(&d, 5.0, 2.0), GrainSizeClass::WellGradedGravel);
        assert_eq!(GrainSizeClass::classify(&d, 3.0, 2.0), GrainSizeClass::PoorlyGradedGravel);

        let s = Distribution { gravel: 5.0, coarse_sand: 30.0, medium_sand: 30.0, fine_sand: 25.0, fines: 10.0 };
        assert_eq!(GrainSizeClass::classify(&s, 6.0, 1.0), GrainSizeClass::WellGradedSand);
        assert_eq!(GrainSizeClass::classify(&s, 5.9, 1.0), GrainSizeClass::PoorlyGradedSand);
        assert_eq!(GrainSizeClass::classify(&s, 8.0, 3.5), GrainSizeClass::PoorlyGradedSand);
    }

    #[test]
    fn test_no_majority_fraction_is_fine_grained() {
        let d = Distribution { gravel: 30.0, coarse_sand: 20.0, medium_sand: 10.0, fine_sand: 10.0, fines: 30.0 };
        assert_eq!(GrainSizeClass::classify(&d, 8.0, 2.0), GrainSizeClass::FineGrained);

        let mixed = GrainSizeInput {
            total_mass_g: 100.0,
            retained_g: [30.0, 20.0, 10.0, 10.0],
        };
        let result = calculate(&mixed).unwrap();
        assert!((result.distribution.fines - 30.0).abs() < 1e-9);
        assert_eq!(result.classification, GrainSizeClass::FineGrained);
    }

    #[test]
    fn test_rejects_bad_totals() {
        let mut input = sandy_sample();
        input.total_mass_g = 0.0;
        assert!(calculate(&input).is_err());

        let mut input = sandy_sample();
        input.retained_g = [400.0, 200.0, 0.0, 0.0];
        assert_eq!(calculate(&input).unwrap_err().error_code(), "DOMAIN_ERROR");
    }

    #[test]
    fn test_blank_sieves_default_to_zero() {
        let fields = FormFields::from_pairs([("total_mass", "200"), ("sieve_4", "20")]);
        let input = GrainSizeInput::from_fields(&fields).unwrap();
        assert_eq!(input.retained_g, [20.0, 0.0, 0.0, 0.0]);
    }
}
