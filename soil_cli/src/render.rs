//! Text rendering of calculation reports and feedback.

use soil_core::calculations::consolidation::ConsolidationResult;
use soil_core::calculations::TestReport;
use soil_core::feedback::{FeedbackRecord, FeedbackStats};
use soil_core::units::{format_exp, format_fixed};
use soil_core::{ChartPoint, Notification, Variant};

const RULE: &str = "═══════════════════════════════════════";

/// One labelled value in a report.
struct Row(&'static str, String);

fn rows(report: &TestReport) -> Vec<Row> {
    match report {
        TestReport::Plasticity(r) => vec![
            Row("Liquid limit", format!("{}%", format_fixed(r.liquid_limit, 2))),
            Row("Plastic limit", format!("{}%", format_fixed(r.plastic_limit, 2))),
            Row("Plasticity index", format!("{}%", format_fixed(r.plasticity_index, 2))),
            Row("Activity", r.classification.activity().to_string()),
        ],
        TestReport::Hydrometer(r) => vec![
            Row("Temperature", format!("{} °C", format_fixed(r.temperature_c, 1))),
            Row("Corrected reading", format_fixed(r.corrected_reading, 2)),
            Row("Effective depth", format!("{} cm", format_fixed(r.effective_depth_cm, 2))),
            Row("Viscosity", format!("{} poise", format_exp(r.viscosity_poise, 3))),
            Row("Grain diameter", format!("{} mm", format_fixed(r.grain_diameter_mm, 4))),
            Row("Percent finer", format!("{}%", format_fixed(r.percent_finer, 1))),
        ],
        TestReport::Compaction(r) => vec![
            Row("Mold volume", format!("{} cm³", format_fixed(r.mold_volume_cm3, 0))),
            Row("Water content", format!("{}%", format_fixed(r.water_content_pct, 1))),
            Row("Wet density", format!("{} g/cm³", format_fixed(r.wet_density_g_cm3, 3))),
            Row("Dry density", format!("{} g/cm³", format_fixed(r.dry_density_g_cm3, 3))),
            Row(
                "Dry density (mass)",
                format!("{} g/cm³", format_fixed(r.dry_density_from_mass_g_cm3, 3)),
            ),
            Row("Void ratio", format_fixed(r.void_ratio, 3)),
            Row("Saturation", format!("{}%", format_fixed(r.degree_of_saturation_pct, 1))),
            Row("Efficiency", format!("{}%", format_fixed(r.compaction_efficiency_pct, 1))),
        ],
        TestReport::GrainSize(r) => vec![
            Row("Gravel", format!("{}%", format_fixed(r.distribution.gravel, 1))),
            Row("Sand", format!("{}%", format_fixed(r.distribution.sand(), 1))),
            Row("Fines", format!("{}%", format_fixed(r.distribution.fines, 1))),
            Row("D10", format!("{} mm", format_fixed(r.d10_mm, 3))),
            Row("D30", format!("{} mm", format_fixed(r.d30_mm, 3))),
            Row("D60", format!("{} mm", format_fixed(r.d60_mm, 3))),
            Row("Cu", format_fixed(r.cu, 2)),
            Row("Cc", format_fixed(r.cc, 2)),
        ],
        TestReport::Permeability(r) => vec![
            Row("k", format!("{} cm/s", format_exp(r.permeability_cm_s, 3))),
            Row("Velocity", format!("{} cm/s", format_exp(r.seepage_velocity_cm_s, 3))),
            Row("Gradient", format_fixed(r.hydraulic_gradient, 3)),
            Row("Typical soil", r.classification.soil_type().to_string()),
        ],
        TestReport::Consolidation(ConsolidationResult::TimeRate(r)) => vec![
            Row("Settlement", format!("{} mm", format_fixed(r.total_settlement_mm, 3))),
            Row("Strain", format!("{}%", format_fixed(r.strain_pct, 2))),
            Row("Compression ratio", format_fixed(r.compression_ratio, 4)),
            Row("Final void ratio", format_fixed(r.final_void_ratio, 3)),
            Row("mv", format!("{} 1/kPa", format_exp(r.volume_compressibility, 3))),
            Row("cv", format!("{} mm²/min", format_exp(r.coefficient_of_consolidation, 3))),
        ],
        TestReport::Consolidation(ConsolidationResult::PressureIncrement(r)) => vec![
            Row("Δe", format_fixed(r.void_ratio_change, 4)),
            Row("Final void ratio", format_fixed(r.final_void_ratio, 3)),
            Row("Settlement", format!("{}%", format_fixed(r.settlement_pct, 2))),
            Row("av", format!("{} 1/kPa", format_exp(r.coefficient_of_compressibility, 3))),
            Row("mv", format!("{} 1/kPa", format_exp(r.volume_compressibility, 3))),
        ],
        TestReport::ShearStrength(r) => vec![
            Row("Cohesion", format!("{} kPa", format_fixed(r.cohesion_kpa, 2))),
            Row("Friction angle", format!("{}°", format_fixed(r.friction_angle_deg, 1))),
            Row("tan φ", format_fixed(r.tan_phi, 4)),
            Row("Bearing capacity", r.classification.bearing_capacity().to_string()),
        ],
        TestReport::SpecificGravity(r) => {
            let mut rows = vec![
                Row("Temperature", format!("{} °C", format_fixed(r.temperature_c, 1))),
                Row("Correction K", format_fixed(r.correction_factor, 4)),
                Row("Gs", format_fixed(r.specific_gravity, 3)),
                Row("Volume of solids", format!("{} cm³", format_fixed(r.volume_solids_cm3, 2))),
                Row("Soil origin", r.classification.soil_origin().to_string()),
            ];
            rows.extend(r.comparison.iter().map(|m| {
                Row("  compare", format!("{:<16}{}", m.material, format_fixed(m.specific_gravity, 2)))
            }));
            rows
        }
    }
}

pub fn report(test_name: &str, report: &TestReport) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("  {} RESULTS\n", test_name.to_uppercase()));
    out.push_str(RULE);
    out.push('\n');
    for Row(label, value) in rows(report) {
        out.push_str(&format!("  {:<20}{}\n", label, value));
    }
    out.push_str(&format!("\n  Classification: {}\n", report.classification()));

    if let Some(working) = report.working() {
        out.push_str("\n  Calculation:\n");
        out.push_str(&format!("    Formula:             {}\n", working.formula));
        out.push_str(&format!("    Substituting values: {}\n", working.values));
        out.push_str(&format!("    Result:              {}\n", working.result));
    }

    let chart = report.chart();
    if !chart.is_empty() {
        out.push_str("\n  Chart:\n");
        out.push_str(&chart_table(chart));
    }
    out
}

fn chart_table(points: &[ChartPoint]) -> String {
    points
        .iter()
        .map(|p| format!("    {:>12}  {:>12}\n", format_fixed(p.x, 4), format_fixed(p.y, 4)))
        .collect()
}

pub fn notification(note: &Notification) -> String {
    let marker = match note.variant {
        Variant::Success => "✓",
        Variant::Destructive => "✗",
    };
    format!("{} {}: {}", marker, note.title, note.description)
}

pub fn feedback_list(records: &[FeedbackRecord]) -> String {
    let mut out = String::new();
    for r in records {
        let stars = r.rating.map(|n| "★".repeat(usize::from(n))).unwrap_or_default();
        let who = r.name.as_deref().unwrap_or("Anonymous");
        out.push_str(&format!(
            "{}  {:<8} {:<16} {:<5}  {}\n",
            r.created_at.format("%Y-%m-%d %H:%M"),
            r.feedback_type,
            who,
            stars,
            r.feedback_text
        ));
    }
    if records.is_empty() {
        out.push_str("No feedback found.\n");
    }
    out
}

pub fn stats(stats: &FeedbackStats) -> String {
    format!(
        "Total feedback:   {}\nRegular:          {}\nExit:             {}\nAverage rating:   {}\nLiked:            {}\nDisliked:         {}\n",
        stats.total,
        stats.regular,
        stats.exit,
        format_fixed(stats.avg_rating, 1),
        stats.liked,
        stats.disliked
    )
}
