//! # Form Fields
//!
//! Raw form input arrives as name/value strings. [`FormFields`] turns those
//! strings into numbers before any calculator sees them, so a calculator
//! input is either fully typed or never built.
//!
//! - Absent or blank field: `MissingField` for required values, `None` for
//!   defaulted values.
//! - Anything that is not a finite number: `InvalidInput`.
//!
//! ## Example
//!
//! ```rust
//! use soil_core::fields::FormFields;
//!
//! let fields = FormFields::from_pairs([("wet_mass", "1800"), ("mold_volume", "")]);
//! assert_eq!(fields.required("wet_mass").unwrap(), 1800.0);
//! assert_eq!(fields.optional("mold_volume").unwrap(), None);
//! assert!(fields.required("dry_mass").is_err());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Raw string values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormFields {
    values: BTreeMap<String, String>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        FormFields {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse `name=value` assignments (as typed on a command line).
    pub fn parse_assignments<I, S>(assignments: I) -> CalcResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = FormFields::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (name, value) = assignment.split_once('=').ok_or_else(|| {
                CalcError::invalid_input(assignment, assignment, "Expected name=value")
            })?;
            fields.set(name.trim(), value.trim());
        }
        Ok(fields)
    }

    /// Set (or replace) a field value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Raw text of a field, if present and non-blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// A field that must be present and numeric.
    pub fn required(&self, name: &str) -> CalcResult<f64> {
        match self.text(name) {
            Some(raw) => parse_number(name, raw),
            None => Err(CalcError::missing_field(name)),
        }
    }

    /// A field that falls back to a default when absent or blank.
    pub fn optional(&self, name: &str) -> CalcResult<Option<f64>> {
        self.text(name).map(|raw| parse_number(name, raw)).transpose()
    }
}

fn parse_number(name: &str, raw: &str) -> CalcResult<f64> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(CalcError::invalid_input(name, raw, "Value must be a finite number")),
        Err(_) => Err(CalcError::invalid_input(name, raw, "Please enter a valid numerical value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_and_optional() {
        let fields = FormFields::from_pairs([("a", " 12.5 "), ("b", "  "), ("c", "x1")]);
        assert_eq!(fields.required("a").unwrap(), 12.5);
        assert_eq!(fields.required("b"), Err(CalcError::missing_field("b")));
        assert_eq!(fields.optional("b").unwrap(), None);
        assert_eq!(fields.optional("missing").unwrap(), None);
        assert_eq!(fields.required("c").unwrap_err().error_code(), "INVALID_INPUT");
        assert_eq!(fields.optional("c").unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_rejects_non_finite() {
        let fields = FormFields::from_pairs([("nan", "NaN"), ("inf", "inf")]);
        assert!(fields.required("nan").is_err());
        assert!(fields.required("inf").is_err());
    }

    #[test]
    fn test_parse_assignments() {
        let fields = FormFields::parse_assignments(["wet_mass=1800", " water_content = 12 "]).unwrap();
        assert_eq!(fields.required("wet_mass").unwrap(), 1800.0);
        assert_eq!(fields.required("water_content").unwrap(), 12.0);

        assert!(FormFields::parse_assignments(["oops"]).is_err());
    }

    #[test]
    fn test_text_is_trimmed() {
        let fields = FormFields::from_pairs([("mode", " time-rate ")]);
        assert_eq!(fields.text("mode"), Some("time-rate"));
    }
}
