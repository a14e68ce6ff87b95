//! # Lab Settings
//!
//! `LabSettings` is the assumptions table behind the calculators: the
//! standard values substituted when a defaulted field is left blank and the
//! constants each reduction relies on. Settings serialize to a JSON file;
//! any table or field missing from the file takes its default.
//!
//! ```text
//! LabSettings
//! ├── version
//! ├── hydrometer: HydrometerAssumptions
//! ├── compaction: CompactionAssumptions
//! └── specific_gravity: SpecificGravityAssumptions
//! ```
//!
//! ## Example
//!
//! ```rust
//! use soil_core::settings::LabSettings;
//!
//! let settings: LabSettings =
//!     serde_json::from_str(r#"{ "compaction": { "default_mold_volume_cm3": 2124.0 } }"#).unwrap();
//! assert_eq!(settings.compaction.default_mold_volume_cm3, 2124.0);
//! assert_eq!(settings.hydrometer.reference_temperature_c, 27.0);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calculations::compaction::CompactionAssumptions;
use crate::calculations::hydrometer::HydrometerAssumptions;
use crate::calculations::specific_gravity::SpecificGravityAssumptions;
use crate::errors::CalcResult;
use crate::file_io::{load_json, save_json_atomic, validate_version};

/// Current schema version for settings files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Assumption tables for every calculator that has them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabSettings {
    pub version: String,
    pub hydrometer: HydrometerAssumptions,
    pub compaction: CompactionAssumptions,
    pub specific_gravity: SpecificGravityAssumptions,
}

impl Default for LabSettings {
    fn default() -> Self {
        LabSettings {
            version: SCHEMA_VERSION.to_string(),
            hydrometer: HydrometerAssumptions::default(),
            compaction: CompactionAssumptions::default(),
            specific_gravity: SpecificGravityAssumptions::default(),
        }
    }
}

impl LabSettings {
    /// Load settings from a JSON file and check its schema version.
    pub fn load(path: &Path) -> CalcResult<Self> {
        let settings: LabSettings = load_json(path)?;
        validate_version(&settings.version, SCHEMA_VERSION)?;
        settings.validate()?;
        log::debug!("loaded lab settings from {}", path.display());
        Ok(settings)
    }

    /// Check every assumption table.
    pub fn validate(&self) -> CalcResult<()> {
        self.hydrometer.validate()?;
        self.compaction.validate()?;
        self.specific_gravity.validate()
    }

    /// Load settings if a path is given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> CalcResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save settings atomically.
    pub fn save(&self, path: &Path) -> CalcResult<()> {
        save_json_atomic(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = LabSettings::default();
        assert_eq!(settings.version, SCHEMA_VERSION);
        assert_eq!(settings.compaction.default_mold_volume_cm3, 944.0);
        assert_eq!(settings.compaction.max_dry_density_g_cm3, 2.1);
        assert_eq!(settings.hydrometer.default_temperature_c, 27.0);
        assert_eq!(settings.hydrometer.specific_gravity, 2.65);
        assert_eq!(settings.specific_gravity.correction_per_degree, 0.0002);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: LabSettings =
            serde_json::from_str(r#"{ "hydrometer": { "default_temperature_c": 20.0 } }"#).unwrap();
        assert_eq!(settings.hydrometer.default_temperature_c, 20.0);
        assert_eq!(settings.hydrometer.reference_temperature_c, 27.0);
        assert_eq!(settings.compaction, CompactionAssumptions::default());
        assert_eq!(settings.version, SCHEMA_VERSION);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lab-settings.json");

        let mut settings = LabSettings::default();
        settings.specific_gravity.default_temperature_c = 25.0;
        settings.save(&path).unwrap();

        assert_eq!(LabSettings::load(&path).unwrap(), settings);
        assert_eq!(LabSettings::load_or_default(Some(&path)).unwrap(), settings);
        assert_eq!(LabSettings::load_or_default(None).unwrap(), LabSettings::default());
    }

    #[test]
    fn test_rejects_unusable_assumptions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lab-settings.json");
        std::fs::write(
            &path,
            r#"{ "compaction": { "default_mold_volume_cm3": 0.0, "max_dry_density_g_cm3": 0.0 } }"#,
        )
        .unwrap();

        let err = LabSettings::load(&path).unwrap_err();
        assert_eq!(err.error_code(), "DOMAIN_ERROR");
        assert!(LabSettings::load_or_default(Some(&path)).is_err());
        assert!(LabSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_newer_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lab-settings.json");
        std::fs::write(&path, r#"{ "version": "0.9.0" }"#).unwrap();

        assert_eq!(LabSettings::load(&path).unwrap_err().error_code(), "VERSION_MISMATCH");
    }
}
