//! # soil_core - Soil Laboratory Calculation Engine
//!
//! `soil_core` is the computational heart of Soil Lab. It reduces laboratory
//! soil test measurements to engineering results, classifications, and
//! chart points, and keeps the user feedback collected alongside the tools.
//! All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Calculators are pure functions of input and settings
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use soil_core::calculations::SoilTest;
//! use soil_core::fields::FormFields;
//! use soil_core::settings::LabSettings;
//!
//! let fields = FormFields::from_pairs([("liquid_limit", "45"), ("plastic_limit", "20")]);
//! let test = SoilTest::from_fields("plasticity", &fields).unwrap();
//! let report = test.run(&LabSettings::default()).unwrap();
//! assert_eq!(report.classification(), "Medium Plasticity (CI)");
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The eight soil test calculators
//! - [`fields`] - Raw form input parsing
//! - [`settings`] - Assumption tables
//! - [`notification`] - User-facing outcome messages
//! - [`feedback`] - Feedback store, dashboard, and CSV export
//! - [`units`] - Constants and number formatting
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves and locking

pub mod calculations;
pub mod errors;
pub mod feedback;
pub mod fields;
pub mod file_io;
pub mod notification;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{ChartPoint, SoilTest, TestReport, Working};
pub use errors::{CalcError, CalcResult};
pub use fields::FormFields;
pub use notification::{Notification, Variant};
pub use settings::LabSettings;
