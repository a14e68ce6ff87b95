//! # Notifications
//!
//! The short message shown to the user after a calculation or a feedback
//! submission. A presentation layer decides how to show it (toast, stderr line).

use serde::{Deserialize, Serialize};

use crate::calculations::TestReport;
use crate::errors::{CalcError, CalcResult, ErrorKind};

/// Failure message shown when a calculator rejects a non-numeric or blank field
pub const INVALID_INPUT_MESSAGE: &str = "Please enter valid numerical values for all required fields.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    Success,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notification {
            title: title.into(),
            description: description.into(),
            variant: Variant::Success,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Notification {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }

    pub fn is_success(&self) -> bool {
        self.variant == Variant::Success
    }

    /// Completion message for a finished calculation.
    pub fn from_report(report: &TestReport) -> Self {
        let (title, description) = report.summary();
        Notification::success(title, description)
    }

    /// Failure message for a rejected calculation.
    ///
    /// Store and file errors are not expected here; they get the generic
    /// "Error" message and are logged.
    pub fn from_calc_error(err: &CalcError) -> Self {
        match (err.kind(), err) {
            (ErrorKind::Input, _) => Notification::destructive("Invalid Input", INVALID_INPUT_MESSAGE),
            (ErrorKind::Domain, CalcError::DomainError { reason, .. }) => {
                Notification::destructive("Invalid Values", with_period(reason))
            }
            _ => {
                log::error!("calculation failed: {}", err);
                Notification::destructive("Error", err.to_string())
            }
        }
    }

    /// Message for either outcome of a calculation.
    pub fn for_calculation(outcome: &CalcResult<TestReport>) -> Self {
        match outcome {
            Ok(report) => Notification::from_report(report),
            Err(err) => Notification::from_calc_error(err),
        }
    }
}

fn with_period(text: &str) -> String {
    if text.ends_with('.') {
        text.to_string()
    } else {
        format!("{}.", text)
    }
}
