//! # Feedback
//!
//! User feedback on the calculators: star-rated comments submitted from the
//! feedback form, and one-click "liked / did not like" answers given on exit.
//!
//! Records are append-only. A [`FeedbackStore`] assigns the id and timestamp
//! on insert and returns records newest first.
//!
//! - [`file_store`] - JSON file store with locking
//! - [`dashboard`] - Statistics and filtering
//! - [`export`] - CSV export
//!
//! ## Example
//!
//! ```rust
//! use soil_core::feedback::{submit, FeedbackStore, MemoryStore, NewFeedback};
//!
//! let mut store = MemoryStore::new();
//! let feedback = NewFeedback::regular("Asha", "", 5, "The Proctor chart is handy");
//! let note = submit(&mut store, feedback);
//! assert_eq!(note.title, "Feedback Submitted");
//! assert_eq!(store.query().unwrap().len(), 1);
//! ```

pub mod dashboard;
pub mod export;
pub mod file_store;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult, ErrorKind};
use crate::notification::Notification;

pub use dashboard::{FeedbackFilter, FeedbackStats, RatingFilter, TypeFilter};
pub use export::{export_csv, export_filename};
pub use file_store::JsonFileStore;

pub const LIKED_TEXT: &str = "User liked the experience";
pub const DISLIKED_TEXT: &str = "User did not like the experience";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    /// Submitted from the feedback form
    Regular,
    /// Submitted from the exit prompt
    Exit,
}

impl FeedbackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Regular => "regular",
            FeedbackType::Exit => "exit",
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored feedback entry. Never modified after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    /// 1-5 stars
    pub rating: Option<u8>,
    pub feedback_text: String,
    pub feedback_type: FeedbackType,
    /// Exit feedback only
    pub liked: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Feedback awaiting insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedback {
    pub name: Option<String>,
    pub email: Option<String>,
    pub rating: Option<u8>,
    pub feedback_text: String,
    pub feedback_type: FeedbackType,
    pub liked: Option<bool>,
}

impl NewFeedback {
    /// Feedback form submission.
    ///
    /// Name and text are required. A rating of 0 means no rating was given;
    /// a blank email is dropped.
    pub fn regular(name: &str, email: &str, rating: u8, feedback_text: &str) -> CalcResult<Self> {
        let name = name.trim();
        let feedback_text = feedback_text.trim();
        if name.is_empty() {
            return Err(CalcError::missing_field("name"));
        }
        if feedback_text.is_empty() {
            return Err(CalcError::missing_field("feedback_text"));
        }
        if rating > 5 {
            return Err(CalcError::domain("rating", "Rating must be between 1 and 5"));
        }

        let email = email.trim();
        Ok(NewFeedback {
            name: Some(name.to_string()),
            email: (!email.is_empty()).then(|| email.to_string()),
            rating: (rating > 0).then_some(rating),
            feedback_text: feedback_text.to_string(),
            feedback_type: FeedbackType::Regular,
            liked: None,
        })
    }

    /// Exit prompt answer.
    pub fn exit(liked: bool) -> Self {
        NewFeedback {
            name: None,
            email: None,
            rating: None,
            feedback_text: if liked { LIKED_TEXT } else { DISLIKED_TEXT }.to_string(),
            feedback_type: FeedbackType::Exit,
            liked: Some(liked),
        }
    }

    /// Check an entry built by hand rather than through [`NewFeedback::regular`]
    /// or [`NewFeedback::exit`]. Stores run this before anything is written.
    pub fn validate(&self) -> CalcResult<()> {
        if self.feedback_text.trim().is_empty() {
            return Err(CalcError::missing_field("feedback_text"));
        }
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                return Err(CalcError::domain("rating", "Rating must be between 1 and 5"));
            }
        }
        match self.feedback_type {
            FeedbackType::Regular => {
                if self.name.as_deref().map_or(true, |name| name.trim().is_empty()) {
                    return Err(CalcError::missing_field("name"));
                }
                if self.liked.is_some() {
                    return Err(CalcError::domain("liked", "Only exit feedback records liked"));
                }
            }
            FeedbackType::Exit => {
                if self.liked.is_none() {
                    return Err(CalcError::missing_field("liked"));
                }
            }
        }
        Ok(())
    }

    /// Stamp with a fresh id and the current time.
    pub fn into_record(self) -> FeedbackRecord {
        FeedbackRecord {
            id: Uuid::new_v4(),
            name: self.name,
            email: self.email,
            rating: self.rating,
            feedback_text: self.feedback_text,
            feedback_type: self.feedback_type,
            liked: self.liked,
            created_at: Utc::now(),
        }
    }
}

/// Append/query access to stored feedback.
pub trait FeedbackStore {
    /// Store a new entry, returning it with id and timestamp assigned.
    fn insert(&mut self, feedback: NewFeedback) -> CalcResult<FeedbackRecord>;

    /// All entries, newest first.
    fn query(&self) -> CalcResult<Vec<FeedbackRecord>>;
}

/// Newest first; entries with equal timestamps keep latest-inserted first.
pub(crate) fn sort_newest_first(records: &mut Vec<FeedbackRecord>) {
    records.reverse();
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<FeedbackRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FeedbackStore for MemoryStore {
    fn insert(&mut self, feedback: NewFeedback) -> CalcResult<FeedbackRecord> {
        feedback.validate()?;
        let record = feedback.into_record();
        self.records.push(record.clone());
        Ok(record)
    }

    fn query(&self) -> CalcResult<Vec<FeedbackRecord>> {
        let mut records = self.records.clone();
        sort_newest_first(&mut records);
        Ok(records)
    }
}

/// Validate and store feedback, returning the message to show the user.
///
/// Store failures are logged and reported with a generic message.
pub fn submit<S: FeedbackStore + ?Sized>(store: &mut S, feedback: CalcResult<NewFeedback>) -> Notification {
    let feedback = match feedback {
        Ok(feedback) => feedback,
        Err(err) => return rejection_notice(&err),
    };

    match store.insert(feedback) {
        Ok(record) => {
            log::debug!("stored {} feedback {}", record.feedback_type, record.id);
            submission_notice(&record)
        }
        Err(err) if err.kind() != ErrorKind::Store => rejection_notice(&err),
        Err(err) => {
            log::error!("failed to store feedback: {}", err);
            Notification::destructive("Error", "Failed to submit feedback. Please try again.")
        }
    }
}

fn submission_notice(record: &FeedbackRecord) -> Notification {
    match (record.feedback_type, record.liked) {
        (FeedbackType::Exit, Some(true)) => {
            Notification::success("Thanks for the love! ❤️", "We're glad you enjoyed Soil LAB!")
        }
        (FeedbackType::Exit, _) => {
            Notification::success("Sorry to see you go 😢", "We'll work to improve your experience.")
        }
        (FeedbackType::Regular, _) => {
            Notification::success("Feedback Submitted", "Thank you for your valuable feedback!")
        }
    }
}

fn rejection_notice(err: &CalcError) -> Notification {
    match err.kind() {
        ErrorKind::Input => Notification::destructive("Missing Information", "Please provide your name and feedback."),
        _ => Notification::from_calc_error(err),
    }
}

/// Message shown when the dashboard cannot read the store.
pub fn load_failure_notice(err: &CalcError) -> Notification {
    log::error!("failed to load feedback: {}", err);
    Notification::destructive("Error", "Failed to load feedback data.")
}
