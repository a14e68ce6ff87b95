//! JSON file feedback store.
//!
//! All records live in one JSON document. Each insert takes the file lock,
//! rereads the file, appends, and saves atomically, so several processes can
//! share a store on a network drive.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{sort_newest_first, FeedbackRecord, FeedbackStore, NewFeedback};
use crate::errors::CalcResult;
use crate::file_io::{load_json, save_json_atomic, validate_version, FileLock};

/// Current schema version for feedback files
pub const SCHEMA_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FeedbackFile {
    version: String,
    records: Vec<FeedbackRecord>,
}

impl Default for FeedbackFile {
    fn default() -> Self {
        FeedbackFile {
            version: SCHEMA_VERSION.to_string(),
            records: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Recorded in the lock file while inserting
    user_id: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, user_id: impl Into<String>) -> Self {
        JsonFileStore {
            path: path.into(),
            user_id: user_id.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty store.
    fn read(&self) -> CalcResult<FeedbackFile> {
        if !self.path.exists() {
            return Ok(FeedbackFile::default());
        }
        let file: FeedbackFile = load_json(&self.path)?;
        validate_version(&file.version, SCHEMA_VERSION)?;
        Ok(file)
    }
}

impl FeedbackStore for JsonFileStore {
    fn insert(&mut self, feedback: NewFeedback) -> CalcResult<FeedbackRecord> {
        feedback.validate()?;
        let _lock = FileLock::acquire(&self.path, self.user_id.as_str())?;

        let mut file = self.read()?;
        let record = feedback.into_record();
        file.records.push(record.clone());
        save_json_atomic(&file, &self.path)?;

        log::debug!("appended feedback {} to {}", record.id, self.path.display());
        Ok(record)
    }

    fn query(&self) -> CalcResult<Vec<FeedbackRecord>> {
        let mut records = self.read()?.records;
        sort_newest_first(&mut records);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::FeedbackType;
    use crate::file_io::lock_path_for;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("feedback.json"), "tester");
        assert!(store.query().unwrap().is_empty());
    }

    #[test]
    fn test_insert_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedback.json");

        let mut store = JsonFileStore::new(&path, "tester");
        let first = store
            .insert(NewFeedback::regular("Asha", "", 4, "Clear charts").unwrap())
            .unwrap();
        let second = store.insert(NewFeedback::exit(false)).unwrap();
        assert!(!lock_path_for(&path).exists());

        let reopened = JsonFileStore::new(&path, "someone-else");
        let records = reopened.query().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, second.id);
        assert_eq!(records[1], first);
    }

    #[test]
    fn test_insert_fails_while_locked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        let _held = FileLock::acquire(&path, "other-terminal").unwrap();

        let mut store = JsonFileStore::new(&path, "tester");
        let err = store.insert(NewFeedback::exit(true)).unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert!(!path.exists());
    }

    #[test]
    fn test_rejects_invalid_entry_without_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        let mut store = JsonFileStore::new(&path, "tester");

        let entry = NewFeedback {
            name: Some("Asha".to_string()),
            email: None,
            rating: Some(9),
            feedback_text: String::new(),
            feedback_type: FeedbackType::Regular,
            liked: None,
        };
        assert!(store.insert(entry).is_err());
        assert!(!path.exists());
        assert!(!lock_path_for(&path).exists());
        assert!(store.query().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_newer_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        std::fs::write(&path, r#"{ "version": "0.5.0", "records": [] }"#).unwrap();

        let store = JsonFileStore::new(&path, "tester");
        assert_eq!(store.query().unwrap_err().error_code(), "VERSION_MISMATCH");
    }
}
