//! # File I/O Module
//!
//! JSON file operations shared by the settings file and the feedback store:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: One writer at a time, even across processes
//! - **Version validation**: Ensure schema compatibility
//!
//! Lock files sit beside the data file with a `.lock` suffix
//! (`feedback.json.lock`) and record who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use soil_core::file_io::{save_json_atomic, load_json, FileLock};
//! use soil_core::settings::LabSettings;
//! use std::path::Path;
//!
//! let path = Path::new("lab-settings.json");
//! let lock = FileLock::acquire(path, "technician")?;
//! save_json_atomic(&LabSettings::default(), path)?;
//! drop(lock);
//!
//! let settings: LabSettings = load_json(path)?;
//! # Ok::<(), soil_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Locks older than this are taken over regardless of owner
const STALE_LOCK_HOURS: i64 = 24;

/// Lock file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who acquired the lock
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// True when the owning process is gone or the lock has expired.
    pub fn is_stale(&self) -> bool {
        if let Some(ours) = hostname() {
            if self.machine == ours && !process_alive(self.pid) {
                return true;
            }
        }
        Utc::now() - self.locked_at > Duration::hours(STALE_LOCK_HOURS)
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Exclusive lock on a data file, released on drop.
///
/// Holds an OS-level lock (fs2) on the `.lock` file and writes [`LockInfo`]
/// into it so other users can see who has the file.
pub struct FileLock {
    data_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for `path`.
    ///
    /// Fails with [`CalcError::FileLocked`] while a live lock exists.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if existing.is_stale() {
                    log::warn!(
                        "taking over stale lock on {} held by {} since {}",
                        path.display(),
                        existing.user_id,
                        existing.locked_at.to_rfc3339()
                    );
                } else if os_lock_held(&lock_path) {
                    return Err(CalcError::file_locked(
                        path.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                } else {
                    log::warn!(
                        "taking over abandoned lock on {} left by {} on {}",
                        path.display(),
                        existing.user_id,
                        existing.machine
                    );
                }
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(
                path.display().to_string(),
                "another process".to_string(),
                "unknown".to_string(),
            )
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(|e| CalcError::SerializationError {
            reason: e.to_string(),
        })?;
        lock_file
            .write_all(lock_json.as_bytes())
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(FileLock {
            data_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current live lock holder for `path`, if any.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path))
            .ok()
            .filter(|info| !info.is_stale())
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// True while some process holds the OS lock on an existing lock file.
///
/// A sidecar left behind by a crashed process carries no OS lock.
fn os_lock_held(lock_path: &Path) -> bool {
    let file = match OpenOptions::new().read(true).write(true).open(lock_path) {
        Ok(file) => file,
        Err(_) => return false,
    };
    // Dropping the handle releases the lock if we got it
    file.try_lock_exclusive().is_err()
}

/// `data.json` -> `data.json.lock`
pub fn lock_path_for(data_path: &Path) -> PathBuf {
    with_suffix(data_path, "lock")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })
}

fn read_to_string(path: &Path, operation: &str) -> CalcResult<String> {
    let mut file =
        File::open(path).map_err(|e| CalcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Serialize `value` as pretty JSON and write it atomically.
///
/// Writes `<path>.tmp`, syncs it to disk, then renames it over `path`.
/// An interrupted save leaves the previous file intact.
pub fn save_json_atomic<T: Serialize>(value: &T, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = with_suffix(path, "tmp");
    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .write_all(json.as_bytes())
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Read and parse a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> CalcResult<T> {
    let contents = read_to_string(path, "read")?;
    serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })
}

/// Check a file's `major.minor.patch` version against the one this build writes.
///
/// Major versions must match; under 0.x a newer minor version is rejected too.
pub fn validate_version(file_version: &str, expected: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(expected);

    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: expected.to_string(),
    };

    if file_parts.is_empty() || current_parts.is_empty() || file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn test_lock_path_generation() {
        assert_eq!(
            lock_path_for(Path::new("/data/feedback.json")),
            Path::new("/data/feedback.json.lock")
        );
        assert_eq!(lock_path_for(Path::new("/data/store")), Path::new("/data/store.lock"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("values.json");

        let mut values = BTreeMap::new();
        values.insert("liquid_limit".to_string(), 45.0);
        save_json_atomic(&values, &path).unwrap();

        let loaded: BTreeMap<String, f64> = load_json(&path).unwrap();
        assert_eq!(loaded, values);
        assert!(!dir.path().join("values.json.tmp").exists());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_json::<BTreeMap<String, f64>>(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_json::<BTreeMap<String, f64>>(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedback.json");

        let lock = FileLock::acquire(&path, "technician").unwrap();
        assert_eq!(lock.info.user_id, "technician");
        assert_eq!(lock.data_path(), path.as_path());
        assert!(lock_path_for(&path).exists());
        assert!(FileLock::check(&path).is_some());

        let second = FileLock::acquire(&path, "someone-else");
        assert_eq!(second.err().map(|e| e.error_code()), Some("FILE_LOCKED"));

        drop(lock);
        assert!(!lock_path_for(&path).exists());
        assert!(FileLock::check(&path).is_none());
    }

    #[test]
    fn test_expired_lock_is_taken_over() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedback.json");

        let mut old = LockInfo::new("left-for-the-weekend");
        old.machine = "another-host".to_string();
        old.locked_at = Utc::now() - Duration::hours(STALE_LOCK_HOURS + 1);
        fs::write(lock_path_for(&path), serde_json::to_string(&old).unwrap()).unwrap();

        assert!(old.is_stale());
        let lock = FileLock::acquire(&path, "technician").unwrap();
        assert_eq!(lock.info.user_id, "technician");
    }

    #[test]
    fn test_abandoned_lock_is_taken_over() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedback.json");

        // Fresh sidecar from a crashed process on another machine, no OS lock behind it
        let mut crashed = LockInfo::new("crashed-terminal");
        crashed.machine = "another-host".to_string();
        fs::write(lock_path_for(&path), serde_json::to_string(&crashed).unwrap()).unwrap();

        assert!(!crashed.is_stale());
        let lock = FileLock::acquire(&path, "technician").unwrap();
        assert_eq!(lock.info.user_id, "technician");
        assert_eq!(FileLock::check(&path).map(|info| info.user_id), Some("technician".to_string()));
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version("0.1.0", "0.1.0").is_ok());
        assert!(validate_version("0.1.5", "0.1.0").is_ok());
        assert!(validate_version("0.0.9", "0.1.0").is_ok());
        assert!(validate_version("1.0.0", "0.1.0").is_err());
        assert!(validate_version("0.2.0", "0.1.0").is_err());
        assert!(validate_version("garbage", "0.1.0").is_err());
    }
}
