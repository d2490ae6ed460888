//! Holder records written into lock-file sidecars.
//!
//! A sidecar holds one JSON [`LockMetadata`] document. Besides describing the
//! holder for error messages, the record carries a per-acquisition `token`:
//! unlock only deletes a sidecar whose token is still its own.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static TOKEN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Who holds a lock-file sidecar, and since when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockMetadata {
    /// Owner of the lock (e.g., `user@HOST`).
    pub owner: String,

    /// Process ID of the lock holder (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// When the lock was taken (RFC3339).
    pub created_at: DateTime<Utc>,

    /// The operation holding the lock.
    pub action: String,

    /// Identifies a single acquisition; unique per process and call.
    pub token: String,
}

/// What is found at a sidecar path that could not be created.
#[derive(Debug)]
pub enum Sidecar {
    /// A lock record from some holder.
    Held(LockMetadata),
    /// Empty or cut short: a holder that is still writing its record.
    Incomplete,
    /// Complete content that is not a lock record.
    Foreign,
}

impl LockMetadata {
    /// Record for a new acquisition by this process.
    pub fn new(action: &str) -> Self {
        let pid = std::process::id();
        let created_at = Utc::now();
        Self {
            owner: get_owner_string(),
            pid: Some(pid),
            created_at,
            action: action.to_string(),
            token: new_token(pid, created_at),
        }
    }

    /// Parse a record from a sidecar file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Classify whatever occupies `path`.
    pub fn inspect<P: AsRef<Path>>(path: P) -> io::Result<Sidecar> {
        let content = fs::read(path.as_ref())?;
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Sidecar::Incomplete);
        }

        match serde_json::from_slice::<LockMetadata>(&content) {
            Ok(meta) => Ok(Sidecar::Held(meta)),
            Err(e) if e.is_eof() => Ok(Sidecar::Incomplete),
            Err(_) => Ok(Sidecar::Foreign),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Whether `other` describes this same acquisition.
    pub fn same_acquisition(&self, other: &LockMetadata) -> bool {
        self.token == other.token && self.pid == other.pid
    }

    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Age as `42s`, `5m`, `3h 20m` or `2d 4h`.
    pub fn age_string(&self) -> String {
        let age = self.age();
        match (age.num_days(), age.num_hours(), age.num_minutes()) {
            (d, h, _) if d > 0 => format!("{}d {}h", d, h % 24),
            (_, h, m) if h > 0 => format!("{}h {}m", h, m % 60),
            (_, _, m) if m > 0 => format!("{}m", m),
            _ => format!("{}s", age.num_seconds().max(0)),
        }
    }

    /// Older than `stale_minutes`.
    pub fn is_stale(&self, stale_minutes: u32) -> bool {
        self.age().num_minutes() > i64::from(stale_minutes)
    }
}

impl fmt::Display for LockMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner: {}, pid: ", self.owner)?;
        match self.pid {
            Some(pid) => write!(f, "{}", pid)?,
            None => f.write_str("unknown")?,
        }
        write!(f, ", age: {}, action: {}", self.age_string(), self.action)
    }
}

fn new_token(pid: u32, at: DateTime<Utc>) -> String {
    let seq = TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{:x}-{:x}-{:x}",
        pid,
        at.timestamp_nanos_opt().unwrap_or_default(),
        seq
    )
}

/// `user@host` for the current process.
pub(crate) fn get_owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_records_this_process() {
        let meta = LockMetadata::new("write_file");

        assert!(meta.owner.contains('@'));
        assert_eq!(meta.pid, Some(std::process::id()));
        assert_eq!(meta.action, "write_file");
        assert!(meta.age().num_minutes() < 1);
    }

    #[test]
    fn test_tokens_differ_between_acquisitions() {
        let a = LockMetadata::new("write_file");
        let b = LockMetadata::new("write_file");

        assert_ne!(a.token, b.token);
        assert!(!a.same_acquisition(&b));
        assert!(a.same_acquisition(&a.clone()));
    }

    #[test]
    fn test_inspect_held_sidecar() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json.lock");
        let meta = LockMetadata::new("write_file");
        fs::write(&path, meta.to_json().unwrap()).unwrap();

        match LockMetadata::inspect(&path).unwrap() {
            Sidecar::Held(found) => assert_eq!(found, meta),
            other => panic!("expected Held, got {other:?}"),
        }
        assert_eq!(LockMetadata::from_file(&path).unwrap(), meta);
    }

    #[test]
    fn test_inspect_empty_and_truncated_are_incomplete() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json.lock");

        fs::write(&path, "").unwrap();
        assert!(matches!(
            LockMetadata::inspect(&path).unwrap(),
            Sidecar::Incomplete
        ));

        let json = LockMetadata::new("write_file").to_json().unwrap();
        fs::write(&path, &json[..json.len() / 2]).unwrap();
        assert!(matches!(
            LockMetadata::inspect(&path).unwrap(),
            Sidecar::Incomplete
        ));
    }

    #[test]
    fn test_inspect_unrelated_content_is_foreign() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.lock");

        fs::write(&path, "meeting notes, do not delete").unwrap();
        assert!(matches!(
            LockMetadata::inspect(&path).unwrap(),
            Sidecar::Foreign
        ));

        fs::write(&path, r#"{"version": 3}"#).unwrap();
        assert!(matches!(
            LockMetadata::inspect(&path).unwrap(),
            Sidecar::Foreign
        ));
    }

    #[test]
    fn test_from_garbage_is_invalid_data() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.lock");
        fs::write(&path, "not json").unwrap();

        let err = LockMetadata::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_age_string_tiers() {
        let mut meta = LockMetadata::new("test");
        assert!(meta.age_string().ends_with('s'));

        meta.created_at = Utc::now() - Duration::minutes(5);
        assert_eq!(meta.age_string(), "5m");

        meta.created_at = Utc::now() - Duration::minutes(200);
        assert_eq!(meta.age_string(), "3h 20m");

        meta.created_at = Utc::now() - Duration::days(3);
        assert!(meta.age_string().starts_with("3d"));
    }

    #[test]
    fn test_is_stale() {
        let mut meta = LockMetadata::new("test");
        assert!(!meta.is_stale(120));

        meta.created_at = Utc::now() - Duration::minutes(150);
        assert!(meta.is_stale(120));
    }

    #[test]
    fn test_display_describes_holder() {
        let mut meta = LockMetadata::new("write_file");
        meta.pid = None;

        let shown = meta.to_string();
        assert!(shown.contains("pid: unknown"));
        assert!(shown.contains("action: write_file"));
    }
}
