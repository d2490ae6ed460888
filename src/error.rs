//! Error types for lockwrite.
//!
//! Uses thiserror for derive macros. Every variant names the path it concerns
//! and keeps the underlying cause reachable through `source()`.

use crate::locks::LockMetadata;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for locked writes.
#[derive(Error, Debug)]
pub enum LockWriteError {
    /// The lock is currently held by someone else.
    #[error("lock '{}' is held by another process{}", .path.display(), describe_holder(.holder))]
    Busy {
        path: PathBuf,
        holder: Option<LockMetadata>,
    },

    /// The sidecar path is occupied by a file that is not a lock record.
    ///
    /// Waiting cannot clear this, so acquisition stops at once.
    #[error("'{}' exists but is not a lock file; remove or rename it", .path.display())]
    Foreign { path: PathBuf },

    /// The lock could not be taken for a reason other than contention.
    #[error("failed to acquire lock '{}': {source}", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Retrying ran out of time (or attempts) before the lock was acquired.
    #[error(
        "error acquiring lock for '{}' after {attempts} attempt(s) in {:.1?}: {source}",
        .path.display(),
        .elapsed
    )]
    Timeout {
        path: PathBuf,
        attempts: u32,
        elapsed: Duration,
        #[source]
        source: Box<LockWriteError>,
    },

    /// The raw write failed while the lock was held.
    #[error("error writing file '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Releasing the lock failed.
    #[error("error releasing lock for file '{}': {source}", .path.display())]
    Unlock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration could not be read or is invalid.
    #[error("{0}")]
    Config(String),
}

impl LockWriteError {
    /// Whether this error (or the one it wraps) means the lock was contended.
    pub fn is_contention(&self) -> bool {
        match self {
            LockWriteError::Busy { .. } => true,
            LockWriteError::Timeout { source, .. } => source.is_contention(),
            _ => false,
        }
    }

    /// Whether another try-lock attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LockWriteError::Busy { .. } | LockWriteError::Lock { .. })
    }
}

fn describe_holder(holder: &Option<LockMetadata>) -> String {
    holder
        .as_ref()
        .map(|meta| format!(" ({meta})"))
        .unwrap_or_default()
}

/// Result type alias for lockwrite operations.
pub type Result<T> = std::result::Result<T, LockWriteError>;
