//! Backend selection for the default lock provider.

use super::{FlockLock, Lock, LockFile, LockProvider};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which lock implementation guards writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LockBackend {
    /// Exclusive-create sidecar with holder metadata (default).
    #[default]
    LockFile,
    /// Kernel `flock` on a sidecar; released automatically if the holder dies.
    Flock,
}

impl LockBackend {
    /// Parse a backend from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lock_file" => Some(Self::LockFile),
            "flock" => Some(Self::Flock),
            _ => None,
        }
    }

    /// Get the string representation of this backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LockFile => "lock_file",
            Self::Flock => "flock",
        }
    }
}

/// A lock handle from either backend.
#[derive(Debug)]
pub enum PathLock {
    LockFile(LockFile),
    Flock(FlockLock),
}

impl Lock for PathLock {
    fn path(&self) -> &Path {
        match self {
            PathLock::LockFile(lock) => lock.path(),
            PathLock::Flock(lock) => lock.path(),
        }
    }

    fn try_lock(&mut self) -> Result<()> {
        match self {
            PathLock::LockFile(lock) => lock.try_lock(),
            PathLock::Flock(lock) => lock.try_lock(),
        }
    }

    fn unlock(&mut self) -> Result<()> {
        match self {
            PathLock::LockFile(lock) => lock.unlock(),
            PathLock::Flock(lock) => lock.unlock(),
        }
    }
}

/// Default provider: one [`PathLock`] per call, built from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileLocks {
    pub backend: LockBackend,
    pub lock_stale_minutes: u32,
}

impl Default for FileLocks {
    fn default() -> Self {
        Self {
            backend: LockBackend::default(),
            lock_stale_minutes: 120,
        }
    }
}

impl LockProvider for FileLocks {
    type Lock = PathLock;

    fn new_lock(&self, path: &Path) -> PathLock {
        match self.backend {
            LockBackend::LockFile => PathLock::LockFile(
                LockFile::new(path).with_stale_minutes(self.lock_stale_minutes),
            ),
            LockBackend::Flock => PathLock::Flock(FlockLock::new(path)),
        }
    }
}
