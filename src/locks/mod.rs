//! Advisory locking keyed by filesystem path.
//!
//! # Model
//!
//! A [`Lock`] is a non-reentrant, path-identified mutual-exclusion handle with
//! a non-blocking `try_lock` and an `unlock`. A [`LockProvider`] builds one
//! handle per call. Callers never touch handles directly: they wrap them in a
//! [`LockGuard`], which retries acquisition under a
//! [`RetryPolicy`](crate::retry::RetryPolicy) and guarantees a single release.
//!
//! # Backends
//!
//! Both backends lock a sidecar file named `<target>.lock` next to the target:
//! - [`LockFile`] creates the sidecar with **create_new** semantics and writes
//!   JSON [`LockMetadata`] into it. Unlock deletes it, but only while it still
//!   holds this handle's record. A crash leaves the sidecar behind and later
//!   writers time out until it is removed. A sidecar path occupied by a file
//!   that is not a lock record fails at once with
//!   [`LockWriteError::Foreign`](crate::error::LockWriteError::Foreign).
//! - [`FlockLock`] takes an exclusive kernel `flock` on the sidecar. The kernel
//!   drops the lock when the holder exits. The sidecar itself is left in place.
//!
//! # Releasing an unacquired handle
//!
//! `unlock` on a handle that does not hold its lock is a no-op returning
//! `Ok(())`, so a failed acquisition is never masked by a spurious unlock error.

mod acquire;
mod backend;
mod flock;
mod guard;
mod lock_file;
mod metadata;


use crate::error::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

// Re-export public API
pub use acquire::acquire_with_retry;
pub use backend::{FileLocks, LockBackend, PathLock};
pub use flock::FlockLock;
pub use guard::LockGuard;
pub use lock_file::LockFile;
pub use metadata::{LockMetadata, Sidecar};

/// Action recorded in lock metadata by the locked writer.
pub const WRITE_ACTION: &str = "write_file";

/// A path-keyed advisory lock handle.
pub trait Lock {
    /// The path this lock protects.
    fn path(&self) -> &Path;

    /// Try to take the lock without blocking.
    ///
    /// Fails with [`LockWriteError::Busy`](crate::error::LockWriteError::Busy)
    /// when someone else holds it, including this same handle.
    fn try_lock(&mut self) -> Result<()>;

    /// Release the lock. A no-op when the lock is not held.
    fn unlock(&mut self) -> Result<()>;
}

/// Builds a fresh lock handle for a target path.
pub trait LockProvider {
    type Lock: Lock;

    fn new_lock(&self, path: &Path) -> Self::Lock;
}

/// Sidecar lock path for a target: `<target>.lock`.
pub fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}
