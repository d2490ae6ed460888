//! RAII lock guard implementation.

use super::{Lock, acquire_with_retry};
use crate::error::Result;
use crate::retry::RetryPolicy;
use std::path::Path;
use tracing::warn;

/// RAII guard around a lock handle.
///
/// The guard is created around a handle *before* acquisition, so releasing is
/// registered for every exit path: [`release`](LockGuard::release) surfaces the
/// unlock result, and dropping an unreleased guard unlocks it and logs any
/// failure instead of panicking. Either way `unlock` runs exactly once.
#[derive(Debug)]
pub struct LockGuard<L: Lock> {
    /// The wrapped handle.
    lock: L,

    /// Whether the lock has been released manually.
    released: bool,
}

impl<L: Lock> LockGuard<L> {
    /// Wrap a handle. Nothing is acquired yet.
    pub fn new(lock: L) -> Self {
        Self {
            lock,
            released: false,
        }
    }

    /// Get the path the lock protects.
    pub fn path(&self) -> &Path {
        self.lock.path()
    }

    /// Get the wrapped handle.
    pub fn lock(&self) -> &L {
        &self.lock
    }

    /// Acquire the lock, retrying under `policy`.
    pub fn acquire(&mut self, policy: &RetryPolicy) -> Result<()> {
        acquire_with_retry(&mut self.lock, policy)
    }

    /// Manually release the lock.
    ///
    /// Use this instead of dropping the guard when the unlock error matters.
    /// Releasing a handle that was never acquired is a no-op.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.lock.unlock()
    }
}

impl<L: Lock> Drop for LockGuard<L> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = self.lock.unlock()
        {
            warn!(path = %self.lock.path().display(), error = %e, "failed to release lock on drop");
        }
    }
}
