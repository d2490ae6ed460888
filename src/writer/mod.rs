//! Locked writes.
//!
//! [`LockedWriter`] ties the pieces together for one call:
//!
//! 1. Build a lock handle for the target and wrap it in a [`LockGuard`], which
//!    registers the release before anything can fail.
//! 2. Acquire with non-blocking attempts under exponential backoff.
//! 3. Only if the lock is held, run the raw write.
//! 4. Release, then report a single result.
//!
//! # Error precedence
//!
//! Acquisition error, then write error, then release error: the earliest root
//! cause wins. A release failure that follows an earlier error is logged at
//! `warn` rather than returned.


use crate::config::WriteConfig;
use crate::error::{LockWriteError, Result};
use crate::fs::{FsWriter, RawWrite};
use crate::locks::{FileLocks, LockGuard, LockProvider};
use crate::retry::RetryPolicy;
use std::path::Path;
use tracing::{info, warn};

/// Write `data` to `path` under the default lock, retry schedule and writer.
///
/// `mode` is applied if the file is created. See [`LockedWriter::write_file`].
pub fn write_file<P: AsRef<Path>>(path: P, data: &[u8], mode: u32) -> Result<()> {
    let writer: LockedWriter = LockedWriter::default();
    writer.write_file(path, data, mode)
}

/// Writes files while holding a path-keyed advisory lock.
#[derive(Debug, Clone)]
pub struct LockedWriter<P = FileLocks, W = FsWriter> {
    provider: P,
    writer: W,
    policy: RetryPolicy,
}

impl LockedWriter {
    /// Writer configured from `config`, after validating it.
    pub fn new(config: &WriteConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_parts(
            config.lock_provider(),
            FsWriter,
            config.retry_policy(),
        ))
    }
}

impl Default for LockedWriter {
    fn default() -> Self {
        Self::with_parts(FileLocks::default(), FsWriter, RetryPolicy::default())
    }
}

impl<P: LockProvider, W: RawWrite> LockedWriter<P, W> {
    /// Writer from explicit collaborators.
    pub fn with_parts(provider: P, writer: W, policy: RetryPolicy) -> Self {
        Self {
            provider,
            writer,
            policy,
        }
    }

    /// Retry schedule used to acquire each lock.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Source of a fresh lock handle per call.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Raw writer run while the lock is held.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Write `data` to `path` while holding the lock for `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Lock acquired, data written, lock released
    /// * `Err(LockWriteError::Timeout)` - Lock not acquired before the deadline; nothing written
    /// * `Err(LockWriteError::Foreign)` - The lock path holds a file that is not a lock; nothing written
    /// * `Err(LockWriteError::Write)` - The write failed; the lock was still released
    /// * `Err(LockWriteError::Unlock)` - Data written, but releasing the lock failed
    pub fn write_file<Q: AsRef<Path>>(&self, path: Q, data: &[u8], mode: u32) -> Result<()> {
        let path = path.as_ref();
        info!(
            path = %path.display(),
            mode = %format!("{mode:o}"),
            "attempting to write file"
        );

        let mut guard = LockGuard::new(self.provider.new_lock(path));

        let outcome = guard.acquire(&self.policy).and_then(|()| {
            self.writer
                .write(path, data, mode)
                .map_err(|source| LockWriteError::Write {
                    path: path.to_path_buf(),
                    source,
                })
        });

        let released = guard.release();

        match (outcome, released) {
            (Ok(()), released) => released,
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(release_err)) => {
                warn!(
                    path = %path.display(),
                    error = %release_err,
                    "failed to release lock after an earlier error"
                );
                Err(e)
            }
        }
    }
}
