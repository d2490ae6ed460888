//! Instrumented collaborators for tests.

use crate::error::{LockWriteError, Result};
use crate::fs::{FsWriter, RawWrite};
use crate::locks::{Lock, LockProvider, lock_path_for};
use crate::retry::RetryPolicy;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

/// Short retry policy so contention tests finish quickly.
pub(crate) fn fast_policy(deadline: Duration) -> RetryPolicy {
    RetryPolicy {
        initial_interval: Duration::from_millis(2),
        deadline,
        multiplier: 2.0,
        max_interval: Duration::from_millis(20),
        max_attempts: None,
    }
}

/// Shared counters for every [`CountingLock`] built by one [`CountingLocks`].
#[derive(Debug, Default)]
pub(crate) struct Counters {
    try_locks: AtomicU32,
    unlocks: AtomicU32,
}

impl Counters {
    pub(crate) fn try_locks(&self) -> u32 {
        self.try_locks.load(Ordering::SeqCst)
    }

    pub(crate) fn unlocks(&self) -> u32 {
        self.unlocks.load(Ordering::SeqCst)
    }
}

/// In-memory lock that reports busy for its first `busy_attempts` attempts.
#[derive(Debug)]
pub(crate) struct CountingLock {
    path: PathBuf,
    counters: Arc<Counters>,
    busy_attempts: u32,
    fail_unlock: bool,
    attempts: u32,
    held: bool,
}

impl Lock for CountingLock {
    fn path(&self) -> &Path {
        &self.path
    }

    fn try_lock(&mut self) -> Result<()> {
        self.counters.try_locks.fetch_add(1, Ordering::SeqCst);
        self.attempts += 1;

        if self.held || self.attempts <= self.busy_attempts {
            return Err(LockWriteError::Busy {
                path: lock_path_for(&self.path),
                holder: None,
            });
        }
        self.held = true;
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        self.counters.unlocks.fetch_add(1, Ordering::SeqCst);

        if !self.held {
            return Ok(());
        }
        self.held = false;

        if self.fail_unlock {
            return Err(LockWriteError::Unlock {
                path: lock_path_for(&self.path),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        Ok(())
    }
}

/// Provider of [`CountingLock`]s sharing one [`Counters`].
#[derive(Debug, Clone, Default)]
pub(crate) struct CountingLocks {
    pub(crate) counters: Arc<Counters>,
    pub(crate) busy_attempts: u32,
    pub(crate) fail_unlock: bool,
}

impl CountingLocks {
    pub(crate) fn always_busy() -> Self {
        Self {
            busy_attempts: u32::MAX,
            ..Self::default()
        }
    }
}

impl LockProvider for CountingLocks {
    type Lock = CountingLock;

    fn new_lock(&self, path: &Path) -> CountingLock {
        CountingLock {
            path: path.to_path_buf(),
            counters: Arc::clone(&self.counters),
            busy_attempts: self.busy_attempts,
            fail_unlock: self.fail_unlock,
            attempts: 0,
            held: false,
        }
    }
}

/// Real writer that tracks how many writes are in flight at once.
#[derive(Debug, Default)]
pub(crate) struct RecordingWriter {
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: AtomicUsize,
    /// Time spent inside each write, to widen any overlap window.
    pub(crate) hold: Duration,
}

impl RecordingWriter {
    pub(crate) fn holding_for(hold: Duration) -> Self {
        Self {
            hold,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl RawWrite for RecordingWriter {
    fn write(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        std::thread::sleep(self.hold);
        let result = FsWriter.write(path, data, mode);

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Writer that always fails as if the disk were full.
#[derive(Debug, Default)]
pub(crate) struct FailingWriter {
    calls: AtomicUsize,
}

impl FailingWriter {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RawWrite for FailingWriter {
    fn write(&self, _path: &Path, _data: &[u8], _mode: u32) -> io::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::other("no space left on device"))
    }
}
