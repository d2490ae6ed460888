//! Kernel advisory locks (`flock`) on a sidecar file.

use super::{Lock, lock_path_for};
use crate::error::{LockWriteError, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Exclusive `flock` on `<target>.lock`.
///
/// The kernel ties the lock to the open file, so it disappears when the holder
/// exits, even without an unlock. The sidecar file is created on first use and
/// never removed: deleting it while another process has it open would let two
/// holders lock different inodes under the same name.
#[derive(Debug)]
pub struct FlockLock {
    target: PathBuf,
    lock_path: PathBuf,
    file: Option<File>,
}

impl FlockLock {
    /// Lock handle for `target`. Nothing touches the filesystem yet.
    pub fn new<P: AsRef<Path>>(target: P) -> Self {
        let target = target.as_ref().to_path_buf();
        Self {
            lock_path: lock_path_for(&target),
            target,
            file: None,
        }
    }

    /// Path of the sidecar lock file.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Whether this handle currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

impl Lock for FlockLock {
    fn path(&self) -> &Path {
        &self.target
    }

    fn try_lock(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Err(LockWriteError::Busy {
                path: self.lock_path.clone(),
                holder: None,
            });
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| LockWriteError::Lock {
                path: self.lock_path.clone(),
                source: e,
            })?;

        file.try_lock_exclusive().map_err(|e| {
            if is_contended(&e) {
                LockWriteError::Busy {
                    path: self.lock_path.clone(),
                    holder: None,
                }
            } else {
                LockWriteError::Lock {
                    path: self.lock_path.clone(),
                    source: e,
                }
            }
        })?;

        self.file = Some(file);
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };

        FileExt::unlock(&file).map_err(|e| LockWriteError::Unlock {
            path: self.lock_path.clone(),
            source: e,
        })
    }
}
