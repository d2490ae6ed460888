//! Exclusive-create sidecar lock files.

use super::{Lock, LockMetadata, Sidecar, WRITE_ACTION, lock_path_for};
use crate::error::{LockWriteError, Result};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Lock held by the existence of `<target>.lock`.
///
/// The sidecar is created with **create_new** semantics, so only one handle on
/// the machine can create it, and it carries JSON [`LockMetadata`] describing
/// the holder. Unlock deletes the sidecar, but only while it still carries
/// the record this handle wrote; a path that is occupied by anything else is
/// never removed.
#[derive(Debug)]
pub struct LockFile {
    target: PathBuf,
    lock_path: PathBuf,
    action: String,
    stale_minutes: Option<u32>,
    held: Option<LockMetadata>,
}

impl LockFile {
    /// Lock handle for `target`. Nothing touches the filesystem yet.
    pub fn new<P: AsRef<Path>>(target: P) -> Self {
        let target = target.as_ref().to_path_buf();
        Self {
            lock_path: lock_path_for(&target),
            target,
            action: WRITE_ACTION.to_string(),
            stale_minutes: None,
            held: None,
        }
    }

    /// Record `action` in the lock metadata instead of the default.
    pub fn with_action(mut self, action: &str) -> Self {
        self.action = action.to_string();
        self
    }

    /// Warn when a contending holder is older than `minutes`.
    pub fn with_stale_minutes(mut self, minutes: u32) -> Self {
        self.stale_minutes = Some(minutes);
        self
    }

    /// Path of the sidecar lock file.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Whether this handle currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }

    /// Error for a sidecar path that already exists.
    fn occupied(&self) -> LockWriteError {
        // The holder may be mid-write or already gone; metadata is best-effort.
        let holder = match LockMetadata::inspect(&self.lock_path) {
            Ok(Sidecar::Held(meta)) => Some(meta),
            Ok(Sidecar::Foreign) => {
                return LockWriteError::Foreign {
                    path: self.lock_path.clone(),
                };
            }
            Ok(Sidecar::Incomplete) | Err(_) => None,
        };

        if let (Some(meta), Some(minutes)) = (&holder, self.stale_minutes)
            && meta.is_stale(minutes)
        {
            warn!(
                lock = %self.lock_path.display(),
                owner = %meta.owner,
                age = %meta.age_string(),
                "lock looks stale; remove it manually if its holder is gone"
            );
        }

        LockWriteError::Busy {
            path: self.lock_path.clone(),
            holder,
        }
    }

    fn write_metadata(&self, file: &mut fs::File, meta: &LockMetadata) -> io::Result<()> {
        let json = meta.to_json()?;
        file.write_all(json.as_bytes())
    }

    /// Check that the sidecar is still the one `ours` was written to.
    fn verify_owned(&self, ours: &LockMetadata) -> io::Result<()> {
        match LockMetadata::inspect(&self.lock_path)? {
            Sidecar::Held(found) if found.same_acquisition(ours) => Ok(()),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "lock file was replaced by another writer; leaving it in place",
            )),
        }
    }
}

impl Lock for LockFile {
    fn path(&self) -> &Path {
        &self.target
    }

    fn try_lock(&mut self) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    self.occupied()
                } else {
                    LockWriteError::Lock {
                        path: self.lock_path.clone(),
                        source: e,
                    }
                }
            })?;

        let meta = LockMetadata::new(&self.action);
        if let Err(e) = self.write_metadata(&mut file, &meta) {
            // Clean up the lock file on write failure
            drop(file);
            let _ = fs::remove_file(&self.lock_path);
            return Err(LockWriteError::Lock {
                path: self.lock_path.clone(),
                source: e,
            });
        }

        self.held = Some(meta);
        Ok(())
    }

    fn unlock(&mut self) -> Result<()> {
        let Some(ours) = self.held.take() else {
            return Ok(());
        };

        self.verify_owned(&ours)
            .and_then(|()| fs::remove_file(&self.lock_path))
            .map_err(|e| LockWriteError::Unlock {
                path: self.lock_path.clone(),
                source: e,
            })
    }
}
