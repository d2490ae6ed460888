//! Raw file writes with permission bits.
//!
//! This is the unguarded primitive the locked writer orchestrates: open with
//! create-or-truncate semantics, apply `mode` if the file is created, write
//! every byte. No temp file, rename, or fsync.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// The raw write primitive.
pub trait RawWrite {
    /// Create or truncate `path` and write `data` to it.
    fn write(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()>;
}

/// Writes straight to the filesystem via [`write_with_mode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl RawWrite for FsWriter {
    fn write(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        write_with_mode(path, data, mode)
    }
}

/// Create or truncate `path`, then write `data`.
///
/// On Unix, `mode` is applied (subject to umask) only when the file is
/// created; an existing file keeps its permissions. Elsewhere it is ignored.
pub fn write_with_mode<P: AsRef<Path>>(path: P, data: &[u8], mode: u32) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options.open(path.as_ref())?;
    file.write_all(data)
}
