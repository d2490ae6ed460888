//! lockwrite: write files under an advisory lock.
//!
//! Concurrent writers to the same path, in this process or in others on the
//! same machine, are serialized through a path-keyed advisory lock. The lock is
//! acquired with a non-blocking try-lock retried under exponential backoff
//! until a deadline, and released on every exit path.
//!
//! ```no_run
//! lockwrite::write_file("/tmp/x", b"hello", 0o644)?;
//! # Ok::<(), lockwrite::error::LockWriteError>(())
//! ```

pub mod config;
pub mod error;
pub mod fs;
pub mod locks;
pub mod retry;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::WriteConfig;
pub use error::{LockWriteError, Result};
pub use writer::{LockedWriter, write_file};
