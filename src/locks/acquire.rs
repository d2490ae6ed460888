//! Retrying lock acquisition.

use super::Lock;
use crate::error::{LockWriteError, Result};
use crate::retry::{self, Exhausted, RetryPolicy};
use tracing::warn;

/// Take `lock` with non-blocking attempts retried under `policy`.
///
/// The first attempt always runs. Every failed attempt is logged as a
/// temporary error; when the policy gives up, the last attempt's error is
/// wrapped in [`LockWriteError::Timeout`] together with the attempt count.
///
/// Errors that waiting cannot fix (see [`LockWriteError::is_retryable`]) end
/// the loop at once and are returned as they are.
pub fn acquire_with_retry<L: Lock>(lock: &mut L, policy: &RetryPolicy) -> Result<()> {
    let path = lock.path().to_path_buf();

    let attempt = || {
        lock.try_lock().inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "temporary error acquiring lock");
        })
    };

    retry::expo_if(policy, LockWriteError::is_retryable, attempt).map_err(
        |Exhausted {
             last_error,
             attempts,
             elapsed,
         }| {
            if !last_error.is_retryable() {
                return last_error;
            }
            LockWriteError::Timeout {
                path: path.clone(),
                attempts,
                elapsed,
                source: Box::new(last_error),
            }
        },
    )
}
