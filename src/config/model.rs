//! WriteConfig struct definition and default implementation.

use crate::locks::LockBackend;
use serde::{Deserialize, Serialize};

/// Configuration for locked writes.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteConfig {
    // =========================================================================
    // Retry settings
    // =========================================================================
    /// Sleep after the first failed lock attempt, in milliseconds.
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,

    /// Total time allowed for acquiring the lock, in milliseconds.
    /// One attempt is always made, even with a deadline of 0.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// Growth factor for the backoff interval after each failed attempt.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Upper bound on a single backoff sleep, in milliseconds.
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Optional cap on lock attempts (unbounded when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Lock implementation guarding writes.
    #[serde(default)]
    pub lock_backend: LockBackend,

    /// Minutes after which a contending lock-file holder is reported as stale.
    #[serde(default = "default_lock_stale_minutes")]
    pub lock_stale_minutes: u32,
}

fn default_initial_interval_ms() -> u64 {
    500
}

fn default_deadline_ms() -> u64 {
    13_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_interval_ms() -> u64 {
    60_000
}

fn default_lock_stale_minutes() -> u32 {
    120
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            deadline_ms: default_deadline_ms(),
            multiplier: default_multiplier(),
            max_interval_ms: default_max_interval_ms(),
            max_attempts: None,
            lock_backend: LockBackend::default(),
            lock_stale_minutes: default_lock_stale_minutes(),
        }
    }
}
