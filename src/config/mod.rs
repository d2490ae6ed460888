//! Configuration model for lockwrite.
//!
//! This module defines the [`WriteConfig`] struct that tunes locked writes:
//! the retry schedule and the lock backend. It supports forward-compatible
//! YAML parsing (unknown fields are ignored), defaults for every field, and
//! validation of config values.

mod model;
mod operations;


// Re-export public API
pub use crate::locks::LockBackend;
pub use model::WriteConfig;
