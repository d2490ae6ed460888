//! Config loading, validation, and conversion operations.

use super::model::WriteConfig;
use crate::error::{LockWriteError, Result};
use crate::locks::FileLocks;
use crate::retry::RetryPolicy;
use std::path::Path;
use std::time::Duration;

impl WriteConfig {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML file
    ///
    /// # Returns
    ///
    /// * `Ok(WriteConfig)` - Successfully loaded and validated config
    /// * `Err(LockWriteError::Config)` - Read or parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LockWriteError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // Empty document: all defaults.
        let config: WriteConfig = if yaml.trim().is_empty() {
            WriteConfig::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| LockWriteError::Config(format!("failed to parse config YAML: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            LockWriteError::Config(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `initial_interval_ms` must be positive
    /// - `multiplier` must be finite and at least 1.0
    /// - `max_interval_ms` must not be below `initial_interval_ms`
    /// - `max_attempts`, when set, must be positive
    /// - `lock_stale_minutes` must be positive
    pub fn validate(&self) -> Result<()> {
        if self.initial_interval_ms == 0 {
            return Err(invalid("initial_interval_ms must be greater than 0"));
        }

        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(LockWriteError::Config(format!(
                "config validation failed: multiplier must be a finite number >= 1.0 (found {})",
                self.multiplier
            )));
        }

        if self.max_interval_ms < self.initial_interval_ms {
            return Err(LockWriteError::Config(format!(
                "config validation failed: max_interval_ms ({}) must be at least initial_interval_ms ({})",
                self.max_interval_ms, self.initial_interval_ms
            )));
        }

        if self.max_attempts == Some(0) {
            return Err(invalid("max_attempts must be greater than 0 when set"));
        }

        if self.lock_stale_minutes == 0 {
            return Err(invalid("lock_stale_minutes must be greater than 0"));
        }

        Ok(())
    }

    /// The retry schedule described by this config.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            initial_interval: Duration::from_millis(self.initial_interval_ms),
            deadline: Duration::from_millis(self.deadline_ms),
            multiplier: self.multiplier,
            max_interval: Duration::from_millis(self.max_interval_ms),
            max_attempts: self.max_attempts,
        }
    }

    /// The lock provider described by this config.
    pub fn lock_provider(&self) -> FileLocks {
        FileLocks {
            backend: self.lock_backend,
            lock_stale_minutes: self.lock_stale_minutes,
        }
    }
}

fn invalid(reason: &str) -> LockWriteError {
    LockWriteError::Config(format!("config validation failed: {}", reason))
}
