use serde::Deserialize;
use std::time::Duration;

use crate::error::ConfigError;

/// What a [`crate::physics::spin_lock::SpinLock`] does once its attempt bound is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum EscalationPolicy {
    /// Keep retrying, sleeping between attempts. Exclusion is preserved; the waiter stops burning the core.
    Sleep { interval_micros: u64 },
    /// Treat exhaustion as a fatal contract violation.
    Panic,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        EscalationPolicy::Sleep { interval_micros: 50 }
    }
}

impl EscalationPolicy {
    pub(crate) fn sleep_interval(&self) -> Option<Duration> {
        match *self {
            EscalationPolicy::Sleep { interval_micros } => Some(Duration::from_micros(interval_micros)),
            EscalationPolicy::Panic => None,
        }
    }
}

/// Bounded-retry policy for the pose lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpinPolicy {
    /// Number of compare/exchange attempts before escalating.
    pub max_attempts: u32,
    /// Attempts that busy-spin before each retry starts yielding the timeslice.
    pub yield_threshold: u32,
    pub escalation: EscalationPolicy,
}

impl SpinPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 32 * 1024;
    pub const DEFAULT_YIELD_THRESHOLD: u32 = 3;

    /// Checks the policy for values that would make the lock unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroSpinBound);
        }
        if let EscalationPolicy::Sleep { interval_micros: 0 } = self.escalation {
            return Err(ConfigError::ZeroSleepInterval);
        }
        Ok(())
    }
}

impl Default for SpinPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            yield_threshold: Self::DEFAULT_YIELD_THRESHOLD,
            escalation: EscalationPolicy::default(),
        }
    }
}

/// Per-body settings shared by every body a world layer creates.
///
/// ```toml
/// [spin]
/// max_attempts = 4096
/// escalation = { mode = "sleep", interval_micros = 20 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub spin: SpinPolicy,
}

impl BodyConfig {
    /// Parses and validates a configuration from TOML text. Missing keys fall back to defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: BodyConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spin.validate()
    }
}
