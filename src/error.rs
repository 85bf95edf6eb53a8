use crate::physics::engine::{BodyTag, EngineBodyHandle};
use thiserror::Error;

/// Failures surfaced by body creation, lookup and configuration.
///
/// Contract violations from the engine side (malformed pose matrices, engine-initiated destruction)
/// are not represented here; those are checked with debug assertions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BodyError {
    #[error("the physics engine refused to create a body")]
    CreationFailed,
    #[error("invalid body mass {0}: mass must be finite and non-negative")]
    InvalidMass(f32),
    #[error("no live body is registered for engine handle {0}")]
    UnknownBody(EngineBodyHandle),
    #[error("identity tag {0} does not belong to a live body")]
    StaleTag(BodyTag),
    #[error("the body has already been destroyed")]
    Destroyed,
    #[error("operation `{0}` requires a dynamic body")]
    NotDynamic(&'static str),
}

/// Failures produced while loading or validating a [`crate::config::BodyConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("spin lock attempt bound must be at least 1")]
    ZeroSpinBound,
    #[error("sleep escalation interval must be at least 1 microsecond")]
    ZeroSleepInterval,
    #[error("failed to parse body configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
