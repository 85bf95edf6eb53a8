//! Interpolated rigid bodies sitting between a physics-step thread and render/query threads.
//!
//! The physics engine pushes one pose per step into each [`Body`] and pulls the body's
//! accumulated external force and torque; readers blend the last two step poses with the
//! world's interpolation fraction. The engine itself is abstracted by [`IPhysicsWorld`] and its
//! callbacks are routed to bodies by a [`CallbackBridge`].

pub mod config;
pub mod error;
pub mod physics;
pub mod utilities;

pub use config::{BodyConfig, EscalationPolicy, SpinPolicy};
pub use error::{BodyError, ConfigError};
pub use physics::body::{Body, BodyKind, OnCollisionCallback};
pub use physics::body_properties::RigidPose;
pub use physics::callback_bridge::{CallbackBridge, IBodyCallbacks};
pub use physics::engine::{BodyTag, EngineBodyHandle, IPhysicsWorld, MassProperties, ShapeHandle};
pub use physics::force_accumulator::{AccumulatorPhase, ForceAccumulators};
