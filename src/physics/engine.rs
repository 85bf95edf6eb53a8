use glam::Vec3;

use crate::utilities::matrix::Matrix;

/// Opaque reference to a rigid body owned by the physics engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct EngineBodyHandle(pub u64);

/// Opaque reference to a collision shape owned by the physics engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShapeHandle(pub u64);

/// Identity tag stored in an engine body's user-data slot and handed back on every callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BodyTag(pub u64);

impl std::fmt::Display for EngineBodyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "EngineBodyHandle<{}>", self.0)
    }
}

impl std::fmt::Display for ShapeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ShapeHandle<{}>", self.0)
    }
}

impl std::fmt::Display for BodyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "BodyTag<{}>", self.0)
    }
}

/// Mass and principal moments of inertia reported by the engine for a body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MassProperties {
    pub mass: f32,
    pub ixx: f32,
    pub iyy: f32,
    pub izz: f32,
}

/// The slice of the physics engine and its world that bodies depend on.
///
/// Implementations wrap whatever engine actually steps the simulation. They are expected to route
/// the engine's per-body transform, force/torque and destructor callbacks into a
/// [`crate::physics::callback_bridge::CallbackBridge`], which finds the owning body through the
/// tag stored with [`IPhysicsWorld::set_user_data`].
///
/// All methods may be called from the physics-step thread and from consumer threads.
pub trait IPhysicsWorld: Send + Sync {
    /// Creates a dynamic body for the given shape at the given pose.
    /// Shape reference counting after creation is the world's responsibility.
    fn create_dynamic_body(&self, shape: ShapeHandle, matrix: &Matrix) -> Option<EngineBodyHandle>;

    /// Creates a kinematic body for the given shape at the given pose.
    fn create_kinematic_body(&self, shape: ShapeHandle, matrix: &Matrix) -> Option<EngineBodyHandle>;

    /// Sets the body's mass, deriving its inertia from its collision shape.
    fn set_mass_properties(&self, body: EngineBodyHandle, mass: f32);

    fn mass_properties(&self, body: EngineBodyHandle) -> MassProperties;

    /// Overwrites the force the engine applies to the body during the current step.
    fn set_force(&self, body: EngineBodyHandle, force: Vec3);

    /// Overwrites the torque the engine applies to the body during the current step.
    fn set_torque(&self, body: EngineBodyHandle, torque: Vec3);

    fn set_user_data(&self, body: EngineBodyHandle, tag: BodyTag);

    fn user_data(&self, body: EngineBodyHandle) -> Option<BodyTag>;

    /// Unregisters the destructor callback so the engine cannot call back into a body mid-teardown.
    fn clear_destructor_callback(&self, body: EngineBodyHandle);

    /// Releases the engine body. Called at most once per handle.
    fn destroy_body(&self, body: EngineBodyHandle);

    fn gravity(&self) -> Vec3;

    /// Real time elapsed since the last completed step divided by the step duration, in [0, 1].
    fn interpolation_fraction(&self) -> f32;

    fn sleep_state(&self, body: EngineBodyHandle) -> bool;

    fn set_sleep_state(&self, body: EngineBodyHandle, sleeping: bool);
}
