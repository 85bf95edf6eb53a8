use crossbeam_utils::atomic::AtomicCell;
use glam::{Quat, Vec3};
use std::sync::{Arc, Weak};
use tracing::{debug, error, trace};

use crate::config::BodyConfig;
use crate::error::BodyError;
use crate::physics::body_properties::RigidPose;
use crate::physics::callback_bridge::{CallbackBridge, IBodyCallbacks};
use crate::physics::engine::{BodyTag, EngineBodyHandle, IPhysicsWorld, ShapeHandle};
use crate::physics::force_accumulator::ForceAccumulators;
use crate::physics::pose_buffer::InterpolatedTransform;
use crate::utilities::matrix::Matrix;

/// User handler invoked when a body touches another. The body does not own it.
pub type OnCollisionCallback = fn(body: EngineBodyHandle, other: EngineBodyHandle);

/// Which capabilities a body has beyond carrying a renderable pose.
pub enum BodyKind {
    /// Simulated body; collects external force and torque every step.
    Dynamic(ForceAccumulators),
    /// Moved by the caller; has no force accumulators at all.
    Kinematic,
}

/// A simulated rigid body seen from the consumer side of the physics step.
///
/// Owns its engine body, keeps the two most recent step poses for interpolation, and receives the
/// engine's per-step callbacks through a [`CallbackBridge`]. Bodies are shared as `Arc<Body>`
/// between the physics-step thread and any number of reader threads.
pub struct Body {
    handle: AtomicCell<Option<EngineBodyHandle>>,
    tag: BodyTag,
    bridge: Arc<CallbackBridge>,
    transform: InterpolatedTransform,
    kind: BodyKind,
    collision_callback: AtomicCell<Option<OnCollisionCallback>>,
}

impl Body {
    /// Creates a dynamic body with the given shape, initial pose and mass.
    pub fn create_dynamic(
        bridge: &Arc<CallbackBridge>,
        shape: ShapeHandle,
        pose: RigidPose,
        mass: f32,
        config: &BodyConfig,
    ) -> Result<Arc<Body>, BodyError> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(BodyError::InvalidMass(mass));
        }
        let world = bridge.world();
        let handle = world
            .create_dynamic_body(shape, &pose.to_matrix())
            .ok_or(BodyError::CreationFailed)?;
        world.set_mass_properties(handle, mass);
        let body = Self::attach(bridge, handle, pose, BodyKind::Dynamic(ForceAccumulators::new()), config);
        debug!(%handle, tag = %body.tag, %shape, mass, "created dynamic body");
        Ok(body)
    }

    /// Creates a kinematic body with the given shape and initial pose.
    pub fn create_kinematic(
        bridge: &Arc<CallbackBridge>,
        shape: ShapeHandle,
        pose: RigidPose,
        config: &BodyConfig,
    ) -> Result<Arc<Body>, BodyError> {
        let handle = bridge
            .world()
            .create_kinematic_body(shape, &pose.to_matrix())
            .ok_or(BodyError::CreationFailed)?;
        let body = Self::attach(bridge, handle, pose, BodyKind::Kinematic, config);
        debug!(%handle, tag = %body.tag, %shape, "created kinematic body");
        Ok(body)
    }

    fn attach(
        bridge: &Arc<CallbackBridge>,
        handle: EngineBodyHandle,
        pose: RigidPose,
        kind: BodyKind,
        config: &BodyConfig,
    ) -> Arc<Body> {
        let body = Arc::new_cyclic(|me: &Weak<Body>| {
            let owner: Weak<dyn IBodyCallbacks> = me.clone();
            Body {
                handle: AtomicCell::new(Some(handle)),
                tag: bridge.register(owner),
                bridge: bridge.clone(),
                transform: InterpolatedTransform::new(pose, config.spin),
                kind,
                collision_callback: AtomicCell::new(None),
            }
        });
        bridge.world().set_user_data(handle, body.tag);
        body
    }

    #[inline(always)]
    fn world(&self) -> &Arc<dyn IPhysicsWorld> {
        self.bridge.world()
    }

    #[inline(always)]
    fn live_handle(&self) -> Result<EngineBodyHandle, BodyError> {
        self.handle.load().ok_or(BodyError::Destroyed)
    }

    /// The engine body, or `None` once destroyed.
    #[inline(always)]
    pub fn engine_handle(&self) -> Option<EngineBodyHandle> {
        self.handle.load()
    }

    #[inline(always)]
    pub fn tag(&self) -> BodyTag {
        self.tag
    }

    #[inline(always)]
    pub fn kind(&self) -> &BodyKind {
        &self.kind
    }

    #[inline(always)]
    pub fn is_dynamic(&self) -> bool {
        matches!(self.kind, BodyKind::Dynamic(_))
    }

    #[inline(always)]
    pub fn is_destroyed(&self) -> bool {
        self.handle.load().is_none()
    }

    pub fn set_callbacks(&self, collision_callback: Option<OnCollisionCallback>) {
        self.collision_callback.store(collision_callback);
    }

    /// Stores a new step pose. Normally driven by the engine's transform callback.
    pub fn set_pose(&self, position: Vec3, orientation: Quat) {
        self.transform.set_pose(position, orientation);
    }

    pub fn interpolated_position(&self, fraction: f32) -> Vec3 {
        self.transform.interpolated_position(fraction)
    }

    pub fn interpolated_orientation(&self, fraction: f32) -> Quat {
        self.transform.interpolated_orientation(fraction)
    }

    /// Blends position and orientation under a single lock acquisition.
    pub fn interpolated_pose(&self, fraction: f32) -> RigidPose {
        self.transform.interpolated_pose(fraction)
    }

    /// Position blended with the world's current interpolation fraction.
    pub fn position(&self) -> Vec3 {
        self.interpolated_position(self.world().interpolation_fraction())
    }

    /// Orientation blended with the world's current interpolation fraction.
    pub fn orientation(&self) -> Quat {
        self.interpolated_orientation(self.world().interpolation_fraction())
    }

    /// Result of the most recent blend.
    pub fn last_interpolated(&self) -> RigidPose {
        self.transform.last_interpolated()
    }

    /// The `(previous, latest)` step poses.
    pub fn pose_pair(&self) -> (RigidPose, RigidPose) {
        self.transform.pose_pair()
    }

    /// The force and torque accumulators, if this body has them.
    #[inline(always)]
    pub fn forces(&self) -> Option<&ForceAccumulators> {
        match &self.kind {
            BodyKind::Dynamic(forces) => Some(forces),
            BodyKind::Kinematic => None,
        }
    }

    /// Starts a new accumulation step: force becomes the body's weight and torque becomes zero.
    pub fn init_force_accumulators(&self) -> Result<(), BodyError> {
        let forces = self.forces().ok_or(BodyError::NotDynamic("init_force_accumulators"))?;
        let handle = self.live_handle()?;
        let world = self.world();
        let mass = world.mass_properties(handle).mass;
        forces.reset(world.gravity(), mass);
        Ok(())
    }

    pub fn add_force(&self, force: Vec3) -> Result<(), BodyError> {
        let forces = self.forces().ok_or(BodyError::NotDynamic("add_force"))?;
        forces.add_force(force);
        Ok(())
    }

    pub fn add_torque(&self, torque: Vec3) -> Result<(), BodyError> {
        let forces = self.forces().ok_or(BodyError::NotDynamic("add_torque"))?;
        forces.add_torque(torque);
        Ok(())
    }

    pub fn sleep_state(&self) -> Result<bool, BodyError> {
        Ok(self.world().sleep_state(self.live_handle()?))
    }

    pub fn set_sleep_state(&self, sleeping: bool) -> Result<(), BodyError> {
        self.world().set_sleep_state(self.live_handle()?, sleeping);
        Ok(())
    }

    /// Releases the engine body. Idempotent: only the first call reaches the engine.
    ///
    /// The destructor callback is detached and the bridge entry removed before the engine body
    /// is released, so no callback can arrive for a half-destroyed body.
    pub fn destroy(&self) {
        if let Some(handle) = self.handle.swap(None) {
            let world = self.world();
            world.clear_destructor_callback(handle);
            self.bridge.unregister(self.tag);
            world.destroy_body(handle);
            debug!(%handle, tag = %self.tag, "destroyed body");
        }
    }
}

impl IBodyCallbacks for Body {
    fn on_transform_update(&self, matrix: &[f32; 16], thread_index: i32) {
        let matrix = Matrix::from_raw(matrix);
        debug_assert!(matrix.is_finite(), "engine handed over a malformed pose matrix");
        debug_assert!(!self.is_destroyed(), "transform callback for a destroyed body");
        let pose = RigidPose::from_matrix(&matrix);
        trace!(tag = %self.tag, thread_index, %pose, "transform update");
        self.transform.set_pose(pose.position, pose.orientation);
    }

    fn on_force_and_torque_request(&self, timestep: f32, thread_index: i32) {
        let BodyKind::Dynamic(forces) = &self.kind else {
            return;
        };
        let handle = self.handle.load();
        debug_assert!(handle.is_some(), "force callback for a destroyed body");
        let Some(handle) = handle else {
            return;
        };
        let (force, torque) = forces.flush();
        trace!(%handle, timestep, thread_index, ?force, ?torque, "applying external force");
        let world = self.world();
        world.set_force(handle, force);
        world.set_torque(handle, torque);
    }

    fn on_destroy(&self) {
        // Destruction always goes through `destroy`, which detaches this callback first.
        error!(tag = %self.tag, handle = ?self.handle.load(), "engine-initiated body destruction");
        #[cfg(debug_assertions)]
        panic!("engine-initiated destruction of a wrapped body");
    }

    fn on_collision(&self, other: EngineBodyHandle) {
        if let (Some(callback), Some(handle)) = (self.collision_callback.load(), self.handle.load()) {
            callback(handle, other);
        }
    }
}

impl Drop for Body {
    fn drop(&mut self) {
        self.destroy();
    }
}
