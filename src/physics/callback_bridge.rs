use crossbeam_utils::sync::ShardedLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, Weak};
use tracing::{trace, warn};

use crate::error::BodyError;
use crate::physics::engine::{BodyTag, EngineBodyHandle, IPhysicsWorld};

/// Per-step callbacks the engine delivers to the owner of a body.
pub trait IBodyCallbacks: Send + Sync {
    /// Called once per step from the simulation thread with the body's new row-major pose matrix.
    fn on_transform_update(&self, matrix: &[f32; 16], thread_index: i32);

    /// Called once per step, before integration, to collect the external force and torque.
    fn on_force_and_torque_request(&self, timestep: f32, thread_index: i32);

    /// Called when the engine destroys the body on its own initiative.
    fn on_destroy(&self);

    /// Called when the body touches another body.
    fn on_collision(&self, other: EngineBodyHandle);
}

/// Routes engine callbacks, which only carry an engine body handle, to the instance that owns the body.
///
/// The engine keeps a [`BodyTag`] in each body's user-data slot; the bridge maps tags to weak
/// owner references. One bridge belongs to one world layer and lives exactly as long as that
/// layer keeps it; owners deregister themselves before their engine body is released.
pub struct CallbackBridge {
    world: Arc<dyn IPhysicsWorld>,
    owners: ShardedLock<HashMap<BodyTag, Weak<dyn IBodyCallbacks>>>,
    next_tag: AtomicU64,
}

impl CallbackBridge {
    pub fn new(world: Arc<dyn IPhysicsWorld>) -> Self {
        Self {
            world,
            owners: ShardedLock::new(HashMap::new()),
            next_tag: AtomicU64::new(1),
        }
    }

    #[inline(always)]
    pub fn world(&self) -> &Arc<dyn IPhysicsWorld> {
        &self.world
    }

    /// Records a new owner and returns the tag to store in its engine body's user-data slot.
    pub fn register(&self, owner: Weak<dyn IBodyCallbacks>) -> BodyTag {
        let tag = BodyTag(self.next_tag.fetch_add(1, Ordering::Relaxed));
        self.owners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tag, owner);
        tag
    }

    /// Forgets an owner. Returns false if the tag was not registered.
    pub fn unregister(&self, tag: BodyTag) -> bool {
        self.owners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&tag)
            .is_some()
    }

    /// Number of registered owners that are still alive.
    pub fn live_count(&self) -> usize {
        self.owners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|owner| owner.strong_count() > 0)
            .count()
    }

    /// Finds the live owner of an engine body.
    pub fn resolve(&self, body: EngineBodyHandle) -> Result<Arc<dyn IBodyCallbacks>, BodyError> {
        let tag = self.world.user_data(body).ok_or(BodyError::UnknownBody(body))?;
        // The read guard is released before the owner runs, so callbacks may register or unregister.
        let owner = self
            .owners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tag)
            .and_then(Weak::upgrade);
        owner.ok_or(BodyError::StaleTag(tag))
    }

    pub fn dispatch_transform(
        &self,
        body: EngineBodyHandle,
        matrix: &[f32; 16],
        thread_index: i32,
    ) -> Result<(), BodyError> {
        let owner = self.resolve_or_warn(body, "transform")?;
        owner.on_transform_update(matrix, thread_index);
        Ok(())
    }

    pub fn dispatch_force_and_torque(
        &self,
        body: EngineBodyHandle,
        timestep: f32,
        thread_index: i32,
    ) -> Result<(), BodyError> {
        let owner = self.resolve_or_warn(body, "force_and_torque")?;
        owner.on_force_and_torque_request(timestep, thread_index);
        Ok(())
    }

    pub fn dispatch_destroy(&self, body: EngineBodyHandle) -> Result<(), BodyError> {
        let owner = self.resolve_or_warn(body, "destroy")?;
        owner.on_destroy();
        Ok(())
    }

    pub fn dispatch_collision(
        &self,
        body: EngineBodyHandle,
        other: EngineBodyHandle,
    ) -> Result<(), BodyError> {
        let owner = self.resolve_or_warn(body, "collision")?;
        owner.on_collision(other);
        Ok(())
    }

    fn resolve_or_warn(
        &self,
        body: EngineBodyHandle,
        callback: &'static str,
    ) -> Result<Arc<dyn IBodyCallbacks>, BodyError> {
        trace!(%body, callback, "dispatching engine callback");
        self.resolve(body).inspect_err(|err| {
            warn!(%body, callback, error = %err, "engine callback for a body with no live owner");
        })
    }
}
