//! In-memory stand-in for the physics engine used by unit tests.

use crossbeam_utils::atomic::AtomicCell;
use glam::Vec3;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::physics::engine::{BodyTag, EngineBodyHandle, IPhysicsWorld, MassProperties, ShapeHandle};
use crate::utilities::matrix::Matrix;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EngineBody {
    pub shape: ShapeHandle,
    pub kinematic: bool,
    pub matrix: Matrix,
    pub mass: f32,
    pub force: Vec3,
    pub torque: Vec3,
    pub user_data: Option<BodyTag>,
    pub destructor_registered: bool,
    pub sleeping: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorldEvent {
    ClearDestructor(EngineBodyHandle),
    Destroy(EngineBodyHandle),
}

#[derive(Default)]
struct WorldState {
    next_handle: u64,
    bodies: HashMap<EngineBodyHandle, EngineBody>,
    events: Vec<WorldEvent>,
    refuse_creation: bool,
}

/// Records every call made by bodies so tests can assert on engine-side effects.
pub(crate) struct RecordingWorld {
    gravity: Vec3,
    fraction: AtomicCell<f32>,
    state: Mutex<WorldState>,
}

impl RecordingWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            fraction: AtomicCell::new(0.0),
            state: Mutex::new(WorldState::default()),
        }
    }

    pub fn set_interpolation_fraction(&self, fraction: f32) {
        self.fraction.store(fraction);
    }

    pub fn refuse_creation(&self) {
        self.state.lock().unwrap().refuse_creation = true;
    }

    pub fn body(&self, handle: EngineBodyHandle) -> Option<EngineBody> {
        self.state.lock().unwrap().bodies.get(&handle).cloned()
    }

    pub fn body_count(&self) -> usize {
        self.state.lock().unwrap().bodies.len()
    }

    pub fn events(&self) -> Vec<WorldEvent> {
        self.state.lock().unwrap().events.clone()
    }

    fn create(&self, shape: ShapeHandle, matrix: &Matrix, kinematic: bool) -> Option<EngineBodyHandle> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_creation {
            return None;
        }
        state.next_handle += 1;
        let handle = EngineBodyHandle(state.next_handle);
        state.bodies.insert(
            handle,
            EngineBody {
                shape,
                kinematic,
                matrix: *matrix,
                mass: 0.0,
                force: Vec3::ZERO,
                torque: Vec3::ZERO,
                user_data: None,
                destructor_registered: true,
                sleeping: false,
            },
        );
        Some(handle)
    }

    fn with_body<R>(&self, handle: EngineBodyHandle, f: impl FnOnce(&mut EngineBody) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        let body = state
            .bodies
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("{handle} used after release"));
        f(body)
    }
}

impl IPhysicsWorld for RecordingWorld {
    fn create_dynamic_body(&self, shape: ShapeHandle, matrix: &Matrix) -> Option<EngineBodyHandle> {
        self.create(shape, matrix, false)
    }

    fn create_kinematic_body(&self, shape: ShapeHandle, matrix: &Matrix) -> Option<EngineBodyHandle> {
        self.create(shape, matrix, true)
    }

    fn set_mass_properties(&self, body: EngineBodyHandle, mass: f32) {
        self.with_body(body, |b| b.mass = mass);
    }

    fn mass_properties(&self, body: EngineBodyHandle) -> MassProperties {
        self.with_body(body, |b| MassProperties {
            mass: b.mass,
            ixx: b.mass,
            iyy: b.mass,
            izz: b.mass,
        })
    }

    fn set_force(&self, body: EngineBodyHandle, force: Vec3) {
        self.with_body(body, |b| b.force = force);
    }

    fn set_torque(&self, body: EngineBodyHandle, torque: Vec3) {
        self.with_body(body, |b| b.torque = torque);
    }

    fn set_user_data(&self, body: EngineBodyHandle, tag: BodyTag) {
        self.with_body(body, |b| b.user_data = Some(tag));
    }

    fn user_data(&self, body: EngineBodyHandle) -> Option<BodyTag> {
        let state = self.state.lock().unwrap();
        state.bodies.get(&body).and_then(|b| b.user_data)
    }

    fn clear_destructor_callback(&self, body: EngineBodyHandle) {
        self.with_body(body, |b| b.destructor_registered = false);
        self.state.lock().unwrap().events.push(WorldEvent::ClearDestructor(body));
    }

    fn destroy_body(&self, body: EngineBodyHandle) {
        let mut state = self.state.lock().unwrap();
        let removed = state.bodies.remove(&body);
        assert!(removed.is_some(), "{body} released twice");
        state.events.push(WorldEvent::Destroy(body));
    }

    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn interpolation_fraction(&self) -> f32 {
        self.fraction.load()
    }

    fn sleep_state(&self, body: EngineBodyHandle) -> bool {
        self.with_body(body, |b| b.sleeping)
    }

    fn set_sleep_state(&self, body: EngineBodyHandle, sleeping: bool) {
        self.with_body(body, |b| b.sleeping = sleeping);
    }
}
