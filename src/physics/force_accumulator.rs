use crossbeam_utils::atomic::AtomicCell;
use glam::Vec3;
use tracing::trace;

/// Where a dynamic body's accumulators are within the current physics step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorPhase {
    /// No step has started accumulating yet.
    Idle,
    /// Reset for the current step; forces and torques may be added.
    Accumulating,
    /// Handed to the engine by the force/torque callback.
    Flushed,
}

/// External force and torque totals of a dynamic body for one physics step.
///
/// Not lock-protected. Callers keep a single writer per step and never add while the physics
/// thread is flushing. An add is a separate load and store, so a violation can lose an update,
/// but the cells keep it free of undefined behaviour.
pub struct ForceAccumulators {
    force: AtomicCell<Vec3>,
    torque: AtomicCell<Vec3>,
    phase: AtomicCell<AccumulatorPhase>,
}

impl Default for ForceAccumulators {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceAccumulators {
    pub fn new() -> Self {
        Self {
            force: AtomicCell::new(Vec3::ZERO),
            torque: AtomicCell::new(Vec3::ZERO),
            phase: AtomicCell::new(AccumulatorPhase::Idle),
        }
    }

    /// Starts a new step: force becomes `gravity * mass` and torque becomes zero, whatever was accumulated before.
    #[inline(always)]
    pub fn reset(&self, gravity: Vec3, mass: f32) {
        self.force.store(gravity * mass);
        self.torque.store(Vec3::ZERO);
        self.phase.store(AccumulatorPhase::Accumulating);
    }

    #[inline(always)]
    pub fn add_force(&self, force: Vec3) {
        self.warn_if_flushed("force");
        self.force.store(self.force.load() + force);
    }

    #[inline(always)]
    pub fn add_torque(&self, torque: Vec3) {
        self.warn_if_flushed("torque");
        self.torque.store(self.torque.load() + torque);
    }

    /// Reads the totals for the engine and marks the step as flushed. The totals are left in place.
    #[inline(always)]
    pub fn flush(&self) -> (Vec3, Vec3) {
        self.phase.store(AccumulatorPhase::Flushed);
        (self.force.load(), self.torque.load())
    }

    #[inline(always)]
    pub fn force(&self) -> Vec3 {
        self.force.load()
    }

    #[inline(always)]
    pub fn torque(&self) -> Vec3 {
        self.torque.load()
    }

    #[inline(always)]
    pub fn phase(&self) -> AccumulatorPhase {
        self.phase.load()
    }

    #[inline(always)]
    fn warn_if_flushed(&self, what: &'static str) {
        if self.phase.load() == AccumulatorPhase::Flushed {
            trace!(what, "accumulating after flush; the next reset discards it");
        }
    }
}
