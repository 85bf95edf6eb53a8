use glam::{Quat, Vec3};

use crate::config::SpinPolicy;
use crate::physics::body_properties::RigidPose;
use crate::physics::spin_lock::SpinLock;
use crate::utilities::quaternion_ex;

/// The two most recent physics-step poses of a body plus the scratch slot for the last blend.
///
/// `pose1` is always the more recent pose; `pose0` only changes when a new `pose1` is pushed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseBuffer {
    pub pose0: RigidPose,
    pub pose1: RigidPose,
    pub interpolated: RigidPose,
}

impl PoseBuffer {
    /// All three slots start at the same pose so the first frame has nothing to blend.
    #[inline(always)]
    pub fn new(initial: RigidPose) -> Self {
        Self {
            pose0: initial,
            pose1: initial,
            interpolated: initial,
        }
    }

    /// Shifts `pose1` into `pose0` and stores the new pose, keeping the orientation pair on the short arc.
    #[inline(always)]
    pub fn push(&mut self, position: Vec3, orientation: Quat) {
        self.pose0 = self.pose1;
        let orientation = if quaternion_ex::dot(self.pose0.orientation, orientation) < 0.0 {
            quaternion_ex::negate(orientation)
        } else {
            orientation
        };
        self.pose1 = RigidPose::new(position, orientation);
    }

    /// Linear blend of the two positions. Exact at both ends of the range.
    #[inline(always)]
    pub fn blend_position(&mut self, fraction: f32) -> Vec3 {
        let position = self.pose0.position * (1.0 - fraction) + self.pose1.position * fraction;
        self.interpolated.position = position;
        position
    }

    /// Spherical blend of the two orientations.
    #[inline(always)]
    pub fn blend_orientation(&mut self, fraction: f32) -> Quat {
        let orientation = quaternion_ex::slerp(self.pose0.orientation, self.pose1.orientation, fraction);
        self.interpolated.orientation = orientation;
        orientation
    }

    #[inline(always)]
    pub fn blend(&mut self, fraction: f32) -> RigidPose {
        RigidPose::new(self.blend_position(fraction), self.blend_orientation(fraction))
    }
}

/// Lock-protected [`PoseBuffer`] shared between the physics-step thread (writer) and consumer threads (readers).
///
/// Position and orientation are always written and read together under one acquisition,
/// so a reader never observes a pose pair that mixes two different steps.
pub struct InterpolatedTransform {
    buffer: SpinLock<PoseBuffer>,
}

impl InterpolatedTransform {
    pub fn new(initial: RigidPose, policy: SpinPolicy) -> Self {
        Self {
            buffer: SpinLock::new(PoseBuffer::new(initial), policy),
        }
    }

    pub fn set_pose(&self, position: Vec3, orientation: Quat) {
        self.buffer.lock().push(position, orientation);
    }

    /// Blends the position of the last two steps. Fractions outside [0, 1] are clamped.
    pub fn interpolated_position(&self, fraction: f32) -> Vec3 {
        let fraction = clamp_fraction(fraction);
        self.buffer.lock().blend_position(fraction)
    }

    /// Blends the orientation of the last two steps. Fractions outside [0, 1] are clamped.
    pub fn interpolated_orientation(&self, fraction: f32) -> Quat {
        let fraction = clamp_fraction(fraction);
        self.buffer.lock().blend_orientation(fraction)
    }

    pub fn interpolated_pose(&self, fraction: f32) -> RigidPose {
        let fraction = clamp_fraction(fraction);
        self.buffer.lock().blend(fraction)
    }

    /// The result of the most recent blend.
    pub fn last_interpolated(&self) -> RigidPose {
        self.buffer.lock().interpolated
    }

    /// The `(previous, latest)` step poses.
    pub fn pose_pair(&self) -> (RigidPose, RigidPose) {
        let buffer = self.buffer.lock();
        (buffer.pose0, buffer.pose1)
    }
}

#[inline(always)]
fn clamp_fraction(fraction: f32) -> f32 {
    debug_assert!(!fraction.is_nan(), "interpolation fraction is NaN");
    fraction.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    fn pose(x: f32, y: f32, z: f32) -> RigidPose {
        RigidPose::from_position(Vec3::new(x, y, z))
    }

    #[test]
    fn initial_slots_are_identical() {
        let initial = RigidPose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_x(0.4));
        let transform = InterpolatedTransform::new(initial, SpinPolicy::default());
        assert_eq!(transform.pose_pair(), (initial, initial));
        assert_eq!(transform.last_interpolated(), initial);
        let blended = transform.interpolated_pose(0.7);
        assert_relative_eq!(blended.position.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(blended.position.y, 2.0, epsilon = 1e-6);
        assert_relative_eq!(blended.position.z, 3.0, epsilon = 1e-6);
        assert_eq!(blended.orientation, initial.orientation);
    }

    #[test]
    fn pushes_shift_latest_into_previous() {
        let initial = pose(0.0, 0.0, 0.0);
        let mut buffer = PoseBuffer::new(initial);
        let steps: Vec<RigidPose> = (1..=5).map(|i| pose(i as f32, 0.0, -(i as f32))).collect();
        let mut previous = initial;
        for step in &steps {
            buffer.push(step.position, step.orientation);
            assert_eq!(buffer.pose0, previous);
            assert_eq!(buffer.pose1, *step);
            previous = *step;
        }
    }

    #[test]
    fn antipodal_orientation_is_negated() {
        let mut buffer = PoseBuffer::new(RigidPose::new(Vec3::ZERO, Quat::from_rotation_y(0.2)));
        let incoming = quaternion_ex::negate(Quat::from_rotation_y(0.4));
        assert!(quaternion_ex::dot(buffer.pose1.orientation, incoming) < 0.0);
        buffer.push(Vec3::ONE, incoming);
        assert_eq!(buffer.pose1.orientation, quaternion_ex::negate(incoming));
        assert!(quaternion_ex::dot(buffer.pose0.orientation, buffer.pose1.orientation) >= 0.0);
    }

    #[test]
    fn same_hemisphere_orientation_is_kept() {
        let mut buffer = PoseBuffer::new(RigidPose::IDENTITY);
        let incoming = Quat::from_rotation_z(1.0);
        buffer.push(Vec3::ZERO, incoming);
        assert_eq!(buffer.pose1.orientation, incoming);
    }

    #[test]
    fn midpoint_of_one_step() {
        let transform = InterpolatedTransform::new(pose(0.0, 2.0, -4.0), SpinPolicy::default());
        transform.set_pose(Vec3::new(10.0, 4.0, 4.0), Quat::IDENTITY);
        let midpoint = transform.interpolated_position(0.5);
        assert_relative_eq!(midpoint.x, 5.0, epsilon = 1e-6);
        assert_relative_eq!(midpoint.y, 3.0, epsilon = 1e-6);
        assert_relative_eq!(midpoint.z, 0.0, epsilon = 1e-6);
        assert_eq!(transform.last_interpolated().position, midpoint);
    }

    #[test]
    fn orientation_blend_follows_the_short_arc() {
        let transform = InterpolatedTransform::new(
            RigidPose::new(Vec3::ZERO, Quat::from_rotation_x(0.0)),
            SpinPolicy::default(),
        );
        transform.set_pose(Vec3::ZERO, quaternion_ex::negate(Quat::from_rotation_x(1.0)));
        let halfway = transform.interpolated_orientation(0.5);
        assert_relative_eq!(
            quaternion_ex::dot(halfway, Quat::from_rotation_x(0.5)).abs(),
            1.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn tiny_rotation_still_blends() {
        let transform = InterpolatedTransform::new(RigidPose::IDENTITY, SpinPolicy::default());
        let latest = Quat::from_rotation_z(4e-4);
        transform.set_pose(Vec3::ZERO, latest);
        let (previous, stored) = transform.pose_pair();
        assert_eq!(transform.interpolated_orientation(0.0), previous.orientation);
        assert_eq!(transform.interpolated_orientation(1.0), stored.orientation);
        assert_eq!(stored.orientation, latest);
        let halfway = transform.interpolated_orientation(0.5);
        assert_relative_eq!(halfway.z, Quat::from_rotation_z(2e-4).z, epsilon = 1e-7);
        assert_eq!(transform.last_interpolated().orientation, halfway);
    }

    #[test]
    fn out_of_range_fractions_are_clamped() {
        let transform = InterpolatedTransform::new(pose(0.0, 0.0, 0.0), SpinPolicy::default());
        transform.set_pose(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY);
        assert_eq!(transform.interpolated_position(-1.0), Vec3::ZERO);
        assert_eq!(transform.interpolated_position(3.0), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn readers_never_see_a_torn_pose_pair() {
        // Each step encodes its index in both position.x and the rotation angle about z,
        // so a blend at fraction 1 must agree on the index across both fields.
        let transform = Arc::new(InterpolatedTransform::new(RigidPose::IDENTITY, SpinPolicy::default()));
        let angle_step = 0.001;
        let writer = {
            let transform = transform.clone();
            thread::spawn(move || {
                for i in 1..=2_000 {
                    let step = i as f32;
                    transform.set_pose(Vec3::new(step, 0.0, 0.0), Quat::from_rotation_z(step * angle_step));
                }
            })
        };
        let readers: Vec<_> = (0..3)
            .map(|_| {
                let transform = transform.clone();
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        let latest = transform.interpolated_pose(1.0);
                        let expected = Quat::from_rotation_z(latest.position.x * angle_step);
                        let agreement = quaternion_ex::dot(latest.orientation, expected).abs();
                        assert!(agreement > 1.0 - 1e-5, "torn pose {latest}");
                    }
                })
            })
            .collect();
        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }

    proptest! {
        #[test]
        fn blend_is_exact_at_both_ends(
            a in prop::array::uniform3(-1.0e4f32..1.0e4),
            b in prop::array::uniform3(-1.0e4f32..1.0e4),
        ) {
            let mut buffer = PoseBuffer::new(RigidPose::from_position(Vec3::from_array(a)));
            buffer.push(Vec3::from_array(b), Quat::IDENTITY);
            prop_assert_eq!(buffer.blend_position(0.0), Vec3::from_array(a));
            prop_assert_eq!(buffer.blend_position(1.0), Vec3::from_array(b));
        }

        #[test]
        fn orientation_blend_is_exact_at_both_ends(
            axis in prop::array::uniform3(-1.0f32..1.0),
            first in prop_oneof![-1.0e-3f32..1.0e-3, -3.0f32..3.0],
            second in prop_oneof![-1.0e-3f32..1.0e-3, -3.0f32..3.0],
            flip in any::<bool>(),
        ) {
            let axis = Vec3::from_array(axis).try_normalize().unwrap_or(Vec3::Y);
            let mut buffer = PoseBuffer::new(RigidPose::new(Vec3::ZERO, Quat::from_axis_angle(axis, first)));
            let incoming = Quat::from_axis_angle(axis, second);
            let incoming = if flip { quaternion_ex::negate(incoming) } else { incoming };
            buffer.push(Vec3::ZERO, incoming);
            prop_assert_eq!(buffer.blend_orientation(0.0), buffer.pose0.orientation);
            prop_assert_eq!(buffer.blend_orientation(1.0), buffer.pose1.orientation);
        }

        #[test]
        fn stored_pair_stays_in_one_hemisphere(
            first in -6.0f32..6.0,
            second in -6.0f32..6.0,
            flip in any::<bool>(),
        ) {
            let mut buffer = PoseBuffer::new(RigidPose::new(Vec3::ZERO, Quat::from_rotation_y(first)));
            let incoming = Quat::from_rotation_y(second);
            let incoming = if flip { quaternion_ex::negate(incoming) } else { incoming };
            buffer.push(Vec3::ZERO, incoming);
            prop_assert!(quaternion_ex::dot(buffer.pose0.orientation, buffer.pose1.orientation) >= 0.0);
        }
    }
}
