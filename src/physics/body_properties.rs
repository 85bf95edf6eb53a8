use glam::{Quat, Vec3};
use std::fmt;

use crate::utilities::matrix::Matrix;
use crate::utilities::quaternion_ex;

/// Represents a rigid transformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidPose {
    /// Orientation of the pose.
    pub orientation: Quat,
    /// Position of the pose.
    pub position: Vec3,
}

impl Default for RigidPose {
    #[inline(always)]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RigidPose {
    /// Returns a pose with a position at (0,0,0) and identity orientation.
    pub const IDENTITY: Self = Self {
        orientation: Quat::IDENTITY,
        position: Vec3::ZERO,
    };

    /// Creates a rigid pose with the given position and orientation.
    #[inline(always)]
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Creates a rigid pose with the given position and identity orientation.
    #[inline(always)]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Decodes a pose from a rigid row-vector matrix: translation from the last row, orientation from the upper 3x3.
    #[inline(always)]
    pub fn from_matrix(matrix: &Matrix) -> Self {
        Self {
            position: matrix.get_translation(),
            orientation: quaternion_ex::create_from_rotation_matrix(matrix),
        }
    }

    /// Builds the rigid row-vector matrix the engine expects for this pose.
    #[inline(always)]
    pub fn to_matrix(&self) -> Matrix {
        Matrix::create_rigid_from_quat(&self.orientation, &self.position)
    }
}

impl From<Vec3> for RigidPose {
    fn from(position: Vec3) -> Self {
        Self::from_position(position)
    }
}

impl From<(Vec3, Quat)> for RigidPose {
    fn from((position, orientation): (Vec3, Quat)) -> Self {
        Self::new(position, orientation)
    }
}

impl fmt::Display for RigidPose {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}, {}", self.position, self.orientation)
    }
}
