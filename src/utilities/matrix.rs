use crate::utilities::matrix3x3::Matrix3x3;
use glam::{Quat, Vec3, Vec4};

/// 4x4 pose matrix as handed across the engine boundary.
/// All functions assume row vectors: rows x, y and z hold the rotated basis and row w holds the translation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(C, align(16))]
pub struct Matrix {
    /// Row 1 of the matrix.
    pub x: Vec4,
    /// Row 2 of the matrix.
    pub y: Vec4,
    /// Row 3 of the matrix.
    pub z: Vec4,
    /// Row 4 of the matrix.
    pub w: Vec4,
}

impl Default for Matrix {
    #[inline(always)]
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    #[inline(always)]
    pub const fn identity() -> Self {
        Self {
            x: Vec4::new(1.0, 0.0, 0.0, 0.0),
            y: Vec4::new(0.0, 1.0, 0.0, 0.0),
            z: Vec4::new(0.0, 0.0, 1.0, 0.0),
            w: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }

    /// Reads a matrix from sixteen row-major floats, the layout the engine uses for body transforms.
    #[inline(always)]
    pub fn from_raw(raw: &[f32; 16]) -> Self {
        Self {
            x: Vec4::new(raw[0], raw[1], raw[2], raw[3]),
            y: Vec4::new(raw[4], raw[5], raw[6], raw[7]),
            z: Vec4::new(raw[8], raw[9], raw[10], raw[11]),
            w: Vec4::new(raw[12], raw[13], raw[14], raw[15]),
        }
    }

    /// Writes the matrix out as sixteen row-major floats.
    #[inline(always)]
    pub fn to_raw(&self) -> [f32; 16] {
        let mut raw = [0.0; 16];
        raw[0..4].copy_from_slice(&self.x.to_array());
        raw[4..8].copy_from_slice(&self.y.to_array());
        raw[8..12].copy_from_slice(&self.z.to_array());
        raw[12..16].copy_from_slice(&self.w.to_array());
        raw
    }

    /// Returns true if every component is finite.
    #[inline(always)]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    #[inline(always)]
    pub fn get_translation(&self) -> Vec3 {
        Vec3::new(self.w.x, self.w.y, self.w.z)
    }

    #[inline(always)]
    pub fn set_translation(&mut self, value: &Vec3) {
        self.w = Vec4::new(value.x, value.y, value.z, self.w.w);
    }

    /// Transforms a vector with a matrix. Implicitly uses 1 as the fourth component of the input vector.
    #[inline(always)]
    pub fn transform_vec3(v: Vec3, m: &Self, result: &mut Vec4) {
        let x = Vec4::splat(v.x);
        let y = Vec4::splat(v.y);
        let z = Vec4::splat(v.z);
        *result = m.x * x + m.y * y + m.z * z + m.w;
    }

    /// Creates a rigid world matrix from a rotation matrix and position.
    #[inline(always)]
    pub fn create_rigid(rotation: &Matrix3x3, position: &Vec3, world: &mut Self) {
        world.x = Vec4::new(rotation.x.x, rotation.x.y, rotation.x.z, 0.0);
        world.y = Vec4::new(rotation.y.x, rotation.y.y, rotation.y.z, 0.0);
        world.z = Vec4::new(rotation.z.x, rotation.z.y, rotation.z.z, 0.0);
        world.w = Vec4::new(position.x, position.y, position.z, 1.0);
    }

    /// Creates a rigid world matrix from a rotation quaternion and position.
    #[inline(always)]
    pub fn create_rigid_from_quat(rotation: &Quat, position: &Vec3) -> Self {
        let rotation_matrix = Matrix3x3::create_value_from_quaternion(rotation);
        let mut world = Self::identity();
        Self::create_rigid(&rotation_matrix, position, &mut world);
        world
    }
}
