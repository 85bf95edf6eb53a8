use crate::utilities::matrix::Matrix;
use glam::{Quat, Vec3};

/// 3 row, 3 column matrix.
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(C, align(16))]
pub struct Matrix3x3 {
    /// First row of the matrix.
    pub x: Vec3,
    /// Second row of the matrix.
    pub y: Vec3,
    /// Third row of the matrix.
    pub z: Vec3,
}

impl Default for Matrix3x3 {
    #[inline(always)]
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix3x3 {
    /// Gets the 3x3 identity matrix.
    #[inline(always)]
    pub const fn identity() -> Self {
        Self {
            x: Vec3::new(1.0, 0.0, 0.0),
            y: Vec3::new(0.0, 1.0, 0.0),
            z: Vec3::new(0.0, 0.0, 1.0),
        }
    }

    /// Copies the upper left 3x3 block of a 4x4 matrix.
    #[inline(always)]
    pub fn create_from_matrix(matrix: &Matrix, matrix3x3: &mut Self) {
        matrix3x3.x = Vec3::new(matrix.x.x, matrix.x.y, matrix.x.z);
        matrix3x3.y = Vec3::new(matrix.y.x, matrix.y.y, matrix.y.z);
        matrix3x3.z = Vec3::new(matrix.z.x, matrix.z.y, matrix.z.z);
    }

    #[inline(always)]
    pub fn create_value_from_matrix(matrix: &Matrix) -> Self {
        let mut result = Self::identity();
        Self::create_from_matrix(matrix, &mut result);
        result
    }

    #[inline(always)]
    pub fn create_from_quaternion(q: &Quat, result: &mut Self) {
        let qx2 = q.x + q.x;
        let qy2 = q.y + q.y;
        let qz2 = q.z + q.z;
        let xx = qx2 * q.x;
        let yy = qy2 * q.y;
        let zz = qz2 * q.z;
        let xy = qx2 * q.y;
        let xz = qx2 * q.z;
        let xw = qx2 * q.w;
        let yz = qy2 * q.z;
        let yw = qy2 * q.w;
        let zw = qz2 * q.w;

        result.x = Vec3::new(1.0 - yy - zz, xy + zw, xz - yw);
        result.y = Vec3::new(xy - zw, 1.0 - xx - zz, yz + xw);
        result.z = Vec3::new(xz + yw, yz - xw, 1.0 - xx - yy);
    }

    #[inline(always)]
    pub fn create_value_from_quaternion(q: &Quat) -> Self {
        let mut result = Self::identity();
        Self::create_from_quaternion(q, &mut result);
        result
    }
}
