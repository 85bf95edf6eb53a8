use crate::utilities::{matrix::Matrix, matrix3x3::Matrix3x3};
use glam::{Quat, Vec4};

/// Scales a quaternion.
#[inline(always)]
pub fn scale(q: Quat, scale: f32) -> Quat {
    Quat::from_vec4(Vec4::from(q) * scale)
}

/// Computes the 4D dot product of two quaternions.
#[inline(always)]
pub fn dot(a: Quat, b: Quat) -> f32 {
    a.x * b.x + a.y * b.y + a.z * b.z + a.w * b.w
}

/// Negates the components of a quaternion. The result represents the same orientation.
#[inline(always)]
pub fn negate(q: Quat) -> Quat {
    Quat::from_xyzw(-q.x, -q.y, -q.z, -q.w)
}

/// Constructs a quaternion from a rotation matrix.
#[inline(always)]
pub fn create_from_rotation_matrix3x3_into(r: &Matrix3x3, q: &mut Quat) {
    let t;
    let (x, y, z, w);
    if r.z.z < 0.0 {
        if r.x.x > r.y.y {
            t = 1.0 + r.x.x - r.y.y - r.z.z;
            x = t;
            y = r.x.y + r.y.x;
            z = r.z.x + r.x.z;
            w = r.y.z - r.z.y;
        } else {
            t = 1.0 - r.x.x + r.y.y - r.z.z;
            x = r.x.y + r.y.x;
            y = t;
            z = r.y.z + r.z.y;
            w = r.z.x - r.x.z;
        }
    } else {
        #[allow(clippy::collapsible_else_if)]
        if r.x.x < -r.y.y {
            t = 1.0 - r.x.x - r.y.y + r.z.z;
            x = r.z.x + r.x.z;
            y = r.y.z + r.z.y;
            z = t;
            w = r.x.y - r.y.x;
        } else {
            t = 1.0 + r.x.x + r.y.y + r.z.z;
            x = r.y.z - r.z.y;
            y = r.z.x - r.x.z;
            z = r.x.y - r.y.x;
            w = t;
        }
    }
    *q = scale(Quat::from_xyzw(x, y, z, w), 0.5 / t.sqrt());
}

/// Constructs a quaternion from the rotation part of a rigid 4x4 matrix.
#[inline(always)]
pub fn create_from_rotation_matrix(r: &Matrix) -> Quat {
    let rotation3x3 = Matrix3x3::create_value_from_matrix(r);
    let mut q = Quat::IDENTITY;
    create_from_rotation_matrix3x3_into(&rotation3x3, &mut q);
    q
}

/// Ensures the quaternion has unit length.
#[inline(always)]
pub fn normalize(quaternion: Quat) -> Quat {
    let v = Vec4::from(quaternion);
    let scale = v.dot(v).sqrt().recip();
    Quat::from_vec4(v * scale)
}

/// Blends two quaternions together to get an intermediate state along the shortest arc.
#[inline(always)]
pub fn slerp_into(start: Quat, mut end: Quat, interpolation_amount: f32, result: &mut Quat) {
    let mut cos_half_theta = dot(start, end) as f64;
    if cos_half_theta < 0.0 {
        // Negating a quaternion results in the same orientation,
        // but we need cos_half_theta to be positive to get the shortest path.
        end = negate(end);
        cos_half_theta = -cos_half_theta;
    }
    if interpolation_amount <= 0.0 {
        *result = start;
        return;
    }
    if interpolation_amount >= 1.0 {
        *result = end;
        return;
    }
    // Nearly parallel orientations make the sine ratio unstable; a normalized linear blend is accurate there.
    if cos_half_theta > (1.0 - 1e-12) {
        let blended = Vec4::from(start) * (1.0 - interpolation_amount) + Vec4::from(end) * interpolation_amount;
        *result = normalize(Quat::from_vec4(blended));
        return;
    }
    let half_theta = cos_half_theta.acos();
    let sin_half_theta = (1.0 - cos_half_theta * cos_half_theta).sqrt();

    let a_fraction = ((1.0 - interpolation_amount) as f64 * half_theta).sin() / sin_half_theta;
    let b_fraction = (interpolation_amount as f64 * half_theta).sin() / sin_half_theta;

    *result = Quat::from_xyzw(
        (start.x as f64 * a_fraction + end.x as f64 * b_fraction) as f32,
        (start.y as f64 * a_fraction + end.y as f64 * b_fraction) as f32,
        (start.z as f64 * a_fraction + end.z as f64 * b_fraction) as f32,
        (start.w as f64 * a_fraction + end.w as f64 * b_fraction) as f32,
    );
}

/// Blends two quaternions together to get an intermediate state along the shortest arc.
#[inline(always)]
pub fn slerp(start: Quat, end: Quat, interpolation_amount: f32) -> Quat {
    let mut result = Quat::IDENTITY;
    slerp_into(start, end, interpolation_amount, &mut result);
    result
}
