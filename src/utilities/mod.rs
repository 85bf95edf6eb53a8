pub mod matrix;
pub mod matrix3x3;
pub mod quaternion_ex;
