//! Q16.16 conversion for every hardware-facing real number.

use fixed::types::I16F16;
use glam::{Mat3, Mat4};

/// Scale between an `f32` and its Q16.16 representation.
pub const Q16_SCALE: f32 = 65536.0;

/// Convert to Q16.16, truncating toward zero.
///
/// Values outside the representable range saturate; NaN encodes as zero.
#[inline]
pub fn encode(v: f32) -> I16F16 {
    I16F16::from_bits((v * Q16_SCALE) as i32)
}

/// Convert Q16.16 back to `f32`.
#[inline]
pub fn decode(q: I16F16) -> f32 {
    q.to_num::<f32>()
}

pub fn encode_array<const N: usize>(values: &[f32; N]) -> [I16F16; N] {
    core::array::from_fn(|i| encode(values[i]))
}

/// First three channels of an RGBA color.
pub fn encode_rgb(color: &[f32; 4]) -> [I16F16; 3] {
    [encode(color[0]), encode(color[1]), encode(color[2])]
}

/// Column-major encoding of a 4x4 matrix.
pub fn encode_mat4(m: &Mat4) -> [I16F16; 16] {
    encode_array(&m.to_cols_array())
}

/// Column-major encoding of a 3x3 matrix.
pub fn encode_mat3(m: &Mat3) -> [I16F16; 9] {
    encode_array(&m.to_cols_array())
}
