//! Bounded matrix stacks and fixed-function matrix builders.

use glam::{Mat3, Mat4, Vec3};

/// Maximum modelview stack depth.
pub const MODELVIEW_STACK_DEPTH: usize = 32;
/// Maximum projection stack depth.
pub const PROJECTION_STACK_DEPTH: usize = 2;
/// Maximum texture stack depth.
pub const TEXTURE_STACK_DEPTH: usize = 2;

/// Determinant below which the modelview is treated as singular.
const SINGULAR_EPSILON: f32 = 1e-6;

/// A matrix stack holding at most `N` matrices.
///
/// The stack is never empty: the bottom entry is the initial identity.
#[derive(Debug, Clone)]
pub struct MatrixStack<const N: usize> {
    entries: heapless::Vec<Mat4, N>,
}

impl<const N: usize> MatrixStack<N> {
    pub fn new() -> Self {
        assert!(N > 0, "matrix stack needs room for one matrix");
        let mut entries = heapless::Vec::new();
        let _ = entries.push(Mat4::IDENTITY);
        Self { entries }
    }

    pub fn top(&self) -> &Mat4 {
        &self.entries[self.entries.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut Mat4 {
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    /// Number of pushes currently outstanding.
    pub fn depth(&self) -> usize {
        self.entries.len() - 1
    }

    /// Duplicate the top matrix.
    ///
    /// # Panics
    ///
    /// Panics when the stack already holds `N` matrices.
    pub fn push(&mut self) {
        let top = *self.top();
        if self.entries.push(top).is_err() {
            panic!("matrix stack overflow (capacity {N})");
        }
    }

    /// Discard the top matrix.
    ///
    /// # Panics
    ///
    /// Panics at depth zero.
    pub fn pop(&mut self) {
        assert!(self.entries.len() > 1, "matrix stack underflow");
        self.entries.pop();
    }

    pub fn load(&mut self, m: Mat4) {
        *self.top_mut() = m;
    }

    /// Post-multiply the top matrix (`top = top * m`).
    pub fn multiply(&mut self, m: Mat4) {
        let top = self.top_mut();
        *top = *top * m;
    }
}

impl<const N: usize> Default for MatrixStack<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Perspective projection with the classic `glFrustum` layout.
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let rl = right - left;
    let tb = top - bottom;
    let fnr = far - near;
    Mat4::from_cols_array(&[
        2.0 * near / rl,
        0.0,
        0.0,
        0.0,
        0.0,
        2.0 * near / tb,
        0.0,
        0.0,
        (right + left) / rl,
        (top + bottom) / tb,
        -(far + near) / fnr,
        -1.0,
        0.0,
        0.0,
        -2.0 * far * near / fnr,
        0.0,
    ])
}

/// Orthographic projection with the classic `glOrtho` layout.
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    Mat4::orthographic_rh_gl(left, right, bottom, top, near, far)
}

/// Rotation of `angle_deg` degrees around `(x, y, z)`.
///
/// A zero-length axis yields the identity.
pub fn rotation(angle_deg: f32, x: f32, y: f32, z: f32) -> Mat4 {
    let axis = Vec3::new(x, y, z);
    match axis.try_normalize() {
        Some(axis) => Mat4::from_axis_angle(axis, angle_deg.to_radians()),
        None => Mat4::IDENTITY,
    }
}

/// Inverse-transpose of the upper 3x3 of `modelview`.
pub fn normal_matrix(modelview: &Mat4) -> Mat3 {
    let upper = Mat3::from_mat4(*modelview);
    if upper.determinant().abs() < SINGULAR_EPSILON {
        return Mat3::IDENTITY;
    }
    upper.inverse().transpose()
}
