//! State-setting calls. None of these touch hardware; each records the
//! change in the state cache and marks the affected category dirty.

use glam::{Mat4, Vec3};
use log::debug;
use pixelforge_hal::{DeviceMemory, DisplayDma, RegisterInterface};
use pixelforge_registers::{AttributeSlot, BlendFactorE, CompareOpE, FrontFaceE, StencilOpE};

use super::buffer::BufferTarget;
use super::context::Context;
use super::state::{
    attribute_components, AttributeBinding, AttributeLayout, Capability, CullFaceMode,
    DirtyFlags, LightParam, MaterialParam, MatrixMode,
};
use crate::math::matrix;

impl<B, M> Context<B, M>
where
    B: RegisterInterface + DisplayDma,
    M: DeviceMemory,
{
    fn set_capability(&mut self, cap: Capability, on: bool) {
        let state = &mut self.state;
        let flags = match cap {
            Capability::DepthTest => {
                state.depth.test_enabled = on;
                DirtyFlags::DEPTH
            }
            Capability::Blend => {
                state.blend.enabled = on;
                DirtyFlags::BLEND
            }
            Capability::StencilTest => {
                state.stencil.test_enabled = on;
                DirtyFlags::STENCIL
            }
            Capability::CullFace => {
                state.cull.enabled = on;
                DirtyFlags::CULL
            }
            Capability::Lighting => {
                state.lighting_enabled = on;
                DirtyFlags::LIGHTS | DirtyFlags::MATERIAL
            }
            Capability::Light(index) => match state.lights.get_mut(usize::from(index)) {
                Some(light) => {
                    light.enabled = on;
                    DirtyFlags::LIGHTS
                }
                None => {
                    debug!("light {} out of range", index);
                    return;
                }
            },
        };
        state.mark(flags);
    }

    pub fn enable(&mut self, cap: Capability) {
        self.set_capability(cap, true);
    }

    pub fn disable(&mut self, cap: Capability) {
        self.set_capability(cap, false);
    }

    pub fn is_enabled(&self, cap: Capability) -> bool {
        let state = &self.state;
        match cap {
            Capability::DepthTest => state.depth.test_enabled,
            Capability::Blend => state.blend.enabled,
            Capability::StencilTest => state.stencil.test_enabled,
            Capability::CullFace => state.cull.enabled,
            Capability::Lighting => state.lighting_enabled,
            Capability::Light(index) => state
                .lights
                .get(usize::from(index))
                .is_some_and(|l| l.enabled),
        }
    }

    pub fn matrix_mode(&mut self, mode: MatrixMode) {
        self.state.matrix_mode = mode;
    }

    fn update_matrix(&mut self, op: impl FnOnce(&mut Mat4)) {
        let state = &mut self.state;
        match state.matrix_mode {
            MatrixMode::ModelView => op(state.modelview.top_mut()),
            MatrixMode::Projection => op(state.projection.top_mut()),
            MatrixMode::Texture => op(state.texture.top_mut()),
        }
        state.mark(DirtyFlags::MATRICES);
    }

    /// Push the current stack.
    ///
    /// # Panics
    ///
    /// Panics when the stack is full.
    pub fn push_matrix(&mut self) {
        let state = &mut self.state;
        match state.matrix_mode {
            MatrixMode::ModelView => state.modelview.push(),
            MatrixMode::Projection => state.projection.push(),
            MatrixMode::Texture => state.texture.push(),
        }
        state.mark(DirtyFlags::MATRICES);
    }

    /// Pop the current stack.
    ///
    /// # Panics
    ///
    /// Panics at depth zero.
    pub fn pop_matrix(&mut self) {
        let state = &mut self.state;
        match state.matrix_mode {
            MatrixMode::ModelView => state.modelview.pop(),
            MatrixMode::Projection => state.projection.pop(),
            MatrixMode::Texture => state.texture.pop(),
        }
        state.mark(DirtyFlags::MATRICES);
    }

    pub fn load_identity(&mut self) {
        self.update_matrix(|m| *m = Mat4::IDENTITY);
    }

    pub fn load_matrix(&mut self, matrix: Mat4) {
        self.update_matrix(|m| *m = matrix);
    }

    pub fn mult_matrix(&mut self, matrix: Mat4) {
        self.update_matrix(|m| *m *= matrix);
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.mult_matrix(Mat4::from_translation(Vec3::new(x, y, z)));
    }

    /// Rotate by `angle` degrees around `(x, y, z)`.
    pub fn rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) {
        self.mult_matrix(matrix::rotation(angle, x, y, z));
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.mult_matrix(Mat4::from_scale(Vec3::new(x, y, z)));
    }

    pub fn frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.mult_matrix(matrix::frustum(left, right, bottom, top, near, far));
    }

    pub fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.mult_matrix(matrix::ortho(left, right, bottom, top, near, far));
    }

    pub fn material(&mut self, param: MaterialParam) {
        let m = &mut self.state.material;
        match param {
            MaterialParam::Ambient(c) => m.ambient = c,
            MaterialParam::Diffuse(c) => m.diffuse = c,
            MaterialParam::Specular(c) => m.specular = c,
            MaterialParam::AmbientAndDiffuse(c) => {
                m.ambient = c;
                m.diffuse = c;
            }
            MaterialParam::Shininess(s) => m.shininess = s,
        }
        self.state.mark(DirtyFlags::MATERIAL);
    }

    /// Set one property of light `index`. Out-of-range lights are ignored.
    pub fn light(&mut self, index: u8, param: LightParam) {
        let Some(light) = self.state.lights.get_mut(usize::from(index)) else {
            debug!("light {} out of range", index);
            return;
        };
        match param {
            LightParam::Position(p) => light.position = p,
            LightParam::Ambient(c) => light.ambient = c,
            LightParam::Diffuse(c) => light.diffuse = c,
            LightParam::Specular(c) => light.specular = c,
        }
        self.state.mark(DirtyFlags::LIGHTS);
    }

    pub fn depth_func(&mut self, func: CompareOpE) {
        self.state.depth.func = func;
        self.state.mark(DirtyFlags::DEPTH);
    }

    pub fn depth_mask(&mut self, write: bool) {
        self.state.depth.write_enabled = write;
        self.state.mark(DirtyFlags::DEPTH);
    }

    /// Same factors are used for color and alpha.
    pub fn blend_func(&mut self, src: BlendFactorE, dst: BlendFactorE) {
        self.state.blend.src = src;
        self.state.blend.dst = dst;
        self.state.mark(DirtyFlags::BLEND);
    }

    /// Stencil comparison for both faces.
    pub fn stencil_func(&mut self, func: CompareOpE, reference: u8, mask: u8) {
        let stencil = &mut self.state.stencil;
        for face in [&mut stencil.front, &mut stencil.back] {
            face.func = func;
            face.reference = reference;
            face.mask = mask;
        }
        self.state.mark(DirtyFlags::STENCIL);
    }

    /// Stencil operations for both faces.
    pub fn stencil_op(&mut self, fail: StencilOpE, depth_fail: StencilOpE, pass: StencilOpE) {
        let stencil = &mut self.state.stencil;
        for face in [&mut stencil.front, &mut stencil.back] {
            face.fail = fail;
            face.depth_fail = depth_fail;
            face.pass = pass;
        }
        self.state.mark(DirtyFlags::STENCIL);
    }

    pub fn stencil_mask(&mut self, write_mask: u8) {
        let stencil = &mut self.state.stencil;
        stencil.front.write_mask = write_mask;
        stencil.back.write_mask = write_mask;
        self.state.mark(DirtyFlags::STENCIL);
    }

    pub fn cull_face(&mut self, mode: CullFaceMode) {
        self.state.cull.mode = mode;
        self.state.mark(DirtyFlags::CULL);
    }

    pub fn front_face(&mut self, winding: FrontFaceE) {
        self.state.cull.front_face = winding;
        self.state.mark(DirtyFlags::CULL);
    }

    pub fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        let vp = &mut self.state.viewport;
        vp.x = x as f32;
        vp.y = y as f32;
        vp.width = width as f32;
        vp.height = height as f32;
        self.state.mark(DirtyFlags::FRAMEBUFFER);
    }

    pub fn depth_range(&mut self, near: f32, far: f32) {
        let vp = &mut self.state.viewport;
        vp.min_depth = near.clamp(0.0, 1.0);
        vp.max_depth = far.clamp(0.0, 1.0);
        self.state.mark(DirtyFlags::FRAMEBUFFER);
    }

    pub fn scissor(&mut self, x: i32, y: i32, width: u32, height: u32) {
        let sc = &mut self.state.scissor;
        sc.x = x;
        sc.y = y;
        sc.width = width;
        sc.height = height;
        self.state.mark(DirtyFlags::FRAMEBUFFER);
    }

    pub fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.state.clear.color = [red, green, blue, alpha];
    }

    pub fn clear_depth(&mut self, depth: f32) {
        self.state.clear.depth = depth;
    }

    pub fn clear_stencil(&mut self, stencil: u8) {
        self.state.clear.stencil = stencil;
    }

    pub fn enable_client_state(&mut self, slot: AttributeSlot) {
        self.state.array_mut(slot).enabled = true;
        self.state.mark(DirtyFlags::VERTEX_ARRAYS);
    }

    pub fn disable_client_state(&mut self, slot: AttributeSlot) {
        self.state.array_mut(slot).enabled = false;
        self.state.mark(DirtyFlags::VERTEX_ARRAYS);
    }

    /// Source `slot` from the buffer currently bound to the array target.
    ///
    /// Elements are Q16.16 vectors (four components for position and color,
    /// three for normals). A zero stride means tightly packed. Ignored when
    /// no array buffer is bound.
    pub fn attribute_pointer(&mut self, slot: AttributeSlot, layout: AttributeLayout) {
        let buffer = self.buffers.bound(BufferTarget::ArrayBuffer);
        if buffer == 0 {
            debug!("{:?} pointer ignored: no array buffer bound", slot);
            return;
        }
        let stride = if layout.stride == 0 {
            attribute_components(slot) * 4
        } else {
            layout.stride
        };
        let binding = self.state.array_mut(slot);
        *binding = AttributeBinding {
            enabled: binding.enabled,
            buffer,
            offset: layout.offset,
            stride,
        };
        self.state.mark(DirtyFlags::VERTEX_ARRAYS);
    }

    pub fn vertex_pointer(&mut self, layout: AttributeLayout) {
        self.attribute_pointer(AttributeSlot::Position, layout);
    }

    pub fn normal_pointer(&mut self, layout: AttributeLayout) {
        self.attribute_pointer(AttributeSlot::Normal, layout);
    }

    pub fn color_pointer(&mut self, layout: AttributeLayout) {
        self.attribute_pointer(AttributeSlot::Color, layout);
    }
}
