//! Translation of cached state into configuration blocks, and the dirty
//! flush that commits them.

use log::debug;
use pixelforge_hal::{DeviceMemory, DisplayDma, RegisterInterface};
use pixelforge_registers::{
    BlendConfig, BlendOpE, CompareOpE, CullFaceE, DepthTestConfig, FramebufferConfig,
    LightConfig, MaterialConfig, PrimitiveConfig, RegisterBlock, StencilConfig, StencilOpE,
    VertexTransformConfig, I16F16,
};

use super::state::{DirtyFlags, GpuState, StencilFace, MAX_LIGHTS};
use crate::gpu::{Device, GpuError};
use crate::math::fixed::{encode, encode_array, encode_mat3, encode_mat4, encode_rgb};
use crate::math::matrix::normal_matrix;

/// Where the framebuffer block points the per-pixel stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    pub width: u16,
    pub height: u16,
    pub color_address: u32,
    pub depthstencil_address: u32,
    /// Bytes per line, shared by color and depth/stencil.
    pub pitch: u16,
}

impl RenderTarget {
    pub fn of<B, M>(device: &Device<B, M>) -> Self
    where
        B: RegisterInterface + DisplayDma,
        M: DeviceMemory,
    {
        let (width, height) = device.resolution();
        Self {
            width,
            height,
            color_address: device.render_buffer().device_address,
            depthstencil_address: device.depth_stencil().device_address,
            // Checked against u16 when the device was opened.
            pitch: device.stride() as u16,
        }
    }
}

pub fn vertex_transform(state: &GpuState) -> VertexTransformConfig {
    let modelview = state.modelview.top();
    VertexTransformConfig {
        normal_enable: true,
        position_mv: encode_mat4(modelview),
        position_p: encode_mat4(state.projection.top()),
        normal_mv_inv_t: encode_mat3(&normal_matrix(modelview)),
    }
}

pub fn material(state: &GpuState) -> MaterialConfig {
    let m = &state.material;
    MaterialConfig {
        ambient: encode_rgb(&m.ambient),
        diffuse: encode_rgb(&m.diffuse),
        specular: encode_rgb(&m.specular),
        shininess: encode(m.shininess),
    }
}

/// Light `index` as the hardware should see it.
///
/// With lighting off, light 0 becomes a pure white ambient light and the
/// rest are zeroed, so unlit geometry still shows its material color.
pub fn light(state: &GpuState, index: usize) -> LightConfig {
    if !state.lighting_enabled {
        return if index == 0 {
            LightConfig {
                ambient: [I16F16::ONE; 3],
                ..LightConfig::default()
            }
        } else {
            LightConfig::default()
        };
    }
    match state.lights.get(index) {
        Some(l) if l.enabled => LightConfig {
            position: encode_array(&l.position),
            ambient: encode_rgb(&l.ambient),
            diffuse: encode_rgb(&l.diffuse),
            specular: encode_rgb(&l.specular),
        },
        _ => LightConfig::default(),
    }
}

pub fn depth(state: &GpuState) -> DepthTestConfig {
    DepthTestConfig {
        test_enabled: state.depth.test_enabled,
        write_enabled: state.depth.write_enabled,
        compare_op: state.depth.func,
    }
}

pub fn blend(state: &GpuState) -> BlendConfig {
    let b = &state.blend;
    BlendConfig {
        src_factor: b.src,
        dst_factor: b.dst,
        src_a_factor: b.src,
        dst_a_factor: b.dst,
        enabled: b.enabled,
        blend_op: BlendOpE::Add,
        blend_a_op: BlendOpE::Add,
        color_write_mask: 0xF,
    }
}

/// One stencil face; a disabled test passes everything and writes nothing.
pub fn stencil(face: &StencilFace, test_enabled: bool) -> StencilConfig {
    if !test_enabled {
        return StencilConfig {
            compare_op: CompareOpE::Always,
            pass_op: StencilOpE::Keep,
            fail_op: StencilOpE::Keep,
            depth_fail_op: StencilOpE::Keep,
            reference: face.reference,
            mask: face.mask,
            write_mask: face.write_mask,
        };
    }
    StencilConfig {
        compare_op: face.func,
        pass_op: face.pass,
        fail_op: face.fail,
        depth_fail_op: face.depth_fail,
        reference: face.reference,
        mask: face.mask,
        write_mask: face.write_mask,
    }
}

pub fn primitive(state: &GpuState) -> PrimitiveConfig {
    let cull = &state.cull;
    PrimitiveConfig {
        kind: cull.primitive,
        cull: if cull.enabled {
            cull.mode.into()
        } else {
            CullFaceE::None
        },
        winding: cull.front_face,
    }
}

pub fn framebuffer(state: &GpuState, target: &RenderTarget) -> FramebufferConfig {
    let vp = &state.viewport;
    let sc = &state.scissor;
    FramebufferConfig {
        width: target.width,
        height: target.height,
        viewport_x: encode(vp.x),
        viewport_y: encode(vp.y),
        viewport_width: encode(vp.width),
        viewport_height: encode(vp.height),
        viewport_min_depth: encode(vp.min_depth),
        viewport_max_depth: encode(vp.max_depth),
        scissor_offset_x: sc.x,
        scissor_offset_y: sc.y,
        scissor_width: sc.width,
        scissor_height: sc.height,
        color_address: target.color_address,
        color_pitch: target.pitch,
        depthstencil_address: target.depthstencil_address,
        depthstencil_pitch: target.pitch,
    }
}

/// Commit every dirty category, waiting on its stage first.
///
/// Categories are cleared one by one as they land, so a failed wait leaves
/// the remaining ones dirty.
pub fn flush_dirty<B, M>(
    device: &mut Device<B, M>,
    state: &mut GpuState,
) -> Result<(), GpuError<B::Error>>
where
    B: RegisterInterface + DisplayDma,
    M: DeviceMemory,
{
    for (flag, stage) in DirtyFlags::FLUSH_ORDER {
        if !state.dirty.contains(flag) {
            continue;
        }
        device.wait_for_stage(stage)?;

        if flag == DirtyFlags::MATRICES {
            device.write_block(&RegisterBlock::VertexTransform(vertex_transform(state)))?;
        } else if flag == DirtyFlags::MATERIAL {
            device.write_block(&RegisterBlock::Material(material(state)))?;
        } else if flag == DirtyFlags::LIGHTS {
            for index in 0..MAX_LIGHTS {
                device.write_block(&RegisterBlock::Light(index as u8, light(state, index)))?;
            }
        } else if flag == DirtyFlags::DEPTH {
            device.write_block(&RegisterBlock::DepthTest(depth(state)))?;
        } else if flag == DirtyFlags::BLEND {
            device.write_block(&RegisterBlock::Blend(blend(state)))?;
        } else if flag == DirtyFlags::STENCIL {
            let enabled = state.stencil.test_enabled;
            device.write_block(&RegisterBlock::StencilFront(stencil(
                &state.stencil.front,
                enabled,
            )))?;
            device.write_block(&RegisterBlock::StencilBack(stencil(
                &state.stencil.back,
                enabled,
            )))?;
        } else if flag == DirtyFlags::CULL {
            device.write_block(&RegisterBlock::Primitive(primitive(state)))?;
        } else if flag == DirtyFlags::FRAMEBUFFER {
            let target = RenderTarget::of(device);
            device.write_block(&RegisterBlock::Framebuffer(framebuffer(state, &target)))?;
        }
        // Vertex arrays have no persistent registers; draws rewrite them.

        state.dirty.remove(flag);
        debug!("flushed {:?} after {:?} drained", flag, stage);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::state::CullFaceMode;
    use crate::math::fixed::decode;
    use glam::{Mat4, Vec3};
    use pixelforge_registers::FrontFaceE;

    #[test]
    fn test_unlit_light_is_white_ambient() {
        let state = GpuState::new(8, 8);
        let l = light(&state, 0);
        assert_eq!(l.ambient, [I16F16::ONE; 3]);
        assert_eq!(l.diffuse, [I16F16::ZERO; 3]);
        assert_eq!(l.specular, [I16F16::ZERO; 3]);
    }

    #[test]
    fn test_disabled_light_is_zeroed() {
        let mut state = GpuState::new(8, 8);
        state.lighting_enabled = true;
        assert_eq!(light(&state, 0), LightConfig::default());
        state.lights[0].enabled = true;
        let l = light(&state, 0);
        assert_eq!(decode(l.position[2]), 1.0);
        assert_eq!(decode(l.diffuse[0]), 1.0);
    }

    #[test]
    fn test_material_defaults_encoded() {
        let m = material(&GpuState::new(8, 8));
        assert!((decode(m.ambient[0]) - 0.2).abs() < 1e-4);
        assert!((decode(m.diffuse[1]) - 0.8).abs() < 1e-4);
        assert_eq!(m.shininess, I16F16::ZERO);
    }

    #[test]
    fn test_cull_disabled_sends_none() {
        let mut state = GpuState::new(8, 8);
        state.cull.mode = CullFaceMode::Front;
        state.cull.front_face = FrontFaceE::Cw;
        assert_eq!(primitive(&state).cull, CullFaceE::None);
        state.cull.enabled = true;
        let p = primitive(&state);
        assert_eq!(p.cull, CullFaceE::Front);
        assert_eq!(p.winding, FrontFaceE::Cw);
    }

    #[test]
    fn test_stencil_disabled_passes_through() {
        let face = StencilFace {
            func: CompareOpE::Never,
            pass: StencilOpE::Replace,
            ..StencilFace::default()
        };
        let off = stencil(&face, false);
        assert_eq!(off.compare_op, CompareOpE::Always);
        assert_eq!(off.pass_op, StencilOpE::Keep);
        let on = stencil(&face, true);
        assert_eq!(on.compare_op, CompareOpE::Never);
        assert_eq!(on.pass_op, StencilOpE::Replace);
    }

    #[test]
    fn test_vertex_transform_uses_stack_tops() {
        let mut state = GpuState::new(8, 8);
        state
            .modelview
            .load(Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)));
        let xf = vertex_transform(&state);
        assert!(xf.normal_enable);
        assert_eq!(decode(xf.position_mv[14]), -5.0);
        assert_eq!(decode(xf.position_p[0]), 1.0);
        assert_eq!(decode(xf.normal_mv_inv_t[0]), 1.0);
    }

    #[test]
    fn test_framebuffer_uses_target() {
        let state = GpuState::new(320, 240);
        let target = RenderTarget {
            width: 320,
            height: 240,
            color_address: 0x3000_0000,
            depthstencil_address: 0x3004_B000,
            pitch: 1280,
        };
        let fb = framebuffer(&state, &target);
        assert_eq!(fb.color_address, 0x3000_0000);
        assert_eq!(fb.depthstencil_pitch, 1280);
        assert_eq!(decode(fb.viewport_width), 320.0);
        assert_eq!(fb.scissor_height, 240);
        assert_eq!(decode(fb.viewport_max_depth), 1.0);
    }
}
