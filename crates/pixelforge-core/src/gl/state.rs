//! Logical pipeline state and per-category dirty tracking.

use bitflags::bitflags;
use pixelforge_registers::{
    AttributeSlot, BlendFactorE, CompareOpE, CullFaceE, FrontFaceE, PipelineStage,
    PrimitiveTypeE, StencilOpE, NUM_LIGHTS,
};

use crate::math::matrix::{
    MatrixStack, MODELVIEW_STACK_DEPTH, PROJECTION_STACK_DEPTH, TEXTURE_STACK_DEPTH,
};

/// Number of lights the state cache tracks.
pub const MAX_LIGHTS: usize = NUM_LIGHTS;

bitflags! {
    /// State categories whose registers must be resent before the next draw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u16 {
        const MATRICES = 1 << 0;
        const MATERIAL = 1 << 1;
        const LIGHTS = 1 << 2;
        const DEPTH = 1 << 3;
        const BLEND = 1 << 4;
        const STENCIL = 1 << 5;
        const CULL = 1 << 6;
        const VERTEX_ARRAYS = 1 << 7;
        const FRAMEBUFFER = 1 << 8;
    }
}

impl DirtyFlags {
    /// Categories in flush order, each with the earliest stage that reads it.
    pub const FLUSH_ORDER: [(DirtyFlags, PipelineStage); 9] = [
        (DirtyFlags::MATRICES, PipelineStage::VertexTransform),
        (DirtyFlags::MATERIAL, PipelineStage::VertexTransform),
        (DirtyFlags::LIGHTS, PipelineStage::VertexTransform),
        (DirtyFlags::DEPTH, PipelineStage::PerPixel),
        (DirtyFlags::BLEND, PipelineStage::PerPixel),
        (DirtyFlags::STENCIL, PipelineStage::PerPixel),
        (DirtyFlags::CULL, PipelineStage::PrepRaster),
        (DirtyFlags::FRAMEBUFFER, PipelineStage::PerPixel),
        (DirtyFlags::VERTEX_ARRAYS, PipelineStage::InputAssembly),
    ];

    /// Stage that must drain before a single category is rewritten.
    pub fn stage(self) -> Option<PipelineStage> {
        Self::FLUSH_ORDER
            .iter()
            .find(|(flag, _)| *flag == self)
            .map(|(_, stage)| *stage)
    }
}

/// Toggleable fixed-function capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    DepthTest,
    Blend,
    StencilTest,
    CullFace,
    Lighting,
    Light(u8),
}

/// Matrix stack targeted by matrix operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixMode {
    #[default]
    ModelView,
    Projection,
    Texture,
}

/// Faces removed by culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullFaceMode {
    Front,
    #[default]
    Back,
    FrontAndBack,
}

impl From<CullFaceMode> for CullFaceE {
    fn from(mode: CullFaceMode) -> Self {
        match mode {
            CullFaceMode::Front => CullFaceE::Front,
            CullFaceMode::Back => CullFaceE::Back,
            CullFaceMode::FrontAndBack => CullFaceE::FrontAndBack,
        }
    }
}

/// One material property.
///
/// The hardware has no emissive term, so emission is not expressible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialParam {
    Ambient([f32; 4]),
    Diffuse([f32; 4]),
    Specular([f32; 4]),
    AmbientAndDiffuse([f32; 4]),
    Shininess(f32),
}

/// One light property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightParam {
    Position([f32; 4]),
    Ambient([f32; 4]),
    Diffuse([f32; 4]),
    Specular([f32; 4]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [0.2, 0.2, 0.2, 1.0],
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            shininess: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub enabled: bool,
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl Default for Light {
    fn default() -> Self {
        Self {
            enabled: false,
            position: [0.0, 0.0, 1.0, 0.0],
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthState {
    pub test_enabled: bool,
    pub write_enabled: bool,
    pub func: CompareOpE,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            test_enabled: false,
            write_enabled: true,
            func: CompareOpE::Less,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    pub enabled: bool,
    pub src: BlendFactorE,
    pub dst: BlendFactorE,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            enabled: false,
            src: BlendFactorE::One,
            dst: BlendFactorE::Zero,
        }
    }
}

/// Stencil configuration of one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFace {
    pub func: CompareOpE,
    pub reference: u8,
    pub mask: u8,
    pub write_mask: u8,
    pub fail: StencilOpE,
    pub depth_fail: StencilOpE,
    pub pass: StencilOpE,
}

impl Default for StencilFace {
    fn default() -> Self {
        Self {
            func: CompareOpE::Always,
            reference: 0,
            mask: 0xFF,
            write_mask: 0xFF,
            fail: StencilOpE::Keep,
            depth_fail: StencilOpE::Keep,
            pass: StencilOpE::Keep,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StencilState {
    pub test_enabled: bool,
    pub front: StencilFace,
    pub back: StencilFace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CullState {
    pub enabled: bool,
    pub mode: CullFaceMode,
    pub front_face: FrontFaceE,
    /// Primitive class of the last draw.
    pub primitive: PrimitiveTypeE,
}

impl Default for CullState {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: CullFaceMode::Back,
            front_face: FrontFaceE::Ccw,
            primitive: PrimitiveTypeE::Triangles,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scissor {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearValues {
    pub color: [f32; 4],
    pub depth: f32,
    pub stencil: u8,
}

impl Default for ClearValues {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 0.0, 1.0],
            depth: 1.0,
            stencil: 0,
        }
    }
}

/// Explicit layout of one attribute inside a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeLayout {
    /// Byte offset of the first element.
    pub offset: usize,
    /// Bytes between consecutive elements; zero means tightly packed.
    pub stride: u16,
}

/// Buffer binding of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributeBinding {
    pub enabled: bool,
    /// Bound buffer id, zero when unbound.
    pub buffer: u32,
    pub offset: usize,
    pub stride: u16,
}

/// Q16.16 components per element of an attribute stream.
pub const fn attribute_components(slot: AttributeSlot) -> u16 {
    match slot {
        AttributeSlot::Position => 4,
        AttributeSlot::Normal => 3,
        AttributeSlot::Color => 4,
    }
}

/// The complete logical pipeline state.
#[derive(Debug, Clone)]
pub struct GpuState {
    pub(crate) dirty: DirtyFlags,
    pub matrix_mode: MatrixMode,
    pub modelview: MatrixStack<MODELVIEW_STACK_DEPTH>,
    pub projection: MatrixStack<PROJECTION_STACK_DEPTH>,
    pub texture: MatrixStack<TEXTURE_STACK_DEPTH>,
    pub lighting_enabled: bool,
    pub material: Material,
    pub lights: [Light; MAX_LIGHTS],
    pub depth: DepthState,
    pub blend: BlendState,
    pub stencil: StencilState,
    pub cull: CullState,
    pub viewport: Viewport,
    pub scissor: Scissor,
    pub clear: ClearValues,
    pub arrays: [AttributeBinding; 3],
}

impl GpuState {
    /// Default state for a `width` x `height` target, everything dirty.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            dirty: DirtyFlags::all(),
            matrix_mode: MatrixMode::default(),
            modelview: MatrixStack::new(),
            projection: MatrixStack::new(),
            texture: MatrixStack::new(),
            lighting_enabled: false,
            material: Material::default(),
            lights: [Light::default(); MAX_LIGHTS],
            depth: DepthState::default(),
            blend: BlendState::default(),
            stencil: StencilState::default(),
            cull: CullState::default(),
            viewport: Viewport {
                x: 0.0,
                y: 0.0,
                width: f32::from(width),
                height: f32::from(height),
                min_depth: 0.0,
                max_depth: 1.0,
            },
            scissor: Scissor {
                x: 0,
                y: 0,
                width: u32::from(width),
                height: u32::from(height),
            },
            clear: ClearValues::default(),
            arrays: [AttributeBinding::default(); 3],
        }
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    pub fn mark(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    pub fn array(&self, slot: AttributeSlot) -> &AttributeBinding {
        &self.arrays[slot as usize]
    }

    pub fn array_mut(&mut self, slot: AttributeSlot) -> &mut AttributeBinding {
        &mut self.arrays[slot as usize]
    }

    /// Clear every attribute slot bound to `buffer`.
    pub fn detach_buffer(&mut self, buffer: u32) {
        if buffer == 0 {
            return;
        }
        let mut touched = false;
        for binding in self.arrays.iter_mut().filter(|b| b.buffer == buffer) {
            *binding = AttributeBinding::default();
            touched = true;
        }
        if touched {
            self.dirty |= DirtyFlags::VERTEX_ARRAYS;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_a_stage() {
        for flag in DirtyFlags::all().iter() {
            assert!(flag.stage().is_some(), "{flag:?} has no stage");
        }
        assert_eq!(
            DirtyFlags::CULL.stage(),
            Some(PipelineStage::PrepRaster)
        );
        assert_eq!((DirtyFlags::CULL | DirtyFlags::DEPTH).stage(), None);
    }

    #[test]
    fn test_new_state_is_fully_dirty() {
        let state = GpuState::new(640, 480);
        assert_eq!(state.dirty(), DirtyFlags::all());
        assert_eq!(state.viewport.width, 640.0);
        assert_eq!(state.scissor.height, 480);
    }

    #[test]
    fn test_detach_buffer_clears_matching_slots() {
        let mut state = GpuState::new(4, 4);
        state.dirty = DirtyFlags::empty();
        *state.array_mut(AttributeSlot::Position) = AttributeBinding {
            enabled: true,
            buffer: 3,
            offset: 0,
            stride: 16,
        };
        state.array_mut(AttributeSlot::Color).buffer = 4;
        state.detach_buffer(3);
        assert_eq!(
            *state.array(AttributeSlot::Position),
            AttributeBinding::default()
        );
        assert_eq!(state.array(AttributeSlot::Color).buffer, 4);
        assert_eq!(state.dirty(), DirtyFlags::VERTEX_ARRAYS);
    }
}
