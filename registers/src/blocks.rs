//! Configuration blocks of the PixelForge pipeline CSR window.
//!
//! Each block is the semantic content of one group of control/status
//! registers. How a block is split into 32-bit words is the register
//! interface's business; the driver only ever moves whole blocks.

use fixed::types::I16F16;

use crate::components::blend_factor_e::BlendFactorE;
use crate::components::blend_op_e::BlendOpE;
use crate::components::compare_op_e::CompareOpE;
use crate::components::cull_face_e::CullFaceE;
use crate::components::front_face_e::FrontFaceE;
use crate::components::index_kind_e::IndexKindE;
use crate::components::input_mode_e::InputModeE;
use crate::components::input_topology_e::InputTopologyE;
use crate::components::primitive_type_e::PrimitiveTypeE;
use crate::components::stencil_op_e::StencilOpE;

/// Number of hardware lights.
pub const NUM_LIGHTS: usize = 1;

/// IDX: index generator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Device address of the first index (ignored when not indexed).
    pub address: u32,
    pub count: u32,
    pub kind: IndexKindE,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            address: 0,
            count: 0,
            kind: IndexKindE::NotIndexed,
        }
    }
}

/// TOPO: input topology configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyConfig {
    pub topology: InputTopologyE,
    pub primitive_restart: bool,
    pub restart_index: u32,
    pub base_vertex: u32,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            topology: InputTopologyE::TriangleList,
            primitive_restart: false,
            restart_index: 0,
            base_vertex: 0,
        }
    }
}

/// The three vertex attribute inputs of the input assembly stage.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSlot {
    Position = 0,
    Normal = 1,
    Color = 2,
}

impl AttributeSlot {
    pub const ALL: [AttributeSlot; 3] = [
        AttributeSlot::Position,
        AttributeSlot::Normal,
        AttributeSlot::Color,
    ];
}

/// IA_ATTR: one input attribute, either a constant or a memory stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAttribute {
    /// Same value for every vertex (Vector4 in Q16.16).
    Constant([I16F16; 4]),
    /// Fetched per vertex from device memory.
    PerVertex { address: u32, stride: u16 },
}

impl InputAttribute {
    /// The MODE field of the attribute register.
    #[must_use]
    pub const fn mode(&self) -> InputModeE {
        match self {
            InputAttribute::Constant(_) => InputModeE::Constant,
            InputAttribute::PerVertex { .. } => InputModeE::PerVertex,
        }
    }
}

impl Default for InputAttribute {
    fn default() -> Self {
        InputAttribute::Constant([I16F16::ZERO; 4])
    }
}

/// VTX_XF: vertex transform configuration.
///
/// Matrices are stored column-major, as produced by the matrix stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VertexTransformConfig {
    pub normal_enable: bool,
    pub position_mv: [I16F16; 16],
    pub position_p: [I16F16; 16],
    pub normal_mv_inv_t: [I16F16; 9],
}

/// VTX_SH_MATERIAL: material properties for vertex shading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterialConfig {
    pub ambient: [I16F16; 3],
    pub diffuse: [I16F16; 3],
    pub specular: [I16F16; 3],
    pub shininess: I16F16,
}

/// VTX_SH_LIGHT: one light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightConfig {
    pub position: [I16F16; 4],
    pub ambient: [I16F16; 3],
    pub diffuse: [I16F16; 3],
    pub specular: [I16F16; 3],
}

/// PRIM: primitive assembly configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveConfig {
    pub kind: PrimitiveTypeE,
    pub cull: CullFaceE,
    pub winding: FrontFaceE,
}

impl Default for PrimitiveConfig {
    fn default() -> Self {
        Self {
            kind: PrimitiveTypeE::Triangles,
            cull: CullFaceE::None,
            winding: FrontFaceE::Ccw,
        }
    }
}

/// FB: render target and viewport configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramebufferConfig {
    pub width: u16,
    pub height: u16,
    pub viewport_x: I16F16,
    pub viewport_y: I16F16,
    pub viewport_width: I16F16,
    pub viewport_height: I16F16,
    pub viewport_min_depth: I16F16,
    pub viewport_max_depth: I16F16,
    pub scissor_offset_x: i32,
    pub scissor_offset_y: i32,
    pub scissor_width: u32,
    pub scissor_height: u32,
    pub color_address: u32,
    pub color_pitch: u16,
    pub depthstencil_address: u32,
    pub depthstencil_pitch: u16,
}

/// DS_DEPTH: depth test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthTestConfig {
    pub test_enabled: bool,
    pub write_enabled: bool,
    pub compare_op: CompareOpE,
}

impl Default for DepthTestConfig {
    fn default() -> Self {
        Self {
            test_enabled: false,
            write_enabled: false,
            compare_op: CompareOpE::Always,
        }
    }
}

/// DS_STENCIL_FRONT / DS_STENCIL_BACK: per-face stencil configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilConfig {
    pub compare_op: CompareOpE,
    pub pass_op: StencilOpE,
    pub fail_op: StencilOpE,
    pub depth_fail_op: StencilOpE,
    pub reference: u8,
    pub mask: u8,
    pub write_mask: u8,
}

impl Default for StencilConfig {
    fn default() -> Self {
        Self {
            compare_op: CompareOpE::Always,
            pass_op: StencilOpE::Keep,
            fail_op: StencilOpE::Keep,
            depth_fail_op: StencilOpE::Keep,
            reference: 0,
            mask: 0xFF,
            write_mask: 0xFF,
        }
    }
}

/// BLEND_CONFIG: color blending configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendConfig {
    pub src_factor: BlendFactorE,
    pub dst_factor: BlendFactorE,
    pub src_a_factor: BlendFactorE,
    pub dst_a_factor: BlendFactorE,
    pub enabled: bool,
    pub blend_op: BlendOpE,
    pub blend_a_op: BlendOpE,
    /// RGBA write enables, bit 0 = R.
    pub color_write_mask: u8,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            src_factor: BlendFactorE::One,
            dst_factor: BlendFactorE::Zero,
            src_a_factor: BlendFactorE::One,
            dst_a_factor: BlendFactorE::Zero,
            enabled: false,
            blend_op: BlendOpE::Add,
            blend_a_op: BlendOpE::Add,
            color_write_mask: 0xF,
        }
    }
}

/// Identifies one configuration block of the CSR window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockId {
    Index,
    Topology,
    Attribute(AttributeSlot),
    VertexTransform,
    Material,
    Light(u8),
    Primitive,
    Framebuffer,
    DepthTest,
    StencilFront,
    StencilBack,
    Blend,
}

/// The contents of one configuration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterBlock {
    Index(IndexConfig),
    Topology(TopologyConfig),
    Attribute(AttributeSlot, InputAttribute),
    VertexTransform(VertexTransformConfig),
    Material(MaterialConfig),
    Light(u8, LightConfig),
    Primitive(PrimitiveConfig),
    Framebuffer(FramebufferConfig),
    DepthTest(DepthTestConfig),
    StencilFront(StencilConfig),
    StencilBack(StencilConfig),
    Blend(BlendConfig),
}

impl RegisterBlock {
    /// The block this value is written to.
    #[must_use]
    pub const fn id(&self) -> BlockId {
        match self {
            RegisterBlock::Index(_) => BlockId::Index,
            RegisterBlock::Topology(_) => BlockId::Topology,
            RegisterBlock::Attribute(slot, _) => BlockId::Attribute(*slot),
            RegisterBlock::VertexTransform(_) => BlockId::VertexTransform,
            RegisterBlock::Material(_) => BlockId::Material,
            RegisterBlock::Light(index, _) => BlockId::Light(*index),
            RegisterBlock::Primitive(_) => BlockId::Primitive,
            RegisterBlock::Framebuffer(_) => BlockId::Framebuffer,
            RegisterBlock::DepthTest(_) => BlockId::DepthTest,
            RegisterBlock::StencilFront(_) => BlockId::StencilFront,
            RegisterBlock::StencilBack(_) => BlockId::StencilBack,
            RegisterBlock::Blend(_) => BlockId::Blend,
        }
    }

    /// The power-on contents of a block.
    #[must_use]
    pub fn reset_value(id: BlockId) -> Self {
        match id {
            BlockId::Index => RegisterBlock::Index(IndexConfig::default()),
            BlockId::Topology => RegisterBlock::Topology(TopologyConfig::default()),
            BlockId::Attribute(slot) => RegisterBlock::Attribute(slot, InputAttribute::default()),
            BlockId::VertexTransform => {
                RegisterBlock::VertexTransform(VertexTransformConfig::default())
            }
            BlockId::Material => RegisterBlock::Material(MaterialConfig::default()),
            BlockId::Light(index) => RegisterBlock::Light(index, LightConfig::default()),
            BlockId::Primitive => RegisterBlock::Primitive(PrimitiveConfig::default()),
            BlockId::Framebuffer => RegisterBlock::Framebuffer(FramebufferConfig::default()),
            BlockId::DepthTest => RegisterBlock::DepthTest(DepthTestConfig::default()),
            BlockId::StencilFront => RegisterBlock::StencilFront(StencilConfig::default()),
            BlockId::StencilBack => RegisterBlock::StencilBack(StencilConfig::default()),
            BlockId::Blend => RegisterBlock::Blend(BlendConfig::default()),
        }
    }
}
