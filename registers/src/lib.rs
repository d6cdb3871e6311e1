//! PixelForge pipeline register definitions.
//!
//! Field enums, configuration block layouts and pipeline status types shared
//! by the HAL and the driver core.
#![no_std]

pub mod blocks;
pub mod components;
pub mod encode;
pub mod stage;

pub use blocks::{
    AttributeSlot, BlendConfig, BlockId, DepthTestConfig, FramebufferConfig, IndexConfig,
    InputAttribute, LightConfig, MaterialConfig, PrimitiveConfig, RegisterBlock, StencilConfig,
    TopologyConfig, VertexTransformConfig, NUM_LIGHTS,
};
pub use components::blend_factor_e::BlendFactorE;
pub use components::blend_op_e::BlendOpE;
pub use components::compare_op_e::CompareOpE;
pub use components::cull_face_e::CullFaceE;
pub use components::front_face_e::FrontFaceE;
pub use components::index_kind_e::IndexKindE;
pub use components::input_mode_e::InputModeE;
pub use components::input_topology_e::InputTopologyE;
pub use components::primitive_type_e::PrimitiveTypeE;
pub use components::stencil_op_e::StencilOpE;
pub use fixed::types::I16F16;
pub use stage::{PipelineStage, ReadyVector};
