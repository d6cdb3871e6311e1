//! Field enums of the PixelForge pipeline configuration blocks

pub mod blend_factor_e;
pub mod blend_op_e;
pub mod compare_op_e;
pub mod cull_face_e;
pub mod front_face_e;
pub mod index_kind_e;
pub mod input_mode_e;
pub mod input_topology_e;
pub mod primitive_type_e;
pub mod stencil_op_e;
