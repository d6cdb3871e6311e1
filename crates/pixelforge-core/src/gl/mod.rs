//! Fixed-function drawing API over the accelerator.

pub mod buffer;
pub mod context;
pub mod draw;
pub mod fixed_function;
pub mod state;
pub mod upload;

pub use self::buffer::{BufferObject, BufferTable, BufferTarget, BufferUsage};
pub use self::context::{ClearMask, Context};
pub use self::draw::{DrawMode, DrawSource, DrawStatus, IndexType, SkipReason};
pub use self::state::{
    AttributeBinding, AttributeLayout, Capability, CullFaceMode, DirtyFlags, GpuState,
    LightParam, MaterialParam, MatrixMode,
};
