//! PixelForge host runtime.
//!
//! Sits between a fixed-function drawing API and the accelerator's CSR
//! window: caches pipeline state with per-category dirty tracking, gates
//! register commits on pipeline drain, and carves vertex, index and render
//! target memory out of the shared device-memory pool.

pub mod config;
pub mod gl;
pub mod gpu;
pub mod math;
pub mod mem;

pub use config::{ContextConfig, SwapMode, WaitPolicy};
pub use gl::{Context, DrawStatus, SkipReason};
pub use gpu::{Device, GpuError, WaitTarget};
pub use mem::{Arena, BlockPool, HostMemory, MemoryBlock, MemoryError};
