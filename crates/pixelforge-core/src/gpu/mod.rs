//! Accelerator-facing layer: hazard synchronization and the display
//! swapchain.

pub mod device;
pub mod error;
pub mod sync;

pub use self::device::{Device, SwapRoles};
pub use self::error::{GpuError, WaitTarget};
pub use self::sync::{CancelToken, HazardSync, Pacer, ThreadSleep};
