//! Device-memory management: the bump arena and the general block pool.

pub mod arena;
pub mod block;
pub mod host;

pub use self::arena::{Arena, MemoryBlock};
pub use self::block::{BlockInfo, BlockPool};
pub use self::host::HostMemory;

/// Allocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("out of memory: requested {requested} bytes, {available} available")]
    Exhausted { requested: usize, available: usize },

    #[error("zero-sized allocation")]
    ZeroSize,

    #[error("allocation size overflows")]
    SizeOverflow,

    #[error("alignment {0} is not a power of two")]
    InvalidAlignment(usize),

    #[error("no live block at offset {0:#x}")]
    InvalidBlock(usize),

    #[error("region of {0} bytes cannot hold a block header")]
    RegionTooSmall(usize),
}

/// Round `value` up to a multiple of the power of two `align`.
pub(crate) fn align_up(value: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    Some(value.checked_add(align - 1)? & !(align - 1))
}
