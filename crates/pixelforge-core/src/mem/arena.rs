//! Append-only allocator over the device-memory pool.

use log::warn;
use pixelforge_hal::DeviceMemory;

use super::{align_up, MemoryError};

/// Alignment used when the caller passes zero.
pub const DEFAULT_ALIGN: usize = 4;

/// One region carved out of the arena.
///
/// The same bytes are visible to the host at `host_offset` and to the
/// accelerator at `device_address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBlock {
    pub device_address: u32,
    pub host_offset: usize,
    pub size: usize,
}

impl MemoryBlock {
    /// One past the last host byte.
    pub fn host_end(&self) -> usize {
        self.host_offset + self.size
    }
}

/// Bump allocator. Regions are never freed individually; dropping the arena
/// releases the whole pool.
pub struct Arena<M: DeviceMemory> {
    memory: M,
    offset: usize,
}

impl<M: DeviceMemory> Arena<M> {
    pub fn new(memory: M) -> Self {
        Self { memory, offset: 0 }
    }

    /// Carve `size` bytes aligned to `align` (zero means [`DEFAULT_ALIGN`]).
    ///
    /// On failure the arena is left untouched.
    pub fn allocate(&mut self, size: usize, align: usize) -> Result<MemoryBlock, MemoryError> {
        let align = if align == 0 { DEFAULT_ALIGN } else { align };
        if !align.is_power_of_two() {
            return Err(MemoryError::InvalidAlignment(align));
        }

        let capacity = self.capacity();
        let start = align_up(self.offset, align).ok_or(MemoryError::SizeOverflow)?;
        let end = start.checked_add(size).ok_or(MemoryError::SizeOverflow)?;
        if end > capacity {
            warn!(
                "arena exhausted: {} bytes at {:#x}, capacity {:#x}",
                size, start, capacity
            );
            return Err(MemoryError::Exhausted {
                requested: size,
                available: capacity.saturating_sub(start),
            });
        }
        let device_address = u32::try_from(start)
            .ok()
            .and_then(|off| self.memory.device_base().checked_add(off))
            .ok_or(MemoryError::SizeOverflow)?;

        self.offset = end;
        Ok(MemoryBlock {
            device_address,
            host_offset: start,
            size,
        })
    }

    pub fn capacity(&self) -> usize {
        self.memory.len()
    }

    /// Bytes handed out so far, alignment padding included.
    pub fn used(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.offset
    }

    pub fn device_base(&self) -> u32 {
        self.memory.device_base()
    }

    /// Host view of a block.
    pub fn host(&self, block: &MemoryBlock) -> &[u8] {
        &self.memory.bytes()[block.host_offset..block.host_end()]
    }

    /// Mutable host view of a block.
    pub fn host_mut(&mut self, block: &MemoryBlock) -> &mut [u8] {
        &mut self.memory.bytes_mut()[block.host_offset..block.host_end()]
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Release the pool.
    pub fn into_inner(self) -> M {
        self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::HostMemory;

    const BASE: u32 = 0x3000_0000;

    #[test]
    fn test_exhaustion_leaves_offset() {
        let mut arena = Arena::new(HostMemory::new(BASE, 1024));
        let first = arena.allocate(100, 16).unwrap();
        assert_eq!(first.host_offset, 0);
        assert_eq!(first.device_address, BASE);
        assert_eq!(arena.used(), 100);

        let err = arena.allocate(1000, 16).unwrap_err();
        assert_eq!(
            err,
            MemoryError::Exhausted {
                requested: 1000,
                available: 1024 - 112
            }
        );
        assert_eq!(arena.used(), 100);

        let next = arena.allocate(8, 16).unwrap();
        assert_eq!(next.host_offset, 112, "aligned offset after failed request");
    }

    #[test]
    fn test_blocks_disjoint_and_aligned() {
        let mut arena = Arena::new(HostMemory::new(BASE, 64 * 1024));
        let mut blocks = Vec::new();
        for (size, align) in [(3, 1), (17, 16), (4096, 4096), (5, 0), (100, 64)] {
            let b = arena.allocate(size, align).unwrap();
            let align = if align == 0 { DEFAULT_ALIGN } else { align };
            assert_eq!(b.host_offset % align, 0);
            assert!(b.host_end() <= arena.capacity());
            blocks.push(b);
        }
        for (i, a) in blocks.iter().enumerate() {
            for b in &blocks[i + 1..] {
                assert!(a.host_end() <= b.host_offset || b.host_end() <= a.host_offset);
            }
        }
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let mut arena = Arena::new(HostMemory::new(BASE, 256));
        assert_eq!(
            arena.allocate(8, 24),
            Err(MemoryError::InvalidAlignment(24))
        );
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn test_host_view_writes_pool() {
        let mut arena = Arena::new(HostMemory::new(BASE, 256));
        let _ = arena.allocate(16, 16).unwrap();
        let b = arena.allocate(4, 16).unwrap();
        arena.host_mut(&b).copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(&arena.memory().bytes()[16..20], &[1, 2, 3, 4]);
        assert_eq!(arena.host(&b), &[1, 2, 3, 4]);
    }
}
