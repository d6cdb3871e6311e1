//! Heap-backed device memory.

use pixelforge_hal::DeviceMemory;

/// Size of the accelerator's device-memory window.
pub const PF_VRAM_SIZE: usize = 64 * 1024 * 1024;

/// Device memory backed by a host allocation.
///
/// Used for simulation and tests, and on platforms where the DMA region is
/// copied rather than mapped.
#[derive(Debug, Clone)]
pub struct HostMemory {
    base: u32,
    bytes: Vec<u8>,
}

impl HostMemory {
    pub fn new(base: u32, size: usize) -> Self {
        Self {
            base,
            bytes: vec![0; size],
        }
    }

    /// A full-size VRAM window at `base`.
    pub fn vram(base: u32) -> Self {
        Self::new(base, PF_VRAM_SIZE)
    }
}

impl DeviceMemory for HostMemory {
    fn device_base(&self) -> u32 {
        self.base
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vram_window() {
        let vram = HostMemory::vram(0x3000_0000);
        assert_eq!(vram.len(), PF_VRAM_SIZE);
        assert_eq!(vram.device_base(), 0x3000_0000);
        assert!(!vram.is_empty());
    }
}
