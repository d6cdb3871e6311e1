#![no_std]

use pixelforge_registers::{BlockId, ReadyVector, RegisterBlock};

/// Abstracts the memory-mapped CSR window of the graphics pipeline.
///
/// Implementations own the register window and marshal each configuration
/// block to and from its 32-bit registers.
pub trait RegisterInterface {
    type Error: core::fmt::Debug;

    /// Write one configuration block.
    fn write_block(&mut self, block: &RegisterBlock) -> Result<(), Self::Error>;

    /// Read one configuration block back.
    fn read_block(&mut self, id: BlockId) -> Result<RegisterBlock, Self::Error>;

    /// Pulse the START register, launching a draw with the current configuration.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// READY: true when the whole pipeline is idle.
    fn ready(&mut self) -> Result<bool, Self::Error>;

    /// READY_COMPONENTS: per-stage idle bits, one per pipeline stage.
    fn ready_components(&mut self) -> Result<ReadyVector, Self::Error>;

    /// READY_VEC: raw readiness of the inter-stage stream interfaces.
    fn ready_vector(&mut self) -> Result<u32, Self::Error>;
}

/// Abstracts the display scan-out DMA engine.
///
/// Register accesses are plain MMIO and cannot fail.
pub trait DisplayDma {
    /// Scan-out resolution in pixels, (x, y).
    fn resolution(&self) -> (u16, u16);

    /// Program the buffer to display after the next swap.
    fn set_back_buffer(&mut self, address: u32);

    /// Request a swap at the next vertical blank.
    fn trigger_swap(&mut self);

    /// Returns true while a requested swap has not happened yet.
    fn is_swap_busy(&self) -> bool;
}

/// A contiguous, physically addressed memory region shared with the device.
pub trait DeviceMemory {
    /// Device (bus) address of the first byte.
    fn device_base(&self) -> u32;

    /// Host view of the region.
    fn bytes(&self) -> &[u8];

    /// Mutable host view of the region.
    fn bytes_mut(&mut self) -> &mut [u8];

    /// Region size in bytes.
    fn len(&self) -> usize {
        self.bytes().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
