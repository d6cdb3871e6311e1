//! The rendering context: owns the device, the state cache and the buffer
//! table, and sequences every call that reaches hardware.

use bitflags::bitflags;
use log::{debug, info};
use pixelforge_hal::{DeviceMemory, DisplayDma, RegisterInterface};
use pixelforge_registers::{BlockId, PipelineStage, RegisterBlock};

use super::buffer::{BufferTable, BufferTarget, BufferUsage};
use super::draw::{self, DrawMode, DrawSource, DrawStatus, IndexType};
use super::state::{DirtyFlags, GpuState};
use super::upload::flush_dirty;
use crate::config::ContextConfig;
use crate::gpu::{CancelToken, Device, GpuError, Pacer};

bitflags! {
    /// Buffers affected by [`Context::clear`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearMask: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Depth bits of a D16_X8_S8 word.
const DEPTH_MASK: u32 = 0x0000_FFFF;
/// Stencil bits of a D16_X8_S8 word.
const STENCIL_MASK: u32 = 0xFF00_0000;
const STENCIL_SHIFT: u32 = 24;

/// Pack a clear color as `A<<24 | R<<16 | G<<8 | B`.
pub fn pack_color(color: [f32; 4]) -> u32 {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u32;
    let [r, g, b, a] = color;
    (channel(a) << 24) | (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

fn fill_words(bytes: &mut [u8], mut word: impl FnMut(u32) -> u32) {
    for chunk in bytes.chunks_exact_mut(4) {
        let mut current = [0u8; 4];
        current.copy_from_slice(chunk);
        let next = word(u32::from_le_bytes(current));
        chunk.copy_from_slice(&next.to_le_bytes());
    }
}

/// A rendering context bound to one device.
///
/// All calls are synchronous. State setters only touch the cache; draws,
/// uploads, clears and swaps wait for the pipeline stages they would
/// otherwise race with.
pub struct Context<B, M>
where
    B: RegisterInterface + DisplayDma,
    M: DeviceMemory,
{
    pub(crate) device: Device<B, M>,
    pub(crate) state: GpuState,
    pub(crate) buffers: BufferTable,
    config: ContextConfig,
}

impl<B, M> Context<B, M>
where
    B: RegisterInterface + DisplayDma,
    M: DeviceMemory,
{
    /// Open the device and start from default state.
    pub fn open(board: B, memory: M, config: ContextConfig) -> Result<Self, GpuError<B::Error>> {
        Self::open_with_cancel(board, memory, config, CancelToken::new())
    }

    /// Like [`Context::open`], with waits observing an existing token.
    pub fn open_with_cancel(
        board: B,
        memory: M,
        config: ContextConfig,
        cancel: CancelToken,
    ) -> Result<Self, GpuError<B::Error>> {
        let device = Device::open(board, memory, &config, cancel)?;
        let (width, height) = device.resolution();
        Ok(Self {
            device,
            state: GpuState::new(width, height),
            buffers: BufferTable::new(),
            config,
        })
    }

    /// Drain the pipeline and release the device.
    pub fn shutdown(self) -> Result<(B, M), GpuError<B::Error>> {
        info!("context shutdown");
        self.device.close()
    }

    pub fn state(&self) -> &GpuState {
        &self.state
    }

    pub fn buffers(&self) -> &BufferTable {
        &self.buffers
    }

    pub fn device(&self) -> &Device<B, M> {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut Device<B, M> {
        &mut self.device
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Token that aborts this context's waits when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.device.cancel_token()
    }

    pub fn set_pacer(&mut self, pacer: Box<dyn Pacer>) {
        self.device.set_pacer(pacer);
    }

    pub fn gen_buffers(&mut self, n: usize) -> Vec<u32> {
        (0..n).map(|_| self.buffers.create()).collect()
    }

    /// Delete buffers, unbinding them from every binding point and
    /// attribute slot. Unknown ids are skipped.
    pub fn delete_buffers(&mut self, ids: &[u32]) {
        for &id in ids {
            if self.buffers.delete(id) {
                self.state.detach_buffer(id);
                debug!("buffer {} deleted", id);
            }
        }
    }

    pub fn bind_buffer(&mut self, target: BufferTarget, id: u32) {
        self.buffers.bind(target, id);
    }

    /// Size the bound buffer to `size` bytes and upload `data` into it.
    ///
    /// At most `size` bytes of `data` are copied. Nothing happens when no
    /// buffer is bound to `target`.
    pub fn buffer_data(
        &mut self,
        target: BufferTarget,
        size: usize,
        data: Option<&[u8]>,
        _usage: BufferUsage,
    ) -> Result<(), GpuError<B::Error>> {
        let block = self
            .buffers
            .reserve(
                target,
                size,
                self.device.arena_mut(),
                self.config.buffer_align,
            )
            .map_err(GpuError::Memory)?;
        let (Some(block), Some(data)) = (block, data) else {
            return Ok(());
        };
        let len = data.len().min(size);
        self.device.wait_for_stage(PipelineStage::InputAssembly)?;
        self.device.arena_mut().host_mut(&block)[..len].copy_from_slice(&data[..len]);
        Ok(())
    }

    /// Overwrite part of the bound buffer. Out-of-range updates are ignored.
    pub fn buffer_sub_data(
        &mut self,
        target: BufferTarget,
        offset: usize,
        data: &[u8],
    ) -> Result<(), GpuError<B::Error>> {
        let Some(block) = self.buffers.sub_range(target, offset, data.len()) else {
            debug!(
                "sub-data of {} bytes at {} on {:?} ignored",
                data.len(),
                offset,
                target
            );
            return Ok(());
        };
        self.device.wait_for_stage(PipelineStage::InputAssembly)?;
        self.device.arena_mut().host_mut(&block).copy_from_slice(data);
        Ok(())
    }

    pub fn draw_arrays(
        &mut self,
        mode: DrawMode,
        first: u32,
        count: u32,
    ) -> Result<DrawStatus, GpuError<B::Error>> {
        draw::submit(
            &mut self.device,
            &mut self.state,
            &self.buffers,
            mode,
            count,
            DrawSource::Arrays { first },
        )
    }

    /// Indexed draw reading indices from the bound element buffer at byte
    /// `offset`.
    pub fn draw_elements(
        &mut self,
        mode: DrawMode,
        count: u32,
        index_type: IndexType,
        offset: usize,
    ) -> Result<DrawStatus, GpuError<B::Error>> {
        draw::submit(
            &mut self.device,
            &mut self.state,
            &self.buffers,
            mode,
            count,
            DrawSource::Elements { index_type, offset },
        )
    }

    /// Commit dirty state without drawing.
    pub fn flush(&mut self) -> Result<(), GpuError<B::Error>> {
        flush_dirty(&mut self.device, &mut self.state)
    }

    /// Block until the pipeline is idle.
    pub fn finish(&mut self) -> Result<(), GpuError<B::Error>> {
        self.device.wait_for_stage(PipelineStage::PerPixel)
    }

    /// Fill the selected render-target buffers with the clear values.
    pub fn clear(&mut self, mask: ClearMask) -> Result<(), GpuError<B::Error>> {
        if mask.is_empty() {
            return Ok(());
        }
        self.device.wait_for_stage(PipelineStage::PerPixel)?;

        let clear = self.state.clear;
        if mask.contains(ClearMask::COLOR) {
            let packed = pack_color(clear.color);
            fill_words(self.device.render_target_mut(), |_| packed);
        }

        // A partial clear rewrites only its own field; a full one the whole word.
        let mut keep = !0u32;
        let mut value = 0u32;
        if mask.contains(ClearMask::DEPTH) {
            keep &= !DEPTH_MASK;
            value |= (clear.depth.clamp(0.0, 1.0) * 65535.0) as u32;
        }
        if mask.contains(ClearMask::STENCIL) {
            keep &= !STENCIL_MASK;
            value |= u32::from(clear.stencil) << STENCIL_SHIFT;
        }
        if mask.contains(ClearMask::DEPTH | ClearMask::STENCIL) {
            keep = 0;
        }
        if mask.intersects(ClearMask::DEPTH | ClearMask::STENCIL) {
            fill_words(self.device.depth_stencil_mut(), |word| {
                (word & keep) | value
            });
        }
        Ok(())
    }

    /// Drain the pipeline and present the rendered frame.
    pub fn swap_buffers(&mut self) -> Result<(), GpuError<B::Error>> {
        self.device.wait_for_stage(PipelineStage::PerPixel)?;
        // Roles rotate even when the swap-idle wait fails, so the next draw
        // must pick up the new render target either way.
        self.state.mark(DirtyFlags::FRAMEBUFFER);
        self.device.swap()
    }

    /// Non-blocking check of the READY register.
    pub fn is_idle(&mut self) -> Result<bool, GpuError<B::Error>> {
        Ok(self.device.board_mut().ready()?)
    }

    /// Raw readiness of the inter-stage streams, for diagnostics.
    pub fn stream_readiness(&mut self) -> Result<u32, GpuError<B::Error>> {
        Ok(self.device.board_mut().ready_vector()?)
    }

    /// Read a configuration block back from the hardware.
    pub fn read_block(&mut self, id: BlockId) -> Result<RegisterBlock, GpuError<B::Error>> {
        Ok(self.device.board_mut().read_block(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_color() {
        assert_eq!(pack_color([0.0, 0.0, 0.0, 1.0]), 0xFF00_0000);
        assert_eq!(pack_color([1.0, 0.5, 0.0, 1.0]), 0xFFFF_7F00);
        assert_eq!(pack_color([2.0, -1.0, 0.0, 0.0]), 0x00FF_0000);
    }

    #[test]
    fn test_fill_words_keeps_masked_bits() {
        let mut bytes = [0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
        fill_words(&mut bytes, |w| (w & STENCIL_MASK) | 0xFFFF);
        assert_eq!(bytes, [0xFF, 0xFF, 0x00, 0x44, 0xFF, 0xFF, 0x00, 0x88]);
    }
}
