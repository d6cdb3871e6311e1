//! Device lifecycle and triple-buffered presentation.

use std::time::Duration;

use log::{debug, info};
use pixelforge_hal::{DeviceMemory, DisplayDma, RegisterInterface};
use pixelforge_registers::{PipelineStage, RegisterBlock};

use super::error::GpuError;
use super::sync::{CancelToken, HazardSync, Pacer};
use crate::config::{ContextConfig, SwapMode, BYTES_PER_PIXEL};
use crate::mem::{Arena, MemoryBlock};

/// Number of rotating color buffers.
pub const NUM_COLOR_BUFFERS: usize = 3;

/// Which color buffer plays which presentation role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRoles {
    pub previous: usize,
    pub current: usize,
    pub render: usize,
}

impl SwapRoles {
    pub const INITIAL: Self = Self {
        previous: 0,
        current: 1,
        render: 2,
    };

    /// Roles after one swap: the rendered buffer goes on screen, the
    /// displayed one becomes the previous one, and the previous one is
    /// rendered into next.
    #[must_use]
    pub const fn rotate(self) -> Self {
        Self {
            previous: self.current,
            current: self.render,
            render: self.previous,
        }
    }
}

/// An opened accelerator: register window, display engine and the
/// device-memory pool with its render targets.
pub struct Device<B, M>
where
    B: RegisterInterface + DisplayDma,
    M: DeviceMemory,
{
    board: B,
    arena: Arena<M>,
    sync: HazardSync,
    width: u16,
    height: u16,
    stride: usize,
    color: [MemoryBlock; NUM_COLOR_BUFFERS],
    depth_stencil: MemoryBlock,
    roles: SwapRoles,
    swap_mode: SwapMode,
    swap_poll_interval: Duration,
}

impl<B, M> Device<B, M>
where
    B: RegisterInterface + DisplayDma,
    M: DeviceMemory,
{
    /// Reserve the render targets and show the first buffer.
    ///
    /// Three page-aligned color buffers and one depth/stencil buffer are
    /// carved from `memory` and zeroed.
    pub fn open(
        mut board: B,
        memory: M,
        config: &ContextConfig,
        cancel: CancelToken,
    ) -> Result<Self, GpuError<B::Error>> {
        let (width, height) = board.resolution();
        if width == 0 || height == 0 {
            return Err(GpuError::InvalidResolution);
        }
        let stride = usize::from(width) * BYTES_PER_PIXEL;
        if u16::try_from(stride).is_err() {
            return Err(GpuError::InvalidResolution);
        }
        let buffer_size = stride * usize::from(height);

        let mut arena = Arena::new(memory);
        let reserve = |arena: &mut Arena<M>| -> Result<MemoryBlock, GpuError<B::Error>> {
            let block = arena
                .allocate(buffer_size, config.framebuffer_align)
                .map_err(GpuError::Memory)?;
            arena.host_mut(&block).fill(0);
            Ok(block)
        };
        let color = [
            reserve(&mut arena)?,
            reserve(&mut arena)?,
            reserve(&mut arena)?,
        ];
        let depth_stencil = reserve(&mut arena)?;

        let roles = SwapRoles::INITIAL;
        board.set_back_buffer(color[roles.current].device_address);
        board.trigger_swap();

        info!(
            "device open: {}x{}, vram base {:#010x}, color buffers {:#010x} {:#010x} {:#010x}, depth/stencil {:#010x}",
            width,
            height,
            arena.device_base(),
            color[0].device_address,
            color[1].device_address,
            color[2].device_address,
            depth_stencil.device_address
        );

        Ok(Self {
            board,
            arena,
            sync: HazardSync::new(config.wait, cancel),
            width,
            height,
            stride,
            color,
            depth_stencil,
            roles,
            swap_mode: config.swap_mode,
            swap_poll_interval: config.swap_poll_interval,
        })
    }

    /// Drain the pipeline and hand back the board and the memory pool.
    pub fn close(mut self) -> Result<(B, M), GpuError<B::Error>> {
        self.wait_for_stage(PipelineStage::PerPixel)?;
        info!("device closed");
        Ok((self.board, self.arena.into_inner()))
    }

    pub fn wait_for_stage(&mut self, stage: PipelineStage) -> Result<(), GpuError<B::Error>> {
        self.sync.wait_for_stage(&mut self.board, stage)
    }

    pub fn write_block(&mut self, block: &RegisterBlock) -> Result<(), GpuError<B::Error>> {
        self.board.write_block(block)?;
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), GpuError<B::Error>> {
        self.board.start()?;
        Ok(())
    }

    /// Present the render buffer and rotate the buffer roles.
    ///
    /// In [`SwapMode::Vsync`] this blocks until the display engine has
    /// taken the new buffer. Callers drain the pipeline first.
    pub fn swap(&mut self) -> Result<(), GpuError<B::Error>> {
        let presented = self.color[self.roles.render].device_address;
        self.board.set_back_buffer(presented);
        self.board.trigger_swap();
        self.roles = self.roles.rotate();
        debug!("swap to {:#010x}, roles {:?}", presented, self.roles);

        if self.swap_mode == SwapMode::Vsync {
            self.sync
                .wait_swap_idle::<B, B::Error>(&self.board, self.swap_poll_interval)?;
        }
        Ok(())
    }

    pub fn resolution(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Bytes per framebuffer line.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn buffer_size(&self) -> usize {
        self.stride * usize::from(self.height)
    }

    pub fn roles(&self) -> SwapRoles {
        self.roles
    }

    pub fn color_buffers(&self) -> &[MemoryBlock; NUM_COLOR_BUFFERS] {
        &self.color
    }

    pub fn render_buffer(&self) -> MemoryBlock {
        self.color[self.roles.render]
    }

    pub fn displayed_buffer(&self) -> MemoryBlock {
        self.color[self.roles.current]
    }

    pub fn depth_stencil(&self) -> MemoryBlock {
        self.depth_stencil
    }

    /// Host view of the buffer being rendered into.
    pub fn render_target_mut(&mut self) -> &mut [u8] {
        let block = self.render_buffer();
        self.arena.host_mut(&block)
    }

    pub fn depth_stencil_mut(&mut self) -> &mut [u8] {
        let block = self.depth_stencil;
        self.arena.host_mut(&block)
    }

    pub fn arena(&self) -> &Arena<M> {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena<M> {
        &mut self.arena
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    /// Direct register access, bypassing the state cache.
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.sync.cancel_token().clone()
    }

    pub fn set_pacer(&mut self, pacer: Box<dyn Pacer>) {
        self.sync.set_pacer(pacer);
    }
}
