//! Runtime configuration.

use core::time::Duration;

/// Default pause between readiness polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(50);
/// Default pause between swap-busy polls.
pub const DEFAULT_SWAP_POLL_INTERVAL: Duration = Duration::from_micros(10);
/// Host page size; framebuffers and buffer objects are page aligned.
pub const PAGE_SIZE: usize = 4096;
/// Framebuffer pixel size (32-bit BGRA).
pub const BYTES_PER_PIXEL: usize = 4;

/// How long a hazard wait may poll before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Pause between two readiness samples.
    pub poll_interval: Duration,
    /// Upper bound on samples; `None` waits until drained or cancelled.
    pub max_polls: Option<u32>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
        }
    }
}

impl WaitPolicy {
    /// Bounded policy: fail with a timeout after `max_polls` samples.
    pub fn bounded(poll_interval: Duration, max_polls: u32) -> Self {
        Self {
            poll_interval,
            max_polls: Some(max_polls),
        }
    }
}

/// Presentation behaviour of `swap_buffers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwapMode {
    /// Request the swap, then wait until the display has taken it.
    #[default]
    Vsync,
    /// Request the swap immediately.
    Immediate,
}

/// Configuration for a [`crate::Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextConfig {
    pub wait: WaitPolicy,
    pub swap_mode: SwapMode,
    pub swap_poll_interval: Duration,
    /// Alignment of the color and depth/stencil buffers in device memory.
    pub framebuffer_align: usize,
    /// Alignment of buffer object storage in device memory.
    pub buffer_align: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            wait: WaitPolicy::default(),
            swap_mode: SwapMode::default(),
            swap_poll_interval: DEFAULT_SWAP_POLL_INTERVAL,
            framebuffer_align: PAGE_SIZE,
            buffer_align: PAGE_SIZE,
        }
    }
}

impl ContextConfig {
    pub fn with_wait(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_swap_mode(mut self, swap_mode: SwapMode) -> Self {
        self.swap_mode = swap_mode;
        self
    }

    pub fn with_swap_poll_interval(mut self, interval: Duration) -> Self {
        self.swap_poll_interval = interval;
        self
    }

    pub fn with_framebuffer_align(mut self, align: usize) -> Self {
        self.framebuffer_align = align;
        self
    }

    pub fn with_buffer_align(mut self, align: usize) -> Self {
        self.buffer_align = align;
        self
    }
}
