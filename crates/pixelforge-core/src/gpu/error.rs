use core::fmt;

use pixelforge_registers::PipelineStage;

use crate::mem::MemoryError;

/// What a blocking wait was waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTarget {
    /// A pipeline stage (and every stage before it) draining.
    Stage(PipelineStage),
    /// The display engine finishing a requested swap.
    SwapIdle,
}

impl fmt::Display for WaitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitTarget::Stage(stage) => write!(f, "{stage:?} drain"),
            WaitTarget::SwapIdle => f.write_str("swap idle"),
        }
    }
}

/// Runtime errors, generic over the register transport error.
#[derive(Debug, thiserror::Error)]
pub enum GpuError<E: fmt::Debug> {
    /// Register access failed.
    #[error("register transport error: {0:?}")]
    Transport(E),

    /// A wait was aborted through the cancellation token. State may be
    /// partly committed; the frame must be abandoned.
    #[error("wait for {target} cancelled")]
    Cancelled { target: WaitTarget },

    /// A bounded wait ran out of polls.
    #[error("wait for {target} timed out after {polls} polls")]
    Timeout { target: WaitTarget, polls: u32 },

    /// Device memory could not be reserved.
    #[error("device memory: {0}")]
    Memory(#[source] MemoryError),

    /// The display reported a zero-sized scan-out.
    #[error("display reports an empty resolution")]
    InvalidResolution,
}

impl<E: fmt::Debug> From<E> for GpuError<E> {
    fn from(e: E) -> Self {
        Self::Transport(e)
    }
}
