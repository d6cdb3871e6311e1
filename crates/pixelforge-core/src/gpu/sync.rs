//! Pipeline hazard synchronization.
//!
//! The only coordination with the hardware pipeline is polling its
//! readiness bits. Every wait can be aborted through a [`CancelToken`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{trace, warn};
use pixelforge_hal::{DisplayDma, RegisterInterface};
use pixelforge_registers::PipelineStage;

use super::error::{GpuError, WaitTarget};
use crate::config::WaitPolicy;

/// Shared "keep running" flag. Cancelling it aborts any wait in progress.
#[derive(Debug, Clone)]
pub struct CancelToken {
    keep_running: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            keep_running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Request that every wait observing this token gives up.
    pub fn cancel(&self) {
        self.keep_running.store(false, Ordering::SeqCst);
    }

    /// Re-arm after a cancellation has been handled.
    pub fn reset(&self) {
        self.keep_running.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        !self.keep_running.load(Ordering::SeqCst)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Sleep strategy between two readiness polls.
pub trait Pacer {
    fn pause(&mut self, interval: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Pacer for ThreadSleep {
    fn pause(&mut self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

enum PollOutcome {
    Ready,
    Cancelled,
    Exhausted(u32),
}

/// Blocks until pipeline stages drain or a requested swap lands.
pub struct HazardSync {
    policy: WaitPolicy,
    cancel: CancelToken,
    pacer: Box<dyn Pacer>,
}

impl HazardSync {
    pub fn new(policy: WaitPolicy, cancel: CancelToken) -> Self {
        Self::with_pacer(policy, cancel, Box::new(ThreadSleep))
    }

    pub fn with_pacer(policy: WaitPolicy, cancel: CancelToken, pacer: Box<dyn Pacer>) -> Self {
        Self {
            policy,
            cancel,
            pacer,
        }
    }

    pub fn policy(&self) -> WaitPolicy {
        self.policy
    }

    pub fn set_pacer(&mut self, pacer: Box<dyn Pacer>) {
        self.pacer = pacer;
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    fn poll<E>(
        &mut self,
        interval: Duration,
        mut probe: impl FnMut() -> Result<bool, E>,
    ) -> Result<PollOutcome, E> {
        let mut polls = 0u32;
        loop {
            if self.cancel.is_cancelled() {
                return Ok(PollOutcome::Cancelled);
            }
            if probe()? {
                return Ok(PollOutcome::Ready);
            }
            polls += 1;
            if self.policy.max_polls.is_some_and(|max| polls >= max) {
                return Ok(PollOutcome::Exhausted(polls));
            }
            self.pacer.pause(interval);
        }
    }

    fn settle<E: core::fmt::Debug>(
        target: WaitTarget,
        outcome: PollOutcome,
    ) -> Result<(), GpuError<E>> {
        match outcome {
            PollOutcome::Ready => Ok(()),
            PollOutcome::Cancelled => {
                warn!("wait for {} cancelled", target);
                Err(GpuError::Cancelled { target })
            }
            PollOutcome::Exhausted(polls) => {
                warn!("wait for {} timed out after {} polls", target, polls);
                Err(GpuError::Timeout { target, polls })
            }
        }
    }

    /// Block until `stage` and every stage before it report ready.
    pub fn wait_for_stage<R: RegisterInterface>(
        &mut self,
        regs: &mut R,
        stage: PipelineStage,
    ) -> Result<(), GpuError<R::Error>> {
        let interval = self.policy.poll_interval;
        let outcome = self.poll(interval, || {
            let ready = regs.ready_components()?;
            trace!("ready components {:#x}, waiting for {:?}", ready.0, stage);
            Ok::<_, R::Error>(ready.is_drained(stage))
        })?;
        Self::settle(WaitTarget::Stage(stage), outcome)
    }

    /// Block until the display engine has no swap pending.
    pub fn wait_swap_idle<D: DisplayDma, E: core::fmt::Debug>(
        &mut self,
        display: &D,
        interval: Duration,
    ) -> Result<(), GpuError<E>> {
        let outcome = self.poll(interval, || Ok::<_, E>(!display.is_swap_busy()))?;
        Self::settle(WaitTarget::SwapIdle, outcome)
    }
}
