//! Recording mock board shared by the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use pixelforge_core::gpu::Pacer;
use pixelforge_core::{Context, ContextConfig, HostMemory};
use pixelforge_hal::{DisplayDma, RegisterInterface};
use pixelforge_registers::{BlockId, I16F16, ReadyVector, RegisterBlock};

pub const VRAM_BASE: u32 = 0x3000_0000;
pub const VRAM_SIZE: usize = 256 * 1024;

/// Everything the board observed, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Ready(u32),
    Write(BlockId),
    Start,
    BackBuffer(u32),
    TriggerSwap,
}

#[derive(Debug, Default)]
pub struct BoardLog {
    pub events: Vec<Event>,
    pub writes: Vec<RegisterBlock>,
    pub registers: HashMap<BlockId, RegisterBlock>,
    /// Readiness samples to return; all-ready once exhausted.
    pub ready_script: VecDeque<u32>,
    /// Swap-busy samples to return; idle once exhausted.
    pub busy_script: VecDeque<bool>,
    pub busy_polls: u32,
    pub fail_writes: bool,
}

impl BoardLog {
    pub fn written_ids(&self) -> Vec<BlockId> {
        self.writes.iter().map(RegisterBlock::id).collect()
    }

    pub fn starts(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Start).count()
    }

    pub fn back_buffers(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::BackBuffer(address) => Some(*address),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.writes.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Mock register window and display engine.
pub struct MockBoard {
    pub log: Rc<RefCell<BoardLog>>,
    pub resolution: (u16, u16),
}

impl MockBoard {
    pub fn new(width: u16, height: u16) -> (Self, Rc<RefCell<BoardLog>>) {
        let log = Rc::new(RefCell::new(BoardLog::default()));
        (
            Self {
                log: Rc::clone(&log),
                resolution: (width, height),
            },
            log,
        )
    }
}

impl RegisterInterface for MockBoard {
    type Error = MockError;

    fn write_block(&mut self, block: &RegisterBlock) -> Result<(), MockError> {
        let mut log = self.log.borrow_mut();
        if log.fail_writes {
            return Err(MockError);
        }
        log.events.push(Event::Write(block.id()));
        log.writes.push(*block);
        log.registers.insert(block.id(), *block);
        Ok(())
    }

    fn read_block(&mut self, id: BlockId) -> Result<RegisterBlock, MockError> {
        let log = self.log.borrow();
        Ok(log
            .registers
            .get(&id)
            .copied()
            .unwrap_or_else(|| RegisterBlock::reset_value(id)))
    }

    fn start(&mut self) -> Result<(), MockError> {
        self.log.borrow_mut().events.push(Event::Start);
        Ok(())
    }

    fn ready(&mut self) -> Result<bool, MockError> {
        Ok(self.ready_components()? == ReadyVector::ALL_READY)
    }

    fn ready_components(&mut self) -> Result<ReadyVector, MockError> {
        let mut log = self.log.borrow_mut();
        let sample = log
            .ready_script
            .pop_front()
            .unwrap_or(ReadyVector::ALL_READY.0);
        log.events.push(Event::Ready(sample));
        Ok(ReadyVector(sample))
    }

    fn ready_vector(&mut self) -> Result<u32, MockError> {
        Ok(0xFFFF)
    }
}

impl DisplayDma for MockBoard {
    fn resolution(&self) -> (u16, u16) {
        self.resolution
    }

    fn set_back_buffer(&mut self, address: u32) {
        self.log.borrow_mut().events.push(Event::BackBuffer(address));
    }

    fn trigger_swap(&mut self) {
        self.log.borrow_mut().events.push(Event::TriggerSwap);
    }

    fn is_swap_busy(&self) -> bool {
        let mut log = self.log.borrow_mut();
        log.busy_polls += 1;
        log.busy_script.pop_front().unwrap_or(false)
    }
}

/// Counts pauses instead of sleeping.
#[derive(Clone, Default)]
pub struct CountingPacer {
    pub pauses: Rc<Cell<u32>>,
}

impl Pacer for CountingPacer {
    fn pause(&mut self, _interval: Duration) {
        self.pauses.set(self.pauses.get() + 1);
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub type TestContext = Context<MockBoard, HostMemory>;

/// Context on a 32x16 mock board with a non-sleeping pacer.
pub fn open_context_with(
    config: ContextConfig,
) -> (TestContext, Rc<RefCell<BoardLog>>, CountingPacer) {
    init_logging();
    let (board, log) = MockBoard::new(32, 16);
    let mut ctx = Context::open(board, HostMemory::new(VRAM_BASE, VRAM_SIZE), config)
        .expect("context should open");
    let pacer = CountingPacer::default();
    ctx.set_pacer(Box::new(pacer.clone()));
    (ctx, log, pacer)
}

pub fn open_context() -> (TestContext, Rc<RefCell<BoardLog>>) {
    let (ctx, log, _) = open_context_with(ContextConfig::default());
    (ctx, log)
}

/// Q16.16 little-endian bytes of a vertex stream.
pub fn q16_bytes(values: &[[f32; 4]]) -> Vec<u8> {
    values
        .iter()
        .flatten()
        .flat_map(|v| I16F16::from_num(*v).to_bits().to_le_bytes())
        .collect()
}
