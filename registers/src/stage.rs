//! Pipeline stages and the cumulative readiness vector.

/// The four hardware pipeline stages, in pipeline order.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    InputAssembly = 0,
    VertexTransform = 1,
    PrepRaster = 2,
    PerPixel = 3,
}

impl PipelineStage {
    /// All stages, first to last.
    pub const ALL: [PipelineStage; 4] = [
        PipelineStage::InputAssembly,
        PipelineStage::VertexTransform,
        PipelineStage::PrepRaster,
        PipelineStage::PerPixel,
    ];

    /// Bits `0..=self` of the readiness vector.
    #[must_use]
    pub const fn drain_mask(self) -> u32 {
        (1u32 << (self as u32 + 1)) - 1
    }
}

/// Snapshot of the READY_COMPONENTS register.
///
/// Bit `n` is set while stage `n` has no work in flight. A stage only counts
/// as drained when every earlier stage is idle too, since an upstream stage
/// can still push work into it.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadyVector(pub u32);

impl ReadyVector {
    /// Every stage idle.
    pub const ALL_READY: ReadyVector = ReadyVector(0xF);

    #[must_use]
    pub const fn is_drained(self, stage: PipelineStage) -> bool {
        let mask = stage.drain_mask();
        self.0 & mask == mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_masks() {
        assert_eq!(PipelineStage::InputAssembly.drain_mask(), 0b0001);
        assert_eq!(PipelineStage::VertexTransform.drain_mask(), 0b0011);
        assert_eq!(PipelineStage::PrepRaster.drain_mask(), 0b0111);
        assert_eq!(PipelineStage::PerPixel.drain_mask(), 0b1111);
    }

    #[test]
    fn test_readiness_is_cumulative() {
        // Per-pixel idle but vertex transform still busy.
        let v = ReadyVector(0b1101);
        assert!(v.is_drained(PipelineStage::InputAssembly));
        assert!(!v.is_drained(PipelineStage::VertexTransform));
        assert!(!v.is_drained(PipelineStage::PrepRaster));
        assert!(!v.is_drained(PipelineStage::PerPixel));
        assert!(ReadyVector::ALL_READY.is_drained(PipelineStage::PerPixel));
    }
}
