//! Draw orchestration: validate bindings, flush dirty state, program the
//! per-draw registers and start the pipeline.

use log::{debug, trace};
use pixelforge_hal::{DeviceMemory, DisplayDma, RegisterInterface};
use pixelforge_registers::{
    AttributeSlot, IndexConfig, IndexKindE, InputAttribute, InputTopologyE, PipelineStage,
    PrimitiveTypeE, RegisterBlock, TopologyConfig, I16F16,
};

use super::buffer::{BufferTable, BufferTarget};
use super::state::{DirtyFlags, GpuState};
use super::upload::flush_dirty;
use crate::gpu::{Device, GpuError};

/// Normal used when the normal array is disabled.
pub const DEFAULT_NORMAL: [I16F16; 4] = [I16F16::ZERO, I16F16::ZERO, I16F16::ONE, I16F16::ZERO];
/// Color used when the color array is disabled.
pub const DEFAULT_COLOR: [I16F16; 4] = [I16F16::ONE; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl DrawMode {
    pub const fn topology(self) -> InputTopologyE {
        match self {
            DrawMode::Points => InputTopologyE::PointList,
            DrawMode::Lines => InputTopologyE::LineList,
            DrawMode::LineStrip => InputTopologyE::LineStrip,
            DrawMode::Triangles => InputTopologyE::TriangleList,
            DrawMode::TriangleStrip => InputTopologyE::TriangleStrip,
            DrawMode::TriangleFan => InputTopologyE::TriangleFan,
        }
    }

    /// Primitive class handed to primitive assembly.
    pub const fn primitive(self) -> PrimitiveTypeE {
        match self {
            DrawMode::Points => PrimitiveTypeE::Points,
            DrawMode::Lines | DrawMode::LineStrip => PrimitiveTypeE::Lines,
            DrawMode::Triangles | DrawMode::TriangleStrip | DrawMode::TriangleFan => {
                PrimitiveTypeE::Triangles
            }
        }
    }
}

/// Element type of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexType {
    U8,
    #[default]
    U16,
}

impl IndexType {
    /// Size of one index in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            IndexType::U8 => 1,
            IndexType::U16 => 2,
        }
    }
}

impl From<IndexType> for IndexKindE {
    fn from(ty: IndexType) -> Self {
        match ty {
            IndexType::U8 => IndexKindE::U8,
            IndexType::U16 => IndexKindE::U16,
        }
    }
}

/// Vertex source of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawSource {
    /// Consecutive vertices starting at `first`.
    Arrays { first: u32 },
    /// Indices read from the bound element buffer at byte `offset`.
    Elements { index_type: IndexType, offset: usize },
}

/// Why a draw was not issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ZeroCount,
    PositionDisabled,
    /// An enabled attribute has no live buffer.
    UnboundAttribute(AttributeSlot),
    /// An attribute's offset lies past its buffer's data.
    AttributeOutOfRange(AttributeSlot),
    MissingElementBuffer,
    IndexOffsetOutOfRange,
    /// The indices run past the end of the element buffer's data.
    IndicesPastEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStatus {
    Issued,
    Skipped(SkipReason),
}

/// Per-draw register contents, fully resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawPlan {
    pub topology: TopologyConfig,
    pub index: IndexConfig,
    pub attributes: [InputAttribute; 3],
}

fn resolve_attribute(
    state: &GpuState,
    buffers: &BufferTable,
    slot: AttributeSlot,
) -> Result<InputAttribute, SkipReason> {
    let binding = state.array(slot);
    if !binding.enabled {
        return match slot {
            AttributeSlot::Position => Err(SkipReason::PositionDisabled),
            AttributeSlot::Normal => Ok(InputAttribute::Constant(DEFAULT_NORMAL)),
            AttributeSlot::Color => Ok(InputAttribute::Constant(DEFAULT_COLOR)),
        };
    }
    let buffer = buffers
        .get(binding.buffer)
        .ok_or(SkipReason::UnboundAttribute(slot))?;
    let base = buffer
        .device_address()
        .ok_or(SkipReason::UnboundAttribute(slot))?;
    if binding.offset >= buffer.size {
        return Err(SkipReason::AttributeOutOfRange(slot));
    }
    Ok(InputAttribute::PerVertex {
        address: base + binding.offset as u32,
        stride: binding.stride,
    })
}

/// Resolve every binding a draw needs without touching hardware.
pub fn plan(
    state: &GpuState,
    buffers: &BufferTable,
    mode: DrawMode,
    count: u32,
    source: DrawSource,
) -> Result<DrawPlan, SkipReason> {
    if count == 0 {
        return Err(SkipReason::ZeroCount);
    }

    let (index, base_vertex) = match source {
        DrawSource::Arrays { first } => (IndexConfig { count, ..IndexConfig::default() }, first),
        DrawSource::Elements { index_type, offset } => {
            let elements = buffers
                .get(buffers.bound(BufferTarget::ElementArrayBuffer))
                .ok_or(SkipReason::MissingElementBuffer)?;
            let base = elements
                .device_address()
                .ok_or(SkipReason::MissingElementBuffer)?;
            if offset >= elements.size {
                return Err(SkipReason::IndexOffsetOutOfRange);
            }
            let end = (count as usize)
                .checked_mul(index_type.bytes())
                .and_then(|len| len.checked_add(offset));
            if end.is_none_or(|end| end > elements.size) {
                return Err(SkipReason::IndicesPastEnd);
            }
            let index = IndexConfig {
                address: base + offset as u32,
                count,
                kind: index_type.into(),
            };
            (index, 0)
        }
    };

    let attributes = [
        resolve_attribute(state, buffers, AttributeSlot::Position)?,
        resolve_attribute(state, buffers, AttributeSlot::Normal)?,
        resolve_attribute(state, buffers, AttributeSlot::Color)?,
    ];

    Ok(DrawPlan {
        topology: TopologyConfig {
            topology: mode.topology(),
            primitive_restart: false,
            restart_index: 0,
            base_vertex,
        },
        index,
        attributes,
    })
}

/// Run one draw end to end.
///
/// A draw whose bindings do not resolve is skipped before any register is
/// touched.
pub fn submit<B, M>(
    device: &mut Device<B, M>,
    state: &mut GpuState,
    buffers: &BufferTable,
    mode: DrawMode,
    count: u32,
    source: DrawSource,
) -> Result<DrawStatus, GpuError<B::Error>>
where
    B: RegisterInterface + DisplayDma,
    M: DeviceMemory,
{
    let plan = match plan(state, buffers, mode, count, source) {
        Ok(plan) => plan,
        Err(reason) => {
            debug!("draw {:?} x{} skipped: {:?}", mode, count, reason);
            return Ok(DrawStatus::Skipped(reason));
        }
    };

    if state.cull.primitive != mode.primitive() {
        state.cull.primitive = mode.primitive();
        state.dirty |= DirtyFlags::CULL;
    }
    flush_dirty(device, state)?;

    device.wait_for_stage(PipelineStage::InputAssembly)?;
    trace!("draw {:?}: {:?}", mode, plan);
    device.write_block(&RegisterBlock::Topology(plan.topology))?;
    device.write_block(&RegisterBlock::Index(plan.index))?;
    for (slot, attribute) in AttributeSlot::ALL.into_iter().zip(plan.attributes) {
        device.write_block(&RegisterBlock::Attribute(slot, attribute))?;
    }
    device.start()?;
    Ok(DrawStatus::Issued)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::state::AttributeBinding;
    use crate::mem::{Arena, HostMemory};

    struct Scene {
        state: GpuState,
        buffers: BufferTable,
        arena: Arena<HostMemory>,
    }

    fn scene() -> Scene {
        Scene {
            state: GpuState::new(16, 16),
            buffers: BufferTable::new(),
            arena: Arena::new(HostMemory::new(0x3000_0000, 64 * 1024)),
        }
    }

    fn upload(s: &mut Scene, target: BufferTarget, size: usize) -> u32 {
        let id = s.buffers.create();
        s.buffers.bind(target, id);
        s.buffers.reserve(target, size, &mut s.arena, 16).unwrap();
        id
    }

    fn bind_position(s: &mut Scene, buffer: u32, offset: usize) {
        *s.state.array_mut(AttributeSlot::Position) = AttributeBinding {
            enabled: true,
            buffer,
            offset,
            stride: 16,
        };
    }

    #[test]
    fn test_arrays_plan() {
        let mut s = scene();
        let vbo = upload(&mut s, BufferTarget::ArrayBuffer, 64);
        bind_position(&mut s, vbo, 16);
        let p = plan(&s.state, &s.buffers, DrawMode::TriangleStrip, 3, DrawSource::Arrays { first: 2 })
            .unwrap();
        assert_eq!(p.topology.topology, InputTopologyE::TriangleStrip);
        assert_eq!(p.topology.base_vertex, 2);
        assert_eq!(p.index.kind, IndexKindE::NotIndexed);
        assert_eq!(p.index.count, 3);
        assert_eq!(
            p.attributes[0],
            InputAttribute::PerVertex {
                address: 0x3000_0010,
                stride: 16
            }
        );
        assert_eq!(p.attributes[1], InputAttribute::Constant(DEFAULT_NORMAL));
        assert_eq!(p.attributes[2], InputAttribute::Constant(DEFAULT_COLOR));
    }

    #[test]
    fn test_skip_reasons() {
        let mut s = scene();
        let arrays = DrawSource::Arrays { first: 0 };
        assert_eq!(
            plan(&s.state, &s.buffers, DrawMode::Triangles, 0, arrays),
            Err(SkipReason::ZeroCount)
        );
        assert_eq!(
            plan(&s.state, &s.buffers, DrawMode::Triangles, 3, arrays),
            Err(SkipReason::PositionDisabled)
        );

        bind_position(&mut s, 7, 0);
        assert_eq!(
            plan(&s.state, &s.buffers, DrawMode::Triangles, 3, arrays),
            Err(SkipReason::UnboundAttribute(AttributeSlot::Position))
        );

        let vbo = upload(&mut s, BufferTarget::ArrayBuffer, 64);
        bind_position(&mut s, vbo, 64);
        assert_eq!(
            plan(&s.state, &s.buffers, DrawMode::Triangles, 3, arrays),
            Err(SkipReason::AttributeOutOfRange(AttributeSlot::Position))
        );

        bind_position(&mut s, vbo, 0);
        s.state.array_mut(AttributeSlot::Color).enabled = true;
        assert_eq!(
            plan(&s.state, &s.buffers, DrawMode::Triangles, 3, arrays),
            Err(SkipReason::UnboundAttribute(AttributeSlot::Color))
        );
    }

    #[test]
    fn test_elements_need_element_buffer() {
        let mut s = scene();
        let vbo = upload(&mut s, BufferTarget::ArrayBuffer, 64);
        bind_position(&mut s, vbo, 0);
        let source = DrawSource::Elements {
            index_type: IndexType::U8,
            offset: 2,
        };
        assert_eq!(
            plan(&s.state, &s.buffers, DrawMode::Triangles, 3, source),
            Err(SkipReason::MissingElementBuffer)
        );

        upload(&mut s, BufferTarget::ElementArrayBuffer, 6);
        let p = plan(&s.state, &s.buffers, DrawMode::Triangles, 3, source).unwrap();
        assert_eq!(p.index.kind, IndexKindE::U8);
        assert_eq!(p.topology.base_vertex, 0);
        let ebo_base = s
            .buffers
            .get(s.buffers.bound(BufferTarget::ElementArrayBuffer))
            .and_then(|b| b.device_address())
            .unwrap();
        assert_eq!(p.index.address, ebo_base + 2);

        let past_end = DrawSource::Elements {
            index_type: IndexType::U16,
            offset: 6,
        };
        assert_eq!(
            plan(&s.state, &s.buffers, DrawMode::Triangles, 3, past_end),
            Err(SkipReason::IndexOffsetOutOfRange)
        );

        let overrun = DrawSource::Elements {
            index_type: IndexType::U16,
            offset: 2,
        };
        assert_eq!(
            plan(&s.state, &s.buffers, DrawMode::Triangles, 3, overrun),
            Err(SkipReason::IndicesPastEnd)
        );
        assert!(plan(&s.state, &s.buffers, DrawMode::Triangles, 2, overrun).is_ok());
    }

    #[test]
    fn test_mode_mapping() {
        assert_eq!(DrawMode::Points.topology(), InputTopologyE::PointList);
        assert_eq!(DrawMode::TriangleFan.topology(), InputTopologyE::TriangleFan);
        assert_eq!(DrawMode::LineStrip.primitive(), PrimitiveTypeE::Lines);
        assert_eq!(IndexKindE::from(IndexType::default()), IndexKindE::U16);
    }
}
