//! Buffer object table.

use log::debug;
use pixelforge_hal::DeviceMemory;

use crate::mem::{Arena, MemoryBlock, MemoryError};

/// Buffer binding points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    ArrayBuffer,
    ElementArrayBuffer,
}

/// Expected update frequency. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferUsage {
    #[default]
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferObject {
    pub id: u32,
    /// Backing arena region, sized to the largest upload seen.
    pub storage: Option<MemoryBlock>,
    /// Size of the last upload.
    pub size: usize,
    pub alive: bool,
}

impl BufferObject {
    pub fn device_address(&self) -> Option<u32> {
        self.storage.map(|s| s.device_address)
    }

    pub fn capacity(&self) -> usize {
        self.storage.map_or(0, |s| s.size)
    }

    /// `len` bytes of storage starting at `offset`, if within the uploaded
    /// size.
    fn range(&self, offset: usize, len: usize) -> Option<MemoryBlock> {
        let storage = self.storage?;
        let end = offset.checked_add(len)?;
        if end > self.size {
            return None;
        }
        Some(MemoryBlock {
            device_address: storage.device_address.checked_add(u32::try_from(offset).ok()?)?,
            host_offset: storage.host_offset + offset,
            size: len,
        })
    }
}

/// Maps buffer ids to device memory and tracks the two binding points.
///
/// Ids start at 1 and are never reused; id 0 means "no buffer".
#[derive(Debug, Default)]
pub struct BufferTable {
    objects: Vec<BufferObject>,
    array_binding: u32,
    element_binding: u32,
}

impl BufferTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self) -> u32 {
        let id = self.objects.len() as u32 + 1;
        self.objects.push(BufferObject {
            id,
            storage: None,
            size: 0,
            alive: true,
        });
        id
    }

    /// Live buffer by id.
    pub fn get(&self, id: u32) -> Option<&BufferObject> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.objects.get(index).filter(|o| o.alive)
    }

    fn get_mut(&mut self, id: u32) -> Option<&mut BufferObject> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.objects.get_mut(index).filter(|o| o.alive)
    }

    pub fn is_live(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Buffer id bound to `target`, zero when none.
    pub fn bound(&self, target: BufferTarget) -> u32 {
        match target {
            BufferTarget::ArrayBuffer => self.array_binding,
            BufferTarget::ElementArrayBuffer => self.element_binding,
        }
    }

    fn binding_mut(&mut self, target: BufferTarget) -> &mut u32 {
        match target {
            BufferTarget::ArrayBuffer => &mut self.array_binding,
            BufferTarget::ElementArrayBuffer => &mut self.element_binding,
        }
    }

    /// Bind `id` to `target`. Zero unbinds; unknown or dead ids are ignored.
    pub fn bind(&mut self, target: BufferTarget, id: u32) -> bool {
        if id != 0 && !self.is_live(id) {
            debug!("bind of unknown buffer {} to {:?} ignored", id, target);
            return false;
        }
        *self.binding_mut(target) = id;
        true
    }

    /// Mark `id` dead and clear it from both binding points.
    ///
    /// Its storage stays reserved in the arena.
    pub fn delete(&mut self, id: u32) -> bool {
        let Some(object) = self.get_mut(id) else {
            return false;
        };
        object.alive = false;
        for target in [BufferTarget::ArrayBuffer, BufferTarget::ElementArrayBuffer] {
            let binding = self.binding_mut(target);
            if *binding == id {
                *binding = 0;
            }
        }
        true
    }

    /// Size the buffer bound to `target` for a `size`-byte upload.
    ///
    /// Storage is only reallocated when `size` exceeds the current capacity;
    /// a failed allocation leaves the buffer unchanged. Returns the region to
    /// upload into, or `None` when nothing is bound.
    pub fn reserve<M: DeviceMemory>(
        &mut self,
        target: BufferTarget,
        size: usize,
        arena: &mut Arena<M>,
        align: usize,
    ) -> Result<Option<MemoryBlock>, MemoryError> {
        let id = self.bound(target);
        let Some(object) = self.get_mut(id) else {
            return Ok(None);
        };
        if size > object.capacity() {
            let storage = arena.allocate(size, align)?;
            debug!(
                "buffer {} storage {:#010x}, {} bytes",
                id, storage.device_address, size
            );
            object.storage = Some(storage);
        }
        object.size = size;
        Ok(object.range(0, size))
    }

    /// Bounds-checked region of the buffer bound to `target`.
    pub fn sub_range(&self, target: BufferTarget, offset: usize, len: usize) -> Option<MemoryBlock> {
        self.get(self.bound(target))?.range(offset, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::HostMemory;

    fn arena() -> Arena<HostMemory> {
        Arena::new(HostMemory::new(0x3000_0000, 64 * 1024))
    }

    #[test]
    fn test_ids_start_at_one_and_are_never_reused() {
        let mut table = BufferTable::new();
        let a = table.create();
        let b = table.create();
        assert_eq!((a, b), (1, 2));
        assert!(table.delete(a));
        assert_eq!(table.create(), 3);
        assert!(!table.is_live(a));
        assert!(!table.is_live(0));
    }

    #[test]
    fn test_bind_ignores_unknown_and_dead() {
        let mut table = BufferTable::new();
        let a = table.create();
        assert!(table.bind(BufferTarget::ArrayBuffer, a));
        assert!(!table.bind(BufferTarget::ArrayBuffer, 42));
        assert_eq!(table.bound(BufferTarget::ArrayBuffer), a);

        let b = table.create();
        table.delete(b);
        assert!(!table.bind(BufferTarget::ArrayBuffer, b));
        assert_eq!(table.bound(BufferTarget::ArrayBuffer), a);

        assert!(table.bind(BufferTarget::ArrayBuffer, 0));
        assert_eq!(table.bound(BufferTarget::ArrayBuffer), 0);
    }

    #[test]
    fn test_delete_clears_bindings() {
        let mut table = BufferTable::new();
        let a = table.create();
        table.bind(BufferTarget::ArrayBuffer, a);
        table.bind(BufferTarget::ElementArrayBuffer, a);
        table.delete(a);
        assert_eq!(table.bound(BufferTarget::ArrayBuffer), 0);
        assert_eq!(table.bound(BufferTarget::ElementArrayBuffer), 0);
        assert!(!table.delete(a), "second delete is a no-op");
    }

    #[test]
    fn test_reserve_grows_only() {
        let mut table = BufferTable::new();
        let mut arena = arena();
        let a = table.create();
        table.bind(BufferTarget::ArrayBuffer, a);

        let first = table
            .reserve(BufferTarget::ArrayBuffer, 64, &mut arena, 4096)
            .unwrap()
            .unwrap();
        let shrunk = table
            .reserve(BufferTarget::ArrayBuffer, 32, &mut arena, 4096)
            .unwrap()
            .unwrap();
        assert_eq!(shrunk.device_address, first.device_address);
        assert_eq!(table.get(a).unwrap().size, 32);
        assert_eq!(table.get(a).unwrap().capacity(), 64);

        let grown = table
            .reserve(BufferTarget::ArrayBuffer, 128, &mut arena, 4096)
            .unwrap()
            .unwrap();
        assert_ne!(grown.device_address, first.device_address);
        assert_eq!(table.get(a).unwrap().capacity(), 128);
    }

    #[test]
    fn test_reserve_without_binding() {
        let mut table = BufferTable::new();
        let mut arena = arena();
        assert_eq!(
            table.reserve(BufferTarget::ElementArrayBuffer, 16, &mut arena, 16),
            Ok(None)
        );
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn test_failed_reserve_keeps_buffer() {
        let mut table = BufferTable::new();
        let mut arena = arena();
        let a = table.create();
        table.bind(BufferTarget::ArrayBuffer, a);
        table
            .reserve(BufferTarget::ArrayBuffer, 64, &mut arena, 16)
            .unwrap();
        assert!(table
            .reserve(BufferTarget::ArrayBuffer, 1 << 20, &mut arena, 16)
            .is_err());
        assert_eq!(table.get(a).unwrap().size, 64);
    }

    #[test]
    fn test_sub_range_bounds() {
        let mut table = BufferTable::new();
        let mut arena = arena();
        let a = table.create();
        table.bind(BufferTarget::ArrayBuffer, a);
        let whole = table
            .reserve(BufferTarget::ArrayBuffer, 64, &mut arena, 16)
            .unwrap()
            .unwrap();
        let part = table.sub_range(BufferTarget::ArrayBuffer, 16, 48).unwrap();
        assert_eq!(part.device_address, whole.device_address + 16);
        assert_eq!(part.size, 48);
        assert!(table.sub_range(BufferTarget::ArrayBuffer, 16, 49).is_none());
        assert!(table
            .sub_range(BufferTarget::ArrayBuffer, usize::MAX, 2)
            .is_none());
    }
}
