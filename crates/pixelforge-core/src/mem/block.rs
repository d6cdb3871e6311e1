//! First-fit block allocator over a caller-supplied region.
//!
//! The region is tiled by blocks, each an 8-byte header followed by its
//! payload. Header word 0 packs `size << 1 | free`; word 1 is the offset of
//! the next block's header, or `u32::MAX` for the last block. Pointers
//! handed out are payload offsets into the region.

use log::warn;

use super::{align_up, MemoryError};

/// Payload sizes are rounded up to this many bytes.
pub const BLOCK_ALIGN: usize = 16;
/// Bytes of header preceding every payload.
pub const HEADER_SIZE: usize = 8;
/// Smallest payload worth splitting off as a new free block.
const MIN_SPLIT_PAYLOAD: usize = 8;
const NO_NEXT: u32 = u32::MAX;
/// Sizes are stored in 31 bits.
const MAX_REGION: usize = (u32::MAX >> 1) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    size: usize,
    free: bool,
    next: Option<usize>,
}

/// A snapshot of one block, for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Header offset within the region.
    pub offset: usize,
    pub size: usize,
    pub free: bool,
}

impl BlockInfo {
    /// Offset of the first payload byte.
    pub fn payload(&self) -> usize {
        self.offset + HEADER_SIZE
    }
}

/// malloc/calloc/realloc/free over a byte region.
pub struct BlockPool<R> {
    region: R,
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(word)
}

fn write_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

impl<R: AsRef<[u8]> + AsMut<[u8]>> BlockPool<R> {
    /// Take over `region` as a single free block.
    pub fn init(region: R) -> Result<Self, MemoryError> {
        let len = region.as_ref().len();
        if len < HEADER_SIZE + MIN_SPLIT_PAYLOAD {
            return Err(MemoryError::RegionTooSmall(len));
        }
        if len > MAX_REGION {
            return Err(MemoryError::SizeOverflow);
        }
        let mut pool = Self { region };
        pool.write_header(
            0,
            Header {
                size: len - HEADER_SIZE,
                free: true,
                next: None,
            },
        );
        Ok(pool)
    }

    fn read_header(&self, at: usize) -> Header {
        let bytes = self.region.as_ref();
        let word0 = read_u32(bytes, at);
        let word1 = read_u32(bytes, at + 4);
        Header {
            size: (word0 >> 1) as usize,
            free: word0 & 1 != 0,
            next: (word1 != NO_NEXT).then_some(word1 as usize),
        }
    }

    fn write_header(&mut self, at: usize, header: Header) {
        let word0 = ((header.size as u32) << 1) | u32::from(header.free);
        let word1 = header.next.map_or(NO_NEXT, |n| n as u32);
        let bytes = self.region.as_mut();
        write_u32(bytes, at, word0);
        write_u32(bytes, at + 4, word1);
    }

    /// Walk the block list from the head.
    pub fn blocks(&self) -> impl Iterator<Item = BlockInfo> + '_ {
        let mut cursor = Some(0);
        core::iter::from_fn(move || {
            let at = cursor?;
            let header = self.read_header(at);
            cursor = header.next;
            Some(BlockInfo {
                offset: at,
                size: header.size,
                free: header.free,
            })
        })
    }

    /// Total size of the managed region.
    pub fn region_size(&self) -> usize {
        self.region.as_ref().len()
    }

    pub fn free_bytes(&self) -> usize {
        self.blocks().filter(|b| b.free).map(|b| b.size).sum()
    }

    pub fn largest_free(&self) -> usize {
        self.blocks()
            .filter(|b| b.free)
            .map(|b| b.size)
            .max()
            .unwrap_or(0)
    }

    /// Shrink the block at `at` to `size`, turning the tail into a free
    /// block when it can hold a header and a minimal payload.
    ///
    /// Updates `header` but does not write it back. Returns the tail offset.
    fn split(&mut self, at: usize, header: &mut Header, size: usize) -> Option<usize> {
        if header.size < size + HEADER_SIZE + MIN_SPLIT_PAYLOAD {
            return None;
        }
        let tail = at + HEADER_SIZE + size;
        self.write_header(
            tail,
            Header {
                size: header.size - size - HEADER_SIZE,
                free: true,
                next: header.next,
            },
        );
        header.size = size;
        header.next = Some(tail);
        Some(tail)
    }

    fn predecessor(&self, at: usize) -> Option<usize> {
        let mut cursor = Some(0);
        while let Some(current) = cursor {
            let header = self.read_header(current);
            if header.next == Some(at) {
                return Some(current);
            }
            cursor = header.next;
        }
        None
    }

    /// Merge the free block at `at` with a free successor, then into a free
    /// predecessor.
    fn coalesce(&mut self, at: usize) {
        let mut header = self.read_header(at);
        if let Some(next) = header.next {
            let following = self.read_header(next);
            if following.free {
                header.size += HEADER_SIZE + following.size;
                header.next = following.next;
                self.write_header(at, header);
            }
        }
        if let Some(prev) = self.predecessor(at) {
            let mut preceding = self.read_header(prev);
            if preceding.free {
                preceding.size += HEADER_SIZE + header.size;
                preceding.next = header.next;
                self.write_header(prev, preceding);
            }
        }
    }

    /// Header offset of the live block whose payload starts at `ptr`.
    fn live_block(&self, ptr: usize) -> Result<usize, MemoryError> {
        self.blocks()
            .find(|b| b.payload() == ptr && !b.free)
            .map(|b| b.offset)
            .ok_or(MemoryError::InvalidBlock(ptr))
    }

    /// First-fit allocation of at least `size` bytes.
    pub fn allocate(&mut self, size: usize) -> Result<usize, MemoryError> {
        if size == 0 {
            return Err(MemoryError::ZeroSize);
        }
        let size = align_up(size, BLOCK_ALIGN).ok_or(MemoryError::SizeOverflow)?;

        let mut cursor = Some(0);
        while let Some(at) = cursor {
            let mut header = self.read_header(at);
            if header.free && header.size >= size {
                self.split(at, &mut header, size);
                header.free = false;
                self.write_header(at, header);
                return Ok(at + HEADER_SIZE);
            }
            cursor = header.next;
        }

        let available = self.largest_free();
        warn!("block pool exhausted: {} bytes, largest free {}", size, available);
        Err(MemoryError::Exhausted {
            requested: size,
            available,
        })
    }

    /// Zeroed allocation of `count * size` bytes.
    pub fn allocate_zeroed(&mut self, count: usize, size: usize) -> Result<usize, MemoryError> {
        let total = count.checked_mul(size).ok_or(MemoryError::SizeOverflow)?;
        let ptr = self.allocate(total)?;
        self.region.as_mut()[ptr..ptr + total].fill(0);
        Ok(ptr)
    }

    /// Resize an allocation, in place when possible.
    ///
    /// `None` allocates fresh; a zero `size` frees `ptr` and returns `None`.
    /// When the block must move, its contents are copied and the old block
    /// is freed. On failure the existing allocation is untouched.
    pub fn reallocate(
        &mut self,
        ptr: Option<usize>,
        size: usize,
    ) -> Result<Option<usize>, MemoryError> {
        let Some(ptr) = ptr else {
            return self.allocate(size).map(Some);
        };
        if size == 0 {
            self.free(ptr)?;
            return Ok(None);
        }

        let at = self.live_block(ptr)?;
        let size = align_up(size, BLOCK_ALIGN).ok_or(MemoryError::SizeOverflow)?;
        let mut header = self.read_header(at);

        if header.size >= size {
            if let Some(tail) = self.split(at, &mut header, size) {
                self.write_header(at, header);
                self.coalesce(tail);
            }
            return Ok(Some(ptr));
        }

        if let Some(next) = header.next {
            let following = self.read_header(next);
            if following.free && header.size + HEADER_SIZE + following.size >= size {
                header.size += HEADER_SIZE + following.size;
                header.next = following.next;
                self.split(at, &mut header, size);
                self.write_header(at, header);
                return Ok(Some(ptr));
            }
        }

        let old_size = header.size;
        let moved = self.allocate(size)?;
        self.region
            .as_mut()
            .copy_within(ptr..ptr + old_size, moved);
        self.free(ptr)?;
        Ok(Some(moved))
    }

    /// Release the allocation at `ptr`.
    pub fn free(&mut self, ptr: usize) -> Result<(), MemoryError> {
        let at = self.live_block(ptr)?;
        let mut header = self.read_header(at);
        header.free = true;
        self.write_header(at, header);
        self.coalesce(at);
        Ok(())
    }

    /// Payload bytes of a live allocation.
    pub fn payload(&self, ptr: usize) -> Result<&[u8], MemoryError> {
        let at = self.live_block(ptr)?;
        let size = self.read_header(at).size;
        Ok(&self.region.as_ref()[ptr..ptr + size])
    }

    pub fn payload_mut(&mut self, ptr: usize) -> Result<&mut [u8], MemoryError> {
        let at = self.live_block(ptr)?;
        let size = self.read_header(at).size;
        Ok(&mut self.region.as_mut()[ptr..ptr + size])
    }

    pub fn into_inner(self) -> R {
        self.region
    }
}
