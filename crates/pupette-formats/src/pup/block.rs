//! Block geometry and block table records

use super::entry::PupEntry;
use super::error::{PupError, PupResult};
use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};

/// Bytes reserved per block at the start of a block table (hash region)
pub const BLOCK_HASH_SIZE: u64 = 32;

/// Size of one block record
pub const BLOCK_INFO_SIZE: u64 = 8;

/// Low bits of a block size that carry the padding count
pub const PADDING_MASK: u32 = 0xF;

/// Physical location of one logical block
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct BlockInfo {
    /// Offset relative to the entry's payload offset, 0 to continue linearly
    pub offset: u32,
    /// Stored size; the low nibble is the number of padding bytes
    pub size: u32,
}

impl BlockInfo {
    /// Create a block record
    pub const fn new(offset: u32, size: u32) -> Self {
        Self { offset, size }
    }

    /// Number of padding bytes appended after the block data
    pub const fn padding(&self) -> u32 {
        self.size & PADDING_MASK
    }

    /// Stored length with the padding nibble cleared
    pub const fn aligned_size(&self) -> u32 {
        self.size & !PADDING_MASK
    }

    /// Length of the block data without its padding
    pub const fn unpadded_size(&self) -> u64 {
        (self.aligned_size() as u64).saturating_sub(self.padding() as u64)
    }

    /// Whether the record asks for an explicit reposition
    pub const fn is_relocated(&self) -> bool {
        self.offset != 0
    }
}

/// Block size, count and tail length of a blocked entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGeometry {
    /// Logical block size
    pub block_size: u64,
    /// Number of logical blocks
    pub block_count: u64,
    /// Uncompressed length of the last block
    pub tail_size: u64,
}

impl BlockGeometry {
    /// Geometry of a blocked entry
    pub const fn of(entry: &PupEntry) -> Self {
        Self::new(entry.block_size(), entry.uncompressed_size)
    }

    /// Geometry for `total` bytes split into `block_size` blocks
    pub const fn new(block_size: u64, total: u64) -> Self {
        let tail = total % block_size;
        Self {
            block_size,
            block_count: total.div_ceil(block_size),
            tail_size: if tail == 0 { block_size } else { tail },
        }
    }

    /// Index of the last block
    pub const fn last_block(&self) -> u64 {
        self.block_count.saturating_sub(1)
    }

    /// Uncompressed length of block `k`
    pub const fn logical_size(&self, k: u64) -> u64 {
        if k == self.last_block() {
            self.tail_size
        } else {
            self.block_size
        }
    }

    /// Output offset of block `k`
    pub const fn output_offset(&self, k: u64) -> u64 {
        k * self.block_size
    }

    /// Decoded table length needed to hold the hash region and all records
    pub const fn table_len(&self) -> u64 {
        self.block_count * (BLOCK_HASH_SIZE + BLOCK_INFO_SIZE)
    }
}

/// How a single block of a compressed entry is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPlan {
    /// A whole block stored raw: `block_size` bytes copied verbatim
    Whole {
        /// Bytes to copy
        len: u64,
    },
    /// A last block stored raw with its exact tail length
    RawTail {
        /// Bytes to copy
        len: u64,
    },
    /// A deflated block followed by padding
    Deflated {
        /// Bytes handed to the inflater
        input_len: u64,
        /// Physical length including padding
        stored_len: u64,
    },
}

impl BlockPlan {
    /// Classify block `k` of a compressed entry from its table record
    pub const fn classify(info: &BlockInfo, k: u64, geometry: &BlockGeometry) -> Self {
        if info.unpadded_size() == geometry.block_size {
            return Self::Whole {
                len: geometry.block_size,
            };
        }

        if k == geometry.last_block() && info.size as u64 == geometry.tail_size {
            return Self::RawTail {
                len: info.size as u64,
            };
        }

        let stored_len = info.aligned_size() as u64;
        Self::Deflated {
            input_len: stored_len.saturating_sub(info.padding() as u64),
            stored_len,
        }
    }

    /// Bytes this block occupies in the container
    pub const fn stored_len(&self) -> u64 {
        match *self {
            Self::Whole { len } | Self::RawTail { len } => len,
            Self::Deflated { stored_len, .. } => stored_len,
        }
    }
}

/// Parse the block records out of a decoded block table payload
///
/// The first `32 * block_count` bytes are skipped; `index` only labels errors.
pub fn parse_block_table(
    data: &[u8],
    geometry: &BlockGeometry,
    index: usize,
) -> PupResult<Vec<BlockInfo>> {
    let expected = geometry.table_len();
    if (data.len() as u64) < expected {
        return Err(PupError::BlockTableTooShort {
            index,
            expected,
            actual: data.len() as u64,
        });
    }

    let count = usize::try_from(geometry.block_count)
        .map_err(|_| PupError::SizeOutOfRange(geometry.block_count))?;
    let mut cursor = Cursor::new(data);
    cursor.set_position(BLOCK_HASH_SIZE * geometry.block_count);

    let mut blocks = Vec::with_capacity(count);
    for _ in 0..count {
        blocks.push(BlockInfo::read(&mut cursor)?);
    }
    Ok(blocks)
}
