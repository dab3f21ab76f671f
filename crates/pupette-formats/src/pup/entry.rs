//! Entry directory records and flag accessors

use binrw::{BinRead, BinWrite};

/// Size of one on-disk directory record in bytes
pub const ENTRY_SIZE: u64 = 32;

/// Flag bit marking a block table entry
pub const FLAG_BLOCK_TABLE: u32 = 0x1;
/// Flag bit marking a deflate-compressed payload
pub const FLAG_COMPRESSED: u32 = 0x8;
/// Flag bit marking an entry split into blocks
pub const FLAG_BLOCKED: u32 = 0x800;
/// Block size exponent field
pub const BLOCK_EXPONENT_MASK: u32 = 0xF000;
/// Shift of the block size exponent field
pub const BLOCK_EXPONENT_SHIFT: u32 = 12;
/// Shift of the identifier field
pub const ID_SHIFT: u32 = 20;

/// Smallest block size exponent (4 KiB blocks)
const BASE_BLOCK_SHIFT: u32 = 12;

/// One directory record
///
/// Every derived property is computed from `flags` on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct PupEntry {
    /// Raw flags word
    pub flags: u32,
    /// Absolute payload offset in the container, after 4 reserved bytes
    #[brw(pad_before = 4)]
    pub offset: u64,
    /// Stored payload size
    pub compressed_size: u64,
    /// Payload size after decompression and block reconstruction
    pub uncompressed_size: u64,
}

impl PupEntry {
    /// Create a directory record
    pub const fn new(flags: u32, offset: u64, compressed_size: u64, uncompressed_size: u64) -> Self {
        Self {
            flags,
            offset,
            compressed_size,
            uncompressed_size,
        }
    }

    /// Entry identifier
    pub const fn id(&self) -> u32 {
        self.flags >> ID_SHIFT
    }

    /// Whether this entry holds the block table of another entry
    pub const fn is_block_table(&self) -> bool {
        self.flags & FLAG_BLOCK_TABLE != 0
    }

    /// Whether the payload is deflate compressed
    pub const fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    /// Whether the payload is split into blocks
    pub const fn is_blocked(&self) -> bool {
        self.flags & FLAG_BLOCKED != 0
    }

    /// Block size exponent relative to 4 KiB
    pub const fn block_exponent(&self) -> u32 {
        (self.flags & BLOCK_EXPONENT_MASK) >> BLOCK_EXPONENT_SHIFT
    }

    /// Block size in bytes (only meaningful for blocked entries)
    pub const fn block_size(&self) -> u64 {
        1u64 << (self.block_exponent() + BASE_BLOCK_SHIFT)
    }

    /// Top nibble 0xE or 0xF: entries that are never extracted
    pub const fn is_special(&self) -> bool {
        let special = self.flags & 0xF000_0000;
        special == 0xE000_0000 || special == 0xF000_0000
    }

    /// Identifier in the reserved range that blocked entries may not use
    pub const fn has_reserved_id(&self) -> bool {
        (self.id() | 0x100) & 0xF00 == 0xF00
    }
}

/// Compose a flags word from its fields
pub const fn compose_flags(
    id: u32,
    block_exponent: Option<u32>,
    compressed: bool,
    block_table: bool,
) -> u32 {
    let mut flags = id << ID_SHIFT;
    if let Some(exponent) = block_exponent {
        flags |= FLAG_BLOCKED | ((exponent << BLOCK_EXPONENT_SHIFT) & BLOCK_EXPONENT_MASK);
    }
    if compressed {
        flags |= FLAG_COMPRESSED;
    }
    if block_table {
        flags |= FLAG_BLOCK_TABLE;
    }
    flags
}
