//! PUP container header
//!
//! The header sits at offset 0 and is immediately followed by the entry
//! directory. All fields are little-endian.

use binrw::{BinRead, BinWrite};

/// Size of the on-disk header in bytes
pub const HEADER_SIZE: u64 = 32;

/// Magic bytes of PS4 update containers
pub const PS4_MAGIC: [u8; 4] = [0x4F, 0x15, 0x3D, 0x1D];

/// Magic bytes of PS5 update containers
pub const PS5_MAGIC: [u8; 4] = [0x54, 0x14, 0xF5, 0xEE];

/// Platform recognized from the header magic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// PS4 system update
    Ps4,
    /// PS5 system update
    Ps5,
}

/// Fixed-size container header
///
/// The magic is kept but never checked while parsing; [`PupHeader::known_platform`]
/// only reports whether it matches a published value.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct PupHeader {
    /// Magic bytes
    pub magic: [u8; 4],
    /// Unknown, observed as a version word
    pub unknown_04: u32,
    /// Unknown
    pub unknown_08: u16,
    /// Container flags
    pub flags: u8,
    /// Unknown
    pub unknown_0b: u8,
    /// Size of the header including the entry directory
    pub header_size: u16,
    /// Size of the hash table region
    pub hash_size: u16,
    /// Total container size in bytes
    pub file_size: u64,
    /// Number of directory entries following the header
    pub entry_count: u16,
    /// Number of hash records
    pub hash_count: u16,
    /// Reserved
    pub unknown_1c: u32,
}

impl PupHeader {
    /// Create a header for a container with `entry_count` entries
    pub fn new(magic: [u8; 4], entry_count: u16, file_size: u64) -> Self {
        let header_size = HEADER_SIZE + u64::from(entry_count) * super::entry::ENTRY_SIZE;
        Self {
            magic,
            unknown_04: 1,
            unknown_08: 0,
            flags: 0,
            unknown_0b: 0,
            header_size: u16::try_from(header_size).unwrap_or(u16::MAX),
            hash_size: 0,
            file_size,
            entry_count,
            hash_count: 0,
            unknown_1c: 0,
        }
    }

    /// Platform matching the magic, if it is a published one
    pub fn known_platform(&self) -> Option<Platform> {
        match self.magic {
            PS4_MAGIC => Some(Platform::Ps4),
            PS5_MAGIC => Some(Platform::Ps5),
            _ => None,
        }
    }

    /// Offset of the first directory record
    pub const fn directory_offset(&self) -> u64 {
        HEADER_SIZE
    }
}
