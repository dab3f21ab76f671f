//! PUP container builder
//!
//! Builds containers from scratch; used to produce fixtures and to check that
//! the reader reconstructs what was written.

use super::block::{BLOCK_HASH_SIZE, BlockGeometry, BlockInfo, PADDING_MASK};
use super::entry::{ENTRY_SIZE, PupEntry, compose_flags};
use super::error::{PupError, PupResult};
use super::header::{HEADER_SIZE, PS4_MAGIC, PupHeader};
use binrw::BinWrite;
use binrw::io::Cursor;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

/// Largest block size exponent the flags field can carry
pub const MAX_BLOCK_EXPONENT: u32 = 15;

/// Largest identifier the flags field can carry
pub const MAX_ENTRY_ID: u32 = 0xFFF;

/// Physical order of the blocks of a blocked entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockLayout {
    /// Blocks stored in logical order
    #[default]
    Sequential,
    /// Blocks stored last-to-first behind a 16-byte lead-in
    Reversed,
}

/// Options for [`PupBuilder::add_blocked_entry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockedOptions {
    /// Block size exponent: blocks are `4096 << exponent` bytes
    pub exponent: u32,
    /// Deflate blocks (where it helps) and the block table
    pub compress: bool,
    /// Physical block order; uncompressed entries are always sequential
    pub layout: BlockLayout,
}

impl Default for BlockedOptions {
    fn default() -> Self {
        Self {
            exponent: 0,
            compress: true,
            layout: BlockLayout::Sequential,
        }
    }
}

struct PendingEntry {
    flags: u32,
    data: Vec<u8>,
    uncompressed_size: u64,
}

/// Builder for PUP containers
pub struct PupBuilder {
    magic: [u8; 4],
    level: Compression,
    entries: Vec<PendingEntry>,
}

impl PupBuilder {
    /// Create a new builder producing PS4-magic containers
    pub fn new() -> Self {
        Self {
            magic: PS4_MAGIC,
            level: Compression::default(),
            entries: Vec::new(),
        }
    }

    /// Set the header magic
    #[must_use]
    pub fn with_magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = magic;
        self
    }

    /// Set the zlib compression level (0-9)
    #[must_use]
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.level = Compression::new(level.min(9));
        self
    }

    /// Number of directory entries added so far
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Add a plain entry, optionally deflated as a single stream
    pub fn add_entry(mut self, id: u32, data: &[u8], compress: bool) -> PupResult<Self> {
        check_id(id)?;
        let stored = if compress {
            self.deflate(data)?
        } else {
            data.to_vec()
        };
        self.entries.push(PendingEntry {
            flags: compose_flags(id, None, compress, false),
            data: stored,
            uncompressed_size: data.len() as u64,
        });
        Ok(self)
    }

    /// Store `data` verbatim under an arbitrary flags word
    #[must_use]
    pub fn add_entry_with_flags(mut self, flags: u32, data: Vec<u8>, uncompressed_size: u64) -> Self {
        self.entries.push(PendingEntry {
            flags,
            data,
            uncompressed_size,
        });
        self
    }

    /// Add a blocked entry followed by its block table entry
    pub fn add_blocked_entry(mut self, id: u32, data: &[u8], options: BlockedOptions) -> PupResult<Self> {
        check_id(id)?;
        if options.exponent > MAX_BLOCK_EXPONENT {
            return Err(PupError::InvalidBuilderInput(format!(
                "block exponent {} exceeds {}",
                options.exponent, MAX_BLOCK_EXPONENT
            )));
        }

        let flags = compose_flags(id, Some(options.exponent), options.compress, false);
        let probe = PupEntry::new(flags, 0, 0, 0);
        if probe.has_reserved_id() {
            return Err(PupError::InvalidBuilderInput(format!(
                "id 0x{id:03X} is reserved for blocked entries"
            )));
        }

        // The table names its blocked entry by directory index
        let index = self.entries.len() as u32;
        check_id(index)?;

        let geometry = BlockGeometry::new(probe.block_size(), data.len() as u64);
        let stored_blocks = self.encode_blocks(data, &geometry, options.compress)?;
        // Uncompressed blocks are read linearly without a table
        let layout = if options.compress {
            options.layout
        } else {
            BlockLayout::Sequential
        };
        let (payload, records) = lay_out(stored_blocks, layout)?;

        let mut table = vec![0u8; (BLOCK_HASH_SIZE * geometry.block_count) as usize];
        let mut cursor = Cursor::new(Vec::new());
        for record in &records {
            record.write(&mut cursor)?;
        }
        table.extend_from_slice(&cursor.into_inner());

        self.entries.push(PendingEntry {
            flags,
            data: payload,
            uncompressed_size: data.len() as u64,
        });

        let table_len = table.len() as u64;
        let table_data = if options.compress {
            self.deflate(&table)?
        } else {
            table
        };
        self.entries.push(PendingEntry {
            flags: compose_flags(index, None, options.compress, true),
            data: table_data,
            uncompressed_size: table_len,
        });

        Ok(self)
    }

    /// Serialize the container
    pub fn build(self) -> PupResult<Vec<u8>> {
        let count = u16::try_from(self.entries.len()).map_err(|_| {
            PupError::InvalidBuilderInput(format!("{} entries exceed u16", self.entries.len()))
        })?;

        let mut offset = HEADER_SIZE + u64::from(count) * ENTRY_SIZE;
        let mut directory = Vec::with_capacity(self.entries.len());
        for pending in &self.entries {
            directory.push(PupEntry::new(
                pending.flags,
                offset,
                pending.data.len() as u64,
                pending.uncompressed_size,
            ));
            offset += pending.data.len() as u64;
        }

        let mut out = Cursor::new(Vec::with_capacity(offset as usize));
        PupHeader::new(self.magic, count, offset).write(&mut out)?;
        for entry in &directory {
            entry.write(&mut out)?;
        }
        for pending in &self.entries {
            out.write_all(&pending.data)?;
        }
        Ok(out.into_inner())
    }

    fn deflate(&self, data: &[u8]) -> PupResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder.write_all(data).map_err(compression_error)?;
        encoder.finish().map_err(compression_error)
    }

    /// Encode each block as it will be stored, with its size field
    fn encode_blocks(
        &self,
        data: &[u8],
        geometry: &BlockGeometry,
        compress: bool,
    ) -> PupResult<Vec<(Vec<u8>, u32)>> {
        let block_size = geometry.block_size as usize;
        let mut blocks = Vec::with_capacity(geometry.block_count as usize);

        for (k, chunk) in data.chunks(block_size).enumerate() {
            let raw_size = chunk.len() as u32;
            if !compress {
                blocks.push((chunk.to_vec(), raw_size));
                continue;
            }

            let packed = self.deflate(chunk)?;
            let pad = (16 - packed.len() % 16) % 16;
            let size = (packed.len() + pad) as u32 | pad as u32;
            let is_last = k as u64 == geometry.last_block();

            // Raw storage whenever deflate does not help, or when the size field
            // would read as a raw tail
            if packed.len() >= chunk.len() || (is_last && u64::from(size) == geometry.tail_size) {
                blocks.push((chunk.to_vec(), raw_size));
            } else {
                debug_assert_eq!(size & PADDING_MASK, pad as u32);
                let mut stored = packed;
                stored.resize(stored.len() + pad, 0);
                blocks.push((stored, size));
            }
        }

        Ok(blocks)
    }
}

impl Default for PupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn compression_error(e: std::io::Error) -> PupError {
    PupError::CompressionError(format!("ZLib compression failed: {e}"))
}

fn check_id(id: u32) -> PupResult<()> {
    if id > MAX_ENTRY_ID {
        return Err(PupError::InvalidBuilderInput(format!(
            "id {id} does not fit the 12-bit id field"
        )));
    }
    Ok(())
}

/// Concatenate stored blocks in physical order and compute their records
///
/// Block 0 of a sequential layout starts at the entry offset and needs no
/// relocation; every other block carries an explicit non-zero offset.
fn lay_out(blocks: Vec<(Vec<u8>, u32)>, layout: BlockLayout) -> PupResult<(Vec<u8>, Vec<BlockInfo>)> {
    let mut records = vec![BlockInfo::new(0, 0); blocks.len()];
    let mut payload = Vec::new();

    let order: Vec<usize> = match layout {
        BlockLayout::Sequential => (0..blocks.len()).collect(),
        BlockLayout::Reversed => {
            payload.resize(16, 0);
            (0..blocks.len()).rev().collect()
        }
    };

    let mut blocks: Vec<Option<(Vec<u8>, u32)>> = blocks.into_iter().map(Some).collect();
    for k in order {
        let Some((stored, size)) = blocks[k].take() else {
            continue;
        };
        let offset = u32::try_from(payload.len())
            .map_err(|_| PupError::InvalidBuilderInput("blocked entry exceeds 4 GiB".to_string()))?;
        records[k] = BlockInfo::new(offset, size);
        payload.extend_from_slice(&stored);
    }

    Ok((payload, records))
}
