//! PUP error types

use thiserror::Error;

/// PUP-specific error type
#[derive(Debug, Error)]
pub enum PupError {
    /// A blocked entry's identifier falls in the reserved 0xE00/0xF00 range
    #[error("corrupt or unsupported container: blocked entry {index} has reserved id 0x{id:03X}")]
    ReservedBlockedId {
        /// Directory index of the blocked entry
        index: usize,
        /// Identifier taken from the entry flags
        id: u32,
    },

    /// No block table entry references a blocked entry
    #[error("corrupt or unsupported container: no block table for blocked entry {index}")]
    MissingBlockTable {
        /// Directory index of the blocked entry
        index: usize,
    },

    /// More than one block table entry references the same blocked entry
    #[error(
        "corrupt or unsupported container: blocked entry {index} has {} block tables: {tables:?}",
        .tables.len()
    )]
    DuplicateBlockTable {
        /// Directory index of the blocked entry
        index: usize,
        /// Directory indices of every matching table entry
        tables: Vec<usize>,
    },

    /// Decoded block table payload cannot hold all block records
    #[error(
        "corrupt or unsupported container: block table for entry {index} is {actual} bytes, need {expected}"
    )]
    BlockTableTooShort {
        /// Directory index of the blocked entry
        index: usize,
        /// Bytes required for the reserved region plus records
        expected: u64,
        /// Bytes actually decoded
        actual: u64,
    },

    /// An inflated block did not produce the expected number of bytes
    #[error(
        "corrupt or unsupported container: entry {index} block {block} inflated to {actual} bytes, expected {expected}"
    )]
    BlockSizeMismatch {
        /// Directory index of the blocked entry
        index: usize,
        /// Logical block number
        block: u64,
        /// Expected uncompressed length
        expected: u64,
        /// Length actually produced
        actual: u64,
    },

    /// Source stream ended before the requested number of bytes
    #[error("unexpected end of stream: expected {expected} bytes, copied {copied}")]
    UnexpectedEof {
        /// Bytes requested
        expected: u64,
        /// Bytes copied before the stream ended
        copied: u64,
    },

    /// Entry index outside the directory
    #[error(
        "corrupt or unsupported container: entry index {index} out of range (directory has {count} entries)"
    )]
    EntryOutOfRange {
        /// Requested index
        index: usize,
        /// Number of directory entries
        count: usize,
    },

    /// Size does not fit the platform or the container's field width
    #[error("size out of range: {0}")]
    SizeOutOfRange(u64),

    /// Decompression failed
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// Compression failed (builder only)
    #[error("compression error: {0}")]
    CompressionError(String),

    /// Invalid builder input
    #[error("invalid builder input: {0}")]
    InvalidBuilderInput(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for PUP operations
pub type PupResult<T> = Result<T, PupError>;

impl PupError {
    /// Whether this error reports a structural inconsistency in the container
    /// rather than an I/O failure
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::ReservedBlockedId { .. }
                | Self::MissingBlockTable { .. }
                | Self::DuplicateBlockTable { .. }
                | Self::BlockTableTooShort { .. }
                | Self::BlockSizeMismatch { .. }
                | Self::EntryOutOfRange { .. }
                | Self::DecompressionFailed(_)
        )
    }
}
