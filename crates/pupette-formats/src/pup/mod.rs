//! PUP firmware-update container format
//!
//! A PUP container is a 32-byte header, a directory of 32-byte entry records
//! and the entry payloads. A payload is stored raw, as one zlib stream, or
//! split into blocks. Blocked entries are described by a companion block
//! table entry holding per-block `(offset, size)` records; inside a compressed
//! blocked entry each block is either deflated (with padding counted in the low
//! nibble of its size) or stored raw when deflate did not help.
//!
//! # Features
//!
//! - Header and directory parsing with flag accessors
//! - Block table association, resolved once per directory
//! - Block reconstruction for raw, deflated and relocated blocks
//! - Named extraction of every entry to a directory
//! - Builder for producing containers

mod block;
mod builder;
mod copy;
mod entry;
mod error;
mod extract;
mod header;
mod naming;
mod reader;
mod table;

pub use block::{
    BLOCK_HASH_SIZE, BLOCK_INFO_SIZE, BlockGeometry, BlockInfo, BlockPlan, PADDING_MASK,
    parse_block_table,
};
pub use builder::{BlockLayout, BlockedOptions, MAX_BLOCK_EXPONENT, MAX_ENTRY_ID, PupBuilder};
pub use copy::{COPY_BUFFER_SIZE, copy_exact};
pub use entry::{
    BLOCK_EXPONENT_MASK, BLOCK_EXPONENT_SHIFT, ENTRY_SIZE, FLAG_BLOCK_TABLE, FLAG_BLOCKED,
    FLAG_COMPRESSED, ID_SHIFT, PupEntry, compose_flags,
};
pub use error::{PupError, PupResult};
pub use extract::{ExtractStats, extract_all};
pub use header::{HEADER_SIZE, PS4_MAGIC, PS5_MAGIC, Platform, PupHeader};
pub use naming::{DEVICES_DIR, TABLES_DIR, UNKNOWN_DIR, device_target, known_file_name, output_path};
pub use reader::PupReader;
pub use table::TableIndex;
