//! Test utilities for hand-assembled containers
//!
//! [`ContainerImage`] stores payloads exactly as given, without the block
//! splitting done by [`PupBuilder::add_blocked_entry`], so tests can describe
//! malformed or unusual directories byte by byte.

use crate::pup::{ENTRY_SIZE, HEADER_SIZE, PupBuilder};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use std::io::Write;

/// Container assembled from raw payloads
pub struct ContainerImage {
    builder: PupBuilder,
    overrides: Vec<(usize, u64, u64)>,
}

impl ContainerImage {
    /// Create an empty image
    pub fn new() -> Self {
        Self {
            builder: PupBuilder::new(),
            overrides: Vec::new(),
        }
    }

    /// Append an entry; its compressed size is the payload length
    pub fn push(&mut self, flags: u32, data: Vec<u8>, uncompressed_size: u64) {
        let builder = std::mem::take(&mut self.builder);
        self.builder = builder.add_entry_with_flags(flags, data, uncompressed_size);
    }

    /// Overwrite the recorded sizes of entry `index` after layout
    pub fn override_sizes(&mut self, index: usize, compressed: u64, uncompressed: u64) {
        self.overrides.push((index, compressed, uncompressed));
    }

    /// Serialize header, directory and payloads
    pub fn finish(self) -> Vec<u8> {
        let mut bytes = self.builder.build().expect("container build");
        for (index, compressed, uncompressed) in self.overrides {
            // flags(4) + reserved(4) + offset(8), then the two sizes
            let record = (HEADER_SIZE + index as u64 * ENTRY_SIZE) as usize;
            bytes[record + 16..record + 24].copy_from_slice(&compressed.to_le_bytes());
            bytes[record + 24..record + 32].copy_from_slice(&uncompressed.to_le_bytes());
        }
        bytes
    }
}

/// Zlib-compress `data`
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("deflate write");
    encoder.finish().expect("deflate finish")
}

/// Highly compressible bytes
pub fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| b"pupette block data "[i % 19]).collect()
}

/// Incompressible pseudo-random bytes, reproducible per seed
pub fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill(&mut data[..]);
    data
}
