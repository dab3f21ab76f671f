//! Container reader: directory parsing, plain decode and block reconstruction

use super::block::{BlockGeometry, BlockInfo, BlockPlan, parse_block_table};
use super::copy::{copy_exact, read_exact_vec};
use super::entry::PupEntry;
use super::error::{PupError, PupResult};
use super::header::PupHeader;
use super::table::TableIndex;
use binrw::BinReaderExt;
use flate2::read::ZlibDecoder;
use std::fs::File;
use std::io::{BufReader, Cursor, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, info, trace, warn};

/// Reader over a seekable PUP container
///
/// The header, the directory and the block table associations are read once
/// in [`PupReader::new`]. Every extraction call then moves the shared input
/// position, so entries are extracted one at a time.
#[derive(Debug)]
pub struct PupReader<R> {
    inner: R,
    header: PupHeader,
    entries: Vec<PupEntry>,
    tables: TableIndex,
}

impl PupReader<BufReader<File>> {
    /// Open a container file
    pub fn open<P: AsRef<Path>>(path: P) -> PupResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> PupReader<R> {
    /// Parse the header and directory and resolve block table associations
    pub fn new(mut inner: R) -> PupResult<Self> {
        inner.seek(SeekFrom::Start(0))?;
        let header: PupHeader = inner.read_le()?;

        if header.known_platform().is_none() {
            warn!("Unrecognized container magic {:02X?}", header.magic);
        }

        inner.seek(SeekFrom::Start(header.directory_offset()))?;
        let mut entries = Vec::with_capacity(usize::from(header.entry_count));
        for _ in 0..header.entry_count {
            entries.push(inner.read_le::<PupEntry>()?);
        }

        let tables = TableIndex::resolve(&entries)?;

        info!(
            "Container: {} entries, {} blocked, file size {}",
            entries.len(),
            tables.len(),
            header.file_size
        );

        Ok(Self {
            inner,
            header,
            entries,
            tables,
        })
    }

    /// Container header
    pub fn header(&self) -> &PupHeader {
        &self.header
    }

    /// Directory entries in on-disk order
    pub fn entries(&self) -> &[PupEntry] {
        &self.entries
    }

    /// Block table associations
    pub fn tables(&self) -> &TableIndex {
        &self.tables
    }

    /// Entry at directory index `index`
    pub fn entry(&self, index: usize) -> PupResult<PupEntry> {
        self.entries
            .get(index)
            .copied()
            .ok_or(PupError::EntryOutOfRange {
                index,
                count: self.entries.len(),
            })
    }

    /// Release the underlying source
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Extract the entry at `index` into `output`, returning the bytes produced
    ///
    /// Blocked entries may reposition `output` relative to its position at the
    /// start of the call, so it must be a random-access sink.
    pub fn extract_entry<W: Write + Seek>(&mut self, index: usize, output: &mut W) -> PupResult<u64> {
        let entry = self.entry(index)?;
        debug!(
            "Extracting entry {} (id {}, offset {}, {} -> {} bytes, compressed: {}, blocked: {})",
            index,
            entry.id(),
            entry.offset,
            entry.compressed_size,
            entry.uncompressed_size,
            entry.is_compressed(),
            entry.is_blocked()
        );

        if entry.is_blocked() {
            self.reconstruct_blocked(index, &entry, output)
        } else {
            self.decode_plain(&entry, output)
        }
    }

    /// Extract the entry at `index` into memory
    pub fn read_entry(&mut self, index: usize) -> PupResult<Vec<u8>> {
        let mut output = Cursor::new(Vec::new());
        self.extract_entry(index, &mut output)?;
        Ok(output.into_inner())
    }

    /// Decode the block records of the blocked entry at `index`
    ///
    /// Returns `None` for blocked entries that are not compressed: their blocks
    /// are contiguous and need no table.
    pub fn block_table(&mut self, index: usize) -> PupResult<Option<Vec<BlockInfo>>> {
        let entry = self.entry(index)?;
        if !entry.is_blocked() || !entry.is_compressed() {
            return Ok(None);
        }
        let geometry = BlockGeometry::of(&entry);
        self.decode_block_table(index, &geometry).map(Some)
    }

    fn decode_block_table(&mut self, index: usize, geometry: &BlockGeometry) -> PupResult<Vec<BlockInfo>> {
        let table_index = self
            .tables
            .table_for(index)
            .ok_or(PupError::MissingBlockTable { index })?;
        let table_entry = self.entry(table_index)?;

        // The table entry is itself a plain entry
        let mut data = Vec::new();
        self.decode_plain(&table_entry, &mut data)?;

        let blocks = parse_block_table(&data, geometry, index)?;
        debug!(
            "Entry {}: block table entry {} holds {} blocks of {} bytes",
            index,
            table_index,
            blocks.len(),
            geometry.block_size
        );
        Ok(blocks)
    }

    /// Decode a non-blocked entry: raw copy or a single deflate stream
    fn decode_plain<W: Write + ?Sized>(&mut self, entry: &PupEntry, output: &mut W) -> PupResult<u64> {
        self.inner.seek(SeekFrom::Start(entry.offset))?;

        if entry.is_compressed() {
            let limited = (&mut self.inner).take(entry.compressed_size);
            let mut decoder = ZlibDecoder::new(limited);
            copy_exact(&mut decoder, output, entry.uncompressed_size).map_err(inflate_error)?;
            Ok(entry.uncompressed_size)
        } else {
            copy_exact(&mut self.inner, output, entry.compressed_size)?;
            Ok(entry.compressed_size)
        }
    }

    fn reconstruct_blocked<W: Write + Seek>(
        &mut self,
        index: usize,
        entry: &PupEntry,
        output: &mut W,
    ) -> PupResult<u64> {
        let geometry = BlockGeometry::of(entry);
        let blocks = if entry.is_compressed() {
            Some(self.decode_block_table(index, &geometry)?)
        } else {
            None
        };

        let base = output.stream_position()?;
        self.inner.seek(SeekFrom::Start(entry.offset))?;

        let mut compressed_left = entry.compressed_size;
        let mut uncompressed_left = entry.uncompressed_size;
        let mut produced_total = 0u64;

        for (k, info) in (0..geometry.block_count).zip(block_records(blocks.as_deref())) {
            let (consumed, produced) = match info {
                None => {
                    let len = compressed_left.min(geometry.block_size);
                    copy_exact(&mut self.inner, output, len)?;
                    (len, len)
                }
                Some(info) => {
                    if info.is_relocated() {
                        let input_at = entry
                            .offset
                            .checked_add(u64::from(info.offset))
                            .ok_or(PupError::SizeOutOfRange(entry.offset))?;
                        let output_at = base
                            .checked_add(geometry.output_offset(k))
                            .ok_or(PupError::SizeOutOfRange(base))?;
                        self.inner.seek(SeekFrom::Start(input_at))?;
                        output.seek(SeekFrom::Start(output_at))?;
                    }

                    let plan = BlockPlan::classify(info, k, &geometry);
                    trace!(
                        "Entry {} block {}: offset {}, size 0x{:X}, {:?}",
                        index, k, info.offset, info.size, plan
                    );

                    match plan {
                        BlockPlan::Whole { len } | BlockPlan::RawTail { len } => {
                            copy_exact(&mut self.inner, output, len)?;
                            (len, len)
                        }
                        BlockPlan::Deflated {
                            input_len,
                            stored_len,
                        } => {
                            let expected = uncompressed_left.min(geometry.block_size);
                            let raw = read_exact_vec(&mut self.inner, input_len)?;
                            let inflated = inflate_block(&raw, expected)?;
                            if inflated.len() as u64 != expected {
                                return Err(PupError::BlockSizeMismatch {
                                    index,
                                    block: k,
                                    expected,
                                    actual: inflated.len() as u64,
                                });
                            }
                            output.write_all(&inflated)?;
                            (stored_len, expected)
                        }
                    }
                }
            };

            compressed_left = compressed_left.saturating_sub(consumed);
            uncompressed_left = uncompressed_left.saturating_sub(produced);
            produced_total += produced;
        }

        debug!(
            "Entry {}: reconstructed {} bytes from {} blocks",
            index, produced_total, geometry.block_count
        );
        Ok(produced_total)
    }
}

/// Per-block table records, or an endless run of `None` for untabled entries
fn block_records(blocks: Option<&[BlockInfo]>) -> Box<dyn Iterator<Item = Option<&BlockInfo>> + '_> {
    match blocks {
        Some(blocks) => Box::new(blocks.iter().map(Some)),
        None => Box::new(std::iter::repeat(None)),
    }
}

/// Inflate one block, reading at most one byte past `expected`
fn inflate_block(raw: &[u8], expected: u64) -> PupResult<Vec<u8>> {
    let mut inflated = Vec::with_capacity(usize::try_from(expected).unwrap_or(0));
    ZlibDecoder::new(raw)
        .take(expected + 1)
        .read_to_end(&mut inflated)
        .map_err(|e| PupError::DecompressionFailed(e.to_string()))?;
    Ok(inflated)
}

/// Map deflate stream corruption to a format error
fn inflate_error(err: PupError) -> PupError {
    match err {
        PupError::Io(e) if matches!(e.kind(), ErrorKind::InvalidData | ErrorKind::InvalidInput) => {
            PupError::DecompressionFailed(e.to_string())
        }
        other => other,
    }
}
