//! Directory listing for `--list`

use pupette_formats::pup::{PupEntry, PupHeader, TableIndex, output_path};

/// Column header printed above the entry lines
pub const LISTING_HEADER: &str = "  #    id  flags       offset        compressed    uncompressed  block   table  output";

/// Summary line for the container header
pub fn header_line(header: &PupHeader) -> String {
    let platform = header
        .known_platform()
        .map_or_else(|| "unknown".to_string(), |p| format!("{p:?}"));
    format!(
        "magic {:02X?} ({}), {} entries, file size {}",
        header.magic, platform, header.entry_count, header.file_size
    )
}

/// One line describing entry `index`, `None` past the end of the directory
pub fn entry_line(entries: &[PupEntry], tables: &TableIndex, index: usize) -> Option<String> {
    let entry = entries.get(index)?;

    let block = if entry.is_blocked() {
        entry.block_size().to_string()
    } else {
        "-".to_string()
    };

    let table = match (tables.table_for(index), tables.owner_of(index)) {
        (Some(table), _) => format!("->{table}"),
        (None, Some(owner)) => format!("<-{owner}"),
        (None, None) => "-".to_string(),
    };

    let output = output_path(entries, tables, index)
        .map_or_else(|| "(skipped)".to_string(), |p| p.display().to_string());

    Some(format!(
        "{:>3} {:>5}  {:08X}  {:>12}  {:>12}  {:>12}  {:>6}  {:>5}  {}",
        index,
        entry.id(),
        entry.flags,
        entry.offset,
        entry.compressed_size,
        entry.uncompressed_size,
        block,
        table,
        output
    ))
}
