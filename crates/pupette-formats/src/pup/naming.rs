//! Output file names for directory entries

use super::entry::PupEntry;
use super::table::TableIndex;
use std::path::PathBuf;

/// Entries with a fixed file name
const KNOWN_FILES: &[(u32, &str)] = &[
    (3, "wlan_firmware.bin"),
    (6, "system_fs_image.bin"),
    (9, "recovery_fs_image.bin"),
    (11, "preinst_fs_image.bin"),
    (12, "system_ex_fs_image.bin"),
    (257, "eula.xml"),
];

/// Entries written to a device node by the updater
const DEVICE_TARGETS: &[(u32, &str)] = &[
    (1, "/dev/sflash0s0x32b"),
    (13, "/dev/sflash0s0x32b"),
    (2, "/dev/sflash0s0x33"),
    (14, "/dev/sflash0s0x33"),
    (3, "/dev/sflash0s0x38"),
    (4, "/dev/sflash0s1.cryptx2b"),
    (5, "/dev/sflash0s1.cryptx3b"),
    (10, "/dev/sflash0s1.cryptx40"),
    (9, "/dev/da0x0.crypt"),
    (11, "/dev/da0x1.crypt"),
    (7, "/dev/da0x2"),
    (8, "/dev/da0x3.crypt"),
    (6, "/dev/da0x4b.crypt"),
    (12, "/dev/da0x5b.crypt"),
    (3328, "/dev/sc_fw_update0"),
    (3336, "/dev/sc_fw_update0"),
    (3335, "/dev/sc_fw_update0"),
    (3329, "cd0"),
    (3330, "da0"),
    (16, "/dev/sbram0"),
    (17, "/dev/sbram0"),
    (18, "/dev/sbram0"),
];

/// Directory for block table entries
pub const TABLES_DIR: &str = "tables";
/// Directory for device images
pub const DEVICES_DIR: &str = "devices";
/// Directory for entries with no known name
pub const UNKNOWN_DIR: &str = "unknown";

/// Fixed file name for `id`, if any
pub fn known_file_name(id: u32) -> Option<&'static str> {
    lookup(KNOWN_FILES, id)
}

/// Device node `id` is written to, if any
pub fn device_target(id: u32) -> Option<&'static str> {
    lookup(DEVICE_TARGETS, id)
}

fn lookup(table: &[(u32, &'static str)], id: u32) -> Option<&'static str> {
    table
        .iter()
        .find_map(|&(key, name)| (key == id).then_some(name))
}

/// Relative output path for the entry at `index`, or `None` when it is skipped
pub fn output_path(entries: &[PupEntry], tables: &TableIndex, index: usize) -> Option<PathBuf> {
    let entry = entries.get(index)?;
    if entry.is_special() {
        return None;
    }

    if let Some(owner) = tables.owner_of(index) {
        let owner_id = entries.get(owner).map_or(0, PupEntry::id);
        return Some(PathBuf::from(TABLES_DIR).join(format!("{} for {}.bin", entry.id(), owner_id)));
    }

    let id = entry.id();
    if let Some(name) = known_file_name(id) {
        return Some(PathBuf::from(name));
    }

    if let Some(device) = device_target(id) {
        let base = device.rsplit('/').next().unwrap_or(device);
        return Some(PathBuf::from(DEVICES_DIR).join(format!("{id}__{base}.bin")));
    }

    Some(PathBuf::from(UNKNOWN_DIR).join(format!("{id}.bin")))
}
