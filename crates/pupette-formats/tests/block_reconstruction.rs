//! Integration tests for blocked entry reconstruction.
//!
//! Containers are either produced by `PupBuilder` or assembled byte by byte
//! when a test needs a layout the builder never emits.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::Cursor;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use pupette_formats::pup::{
    BlockGeometry, BlockLayout, BlockPlan, BlockedOptions, ENTRY_SIZE, HEADER_SIZE, PupBuilder,
    PupError, PupReader, compose_flags,
};

fn table_payload(records: &[(u32, u32)]) -> Vec<u8> {
    let mut data = vec![0u8; records.len() * 32];
    for (offset, size) in records {
        data.extend_from_slice(&offset.to_le_bytes());
        data.extend_from_slice(&size.to_le_bytes());
    }
    data
}

fn counting_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

/// Two entries: a 6000-byte blocked entry with two raw blocks and its table.
#[test]
fn two_entry_container_reconstructs_6000_bytes() {
    let payload = counting_bytes(6000);
    let table = table_payload(&[(0, 4096), (4096, 1904)]);

    let bytes = PupBuilder::new()
        .add_entry_with_flags(compose_flags(5, Some(0), true, false), payload.clone(), 6000)
        .add_entry_with_flags(compose_flags(0, None, false, true), table.clone(), table.len() as u64)
        .build()
        .unwrap();

    let mut reader = PupReader::new(Cursor::new(bytes.clone())).unwrap();
    assert_eq!(reader.header().entry_count, 2);

    let entry0 = reader.entries()[0];
    assert_eq!(entry0.id(), 5);
    assert_eq!(entry0.block_size(), 4096);
    assert_eq!(entry0.offset, HEADER_SIZE + 2 * ENTRY_SIZE);
    assert_eq!(reader.tables().table_for(0), Some(1));

    let out = reader.read_entry(0).unwrap();
    assert_eq!(out.len(), 6000);

    let base = entry0.offset as usize;
    assert_eq!(&out[..4096], &bytes[base..base + 4096]);
    assert_eq!(&out[4096..], &bytes[base + 4096..base + 6000]);
}

#[test]
fn blocks_in_reverse_physical_order() {
    // Tail stored first, block 0 second, both addressed explicitly
    let first = counting_bytes(4096);
    let tail: Vec<u8> = (0..500).map(|i| (i % 13) as u8).collect();

    let mut payload = vec![0xCCu8; 16];
    let tail_offset = payload.len() as u32;
    payload.extend_from_slice(&tail);
    let first_offset = payload.len() as u32;
    payload.extend_from_slice(&first);

    let table = table_payload(&[(first_offset, 4096), (tail_offset, 500)]);
    let bytes = PupBuilder::new()
        .add_entry_with_flags(compose_flags(9, Some(0), true, false), payload, 4596)
        .add_entry_with_flags(compose_flags(0, None, false, true), table, 80)
        .build()
        .unwrap();

    let mut reader = PupReader::new(Cursor::new(bytes)).unwrap();
    let out = reader.read_entry(0).unwrap();
    assert_eq!(&out[..4096], &first[..]);
    assert_eq!(&out[4096..], &tail[..]);
}

#[test]
fn exact_multiple_uses_full_block_tail() {
    let data = counting_bytes(4096 * 2);
    let table = table_payload(&[(0, 4096), (4096, 4096)]);

    let bytes = PupBuilder::new()
        .add_entry_with_flags(compose_flags(7, Some(0), true, false), data.clone(), 8192)
        .add_entry_with_flags(compose_flags(0, None, false, true), table, 80)
        .build()
        .unwrap();

    let mut reader = PupReader::new(Cursor::new(bytes)).unwrap();
    let geometry = BlockGeometry::of(&reader.entries()[0]);
    assert_eq!(geometry.tail_size, 4096);

    let blocks = reader.block_table(0).unwrap().unwrap();
    assert_eq!(
        BlockPlan::classify(&blocks[1], 1, &geometry),
        BlockPlan::Whole { len: 4096 }
    );
    assert_eq!(reader.read_entry(0).unwrap(), data);
}

#[test]
fn missing_table_rejects_container() {
    let bytes = PupBuilder::new()
        .add_entry_with_flags(compose_flags(5, Some(0), true, false), vec![0u8; 16], 16)
        .add_entry_with_flags(compose_flags(7, None, false, true), vec![0u8; 40], 40)
        .build()
        .unwrap();

    let err = PupReader::new(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, PupError::MissingBlockTable { index: 0 }));
    assert!(err.to_string().contains("corrupt or unsupported container"));
}

#[test]
fn duplicate_table_rejects_container() {
    let table = table_payload(&[(0, 16)]);
    let bytes = PupBuilder::new()
        .add_entry_with_flags(compose_flags(5, Some(0), true, false), vec![0u8; 16], 16)
        .add_entry_with_flags(compose_flags(0, None, false, true), table.clone(), 40)
        .add_entry_with_flags(compose_flags(0, None, false, true), table, 40)
        .build()
        .unwrap();

    assert!(matches!(
        PupReader::new(Cursor::new(bytes)),
        Err(PupError::DuplicateBlockTable { index: 0, .. })
    ));
}

#[test]
fn truncated_block_table_is_format_error() {
    let bytes = PupBuilder::new()
        .add_entry_with_flags(compose_flags(5, Some(0), true, false), vec![0u8; 6000], 6000)
        .add_entry_with_flags(compose_flags(0, None, false, true), vec![0u8; 70], 70)
        .build()
        .unwrap();

    let mut reader = PupReader::new(Cursor::new(bytes)).unwrap();
    let err = reader.read_entry(0).unwrap_err();
    assert!(matches!(
        err,
        PupError::BlockTableTooShort {
            index: 0,
            expected: 80,
            actual: 70
        }
    ));
    assert!(err.is_format_error());
}

#[test]
fn container_file_on_disk() {
    let data: Vec<u8> = counting_bytes(4096 * 4 + 3);
    let bytes = PupBuilder::new()
        .add_blocked_entry(6, &data, BlockedOptions::default())
        .unwrap()
        .build()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("update.pup");
    std::fs::write(&path, bytes).unwrap();

    let mut reader = PupReader::open(&path).unwrap();
    assert_eq!(reader.read_entry(0).unwrap(), data);
}

fn layout() -> impl Strategy<Value = BlockLayout> {
    prop_oneof![Just(BlockLayout::Sequential), Just(BlockLayout::Reversed)]
}

/// Mix of runs that deflate well and runs that do not
fn payload() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            (1usize..3000, any::<u8>()).prop_map(|(n, b)| vec![b; n]),
            prop::collection::vec(any::<u8>(), 1..3000),
        ],
        1..8,
    )
    .prop_map(|runs| runs.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn blocked_round_trip(
        data in payload(),
        exponent in 0u32..2,
        compress in any::<bool>(),
        layout in layout(),
    ) {
        let options = BlockedOptions { exponent, compress, layout };
        let bytes = PupBuilder::new()
            .add_entry(3, b"leading entry", false)
            .unwrap()
            .add_blocked_entry(6, &data, options)
            .unwrap()
            .build()
            .unwrap();

        let mut reader = PupReader::new(Cursor::new(bytes)).unwrap();
        let entry = reader.entries()[1];
        let geometry = BlockGeometry::of(&entry);

        // Per-block uncompressed contributions add up to the entry size
        let total: u64 = (0..geometry.block_count).map(|k| geometry.logical_size(k)).sum();
        prop_assert_eq!(total, entry.uncompressed_size);

        let out = reader.read_entry(1).unwrap();
        prop_assert_eq!(out, data);
    }
}
