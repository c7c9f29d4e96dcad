//! End-to-end delta building against in-memory archives.

use std::io::Cursor;

use chrono::{TimeZone, Utc};
use hipdelta::prelude::*;
use hipdelta::{Error, Side};
use hipdelta_hip::testing::ArchiveBuilder;
use hipdelta_hip::{load_data, LayerEntry, Tag};
use pretty_assertions::assert_eq;

type Session = DeltaSession<Cursor<Vec<u8>>, Cursor<Vec<u8>>>;

struct Output {
    bytes: Vec<u8>,
    lines: Vec<String>,
    summary: DeltaSummary,
}

fn timestamp() -> Timestamp {
    Timestamp::from_datetime(&Utc.with_ymd_and_hms(2026, 10, 7, 9, 5, 1).unwrap())
}

fn session(original: &ArchiveBuilder, modified: &ArchiveBuilder) -> Session {
    DeltaSession::new(Cursor::new(original.build()), Cursor::new(modified.build()))
        .with_options(DeltaOptions::new().with_timestamp(timestamp()))
}

fn run(original: &ArchiveBuilder, modified: &ArchiveBuilder) -> hipdelta::Result<Output> {
    let mut lines = Vec::new();
    let mut out = Cursor::new(Vec::new());
    let summary = session(original, modified)
        .write_to(&mut out, &mut |event| lines.push(event.to_string()))?;

    Ok(Output {
        bytes: out.into_inner(),
        lines,
        summary,
    })
}

fn reparse(bytes: &[u8]) -> (HipArchive, BinaryReader<Cursor<Vec<u8>>>) {
    let mut reader = BinaryReader::new(Cursor::new(bytes.to_vec()));
    let archive = HipArchive::read(&mut reader).unwrap();
    (archive, reader)
}

/// `(id, type, size, checksum)` of every asset in directory order.
fn records(archive: &HipArchive) -> Vec<(u32, Tag, u32, u32)> {
    archive
        .assets()
        .iter()
        .map(|a| (a.id, a.type_tag(), a.size, a.checksum))
        .collect()
}

fn entry(type_code: u32, members: &[u32]) -> LayerEntry {
    LayerEntry {
        type_code,
        members: members.to_vec(),
    }
}

fn removed_and_added() -> (ArchiveBuilder, ArchiveBuilder) {
    let original = ArchiveBuilder::new()
        .asset(1, "a", b"XXXX")
        .asset(2, "b", b"YYYY")
        .layer(3, &[1, 2]);
    let modified = ArchiveBuilder::new()
        .asset(1, "a", b"XXXX")
        .asset(3, "c", b"ZZZZ")
        .layer(3, &[1, 3]);
    (original, modified)
}

#[test]
fn test_new_asset_and_removed_asset() {
    let (original, modified) = removed_and_added();
    let output = run(&original, &modified).unwrap();

    let (archive, mut reader) = reparse(&output.bytes);
    assert_eq!(archive.asset_count(), 2);
    assert_eq!(archive.layer_count(), 1);
    assert_eq!(
        records(&archive),
        vec![
            (3, Tag(*b"BINA"), 4, ArchiveBuilder::checksum_for(3)),
            (2, Tag(*b"TEXT"), 8, 0),
        ]
    );
    assert_eq!(archive.layers(), &[entry(3, &[3, 2])]);

    let mut assets = archive.assets().to_vec();
    load_data(&mut reader, &mut assets[0]).unwrap();
    load_data(&mut reader, &mut assets[1]).unwrap();
    assert_eq!(assets[0].data.as_deref(), Some(&b"ZZZZ"[..]));
    assert_eq!(assets[1].data.as_deref(), Some(&[0u8; 8][..]));
    assert_eq!(assets[0].display_name(), "c");
    assert_eq!(assets[1].display_name(), "dummy");

    assert_eq!(
        output.lines,
        vec![
            "2 asset(s) in original file, 2 asset(s) in modified file",
            "\nCreating new HIP with these assets:",
            "    Layer 2: [00000003] c",
            "",
            "Dummying asset [00000002] b",
        ]
    );

    assert_eq!(output.summary.real_assets, 1);
    assert_eq!(output.summary.dummy_assets, 1);
    assert_eq!(output.summary.unplaced_assets, 0);
    assert_eq!(output.summary.variant, Variant::Standard);
    assert_eq!(output.summary.written.asset_count, 2);
    assert_eq!(output.summary.written.layer_count, 1);
}

#[test]
fn test_identical_archives_give_empty_output() {
    let archive = ArchiveBuilder::new()
        .asset(1, "a", b"XXXX")
        .asset(2, "b", b"YYYY")
        .layer(3, &[1, 2]);
    let output = run(&archive, &archive).unwrap();

    let (parsed, _) = reparse(&output.bytes);
    assert_eq!(parsed.asset_count(), 0);
    assert_eq!(parsed.layer_count(), 0);
    assert!(parsed.assets().is_empty());
    assert!(parsed.layers().is_empty());
    assert_eq!(output.lines.len(), 3);
}

#[test]
fn test_changed_assets_use_modified_data() {
    let original = ArchiveBuilder::new()
        .asset(1, "same", b"AAAA")
        .asset(2, "edited", b"BBBB")
        .asset(3, "grown", b"CCCC")
        .layer(1, &[1, 2, 3]);
    let modified = ArchiveBuilder::new()
        .asset(1, "same", b"AAAA")
        .asset(2, "edited", b"BBbB")
        .asset(3, "grown", b"CCCCCCCCCCCCCCCCCC")
        .layer(1, &[1, 2, 3]);

    let output = run(&original, &modified).unwrap();
    let (archive, mut reader) = reparse(&output.bytes);

    let ids: Vec<u32> = archive.assets().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![2, 3]);

    let mut assets = archive.assets().to_vec();
    for asset in &mut assets {
        load_data(&mut reader, asset).unwrap();
    }
    assert_eq!(assets[0].data.as_deref(), Some(&b"BBbB"[..]));
    assert_eq!(assets[1].data.as_deref(), Some(&b"CCCCCCCCCCCCCCCCCC"[..]));
}

#[test]
fn test_layer_order_and_dummy_placement() {
    let original = ArchiveBuilder::new()
        .asset(10, "kept", b"k")
        .asset(11, "gone_texture", b"t")
        .asset(12, "gone_sound", b"s")
        .layer(0, &[10, 11])
        .layer(8, &[12]);
    let modified = ArchiveBuilder::new()
        .asset(20, "new_sound", b"n")
        .asset(10, "kept", b"k")
        .asset(21, "new_texture", b"x")
        .layer(0, &[21, 10])
        .layer(8, &[20]);

    let output = run(&original, &modified).unwrap();
    let (archive, _) = reparse(&output.bytes);

    // Standard table: code 0 is bucket 6, code 8 is bucket 9.
    assert_eq!(archive.layers(), &[entry(0, &[21, 11]), entry(8, &[20, 12])]);
    let ids: Vec<u32> = archive.assets().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![21, 11, 20, 12]);

    assert_eq!(
        output.lines[2..].to_vec(),
        vec![
            "    Layer 6: [00000015] new_texture",
            "    Layer 9: [00000014] new_sound",
            "",
            "Dummying asset [0000000b] gone_texture",
            "Dummying asset [0000000c] gone_sound",
        ]
    );
}

#[test]
fn test_padding_and_alignment() {
    let original = ArchiveBuilder::new().asset(1, "gone", b"g").layer(1, &[1]);
    let modified = ArchiveBuilder::new()
        .asset(2, "sixteen", &[7u8; 16])
        .asset(3, "five", b"12345")
        .asset(4, "empty", b"")
        .layer(1, &[2, 3, 4]);

    let output = run(&original, &modified).unwrap();
    let (archive, _) = reparse(&output.bytes);

    let pads: Vec<(u32, u32)> = archive.assets().iter().map(|a| (a.id, a.pad)).collect();
    assert_eq!(pads, vec![(2, 16), (3, 11), (4, 16), (1, 8)]);

    for asset in archive.assets() {
        assert!(asset.pad > 0 && asset.pad <= 16);
        assert_eq!((asset.size + asset.pad) % 16, 0);
        assert_eq!(asset.offset % 16, 0);
    }

    // The first asset starts the data section on a 32-byte boundary.
    assert_eq!(archive.assets()[0].offset % 32, 0);
    let first = archive.assets()[0].offset as usize;
    assert_eq!(output.bytes[first - 1], 0x33);

    // Consecutive assets are packed back to back.
    for pair in archive.assets().windows(2) {
        assert_eq!(pair[1].offset, pair[0].offset + pair[0].size + pair[0].pad);
    }
    let last = archive.assets().last().unwrap();
    assert_eq!(output.bytes.len() as u32, last.offset + last.size + last.pad);
}

#[test]
fn test_header_and_timestamp() {
    let (original, modified) = removed_and_added();
    let modified_bytes = modified.build();
    let output = run(&original, &modified).unwrap();

    assert_eq!(&output.bytes[..0x30], &modified_bytes[..0x30]);
    assert_eq!(&output.bytes[0x30..0x34], b"PCNT");
    assert_eq!(&output.bytes[0x4C..0x50], b"PCRT");
    assert_eq!(&output.bytes[0x50..0x54], &30u32.to_be_bytes());
    assert_eq!(&output.bytes[0x54..0x58], &timestamp().raw().to_be_bytes());
    assert_eq!(&output.bytes[0x58..0x72], b"Wed Oct  7 09:05:01 2026\n\0");
    assert_eq!(&output.bytes[0x72..0x76], b"PMOD");
    assert_eq!(&output.bytes[0x7A..0x7E], &timestamp().raw().to_be_bytes());

    let (archive, _) = reparse(&output.bytes);
    assert_eq!(archive.platform().bytes(), ArchiveBuilder::STANDARD_PLATFORM);
}

#[test]
fn test_legacy_variant() {
    let original = ArchiveBuilder::new()
        .platform(ArchiveBuilder::LEGACY_PLATFORM)
        .asset(1, "old", b"o")
        .layer(6, &[1]);
    let modified = ArchiveBuilder::new()
        .platform(ArchiveBuilder::LEGACY_PLATFORM)
        .asset(2, "model", b"m")
        .asset(3, "script", b"s")
        .layer(7, &[3])
        .layer(10, &[2]);

    let output = run(&original, &modified).unwrap();
    assert_eq!(output.summary.variant, Variant::Legacy);

    let (archive, _) = reparse(&output.bytes);
    // Legacy table: code 10 is bucket 2, code 6 bucket 7, code 7 bucket 8.
    assert_eq!(
        archive.layers(),
        &[entry(10, &[2]), entry(6, &[1]), entry(7, &[3])]
    );
    assert_eq!(output.lines[2], "    Layer 8: [00000003] script");
    assert_eq!(output.lines[3], "    Layer 2: [00000002] model");
}

#[test]
fn test_asset_in_two_layers_is_written_twice() {
    let original = ArchiveBuilder::new().layer(1, &[]);
    let modified = ArchiveBuilder::new()
        .asset(5, "shared", b"shared")
        .layer(1, &[5])
        .layer(2, &[5]);

    let output = run(&original, &modified).unwrap();
    let (archive, _) = reparse(&output.bytes);

    assert_eq!(archive.asset_count(), 2);
    assert_eq!(archive.assets().len(), 2);
    assert_eq!(archive.layers(), &[entry(1, &[5]), entry(2, &[5])]);
    assert_eq!(output.summary.real_assets, 2);
}

#[test]
fn test_asset_without_layer_is_left_out() {
    let original = ArchiveBuilder::new();
    let modified = ArchiveBuilder::new()
        .asset(1, "placed", b"p")
        .asset(2, "orphan", b"o")
        .layer(4, &[1]);

    let output = run(&original, &modified).unwrap();
    let (archive, _) = reparse(&output.bytes);

    assert_eq!(records(&archive).len(), 1);
    assert_eq!(archive.assets()[0].id, 1);
    assert_eq!(output.summary.unplaced_assets, 1);
}

#[test]
fn test_platform_mismatch() {
    let original = ArchiveBuilder::new().asset(1, "a", b"a").layer(1, &[1]);
    let modified = ArchiveBuilder::new()
        .platform(ArchiveBuilder::LEGACY_PLATFORM)
        .asset(1, "a", b"a")
        .layer(1, &[1]);

    let err = run(&original, &modified).err().unwrap();
    assert!(matches!(
        err,
        Error::PlatformMismatch {
            original_len: 18,
            modified_len: 16
        }
    ));
}

#[test]
fn test_platform_content_mismatch() {
    // Same length as the standard block, last byte differs.
    let original = ArchiveBuilder::new().asset(1, "a", b"a").layer(1, &[1]);
    let modified = ArchiveBuilder::new()
        .platform(b"\0\0\0\x02GCPC\0\0Standarx")
        .asset(1, "a", b"a")
        .layer(1, &[1]);

    let err = run(&original, &modified).err().unwrap();
    assert!(matches!(err, Error::PlatformContentMismatch { offset: 17 }));
    assert!(!err.to_string().contains("18 vs 18"));
}

#[test]
fn test_not_a_hip_file() {
    let modified = ArchiveBuilder::new().asset(1, "a", b"a").layer(1, &[1]);
    let mut bytes = modified.build();
    bytes[..4].copy_from_slice(b"RIFF");

    let mut session = DeltaSession::new(Cursor::new(bytes), Cursor::new(modified.build()));
    let err = session.plan(&mut |_| {}).err().unwrap();

    assert!(matches!(
        err,
        Error::Input {
            side: Side::Original,
            source: hipdelta_hip::Error::NotHip { .. }
        }
    ));
    // The cause is only reachable through `source()`, not repeated in the message.
    assert_eq!(err.to_string(), "original archive");
    let cause = std::error::Error::source(&err).unwrap().to_string();
    assert!(cause.contains("not a HIP file"));
}

#[test]
fn test_plan_without_writing() {
    let (original, modified) = removed_and_added();
    let mut session = session(&original, &modified);
    let delta = session.plan(&mut |_| {}).unwrap();

    assert_eq!(delta.original_assets(), 2);
    assert_eq!(delta.modified_assets(), 2);
    assert!(!delta.is_empty());
    let ordered: Vec<u32> = delta.plan().ordered().map(|a| a.id).collect();
    assert_eq!(ordered, vec![3, 2]);
    assert!(delta.plan().ordered().all(|a| a.data.is_some()));
}
