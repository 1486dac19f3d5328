//! Tests for decoding and rendering whole catalogs.

mod common;

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use common::{event_record_with, group_record, schema_record, CatalogBuilder, EventSpec, PAGE};
use hv_24x7_catalog::{
    render_catalog, CatalogFile, CatalogReport, Error, RecordError, Renderer, SectionKind,
    Verbosity, WalkEnd,
};

const CHIP: u8 = 1;
const CORE: u8 = 2;

fn render(data: &[u8], verbosity: Verbosity) -> (String, CatalogReport) {
    let catalog = CatalogFile::from_bytes(data).unwrap();
    let mut renderer = Renderer::new(Vec::new(), verbosity);
    let report = render_catalog(&catalog, &mut renderer).unwrap();
    (String::from_utf8(renderer.into_inner()).unwrap(), report)
}

fn descriptor_lines(output: &str) -> Vec<&str> {
    output.lines().filter(|line| line.starts_with("domain=")).collect()
}

fn minimal_catalog() -> Vec<u8> {
    CatalogBuilder::new()
        .schema(schema_record(1, &[[1, 0, 8, 0], [2, 8, 8, 0]]))
        .group(group_record(CHIP, b"CHIP_GROUP", b"Chip counters", &[0]))
        .event(EventSpec::new(CHIP, b"PM_CHIP_EVT").record())
        .build()
}

#[test]
fn minimal_catalog_renders_one_descriptor() {
    let (output, report) = render(&minimal_catalog(), Verbosity::DEFAULT);
    assert_eq!(
        output,
        "PM_CHIP_EVT:\ndomain=0x1,offset=0x30,starting_index=chip,lpar=0x0\n"
    );
    assert!(report.is_clean());
    assert_eq!(report.schemas.visited, 1);
    assert_eq!(report.groups.visited, 1);
    assert_eq!(report.events.visited, 1);
    assert!(report.events.count_matches());
}

#[test]
fn rendering_is_deterministic() {
    let data = minimal_catalog();
    for verbosity in [Verbosity::DEFAULT, Verbosity::EVENT_DETAIL, Verbosity::HEX_DUMP] {
        let (first, _) = render(&data, verbosity);
        let (second, _) = render(&data, verbosity);
        assert_eq!(first, second);
    }
}

#[test]
fn core_event_expands_to_five_domains() {
    let data = CatalogBuilder::new()
        .event(EventSpec::new(CORE, b"EVT").record())
        .build();
    let (output, _) = render(&data, Verbosity::DEFAULT);
    assert_eq!(
        descriptor_lines(&output),
        vec![
            "domain=0x2,offset=0x30,starting_index=core,lpar=0x0",
            "domain=0x3,offset=0x30,starting_index=vcpu,lpar=sibling_guest_id",
            "domain=0x4,offset=0x30,starting_index=vcpu,lpar=sibling_guest_id",
            "domain=0x5,offset=0x30,starting_index=vcpu,lpar=sibling_guest_id",
            "domain=0x6,offset=0x30,starting_index=vcpu,lpar=sibling_guest_id",
        ]
    );
    assert!(output.starts_with("EVT:\n"));
}

#[test]
fn placeholder_events_are_skipped() {
    let mut placeholder = EventSpec::new(CHIP, b"UNUSED");
    placeholder.group_record_len = 0;
    let data = CatalogBuilder::new()
        .event(EventSpec::new(CHIP, b"FIRST").record())
        .event(placeholder.record())
        .event(EventSpec::new(CHIP, b"SECOND").record())
        .build();
    let (output, report) = render(&data, Verbosity::DEFAULT);
    assert!(!output.contains("UNUSED"));
    assert_eq!(descriptor_lines(&output).len(), 2);
    assert!(output.contains("FIRST:\n"));
    assert!(output.contains("SECOND:\n"));
    assert_eq!(report.events.skipped, 1);
    assert_eq!(report.events.visited, 2);
    assert!(report.events.count_matches());
}

#[test]
fn corrupted_event_length_stops_the_event_walk() {
    let first = EventSpec::new(CHIP, b"BEFORE").record();
    let mut corrupted = EventSpec::new(CHIP, b"CORRUPT").record();
    corrupted[0..2].copy_from_slice(&0xfff0u16.to_be_bytes());
    let data = CatalogBuilder::new()
        .event(first.clone())
        .event(corrupted)
        .event(EventSpec::new(CHIP, b"AFTER").record())
        .build();
    let (output, report) = render(&data, Verbosity::DEFAULT);
    assert!(output.contains("BEFORE:\n"));
    assert!(!output.contains("CORRUPT"));
    assert!(!output.contains("AFTER"));
    assert_eq!(report.events.visited, 1);
    assert_eq!(
        report.events.end,
        WalkEnd::Aborted(RecordError::EndsAfterSection {
            kind: SectionKind::Event,
            offset: first.len(),
            length: 0xfff0,
            section_len: PAGE,
        })
    );
    assert!(!report.events.count_matches());
    assert!(!report.is_clean());
}

#[test]
fn long_desc_overflowing_into_next_event_stops_the_walk() {
    let mut overflowing = EventSpec::new(CHIP, b"OVERFLOW").record();
    assert_eq!(overflowing.len(), 48);
    // The long description now claims bytes of the following record.
    overflowing[36..38].copy_from_slice(&27u16.to_be_bytes());
    let data = CatalogBuilder::new()
        .event(overflowing)
        .event(EventSpec::new(CHIP, b"NEXT").record())
        .build();
    let (output, report) = render(&data, Verbosity::DEFAULT);
    assert!(output.is_empty());
    assert!(matches!(
        report.events.end,
        WalkEnd::Aborted(RecordError::ExceedsOwnLength { offset: 0, .. })
    ));
}

#[test]
fn bad_group_section_does_not_stop_events() {
    let mut bad_group = group_record(CHIP, b"BROKEN", b"", &[]);
    // A zero name length cannot describe its own length field.
    bad_group[48..50].copy_from_slice(&0u16.to_be_bytes());
    let mut event = EventSpec::new(CHIP, b"ORPHAN");
    event.primary_group_ix = 0;
    let data = CatalogBuilder::new()
        .group(bad_group)
        .event(event.record())
        .build();
    let (output, report) = render(&data, Verbosity::EVENT_DETAIL);
    assert!(report.groups.is_aborted());
    assert_eq!(report.groups.visited, 0);
    assert_eq!(report.events.visited, 1);
    assert!(output.contains("ORPHAN:\ndomain=0x1,offset=0x30,starting_index=chip,lpar=0x0\n"));
    assert!(output.contains(".primary_group_ix = \"UNKNOWN\" /* 0 */,"));
}

#[test]
fn primary_group_is_resolved_by_position() {
    let mut event = EventSpec::new(CHIP, b"EVT");
    event.primary_group_ix = 1;
    let mut stray = EventSpec::new(CHIP, b"STRAY");
    stray.primary_group_ix = 7;
    let data = CatalogBuilder::new()
        .group(group_record(CHIP, b"G0", b"", &[]))
        .group(group_record(CHIP, b"G1", b"", &[0]))
        .event(event.record())
        .event(stray.record())
        .build();
    let (output, report) = render(&data, Verbosity::EVENT_DETAIL);
    assert!(output.contains(".primary_group_ix = \"G1\" /* 1 */,"));
    assert!(output.contains(".primary_group_ix = \"UNKNOWN\" /* 7 */,"));
    assert_eq!(report.events.visited, 2);
    assert_eq!(descriptor_lines(&output).len(), 2);
}

#[test]
fn unknown_event_domain_is_not_rendered() {
    let data = CatalogBuilder::new()
        .event(EventSpec::new(9, b"ODD").record())
        .event(EventSpec::new(4, b"VCPU_ONLY").record())
        .event(EventSpec::new(CHIP, b"FINE").record())
        .build();
    let (output, report) = render(&data, Verbosity::DEFAULT);
    assert_eq!(output, "FINE:\ndomain=0x1,offset=0x30,starting_index=chip,lpar=0x0\n");
    assert_eq!(report.events.visited, 3);
}

#[test]
fn declared_count_smaller_than_records() {
    let mut builder = CatalogBuilder::new()
        .event(EventSpec::new(CHIP, b"ONE").record())
        .event(EventSpec::new(CHIP, b"TWO").record());
    builder.counts.2 = Some(1);
    let (output, report) = render(&builder.build(), Verbosity::DEFAULT);
    assert!(output.contains("ONE:"));
    assert!(!output.contains("TWO:"));
    assert!(matches!(report.events.end, WalkEnd::Padding { .. }));
    assert!(report.events.count_matches());
}

#[test]
fn declared_count_larger_than_records() {
    let mut builder = CatalogBuilder::new().event(EventSpec::new(CHIP, b"ONE").record());
    builder.counts.2 = Some(3);
    let (output, report) = render(&builder.build(), Verbosity::DEFAULT);
    assert!(output.contains("ONE:"));
    // The zero padding after the last event reads as a zero-length record.
    assert!(matches!(
        report.events.end,
        WalkEnd::Aborted(RecordError::LengthTooShort { length: 0, .. })
    ));
    assert!(!report.events.count_matches());
}

#[test]
fn full_section_ends_without_anomalies() {
    let record = event_record_with(CHIP, b"FILL", 256);
    let mut builder = CatalogBuilder::new();
    for _ in 0..PAGE / 256 {
        builder = builder.event(record.clone());
    }
    let (output, report) = render(&builder.build(), Verbosity::DEFAULT);
    assert_eq!(descriptor_lines(&output).len(), PAGE / 256);
    assert_eq!(report.events.end, WalkEnd::Exhausted);
    assert!(report.is_clean());
    assert!(report.events.count_matches());
}

#[test]
fn verbose_output_dumps_schemas_and_groups() {
    let (output, _) = render(&minimal_catalog(), Verbosity::RECORDS);
    assert!(output.contains("/* schema 0 of 1: len=32 offset=0 */\nschema {\n"));
    assert!(output.contains("\t.field_entry_count = 2,\n"));
    assert!(output.contains("\t\t[1] = {\n\t\t\t.enum = 2,\n\t\t\t.offs = 8,\n"));
    assert!(output.contains("group {\n"));
    assert!(output.contains("\t.domain = PHYSICAL_CHIP /* 1 */,\n"));
    assert!(output.contains(
        "\t.event_indexes = {0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0},\n"
    ));
    assert!(output.contains("\t.name = \"CHIP_GROUP\", /* 10 */\n"));
    assert!(output.contains("/* event 0 of 1: len="));
    assert!(!output.contains("event {"));
}

#[test]
fn hex_dump_of_event_records() {
    let (output, _) = render(&minimal_catalog(), Verbosity::HEX_DUMP);
    assert!(output.contains("event {\n"));
    assert!(output.contains("\t.detailed_desc = \"long desc\", /* 9 */\n"));
    assert!(output.contains("00000000: 00 40 00 00 01 00 00 20 00 48 00 10"));
}

#[test]
fn short_page_0_is_fatal() {
    let error = CatalogFile::from_bytes(&[0; 100]).unwrap_err();
    assert!(matches!(error, Error::ShortHeader { got: 100 }));
    assert_eq!(error.exit_code(), 1);
}

#[test]
fn truncated_section_is_fatal() {
    let mut data = minimal_catalog();
    data.truncate(data.len() - 1);
    let error = CatalogFile::from_bytes(&data).unwrap_err();
    assert!(matches!(
        error,
        Error::ShortSection {
            kind: SectionKind::Event,
            expected: PAGE,
            got,
        } if got == PAGE - 1
    ));
    assert_eq!(error.exit_code(), 3);
}

#[test]
fn missing_file_is_fatal() {
    let error = CatalogFile::open("tests/fixtures/does-not-exist.bin").unwrap_err();
    assert!(matches!(error, Error::Open { .. }));
    assert_eq!(error.exit_code(), 1);
}

#[test]
fn header_is_exposed() {
    let catalog = CatalogFile::from_bytes(&minimal_catalog()).unwrap();
    assert!(catalog.header.has_known_magic());
    assert_eq!(catalog.header.build_time_stamp(), b"20141001120000");
    assert_eq!(catalog.header.schema_section.page_offset, 1);
    assert_eq!(catalog.header.group_section.page_offset, 2);
    assert_eq!(catalog.header.event_section.page_offset, 3);
    assert_eq!(catalog.event_data.len(), PAGE);

    let (groups, summary) = catalog.group_index();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups.group_name(0), b"CHIP_GROUP");
    assert_eq!(summary.end, WalkEnd::Padding { offset: 80, remaining: PAGE - 80 });
}

/// A reader whose seeks always fail.
struct Unseekable(Cursor<Vec<u8>>);

impl Read for Unseekable {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Seek for Unseekable {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "not seekable"))
    }
}

#[test]
fn seek_failure_is_fatal() {
    let error = CatalogFile::parse_file(Unseekable(Cursor::new(minimal_catalog()))).unwrap_err();
    assert!(matches!(
        error,
        Error::Seek {
            kind: SectionKind::Schema,
            page: 1,
            ..
        }
    ));
    assert_eq!(error.exit_code(), 2);
}

#[test]
fn bad_schema_section_does_not_stop_groups_or_events() {
    let data = CatalogBuilder::new()
        .schema(schema_record(1, &[]))
        .group(group_record(CHIP, b"CHIP_GROUP", b"Chip counters", &[0]))
        .event(EventSpec::new(CHIP, b"PM_CHIP_EVT").record())
        .build();
    let (output, report) = render(&data, Verbosity::DEFAULT);
    assert!(report.schemas.is_aborted());
    assert!(matches!(
        report.schemas.end,
        WalkEnd::Aborted(RecordError::ExceedsSection {
            kind: SectionKind::Schema,
            offset: 0,
            ..
        })
    ));
    assert_eq!(report.groups.visited, 1);
    assert_eq!(
        output,
        "PM_CHIP_EVT:\ndomain=0x1,offset=0x30,starting_index=chip,lpar=0x0\n"
    );
}

#[test]
fn group_dump_shows_the_stored_event_count() {
    let mut group = group_record(CHIP, b"BIG_GROUP", b"", &[0]);
    group[15] = 40;
    let data = CatalogBuilder::new()
        .schema(schema_record(1, &[[1, 0, 8, 0]]))
        .group(group)
        .build();
    let (output, report) = render(&data, Verbosity::RECORDS);
    assert!(output.contains("\t.event_count = 40,\n"));
    assert!(report.is_clean());

    let catalog = CatalogFile::from_bytes(&data).unwrap();
    let (groups, _) = catalog.group_index();
    let group = groups.get(0).unwrap();
    assert_eq!(group.event_indices.len(), 16);
    assert_eq!(group.event_indices.declared_len(), 40);
}
