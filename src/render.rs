//! Text output: event descriptors for registering the events, and structure
//! dumps of the decoded records for inspecting a catalog.

use std::fmt;
use std::io::{self, Write};

use crate::domain::Domain;
use crate::error::UnsupportedEventDomain;
use crate::event::Event;
use crate::group::{Group, GroupIndex};
use crate::schema::{Schema, SchemaFieldEntry};
use crate::walker::RecordPosition;

/// How much decoded detail gets printed.
///
/// At the default level only event descriptors are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Verbosity(pub u8);

impl Verbosity {
    pub const DEFAULT: Self = Self(0);
    /// Record positions and schema and group dumps.
    pub const RECORDS: Self = Self(1);
    /// Event dumps with the resolved primary group.
    pub const EVENT_DETAIL: Self = Self(5);
    /// Hex dumps of event records.
    pub const HEX_DUMP: Self = Self(100);

    pub fn is_at_least(self, level: Verbosity) -> bool {
        self >= level
    }
}

/// One line of event registration metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDescriptor {
    pub domain: Domain,
    pub offset: u32,
}

impl EventDescriptor {
    pub fn lpar(&self) -> &'static str {
        if self.domain.is_physical() {
            "0x0"
        } else {
            "sibling_guest_id"
        }
    }
}

impl fmt::Display for EventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "domain={:#x},offset={:#x},starting_index={},lpar={}",
            self.domain.code(),
            self.offset,
            self.domain.index_semantics(),
            self.lpar()
        )
    }
}

/// The descriptors an event is registered under. Chip events get one, core
/// events get one per domain in [`Domain::CORE_EXPANSION`].
pub fn event_descriptors(event: &Event) -> Result<Vec<EventDescriptor>, UnsupportedEventDomain> {
    let domains: &[Domain] = match event.domain.domain() {
        Some(Domain::PhysicalChip) => &[Domain::PhysicalChip],
        Some(Domain::PhysicalCore) => &Domain::CORE_EXPANSION,
        _ => return Err(UnsupportedEventDomain(event.domain.0)),
    };
    let offset = event.counter_offset();
    Ok(domains
        .iter()
        .map(|&domain| EventDescriptor { domain, offset })
        .collect())
}

/// Displays bytes the way they would be written in a C string literal.
pub struct Escaped<'a>(pub &'a [u8]);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0 {
            match b {
                b'"' => f.write_str("\\\"")?,
                b'\\' => f.write_str("\\\\")?,
                b'\n' => f.write_str("\\n")?,
                b'\t' => f.write_str("\\t")?,
                b'\0' => f.write_str("\\0")?,
                0x20..=0x7e => write!(f, "{}", b as char)?,
                _ => write!(f, "\\x{b:02x}")?,
            }
        }
        Ok(())
    }
}

/// Text payloads are NUL padded to keep records aligned.
fn trim_nul_padding(bytes: &[u8]) -> &[u8] {
    let len = memchr::memchr(0, bytes).unwrap_or(bytes.len());
    &bytes[..len]
}

/// Writes decoded records as text.
pub struct Renderer<W: Write> {
    out: W,
    verbosity: Verbosity,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, verbosity: Verbosity) -> Self {
        Self { out, verbosity }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn position(
        &mut self,
        kind: &str,
        position: &RecordPosition,
        declared: usize,
    ) -> io::Result<()> {
        writeln!(
            self.out,
            "/* {kind} {} of {declared}: len={} offset={} */",
            position.index, position.length, position.offset
        )?;
        if position.is_misaligned() {
            writeln!(self.out, "/* missaligned */")?;
        }
        Ok(())
    }

    pub fn schema(
        &mut self,
        position: &RecordPosition,
        schema: &Schema,
        declared: usize,
    ) -> io::Result<()> {
        if !self.verbosity.is_at_least(Verbosity::RECORDS) {
            return Ok(());
        }
        self.position("schema", position, declared)?;
        writeln!(self.out, "schema {{")?;
        writeln!(self.out, "\t.length = {},", schema.length)?;
        writeln!(self.out, "\t.descriptor = {},", schema.descriptor)?;
        writeln!(self.out, "\t.version_id = {},", schema.version_id)?;
        writeln!(self.out, "\t.field_entry_count = {},", schema.field_entry_count)?;
        writeln!(self.out, "\t.field_entries = {{")?;
        for (i, entry) in schema.field_entries().enumerate() {
            self.schema_field_entry(i, &entry)?;
        }
        writeln!(self.out, "\t}}")?;
        writeln!(self.out, "}}")
    }

    fn schema_field_entry(&mut self, i: usize, entry: &SchemaFieldEntry) -> io::Result<()> {
        writeln!(self.out, "\t\t[{i}] = {{")?;
        writeln!(self.out, "\t\t\t.enum = {},", entry.field_enum)?;
        writeln!(self.out, "\t\t\t.offs = {},", entry.offset)?;
        writeln!(self.out, "\t\t\t.length = {},", entry.length)?;
        writeln!(self.out, "\t\t\t.flags = {:#X},", entry.flags)?;
        writeln!(self.out, "\t\t}},")
    }

    pub fn group(
        &mut self,
        position: &RecordPosition,
        group: &Group,
        declared: usize,
    ) -> io::Result<()> {
        if !self.verbosity.is_at_least(Verbosity::RECORDS) {
            return Ok(());
        }
        self.position("group", position, declared)?;
        let event_indexes = group
            .event_indices
            .raw_slots()
            .iter()
            .map(|ix| ix.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(self.out, "group {{")?;
        writeln!(self.out, "\t.length = {},", group.length)?;
        writeln!(self.out, "\t.flags = {:x},", group.flags)?;
        writeln!(self.out, "\t.domain = {} /* {} */,", group.domain, group.domain.0)?;
        writeln!(self.out, "\t.event_group_record_offs = {},", group.event_group_record_offs)?;
        writeln!(self.out, "\t.event_group_record_len = {},", group.event_group_record_len)?;
        writeln!(self.out, "\t.group_schema_index = {},", group.group_schema_ix)?;
        writeln!(self.out, "\t.event_count = {},", group.event_indices.declared_len())?;
        writeln!(self.out, "\t.event_indexes = {{{event_indexes}}},")?;
        writeln!(self.out, "\t.name = \"{}\", /* {} */", Escaped(group.name), group.name.len())?;
        writeln!(self.out, "\t.desc = \"{}\", /* {} */", Escaped(group.desc), group.desc.len())?;
        writeln!(self.out, "}}")
    }

    /// Writes the event's name and one descriptor line per domain it is
    /// registered under, followed by the detail the verbosity asks for.
    pub fn event(
        &mut self,
        position: &RecordPosition,
        event: &Event,
        groups: &GroupIndex,
        declared: usize,
    ) -> io::Result<()> {
        if self.verbosity.is_at_least(Verbosity::RECORDS) {
            self.position("event", position, declared)?;
        }
        match event_descriptors(event) {
            Ok(descriptors) => {
                writeln!(self.out, "{}:", Escaped(trim_nul_padding(event.name)))?;
                for descriptor in descriptors {
                    writeln!(self.out, "{descriptor}")?;
                }
            }
            Err(e) => {
                tracing::warn!("event {} ({}): {e}", position.index, Escaped(event.name));
            }
        }

        if self.verbosity.is_at_least(Verbosity::EVENT_DETAIL) {
            self.event_detail(event, groups)?;
        }
        if self.verbosity.is_at_least(Verbosity::HEX_DUMP) {
            self.hex_dump(event.raw)?;
        }
        Ok(())
    }

    fn event_detail(&mut self, event: &Event, groups: &GroupIndex) -> io::Result<()> {
        let group_name = groups.group_name(event.primary_group_ix as usize);
        writeln!(self.out, "event {{")?;
        writeln!(self.out, "\t.length = {},", event.length)?;
        writeln!(self.out, "\t.domain = {} /* {} */,", event.domain, event.domain.0)?;
        writeln!(self.out, "\t.event_group_record_offs = {},", event.event_group_record_offs)?;
        writeln!(self.out, "\t.event_group_record_len = {},", event.event_group_record_len)?;
        writeln!(self.out, "\t.event_counter_offs = {},", event.event_counter_offs)?;
        writeln!(self.out, "\t.flags = {:x},", event.flags)?;
        writeln!(
            self.out,
            "\t.primary_group_ix = \"{}\" /* {} */,",
            Escaped(group_name),
            event.primary_group_ix
        )?;
        writeln!(self.out, "\t.group_count = {},", event.group_count)?;
        writeln!(self.out, "\t.name = \"{}\", /* {} */", Escaped(event.name), event.name.len())?;
        writeln!(self.out, "\t.desc = \"{}\", /* {} */", Escaped(event.desc), event.desc.len())?;
        writeln!(
            self.out,
            "\t.detailed_desc = \"{}\", /* {} */",
            Escaped(event.long_desc),
            event.long_desc.len()
        )?;
        writeln!(self.out, "}}")
    }

    fn hex_dump(&mut self, bytes: &[u8]) -> io::Result<()> {
        for (line, chunk) in bytes.chunks(16).enumerate() {
            write!(self.out, "{:08x}:", line * 16)?;
            for b in chunk {
                write!(self.out, " {b:02x}")?;
            }
            for _ in chunk.len()..16 {
                write!(self.out, "   ")?;
            }
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            writeln!(self.out, "  |{ascii}|")?;
        }
        Ok(())
    }
}
