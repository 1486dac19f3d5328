use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::Error;
use crate::event::Event;
use crate::group::{Group, GroupIndex};
use crate::header::CatalogHeader;
use crate::schema::Schema;
use crate::section::{CatalogSection, SectionKind, PAGE_SIZE};
use crate::walker::{SectionWalker, WalkSummary};

/// A catalog read into memory: page 0 plus the raw bytes of the schema,
/// group and event sections.
///
/// The decoded records borrow from the section buffers owned here.
#[derive(Debug, Clone)]
pub struct CatalogFile {
    pub header: CatalogHeader,
    pub schema_data: Vec<u8>,
    pub group_data: Vec<u8>,
    pub event_data: Vec<u8>,
}

impl CatalogFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        tracing::debug!("filename = {}", path.display());
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_owned(),
            source,
        })?;
        Self::parse_file(BufReader::new(file))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        Self::parse_file(Cursor::new(data))
    }

    pub fn parse_file<R: Read + Seek>(mut reader: R) -> Result<Self, Error> {
        let mut page_0 = Vec::with_capacity(PAGE_SIZE);
        reader
            .by_ref()
            .take(PAGE_SIZE as u64)
            .read_to_end(&mut page_0)
            .map_err(Error::ReadHeader)?;
        if page_0.len() != PAGE_SIZE {
            return Err(Error::ShortHeader { got: page_0.len() });
        }
        let header = CatalogHeader::parse(&page_0[..]).map_err(Error::ReadHeader)?;
        log_header(&header);

        let schema_data = read_section(&mut reader, SectionKind::Schema, &header.schema_section)?;
        let group_data = read_section(&mut reader, SectionKind::Group, &header.group_section)?;
        let event_data = read_section(&mut reader, SectionKind::Event, &header.event_section)?;

        Ok(Self {
            header,
            schema_data,
            group_data,
            event_data,
        })
    }

    pub fn schemas(&self) -> SectionWalker<'_, Schema<'_>> {
        SectionWalker::new(
            &self.schema_data,
            self.header.schema_section.entry_count as usize,
        )
    }

    pub fn groups(&self) -> SectionWalker<'_, Group<'_>> {
        SectionWalker::new(
            &self.group_data,
            self.header.group_section.entry_count as usize,
        )
    }

    pub fn events(&self) -> SectionWalker<'_, Event<'_>> {
        SectionWalker::new(
            &self.event_data,
            self.header.event_section.entry_count as usize,
        )
    }

    /// Walks the group section and collects every valid group, by position.
    pub fn group_index(&self) -> (GroupIndex<'_>, WalkSummary) {
        let mut walker = self.groups();
        let mut index = GroupIndex::with_capacity(self.header.group_section.entry_count as usize);
        while let Some(walked) = walker.next_record() {
            index.push(walked.record);
        }
        (index, walker.finish())
    }
}

fn log_header(header: &CatalogHeader) {
    if !header.has_known_magic() {
        tracing::warn!(
            "unexpected catalog magic {:02x} {:02x} {:02x} {:02x}",
            header.magic[0],
            header.magic[1],
            header.magic[2],
            header.magic[3]
        );
    }
    tracing::debug!("magic  = {}", String::from_utf8_lossy(&header.magic));
    tracing::debug!("length = {} pages", header.page_len);
    tracing::debug!(
        "build_time_stamp = {}",
        String::from_utf8_lossy(header.build_time_stamp())
    );
    tracing::debug!("version = {}", header.version);
    for (kind, section) in [
        (SectionKind::Schema, &header.schema_section),
        (SectionKind::Event, &header.event_section),
        (SectionKind::Group, &header.group_section),
        (SectionKind::Formula, &header.formula_section),
    ] {
        tracing::debug!(
            "{kind}_data_offs = {}, {kind}_data_len = {}, {kind}_entry_count = {}",
            section.page_offset,
            section.page_len,
            section.entry_count
        );
    }
}

fn read_section<R: Read + Seek>(
    reader: &mut R,
    kind: SectionKind,
    section: &CatalogSection,
) -> Result<Vec<u8>, Error> {
    let len = section.byte_len();
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| Error::Alloc(len, kind))?;

    reader
        .seek(SeekFrom::Start(section.byte_offset()))
        .map_err(|source| Error::Seek {
            kind,
            page: section.page_offset as u64,
            source,
        })?;
    reader.by_ref().take(len as u64).read_to_end(&mut data)?;
    if data.len() != len {
        return Err(Error::ShortSection {
            kind,
            expected: len,
            got: data.len(),
        });
    }
    Ok(data)
}
