use std::fmt;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

/// The size of a catalog page. Section offsets and lengths are given in pages.
pub const PAGE_SIZE: usize = 4096;

/// The four page-aligned regions a catalog is divided into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Schema,
    Event,
    Group,
    Formula,
}

impl SectionKind {
    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Schema => "schema",
            SectionKind::Event => "event",
            SectionKind::Group => "group",
            SectionKind::Formula => "formula",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One `{offs, len, count}` triple from page 0.
///
/// A CatalogSection points at another region of the catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSection {
    /// offset from start of file, in pages
    pub page_offset: u16,
    /// size of the section, in pages
    pub page_len: u16,
    /// number of well-formed records before the trailing padding
    pub entry_count: u16,
}

impl CatalogSection {
    pub const STRUCT_SIZE: usize = 2 + 2 + 2 + 2;

    pub fn parse<R: Read>(mut reader: R) -> Result<Self, std::io::Error> {
        let page_offset = reader.read_u16::<BigEndian>()?;
        let page_len = reader.read_u16::<BigEndian>()?;
        let entry_count = reader.read_u16::<BigEndian>()?;
        let _reserved = reader.read_u16::<BigEndian>()?;
        Ok(Self {
            page_offset,
            page_len,
            entry_count,
        })
    }

    /// Byte offset of the section in the file.
    pub fn byte_offset(&self) -> u64 {
        self.page_offset as u64 * PAGE_SIZE as u64
    }

    /// Byte length of the section.
    pub fn byte_len(&self) -> usize {
        self.page_len as usize * PAGE_SIZE
    }
}
