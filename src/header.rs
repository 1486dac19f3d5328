use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use super::section::CatalogSection;

/// `hv_24x7_catalog_page_0`
///
/// The first page of the catalog. It identifies the catalog and says where the
/// schema, event, group and formula sections are, and how many records each
/// of them holds.
#[derive(Debug, Clone, Copy)]
pub struct CatalogHeader {
    pub magic: [u8; 4],
    /// total catalog length, in pages
    pub page_len: u32,
    pub version: u64,
    /// `YYYYMMDDHHMMSS`, NUL padded
    pub build_time_stamp: [u8; 16],
    pub schema_section: CatalogSection,
    pub event_section: CatalogSection,
    pub group_section: CatalogSection,
    /// Parsed for completeness; formula records are never decoded.
    pub formula_section: CatalogSection,
}

impl CatalogHeader {
    pub const MAGIC: [u8; 4] = *b"24x7";
    pub const STRUCT_SIZE: usize = 4 + 4 + 8 + 16 + 32 + 4 * CatalogSection::STRUCT_SIZE;

    pub fn parse<R: Read>(mut reader: R) -> Result<Self, std::io::Error> {
        let mut magic = [0; 4];
        reader.read_exact(&mut magic)?;
        let page_len = reader.read_u32::<BigEndian>()?;
        let version = reader.read_u64::<BigEndian>()?;
        let mut build_time_stamp = [0; 16];
        reader.read_exact(&mut build_time_stamp)?;
        let mut reserved = [0; 32];
        reader.read_exact(&mut reserved)?;
        let schema_section = CatalogSection::parse(&mut reader)?;
        let event_section = CatalogSection::parse(&mut reader)?;
        let group_section = CatalogSection::parse(&mut reader)?;
        let formula_section = CatalogSection::parse(&mut reader)?;
        Ok(Self {
            magic,
            page_len,
            version,
            build_time_stamp,
            schema_section,
            event_section,
            group_section,
            formula_section,
        })
    }

    pub fn has_known_magic(&self) -> bool {
        self.magic == Self::MAGIC
    }

    /// The build time stamp without its NUL padding.
    pub fn build_time_stamp(&self) -> &[u8] {
        let len = memchr::memchr(0, &self.build_time_stamp).unwrap_or(self.build_time_stamp.len());
        &self.build_time_stamp[..len]
    }
}
