use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

use crate::error::FieldError;
use crate::field::is_within;
use crate::section::SectionKind;
use crate::walker::CatalogRecord;

/// One entry of a schema's field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaFieldEntry {
    pub field_enum: u16,
    /// Byte offset of the field in an event group record.
    pub offset: u16,
    pub length: u16,
    pub flags: u16,
}

impl SchemaFieldEntry {
    pub const STRUCT_SIZE: usize = 8;

    fn parse(mut data: &[u8]) -> Result<Self, std::io::Error> {
        let field_enum = data.read_u16::<BigEndian>()?;
        let offset = data.read_u16::<BigEndian>()?;
        let length = data.read_u16::<BigEndian>()?;
        let flags = data.read_u16::<BigEndian>()?;
        Ok(Self {
            field_enum,
            offset,
            length,
            flags,
        })
    }
}

/// `hv_24x7_grs`, a group record schema.
///
/// Describes the layout of the counter data the hypervisor returns for a
/// group. The fixed portion is `length`, two reserved bytes, `descriptor`,
/// `version_id`, six reserved bytes and `field_entry_count`. The field
/// entries directly follow it, at byte 16.
#[derive(Debug, Clone, Copy)]
pub struct Schema<'a> {
    /// The whole record, `length` bytes.
    data: &'a [u8],
    pub length: u16,
    pub descriptor: u16,
    pub version_id: u16,
    pub field_entry_count: u16,
}

impl<'a> Schema<'a> {
    pub const FIXED_SIZE: usize = 2 + 2 + 2 + 2 + 6 + 2;

    /// Iterates over the field entries, stopping at the declared count or at
    /// the end of the record, whichever comes first.
    pub fn field_entries(&self) -> SchemaFieldEntries<'a> {
        SchemaFieldEntries {
            data: self.data,
            offset: Self::FIXED_SIZE,
            index: 0,
            count: self.field_entry_count as usize,
        }
    }

    /// How many entries can actually be read, given the record length.
    pub fn readable_entry_count(&self) -> usize {
        self.field_entries().count()
    }

    /// Bytes at the end of the record that follow the last field entry.
    pub fn trailing_padding(&self) -> usize {
        let used = Self::FIXED_SIZE + self.readable_entry_count() * SchemaFieldEntry::STRUCT_SIZE;
        self.data.len().saturating_sub(used)
    }
}

impl<'a> CatalogRecord<'a> for Schema<'a> {
    const KIND: SectionKind = SectionKind::Schema;
    const FIXED_PORTION_SIZE: usize = Self::FIXED_SIZE;

    fn parse(data: &'a [u8], start: usize, bound: usize) -> Result<Self, FieldError> {
        let bound = bound.min(data.len());
        if !is_within(start, Self::FIXED_SIZE, bound) {
            return Err(FieldError::OutOfBounds {
                offset: start,
                len: Self::FIXED_SIZE,
                bound,
            });
        }
        let fixed = &data[start..start + Self::FIXED_SIZE];
        let length = BigEndian::read_u16(&fixed[0..2]);
        let descriptor = BigEndian::read_u16(&fixed[4..6]);
        let version_id = BigEndian::read_u16(&fixed[6..8]);
        let field_entry_count = BigEndian::read_u16(&fixed[14..16]);

        if field_entry_count == 0 {
            return Err(FieldError::NoFieldEntries { offset: start });
        }
        let field_entry_bytes = field_entry_count as usize * SchemaFieldEntry::STRUCT_SIZE;
        if !is_within(start, field_entry_bytes, bound) {
            return Err(FieldError::OutOfBounds {
                offset: start,
                len: field_entry_bytes,
                bound,
            });
        }

        // The walker has already checked that `length` bytes are available.
        let record_end = (start + length as usize).min(data.len());
        Ok(Self {
            data: &data[start..record_end],
            length,
            descriptor,
            version_id,
            field_entry_count,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SchemaFieldEntries<'a> {
    data: &'a [u8],
    offset: usize,
    index: usize,
    count: usize,
}

impl Iterator for SchemaFieldEntries<'_> {
    type Item = SchemaFieldEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let entry_data = self
            .data
            .get(self.offset..self.offset + SchemaFieldEntry::STRUCT_SIZE)?;
        let entry = SchemaFieldEntry::parse(entry_data).ok()?;
        self.offset += SchemaFieldEntry::STRUCT_SIZE;
        self.index += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.count - self.index))
    }
}
