use std::io::Read;

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

use crate::domain::DomainCode;
use crate::error::FieldError;
use crate::field::{is_within, read_packed_fields};
use crate::section::SectionKind;
use crate::walker::CatalogRecord;

/// `hv_24x7_event_data`
///
/// A single counter event. The name, description and long description
/// follow the fixed portion as three packed length-prefixed fields.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// The whole record, `length` bytes.
    pub raw: &'a [u8],
    /// in bytes, must be a multiple of 16
    pub length: u16,
    pub domain: DomainCode,
    /// in bytes, must be 8 byte aligned
    pub event_group_record_offs: u16,
    /// in bytes, zero for unused events
    pub event_group_record_len: u16,
    /// in bytes, offset from event_group_record
    pub event_counter_offs: u16,
    /// verified_state, unverified_state, caveat_state, broken_state, ...
    pub flags: u32,
    /// Position of the event's primary group in the group section.
    pub primary_group_ix: u16,
    pub group_count: u16,
    pub name: &'a [u8],
    pub desc: &'a [u8],
    pub long_desc: &'a [u8],
}

impl<'a> Event<'a> {
    /// Size of the fixed portion, up to and including the name length field.
    pub const FIXED_SIZE: usize = 2 + 2 + 1 + 1 + 2 + 2 + 2 + 4 + 2 + 2 + 2;
    const NAME_OFFSET: usize = Self::FIXED_SIZE - 2;
    const EVENT_GROUP_RECORD_LEN_OFFSET: usize = 8;

    /// The offset of the counter within the data the hypervisor returns.
    pub fn counter_offset(&self) -> u32 {
        self.event_counter_offs as u32 + self.event_group_record_offs as u32
    }

    fn parse_fixed<R: Read>(mut reader: R, raw: &'a [u8]) -> Result<Self, std::io::Error> {
        let length = reader.read_u16::<BigEndian>()?;
        let _reserved1 = reader.read_u16::<BigEndian>()?;
        let domain = DomainCode(reader.read_u8()?);
        let _reserved2 = reader.read_u8()?;
        let event_group_record_offs = reader.read_u16::<BigEndian>()?;
        let event_group_record_len = reader.read_u16::<BigEndian>()?;
        let event_counter_offs = reader.read_u16::<BigEndian>()?;
        let flags = reader.read_u32::<BigEndian>()?;
        let primary_group_ix = reader.read_u16::<BigEndian>()?;
        let group_count = reader.read_u16::<BigEndian>()?;
        Ok(Self {
            raw,
            length,
            domain,
            event_group_record_offs,
            event_group_record_len,
            event_counter_offs,
            flags,
            primary_group_ix,
            group_count,
            name: &[],
            desc: &[],
            long_desc: &[],
        })
    }
}

impl<'a> CatalogRecord<'a> for Event<'a> {
    const KIND: SectionKind = SectionKind::Event;
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
        let [name, desc, long_desc] =
            read_packed_fields::<3>(data, start + Self::NAME_OFFSET, bound)?;

        let length = BigEndian::read_u16(&data[start..start + 2]) as usize;
        let raw = &data[start..(start + length).min(data.len())];
        let fixed = &data[start..start + Self::NAME_OFFSET];
        let mut event = Self::parse_fixed(fixed, raw).map_err(|_| FieldError::OutOfBounds {
            offset: start,
            len: Self::FIXED_SIZE,
            bound,
        })?;
        event.name = name.payload;
        event.desc = desc.payload;
        event.long_desc = long_desc.payload;
        Ok(event)
    }

    /// Events with a zero-length event group record are unused slots.
    fn is_placeholder(fixed_portion: &[u8]) -> bool {
        let at = Self::EVENT_GROUP_RECORD_LEN_OFFSET;
        fixed_portion.get(at..at + 2) == Some(&[0, 0][..])
    }
}
