use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::domain::DomainCode;
use crate::error::FieldError;
use crate::field::{is_within, read_packed_fields};
use crate::section::SectionKind;
use crate::walker::CatalogRecord;

const GROUP_EVENT_SLOTS: usize = 16;

/// The event indices of a group: a fixed array of 16 slots, of which only the
/// first `len` are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventIndices {
    slots: [u16; GROUP_EVENT_SLOTS],
    len: u8,
    /// The count as stored in the record, before clamping.
    declared: u8,
}

impl EventIndices {
    pub const CAPACITY: usize = GROUP_EVENT_SLOTS;

    /// Counts above the capacity are clamped.
    pub fn new(slots: [u16; Self::CAPACITY], count: u8) -> Self {
        if count as usize > Self::CAPACITY {
            tracing::warn!("group declares {count} events, more than {}", Self::CAPACITY);
        }
        Self {
            slots,
            len: count.min(Self::CAPACITY as u8),
            declared: count,
        }
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn declared_len(&self) -> u8 {
        self.declared
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.slots[..self.len()].iter().copied()
    }

    /// All 16 slots, including the zero padding after `len`.
    pub fn raw_slots(&self) -> &[u16; Self::CAPACITY] {
        &self.slots
    }
}

/// A group record: a named set of up to 16 events that are read together.
#[derive(Debug, Clone, Copy)]
pub struct Group<'a> {
    pub length: u16,
    pub flags: u32,
    pub domain: DomainCode,
    pub event_group_record_offs: u16,
    pub event_group_record_len: u16,
    pub group_schema_ix: u8,
    pub event_indices: EventIndices,
    pub name: &'a [u8],
    pub desc: &'a [u8],
}

impl<'a> Group<'a> {
    /// Size of the fixed portion, up to and including the name length field.
    pub const FIXED_SIZE: usize =
        2 + 2 + 4 + 1 + 1 + 2 + 2 + 1 + 1 + 2 * EventIndices::CAPACITY + 2;
    const NAME_OFFSET: usize = Self::FIXED_SIZE - 2;

    fn parse_fixed<R: Read>(
        mut reader: R,
        name: &'a [u8],
        desc: &'a [u8],
    ) -> Result<Self, std::io::Error> {
        let length = reader.read_u16::<BigEndian>()?;
        let _reserved1 = reader.read_u16::<BigEndian>()?;
        let flags = reader.read_u32::<BigEndian>()?;
        let domain = DomainCode(reader.read_u8()?);
        let _reserved2 = reader.read_u8()?;
        let event_group_record_offs = reader.read_u16::<BigEndian>()?;
        let event_group_record_len = reader.read_u16::<BigEndian>()?;
        let group_schema_ix = reader.read_u8()?;
        let event_count = reader.read_u8()?;
        let mut slots = [0; EventIndices::CAPACITY];
        reader.read_u16_into::<BigEndian>(&mut slots)?;
        Ok(Self {
            length,
            flags,
            domain,
            event_group_record_offs,
            event_group_record_len,
            group_schema_ix,
            event_indices: EventIndices::new(slots, event_count),
            name,
            desc,
        })
    }
}

impl<'a> CatalogRecord<'a> for Group<'a> {
    const KIND: SectionKind = SectionKind::Group;
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
        let [name, desc] = read_packed_fields::<2>(data, start + Self::NAME_OFFSET, bound)?;
        let fixed = &data[start..start + Self::NAME_OFFSET];
        Self::parse_fixed(fixed, name.payload, desc.payload).map_err(|_| {
            FieldError::OutOfBounds {
                offset: start,
                len: Self::FIXED_SIZE,
                bound,
            }
        })
    }
}

/// The decoded groups of a catalog, by their position in the group section.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex<'a> {
    groups: Vec<Group<'a>>,
}

impl<'a> GroupIndex<'a> {
    /// The name used for group references that don't resolve.
    pub const UNKNOWN_NAME: &'static [u8] = b"UNKNOWN";

    pub fn with_capacity(declared_count: usize) -> Self {
        Self {
            groups: Vec::with_capacity(declared_count),
        }
    }

    pub fn push(&mut self, group: Group<'a>) {
        self.groups.push(group);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, ix: usize) -> Option<&Group<'a>> {
        self.groups.get(ix)
    }

    /// The name of the group at `ix`, or `UNKNOWN` if there is no such group.
    pub fn group_name(&self, ix: usize) -> &'a [u8] {
        match self.groups.get(ix) {
            Some(group) => group.name,
            None => {
                tracing::debug!("group index {ix} does not resolve ({} groups)", self.len());
                Self::UNKNOWN_NAME
            }
        }
    }
}
