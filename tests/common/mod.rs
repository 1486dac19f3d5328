//! Builds synthetic catalogs in memory.

#![allow(dead_code)]

pub const PAGE: usize = 4096;

fn finish_record(mut data: Vec<u8>) -> Vec<u8> {
    let length = (data.len() + 15) / 16 * 16;
    data.resize(length, 0);
    data[0..2].copy_from_slice(&(length as u16).to_be_bytes());
    data
}

fn push_field(data: &mut Vec<u8>, text: &[u8]) {
    data.extend_from_slice(&(text.len() as u16 + 2).to_be_bytes());
    data.extend_from_slice(text);
}

pub fn schema_record(descriptor: u16, entries: &[[u16; 4]]) -> Vec<u8> {
    let mut data = vec![0; 16];
    data[4..6].copy_from_slice(&descriptor.to_be_bytes());
    data[6..8].copy_from_slice(&1u16.to_be_bytes());
    data[14..16].copy_from_slice(&(entries.len() as u16).to_be_bytes());
    for entry in entries {
        for value in entry {
            data.extend_from_slice(&value.to_be_bytes());
        }
    }
    finish_record(data)
}

pub fn group_record(domain: u8, name: &[u8], desc: &[u8], events: &[u16]) -> Vec<u8> {
    let mut data = vec![0; 48];
    data[8] = domain;
    data[10..12].copy_from_slice(&0x20u16.to_be_bytes());
    data[12..14].copy_from_slice(&0x100u16.to_be_bytes());
    data[15] = events.len() as u8;
    for (i, ix) in events.iter().enumerate() {
        data[16 + 2 * i..18 + 2 * i].copy_from_slice(&ix.to_be_bytes());
    }
    push_field(&mut data, name);
    push_field(&mut data, desc);
    finish_record(data)
}

#[derive(Debug, Clone)]
pub struct EventSpec<'a> {
    pub domain: u8,
    pub group_record_offs: u16,
    pub group_record_len: u16,
    pub counter_offs: u16,
    pub primary_group_ix: u16,
    pub name: &'a [u8],
    pub desc: &'a [u8],
    pub long_desc: &'a [u8],
}

impl<'a> EventSpec<'a> {
    pub fn new(domain: u8, name: &'a [u8]) -> Self {
        Self {
            domain,
            group_record_offs: 0x20,
            group_record_len: 0x48,
            counter_offs: 0x10,
            primary_group_ix: 0,
            name,
            desc: b"desc",
            long_desc: b"long desc",
        }
    }

    pub fn record(&self) -> Vec<u8> {
        let mut data = vec![0; 20];
        data[4] = self.domain;
        data[6..8].copy_from_slice(&self.group_record_offs.to_be_bytes());
        data[8..10].copy_from_slice(&self.group_record_len.to_be_bytes());
        data[10..12].copy_from_slice(&self.counter_offs.to_be_bytes());
        data[16..18].copy_from_slice(&self.primary_group_ix.to_be_bytes());
        data[18..20].copy_from_slice(&1u16.to_be_bytes());
        push_field(&mut data, self.name);
        push_field(&mut data, self.desc);
        push_field(&mut data, self.long_desc);
        finish_record(data)
    }
}

/// Lays out page 0 followed by the schema, group and event sections, each
/// padded to whole pages.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    pub schemas: Vec<Vec<u8>>,
    pub groups: Vec<Vec<u8>>,
    pub events: Vec<Vec<u8>>,
    /// Overrides for the declared entry counts (schema, group, event).
    pub counts: (Option<u16>, Option<u16>, Option<u16>),
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(mut self, record: Vec<u8>) -> Self {
        self.schemas.push(record);
        self
    }

    pub fn group(mut self, record: Vec<u8>) -> Self {
        self.groups.push(record);
        self
    }

    pub fn event(mut self, record: Vec<u8>) -> Self {
        self.events.push(record);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let sections = [
            (self.schemas.concat(), self.counts.0.unwrap_or(self.schemas.len() as u16)),
            (self.groups.concat(), self.counts.1.unwrap_or(self.groups.len() as u16)),
            (self.events.concat(), self.counts.2.unwrap_or(self.events.len() as u16)),
        ];

        let mut page_0 = vec![0; PAGE];
        page_0[0..4].copy_from_slice(b"24x7");
        page_0[16..30].copy_from_slice(b"20141001120000");

        let mut body = Vec::new();
        let mut next_page = 1u16;
        // Triples in page 0 are ordered schema, event, group, formula.
        let triple_at = [64, 80, 72];
        for ((bytes, count), at) in sections.into_iter().zip(triple_at) {
            let pages = bytes.len().div_ceil(PAGE).max(1);
            let mut section = bytes;
            section.resize(pages * PAGE, 0);
            page_0[at..at + 2].copy_from_slice(&next_page.to_be_bytes());
            page_0[at + 2..at + 4].copy_from_slice(&(pages as u16).to_be_bytes());
            page_0[at + 4..at + 6].copy_from_slice(&count.to_be_bytes());
            next_page += pages as u16;
            body.extend_from_slice(&section);
        }
        page_0[4..8].copy_from_slice(&(next_page as u32).to_be_bytes());

        [page_0, body].concat()
    }
}

/// An event record padded out to `length` bytes.
pub fn event_record_with(domain: u8, name: &[u8], length: usize) -> Vec<u8> {
    let mut data = EventSpec::new(domain, name).record();
    assert!(data.len() <= length);
    data.resize(length, 0);
    data[0..2].copy_from_slice(&(length as u16).to_be_bytes());
    data
}
