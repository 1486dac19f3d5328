use std::marker::PhantomData;

use crate::error::{FieldError, RecordError};
use crate::field::{is_within, read_u16_at};
use crate::section::SectionKind;

/// Records in a catalog section must have lengths that are a multiple of this.
pub const RECORD_ALIGNMENT: usize = 16;

/// A record type stored in one of the catalog sections.
///
/// Every record starts with a big-endian u16 holding its full length in bytes.
pub trait CatalogRecord<'a>: Sized {
    const KIND: SectionKind;

    /// The size of everything before the first variable-length payload.
    /// This has to be in bounds before any field of the record is read.
    const FIXED_PORTION_SIZE: usize;

    /// Parses the record starting at `start`, requiring every
    /// variable-length field to end at or before `bound`.
    fn parse(data: &'a [u8], start: usize, bound: usize) -> Result<Self, FieldError>;

    /// Placeholder records are skipped without being parsed.
    fn is_placeholder(_fixed_portion: &[u8]) -> bool {
        false
    }
}

/// Where a record was found in its section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPosition {
    /// The sequence index of the record, counting skipped placeholders.
    pub index: usize,
    /// Byte offset of the record in the section.
    pub offset: usize,
    /// The record's own declared length.
    pub length: usize,
}

impl RecordPosition {
    pub fn is_misaligned(&self) -> bool {
        self.length % RECORD_ALIGNMENT != 0
    }
}

#[derive(Debug, Clone)]
pub struct WalkedRecord<R> {
    pub position: RecordPosition,
    pub record: R,
}

/// How the walk over a section came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEnd {
    /// The cursor reached the end of the section buffer.
    Exhausted,
    /// All declared records were read; the rest of the section is padding.
    Padding { offset: usize, remaining: usize },
    /// A record failed validation. Nothing after it was read.
    Aborted(RecordError),
}

/// The outcome of walking one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkSummary {
    pub kind: SectionKind,
    /// The entry count declared in page 0.
    pub declared: usize,
    /// The number of record positions consumed, including placeholders.
    pub indexed: usize,
    /// Records that were validated and handed out.
    pub visited: usize,
    /// Placeholder records that were skipped.
    pub skipped: usize,
    pub end: WalkEnd,
}

impl WalkSummary {
    pub fn is_aborted(&self) -> bool {
        matches!(self.end, WalkEnd::Aborted(_))
    }

    pub fn count_matches(&self) -> bool {
        self.indexed == self.declared
    }
}

enum Step<R> {
    Record(WalkedRecord<R>),
    Skipped,
}

/// Walks the records of one section, validating each record before it is
/// handed out.
///
/// The walk stops for good at the first record that fails validation, because
/// the position of every later record depends on the broken record's length.
pub struct SectionWalker<'a, R> {
    data: &'a [u8],
    declared: usize,
    cursor: usize,
    index: usize,
    visited: usize,
    skipped: usize,
    summary: Option<WalkSummary>,
    _record: PhantomData<R>,
}

impl<'a, R: CatalogRecord<'a>> SectionWalker<'a, R> {
    pub fn new(data: &'a [u8], declared: usize) -> Self {
        Self {
            data,
            declared,
            cursor: 0,
            index: 0,
            visited: 0,
            skipped: 0,
            summary: None,
            _record: PhantomData,
        }
    }

    /// Returns the next valid record, or `None` once the walk has ended.
    pub fn next_record(&mut self) -> Option<WalkedRecord<R>> {
        while self.summary.is_none() {
            match self.step() {
                Ok(Step::Record(walked)) => return Some(walked),
                Ok(Step::Skipped) => {}
                Err(end) => self.end_walk(end),
            }
        }
        None
    }

    /// Consumes any remaining records and returns the summary of the walk.
    pub fn finish(mut self) -> WalkSummary {
        while self.next_record().is_some() {}
        match self.summary {
            Some(summary) => summary,
            None => unreachable!("next_record only returns None after the walk ended"),
        }
    }

    fn step(&mut self) -> Result<Step<R>, WalkEnd> {
        let kind = R::KIND;
        let section_len = self.data.len();
        let offset = self.cursor;
        if offset >= section_len {
            return Err(WalkEnd::Exhausted);
        }

        if self.index >= self.declared {
            let remaining = section_len - offset;
            tracing::debug!(
                "{kind} count ends before buffer end (offset={offset}, bytes remaining={remaining})"
            );
            return Err(WalkEnd::Padding { offset, remaining });
        }

        if !is_within(offset, R::FIXED_PORTION_SIZE, section_len) {
            return Err(WalkEnd::Aborted(RecordError::FixedPortionOutOfRange {
                kind,
                offset,
            }));
        }
        let fixed_portion = &self.data[offset..offset + R::FIXED_PORTION_SIZE];
        let length = read_u16_at(fixed_portion, 0).unwrap_or(0) as usize;
        if length < R::FIXED_PORTION_SIZE {
            return Err(WalkEnd::Aborted(RecordError::LengthTooShort {
                kind,
                offset,
                length,
            }));
        }

        let position = RecordPosition {
            index: self.index,
            offset,
            length,
        };

        if R::is_placeholder(fixed_portion) {
            tracing::trace!("invalid {kind} {}, skipping", position.index);
            self.advance(length);
            self.skipped += 1;
            return Ok(Step::Skipped);
        }

        tracing::debug!(
            "{kind} {} of {}: len={length} offset={offset}",
            position.index,
            self.declared
        );
        if position.is_misaligned() {
            tracing::warn!(
                "{kind} {} at offset {offset} is misaligned: len={length}",
                position.index
            );
        }

        if !is_within(offset, length, section_len) {
            return Err(WalkEnd::Aborted(RecordError::EndsAfterSection {
                kind,
                offset,
                length,
                section_len,
            }));
        }
        // The record lies within the section, so a parse that fits the record
        // also fits the section. The section bound only matters for telling
        // the two failures apart.
        let record = match R::parse(self.data, offset, offset + length) {
            Ok(record) => record,
            Err(source) => {
                let error = match R::parse(self.data, offset, section_len) {
                    Err(source) => RecordError::ExceedsSection { kind, offset, source },
                    Ok(_) => RecordError::ExceedsOwnLength { kind, offset, source },
                };
                return Err(WalkEnd::Aborted(error));
            }
        };

        self.advance(length);
        self.visited += 1;
        Ok(Step::Record(WalkedRecord { position, record }))
    }

    fn advance(&mut self, length: usize) {
        self.cursor += length;
        self.index += 1;
    }

    fn end_walk(&mut self, end: WalkEnd) {
        let kind = R::KIND;
        if let WalkEnd::Aborted(error) = &end {
            tracing::warn!("{error}");
        }
        if self.index != self.declared {
            tracing::warn!(
                "{kind} buffer ended before listed # of {kind}s were parsed (got {}, wanted {})",
                self.index,
                self.declared
            );
        }
        self.summary = Some(WalkSummary {
            kind,
            declared: self.declared,
            indexed: self.index,
            visited: self.visited,
            skipped: self.skipped,
            end,
        });
    }
}
