use std::io;
use std::path::PathBuf;

use crate::section::SectionKind;

/// The error type for loading a catalog file.
///
/// Every variant is fatal: the catalog cannot be walked without the bytes
/// it failed to fetch.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not read page 0, got {got} bytes")]
    ShortHeader { got: usize },

    #[error("could not read page 0: {0}")]
    ReadHeader(#[source] io::Error),

    #[error("alloc failure {0} bytes for the {1} section")]
    Alloc(usize, SectionKind),

    #[error("seek failure to page {page} for the {kind} section: {source}")]
    Seek {
        kind: SectionKind,
        page: u64,
        #[source]
        source: io::Error,
    },

    #[error("read failure in the {kind} section, got {got} of {expected} bytes")]
    ShortSection {
        kind: SectionKind,
        expected: usize,
        got: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// The process exit status for this error. Each I/O stage has its own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Open { .. }
            | Error::ShortHeader { .. }
            | Error::ReadHeader(_)
            | Error::Alloc(..) => 1,
            Error::Seek { .. } => 2,
            Error::ShortSection { .. } | Error::Io(_) => 3,
        }
    }
}

/// A length-prefixed field, or a fixed array, did not fit where it was
/// supposed to.
///
/// All offsets are absolute offsets into the section buffer.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// A length field cannot describe fewer bytes than itself.
    #[error("length field at offset {offset} is too short: {len}")]
    ShortField { offset: usize, len: u16 },

    #[error("field at offset {offset} with length {len} extends past {bound}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        bound: usize,
    },

    #[error("schema at offset {offset} has no field entries")]
    NoFieldEntries { offset: usize },
}

/// A record failed its containment checks. This stops the walk over the
/// section the record lives in, since every later record position is derived
/// from this record's length.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    #[error("{kind} fixed portion at offset {offset} is not within range")]
    FixedPortionOutOfRange { kind: SectionKind, offset: usize },

    #[error("{kind} at offset {offset} has a length of {length}, shorter than its fixed portion")]
    LengthTooShort {
        kind: SectionKind,
        offset: usize,
        length: usize,
    },

    #[error("{kind} ends after {kind} data: offset {offset} + length {length} > {section_len}")]
    EndsAfterSection {
        kind: SectionKind,
        offset: usize,
        length: usize,
        section_len: usize,
    },

    #[error("{kind} at offset {offset} exceeds {kind} data length: {source}")]
    ExceedsSection {
        kind: SectionKind,
        offset: usize,
        #[source]
        source: FieldError,
    },

    #[error("{kind} at offset {offset} exceeds its own length: {source}")]
    ExceedsOwnLength {
        kind: SectionKind,
        offset: usize,
        #[source]
        source: FieldError,
    },
}

/// An event was declared under a domain that has no descriptor expansion.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("event domain {0} has no descriptor expansion")]
pub struct UnsupportedEventDomain(pub u8);
