//! A decoder for the hv-24x7 performance counter catalog.
//!
//! The hypervisor of POWER systems describes its 24x7 counters in a catalog:
//! a page-aligned binary blob. Page 0 is a header which points at a schema
//! section, a group section, an event section and a formula section. Each of
//! the first three holds a sequence of self-describing records: a big-endian
//! length, a fixed portion, and then length-prefixed text fields.
//!
//! Nothing in the catalog is trusted. Every record is checked against both
//! the end of its section and its own declared length before any of its
//! fields are read, and a bad record stops the walk over its section.
//!
//! Decoded events can be rendered as descriptor lines
//! (`domain=..,offset=..,starting_index=..,lpar=..`) for registering them
//! with the kernel's perf subsystem.
//!
//! # Example
//!
//! ```
//! use hv_24x7_catalog::{render_catalog, CatalogFile, Renderer, Verbosity};
//!
//! # fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = CatalogFile::open("hv-24x7-catalog.bin")?;
//! let (groups, _) = catalog.group_index();
//! println!("{} groups", groups.len());
//!
//! let mut events = catalog.events();
//! while let Some(walked) = events.next_record() {
//!     println!("{}", String::from_utf8_lossy(walked.record.name));
//! }
//! println!("event walk ended with {:?}", events.finish().end);
//!
//! let mut renderer = Renderer::new(std::io::stdout().lock(), Verbosity::DEFAULT);
//! render_catalog(&catalog, &mut renderer)?;
//! # Ok(())
//! # }
//! ```

mod catalog;
mod catalog_file;
mod domain;
mod error;
mod event;
mod field;
mod group;
mod header;
mod render;
mod schema;
mod section;
mod walker;

pub use catalog::{render_catalog, CatalogReport};
pub use catalog_file::CatalogFile;
pub use domain::{Domain, DomainCode};
pub use error::{Error, FieldError, RecordError, UnsupportedEventDomain};
pub use event::Event;
pub use field::{is_within, read_u16_at, LengthPrefixedField};
pub use group::{EventIndices, Group, GroupIndex};
pub use header::CatalogHeader;
pub use render::{event_descriptors, Escaped, EventDescriptor, Renderer, Verbosity};
pub use schema::{Schema, SchemaFieldEntries, SchemaFieldEntry};
pub use section::{CatalogSection, SectionKind, PAGE_SIZE};
pub use walker::{
    CatalogRecord, RecordPosition, SectionWalker, WalkEnd, WalkSummary, WalkedRecord,
    RECORD_ALIGNMENT,
};
