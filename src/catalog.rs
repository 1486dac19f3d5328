use std::io::{self, Write};

use crate::catalog_file::CatalogFile;
use crate::group::GroupIndex;
use crate::render::Renderer;
use crate::section::PAGE_SIZE;
use crate::walker::{RecordPosition, WalkSummary};

/// How the walk over each section ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogReport {
    pub schemas: WalkSummary,
    pub groups: WalkSummary,
    pub events: WalkSummary,
}

impl CatalogReport {
    /// True if no section walk was cut short by a bad record.
    pub fn is_clean(&self) -> bool {
        !self.schemas.is_aborted() && !self.groups.is_aborted() && !self.events.is_aborted()
    }
}

/// Decodes every section of `catalog` and renders it.
///
/// Sections are walked in order: schemas, then groups, then events, since
/// events refer back to groups by position. A bad record only stops the walk
/// of its own section. The only errors returned are from writing the output.
pub fn render_catalog<W: Write>(
    catalog: &CatalogFile,
    renderer: &mut Renderer<W>,
) -> io::Result<CatalogReport> {
    let schemas = render_schemas(catalog, renderer)?;

    let declared_groups = catalog.header.group_section.entry_count as usize;
    let mut group_index = GroupIndex::with_capacity(declared_groups);
    let mut walker = catalog.groups();
    while let Some(walked) = walker.next_record() {
        renderer.group(&walked.position, &walked.record, declared_groups)?;
        group_index.push(walked.record);
    }
    let groups = walker.finish();

    let declared_events = catalog.header.event_section.entry_count as usize;
    let mut walker = catalog.events();
    while let Some(walked) = walker.next_record() {
        if crosses_page_boundary(&walked.position) {
            tracing::warn!(
                "event {} at offset {} crosses a page boundary",
                walked.position.index,
                walked.position.offset
            );
        }
        renderer.event(&walked.position, &walked.record, &group_index, declared_events)?;
    }
    let events = walker.finish();

    let formula = &catalog.header.formula_section;
    tracing::debug!(
        "formula section ({} entries in {} pages) is not decoded",
        formula.entry_count,
        formula.page_len
    );

    Ok(CatalogReport {
        schemas,
        groups,
        events,
    })
}

fn render_schemas<W: Write>(
    catalog: &CatalogFile,
    renderer: &mut Renderer<W>,
) -> io::Result<WalkSummary> {
    let declared = catalog.header.schema_section.entry_count as usize;
    let mut walker = catalog.schemas();
    while let Some(walked) = walker.next_record() {
        let schema = &walked.record;
        let read = schema.readable_entry_count();
        if read != schema.field_entry_count as usize {
            tracing::warn!(
                "schema ended before listed # of fields were parsed \
                 (got {read}, wanted {}, length {})",
                schema.field_entry_count,
                schema.length
            );
        } else if schema.trailing_padding() > 0 {
            tracing::debug!("schema has padding of {} bytes", schema.trailing_padding());
        }
        renderer.schema(&walked.position, schema, declared)?;
    }
    Ok(walker.finish())
}

fn crosses_page_boundary(position: &RecordPosition) -> bool {
    let last = position.offset + position.length.max(1) - 1;
    position.offset / PAGE_SIZE != last / PAGE_SIZE
}
