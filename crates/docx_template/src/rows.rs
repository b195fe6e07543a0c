//! Table row location for row cloning
//!
//! Finds the `w:tr` element that contains a given byte offset of a part,
//! together with any following rows that continue a vertical cell merge
//! started in that row.

use crate::error::{DocxError, DocxResult};
use crate::reader::XmlParser;
use quick_xml::events::{BytesStart, Event};
use std::ops::Range;

/// A table row found in a part
#[derive(Debug, Clone, PartialEq, Eq)]
struct RowInfo {
    /// Byte range of the whole `<w:tr>...</w:tr>` element
    span: Range<usize>,
    /// Occurrence index of the table that owns the row
    table: usize,
    /// Number of enclosing tables
    depth: usize,
    /// Row contains `<w:vMerge w:val="restart"/>`
    starts_merge: bool,
    /// Row contains a continued vertical merge (`<w:vMerge/>`)
    continues_merge: bool,
}

#[derive(Debug)]
struct OpenRow {
    start: usize,
    table: usize,
    depth: usize,
    starts_merge: bool,
    continues_merge: bool,
}

/// Collect every table row of the part, ordered by start offset
fn collect_rows(part: &str, xml: &str) -> DocxResult<Vec<RowInfo>> {
    let mut reader = XmlParser::from_string(xml);
    let mut tables: Vec<usize> = Vec::new();
    let mut table_count = 0usize;
    let mut open_rows: Vec<OpenRow> = Vec::new();
    let mut rows = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| DocxError::xml(part, e))?;
        let position = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) => {
                let name = e.name();
                if XmlParser::matches_element(name.as_ref(), "tbl") {
                    tables.push(table_count);
                    table_count += 1;
                } else if XmlParser::matches_element(name.as_ref(), "tr") {
                    open_rows.push(OpenRow {
                        start: tag_start(xml, position),
                        table: tables.last().copied().unwrap_or(usize::MAX),
                        depth: tables.len(),
                        starts_merge: false,
                        continues_merge: false,
                    });
                } else if XmlParser::matches_element(name.as_ref(), "vMerge") {
                    mark_merge(&mut open_rows, e);
                }
            }
            Event::Empty(ref e) => {
                let name = e.name();
                if XmlParser::matches_element(name.as_ref(), "vMerge") {
                    mark_merge(&mut open_rows, e);
                } else if XmlParser::matches_element(name.as_ref(), "tr") {
                    rows.push(RowInfo {
                        span: tag_start(xml, position)..position,
                        table: tables.last().copied().unwrap_or(usize::MAX),
                        depth: tables.len(),
                        starts_merge: false,
                        continues_merge: false,
                    });
                }
            }
            Event::End(ref e) => {
                let name = e.name();
                if XmlParser::matches_element(name.as_ref(), "tbl") {
                    tables.pop();
                } else if XmlParser::matches_element(name.as_ref(), "tr") {
                    if let Some(open) = open_rows.pop() {
                        rows.push(RowInfo {
                            span: open.start..position,
                            table: open.table,
                            depth: open.depth,
                            starts_merge: open.starts_merge,
                            continues_merge: open.continues_merge,
                        });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    rows.sort_by_key(|r| r.span.start);
    Ok(rows)
}

/// Start offset of the tag that ends right before `tag_end`
fn tag_start(xml: &str, tag_end: usize) -> usize {
    xml[..tag_end].rfind('<').unwrap_or(tag_end)
}

fn mark_merge(open_rows: &mut [OpenRow], e: &BytesStart<'_>) {
    if let Some(row) = open_rows.last_mut() {
        match XmlParser::get_w_attribute(e, "val").as_deref() {
            Some("restart") => row.starts_merge = true,
            None | Some("continue") => row.continues_merge = true,
            Some(_) => {}
        }
    }
}

/// Find the byte range of the row block to clone for a placeholder at `offset`.
///
/// The block is the innermost row containing the offset, extended over
/// following sibling rows while they continue a vertical merge started in it.
pub fn find_row_block(part: &str, xml: &str, offset: usize) -> DocxResult<Option<Range<usize>>> {
    let rows = collect_rows(part, xml)?;

    let Some(anchor) = rows
        .iter()
        .filter(|r| r.span.contains(&offset))
        .max_by_key(|r| r.depth)
    else {
        return Ok(None);
    };

    let mut block = anchor.span.clone();
    if anchor.starts_merge {
        let siblings = rows
            .iter()
            .filter(|r| r.table == anchor.table && r.depth == anchor.depth)
            .skip_while(|r| r.span.start <= anchor.span.start);

        for row in siblings {
            if !row.continues_merge || row.starts_merge {
                break;
            }
            block.end = row.span.end;
        }
    }

    Ok(Some(block))
}
