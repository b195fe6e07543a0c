//! Template renderer
//!
//! Applies flat placeholders and row groups to a template document. The
//! renderer never parses the document format itself; it drives a
//! [`TemplateDocument`] through `set_value` and `clone_row`.

use crate::error::{RenderError, Result};
use crate::row_group::RowGroup;
use crate::value::PlaceholderMap;
use docx_template::{DocxError, TemplateProcessor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Operations the renderer needs from a loaded template
pub trait TemplateDocument {
    /// Whether `${name}` sits in a table row that `clone_row` can clone
    fn has_row_anchor(&self, name: &str) -> bool;

    /// Replace `${name}` with literal text; returns the number of replacements
    fn set_value(&mut self, name: &str, value: &str) -> usize;

    /// Clone the row holding `${anchor}` `count` times; zero removes it
    fn clone_row(&mut self, anchor: &str, count: usize) -> std::result::Result<(), DocxError>;
}

impl TemplateDocument for TemplateProcessor {
    fn has_row_anchor(&self, name: &str) -> bool {
        TemplateProcessor::has_row_anchor(self, name)
    }

    fn set_value(&mut self, name: &str, value: &str) -> usize {
        TemplateProcessor::set_value(self, name, value)
    }

    fn clone_row(&mut self, anchor: &str, count: usize) -> std::result::Result<(), DocxError> {
        TemplateProcessor::clone_row(self, anchor, count)
    }
}

/// What a render changed, for logging and inspection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderReport {
    /// Occurrences of flat placeholders replaced
    pub flat_replacements: usize,
    /// One entry per row group, in render order
    pub groups: Vec<GroupReport>,
}

/// Outcome of rendering one row group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    pub anchor: String,
    /// Rows produced (0 when the anchor row was removed or absent)
    pub rows: usize,
    /// Indexed placeholder occurrences replaced
    pub replacements: usize,
    /// Whether the template carried the anchor row at all
    pub anchor_present: bool,
}

/// Renders placeholder maps and row groups into a template
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render into `template` in place.
    ///
    /// Flat placeholders are applied first, then each row group in the given
    /// order. Placeholders the template does not use are skipped, and
    /// template placeholders without a value stay as literal `${name}`.
    ///
    /// A group with records whose anchor row is missing fails with
    /// [`RenderError::AnchorNotFound`] before the template is touched. An
    /// anchor outside a table row counts as missing. A group without records
    /// whose anchor row is missing is skipped.
    pub fn render<T: TemplateDocument>(
        &self,
        template: &mut T,
        placeholders: &PlaceholderMap,
        row_groups: &[RowGroup],
    ) -> Result<RenderReport> {
        validate_groups(template, row_groups)?;

        let mut report = RenderReport::default();

        for (name, value) in placeholders.iter() {
            let replaced = template.set_value(name, &value.to_string_value());
            if replaced == 0 {
                tracing::trace!(placeholder = name, "Placeholder not used by template");
            }
            report.flat_replacements += replaced;
        }

        for group in row_groups {
            report.groups.push(render_group(template, group)?);
        }

        tracing::debug!(
            flat = report.flat_replacements,
            groups = report.groups.len(),
            "Rendered template"
        );
        Ok(report)
    }

    /// Load a template package from bytes, render it and return the new package
    pub fn render_package(
        &self,
        template: &[u8],
        placeholders: &PlaceholderMap,
        row_groups: &[RowGroup],
    ) -> Result<Vec<u8>> {
        let mut processor =
            TemplateProcessor::from_bytes(template).map_err(RenderError::TemplateUnreadable)?;
        self.render(&mut processor, placeholders, row_groups)?;
        Ok(processor.save_to_bytes()?)
    }
}

/// Check anchors before any substitution so a failed render leaves no trace
fn validate_groups<T: TemplateDocument>(template: &T, row_groups: &[RowGroup]) -> Result<()> {
    let mut anchors = HashSet::new();

    for group in row_groups {
        let anchor = group.anchor_placeholder();
        if !anchors.insert(anchor.clone()) {
            return Err(RenderError::DuplicateAnchor { anchor });
        }
        if !group.is_empty() && !template.has_row_anchor(&anchor) {
            return Err(RenderError::AnchorNotFound { anchor });
        }
    }

    Ok(())
}

fn render_group<T: TemplateDocument>(template: &mut T, group: &RowGroup) -> Result<GroupReport> {
    let anchor = group.anchor_placeholder();

    if !template.has_row_anchor(&anchor) {
        // Only empty groups get here; the template has no row to remove.
        tracing::debug!(anchor = %anchor, "Skipping empty row group without anchor row");
        return Ok(GroupReport {
            anchor,
            rows: 0,
            replacements: 0,
            anchor_present: false,
        });
    }

    template
        .clone_row(&anchor, group.len())
        .map_err(|err| match err {
            DocxError::RowNotFound(_) => RenderError::AnchorNotFound {
                anchor: anchor.clone(),
            },
            other => RenderError::Document(other),
        })?;

    let mut replacements = 0;
    for (name, value) in group.indexed_values() {
        replacements += template.set_value(&name, &value.to_string_value());
    }

    tracing::debug!(anchor = %anchor, rows = group.len(), replacements, "Rendered row group");
    Ok(GroupReport {
        anchor,
        rows: group.len(),
        replacements,
        anchor_present: true,
    })
}
