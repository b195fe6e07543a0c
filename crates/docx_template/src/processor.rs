//! Template processor
//!
//! Loads a DOCX package into memory and edits the text of its main document,
//! header and footer parts. Placeholders are `${name}` tokens in run text.

use crate::error::{DocxError, DocxResult};
use crate::placeholders::{self, escape_value, wrap};
use crate::reader::{DocxPackage, XmlParser};
use crate::rows::find_row_block;
use crate::writer::DocxWriter;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

/// An editable text part of the package
#[derive(Debug, Clone)]
struct TextPart {
    name: String,
    xml: String,
}

/// A loaded template whose placeholders can be filled and rows cloned
#[derive(Debug, Clone)]
pub struct TemplateProcessor {
    package: DocxPackage,
    /// Main document first, then headers and footers
    parts: Vec<TextPart>,
}

impl TemplateProcessor {
    /// Open a template file from disk
    pub fn open(path: impl AsRef<Path>) -> DocxResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DocxError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path.display()),
                ))
            } else {
                DocxError::Io(e)
            }
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a template from an in-memory byte slice
    pub fn from_bytes(bytes: &[u8]) -> DocxResult<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Load a template from any seekable reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> DocxResult<Self> {
        let package = DocxPackage::read(reader)?;

        let mut parts = Vec::new();
        for name in package.text_part_names() {
            let raw = package.read_string(&name)?;
            XmlParser::check_well_formed(&name, &raw)?;
            let xml = placeholders::fix_broken_placeholders(&raw).into_owned();
            parts.push(TextPart { name, xml });
        }

        tracing::debug!(
            parts = parts.len(),
            entries = package.entries().len(),
            "Loaded DOCX template"
        );

        Ok(Self { package, parts })
    }

    /// Replace every occurrence of a placeholder with a literal text value.
    ///
    /// `name` may be given bare (`order_total`) or wrapped (`${order_total}`).
    /// The value is XML-escaped. Returns the number of replacements made;
    /// zero means the template does not use the placeholder.
    pub fn set_value(&mut self, name: &str, value: &str) -> usize {
        let token = wrap(name);
        let escaped = escape_value(value);
        let mut replaced = 0;

        for part in &mut self.parts {
            let count = part.xml.matches(&*token).count();
            if count > 0 {
                part.xml = part.xml.replace(&*token, &escaped);
                replaced += count;
            }
        }

        replaced
    }

    /// Clone the table row holding `name` so it appears `count` times.
    ///
    /// Every placeholder inside the cloned block is renamed to its indexed
    /// form: the n-th copy (1-based) has `${x#n}` for each `${x}`.
    /// A count of zero removes the row.
    pub fn clone_row(&mut self, name: &str, count: usize) -> DocxResult<()> {
        let token = wrap(name);
        let main = self.main_part_mut();

        let offset = main
            .xml
            .find(&*token)
            .ok_or_else(|| DocxError::RowNotFound(placeholders::unwrap(&token).to_string()))?;
        let block = find_row_block(&main.name, &main.xml, offset)?
            .ok_or_else(|| DocxError::RowNotFound(placeholders::unwrap(&token).to_string()))?;

        let row_xml = main.xml[block.clone()].to_string();
        let clones: String = (1..=count)
            .map(|i| placeholders::index_placeholders(&row_xml, i))
            .collect();
        main.xml.replace_range(block, &clones);

        tracing::debug!(anchor = %placeholders::unwrap(&token), count, "Cloned table row");
        Ok(())
    }

    /// Check whether any part contains the placeholder
    pub fn has_placeholder(&self, name: &str) -> bool {
        let token = wrap(name);
        self.parts.iter().any(|p| p.xml.contains(&*token))
    }

    /// Whether `clone_row(name, _)` would find a table row in the main document
    pub fn has_row_anchor(&self, name: &str) -> bool {
        let token = wrap(name);
        let main = &self.parts[0];
        match main.xml.find(&*token) {
            Some(offset) => matches!(find_row_block(&main.name, &main.xml, offset), Ok(Some(_))),
            None => false,
        }
    }

    /// Sorted, de-duplicated names of all placeholders left in the template
    pub fn variables(&self) -> Vec<String> {
        self.parts
            .iter()
            .flat_map(|p| placeholders::find_placeholders(&p.xml))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of placeholder occurrences left in the template
    pub fn variable_count(&self) -> usize {
        self.parts
            .iter()
            .map(|p| placeholders::find_placeholders(&p.xml).len())
            .sum()
    }

    /// Current XML of the main document part
    pub fn main_xml(&self) -> &str {
        &self.parts[0].xml
    }

    /// Current XML of a header or footer part, if the package has it
    pub fn part_xml(&self, name: &str) -> Option<&str> {
        self.parts.iter().find(|p| p.name == name).map(|p| p.xml.as_str())
    }

    /// Write the processed package to an in-memory byte vector
    pub fn save_to_bytes(&self) -> DocxResult<Vec<u8>> {
        let package = self.build_package()?;
        let cursor = DocxWriter::new(Cursor::new(Vec::new())).write(&package)?;
        Ok(cursor.into_inner())
    }

    /// Write the processed package to a file
    pub fn save_as(&self, path: impl AsRef<Path>) -> DocxResult<()> {
        let package = self.build_package()?;
        let file = File::create(path)?;
        let mut writer = DocxWriter::new(BufWriter::new(file)).write(&package)?;
        writer.flush()?;
        Ok(())
    }

    fn main_part_mut(&mut self) -> &mut TextPart {
        &mut self.parts[0]
    }

    fn build_package(&self) -> DocxResult<DocxPackage> {
        let mut package = self.package.clone();
        for part in &self.parts {
            package.replace(&part.name, part.xml.clone().into_bytes())?;
        }
        Ok(package)
    }
}
