//! ZIP archive reading and XML parsing utilities

use crate::error::{DocxError, DocxResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Path of the main document part
pub const MAIN_PART: &str = "word/document.xml";
/// Path of the package content types
pub const CONTENT_TYPES: &str = "[Content_Types].xml";

/// A single file stored in the package, kept in archive order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// All entries of a DOCX archive, loaded into memory
#[derive(Debug, Clone, Default)]
pub struct DocxPackage {
    entries: Vec<PackageEntry>,
}

impl DocxPackage {
    /// Read every entry of the archive from a source that implements Read + Seek
    pub fn read<R: Read + Seek>(reader: R) -> DocxResult<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry { name, data });
        }

        let package = Self { entries };
        if !package.is_valid_docx() {
            let missing = if package.file_exists(CONTENT_TYPES) {
                MAIN_PART
            } else {
                CONTENT_TYPES
            };
            return Err(DocxError::InvalidStructure(format!(
                "archive has no {}",
                missing
            )));
        }
        Ok(package)
    }

    /// Check if a file exists in the package
    pub fn file_exists(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.name == path)
    }

    /// Get a list of all files in the package, in archive order
    pub fn file_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Check if this is a valid DOCX package
    pub fn is_valid_docx(&self) -> bool {
        self.file_exists(CONTENT_TYPES) && self.file_exists(MAIN_PART)
    }

    /// Read a file from the package as a string
    pub fn read_string(&self, path: &str) -> DocxResult<String> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == path)
            .ok_or_else(|| DocxError::MissingPart(path.to_string()))?;

        String::from_utf8(entry.data.clone()).map_err(|source| DocxError::Utf8 {
            part: path.to_string(),
            source,
        })
    }

    /// Replace the content of an existing entry
    pub fn replace(&mut self, path: &str, data: Vec<u8>) -> DocxResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == path)
            .ok_or_else(|| DocxError::MissingPart(path.to_string()))?;
        entry.data = data;
        Ok(())
    }

    /// Names of the parts that may carry placeholders: the main document,
    /// then headers and footers in archive order
    pub fn text_part_names(&self) -> Vec<String> {
        let mut names = vec![MAIN_PART.to_string()];
        names.extend(
            self.entries
                .iter()
                .map(|e| e.name.as_str())
                .filter(|name| is_header_or_footer(name))
                .map(str::to_string),
        );
        names
    }

    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }
}

fn is_header_or_footer(name: &str) -> bool {
    name.strip_prefix("word/")
        .filter(|rest| !rest.contains('/'))
        .map(|rest| {
            (rest.starts_with("header") || rest.starts_with("footer")) && rest.ends_with(".xml")
        })
        .unwrap_or(false)
}

/// XML reader utilities for DOCX XML content
pub struct XmlParser;

impl XmlParser {
    /// Create a new XML reader that keeps every byte of text,
    /// so reader positions map back onto the source string
    pub fn from_string(content: &str) -> Reader<&[u8]> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);
        reader
    }

    /// Check that a part is well-formed XML
    pub fn check_well_formed(part: &str, content: &str) -> DocxResult<()> {
        let mut reader = Self::from_string(content);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => return Ok(()),
                Ok(_) => {}
                Err(e) => return Err(DocxError::xml(part, e)),
            }
        }
    }

    /// Get an attribute value from an event
    pub fn get_attribute(event: &quick_xml::events::BytesStart, name: &[u8]) -> Option<String> {
        event
            .attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == name)
            .map(|a| String::from_utf8_lossy(&a.value).to_string())
    }

    /// Get a w: namespaced attribute (most common in DOCX)
    pub fn get_w_attribute(event: &quick_xml::events::BytesStart, name: &str) -> Option<String> {
        let key = format!("w:{}", name);
        Self::get_attribute(event, key.as_bytes())
            .or_else(|| Self::get_attribute(event, name.as_bytes()))
    }

    /// Check if an element name matches with optional namespace prefix
    pub fn matches_element(name: &[u8], expected: &str) -> bool {
        let name_str = std::str::from_utf8(name).unwrap_or("");
        name_str == expected
            || name_str
                .rsplit_once(':')
                .map(|(_, local)| local == expected)
                .unwrap_or(false)
    }
}
