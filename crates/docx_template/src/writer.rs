//! DOCX package writer
//!
//! Writes the in-memory package back into a ZIP archive with the layout Word
//! expects.

use crate::error::DocxResult;
use crate::reader::DocxPackage;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Writes a [`DocxPackage`] into a ZIP archive
pub struct DocxWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
}

impl<W: Write + Seek> DocxWriter<W> {
    /// Create a new DOCX writer
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
        }
    }

    /// Write every entry in its original order and finish the archive
    pub fn write(mut self, package: &DocxPackage) -> DocxResult<W> {
        for entry in package.entries() {
            if entry.name.starts_with("word/media/") {
                self.write_binary(&entry.name, &entry.data)?;
            } else {
                self.write_file(&entry.name, &entry.data)?;
            }
        }
        Ok(self.zip.finish()?)
    }

    /// Write a compressed entry to the ZIP archive
    pub fn write_file(&mut self, path: &str, content: &[u8]) -> DocxResult<()> {
        let options = entry_options(zip::CompressionMethod::Deflated);

        self.zip.start_file(path, options)?;
        self.zip.write_all(content)?;

        Ok(())
    }

    /// Write binary data to the ZIP archive
    pub fn write_binary(&mut self, path: &str, data: &[u8]) -> DocxResult<()> {
        let options = entry_options(zip::CompressionMethod::Stored); // Don't compress media

        self.zip.start_file(path, options)?;
        self.zip.write_all(data)?;

        Ok(())
    }
}

/// Entry options with a fixed timestamp, so equal packages give equal bytes
fn entry_options(method: zip::CompressionMethod) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(method)
        .last_modified_time(zip::DateTime::default())
}
