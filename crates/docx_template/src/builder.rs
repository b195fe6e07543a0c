//! Minimal DOCX package generation
//!
//! Builds a small but valid WordprocessingML package from body XML, used to
//! produce starter templates that users then style in Word.

use crate::error::DocxResult;
use crate::reader::{CONTENT_TYPES, MAIN_PART};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const DOCUMENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const HEADER_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
const FOOTER_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
const REL_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_HEADER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
const REL_FOOTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";

/// Builder for a minimal DOCX package
#[derive(Debug, Clone, Default)]
pub struct DocxBuilder {
    body: String,
    header: Option<String>,
    footer: Option<String>,
}

impl DocxBuilder {
    /// Create a builder with an empty body
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw body XML (paragraphs, tables)
    pub fn body(mut self, xml: impl AsRef<str>) -> Self {
        self.body.push_str(xml.as_ref());
        self
    }

    /// Append a paragraph with a single run of text
    pub fn paragraph(self, text: &str) -> Self {
        let xml = paragraph_xml(text);
        self.body(xml)
    }

    /// Append a table; each row is a list of cell texts
    pub fn table(self, rows: &[&[&str]]) -> Self {
        let xml = table_xml(rows);
        self.body(xml)
    }

    /// Set the default header content (body-level XML)
    pub fn header(mut self, xml: impl Into<String>) -> Self {
        self.header = Some(xml.into());
        self
    }

    /// Set the default footer content (body-level XML)
    pub fn footer(mut self, xml: impl Into<String>) -> Self {
        self.footer = Some(xml.into());
        self
    }

    /// Build the package as bytes
    pub fn build(&self) -> DocxResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        let mut files: Vec<(&str, String)> = vec![
            (CONTENT_TYPES, self.content_types_xml()),
            ("_rels/.rels", root_rels_xml()),
            (MAIN_PART, self.document_xml()),
            ("word/_rels/document.xml.rels", self.document_rels_xml()),
        ];
        if let Some(header) = &self.header {
            files.push(("word/header1.xml", part_xml("hdr", header)));
        }
        if let Some(footer) = &self.footer {
            files.push(("word/footer1.xml", part_xml("ftr", footer)));
        }

        for (path, content) in files {
            zip.start_file(path, options)?;
            zip.write_all(content.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }

    fn content_types_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        xml.push_str(&format!(
            r#"<Override PartName="/word/document.xml" ContentType="{}"/>"#,
            DOCUMENT_TYPE
        ));
        if self.header.is_some() {
            xml.push_str(&format!(
                r#"<Override PartName="/word/header1.xml" ContentType="{}"/>"#,
                HEADER_TYPE
            ));
        }
        if self.footer.is_some() {
            xml.push_str(&format!(
                r#"<Override PartName="/word/footer1.xml" ContentType="{}"/>"#,
                FOOTER_TYPE
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn document_rels_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        if self.header.is_some() {
            xml.push_str(&format!(
                r#"<Relationship Id="rIdHeader1" Type="{}" Target="header1.xml"/>"#,
                REL_HEADER
            ));
        }
        if self.footer.is_some() {
            xml.push_str(&format!(
                r#"<Relationship Id="rIdFooter1" Type="{}" Target="footer1.xml"/>"#,
                REL_FOOTER
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn document_xml(&self) -> String {
        let mut sect = String::from("<w:sectPr>");
        if self.header.is_some() {
            sect.push_str(r#"<w:headerReference w:type="default" r:id="rIdHeader1"/>"#);
        }
        if self.footer.is_some() {
            sect.push_str(r#"<w:footerReference w:type="default" r:id="rIdFooter1"/>"#);
        }
        sect.push_str(r#"<w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#);

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}" xmlns:r="{}"><w:body>{}{}</w:body></w:document>"#,
            W_NS, R_NS, self.body, sect
        )
    }
}

fn root_rels_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}" Target="word/document.xml"/></Relationships>"#,
        REL_DOCUMENT
    )
}

fn part_xml(root: &str, content: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:{root} xmlns:w="{}" xmlns:r="{}">{}</w:{root}>"#,
        W_NS,
        R_NS,
        content,
        root = root
    )
}

/// XML for a paragraph holding one run of text (text must already be escaped)
pub fn paragraph_xml(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        text
    )
}

/// XML for a simple bordered table
pub fn table_xml(rows: &[&[&str]]) -> String {
    let mut xml = String::from(
        r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="0" w:type="auto"/></w:tblPr>"#,
    );
    for row in rows {
        xml.push_str("<w:tr>");
        for cell in row.iter() {
            xml.push_str("<w:tc>");
            xml.push_str(&paragraph_xml(cell));
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DocxPackage;

    #[test]
    fn test_build_minimal_package() {
        let bytes = DocxBuilder::new().paragraph("Hello").build().unwrap();
        let package = DocxPackage::read(Cursor::new(bytes)).unwrap();

        assert!(package.is_valid_docx());
        let doc = package.read_string(MAIN_PART).unwrap();
        assert!(doc.contains("Hello"));
        assert!(!package.file_exists("word/header1.xml"));
    }

    #[test]
    fn test_build_with_header_and_footer() {
        let bytes = DocxBuilder::new()
            .paragraph("Body")
            .header(paragraph_xml("Head"))
            .footer(paragraph_xml("Foot"))
            .build()
            .unwrap();
        let package = DocxPackage::read(Cursor::new(bytes)).unwrap();

        assert!(package.read_string("word/header1.xml").unwrap().contains("Head"));
        assert!(package.read_string("word/footer1.xml").unwrap().contains("Foot"));
        assert_eq!(
            package.text_part_names(),
            vec![MAIN_PART, "word/header1.xml", "word/footer1.xml"]
        );
    }

    #[test]
    fn test_table_xml() {
        let xml = table_xml(&[&["A", "B"], &["${x}", "${y}"]]);
        assert_eq!(xml.matches("<w:tr>").count(), 2);
        assert_eq!(xml.matches("<w:tc>").count(), 4);
    }
}
