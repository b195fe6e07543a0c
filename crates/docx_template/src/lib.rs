//! DOCX Templates
//!
//! This crate fills `${name}` placeholders in Word (.docx) templates and
//! clones table rows for repeated content such as order line items.
//!
//! # Features
//!
//! - Loads the whole package into memory; the template file is never modified
//! - Repairs placeholders that Word split over several runs
//! - Replaces placeholders in the main document, headers and footers
//! - Clones a table row per record, indexing its placeholders (`${x#1}`, `${x#2}`, ...)
//! - Writes the result back as bytes or to a file
//!
//! # Example
//!
//! ```rust
//! use docx_template::{DocxBuilder, TemplateProcessor};
//!
//! let template = DocxBuilder::new()
//!     .paragraph("Total: ${order_total}")
//!     .table(&[&["${item_name}", "${item_price}"]])
//!     .build()
//!     .unwrap();
//!
//! let mut processor = TemplateProcessor::from_bytes(&template).unwrap();
//! processor.set_value("order_total", "$42.00");
//! processor.clone_row("item_name", 2).unwrap();
//! processor.set_value("item_name#1", "Widget");
//!
//! assert!(processor.has_placeholder("item_name#2"));
//! let bytes = processor.save_to_bytes().unwrap();
//! assert!(!bytes.is_empty());
//! ```

mod builder;
mod error;
mod placeholders;
mod processor;
mod reader;
mod rows;
mod writer;

pub use builder::{paragraph_xml, table_xml, DocxBuilder};
pub use error::{DocxError, DocxResult};
pub use placeholders::{escape_value, unwrap as unwrap_placeholder, wrap as wrap_placeholder};
pub use processor::TemplateProcessor;
pub use reader::{DocxPackage, PackageEntry, CONTENT_TYPES, MAIN_PART};
pub use writer::DocxWriter;
