//! Error types for DOCX template operations

use thiserror::Error;

/// Errors that can occur while loading, editing or saving a template
#[derive(Debug, Error)]
pub enum DocxError {
    /// IO error (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML parsing error in {part}: {message}")]
    XmlParse { part: String, message: String },

    /// UTF-8 encoding error
    #[error("UTF-8 encoding error in {part}: {source}")]
    Utf8 {
        part: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Invalid DOCX structure
    #[error("Invalid DOCX structure: {0}")]
    InvalidStructure(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// The placeholder used as a clone anchor is not inside a table row
    #[error("Cannot clone row: placeholder '{0}' not found in a table row")]
    RowNotFound(String),
}

impl DocxError {
    pub(crate) fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        DocxError::XmlParse {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for DOCX template operations
pub type DocxResult<T> = std::result::Result<T, DocxError>;
