//! Error types for rendering order documents

use docx_template::DocxError;
use thiserror::Error;

/// Errors that abort a render. None of them leave an output file behind.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template file is configured for the document
    #[error("Could not find word document template. Make sure to have a word document assigned in the template configuration.")]
    TemplateMissing,

    /// The template could not be opened or parsed
    #[error("Template could not be read: {0}")]
    TemplateUnreadable(#[source] DocxError),

    /// A row group has records but the template has no row holding its anchor
    #[error("Template has no table row containing the placeholder '{anchor}'")]
    AnchorNotFound { anchor: String },

    /// Two row groups in one render use the same anchor placeholder
    #[error("Row groups share the anchor placeholder '{anchor}'")]
    DuplicateAnchor { anchor: String },

    /// The document collaborator failed during substitution or saving
    #[error("Document error: {0}")]
    Document(#[from] DocxError),

    /// IO error writing the rendered file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings or order data could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for order document operations
pub type Result<T> = std::result::Result<T, RenderError>;
