//! Error types for the template core.

use thiserror::Error;

/// Errors raised while decoding or validating templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The document is not valid JSON, or its top level is not a template.
    #[error("invalid template JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A document type string outside the fixed catalog.
    #[error("unknown document type `{0}`")]
    UnknownDocumentType(String),
}
