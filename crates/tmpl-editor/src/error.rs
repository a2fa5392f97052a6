use crate::session::EditorState;
use crate::store::StoreError;
use thiserror::Error;
use tmpl_core::error::TemplateError;
use tmpl_core::id::ObjectId;
use tmpl_core::model::DocumentType;
use tmpl_render::RenderError;

/// Errors surfaced by editor operations. Every variant leaves the scene and
/// history as they were before the call.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("cannot {action} while the editor is {state:?}")]
    InvalidState {
        state: EditorState,
        action: &'static str,
    },

    #[error("no active object")]
    NoActiveObject,

    #[error("object `{0}` not found")]
    NotFound(ObjectId),

    #[error("object `{0}` is locked")]
    Locked(ObjectId),

    #[error("invalid {property}: {reason}")]
    Rejected {
        property: &'static str,
        reason: String,
    },

    #[error("`{path}` is not a {document_type} field")]
    UnknownField {
        path: String,
        document_type: DocumentType,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
