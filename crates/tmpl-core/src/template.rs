//! Document templates: a named, typed scene plus persistence metadata.

use crate::model::{DocumentType, PAGE_HEIGHT, PAGE_WIDTH};
use crate::scene::SceneGraph;
use crate::starter::starter_scene;
use chrono::{DateTime, Utc};

/// A reusable visual template for one document type.
///
/// The page size is fixed for every template; the scene holds the objects
/// in z-order. `thumbnail` is a PNG data URL produced at save time.
#[derive(Debug, Clone)]
pub struct Template {
    /// Backend id; `None` until first saved.
    pub id: Option<String>,
    pub name: String,
    pub document_type: DocumentType,
    pub scene: SceneGraph,
    pub thumbnail: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl Template {
    /// An empty page.
    pub fn blank(name: impl Into<String>, document_type: DocumentType) -> Self {
        Self {
            id: None,
            name: name.into(),
            document_type,
            scene: SceneGraph::new(),
            thumbnail: None,
            last_modified: None,
        }
    }

    /// The default starter layout for `document_type`.
    pub fn starter(document_type: DocumentType) -> Self {
        Self {
            scene: starter_scene(document_type),
            ..Self::blank(format!("{} Template", document_type.title()), document_type)
        }
    }

    pub const fn canvas_size() -> (f64, f64) {
        (PAGE_WIDTH, PAGE_HEIGHT)
    }

    /// Stamp the last-modified marker (on successful save).
    pub fn touch(&mut self) {
        self.last_modified = Some(Utc::now());
    }
}
