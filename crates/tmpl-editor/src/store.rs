//! Persistence boundary.
//!
//! The editor never talks to a backend itself. It hands a `SaveRequest` to
//! whatever implements `TemplateStore` and surfaces the outcome; there are
//! no retries here.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use thiserror::Error;
use tmpl_core::model::DocumentType;

/// Failures reported by a store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("template `{0}` not found")]
    NotFound(String),

    #[error("store failure: {0}")]
    Backend(String),
}

/// Everything a save hands to the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    /// `None` on first save; the store assigns one.
    pub template_id: Option<String>,
    pub template_json: String,
    /// `data:image/png;base64,...`
    pub thumbnail_data_url: String,
    pub name: String,
    pub document_type: DocumentType,
}

/// A template as fetched from the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTemplate {
    pub id: String,
    pub name: String,
    pub document_type: DocumentType,
    pub template_json: String,
}

/// Load/save collaborator.
pub trait TemplateStore {
    /// Persist a template; resolves to the id it was stored under.
    fn save(&self, request: SaveRequest) -> impl Future<Output = Result<String, StoreError>> + Send;

    fn load(&self, template_id: &str) -> impl Future<Output = Result<StoredTemplate, StoreError>> + Send;
}

#[derive(Debug, Default)]
struct Inner {
    templates: HashMap<String, (StoredTemplate, String)>,
    next_id: u64,
    failure: Option<String>,
}

/// In-process store for tests and embedding. Thumbnails are kept next to
/// each template.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a template (as if saved earlier by another session).
    pub fn insert(&self, template: StoredTemplate) {
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .templates
                .insert(template.id.clone(), (template, String::new()));
        }
    }

    /// Make every following call fail with `message` (`None` heals it).
    pub fn set_failure(&self, message: Option<&str>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failure = message.map(str::to_string);
        }
    }

    /// Stored template and thumbnail data URL for `id`.
    pub fn saved(&self, id: &str) -> Option<(StoredTemplate, String)> {
        self.inner.lock().ok()?.templates.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.templates.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn save_now(&self, request: SaveRequest) -> Result<String, StoreError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if let Some(message) = &inner.failure {
            return Err(StoreError::Backend(message.clone()));
        }
        let id = match request.template_id {
            Some(id) => id,
            None => {
                inner.next_id += 1;
                format!("template_{}", inner.next_id)
            }
        };
        let stored = StoredTemplate {
            id: id.clone(),
            name: request.name,
            document_type: request.document_type,
            template_json: request.template_json,
        };
        inner
            .templates
            .insert(id.clone(), (stored, request.thumbnail_data_url));
        Ok(id)
    }

    fn load_now(&self, template_id: &str) -> Result<StoredTemplate, StoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if let Some(message) = &inner.failure {
            return Err(StoreError::Backend(message.clone()));
        }
        inner
            .templates
            .get(template_id)
            .map(|(t, _)| t.clone())
            .ok_or_else(|| StoreError::NotFound(template_id.to_string()))
    }
}

impl TemplateStore for MemoryStore {
    fn save(&self, request: SaveRequest) -> impl Future<Output = Result<String, StoreError>> + Send {
        let result = self.save_now(request);
        async move { result }
    }

    fn load(&self, template_id: &str) -> impl Future<Output = Result<StoredTemplate, StoreError>> + Send {
        let result = self.load_now(template_id);
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(id: Option<&str>) -> SaveRequest {
        SaveRequest {
            template_id: id.map(str::to_string),
            template_json: r#"{"objects":[]}"#.into(),
            thumbnail_data_url: "data:image/png;base64,AAAA".into(),
            name: "Quote Template".into(),
            document_type: DocumentType::Quote,
        }
    }

    #[tokio::test]
    async fn save_assigns_id_then_overwrites() {
        let store = MemoryStore::new();
        let id = store.save(request(None)).await.unwrap();
        assert_eq!(id, "template_1");
        assert_eq!(store.save(request(Some(&id))).await.unwrap(), id);
        assert_eq!(store.len(), 1);

        let loaded = store.load(&id).await.unwrap();
        assert_eq!(loaded.name, "Quote Template");
        assert_eq!(store.saved(&id).unwrap().1, "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn missing_template_is_not_found() {
        let store = MemoryStore::new();
        assert_eq!(
            store.load("nope").await,
            Err(StoreError::NotFound("nope".into()))
        );
    }

    #[tokio::test]
    async fn injected_failure_surfaces() {
        let store = MemoryStore::new();
        store.set_failure(Some("offline"));
        assert_eq!(
            store.save(request(None)).await,
            Err(StoreError::Backend("offline".into()))
        );
        assert!(store.is_empty());
        store.set_failure(None);
        assert!(store.save(request(None)).await.is_ok());
    }
}
