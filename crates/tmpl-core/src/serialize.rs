//! Scene graph ⇄ JSON.
//!
//! The emitted document is the contract with the downstream renderer:
//! objects in z-order, flat camelCase attributes, and `{{path}}` tokens inside
//! text. The editor never evaluates tokens.
//!
//! Loading is per-object: an object that fails to decode is skipped and
//! reported, the rest of the template still loads. Unknown keys are ignored and
//! missing optional keys take their defaults, so templates written by a newer
//! editor still open here.

use crate::error::TemplateError;
use crate::model::{CanvasObject, PAGE_HEIGHT, PAGE_WIDTH};
use crate::scene::SceneGraph;
use serde::{Deserialize, Serialize};

/// Version stamped into emitted documents.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct DocumentOut<'a> {
    version: u32,
    width: f64,
    height: f64,
    objects: &'a [CanvasObject],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentIn {
    Document {
        #[serde(default)]
        objects: Vec<serde_json::Value>,
    },
    Bare(Vec<serde_json::Value>),
}

/// An object dropped during load, with the decoder's complaint.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedObject {
    pub index: usize,
    pub reason: String,
}

/// Result of a tolerant load.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub scene: SceneGraph,
    pub skipped: Vec<SkippedObject>,
}

/// Serialize the scene to its compact JSON form.
pub fn serialize_scene(scene: &SceneGraph) -> Result<String, TemplateError> {
    Ok(serde_json::to_string(&document(scene))?)
}

/// Serialize the scene as indented JSON (CLI output, fixtures).
pub fn serialize_scene_pretty(scene: &SceneGraph) -> Result<String, TemplateError> {
    Ok(serde_json::to_string_pretty(&document(scene))?)
}

fn document(scene: &SceneGraph) -> DocumentOut<'_> {
    DocumentOut {
        version: FORMAT_VERSION,
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        objects: scene.objects(),
    }
}

/// Rebuild a scene from JSON, preserving z-order and every known attribute.
///
/// # Errors
/// Only when the input is not JSON or its top level is neither a template
/// document nor an array of objects. Individual bad objects are skipped.
pub fn deserialize_scene(json: &str) -> Result<LoadReport, TemplateError> {
    let raw = match serde_json::from_str::<DocumentIn>(json)? {
        DocumentIn::Document { objects } | DocumentIn::Bare(objects) => objects,
    };

    let mut report = LoadReport::default();
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<CanvasObject>(value) {
            Ok(mut obj) => {
                obj.normalize_tokens();
                report.scene.add(obj);
            }
            Err(e) => {
                log::warn!("skipping object {index}: {e}");
                report.skipped.push(SkippedObject {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }
    log::debug!(
        "loaded {} objects ({} skipped)",
        report.scene.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Every `{{path}}` token in the scene, in z-order (children after their container).
pub fn collect_tokens(scene: &SceneGraph) -> Vec<String> {
    let mut tokens = Vec::new();
    for obj in scene.iter() {
        obj.walk(&mut |o| {
            if let Some(text) = o.text() {
                tokens.extend(tokens_in(text).map(str::to_string));
            }
        });
    }
    tokens
}

/// Paths of the `{{...}}` tokens in a string, trimmed.
pub fn tokens_in(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        loop {
            let start = rest.find("{{")?;
            let after = &rest[start + 2..];
            let end = after.find("}}")?;
            let path = after[..end].trim();
            rest = &after[end + 2..];
            if !path.is_empty() {
                return Some(path);
            }
        }
    })
}
