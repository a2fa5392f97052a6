//! Lint diagnostics for templates.
//!
//! Reports issues that would surprise the downstream renderer without
//! modifying the scene.

use crate::catalog::is_known_field;
use crate::id::ObjectId;
use crate::model::{CanvasObject, DocumentType, page_rect};
use crate::scene::SceneGraph;
use crate::serialize::tokens_in;

/// Sub-unit overhang tolerated before an object counts as off the page.
const PAGE_TOLERANCE: f64 = 0.5;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Likely renders wrong or not at all.
    Warning,
    /// Style suggestion.
    Info,
}

/// A single lint diagnostic for an object.
#[derive(Debug, Clone, PartialEq)]
pub struct LintDiagnostic {
    /// The object this diagnostic refers to (a table cell reports its own id).
    pub object_id: ObjectId,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "unknown-field", "off-page").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run every rule over the scene for a template of `doc_type`.
#[must_use]
pub fn lint_template(scene: &SceneGraph, doc_type: DocumentType) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_unknown_fields(scene, doc_type, &mut diags);
    lint_off_page(scene, &mut diags);
    lint_empty_text(scene, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

/// Warn on tokens the catalog does not offer for this document type.
fn lint_unknown_fields(scene: &SceneGraph, doc_type: DocumentType, diags: &mut Vec<LintDiagnostic>) {
    for obj in scene.iter() {
        obj.walk(&mut |o| {
            let paths: Vec<&str> = match o.field_name() {
                Some(path) => vec![path],
                None => o.text().map(|t| tokens_in(t).collect()).unwrap_or_default(),
            };
            for path in paths {
                if !is_known_field(doc_type, path) {
                    diags.push(LintDiagnostic {
                        object_id: o.id,
                        message: format!("`{{{{{path}}}}}` is not a {doc_type} field"),
                        severity: LintSeverity::Warning,
                        rule: "unknown-field",
                    });
                }
            }
        });
    }
}

/// Warn on top-level objects that are not fully on the page.
fn lint_off_page(scene: &SceneGraph, diags: &mut Vec<LintDiagnostic>) {
    let page = page_rect().inflate(PAGE_TOLERANCE, PAGE_TOLERANCE);
    for obj in scene.iter() {
        let bounds = obj.geometry.bounding_rect();
        let inside = bounds.x0 >= page.x0
            && bounds.y0 >= page.y0
            && bounds.x1 <= page.x1
            && bounds.y1 <= page.y1;
        if !inside {
            diags.push(LintDiagnostic {
                object_id: obj.id,
                message: format!(
                    "`{}` extends outside the page ({:.0}, {:.0}) to ({:.0}, {:.0})",
                    obj.id, bounds.x0, bounds.y0, bounds.x1, bounds.y1
                ),
                severity: LintSeverity::Warning,
                rule: "off-page",
            });
        }
    }
}

/// Note editable text objects with nothing in them.
fn lint_empty_text(scene: &SceneGraph, diags: &mut Vec<LintDiagnostic>) {
    for obj in scene.iter() {
        obj.walk(&mut |o: &CanvasObject| {
            if o.kind.is_editable_text() && o.text().is_some_and(|t| t.trim().is_empty()) {
                diags.push(LintDiagnostic {
                    object_id: o.id,
                    message: format!("`{}` has no text", o.id),
                    severity: LintSeverity::Info,
                    rule: "empty-text",
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;

    fn rules(diags: &[LintDiagnostic]) -> Vec<&'static str> {
        diags.iter().map(|d| d.rule).collect()
    }

    #[test]
    fn lint_unknown_field() {
        let mut scene = SceneGraph::new();
        scene.add(factory::data_field("supplier.name", 40.0, 40.0));
        let diags = lint_template(&scene, DocumentType::Invoice);
        assert_eq!(rules(&diags), vec!["unknown-field"]);
        assert_eq!(diags[0].severity, LintSeverity::Warning);

        assert!(lint_template(&scene, DocumentType::PurchaseOrder).is_empty());
    }

    #[test]
    fn lint_tokens_inside_plain_text() {
        let mut scene = SceneGraph::new();
        scene.add(factory::body_text("Dear {{customer.name}}, see {{bogus.path}}", 40.0, 40.0));
        let diags = lint_template(&scene, DocumentType::Quote);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("bogus.path"));
    }

    #[test]
    fn lint_table_cells_on_wrong_type() {
        let mut scene = SceneGraph::new();
        scene.add(factory::line_items_table(1, 40.0, 40.0));
        assert!(lint_template(&scene, DocumentType::Invoice).is_empty());
        let diags = lint_template(&scene, DocumentType::FieldReport);
        assert_eq!(diags.len(), 4);
    }

    #[test]
    fn lint_off_page() {
        let mut scene = SceneGraph::new();
        let id = scene.add(factory::rectangle(560.0, 40.0));
        let diags = lint_template(&scene, DocumentType::Quote);
        assert_eq!(rules(&diags), vec!["off-page"]);
        assert_eq!(diags[0].object_id, id);
    }

    #[test]
    fn lint_empty_text() {
        let mut scene = SceneGraph::new();
        scene.add(factory::body_text("   ", 40.0, 40.0));
        let diags = lint_template(&scene, DocumentType::Quote);
        assert_eq!(rules(&diags), vec!["empty-text"]);
        assert_eq!(diags[0].severity, LintSeverity::Info);
    }

    #[test]
    fn lint_clean_template_no_diags() {
        let mut scene = SceneGraph::new();
        scene.add(factory::heading("Invoice", 40.0, 40.0));
        scene.add(factory::data_field("invoice.total", 40.0, 100.0));
        assert!(lint_template(&scene, DocumentType::Invoice).is_empty());
    }
}
