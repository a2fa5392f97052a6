//! Default starter layouts, one per document type, used when a new document
//! is created with no prior content.

use crate::factory::{self, DEFAULT_TABLE_ROWS, PAGE_MARGIN};
use crate::model::{CanvasObject, DocumentType, FontWeight, PAGE_WIDTH};
use crate::scene::SceneGraph;
use crate::template::Template;

const LABEL_X: f64 = 360.0;
const VALUE_X: f64 = 450.0;
const TABLE_TOP: f64 = 300.0;

/// A right-column label with its bound value, clipped to the right margin.
fn labeled(out: &mut Vec<CanvasObject>, label: &str, path: &str, top: f64) {
    out.push(factory::body_text(label, LABEL_X, top));
    let mut value = factory::data_field(path, VALUE_X, top);
    value.geometry.width = value.geometry.width.min(PAGE_WIDTH - PAGE_MARGIN - VALUE_X);
    out.push(value);
}

fn header(out: &mut Vec<CanvasObject>, doc_type: DocumentType) {
    out.push(factory::heading(
        &doc_type.title().to_uppercase(),
        PAGE_MARGIN,
        PAGE_MARGIN,
    ));
    for (i, path) in [
        "company.name",
        "company.address",
        "company.phone",
        "company.email",
    ]
    .iter()
    .enumerate()
    {
        out.push(factory::data_field(path, PAGE_MARGIN, 90.0 + i as f64 * 20.0));
    }
    labeled(out, "No.", "document.number", 90.0);
    labeled(out, "Date", "document.date", 110.0);
}

fn counterpart(out: &mut Vec<CanvasObject>, title: &str, paths: &[&str]) {
    out.push(factory::subheading(title, PAGE_MARGIN, 190.0));
    for (i, path) in paths.iter().enumerate() {
        out.push(factory::data_field(path, PAGE_MARGIN, 225.0 + i as f64 * 20.0));
    }
}

fn totals(out: &mut Vec<CanvasObject>, rows: &[(&str, &str)]) {
    let table_height = factory::line_items_table(DEFAULT_TABLE_ROWS, 0.0, 0.0).geometry.height;
    let top = TABLE_TOP + table_height + 20.0;
    for (i, (label, path)) in rows.iter().enumerate() {
        labeled(out, label, path, top + i as f64 * 20.0);
    }
    if let Some(last_label) = out.iter_mut().rev().nth(1) {
        last_label.style.font_weight = FontWeight::BOLD;
    }
}

fn footer(out: &mut Vec<CanvasObject>, note: &str) {
    let mut rule = factory::line(PAGE_MARGIN, 780.0);
    rule.geometry.width = PAGE_WIDTH - 2.0 * PAGE_MARGIN;
    rule.style.stroke_width = 1.0;
    out.push(rule);
    out.push(factory::body_text(note, PAGE_MARGIN, 790.0));
}

/// Build the starter scene for `doc_type`.
pub fn starter_scene(doc_type: DocumentType) -> SceneGraph {
    let mut out = Vec::new();
    header(&mut out, doc_type);

    match doc_type {
        DocumentType::Quote => {
            labeled(&mut out, "Valid until", "quote.valid_until", 130.0);
            counterpart(
                &mut out,
                "Prepared For",
                &["customer.name", "customer.address", "customer.email"],
            );
            out.push(factory::line_items_table(DEFAULT_TABLE_ROWS, PAGE_MARGIN, TABLE_TOP));
            totals(
                &mut out,
                &[
                    ("Subtotal", "quote.subtotal"),
                    ("Tax", "quote.tax"),
                    ("Total", "quote.total"),
                ],
            );
            footer(&mut out, "Thank you for the opportunity to quote.");
        }
        DocumentType::Invoice => {
            labeled(&mut out, "Due", "invoice.due_date", 130.0);
            counterpart(
                &mut out,
                "Bill To",
                &["customer.name", "customer.address", "customer.email"],
            );
            out.push(factory::line_items_table(DEFAULT_TABLE_ROWS, PAGE_MARGIN, TABLE_TOP));
            totals(
                &mut out,
                &[
                    ("Subtotal", "invoice.subtotal"),
                    ("Tax", "invoice.tax"),
                    ("Paid", "invoice.amount_paid"),
                    ("Balance Due", "invoice.balance_due"),
                ],
            );
            footer(&mut out, "Thank you for your business.");
        }
        DocumentType::PurchaseOrder => {
            labeled(&mut out, "Deliver by", "purchase_order.delivery_date", 130.0);
            counterpart(
                &mut out,
                "Supplier",
                &["supplier.name", "supplier.address", "supplier.phone"],
            );
            out.push(factory::line_items_table(DEFAULT_TABLE_ROWS, PAGE_MARGIN, TABLE_TOP));
            totals(
                &mut out,
                &[
                    ("Subtotal", "purchase_order.subtotal"),
                    ("Tax", "purchase_order.tax"),
                    ("Total", "purchase_order.total"),
                ],
            );
            footer(&mut out, "Please quote the PO number on all correspondence.");
        }
        DocumentType::FieldReport => {
            labeled(&mut out, "Visit", "report.visit_date", 130.0);
            counterpart(
                &mut out,
                "Site",
                &["site.name", "site.address", "customer.name", "technician.name"],
            );
            out.push(factory::subheading("Findings", PAGE_MARGIN, 330.0));
            out.push(factory::data_field("report.findings", PAGE_MARGIN, 365.0));
            out.push(factory::subheading("Recommendations", PAGE_MARGIN, 450.0));
            out.push(factory::data_field("report.recommendations", PAGE_MARGIN, 485.0));
            out.push(factory::body_text("Technician signature", PAGE_MARGIN, 700.0));
            out.push(factory::data_field("report.signature", PAGE_MARGIN, 720.0));
            footer(&mut out, "Report generated on site.");
        }
    }

    SceneGraph::from_objects(out)
}

/// A new, unsaved template for `doc_type` holding its starter scene.
pub fn starter_template(doc_type: DocumentType) -> Template {
    Template::starter(doc_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::is_known_field;
    use crate::lint::lint_template;
    use crate::model::ObjectKind;
    use crate::serialize::collect_tokens;

    #[test]
    fn starters_only_use_catalog_fields() {
        for t in DocumentType::ALL {
            let scene = starter_scene(t);
            for token in collect_tokens(&scene) {
                assert!(is_known_field(t, &token), "{t}: {token} not in catalog");
            }
        }
    }

    #[test]
    fn starters_are_lint_clean() {
        for t in DocumentType::ALL {
            let diagnostics = lint_template(&starter_scene(t), t);
            assert!(diagnostics.is_empty(), "{t}: {diagnostics:?}");
        }
    }

    #[test]
    fn priced_documents_get_a_table() {
        for t in DocumentType::ALL {
            let has_table = starter_scene(t)
                .iter()
                .any(|o| matches!(o.kind, ObjectKind::Table { .. }));
            assert_eq!(has_table, t.has_line_items(), "{t}");
        }
    }
}
