//! Static catalog of bindable data fields per document type.
//!
//! The catalog is a compile-time table. It is never derived from business
//! data: the downstream renderer is the only party that resolves the paths.

use crate::model::DocumentType;

/// Which document types a field is offered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    /// Offered for every document type.
    Common,
    /// Offered for the listed types only.
    Only(&'static [DocumentType]),
}

impl FieldScope {
    pub fn includes(&self, doc_type: DocumentType) -> bool {
        match self {
            FieldScope::Common => true,
            FieldScope::Only(types) => types.contains(&doc_type),
        }
    }
}

/// One bindable field: `{{field_path}}` in a template resolves to real data at export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFieldDescriptor {
    pub field_path: &'static str,
    pub label: &'static str,
    pub scope: FieldScope,
}

/// Columns of the line-items table, in display order: (header, token suffix).
pub const LINE_ITEM_COLUMNS: [(&str, &str); 4] = [
    ("Description", "description"),
    ("Qty", "quantity"),
    ("Unit Price", "unit_price"),
    ("Total", "line_total"),
];

const SALES: &[DocumentType] = &[DocumentType::Quote, DocumentType::Invoice];
const CUSTOMER_FACING: &[DocumentType] = &[
    DocumentType::Quote,
    DocumentType::Invoice,
    DocumentType::FieldReport,
];
const QUOTE: &[DocumentType] = &[DocumentType::Quote];
const INVOICE: &[DocumentType] = &[DocumentType::Invoice];
const PURCHASE_ORDER: &[DocumentType] = &[DocumentType::PurchaseOrder];
const FIELD_REPORT: &[DocumentType] = &[DocumentType::FieldReport];

macro_rules! field {
    ($path:literal, $label:literal, $scope:expr) => {
        DataFieldDescriptor {
            field_path: $path,
            label: $label,
            scope: $scope,
        }
    };
}

static CATALOG: &[DataFieldDescriptor] = &[
    // Company & document header
    field!("company.name", "Company Name", FieldScope::Common),
    field!("company.address", "Company Address", FieldScope::Common),
    field!("company.phone", "Company Phone", FieldScope::Common),
    field!("company.email", "Company Email", FieldScope::Common),
    field!("document.number", "Document Number", FieldScope::Common),
    field!("document.date", "Document Date", FieldScope::Common),
    // Customer
    field!("customer.name", "Customer Name", FieldScope::Only(CUSTOMER_FACING)),
    field!("customer.address", "Customer Address", FieldScope::Only(CUSTOMER_FACING)),
    field!("customer.email", "Customer Email", FieldScope::Only(SALES)),
    field!("customer.phone", "Customer Phone", FieldScope::Only(SALES)),
    // Quote
    field!("quote.valid_until", "Valid Until", FieldScope::Only(QUOTE)),
    field!("quote.subtotal", "Subtotal", FieldScope::Only(QUOTE)),
    field!("quote.tax", "Tax", FieldScope::Only(QUOTE)),
    field!("quote.total", "Total", FieldScope::Only(QUOTE)),
    field!("quote.notes", "Notes", FieldScope::Only(QUOTE)),
    // Invoice
    field!("invoice.due_date", "Due Date", FieldScope::Only(INVOICE)),
    field!("invoice.subtotal", "Subtotal", FieldScope::Only(INVOICE)),
    field!("invoice.tax", "Tax", FieldScope::Only(INVOICE)),
    field!("invoice.total", "Total", FieldScope::Only(INVOICE)),
    field!("invoice.amount_paid", "Amount Paid", FieldScope::Only(INVOICE)),
    field!("invoice.balance_due", "Balance Due", FieldScope::Only(INVOICE)),
    field!("invoice.payment_terms", "Payment Terms", FieldScope::Only(INVOICE)),
    // Purchase order
    field!("supplier.name", "Supplier Name", FieldScope::Only(PURCHASE_ORDER)),
    field!("supplier.address", "Supplier Address", FieldScope::Only(PURCHASE_ORDER)),
    field!("supplier.email", "Supplier Email", FieldScope::Only(PURCHASE_ORDER)),
    field!("supplier.phone", "Supplier Phone", FieldScope::Only(PURCHASE_ORDER)),
    field!("purchase_order.delivery_date", "Delivery Date", FieldScope::Only(PURCHASE_ORDER)),
    field!("purchase_order.delivery_address", "Delivery Address", FieldScope::Only(PURCHASE_ORDER)),
    field!("purchase_order.subtotal", "Subtotal", FieldScope::Only(PURCHASE_ORDER)),
    field!("purchase_order.tax", "Tax", FieldScope::Only(PURCHASE_ORDER)),
    field!("purchase_order.total", "Total", FieldScope::Only(PURCHASE_ORDER)),
    // Field report
    field!("site.name", "Site Name", FieldScope::Only(FIELD_REPORT)),
    field!("site.address", "Site Address", FieldScope::Only(FIELD_REPORT)),
    field!("technician.name", "Technician", FieldScope::Only(FIELD_REPORT)),
    field!("report.visit_date", "Visit Date", FieldScope::Only(FIELD_REPORT)),
    field!("report.findings", "Findings", FieldScope::Only(FIELD_REPORT)),
    field!("report.recommendations", "Recommendations", FieldScope::Only(FIELD_REPORT)),
    field!("report.signature", "Signature", FieldScope::Only(FIELD_REPORT)),
];

/// Every field offered for `doc_type`, common fields first, in catalog order.
pub fn data_fields_for(doc_type: DocumentType) -> Vec<&'static DataFieldDescriptor> {
    CATALOG.iter().filter(|d| d.scope.includes(doc_type)).collect()
}

/// Look up a descriptor by exact path for `doc_type`.
pub fn find_field(doc_type: DocumentType, path: &str) -> Option<&'static DataFieldDescriptor> {
    CATALOG
        .iter()
        .find(|d| d.field_path == path && d.scope.includes(doc_type))
}

/// Whether `path` is bindable for `doc_type`: a catalog entry, or an indexed
/// line-item column (`line_items[3].unit_price`) on types that carry line items.
pub fn is_known_field(doc_type: DocumentType, path: &str) -> bool {
    find_field(doc_type, path).is_some()
        || (doc_type.has_line_items() && parse_line_item_path(path).is_some())
}

/// Split `line_items[<i>].<column>` into its row index and column suffix.
pub fn parse_line_item_path(path: &str) -> Option<(usize, &str)> {
    let rest = path.strip_prefix("line_items[")?;
    let (index, rest) = rest.split_once(']')?;
    let column = rest.strip_prefix('.')?;
    let index = index.parse::<usize>().ok()?;
    LINE_ITEM_COLUMNS
        .iter()
        .any(|(_, suffix)| *suffix == column)
        .then_some((index, column))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(doc_type: DocumentType) -> Vec<&'static str> {
        data_fields_for(doc_type).iter().map(|d| d.field_path).collect()
    }

    #[test]
    fn common_fields_everywhere() {
        for t in DocumentType::ALL {
            let p = paths(t);
            for common in [
                "company.name",
                "company.address",
                "company.phone",
                "company.email",
                "document.number",
                "document.date",
            ] {
                assert!(p.contains(&common), "{t} missing {common}");
            }
        }
    }

    #[test]
    fn type_specific_fields() {
        let quote = paths(DocumentType::Quote);
        assert!(quote.contains(&"quote.valid_until"));
        assert!(quote.contains(&"quote.total"));
        assert!(!quote.contains(&"invoice.due_date"));

        let invoice = paths(DocumentType::Invoice);
        assert!(invoice.contains(&"invoice.due_date"));
        assert!(invoice.contains(&"invoice.total"));

        let po = paths(DocumentType::PurchaseOrder);
        assert!(po.contains(&"supplier.name"));
        assert!(po.contains(&"purchase_order.delivery_date"));
        assert!(!po.contains(&"customer.name"));

        let report = paths(DocumentType::FieldReport);
        assert!(report.contains(&"site.name"));
        assert!(report.contains(&"technician.name"));
        assert!(report.contains(&"report.findings"));
    }

    #[test]
    fn common_fields_come_first() {
        let fields = data_fields_for(DocumentType::Invoice);
        assert_eq!(fields[0].field_path, "company.name");
        assert_eq!(fields[5].field_path, "document.date");
    }

    #[test]
    fn line_item_paths() {
        assert_eq!(
            parse_line_item_path("line_items[3].unit_price"),
            Some((3, "unit_price"))
        );
        assert_eq!(parse_line_item_path("line_items[x].unit_price"), None);
        assert_eq!(parse_line_item_path("line_items[0].colour"), None);
        assert!(is_known_field(DocumentType::Quote, "line_items[0].description"));
        assert!(!is_known_field(DocumentType::FieldReport, "line_items[0].description"));
        assert!(!is_known_field(DocumentType::Quote, "supplier.name"));
    }
}
