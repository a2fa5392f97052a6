//! Object factories: the toolbox's constructors for text, shapes, data-field
//! placeholders and the composite line-items table.
//!
//! Factories only build values. Adding them to a scene (and recording
//! history) is the caller's job.

use crate::catalog::LINE_ITEM_COLUMNS;
use crate::model::*;
use kurbo::Rect;

/// Default toolbox drop position.
pub const DEFAULT_ORIGIN: (f64, f64) = (50.0, 50.0);

/// Page margin used by full-width composites.
pub const PAGE_MARGIN: f64 = 40.0;

/// Default number of placeholder rows in a line-items table.
pub const DEFAULT_TABLE_ROWS: usize = 5;

const TABLE_HEADER_HEIGHT: f64 = 28.0;
const TABLE_ROW_HEIGHT: f64 = 24.0;
const TABLE_CELL_PAD: f64 = 6.0;
const TABLE_COLUMN_FRACTIONS: [f64; 4] = [0.46, 0.14, 0.2, 0.2];
const TABLE_RULE: Color = Color::rgb(0xD1, 0xD5, 0xDB);

const DATA_FIELD_INK: Color = Color::rgb(0x1D, 0x4E, 0xD8);
const DATA_FIELD_WASH: Color = Color::rgb(0xEF, 0xF6, 0xFF);
const DATA_FIELD_BORDER: Color = Color::rgb(0x93, 0xC5, 0xFD);

// ─── Text ────────────────────────────────────────────────────────────────

/// The three editable-text presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextVariant {
    Heading,
    Subheading,
    Body,
}

impl TextVariant {
    pub fn font_size(&self) -> f64 {
        match self {
            TextVariant::Heading => 32.0,
            TextVariant::Subheading => 24.0,
            TextVariant::Body => 14.0,
        }
    }

    pub fn font_weight(&self) -> FontWeight {
        match self {
            TextVariant::Heading => FontWeight::BOLD,
            TextVariant::Subheading => FontWeight::SEMIBOLD,
            TextVariant::Body => FontWeight::NORMAL,
        }
    }

    fn kind(&self, text: String) -> ObjectKind {
        match self {
            TextVariant::Heading => ObjectKind::Heading { text },
            TextVariant::Subheading => ObjectKind::Subheading { text },
            TextVariant::Body => ObjectKind::BodyText { text },
        }
    }
}

/// Rough width of a single-line run, enough to size a fresh text box.
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    (longest as f64 * font_size * 0.6).max(font_size * 2.0)
}

/// Height of a text box holding `text` at `font_size`.
pub fn text_height(text: &str, font_size: f64) -> f64 {
    let lines = text.lines().count().max(1);
    lines as f64 * font_size * LINE_HEIGHT
}

/// Generic editable-text constructor behind the heading/subheading/body presets.
pub fn text_object(variant: TextVariant, text: &str, left: f64, top: f64) -> CanvasObject {
    let font_size = variant.font_size();
    let style = Style {
        font_size,
        font_weight: variant.font_weight(),
        ..Style::default()
    };
    let geometry = Geometry::at(
        left,
        top,
        estimate_text_width(text, font_size),
        text_height(text, font_size),
    );
    CanvasObject::new(variant.kind(text.to_string()), geometry, style)
}

pub fn heading(text: &str, left: f64, top: f64) -> CanvasObject {
    text_object(TextVariant::Heading, text, left, top)
}

pub fn subheading(text: &str, left: f64, top: f64) -> CanvasObject {
    text_object(TextVariant::Subheading, text, left, top)
}

pub fn body_text(text: &str, left: f64, top: f64) -> CanvasObject {
    text_object(TextVariant::Body, text, left, top)
}

// ─── Shapes ──────────────────────────────────────────────────────────────

fn shape_style() -> Style {
    Style {
        fill: Some(Color::rgb(0xE5, 0xE7, 0xEB)),
        stroke: Some(Color::rgb(0x9C, 0xA3, 0xAF)),
        stroke_width: 1.0,
        ..Style::default()
    }
}

pub fn rectangle(left: f64, top: f64) -> CanvasObject {
    CanvasObject::new(
        ObjectKind::Rectangle,
        Geometry::at(left, top, 120.0, 80.0),
        shape_style(),
    )
}

/// A circle; its radius is half the box width.
pub fn circle(left: f64, top: f64) -> CanvasObject {
    CanvasObject::new(
        ObjectKind::Circle,
        Geometry::at(left, top, 80.0, 80.0),
        shape_style(),
    )
}

/// A horizontal rule from the origin to `(width, height)` in local space.
pub fn line(left: f64, top: f64) -> CanvasObject {
    line_between(left, top, 150.0, 0.0, Color::BLACK, 2.0)
}

fn line_between(left: f64, top: f64, dx: f64, dy: f64, color: Color, width: f64) -> CanvasObject {
    let style = Style {
        fill: None,
        stroke: Some(color),
        stroke_width: width,
        ..Style::default()
    };
    CanvasObject::new(ObjectKind::Line, Geometry::at(left, top, dx, dy), style)
}

// ─── Data fields ─────────────────────────────────────────────────────────

/// Non-editable placeholder whose text is `{{field_path}}`, drawn with a
/// dashed border and a muted wash so it reads as a live-data slot.
pub fn data_field(field_path: &str, left: f64, top: f64) -> CanvasObject {
    data_field_sized(field_path, left, top, 14.0)
}

fn data_field_sized(field_path: &str, left: f64, top: f64, font_size: f64) -> CanvasObject {
    let text = field_token(field_path);
    let style = Style {
        fill: Some(DATA_FIELD_INK),
        stroke: Some(DATA_FIELD_BORDER),
        stroke_width: 1.0,
        stroke_dash_array: Some(vec![4.0, 2.0]),
        background_color: Some(DATA_FIELD_WASH),
        font_size,
        ..Style::default()
    };
    let geometry = Geometry::at(
        left,
        top,
        estimate_text_width(&text, font_size),
        text_height(&text, font_size),
    );
    let kind = ObjectKind::DataField {
        field_name: field_path.to_string(),
        text,
    };
    CanvasObject::new(kind, geometry, style)
}

// ─── Composites ──────────────────────────────────────────────────────────

/// Build the line-items table as one composite object: background, header
/// band with column labels, column/row rules and `rows` placeholder rows whose
/// cells hold `{{line_items[i].<column>}}` tokens.
pub fn line_items_table(rows: usize, left: f64, top: f64) -> CanvasObject {
    let width = PAGE_WIDTH - 2.0 * PAGE_MARGIN;
    let height = TABLE_HEADER_HEIGHT + rows as f64 * TABLE_ROW_HEIGHT;

    let mut column_x = [0.0; 4];
    let mut column_w = [0.0; 4];
    let mut x = 0.0;
    for (i, fraction) in TABLE_COLUMN_FRACTIONS.iter().enumerate() {
        column_x[i] = x;
        column_w[i] = width * fraction;
        x += column_w[i];
    }

    let mut children = Vec::new();

    let background = Style {
        fill: Some(Color::WHITE),
        stroke: Some(TABLE_RULE),
        ..Style::default()
    };
    children.push(CanvasObject::new(
        ObjectKind::Rectangle,
        Geometry::at(0.0, 0.0, width, height),
        background,
    ));

    let band = Style {
        fill: Some(Color::rgb(0xF3, 0xF4, 0xF6)),
        stroke: None,
        ..Style::default()
    };
    children.push(CanvasObject::new(
        ObjectKind::Rectangle,
        Geometry::at(0.0, 0.0, width, TABLE_HEADER_HEIGHT),
        band,
    ));

    for (i, (label, _)) in LINE_ITEM_COLUMNS.iter().enumerate() {
        let font_size = 11.0;
        let mut header = body_text(
            label,
            column_x[i] + TABLE_CELL_PAD,
            (TABLE_HEADER_HEIGHT - text_height(label, font_size)) / 2.0,
        );
        header.style.font_size = font_size;
        header.style.font_weight = FontWeight::BOLD;
        header.geometry.width = column_w[i] - 2.0 * TABLE_CELL_PAD;
        header.geometry.height = text_height(label, font_size);
        children.push(header);
    }

    for x in column_x.iter().skip(1) {
        children.push(line_between(*x, 0.0, 0.0, height, TABLE_RULE, 1.0));
    }
    for row in 0..rows {
        let y = TABLE_HEADER_HEIGHT + row as f64 * TABLE_ROW_HEIGHT;
        children.push(line_between(0.0, y, width, 0.0, TABLE_RULE, 1.0));
    }

    for row in 0..rows {
        let row_top = TABLE_HEADER_HEIGHT + row as f64 * TABLE_ROW_HEIGHT;
        for (i, (_, column)) in LINE_ITEM_COLUMNS.iter().enumerate() {
            let font_size = 10.0;
            let path = format!("line_items[{row}].{column}");
            let cell_height = text_height(&path, font_size);
            let mut cell = data_field_sized(
                &path,
                column_x[i] + TABLE_CELL_PAD,
                row_top + (TABLE_ROW_HEIGHT - cell_height) / 2.0,
                font_size,
            );
            cell.geometry.width = column_w[i] - 2.0 * TABLE_CELL_PAD;
            if i > 0 {
                cell.style.text_align = TextAlign::Right;
            }
            children.push(cell);
        }
    }

    let style = Style {
        fill: None,
        stroke: None,
        ..Style::default()
    };
    CanvasObject::new(
        ObjectKind::Table {
            rows,
            objects: children,
        },
        Geometry::at(left, top, width, height),
        style,
    )
}

/// Merge objects into one group whose origin is the union of their extents.
/// Children are rebased to group-relative coordinates. `None` when empty.
pub fn group(objects: Vec<CanvasObject>) -> Option<CanvasObject> {
    let bounds: Rect = objects
        .iter()
        .map(|o| o.geometry.extent())
        .reduce(|a, b| a.union(b))?;
    let children = objects
        .into_iter()
        .map(|mut o| {
            o.translate(-bounds.x0, -bounds.y0);
            o
        })
        .collect();
    let style = Style {
        fill: None,
        ..Style::default()
    };
    Some(CanvasObject::new(
        ObjectKind::Group { objects: children },
        Geometry::at(bounds.x0, bounds.y0, bounds.width(), bounds.height()),
        style,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_presets_differ_in_size_and_weight() {
        let h = heading("Heading", 10.0, 10.0);
        let s = subheading("Sub", 10.0, 10.0);
        let b = body_text("Body", 10.0, 10.0);

        assert_eq!(h.style.font_size, 32.0);
        assert_eq!(s.style.font_size, 24.0);
        assert_eq!(b.style.font_size, 14.0);
        assert!(h.style.font_weight.is_bold());
        assert!(!b.style.font_weight.is_bold());
        for obj in [&h, &s, &b] {
            assert!(obj.editable);
            assert!(!obj.locked);
        }
        assert_eq!(h.text(), Some("Heading"));
        assert_eq!(h.kind.tag(), "heading");
    }

    #[test]
    fn shapes_are_not_editable() {
        for obj in [rectangle(0.0, 0.0), circle(0.0, 0.0), line(0.0, 0.0)] {
            assert!(!obj.editable);
            assert!(obj.geometry.width > 0.0);
        }
        assert_eq!(line(0.0, 0.0).geometry.height, 0.0);
        assert_eq!(line(0.0, 0.0).style.fill, None);
    }

    #[test]
    fn data_field_token_and_style() {
        let f = data_field("customer.name", 40.0, 100.0);
        assert_eq!(f.field_name(), Some("customer.name"));
        assert_eq!(f.text(), Some("{{customer.name}}"));
        assert!(!f.editable);
        assert!(f.style.stroke_dash_array.is_some());
        assert!(f.style.background_color.is_some());
    }

    #[test]
    fn table_has_tokens_for_every_row() {
        let table = line_items_table(3, PAGE_MARGIN, 300.0);
        let ObjectKind::Table { rows, objects } = &table.kind else {
            panic!("expected table");
        };
        assert_eq!(*rows, 3);

        let tokens: Vec<&str> = objects.iter().filter_map(|o| o.field_name()).collect();
        assert_eq!(tokens.len(), 12);
        for row in 0..3 {
            for column in ["description", "quantity", "unit_price", "line_total"] {
                let path = format!("line_items[{row}].{column}");
                assert!(tokens.contains(&path.as_str()), "missing {path}");
            }
        }

        let headers: Vec<&str> = objects
            .iter()
            .filter(|o| matches!(o.kind, ObjectKind::BodyText { .. }))
            .filter_map(|o| o.text())
            .collect();
        assert_eq!(headers, vec!["Description", "Qty", "Unit Price", "Total"]);
        assert!((table.geometry.width - 515.0).abs() < 1e-9);
        assert_eq!(table.geometry.height, 28.0 + 3.0 * 24.0);
    }

    #[test]
    fn group_rebases_children() {
        let a = rectangle(100.0, 100.0);
        let b = rectangle(300.0, 50.0);
        let g = group(vec![a, b]).unwrap();
        assert_eq!(g.geometry.left, 100.0);
        assert_eq!(g.geometry.top, 50.0);
        let children = g.kind.children();
        assert_eq!(children[0].geometry.left, 0.0);
        assert_eq!(children[0].geometry.top, 50.0);
        assert_eq!(children[1].geometry.left, 200.0);
        assert!(group(Vec::new()).is_none());
    }
}
