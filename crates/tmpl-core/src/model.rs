//! Core object model for document templates.
//!
//! A template is a flat, ordered list of `CanvasObject` values (list order is
//! z-order). Each object carries geometry, style, lock/edit flags and a
//! kind-specific payload. Groups and line-item tables nest children whose
//! coordinates are relative to the container's origin.

use crate::error::TemplateError;
use crate::id::ObjectId;
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Page width in canvas units. One page size for every template.
pub const PAGE_WIDTH: f64 = 595.0;
/// Page height in canvas units.
pub const PAGE_HEIGHT: f64 = 842.0;

/// Line height multiplier used to size text boxes from their font size.
pub const LINE_HEIGHT: f64 = 1.16;

/// The page rectangle, used as the alignment reference for single objects.
pub fn page_rect() -> Rect {
    Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT)
}

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 | 4 => {
                let mut ch = [255u8; 4];
                for (i, b) in bytes.iter().enumerate() {
                    ch[i] = hex_val(*b)? * 17;
                }
                Some(Self::rgba(ch[0], ch[1], ch[2], ch[3]))
            }
            6 | 8 => {
                let mut ch = [255u8; 4];
                for (i, pair) in bytes.chunks(2).enumerate() {
                    ch[i] = hex_val(pair[0])? << 4 | hex_val(pair[1])?;
                }
                Some(Self::rgba(ch[0], ch[1], ch[2], ch[3]))
            }
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("bad color `{s}`")))
    }
}

/// Optional color that tolerates `"transparent"`, `""` and garbage on load.
fn lenient_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Color>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("transparent") {
            return None;
        }
        let parsed = Color::from_hex(trimmed);
        if parsed.is_none() {
            log::warn!("ignoring unparseable color `{s}`");
        }
        parsed
    }))
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Position, size and transform of an object. Angle is in degrees and
/// rotation pivots on the object's origin (top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Geometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Geometry {
    pub fn at(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            ..Self::default()
        }
    }

    /// Rendered width (`width * scaleX`).
    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale_x.abs()
    }

    /// Rendered height (`height * scaleY`).
    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale_y.abs()
    }

    /// Unrotated extent on the page. Alignment works on this box so that
    /// moving an edge never depends on rotation.
    pub fn extent(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + self.scaled_width(),
            self.top + self.scaled_height(),
        )
    }

    /// Object-local → page transform.
    pub fn transform(&self) -> Affine {
        Affine::translate((self.left, self.top))
            * Affine::rotate(self.angle.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Axis-aligned bounding box of the rotated, scaled object.
    pub fn bounding_rect(&self) -> Rect {
        self.transform()
            .transform_rect_bbox(Rect::new(0.0, 0.0, self.width, self.height))
    }

    /// Map a page point into object-local (unscaled) coordinates.
    /// `None` when the transform is degenerate (zero scale).
    pub fn to_local(&self, p: Point) -> Option<Point> {
        let t = self.transform();
        if t.determinant().abs() < f64::EPSILON {
            return None;
        }
        Some(t.inverse() * p)
    }

    /// Whether every field is a finite number and sizes are non-negative.
    pub fn is_valid(&self) -> bool {
        [
            self.left,
            self.top,
            self.width,
            self.height,
            self.angle,
            self.scale_x,
            self.scale_y,
        ]
        .iter()
        .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

// ─── Style ───────────────────────────────────────────────────────────────

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// CSS-style numeric font weight. Loads from a number or `"normal"` / `"bold"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const SEMIBOLD: FontWeight = FontWeight(600);
    pub const BOLD: FontWeight = FontWeight(700);

    pub fn is_bold(&self) -> bool {
        self.0 >= 600
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u16),
            Float(f64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(FontWeight(n)),
            Raw::Float(f) if f.is_finite() && (0.0..=f64::from(u16::MAX)).contains(&f) => {
                Ok(FontWeight(f.round() as u16))
            }
            Raw::Float(f) => Err(serde::de::Error::custom(format!("bad font weight `{f}`"))),
            Raw::Name(name) => match name.as_str() {
                "normal" => Ok(FontWeight::NORMAL),
                "bold" => Ok(FontWeight::BOLD),
                other => other
                    .parse::<u16>()
                    .map(FontWeight)
                    .map_err(|_| serde::de::Error::custom(format!("bad font weight `{other}`"))),
            },
        }
    }
}

/// Visual attributes shared by every object kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Style {
    #[serde(deserialize_with = "lenient_color")]
    pub fill: Option<Color>,
    #[serde(deserialize_with = "lenient_color")]
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dash_array: Option<Vec<f64>>,
    #[serde(deserialize_with = "lenient_color")]
    pub background_color: Option<Color>,
    pub opacity: f64,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub text_align: TextAlign,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Some(Color::BLACK),
            stroke: None,
            stroke_width: 1.0,
            stroke_dash_array: None,
            background_color: None,
            opacity: 1.0,
            font_size: 14.0,
            font_family: "Helvetica".into(),
            font_weight: FontWeight::NORMAL,
            text_align: TextAlign::Left,
        }
    }
}

// ─── Object kinds ────────────────────────────────────────────────────────

/// What an object is, with the payload each kind requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObjectKind {
    Heading {
        #[serde(default)]
        text: String,
    },
    Subheading {
        #[serde(default)]
        text: String,
    },
    BodyText {
        #[serde(default)]
        text: String,
    },
    /// Placeholder bound to a data path; its text is always `{{fieldName}}`.
    #[serde(rename_all = "camelCase")]
    DataField {
        field_name: String,
        #[serde(default)]
        text: String,
    },
    Rectangle,
    Circle,
    Line,
    /// Composite line-items table: background, header band, separators, cells.
    Table {
        #[serde(default)]
        rows: usize,
        #[serde(default, deserialize_with = "lenient_objects")]
        objects: Vec<CanvasObject>,
    },
    Group {
        #[serde(default, deserialize_with = "lenient_objects")]
        objects: Vec<CanvasObject>,
    },
}

impl ObjectKind {
    /// The `type` tag as it appears in JSON.
    pub fn tag(&self) -> &'static str {
        match self {
            ObjectKind::Heading { .. } => "heading",
            ObjectKind::Subheading { .. } => "subheading",
            ObjectKind::BodyText { .. } => "bodyText",
            ObjectKind::DataField { .. } => "dataField",
            ObjectKind::Rectangle => "rectangle",
            ObjectKind::Circle => "circle",
            ObjectKind::Line => "line",
            ObjectKind::Table { .. } => "table",
            ObjectKind::Group { .. } => "group",
        }
    }

    /// Literal text content for text-bearing kinds.
    pub fn text(&self) -> Option<&str> {
        match self {
            ObjectKind::Heading { text }
            | ObjectKind::Subheading { text }
            | ObjectKind::BodyText { text }
            | ObjectKind::DataField { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Whether this is free text the author can type into.
    pub fn is_editable_text(&self) -> bool {
        matches!(
            self,
            ObjectKind::Heading { .. } | ObjectKind::Subheading { .. } | ObjectKind::BodyText { .. }
        )
    }

    pub fn children(&self) -> &[CanvasObject] {
        match self {
            ObjectKind::Table { objects, .. } | ObjectKind::Group { objects } => objects,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<CanvasObject>> {
        match self {
            ObjectKind::Table { objects, .. } | ObjectKind::Group { objects } => Some(objects),
            _ => None,
        }
    }
}

/// Build the placeholder token for a data path: `customer.name` → `{{customer.name}}`.
pub fn field_token(field_path: &str) -> String {
    format!("{{{{{field_path}}}}}")
}

/// Decode container children one by one; undecodable children are dropped.
fn lenient_objects<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<CanvasObject>, D::Error> {
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let mut out = Vec::with_capacity(raw.len());
    for (i, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<CanvasObject>(value) {
            Ok(child) => out.push(child),
            Err(e) => log::warn!("skipping child object {i}: {e}"),
        }
    }
    Ok(out)
}

// ─── Canvas objects ──────────────────────────────────────────────────────

fn fresh_object_id() -> ObjectId {
    ObjectId::fresh("object")
}

/// A single object on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ObjectRecord")]
pub struct CanvasObject {
    #[serde(default = "fresh_object_id")]
    pub id: ObjectId,

    #[serde(flatten)]
    pub kind: ObjectKind,

    #[serde(flatten)]
    pub geometry: Geometry,

    #[serde(flatten)]
    pub style: Style,

    /// Locked objects ignore pointer transforms, nudges and deletes.
    #[serde(default)]
    pub locked: bool,

    /// Whether the author can type into this object on the canvas.
    pub editable: bool,
}

/// Wire form of a [`CanvasObject`]. A missing `editable` key falls back to
/// what the kind allows.
#[derive(Deserialize)]
struct ObjectRecord {
    #[serde(default = "fresh_object_id")]
    id: ObjectId,
    #[serde(flatten)]
    kind: ObjectKind,
    #[serde(flatten)]
    geometry: Geometry,
    #[serde(flatten)]
    style: Style,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    editable: Option<bool>,
}

impl From<ObjectRecord> for CanvasObject {
    fn from(r: ObjectRecord) -> Self {
        let editable = r.editable.unwrap_or_else(|| r.kind.is_editable_text());
        Self {
            id: r.id,
            kind: r.kind,
            geometry: r.geometry,
            style: r.style,
            locked: r.locked,
            editable,
        }
    }
}

impl CanvasObject {
    /// Create an object with a fresh id prefixed by the kind tag.
    pub fn new(kind: ObjectKind, geometry: Geometry, style: Style) -> Self {
        let editable = kind.is_editable_text();
        Self {
            id: ObjectId::fresh(kind.tag()),
            kind,
            geometry,
            style,
            locked: false,
            editable,
        }
    }

    /// Locked objects are excluded from pointer selection.
    pub fn selectable(&self) -> bool {
        !self.locked
    }

    pub fn text(&self) -> Option<&str> {
        self.kind.text()
    }

    /// Bound data path, if this is a data field.
    pub fn field_name(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::DataField { field_name, .. } => Some(field_name),
            _ => None,
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.geometry.left += dx;
        self.geometry.top += dy;
    }

    /// Visit this object and every nested child, depth-first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a CanvasObject)) {
        f(self);
        for child in self.kind.children() {
            child.walk(f);
        }
    }

    /// Give this object and all descendants fresh ids, keeping everything else.
    pub fn reissue_ids(&mut self) {
        self.id = ObjectId::fresh(self.kind.tag());
        if let Some(children) = self.kind.children_mut() {
            for child in children {
                child.reissue_ids();
            }
        }
    }

    /// Re-derive the token text of data fields (including nested cells).
    pub fn normalize_tokens(&mut self) {
        if let ObjectKind::DataField { field_name, text } = &mut self.kind {
            let token = field_token(field_name);
            if *text != token {
                *text = token;
            }
        }
        if let Some(children) = self.kind.children_mut() {
            for child in children {
                child.normalize_tokens();
            }
        }
    }
}

// ─── Document types ──────────────────────────────────────────────────────

/// The business-document category a template targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Quote,
    Invoice,
    PurchaseOrder,
    FieldReport,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Quote,
        DocumentType::Invoice,
        DocumentType::PurchaseOrder,
        DocumentType::FieldReport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Quote => "quote",
            DocumentType::Invoice => "invoice",
            DocumentType::PurchaseOrder => "purchase_order",
            DocumentType::FieldReport => "field_report",
        }
    }

    /// Human-readable title used by starter templates.
    pub fn title(&self) -> &'static str {
        match self {
            DocumentType::Quote => "Quote",
            DocumentType::Invoice => "Invoice",
            DocumentType::PurchaseOrder => "Purchase Order",
            DocumentType::FieldReport => "Field Report",
        }
    }

    /// Whether documents of this type carry priced line items.
    pub fn has_line_items(&self) -> bool {
        !matches!(self, DocumentType::FieldReport)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TemplateError::UnknownDocumentType(s.to_string()))
    }
}
