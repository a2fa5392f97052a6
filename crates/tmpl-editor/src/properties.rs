//! Properties panel binding.
//!
//! `PropertySheet` is a flat read-out of the active object for the panel;
//! `PropertyEdit` is one field change coming back from it. Edits are
//! validated before anything is written, so a rejected value leaves the
//! object exactly as it was.

use crate::error::EditorError;
use crate::selection::normalize_angle;
use tmpl_core::id::ObjectId;
use tmpl_core::model::{CanvasObject, Color, FontWeight, ObjectKind, TextAlign, field_token};

/// Snapshot of an object's panel-visible properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySheet {
    pub id: ObjectId,
    pub kind: &'static str,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub opacity: f64,
    pub locked: bool,
    /// Present for text-bearing kinds only.
    pub text: Option<TextProperties>,
    /// Present for data fields only.
    pub field_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextProperties {
    pub content: String,
    pub editable: bool,
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub text_align: TextAlign,
}

impl PropertySheet {
    pub fn from_object(obj: &CanvasObject) -> Self {
        let g = &obj.geometry;
        let s = &obj.style;
        Self {
            id: obj.id,
            kind: obj.kind.tag(),
            left: g.left,
            top: g.top,
            width: g.width,
            height: g.height,
            angle: g.angle,
            scale_x: g.scale_x,
            scale_y: g.scale_y,
            fill: s.fill.map(|c| c.to_hex()),
            stroke: s.stroke.map(|c| c.to_hex()),
            stroke_width: s.stroke_width,
            opacity: s.opacity,
            locked: obj.locked,
            text: obj.text().map(|content| TextProperties {
                content: content.to_string(),
                editable: obj.editable,
                font_size: s.font_size,
                font_family: s.font_family.clone(),
                font_weight: s.font_weight,
                text_align: s.text_align,
            }),
            field_name: obj.field_name().map(str::to_string),
        }
    }
}

/// One property change from the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEdit {
    Left(f64),
    Top(f64),
    Width(f64),
    Height(f64),
    /// Degrees; wrapped into `[0, 360)`.
    Angle(f64),
    ScaleX(f64),
    ScaleY(f64),
    Fill(Option<Color>),
    Stroke(Option<Color>),
    StrokeWidth(f64),
    /// Clamped into `[0, 1]`.
    Opacity(f64),
    FontSize(f64),
    FontFamily(String),
    FontWeight(FontWeight),
    TextAlign(TextAlign),
    Text(String),
    /// Rebinds a data field; its token text follows.
    FieldName(String),
    Locked(bool),
}

impl PropertyEdit {
    pub fn name(&self) -> &'static str {
        match self {
            PropertyEdit::Left(_) => "left",
            PropertyEdit::Top(_) => "top",
            PropertyEdit::Width(_) => "width",
            PropertyEdit::Height(_) => "height",
            PropertyEdit::Angle(_) => "angle",
            PropertyEdit::ScaleX(_) => "scaleX",
            PropertyEdit::ScaleY(_) => "scaleY",
            PropertyEdit::Fill(_) => "fill",
            PropertyEdit::Stroke(_) => "stroke",
            PropertyEdit::StrokeWidth(_) => "strokeWidth",
            PropertyEdit::Opacity(_) => "opacity",
            PropertyEdit::FontSize(_) => "fontSize",
            PropertyEdit::FontFamily(_) => "fontFamily",
            PropertyEdit::FontWeight(_) => "fontWeight",
            PropertyEdit::TextAlign(_) => "textAlign",
            PropertyEdit::Text(_) => "text",
            PropertyEdit::FieldName(_) => "fieldName",
            PropertyEdit::Locked(_) => "locked",
        }
    }

    /// Whether this edit moves or resizes the object.
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            PropertyEdit::Left(_)
                | PropertyEdit::Top(_)
                | PropertyEdit::Width(_)
                | PropertyEdit::Height(_)
                | PropertyEdit::Angle(_)
                | PropertyEdit::ScaleX(_)
                | PropertyEdit::ScaleY(_)
        )
    }
}

fn rejected(edit: &PropertyEdit, reason: impl Into<String>) -> EditorError {
    let err = EditorError::Rejected {
        property: edit.name(),
        reason: reason.into(),
    };
    log::warn!("{err}");
    err
}

fn finite(edit: &PropertyEdit, v: f64) -> Result<f64, EditorError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(rejected(edit, format!("{v} is not a finite number")))
    }
}

fn non_negative(edit: &PropertyEdit, v: f64) -> Result<f64, EditorError> {
    let v = finite(edit, v)?;
    if v < 0.0 {
        return Err(rejected(edit, format!("{v} is negative")));
    }
    Ok(v)
}

fn positive(edit: &PropertyEdit, v: f64) -> Result<f64, EditorError> {
    let v = finite(edit, v)?;
    if v <= 0.0 {
        return Err(rejected(edit, format!("{v} must be greater than zero")));
    }
    Ok(v)
}

/// Write `value` into `slot`, reporting whether it changed.
fn set<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Apply one panel edit. Returns whether the object changed.
///
/// Geometry edits on a locked object are refused; style edits and unlocking
/// are not.
pub fn apply_edit(obj: &mut CanvasObject, edit: PropertyEdit) -> Result<bool, EditorError> {
    if obj.locked && edit.is_geometry() {
        return Err(EditorError::Locked(obj.id));
    }

    let g = &mut obj.geometry;
    let s = &mut obj.style;
    let changed = match &edit {
        PropertyEdit::Left(v) => set(&mut g.left, finite(&edit, *v)?),
        PropertyEdit::Top(v) => set(&mut g.top, finite(&edit, *v)?),
        PropertyEdit::Width(v) => set(&mut g.width, non_negative(&edit, *v)?),
        PropertyEdit::Height(v) => set(&mut g.height, non_negative(&edit, *v)?),
        PropertyEdit::Angle(v) => set(&mut g.angle, normalize_angle(finite(&edit, *v)?)),
        PropertyEdit::ScaleX(v) => set(&mut g.scale_x, positive(&edit, *v)?),
        PropertyEdit::ScaleY(v) => set(&mut g.scale_y, positive(&edit, *v)?),
        PropertyEdit::Fill(c) => set(&mut s.fill, *c),
        PropertyEdit::Stroke(c) => set(&mut s.stroke, *c),
        PropertyEdit::StrokeWidth(v) => set(&mut s.stroke_width, non_negative(&edit, *v)?),
        PropertyEdit::Opacity(v) => {
            let v = finite(&edit, *v)?;
            let clamped = v.clamp(0.0, 1.0);
            if clamped != v {
                log::warn!("opacity {v} clamped to {clamped}");
            }
            set(&mut s.opacity, clamped)
        }
        PropertyEdit::FontSize(v) => set(&mut s.font_size, positive(&edit, *v)?),
        PropertyEdit::FontFamily(family) => {
            let family = family.trim();
            if family.is_empty() {
                return Err(rejected(&edit, "font family is empty"));
            }
            set(&mut s.font_family, family.to_string())
        }
        PropertyEdit::FontWeight(w) => {
            if !(1..=1000).contains(&w.0) {
                return Err(rejected(&edit, format!("{} is outside 1..=1000", w.0)));
            }
            set(&mut s.font_weight, *w)
        }
        PropertyEdit::TextAlign(a) => set(&mut s.text_align, *a),
        PropertyEdit::Text(new_text) => match &mut obj.kind {
            ObjectKind::Heading { text } | ObjectKind::Subheading { text } | ObjectKind::BodyText { text } => {
                set(text, new_text.clone())
            }
            _ => return Err(rejected(&edit, format!("`{}` has no editable text", obj.id))),
        },
        PropertyEdit::FieldName(path) => {
            let path = path.trim();
            if path.is_empty() {
                return Err(rejected(&edit, "field name is empty"));
            }
            match &mut obj.kind {
                ObjectKind::DataField { field_name, text } => {
                    let renamed = set(field_name, path.to_string());
                    let retokened = set(text, field_token(path));
                    renamed || retokened
                }
                _ => return Err(rejected(&edit, format!("`{}` is not a data field", obj.id))),
            }
        }
        PropertyEdit::Locked(locked) => set(&mut obj.locked, *locked),
    };
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tmpl_core::factory;

    #[test]
    fn sheet_reflects_object() {
        let field = factory::data_field("customer.name", 40.0, 80.0);
        let sheet = PropertySheet::from_object(&field);
        assert_eq!(sheet.kind, "dataField");
        assert_eq!(sheet.field_name.as_deref(), Some("customer.name"));
        let text = sheet.text.unwrap();
        assert_eq!(text.content, "{{customer.name}}");
        assert!(!text.editable);

        let rect = PropertySheet::from_object(&factory::rectangle(0.0, 0.0));
        assert!(rect.text.is_none());
        assert!(rect.field_name.is_none());
    }

    #[test]
    fn invalid_sizes_are_rejected_without_change() {
        let mut rect = factory::rectangle(0.0, 0.0);
        let before = rect.clone();
        assert!(apply_edit(&mut rect, PropertyEdit::Width(-5.0)).is_err());
        assert!(apply_edit(&mut rect, PropertyEdit::Height(f64::NAN)).is_err());
        assert!(apply_edit(&mut rect, PropertyEdit::Left(f64::INFINITY)).is_err());
        assert!(apply_edit(&mut rect, PropertyEdit::ScaleX(0.0)).is_err());
        assert_eq!(rect, before);
    }

    #[test]
    fn opacity_clamps_and_angle_wraps() {
        let mut rect = factory::rectangle(0.0, 0.0);
        assert!(!apply_edit(&mut rect, PropertyEdit::Opacity(1.7)).unwrap());
        assert_eq!(rect.style.opacity, 1.0);
        assert!(apply_edit(&mut rect, PropertyEdit::Opacity(-1.0)).unwrap());
        assert_eq!(rect.style.opacity, 0.0);

        apply_edit(&mut rect, PropertyEdit::Angle(-45.0)).unwrap();
        assert_eq!(rect.geometry.angle, 315.0);
    }

    #[test]
    fn locked_refuses_geometry_but_not_style() {
        let mut rect = factory::rectangle(0.0, 0.0);
        rect.locked = true;
        assert!(matches!(
            apply_edit(&mut rect, PropertyEdit::Left(10.0)),
            Err(EditorError::Locked(_))
        ));
        assert!(apply_edit(&mut rect, PropertyEdit::Fill(Some(Color::WHITE))).unwrap());
        assert!(apply_edit(&mut rect, PropertyEdit::Locked(false)).unwrap());
        assert!(apply_edit(&mut rect, PropertyEdit::Left(10.0)).unwrap());
    }

    #[test]
    fn text_edits_only_touch_editable_text() {
        let mut heading = factory::heading("Quote", 0.0, 0.0);
        assert!(apply_edit(&mut heading, PropertyEdit::Text("Estimate".into())).unwrap());
        assert_eq!(heading.text(), Some("Estimate"));

        let mut field = factory::data_field("quote.number", 0.0, 0.0);
        assert!(apply_edit(&mut field, PropertyEdit::Text("hello".into())).is_err());
        assert_eq!(field.text(), Some("{{quote.number}}"));
    }

    #[test]
    fn rebinding_a_field_rewrites_its_token() {
        let mut field = factory::data_field("quote.number", 0.0, 0.0);
        assert!(apply_edit(&mut field, PropertyEdit::FieldName("quote.date".into())).unwrap());
        assert_eq!(field.field_name(), Some("quote.date"));
        assert_eq!(field.text(), Some("{{quote.date}}"));
        assert!(apply_edit(&mut field, PropertyEdit::FieldName("  ".into())).is_err());
    }

    #[test]
    fn unchanged_value_reports_false() {
        let mut rect = factory::rectangle(5.0, 0.0);
        assert!(!apply_edit(&mut rect, PropertyEdit::Left(5.0)).unwrap());
    }
}
