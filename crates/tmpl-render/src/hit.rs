//! Hit testing: point → object lookup, marquee intersection and transform
//! handle picking.
//!
//! Objects are tested front-to-back (last painted = topmost). Locked objects
//! are never hit.

use kurbo::{Point, Rect, Vec2};
use tmpl_core::id::ObjectId;
use tmpl_core::model::{CanvasObject, Geometry, ObjectKind};
use tmpl_core::scene::SceneGraph;

/// Distance of the rotation handle above the top edge, in page units.
pub const ROTATE_HANDLE_OFFSET: f64 = 30.0;

/// Find the topmost selectable object at `point`.
///
/// `tolerance` widens every shape by that many page units so thin lines and
/// zero-height rules can still be picked.
pub fn hit_test(scene: &SceneGraph, point: Point, tolerance: f64) -> Option<ObjectId> {
    scene
        .iter()
        .rev()
        .filter(|o| o.selectable())
        .find(|o| contains(o, point, tolerance))
        .map(|o| o.id)
}

fn contains(obj: &CanvasObject, point: Point, tolerance: f64) -> bool {
    let g = &obj.geometry;
    if let ObjectKind::Line = obj.kind {
        let t = g.transform();
        let a = t * Point::ZERO;
        let b = t * Point::new(g.width, g.height);
        return distance_to_segment(point, a, b) <= tolerance;
    }

    let Some(local) = g.to_local(point) else {
        return false;
    };
    // Tolerance is in page units; local space is unscaled.
    let tx = tolerance / g.scale_x.abs().max(f64::EPSILON);
    let ty = tolerance / g.scale_y.abs().max(f64::EPSILON);

    match obj.kind {
        ObjectKind::Circle => {
            let rx = g.width / 2.0 + tx;
            let ry = g.height / 2.0 + ty;
            if rx <= 0.0 || ry <= 0.0 {
                return false;
            }
            let dx = (local.x - g.width / 2.0) / rx;
            let dy = (local.y - g.height / 2.0) / ry;
            dx * dx + dy * dy <= 1.0
        }
        _ => Rect::new(-tx, -ty, g.width + tx, g.height + ty).contains(local),
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq < f64::EPSILON {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot()
}

/// All selectable top-level objects whose bounding box touches `marquee`, in z-order.
pub fn hit_test_rect(scene: &SceneGraph, marquee: Rect) -> Vec<ObjectId> {
    let m = marquee.abs();
    scene
        .iter()
        .filter(|o| o.selectable())
        .filter(|o| {
            let b = o.geometry.bounding_rect();
            b.x0 <= m.x1 && m.x0 <= b.x1 && b.y0 <= m.y1 && m.y0 <= b.y1
        })
        .map(|o| o.id)
        .collect()
}

// ─── Transform handles ───────────────────────────────────────────────────

/// The eight resize handles plus the rotation knob above the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    Rotate,
}

impl Handle {
    pub const ALL: [Handle; 9] = [
        Handle::Rotate,
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Right,
        Handle::BottomRight,
        Handle::Bottom,
        Handle::BottomLeft,
        Handle::Left,
    ];

    /// Which horizontal edge the handle drags: -1 left, 1 right, 0 neither.
    pub fn horizontal(&self) -> i8 {
        match self {
            Handle::TopLeft | Handle::Left | Handle::BottomLeft => -1,
            Handle::TopRight | Handle::Right | Handle::BottomRight => 1,
            _ => 0,
        }
    }

    /// Which vertical edge the handle drags: -1 top, 1 bottom, 0 neither.
    pub fn vertical(&self) -> i8 {
        match self {
            Handle::TopLeft | Handle::Top | Handle::TopRight => -1,
            Handle::BottomLeft | Handle::Bottom | Handle::BottomRight => 1,
            _ => 0,
        }
    }

    /// Page position of this handle on an object with geometry `g`.
    pub fn position(&self, g: &Geometry) -> Point {
        let t = g.transform();
        if let Handle::Rotate = self {
            let top_center = t * Point::new(g.width / 2.0, 0.0);
            let up = Vec2::from_angle(g.angle.to_radians() - std::f64::consts::FRAC_PI_2);
            let flip = if g.scale_y < 0.0 { -1.0 } else { 1.0 };
            return top_center + up * (ROTATE_HANDLE_OFFSET * flip);
        }
        let fx = f64::from(self.horizontal() + 1) / 2.0;
        let fy = f64::from(self.vertical() + 1) / 2.0;
        t * Point::new(g.width * fx, g.height * fy)
    }
}

/// The handle within `radius` of `point`, if any. The rotation knob wins ties.
pub fn hit_handle(g: &Geometry, point: Point, radius: f64) -> Option<Handle> {
    Handle::ALL
        .into_iter()
        .find(|h| (h.position(g) - point).hypot() <= radius)
}
