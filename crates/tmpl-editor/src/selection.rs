//! Selection and pointer manipulation.
//!
//! The controller owns which objects are active and runs one pointer gesture
//! at a time: click-select, drag-move, handle resize/rotate and marquee.
//! Live gestures rewrite geometry on every move for visual feedback, always
//! from the geometry captured at pointer-down, so nothing accumulates drift.
//! The caller records history once when `pointer_up` reports a change.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Click | Drag | Resize | Rotate |
//! |----------|-------|------|--------|--------|
//! | **Shift** | Toggle in/out of selection | Axis-constrain | Keep aspect (corners) | Snap angle |

use crate::config::EditorConfig;
use crate::input::{InputEvent, Modifiers};
use kurbo::{Affine, Point, Rect, Vec2};
use smallvec::SmallVec;
use tmpl_core::id::ObjectId;
use tmpl_core::model::Geometry;
use tmpl_core::scene::SceneGraph;
use tmpl_render::hit::{Handle, hit_handle, hit_test, hit_test_rect};

/// Ids of the active objects, in the order they were selected.
pub type IdList = SmallVec<[ObjectId; 4]>;

/// Smallest size a resize can shrink an object to, in page units.
const MIN_SIZE: f64 = 1.0;

// ─── Selection ───────────────────────────────────────────────────────────

/// Nothing, one active object, or a multi-object ActiveSelection.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    None,
    Single(ObjectId),
    /// Two or more members transformed together; its frame is the union of
    /// their boxes.
    Active(IdList),
}

impl Selection {
    /// Normalize a list of ids: duplicates dropped, 0 → `None`, 1 → `Single`.
    pub fn from_ids(ids: impl IntoIterator<Item = ObjectId>) -> Self {
        let mut list = IdList::new();
        for id in ids {
            if !list.contains(&id) {
                list.push(id);
            }
        }
        match list.len() {
            0 => Selection::None,
            1 => Selection::Single(list[0]),
            _ => Selection::Active(list),
        }
    }

    pub fn ids(&self) -> &[ObjectId] {
        match self {
            Selection::None => &[],
            Selection::Single(id) => std::slice::from_ref(id),
            Selection::Active(ids) => ids,
        }
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids().contains(&id)
    }

    /// The single active object; `None` for empty or multi selections.
    pub fn active_object(&self) -> Option<ObjectId> {
        match self {
            Selection::Single(id) => Some(*id),
            _ => None,
        }
    }

    /// Selected ids that are still in the scene and not locked, in z-order.
    pub fn unlocked_in(&self, scene: &SceneGraph) -> IdList {
        scene
            .iter()
            .filter(|o| !o.locked && self.contains(o.id))
            .map(|o| o.id)
            .collect()
    }

    /// Selected ids that are still in the scene, in z-order.
    pub fn in_z_order(&self, scene: &SceneGraph) -> IdList {
        scene
            .iter()
            .filter(|o| self.contains(o.id))
            .map(|o| o.id)
            .collect()
    }
}

// ─── Gestures ────────────────────────────────────────────────────────────

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    /// Pointer is down on an object but has not moved yet.
    Selecting,
    /// Dragging, resizing or rotating.
    Transforming,
    /// Rubber-band selection over empty space.
    Marquee,
}

/// The box a resize works in: an origin on the page, a rotation and a size.
/// For a single object this is the object itself; for an ActiveSelection it
/// is the axis-aligned union of member extents.
#[derive(Debug, Clone, Copy)]
struct Frame {
    origin: Point,
    angle: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn to_page(&self) -> Affine {
        Affine::translate(self.origin.to_vec2()) * Affine::rotate(self.angle.to_radians())
    }

    fn geometry(&self) -> Geometry {
        Geometry {
            angle: self.angle,
            ..Geometry::at(self.origin.x, self.origin.y, self.width, self.height)
        }
    }
}

#[derive(Debug, Clone)]
enum Gesture {
    None,
    Pending {
        origin: Point,
        starts: Vec<(ObjectId, Geometry)>,
    },
    Move {
        origin: Point,
        starts: Vec<(ObjectId, Geometry)>,
    },
    Resize {
        handle: Handle,
        origin: Point,
        frame: Frame,
        starts: Vec<(ObjectId, Geometry)>,
    },
    Rotate {
        pivot: Point,
        start_angle: f64,
        /// Angle of the primary member at pointer-down, used for snapping.
        reference_angle: f64,
        starts: Vec<(ObjectId, Geometry)>,
    },
    Marquee {
        origin: Point,
        current: Point,
        base: Selection,
    },
}

/// Tracks the active selection and turns pointer events into geometry edits.
#[derive(Debug, Clone)]
pub struct SelectionController {
    selection: Selection,
    gesture: Gesture,
    hit_tolerance: f64,
    handle_radius: f64,
    rotation_snap: f64,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl SelectionController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            selection: Selection::None,
            gesture: Gesture::None,
            hit_tolerance: config.hit_tolerance,
            handle_radius: config.handle_radius,
            rotation_snap: config.rotation_snap,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn state(&self) -> GestureState {
        match self.gesture {
            Gesture::None => GestureState::Idle,
            Gesture::Pending { .. } => GestureState::Selecting,
            Gesture::Move { .. } | Gesture::Resize { .. } | Gesture::Rotate { .. } => {
                GestureState::Transforming
            }
            Gesture::Marquee { .. } => GestureState::Marquee,
        }
    }

    /// Current rubber band (normalized), while a marquee is being dragged.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::Marquee { origin, current, .. } => {
                Some(Rect::from_points(*origin, *current))
            }
            _ => None,
        }
    }

    /// Replace the selection with one object, or clear it.
    pub fn set_active_object(&mut self, id: Option<ObjectId>) {
        self.selection = match id {
            Some(id) => Selection::Single(id),
            None => Selection::None,
        };
    }

    /// Replace the selection wholesale (paste of several objects).
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Add `id` to the selection, or remove it if already there.
    pub fn toggle(&mut self, id: ObjectId) {
        let current = self.selection.ids();
        self.selection = if current.contains(&id) {
            Selection::from_ids(current.iter().copied().filter(|i| *i != id))
        } else {
            Selection::from_ids(current.iter().copied().chain(std::iter::once(id)))
        };
    }

    /// Every unlocked object as one ActiveSelection.
    pub fn select_all(&mut self, scene: &SceneGraph) {
        self.selection = Selection::from_ids(scene.unlocked_ids());
    }

    pub fn clear(&mut self) {
        self.selection = Selection::None;
        self.gesture = Gesture::None;
    }

    /// Drop ids that no longer exist (after delete, undo, redo).
    pub fn retain_existing(&mut self, scene: &SceneGraph) {
        self.selection = Selection::from_ids(self.selection.in_z_order(scene));
    }

    /// Abandon any in-flight gesture without touching the scene.
    pub fn cancel_gesture(&mut self) {
        self.gesture = Gesture::None;
    }

    /// Frame of the current selection as a geometry (rotated for a single
    /// object, axis-aligned union for a multi selection). `None` when empty
    /// or when no member can be transformed.
    pub fn frame(&self, scene: &SceneGraph) -> Option<Geometry> {
        self.transform_frame(scene).map(|f| f.geometry())
    }

    fn transform_frame(&self, scene: &SceneGraph) -> Option<Frame> {
        let movable = self.selection.unlocked_in(scene);
        match self.selection {
            Selection::Single(id) => {
                let g = scene.get(id).filter(|o| !o.locked)?.geometry;
                Some(Frame {
                    origin: Point::new(g.left, g.top),
                    angle: g.angle,
                    width: g.scaled_width(),
                    height: g.scaled_height(),
                })
            }
            Selection::Active(_) => {
                let r = scene.extent_of(&movable)?;
                Some(Frame {
                    origin: Point::new(r.x0, r.y0),
                    angle: 0.0,
                    width: r.width(),
                    height: r.height(),
                })
            }
            Selection::None => None,
        }
    }

    fn starts(&self, scene: &SceneGraph) -> Vec<(ObjectId, Geometry)> {
        self.selection
            .unlocked_in(scene)
            .into_iter()
            .filter_map(|id| scene.get(id).map(|o| (id, o.geometry)))
            .collect()
    }

    // ─── Pointer handling ────────────────────────────────────────────────

    /// Dispatch a pointer event. Returns true when `pointer_up` committed a
    /// geometry change (the caller records one history snapshot).
    pub fn handle(&mut self, scene: &mut SceneGraph, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { .. } => {
                self.pointer_down(scene, event.position(), event.modifiers());
                false
            }
            InputEvent::PointerMove { .. } => {
                self.pointer_move(scene, event.position(), event.modifiers());
                false
            }
            InputEvent::PointerUp { .. } => self.pointer_up(scene),
        }
    }

    pub fn pointer_down(&mut self, scene: &SceneGraph, p: Point, modifiers: Modifiers) {
        // Handles of the current selection take precedence over objects below them.
        if !modifiers.shift
            && let Some(frame) = self.transform_frame(scene)
            && let Some(handle) = hit_handle(&frame.geometry(), p, self.handle_radius)
        {
            let starts = self.starts(scene);
            self.gesture = if handle == Handle::Rotate {
                let pivot = frame.to_page() * Point::new(frame.width / 2.0, frame.height / 2.0);
                Gesture::Rotate {
                    pivot,
                    start_angle: angle_of(p - pivot),
                    reference_angle: frame.angle,
                    starts,
                }
            } else {
                Gesture::Resize {
                    handle,
                    origin: p,
                    frame,
                    starts,
                }
            };
            log::trace!("gesture: {handle:?} handle");
            return;
        }

        match hit_test(scene, p, self.hit_tolerance) {
            Some(id) => {
                if modifiers.shift {
                    self.toggle(id);
                } else if !self.selection.contains(id) {
                    self.selection = Selection::Single(id);
                }
                self.gesture = if self.selection.contains(id) {
                    Gesture::Pending {
                        origin: p,
                        starts: self.starts(scene),
                    }
                } else {
                    Gesture::None
                };
            }
            None => {
                let base = if modifiers.shift {
                    self.selection.clone()
                } else {
                    Selection::None
                };
                self.selection = base.clone();
                self.gesture = Gesture::Marquee {
                    origin: p,
                    current: p,
                    base,
                };
            }
        }
    }

    pub fn pointer_move(&mut self, scene: &mut SceneGraph, p: Point, modifiers: Modifiers) {
        if let Gesture::Pending { origin, starts } = &self.gesture {
            if p == *origin {
                return;
            }
            self.gesture = Gesture::Move {
                origin: *origin,
                starts: starts.clone(),
            };
        }

        match &mut self.gesture {
            Gesture::None | Gesture::Pending { .. } => {}
            Gesture::Move { origin, starts } => {
                let mut d = p - *origin;
                if modifiers.shift {
                    if d.x.abs() > d.y.abs() {
                        d.y = 0.0;
                    } else {
                        d.x = 0.0;
                    }
                }
                for (id, start) in starts.iter() {
                    if let Some(obj) = scene.get_mut(*id) {
                        obj.geometry.left = start.left + d.x;
                        obj.geometry.top = start.top + d.y;
                    }
                }
            }
            Gesture::Resize {
                handle,
                origin,
                frame,
                starts,
            } => {
                let local = (Affine::rotate(-frame.angle.to_radians()) * (p - *origin).to_point()).to_vec2();
                let resized = resize_frame(frame, *handle, local, modifiers.shift);
                apply_resize(scene, frame, &resized, starts);
            }
            Gesture::Rotate {
                pivot,
                start_angle,
                reference_angle,
                starts,
            } => {
                let mut delta = angle_of(p - *pivot) - *start_angle;
                if modifiers.shift && self.rotation_snap > 0.0 {
                    let snapped =
                        ((*reference_angle + delta) / self.rotation_snap).round() * self.rotation_snap;
                    delta = snapped - *reference_angle;
                }
                let turn = Affine::rotate_about(delta.to_radians(), *pivot);
                for (id, start) in starts.iter() {
                    if let Some(obj) = scene.get_mut(*id) {
                        let origin = turn * Point::new(start.left, start.top);
                        obj.geometry.left = origin.x;
                        obj.geometry.top = origin.y;
                        obj.geometry.angle = normalize_angle(start.angle + delta);
                    }
                }
            }
            Gesture::Marquee {
                origin,
                current,
                base,
            } => {
                *current = p;
                let hits = hit_test_rect(scene, Rect::from_points(*origin, p));
                self.selection = Selection::from_ids(base.ids().iter().copied().chain(hits));
            }
        }
    }

    /// Finish the gesture. Returns true when any member's geometry differs
    /// from pointer-down.
    pub fn pointer_up(&mut self, scene: &SceneGraph) -> bool {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::None);
        match gesture {
            Gesture::Move { starts, .. }
            | Gesture::Resize { starts, .. }
            | Gesture::Rotate { starts, .. } => starts
                .iter()
                .any(|(id, start)| scene.get(*id).is_some_and(|o| o.geometry != *start)),
            Gesture::Marquee { .. } => {
                log::debug!("marquee selected {} objects", self.selection.len());
                false
            }
            Gesture::None | Gesture::Pending { .. } => false,
        }
    }
}

/// Angle of a vector in degrees.
fn angle_of(v: Vec2) -> f64 {
    v.y.atan2(v.x).to_degrees()
}

/// Wrap into `[0, 360)`.
pub fn normalize_angle(deg: f64) -> f64 {
    let a = deg.rem_euclid(360.0);
    if (a - 360.0).abs() < 1e-9 { 0.0 } else { a }
}

/// New frame-local box `(x0, y0, width, height)` after dragging `handle`
/// by `d` (already rotated into frame space).
fn resize_frame(frame: &Frame, handle: Handle, d: Vec2, keep_aspect: bool) -> Rect {
    let (w, h) = (frame.width, frame.height);
    let (hx, vy) = (handle.horizontal(), handle.vertical());

    let mut new_w = match hx {
        -1 => w - d.x,
        1 => w + d.x,
        _ => w,
    };
    let mut new_h = match vy {
        -1 => h - d.y,
        1 => h + d.y,
        _ => h,
    };
    if w > 0.0 {
        new_w = new_w.max(MIN_SIZE);
    }
    if h > 0.0 {
        new_h = new_h.max(MIN_SIZE);
    }

    if keep_aspect && hx != 0 && vy != 0 && w > 0.0 && h > 0.0 {
        let f = (new_w / w).max(new_h / h);
        new_w = w * f;
        new_h = h * f;
    }

    let x0 = if hx == -1 { w - new_w } else { 0.0 };
    let y0 = if vy == -1 { h - new_h } else { 0.0 };
    Rect::new(x0, y0, x0 + new_w, y0 + new_h)
}

/// Scale every member from its start geometry so the frame becomes `resized`.
fn apply_resize(scene: &mut SceneGraph, frame: &Frame, resized: &Rect, starts: &[(ObjectId, Geometry)]) {
    let fx = if frame.width > 0.0 {
        resized.width() / frame.width
    } else {
        1.0
    };
    let fy = if frame.height > 0.0 {
        resized.height() / frame.height
    } else {
        1.0
    };
    let to_page = frame.to_page();
    let to_frame = to_page.inverse();

    for (id, start) in starts {
        let Some(obj) = scene.get_mut(*id) else {
            continue;
        };
        let rel = to_frame * Point::new(start.left, start.top);
        let moved = to_page * Point::new(resized.x0 + rel.x * fx, resized.y0 + rel.y * fy);
        obj.geometry.left = moved.x;
        obj.geometry.top = moved.y;
        let (sx, sy) = member_scale(start.angle - frame.angle, fx, fy);
        obj.geometry.scale_x = start.scale_x * sx;
        obj.geometry.scale_y = start.scale_y * sy;
    }
}

/// Frame scale factors expressed along a member's own axes. A member turned
/// off the frame's axes would need skew to follow a non-uniform stretch, so
/// it scales uniformly instead.
fn member_scale(relative_angle: f64, fx: f64, fy: f64) -> (f64, f64) {
    const EPS: f64 = 1e-6;
    let quarter = normalize_angle(relative_angle) / 90.0;
    if (quarter - quarter.round()).abs() > EPS {
        let s = (fx * fy).abs().sqrt();
        return (s, s);
    }
    if quarter.round() as i64 % 2 == 0 {
        (fx, fy)
    } else {
        (fy, fx)
    }
}
