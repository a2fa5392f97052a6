//! The scene graph: the ordered list of objects on the page.
//!
//! List order is z-order (index 0 paints first, the last object is on top).
//! Structural operations keep each object's id and attributes intact and
//! only change its position in the list.

use crate::id::ObjectId;
use crate::model::CanvasObject;
use kurbo::Rect;
use std::collections::HashSet;

/// The single source of truth for "what is on the page".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    objects: Vec<CanvasObject>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from objects in z-order, re-keying any duplicate ids.
    pub fn from_objects(objects: Vec<CanvasObject>) -> Self {
        let mut scene = Self::new();
        for obj in objects {
            scene.add(obj);
        }
        scene
    }

    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanvasObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Top-level ids in z-order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|o| o.id).collect()
    }

    /// Top-level ids of objects that can be selected (not locked).
    pub fn unlocked_ids(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.selectable())
            .map(|o| o.id)
            .collect()
    }

    /// Whether `id` is used anywhere in the scene, nested children included.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.all_ids().contains(&id)
    }

    /// Position of a top-level object in z-order.
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Look up a top-level object.
    pub fn get(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Look up a top-level object mutably.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut CanvasObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Append an object at the top of the z-order. Returns its id, which
    /// differs from the incoming one only if that id was already taken.
    pub fn add(&mut self, mut object: CanvasObject) -> ObjectId {
        self.ensure_unique_ids(&mut object);
        let id = object.id;
        log::debug!("add {} `{}`", object.kind.tag(), id);
        self.objects.push(object);
        id
    }

    /// Remove a top-level object.
    pub fn remove(&mut self, id: ObjectId) -> Option<CanvasObject> {
        let idx = self.index_of(id)?;
        log::debug!("remove `{id}`");
        Some(self.objects.remove(idx))
    }

    /// Remove several top-level objects, returning them in former z-order.
    pub fn remove_many(&mut self, ids: &[ObjectId]) -> Vec<CanvasObject> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.objects.len());
        for obj in self.objects.drain(..) {
            if ids.contains(&obj.id) {
                removed.push(obj);
            } else {
                kept.push(obj);
            }
        }
        self.objects = kept;
        removed
    }

    /// Replace the whole object list (history restore, template load).
    pub fn replace_all(&mut self, objects: Vec<CanvasObject>) {
        *self = Self::from_objects(objects);
    }

    /// Move an object to the end of the list (topmost). Returns true if the
    /// z-order changed.
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) => self.move_to(pos, self.objects.len() - 1),
            None => false,
        }
    }

    /// Move an object to the start of the list (bottom-most).
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) => self.move_to(pos, 0),
            None => false,
        }
    }

    /// Move an object one step up in z-order (swap with next sibling).
    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos + 1 < self.objects.len() => self.move_to(pos, pos + 1),
            _ => false,
        }
    }

    /// Move an object one step down in z-order (swap with previous sibling).
    pub fn send_backward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos > 0 => self.move_to(pos, pos - 1),
            _ => false,
        }
    }

    /// Union of the unrotated extents of the given top-level objects.
    pub fn extent_of(&self, ids: &[ObjectId]) -> Option<Rect> {
        ids.iter()
            .filter_map(|id| self.get(*id))
            .map(|o| o.geometry.extent())
            .reduce(|a, b| a.union(b))
    }

    /// Union of the rotated bounding boxes of the given top-level objects.
    pub fn bounding_rect_of(&self, ids: &[ObjectId]) -> Option<Rect> {
        ids.iter()
            .filter_map(|id| self.get(*id))
            .map(|o| o.geometry.bounding_rect())
            .reduce(|a, b| a.union(b))
    }

    fn move_to(&mut self, from: usize, to: usize) -> bool {
        if from == to {
            return false;
        }
        let obj = self.objects.remove(from);
        log::debug!("z-order `{}`: {from} -> {to}", obj.id);
        self.objects.insert(to, obj);
        true
    }

    fn all_ids(&self) -> HashSet<ObjectId> {
        let mut ids = HashSet::new();
        for obj in &self.objects {
            obj.walk(&mut |o| {
                ids.insert(o.id);
            });
        }
        ids
    }

    /// Re-key `object` (and its children) until none of its ids clash with
    /// the scene or with each other.
    fn ensure_unique_ids(&self, object: &mut CanvasObject) {
        let taken = self.all_ids();
        loop {
            let mut seen = HashSet::new();
            let mut clash = false;
            object.walk(&mut |o| {
                if taken.contains(&o.id) || !seen.insert(o.id) {
                    clash = true;
                }
            });
            if !clash {
                return;
            }
            log::warn!("id `{}` already in use; re-keying", object.id);
            object.reissue_ids();
        }
    }
}
