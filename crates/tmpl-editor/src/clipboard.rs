//! Copy, paste and duplicate.
//!
//! The clipboard holds deep copies of objects, never references into the
//! scene, so later edits to the originals do not leak into what gets pasted.

use crate::selection::{IdList, Selection};
use tmpl_core::model::CanvasObject;
use tmpl_core::scene::SceneGraph;

/// Single-slot in-session clipboard.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Option<Vec<CanvasObject>>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot with clones of the selected objects (z-order kept).
    /// Locked objects can be copied. Returns how many were copied; an empty
    /// selection leaves the slot untouched.
    pub fn copy(&mut self, scene: &SceneGraph, selection: &Selection) -> usize {
        let objects = clone_selected(scene, selection);
        if objects.is_empty() {
            return 0;
        }
        let n = objects.len();
        self.slot = Some(objects);
        log::debug!("clipboard: copied {n} objects");
        n
    }

    /// Insert fresh copies of the slot, shifted by `offset` from the copied
    /// source and stacked on top. Returns the new ids. The slot is kept, so
    /// pasting again lands on the same spot.
    pub fn paste(&self, scene: &mut SceneGraph, offset: (f64, f64)) -> IdList {
        match &self.slot {
            Some(objects) => insert_copies(scene, objects.clone(), offset),
            None => IdList::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn contents(&self) -> &[CanvasObject] {
        self.slot.as_deref().unwrap_or(&[])
    }
}

/// Clone and insert the selected objects in one step without touching the
/// clipboard slot.
pub fn duplicate(scene: &mut SceneGraph, selection: &Selection, offset: (f64, f64)) -> IdList {
    let objects = clone_selected(scene, selection);
    insert_copies(scene, objects, offset)
}

fn clone_selected(scene: &SceneGraph, selection: &Selection) -> Vec<CanvasObject> {
    scene
        .iter()
        .filter(|o| selection.contains(o.id))
        .cloned()
        .collect()
}

fn insert_copies(scene: &mut SceneGraph, objects: Vec<CanvasObject>, (dx, dy): (f64, f64)) -> IdList {
    objects
        .into_iter()
        .map(|mut obj| {
            obj.reissue_ids();
            obj.translate(dx, dy);
            scene.add(obj)
        })
        .collect()
}
